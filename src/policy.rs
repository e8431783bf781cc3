use std::collections::{HashMap, HashSet};

use crate::db::Database;
use crate::errors::Result;
use crate::types::{DomainObject, ProjectVisibility, UserState, Viewer};

/// Answers "may this viewer read this object?".
///
/// A pure query: the same (viewer, object) pair may be asked more than once
/// per pass and results are never reused across passes or viewers. Errors
/// are treated as a denial by callers (fail closed).
pub trait PolicyEngine {
    fn can_read(&self, viewer: &Viewer, object: &DomainObject) -> Result<bool>;
}

/// Policy engine backed by project visibility and membership data.
///
/// Rules:
/// - public projects are readable by anyone, internal ones by any signed-in
///   viewer, private ones by members only;
/// - confidential issues additionally require membership, authorship, or an
///   assignment;
/// - users are readable by anyone while active, blocked users only by
///   themselves;
/// - an object in an unknown project is never readable.
pub struct MembershipPolicy {
    /// Project id to visibility.
    projects: HashMap<i64, ProjectVisibility>,
    /// User id to the set of projects the user is a member of.
    memberships: HashMap<i64, HashSet<i64>>,
}

impl MembershipPolicy {
    /// Creates a policy from in-memory visibility and membership tables.
    pub fn new(
        projects: HashMap<i64, ProjectVisibility>,
        memberships: HashMap<i64, HashSet<i64>>,
    ) -> Self {
        Self {
            projects,
            memberships,
        }
    }

    /// Creates a policy with its tables preloaded from the database.
    pub fn from_database(db: &Database) -> Result<Self> {
        Ok(Self {
            projects: db.load_project_visibilities()?,
            memberships: db.load_memberships()?,
        })
    }

    fn is_member(&self, viewer: &Viewer, project_id: i64) -> bool {
        viewer
            .id
            .and_then(|id| self.memberships.get(&id))
            .is_some_and(|projects| projects.contains(&project_id))
    }

    /// Whether the project itself is readable by the viewer.
    fn project_readable(&self, viewer: &Viewer, project_id: i64) -> bool {
        match self.projects.get(&project_id) {
            Some(ProjectVisibility::Public) => true,
            Some(ProjectVisibility::Internal) => !viewer.is_anonymous(),
            Some(ProjectVisibility::Private) => self.is_member(viewer, project_id),
            None => false,
        }
    }
}

impl PolicyEngine for MembershipPolicy {
    fn can_read(&self, viewer: &Viewer, object: &DomainObject) -> Result<bool> {
        let allowed = match object {
            DomainObject::Issue(issue) => {
                self.project_readable(viewer, issue.project_id)
                    && (!issue.confidential
                        || self.is_member(viewer, issue.project_id)
                        || viewer.id.is_some() && viewer.id == issue.author_id
                        || viewer.id.is_some() && viewer.id == issue.assignee_id)
            }
            DomainObject::MergeRequest(mr) => self.project_readable(viewer, mr.project_id),
            DomainObject::Commit(commit) => self.project_readable(viewer, commit.project_id),
            DomainObject::Label(label) => self.project_readable(viewer, label.project_id),
            DomainObject::User(user) => {
                user.state == UserState::Active || viewer.id == Some(user.id)
            }
        };
        Ok(allowed)
    }
}
