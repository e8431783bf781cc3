use std::collections::{HashMap, HashSet};

use refmark::policy::{MembershipPolicy, PolicyEngine};
use refmark::types::*;

/// Policy over three projects: 1 public, 2 internal, 3 private. User 10 is a
/// member of project 3.
fn setup_policy() -> MembershipPolicy {
    let mut projects = HashMap::new();
    projects.insert(1, ProjectVisibility::Public);
    projects.insert(2, ProjectVisibility::Internal);
    projects.insert(3, ProjectVisibility::Private);

    let mut memberships: HashMap<i64, HashSet<i64>> = HashMap::new();
    memberships.entry(10).or_default().insert(3);

    MembershipPolicy::new(projects, memberships)
}

fn issue_in(project_id: i64) -> DomainObject {
    DomainObject::Issue(Issue {
        id: 1,
        project_id,
        title: "An issue".to_string(),
        confidential: false,
        author_id: None,
        assignee_id: None,
        external_tracker: false,
    })
}

fn confidential_issue(author_id: Option<i64>, assignee_id: Option<i64>) -> DomainObject {
    DomainObject::Issue(Issue {
        id: 2,
        project_id: 1,
        title: "A confidential issue".to_string(),
        confidential: true,
        author_id,
        assignee_id,
        external_tracker: false,
    })
}

fn user(id: i64, state: UserState) -> DomainObject {
    DomainObject::User(User {
        id,
        username: format!("user{id}"),
        name: format!("User {id}"),
        state,
    })
}

#[test]
fn test_public_project_readable_by_anonymous() {
    let policy = setup_policy();

    let allowed = policy
        .can_read(&Viewer::anonymous(), &issue_in(1))
        .expect("policy query should succeed");
    assert!(allowed);
}

#[test]
fn test_internal_project_requires_signed_in_viewer() {
    let policy = setup_policy();

    assert!(!policy
        .can_read(&Viewer::anonymous(), &issue_in(2))
        .expect("policy query should succeed"));
    assert!(policy
        .can_read(&Viewer::user(99), &issue_in(2))
        .expect("policy query should succeed"));
}

#[test]
fn test_private_project_requires_membership() {
    let policy = setup_policy();

    assert!(!policy
        .can_read(&Viewer::user(99), &issue_in(3))
        .expect("policy query should succeed"));
    assert!(policy
        .can_read(&Viewer::user(10), &issue_in(3))
        .expect("policy query should succeed"));
}

#[test]
fn test_unknown_project_is_never_readable() {
    let policy = setup_policy();

    assert!(!policy
        .can_read(&Viewer::user(10), &issue_in(404))
        .expect("policy query should succeed"));
}

#[test]
fn test_confidential_issue_denied_to_non_members() {
    let policy = setup_policy();

    let allowed = policy
        .can_read(&Viewer::user(99), &confidential_issue(None, None))
        .expect("policy query should succeed");
    assert!(!allowed, "confidentiality overrides project visibility");
}

#[test]
fn test_confidential_issue_allowed_for_author_and_assignee() {
    let policy = setup_policy();

    assert!(policy
        .can_read(&Viewer::user(7), &confidential_issue(Some(7), None))
        .expect("policy query should succeed"));
    assert!(policy
        .can_read(&Viewer::user(8), &confidential_issue(None, Some(8)))
        .expect("policy query should succeed"));
    assert!(!policy
        .can_read(&Viewer::anonymous(), &confidential_issue(None, None))
        .expect("policy query should succeed"));
}

#[test]
fn test_merge_requests_commits_labels_follow_project_visibility() {
    let policy = setup_policy();
    let viewer = Viewer::user(99);

    let mr = DomainObject::MergeRequest(MergeRequest {
        id: 1,
        project_id: 3,
        title: "A merge request".to_string(),
        author_id: None,
    });
    let commit = DomainObject::Commit(Commit {
        sha: "a1b2c3d4e5f6a7b8c9d0a1b2c3d4e5f6a7b8c9d0".to_string(),
        project_id: 1,
        title: "A commit".to_string(),
        author_name: "dev".to_string(),
    });
    let label = DomainObject::Label(Label {
        id: 1,
        project_id: 3,
        title: "bug".to_string(),
        color: "#ff0000".to_string(),
    });

    assert!(!policy.can_read(&viewer, &mr).expect("policy query"));
    assert!(policy.can_read(&viewer, &commit).expect("policy query"));
    assert!(!policy.can_read(&viewer, &label).expect("policy query"));
}

#[test]
fn test_active_user_readable_by_anyone() {
    let policy = setup_policy();

    assert!(policy
        .can_read(&Viewer::anonymous(), &user(5, UserState::Active))
        .expect("policy query should succeed"));
}

#[test]
fn test_blocked_user_readable_only_by_self() {
    let policy = setup_policy();

    assert!(!policy
        .can_read(&Viewer::user(6), &user(5, UserState::Blocked))
        .expect("policy query should succeed"));
    assert!(policy
        .can_read(&Viewer::user(5), &user(5, UserState::Blocked))
        .expect("policy query should succeed"));
}
