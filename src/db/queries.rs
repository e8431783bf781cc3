use std::collections::{HashMap, HashSet};

use rusqlite::{params, params_from_iter};

use super::connection::Database;
use crate::errors::{RefmarkError, Result};
use crate::loader::ObjectStore;
use crate::types::*;

// ---------------------------------------------------------------------------
// Helpers: map rusqlite rows to domain types
// ---------------------------------------------------------------------------

/// Maps a row from the `projects` table to a `Project`.
fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    let vis_str: String = row.get("visibility")?;
    let external_int: i32 = row.get("external_tracker")?;

    Ok(Project {
        id: row.get("id")?,
        path: row.get("path")?,
        visibility: ProjectVisibility::from_str(&vis_str).unwrap_or_default(),
        external_tracker: external_int != 0,
    })
}

/// Maps a row from the `issues` table (joined with `projects` for the
/// external-tracker flag) to an `Issue`.
fn row_to_issue(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    let confidential_int: i32 = row.get("confidential")?;
    let external_int: i32 = row.get("external_tracker")?;

    Ok(Issue {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        title: row.get("title")?,
        confidential: confidential_int != 0,
        author_id: row.get("author_id")?,
        assignee_id: row.get("assignee_id")?,
        external_tracker: external_int != 0,
    })
}

/// Maps a row from the `merge_requests` table to a `MergeRequest`.
fn row_to_merge_request(row: &rusqlite::Row) -> rusqlite::Result<MergeRequest> {
    Ok(MergeRequest {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        title: row.get("title")?,
        author_id: row.get("author_id")?,
    })
}

/// Maps a row from the `commits` table to a `Commit`.
fn row_to_commit(row: &rusqlite::Row) -> rusqlite::Result<Commit> {
    Ok(Commit {
        sha: row.get("sha")?,
        project_id: row.get("project_id")?,
        title: row.get("title")?,
        author_name: row.get("author_name")?,
    })
}

/// Maps a row from the `labels` table to a `Label`.
fn row_to_label(row: &rusqlite::Row) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        title: row.get("title")?,
        color: row.get("color")?,
    })
}

/// Maps a row from the `users` table to a `User`.
fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let state_str: String = row.get("state")?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        name: row.get("name")?,
        state: UserState::from_str(&state_str).unwrap_or_default(),
    })
}

/// Builds the placeholder list for an `IN (...)` clause.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Parses raw identifiers to integers, dropping values that cannot match
/// any row.
fn numeric_ids(ids: &[String]) -> Vec<i64> {
    ids.iter().filter_map(|id| id.parse::<i64>().ok()).collect()
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

impl Database {
    /// Inserts or replaces a single project.
    pub fn insert_project(&self, project: &Project) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO projects (id, path, visibility, external_tracker)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    project.id,
                    project.path,
                    project.visibility.as_str(),
                    project.external_tracker as i32,
                ],
            )
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to insert project: {e}"),
                operation: "insert_project".to_string(),
            })?;
        Ok(())
    }

    /// Inserts or replaces a single issue.
    pub fn insert_issue(&self, issue: &Issue) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO issues
                    (id, project_id, title, confidential, author_id, assignee_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    issue.id,
                    issue.project_id,
                    issue.title,
                    issue.confidential as i32,
                    issue.author_id,
                    issue.assignee_id,
                ],
            )
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to insert issue: {e}"),
                operation: "insert_issue".to_string(),
            })?;
        Ok(())
    }

    /// Inserts or replaces a single merge request.
    pub fn insert_merge_request(&self, mr: &MergeRequest) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO merge_requests (id, project_id, title, author_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![mr.id, mr.project_id, mr.title, mr.author_id],
            )
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to insert merge request: {e}"),
                operation: "insert_merge_request".to_string(),
            })?;
        Ok(())
    }

    /// Inserts or replaces a single commit.
    pub fn insert_commit(&self, commit: &Commit) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO commits (sha, project_id, title, author_name)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    commit.sha,
                    commit.project_id,
                    commit.title,
                    commit.author_name,
                ],
            )
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to insert commit: {e}"),
                operation: "insert_commit".to_string(),
            })?;
        Ok(())
    }

    /// Inserts or replaces a single label.
    pub fn insert_label(&self, label: &Label) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO labels (id, project_id, title, color)
                 VALUES (?1, ?2, ?3, ?4)",
                params![label.id, label.project_id, label.title, label.color],
            )
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to insert label: {e}"),
                operation: "insert_label".to_string(),
            })?;
        Ok(())
    }

    /// Inserts or replaces a single user.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO users (id, username, name, state)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.username, user.name, user.state.as_str()],
            )
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to insert user: {e}"),
                operation: "insert_user".to_string(),
            })?;
        Ok(())
    }

    /// Inserts or replaces a single membership.
    pub fn insert_membership(&self, membership: &Membership) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO memberships (user_id, project_id) VALUES (?1, ?2)",
                params![membership.user_id, membership.project_id],
            )
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to insert membership: {e}"),
                operation: "insert_membership".to_string(),
            })?;
        Ok(())
    }

    /// Loads a full fixture set inside a single transaction.
    pub fn seed(&self, fixtures: &FixtureSet) -> Result<()> {
        let tx = self
            .conn()
            .unchecked_transaction()
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to begin transaction: {e}"),
                operation: "seed".to_string(),
            })?;

        for project in &fixtures.projects {
            self.insert_project(project)?;
        }
        for issue in &fixtures.issues {
            self.insert_issue(issue)?;
        }
        for mr in &fixtures.merge_requests {
            self.insert_merge_request(mr)?;
        }
        for commit in &fixtures.commits {
            self.insert_commit(commit)?;
        }
        for user in &fixtures.users {
            self.insert_user(user)?;
        }
        for label in &fixtures.labels {
            self.insert_label(label)?;
        }
        for membership in &fixtures.memberships {
            self.insert_membership(membership)?;
        }

        tx.commit().map_err(|e| RefmarkError::Store {
            message: format!("failed to commit transaction: {e}"),
            operation: "seed".to_string(),
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Batched lookups (one query per kind)
// ---------------------------------------------------------------------------

impl Database {
    /// Fetches issues by id, keyed by the raw identifier string.
    ///
    /// Joins `projects` so each issue carries the owning project's
    /// external-tracker flag.
    pub fn find_issues(&self, ids: &[String]) -> Result<HashMap<String, DomainObject>> {
        let numeric = numeric_ids(ids);
        if numeric.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT i.id, i.project_id, i.title, i.confidential, i.author_id,
                    i.assignee_id, p.external_tracker
             FROM issues i JOIN projects p ON p.id = i.project_id
             WHERE i.id IN ({})",
            placeholders(numeric.len())
        );

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to prepare statement: {e}"),
                operation: "find_issues".to_string(),
            })?;

        let rows = stmt
            .query_map(params_from_iter(numeric.iter()), row_to_issue)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to query issues: {e}"),
                operation: "find_issues".to_string(),
            })?;

        let mut found = HashMap::new();
        for row in rows {
            let issue = row.map_err(|e| RefmarkError::Store {
                message: format!("failed to read issue row: {e}"),
                operation: "find_issues".to_string(),
            })?;
            found.insert(issue.id.to_string(), DomainObject::Issue(issue));
        }
        Ok(found)
    }

    /// Fetches merge requests by id, keyed by the raw identifier string.
    pub fn find_merge_requests(&self, ids: &[String]) -> Result<HashMap<String, DomainObject>> {
        let numeric = numeric_ids(ids);
        if numeric.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT id, project_id, title, author_id FROM merge_requests WHERE id IN ({})",
            placeholders(numeric.len())
        );

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to prepare statement: {e}"),
                operation: "find_merge_requests".to_string(),
            })?;

        let rows = stmt
            .query_map(params_from_iter(numeric.iter()), row_to_merge_request)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to query merge requests: {e}"),
                operation: "find_merge_requests".to_string(),
            })?;

        let mut found = HashMap::new();
        for row in rows {
            let mr = row.map_err(|e| RefmarkError::Store {
                message: format!("failed to read merge request row: {e}"),
                operation: "find_merge_requests".to_string(),
            })?;
            found.insert(mr.id.to_string(), DomainObject::MergeRequest(mr));
        }
        Ok(found)
    }

    /// Fetches commits by full SHA, keyed by the raw identifier string.
    pub fn find_commits(&self, ids: &[String]) -> Result<HashMap<String, DomainObject>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT sha, project_id, title, author_name FROM commits WHERE sha IN ({})",
            placeholders(ids.len())
        );

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to prepare statement: {e}"),
                operation: "find_commits".to_string(),
            })?;

        let rows = stmt
            .query_map(params_from_iter(ids.iter()), row_to_commit)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to query commits: {e}"),
                operation: "find_commits".to_string(),
            })?;

        let mut found = HashMap::new();
        for row in rows {
            let commit = row.map_err(|e| RefmarkError::Store {
                message: format!("failed to read commit row: {e}"),
                operation: "find_commits".to_string(),
            })?;
            found.insert(commit.sha.clone(), DomainObject::Commit(commit));
        }
        Ok(found)
    }

    /// Fetches labels by id, keyed by the raw identifier string.
    pub fn find_labels(&self, ids: &[String]) -> Result<HashMap<String, DomainObject>> {
        let numeric = numeric_ids(ids);
        if numeric.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT id, project_id, title, color FROM labels WHERE id IN ({})",
            placeholders(numeric.len())
        );

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to prepare statement: {e}"),
                operation: "find_labels".to_string(),
            })?;

        let rows = stmt
            .query_map(params_from_iter(numeric.iter()), row_to_label)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to query labels: {e}"),
                operation: "find_labels".to_string(),
            })?;

        let mut found = HashMap::new();
        for row in rows {
            let label = row.map_err(|e| RefmarkError::Store {
                message: format!("failed to read label row: {e}"),
                operation: "find_labels".to_string(),
            })?;
            found.insert(label.id.to_string(), DomainObject::Label(label));
        }
        Ok(found)
    }

    /// Fetches users by id, keyed by the raw identifier string.
    pub fn find_users(&self, ids: &[String]) -> Result<HashMap<String, DomainObject>> {
        let numeric = numeric_ids(ids);
        if numeric.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT id, username, name, state FROM users WHERE id IN ({})",
            placeholders(numeric.len())
        );

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to prepare statement: {e}"),
                operation: "find_users".to_string(),
            })?;

        let rows = stmt
            .query_map(params_from_iter(numeric.iter()), row_to_user)
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to query users: {e}"),
                operation: "find_users".to_string(),
            })?;

        let mut found = HashMap::new();
        for row in rows {
            let user = row.map_err(|e| RefmarkError::Store {
                message: format!("failed to read user row: {e}"),
                operation: "find_users".to_string(),
            })?;
            found.insert(user.id.to_string(), DomainObject::User(user));
        }
        Ok(found)
    }
}

impl ObjectStore for Database {
    fn find_many(
        &self,
        kind: ReferenceKind,
        ids: &[String],
    ) -> Result<HashMap<String, DomainObject>> {
        match kind {
            ReferenceKind::Issue => self.find_issues(ids),
            ReferenceKind::MergeRequest => self.find_merge_requests(ids),
            ReferenceKind::Commit => self.find_commits(ids),
            ReferenceKind::Label => self.find_labels(ids),
            ReferenceKind::User => self.find_users(ids),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy snapshots and statistics
// ---------------------------------------------------------------------------

impl Database {
    /// Retrieves a single project by id.
    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        use rusqlite::OptionalExtension;

        self.conn()
            .query_row(
                "SELECT id, path, visibility, external_tracker FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )
            .optional()
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to get project: {e}"),
                operation: "get_project".to_string(),
            })
    }

    /// Loads the project-id-to-visibility snapshot used by the policy engine.
    pub fn load_project_visibilities(&self) -> Result<HashMap<i64, ProjectVisibility>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, visibility FROM projects")
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to prepare statement: {e}"),
                operation: "load_project_visibilities".to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get("id")?;
                let vis_str: String = row.get("visibility")?;
                Ok((id, ProjectVisibility::from_str(&vis_str).unwrap_or_default()))
            })
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to query projects: {e}"),
                operation: "load_project_visibilities".to_string(),
            })?;

        let mut projects = HashMap::new();
        for row in rows {
            let (id, visibility) = row.map_err(|e| RefmarkError::Store {
                message: format!("failed to read project row: {e}"),
                operation: "load_project_visibilities".to_string(),
            })?;
            projects.insert(id, visibility);
        }
        Ok(projects)
    }

    /// Loads the user-id-to-projects membership snapshot used by the policy
    /// engine.
    pub fn load_memberships(&self) -> Result<HashMap<i64, HashSet<i64>>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT user_id, project_id FROM memberships")
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to prepare statement: {e}"),
                operation: "load_memberships".to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>("user_id")?, row.get::<_, i64>("project_id")?))
            })
            .map_err(|e| RefmarkError::Store {
                message: format!("failed to query memberships: {e}"),
                operation: "load_memberships".to_string(),
            })?;

        let mut memberships: HashMap<i64, HashSet<i64>> = HashMap::new();
        for row in rows {
            let (user_id, project_id) = row.map_err(|e| RefmarkError::Store {
                message: format!("failed to read membership row: {e}"),
                operation: "load_memberships".to_string(),
            })?;
            memberships.entry(user_id).or_default().insert(project_id);
        }
        Ok(memberships)
    }

    /// Returns row counts per table and the database size.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<u64> {
            self.conn()
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get::<_, i64>(0)
                })
                .map(|n| n as u64)
                .map_err(|e| RefmarkError::Store {
                    message: format!("failed to count {table}: {e}"),
                    operation: "get_stats".to_string(),
                })
        };

        Ok(StoreStats {
            project_count: count("projects")?,
            issue_count: count("issues")?,
            merge_request_count: count("merge_requests")?,
            commit_count: count("commits")?,
            label_count: count("labels")?,
            user_count: count("users")?,
            membership_count: count("memberships")?,
            db_size_bytes: self.size()?,
        })
    }
}
