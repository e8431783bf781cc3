use refmark::types::*;

#[test]
fn reference_kind_as_str_roundtrip() {
    for kind in ReferenceKind::ALL {
        let s = kind.as_str();
        let parsed = ReferenceKind::from_str(s)
            .unwrap_or_else(|| panic!("failed to parse ReferenceKind from '{}'", s));
        assert_eq!(kind, parsed, "roundtrip failed for ReferenceKind::{}", s);
    }
}

#[test]
fn reference_kind_from_str_unknown_returns_none() {
    assert!(ReferenceKind::from_str("unknown_kind").is_none());
    assert!(ReferenceKind::from_str("").is_none());
}

#[test]
fn reference_kind_attributes_are_distinct() {
    let attrs: Vec<&str> = ReferenceKind::ALL.iter().map(|k| k.attribute()).collect();
    for attr in &attrs {
        assert!(attr.starts_with("data-"), "'{attr}' should be a data attribute");
        assert_eq!(
            attrs.iter().filter(|a| *a == attr).count(),
            1,
            "attribute '{attr}' must map to exactly one kind"
        );
    }
}

#[test]
fn project_visibility_roundtrip() {
    for vis in [
        ProjectVisibility::Public,
        ProjectVisibility::Internal,
        ProjectVisibility::Private,
    ] {
        let parsed = ProjectVisibility::from_str(vis.as_str())
            .unwrap_or_else(|| panic!("failed to parse visibility '{}'", vis.as_str()));
        assert_eq!(vis, parsed);
    }
    assert!(ProjectVisibility::from_str("secret").is_none());
}

#[test]
fn user_state_roundtrip() {
    for state in [UserState::Active, UserState::Blocked] {
        let parsed = UserState::from_str(state.as_str())
            .unwrap_or_else(|| panic!("failed to parse state '{}'", state.as_str()));
        assert_eq!(state, parsed);
    }
    assert!(UserState::from_str("dormant").is_none());
}

#[test]
fn domain_object_kind_and_project() {
    let issue = DomainObject::Issue(Issue {
        id: 1,
        project_id: 7,
        title: "An issue".to_string(),
        confidential: false,
        author_id: None,
        assignee_id: None,
        external_tracker: false,
    });
    assert_eq!(issue.kind(), ReferenceKind::Issue);
    assert_eq!(issue.project_id(), Some(7));

    let user = DomainObject::User(User {
        id: 3,
        username: "alice".to_string(),
        name: "Alice".to_string(),
        state: UserState::Active,
    });
    assert_eq!(user.kind(), ReferenceKind::User);
    assert_eq!(user.project_id(), None, "users are not project-scoped");
}

#[test]
fn domain_object_describe_shortens_commit_shas() {
    let commit = DomainObject::Commit(Commit {
        sha: "a1b2c3d4e5f6a7b8c9d0a1b2c3d4e5f6a7b8c9d0".to_string(),
        project_id: 1,
        title: "Fix".to_string(),
        author_name: "dev".to_string(),
    });
    assert_eq!(commit.describe(), "commit a1b2c3d4 \"Fix\"");
}

#[test]
fn viewer_constructors() {
    assert!(Viewer::anonymous().is_anonymous());
    assert!(!Viewer::user(5).is_anonymous());
    assert_eq!(Viewer::user(5).id, Some(5));
}

#[test]
fn fixture_set_parses_with_defaults() {
    let fixtures: FixtureSet = serde_json::from_str(
        r#"{
            "projects": [{"id": 1, "path": "acme/widgets"}],
            "issues": [{"id": 2, "project_id": 1, "title": "A bug"}]
        }"#,
    )
    .expect("partial fixture sets are valid");

    assert_eq!(fixtures.projects.len(), 1);
    assert_eq!(
        fixtures.projects[0].visibility,
        ProjectVisibility::Private,
        "visibility defaults to private"
    );
    assert!(!fixtures.issues[0].confidential);
    assert!(fixtures.users.is_empty());
}
