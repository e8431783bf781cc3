use serde::{Deserialize, Serialize};

/// Kinds of domain objects a document can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceKind {
    Issue,
    MergeRequest,
    Commit,
    Label,
    User,
}

impl ReferenceKind {
    /// All kinds, in the fixed order used when dispatching batched fetches.
    pub const ALL: [ReferenceKind; 5] = [
        ReferenceKind::Issue,
        ReferenceKind::MergeRequest,
        ReferenceKind::Commit,
        ReferenceKind::Label,
        ReferenceKind::User,
    ];

    /// Returns the type tag used by reference nodes of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Issue => "issue",
            ReferenceKind::MergeRequest => "merge_request",
            ReferenceKind::Commit => "commit",
            ReferenceKind::Label => "label",
            ReferenceKind::User => "user",
        }
    }

    /// Parses a type tag into a `ReferenceKind`, returning `None` for unrecognized values.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<ReferenceKind> {
        match s {
            "issue" => Some(ReferenceKind::Issue),
            "merge_request" => Some(ReferenceKind::MergeRequest),
            "commit" => Some(ReferenceKind::Commit),
            "label" => Some(ReferenceKind::Label),
            "user" => Some(ReferenceKind::User),
            _ => None,
        }
    }

    /// Returns the node attribute carrying this kind's identifier, e.g. `data-issue`.
    pub fn attribute(&self) -> &'static str {
        match self {
            ReferenceKind::Issue => "data-issue",
            ReferenceKind::MergeRequest => "data-merge-request",
            ReferenceKind::Commit => "data-commit",
            ReferenceKind::Label => "data-label",
            ReferenceKind::User => "data-user",
        }
    }
}

/// Visibility level of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectVisibility {
    Public,
    Internal,
    #[default]
    Private,
}

impl ProjectVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Private => "private",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "internal" => Some(Self::Internal),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// State of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    #[default]
    Active,
    Blocked,
}

impl UserState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// A project that owns referenceable objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub path: String,
    #[serde(default)]
    pub visibility: ProjectVisibility,
    /// True when issues for this project live in an external tracker whose
    /// access rights cannot be checked.
    #[serde(default)]
    pub external_tracker: bool,
}

/// An issue, possibly mirrored from an external tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    #[serde(default)]
    pub confidential: bool,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    /// Copied from the owning project at load time. External-tracker issues
    /// carry no internal authorization and are always viewable.
    #[serde(default)]
    pub external_tracker: bool,
}

/// A merge request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    #[serde(default)]
    pub author_id: Option<i64>,
}

/// A commit, identified by its hex SHA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub project_id: i64,
    pub title: String,
    pub author_name: String,
}

/// A project label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub color: String,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub state: UserState,
}

/// A resolved domain object of any reference kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainObject {
    Issue(Issue),
    MergeRequest(MergeRequest),
    Commit(Commit),
    Label(Label),
    User(User),
}

impl DomainObject {
    /// Returns the reference kind this object belongs to.
    pub fn kind(&self) -> ReferenceKind {
        match self {
            DomainObject::Issue(_) => ReferenceKind::Issue,
            DomainObject::MergeRequest(_) => ReferenceKind::MergeRequest,
            DomainObject::Commit(_) => ReferenceKind::Commit,
            DomainObject::Label(_) => ReferenceKind::Label,
            DomainObject::User(_) => ReferenceKind::User,
        }
    }

    /// Returns the owning project id, if the object is project-scoped.
    pub fn project_id(&self) -> Option<i64> {
        match self {
            DomainObject::Issue(i) => Some(i.project_id),
            DomainObject::MergeRequest(m) => Some(m.project_id),
            DomainObject::Commit(c) => Some(c.project_id),
            DomainObject::Label(l) => Some(l.project_id),
            DomainObject::User(_) => None,
        }
    }

    /// Short human-readable description used by CLI output.
    pub fn describe(&self) -> String {
        match self {
            DomainObject::Issue(i) => format!("issue #{} \"{}\"", i.id, i.title),
            DomainObject::MergeRequest(m) => format!("merge request !{} \"{}\"", m.id, m.title),
            DomainObject::Commit(c) => {
                let short = &c.sha[..c.sha.len().min(8)];
                format!("commit {} \"{}\"", short, c.title)
            }
            DomainObject::Label(l) => format!("label ~{} \"{}\"", l.id, l.title),
            DomainObject::User(u) => format!("user @{}", u.username),
        }
    }
}

/// The identity a document is being resolved for.
///
/// `None` means an anonymous (signed-out) viewer. Passed explicitly through
/// the whole pipeline and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: Option<i64>,
}

impl Viewer {
    /// A signed-in viewer with the given user id.
    pub fn user(id: i64) -> Self {
        Viewer { id: Some(id) }
    }

    /// An anonymous viewer.
    pub fn anonymous() -> Self {
        Viewer { id: None }
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }
}

/// Key identifying one deduplicated lazy reference: (kind, raw identifier).
pub type RefKey = (ReferenceKind, String);

/// Resolution state of a lazy reference.
///
/// Transitions `Pending -> Resolved` or `Pending -> Missing`, exactly once,
/// and never backward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolutionState {
    Pending,
    Resolved(DomainObject),
    Missing,
}

/// A placeholder for a referenced object that is fetched later, in a batch.
///
/// Created once per distinct (kind, raw id) pair observed during a scan;
/// every node referencing that pair shares the same entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazyReference {
    pub kind: ReferenceKind,
    pub raw_id: String,
    pub state: ResolutionState,
}

/// Why a reference node was excluded from the resolved output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// No parser is registered for the node's type tag.
    UnknownKind { kind: String },
    /// The identifier attribute was missing or unparsable.
    Malformed { detail: String },
    /// The backing store had no object for the identifier (or its kind's
    /// fetch failed).
    Missing,
    /// The viewer is not allowed to see the resolved object.
    Denied,
}

/// A reference node that resolved to a viewer-visible object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedReference {
    /// Position of the node in the document's reference-node sequence.
    pub node_index: usize,
    pub kind: ReferenceKind,
    pub raw_id: String,
    pub object: DomainObject,
}

/// A reference node dropped during the pass, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedReference {
    pub node_index: usize,
    /// The node's raw type tag (kept even when unrecognized).
    pub kind_tag: String,
    pub reason: ExclusionReason,
}

/// Result of resolving one document for one viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// Included nodes, in document order.
    pub included: Vec<ResolvedReference>,
    /// Excluded nodes, in document order.
    pub excluded: Vec<ExcludedReference>,
    /// Kinds whose batched fetch failed; their nodes surface as `Missing`.
    pub degraded_kinds: Vec<ReferenceKind>,
    pub total: usize,
    pub included_count: usize,
    pub duration_ms: u64,
}

/// Fixture data accepted by `refmark seed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub merge_requests: Vec<MergeRequest>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

/// Membership of a user in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: i64,
    pub project_id: i64,
}

/// Counts of stored objects, reported by the CLI `status` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub project_count: u64,
    pub issue_count: u64,
    pub merge_request_count: u64,
    pub commit_count: u64,
    pub label_count: u64,
    pub user_count: u64,
    pub membership_count: u64,
    pub db_size_bytes: u64,
}
