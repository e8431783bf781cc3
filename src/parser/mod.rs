mod commit;
mod issue;
mod label;
mod merge_request;
/// Reference-type parser module.
///
/// One parser per reference kind: each knows how to read its identifier
/// attribute from a reference node and how to decide whether a viewer may
/// see the resolved object.
mod user;

pub use commit::CommitParser;
pub use issue::IssueParser;
pub use label::LabelParser;
pub use merge_request::MergeRequestParser;
pub use user::UserParser;

use tracing::warn;

use crate::config::RefmarkConfig;
use crate::document::ReferenceNode;
use crate::errors::{RefmarkError, Result};
use crate::loader::BatchLoader;
use crate::policy::PolicyEngine;
use crate::types::{DomainObject, RefKey, ReferenceKind, Viewer};

/// Trait for reference-type parsers.
///
/// Each implementation handles a single reference kind, extracting raw
/// identifiers from nodes of that kind and gating resolved objects behind
/// the visibility policy.
pub trait ReferenceParser: Send + Sync {
    /// The reference kind this parser handles.
    fn kind(&self) -> ReferenceKind;

    /// The node attribute carrying this kind's identifier.
    fn attribute(&self) -> &'static str {
        self.kind().attribute()
    }

    /// Reads the raw identifier from a reference node.
    ///
    /// Fails with `MalformedReference` when the attribute is missing or its
    /// value cannot be an identifier of this kind. Callers skip the node and
    /// continue; one bad node never fails the whole document.
    fn extract_id(&self, node: &ReferenceNode) -> Result<String>;

    /// Registers the identifier for batched loading, returning the
    /// deduplicated key shared by all occurrences of the same identifier.
    fn build_lazy_reference(&self, loader: &mut BatchLoader, raw_id: &str) -> RefKey {
        loader.register(self.kind(), raw_id)
    }

    /// Decides whether the viewer may see the resolved object.
    ///
    /// The default delegates to the policy engine and fails closed on policy
    /// errors. Kinds with objects that carry no internal authorization
    /// override this.
    fn can_view(&self, viewer: &Viewer, object: &DomainObject, policy: &dyn PolicyEngine) -> bool {
        policy_verdict(viewer, object, policy)
    }
}

/// Asks the policy engine for a verdict, treating errors as a denial.
pub(crate) fn policy_verdict(
    viewer: &Viewer,
    object: &DomainObject,
    policy: &dyn PolicyEngine,
) -> bool {
    match policy.can_read(viewer, object) {
        Ok(allowed) => allowed,
        Err(e) => {
            warn!(
                kind = object.kind().as_str(),
                error = %e,
                "policy query failed; denying access"
            );
            false
        }
    }
}

/// Reads a required attribute from a node.
pub(crate) fn require_attr<'a>(node: &'a ReferenceNode, attribute: &'static str) -> Result<&'a str> {
    node.attr(attribute)
        .ok_or_else(|| RefmarkError::MalformedReference {
            message: "identifier attribute missing".to_string(),
            attribute: attribute.to_string(),
        })
}

/// Reads and validates a numeric identifier attribute.
pub(crate) fn extract_numeric_id(node: &ReferenceNode, attribute: &'static str) -> Result<String> {
    let raw = require_attr(node, attribute)?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(raw.to_string()),
        _ => Err(RefmarkError::MalformedReference {
            message: format!("'{}' is not a valid numeric identifier", raw),
            attribute: attribute.to_string(),
        }),
    }
}

/// Registry of all active reference-type parsers.
///
/// Dispatches to the correct parser based on a node's type tag. Built once
/// per processing context and read-only during resolution.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ReferenceParser>>,
}

impl ParserRegistry {
    /// Creates a registry with all built-in reference-type parsers.
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(IssueParser),
                Box::new(MergeRequestParser),
                Box::new(CommitParser),
                Box::new(LabelParser),
                Box::new(UserParser),
            ],
        }
    }

    /// Creates a registry containing only the kinds enabled in the config.
    pub fn from_config(config: &RefmarkConfig) -> Self {
        let mut registry = Self::new();
        registry
            .parsers
            .retain(|p| config.kind_enabled(p.kind()));
        registry
    }

    /// Returns the parser for a node's type tag.
    ///
    /// Fails with `UnknownReferenceType` when no parser is registered for
    /// the tag; disabled kinds behave exactly like unregistered ones.
    pub fn parser_for(&self, kind_tag: &str) -> Result<&dyn ReferenceParser> {
        self.parsers
            .iter()
            .find(|p| p.kind().as_str() == kind_tag)
            .map(|p| p.as_ref())
            .ok_or_else(|| RefmarkError::UnknownReferenceType {
                kind: kind_tag.to_string(),
            })
    }

    /// Returns the type tags of all registered kinds.
    pub fn supported_kinds(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.kind().as_str()).collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
