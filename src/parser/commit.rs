use super::{require_attr, ReferenceParser};
use crate::document::ReferenceNode;
use crate::errors::{RefmarkError, Result};
use crate::types::ReferenceKind;

/// Shortest commit SHA prefix accepted as an identifier.
const MIN_SHA_LEN: usize = 7;

/// Longest (full SHA-1) commit identifier.
const MAX_SHA_LEN: usize = 40;

/// Parser for commit references (`data-commit`).
pub struct CommitParser;

impl ReferenceParser for CommitParser {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Commit
    }

    fn extract_id(&self, node: &ReferenceNode) -> Result<String> {
        let raw = require_attr(node, self.attribute())?;

        let valid = (MIN_SHA_LEN..=MAX_SHA_LEN).contains(&raw.len())
            && raw.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(RefmarkError::MalformedReference {
                message: format!("'{}' is not a valid commit SHA", raw),
                attribute: self.attribute().to_string(),
            });
        }

        Ok(raw.to_ascii_lowercase())
    }
}
