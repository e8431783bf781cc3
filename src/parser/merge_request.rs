use super::{extract_numeric_id, ReferenceParser};
use crate::document::ReferenceNode;
use crate::errors::Result;
use crate::types::ReferenceKind;

/// Parser for merge request references (`data-merge-request`).
pub struct MergeRequestParser;

impl ReferenceParser for MergeRequestParser {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::MergeRequest
    }

    fn extract_id(&self, node: &ReferenceNode) -> Result<String> {
        extract_numeric_id(node, self.attribute())
    }
}
