use super::{extract_numeric_id, ReferenceParser};
use crate::document::ReferenceNode;
use crate::errors::Result;
use crate::types::ReferenceKind;

/// Parser for label references (`data-label`).
pub struct LabelParser;

impl ReferenceParser for LabelParser {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Label
    }

    fn extract_id(&self, node: &ReferenceNode) -> Result<String> {
        extract_numeric_id(node, self.attribute())
    }
}
