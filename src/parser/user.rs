use super::{extract_numeric_id, ReferenceParser};
use crate::document::ReferenceNode;
use crate::errors::Result;
use crate::types::ReferenceKind;

/// Parser for user references (`data-user`).
pub struct UserParser;

impl ReferenceParser for UserParser {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::User
    }

    fn extract_id(&self, node: &ReferenceNode) -> Result<String> {
        extract_numeric_id(node, self.attribute())
    }
}
