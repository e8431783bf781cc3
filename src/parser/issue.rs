use super::{extract_numeric_id, policy_verdict, ReferenceParser};
use crate::document::ReferenceNode;
use crate::errors::Result;
use crate::policy::PolicyEngine;
use crate::types::{DomainObject, ReferenceKind, Viewer};

/// Parser for issue references (`data-issue`).
pub struct IssueParser;

impl ReferenceParser for IssueParser {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Issue
    }

    fn extract_id(&self, node: &ReferenceNode) -> Result<String> {
        extract_numeric_id(node, self.attribute())
    }

    fn can_view(&self, viewer: &Viewer, object: &DomainObject, policy: &dyn PolicyEngine) -> bool {
        // It is not possible to check access rights for issues tracked
        // externally, so those are always viewable.
        if let DomainObject::Issue(issue) = object {
            if issue.external_tracker {
                return true;
            }
        }

        policy_verdict(viewer, object, policy)
    }
}
