use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{RefmarkError, Result};

/// A marked span in a rendered document pointing at a domain object.
///
/// Produced by the (out-of-scope) markup rendering pipeline: each node
/// carries a type tag and type-specific attributes such as `data-issue`.
/// The resolution pipeline holds a read-only view and never mutates nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceNode {
    /// The node's reference-type tag, e.g. `"issue"`.
    #[serde(rename = "type")]
    pub kind_tag: String,
    /// Raw, unvalidated node attributes.
    #[serde(default)]
    pub attrs: HashMap<String, String>,
}

impl ReferenceNode {
    /// Creates a node with a type tag and a single identifier attribute.
    pub fn new(kind_tag: &str, attr_name: &str, attr_value: &str) -> Self {
        let mut attrs = HashMap::new();
        attrs.insert(attr_name.to_string(), attr_value.to_string());
        ReferenceNode {
            kind_tag: kind_tag.to_string(),
            attrs,
        }
    }

    /// Returns the value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// The reference nodes of one rendered document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    nodes: Vec<ReferenceNode>,
}

impl Document {
    /// Creates a document from an ordered sequence of reference nodes.
    pub fn new(nodes: Vec<ReferenceNode>) -> Self {
        Document { nodes }
    }

    /// Parses a document from its JSON representation.
    pub fn from_json(json: &str) -> Result<Document> {
        serde_json::from_str(json).map_err(|e| RefmarkError::Document {
            message: format!("failed to parse document: {e}"),
        })
    }

    /// Returns the reference nodes in document order.
    pub fn nodes(&self) -> &[ReferenceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
