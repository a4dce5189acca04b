//! Recursive form-schema tree.
//!
//! The `form` section of a configuration document is a JSON-schema-like tree
//! of [`SchemaNode`]s addressed by dot-joined key paths. Traversal never
//! fails on a missing key: intermediate segments are synthesized as object
//! nodes and a missing terminal segment becomes a string leaf, preserving
//! any sibling content already present.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `form` section of a document: the schema root plus opaque UI hints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormSection {
    /// Root of the form schema tree.
    #[serde(default)]
    pub form: SchemaNode,
    /// Renderer hints, not interpreted by the core.
    #[serde(default = "empty_object")]
    pub ui: Value,
}

impl Default for FormSection {
    fn default() -> Self {
        Self {
            form: SchemaNode::default(),
            ui: empty_object(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// One node of the form schema tree.
///
/// Every field is optional so that a freshly synthesized node serializes as
/// `{}`; the editing layer fills in only what a given binding kind needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaNode {
    /// JSON-schema primitive type ("string", "object", ...).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Title displayed to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer description displayed to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value, any JSON type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Child properties, keyed in authoring order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    /// Path selector discriminator ("dataset" or "references").
    #[serde(rename = "pathType", skip_serializing_if = "Option::is_none")]
    pub path_type: Option<String>,
    /// Process id constraining selectable datasets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    /// File glob constraining selectable files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Whether multiple files may be selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
}

impl SchemaNode {
    /// A synthesized internal node: a bare object with no other metadata.
    pub fn object() -> Self {
        Self {
            node_type: Some("object".to_string()),
            ..Self::default()
        }
    }

    /// A synthesized terminal node: a string leaf titled after its key.
    pub fn string_leaf(key: &str) -> Self {
        Self {
            node_type: Some("string".to_string()),
            title: Some(key.to_string()),
            default: Some(Value::String(key.to_string())),
            ..Self::default()
        }
    }

    /// Walk to the node at `path`, creating missing segments on demand.
    ///
    /// Missing internal segments are created as object nodes; a missing
    /// terminal segment is created as a string leaf. Existing nodes are
    /// returned untouched, so repeated traversal is idempotent.
    pub fn ensure_node<S: AsRef<str>>(&mut self, path: &[S]) -> &mut SchemaNode {
        let mut pointer = self;
        let last = path.len().saturating_sub(1);
        for (depth, key) in path.iter().enumerate() {
            let key = key.as_ref();
            pointer = pointer.properties.entry(key.to_string()).or_insert_with(|| {
                if depth == last {
                    SchemaNode::string_leaf(key)
                } else {
                    SchemaNode::object()
                }
            });
        }
        pointer
    }

    /// Read-only lookup of the node at `path`, without synthesis.
    pub fn node_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&SchemaNode> {
        let mut pointer = self;
        for key in path {
            pointer = pointer.properties.get(key.as_ref())?;
        }
        Some(pointer)
    }

    /// Clone of this node with its children stripped.
    ///
    /// Fragments are what the editing session holds for each ancestor of a
    /// form-entry binding; children are re-attached when the fragment is
    /// merged back into a document tree.
    pub fn fragment(&self) -> SchemaNode {
        let mut fragment = self.clone();
        fragment.properties = IndexMap::new();
        fragment
    }

    /// Insert `node` at `path` without overwriting anything already present.
    ///
    /// At each depth the existing property wins; only absent keys are filled
    /// in, the terminal one with `node` itself and intermediates as object
    /// nodes.
    pub fn merge_missing<S: AsRef<str>>(&mut self, path: &[S], node: SchemaNode) {
        if path.is_empty() {
            return;
        }
        let mut pointer = self;
        let last = path.len() - 1;
        for (depth, key) in path.iter().enumerate() {
            let key = key.as_ref();
            pointer = pointer.properties.entry(key.to_string()).or_insert_with(|| {
                if depth == last {
                    node.clone()
                } else {
                    SchemaNode::object()
                }
            });
        }
    }
}
