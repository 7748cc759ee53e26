//! Typed view over the JSON syntax trees produced by the language server.
//!
//! The language server answers a syntax tree request with a JSON document in
//! which every node is an object tagged by a string `kind`. Child nodes hang
//! off arbitrary fields, either directly or inside arrays:
//!
//! ```json
//! {
//!   "kind": "FunctionDefinition",
//!   "metadata": { "kind": "Metadata", "documentationString": { ... } },
//!   "qualifierList": [{ "kind": "PublicKeyword", "value": "public" }],
//!   "functionName": { "kind": "IdentifierToken", "value": "greet" },
//!   "position": { "startLine": 3, "startColumn": 0, "endLine": 5, "endColumn": 1 },
//!   "functionBody": { ... }
//! }
//! ```
//!
//! [`SyntaxNode::from_json`] keeps only what the documentation passes care
//! about: the [`NodeKind`] (a closed set, everything else is
//! [`NodeKind::Other`]), the position, whether a documentation `metadata`
//! block is attached, the visibility tokens and the declared name. Children
//! are kept in field order so a walk over the tree follows source order.
//!
//! Walking is done by [`walk`] with a [`Visitor`].

mod walk;

pub use walk::{walk, Visitor};

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SyntaxTreeError};

/// Fields that carry the declared name of a node, by node kind.
const NAME_FIELDS: [&str; 4] = ["functionName", "typeName", "className", "methodName"];

const PUBLIC: &str = "public";

/// Node tags the documentation passes react to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ModulePart,
    FunctionDefinition,
    TypeDefinition(TypeShape),
    ClassDefinition,
    MethodDeclaration,
    ObjectMethodDefinition,
    /// Any tag outside the set above, kept verbatim.
    Other(String),
}

/// What a `TypeDefinition` defines, read from its `typeDescriptor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Record,
    Object,
    Other,
}

impl NodeKind {
    fn from_tag(tag: &str, object: &Map<String, Value>) -> NodeKind {
        match tag {
            "ModulePart" => NodeKind::ModulePart,
            "FunctionDefinition" => NodeKind::FunctionDefinition,
            "TypeDefinition" => NodeKind::TypeDefinition(TypeShape::of(object)),
            "ClassDefinition" => NodeKind::ClassDefinition,
            "MethodDeclaration" => NodeKind::MethodDeclaration,
            "ObjectMethodDefinition" => NodeKind::ObjectMethodDefinition,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

impl TypeShape {
    fn of(type_definition: &Map<String, Value>) -> TypeShape {
        match type_definition
            .get("typeDescriptor")
            .and_then(|descriptor| descriptor.get("kind"))
            .and_then(Value::as_str)
        {
            Some("RecordTypeDesc") => TypeShape::Record,
            Some("ObjectTypeDesc") => TypeShape::Object,
            _ => TypeShape::Other,
        }
    }
}

/// Zero-based source range of a node.
///
/// Every field is optional: the language server occasionally omits parts of a
/// position and consumers decide what to do with an incomplete one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePosition {
    #[serde(default)]
    pub start_line: Option<u32>,
    #[serde(default)]
    pub start_column: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default)]
    pub end_column: Option<u32>,
}

impl NodePosition {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        NodePosition {
            start_line: Some(start_line),
            start_column: Some(start_column),
            end_line: Some(end_line),
            end_column: Some(end_column),
        }
    }

    /// Reads each field on its own; a missing or out-of-range field does not
    /// affect the others.
    fn from_json(position: &Value) -> Self {
        let field = |name: &str| {
            position
                .get(name)
                .and_then(Value::as_u64)
                .and_then(|value| u32::try_from(value).ok())
        };

        NodePosition {
            start_line: field("startLine"),
            start_column: field("startColumn"),
            end_line: field("endLine"),
            end_column: field("endColumn"),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.start_line.is_some()
            && self.start_column.is_some()
            && self.end_line.is_some()
            && self.end_column.is_some()
    }
}

/// An immutable syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub position: NodePosition,
    /// A documentation `metadata` block is attached.
    pub documented: bool,
    /// Values of the `qualifierList` tokens, in order.
    pub qualifiers: Vec<String>,
    /// Value of the `visibilityQualifier` token of type and class definitions.
    pub visibility: Option<String>,
    pub name: Option<String>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Build a tree from the JSON value of a syntax tree node.
    ///
    /// The root must be an object with a string `kind`. Below the root,
    /// anything that is not a kind-tagged object (or an array of them) is
    /// ignored rather than rejected.
    pub fn from_json(value: &Value) -> Result<SyntaxNode> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(SyntaxTreeError::NotANode {
                    found: json_type_name(other),
                })
            }
        };

        match object.get("kind").and_then(Value::as_str) {
            Some(tag) => Ok(SyntaxNode::from_object(tag, object)),
            None => Err(SyntaxTreeError::NotANode {
                found: "an object without a kind",
            }),
        }
    }

    fn from_object(tag: &str, object: &Map<String, Value>) -> SyntaxNode {
        let position = object
            .get("position")
            .map(NodePosition::from_json)
            .unwrap_or_default();

        let qualifiers = object
            .get("qualifierList")
            .and_then(Value::as_array)
            .map(|tokens| tokens.iter().filter_map(token_value).collect())
            .unwrap_or_default();

        let name = NAME_FIELDS
            .iter()
            .find_map(|field| object.get(*field).and_then(token_value));

        let mut children = Vec::new();
        for value in object.values() {
            collect_nodes(value, &mut children);
        }

        SyntaxNode {
            kind: NodeKind::from_tag(tag, object),
            position,
            documented: object.get("metadata").is_some_and(|metadata| !metadata.is_null()),
            qualifiers,
            visibility: object.get("visibilityQualifier").and_then(token_value),
            name,
            children,
        }
    }

    /// Marked `public` either through its qualifier list or its visibility qualifier.
    pub fn is_public(&self) -> bool {
        self.visibility.as_deref() == Some(PUBLIC) || self.qualifiers.iter().any(|q| q == PUBLIC)
    }

    pub fn is_documented(&self) -> bool {
        self.documented
    }

    /// Public and carrying documentation.
    pub fn is_documented_api(&self) -> bool {
        self.is_public() && self.is_documented()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl FromStr for SyntaxNode {
    type Err = SyntaxTreeError;

    fn from_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        SyntaxNode::from_json(&value)
    }
}

fn collect_nodes(value: &Value, nodes: &mut Vec<SyntaxNode>) {
    match value {
        Value::Object(object) => {
            if let Some(tag) = object.get("kind").and_then(Value::as_str) {
                nodes.push(SyntaxNode::from_object(tag, object));
            }
        }
        Value::Array(values) => {
            for value in values {
                collect_nodes(value, nodes);
            }
        }
        _ => {}
    }
}

fn token_value(token: &Value) -> Option<String> {
    token.get("value").and_then(Value::as_str).map(String::from)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Response of the language server's syntax tree request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTreeResponse {
    #[serde(default)]
    pub parse_success: Option<bool>,
    #[serde(default)]
    pub syntax_tree: Option<Value>,
}

impl SyntaxTreeResponse {
    /// The typed tree, or `None` when the source did not parse or no tree was sent.
    pub fn root(&self) -> Result<Option<SyntaxNode>> {
        if self.parse_success == Some(false) {
            return Ok(None);
        }

        match &self.syntax_tree {
            None | Some(Value::Null) => Ok(None),
            Some(tree) => SyntaxNode::from_json(tree).map(Some),
        }
    }
}
