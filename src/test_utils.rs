//! Shared test utilities for doclens.
//!
//! Builders for the JSON syntax trees the language server sends, so tests can
//! describe a source file as a list of declarations instead of spelling out
//! every token. It is only compiled when running tests.

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::syntax::SyntaxNode;

/// Position spanning three lines starting at `line`, column 0.
pub fn position(line: u32) -> Value {
    json!({ "startLine": line, "startColumn": 0, "endLine": line + 2, "endColumn": 1 })
}

pub fn public_token() -> Value {
    json!({ "kind": "PublicKeyword", "value": "public", "isMissing": false })
}

/// A documentation block as attached to a declaration.
pub fn doc_metadata() -> Value {
    json!({
        "kind": "Metadata",
        "documentationString": {
            "kind": "MarkdownDocumentation",
            "documentationLines": [
                { "kind": "MarkdownDocumentationLine", "documentElements": [] }
            ]
        },
        "annotations": []
    })
}

fn identifier(name: &str) -> Value {
    json!({ "kind": "IdentifierToken", "value": name })
}

fn qualifiers(public: bool) -> Value {
    if public {
        json!([public_token()])
    } else {
        json!([])
    }
}

fn with_metadata(mut node: Value, documented: bool) -> Value {
    if documented {
        node["metadata"] = doc_metadata();
    }
    node
}

fn visibility(mut node: Value, public: bool) -> Value {
    if public {
        node["visibilityQualifier"] = public_token();
    }
    node
}

pub fn function(name: &str, public: bool, documented: bool, line: u32) -> Value {
    with_metadata(
        json!({
            "kind": "FunctionDefinition",
            "qualifierList": qualifiers(public),
            "functionKeyword": { "kind": "FunctionKeyword", "value": "function" },
            "functionName": identifier(name),
            "functionBody": { "kind": "FunctionBodyBlock", "statements": [] },
            "position": position(line),
        }),
        documented,
    )
}

pub fn method_declaration(name: &str, public: bool, documented: bool, line: u32) -> Value {
    with_metadata(
        json!({
            "kind": "MethodDeclaration",
            "qualifierList": qualifiers(public),
            "methodName": identifier(name),
            "position": position(line),
        }),
        documented,
    )
}

pub fn object_method(name: &str, public: bool, documented: bool, line: u32) -> Value {
    with_metadata(
        json!({
            "kind": "ObjectMethodDefinition",
            "qualifierList": qualifiers(public),
            "methodName": identifier(name),
            "functionBody": { "kind": "FunctionBodyBlock", "statements": [] },
            "position": position(line),
        }),
        documented,
    )
}

fn type_definition(
    name: &str,
    descriptor: Value,
    public: bool,
    documented: bool,
    line: u32,
) -> Value {
    let node = json!({
        "kind": "TypeDefinition",
        "typeKeyword": { "kind": "TypeKeyword", "value": "type" },
        "typeName": identifier(name),
        "typeDescriptor": descriptor,
        "position": position(line),
    });
    with_metadata(visibility(node, public), documented)
}

pub fn record_type(name: &str, public: bool, documented: bool, line: u32, members: Vec<Value>) -> Value {
    type_definition(
        name,
        json!({ "kind": "RecordTypeDesc", "fields": members }),
        public,
        documented,
        line,
    )
}

pub fn object_type(name: &str, public: bool, documented: bool, line: u32, members: Vec<Value>) -> Value {
    type_definition(
        name,
        json!({ "kind": "ObjectTypeDesc", "members": members }),
        public,
        documented,
        line,
    )
}

pub fn class(name: &str, public: bool, documented: bool, line: u32, members: Vec<Value>) -> Value {
    let node = json!({
        "kind": "ClassDefinition",
        "classKeyword": { "kind": "ClassKeyword", "value": "class" },
        "className": identifier(name),
        "members": members,
        "position": position(line),
    });
    with_metadata(visibility(node, public), documented)
}

pub fn module(members: Vec<Value>) -> Value {
    json!({
        "kind": "ModulePart",
        "imports": [],
        "members": members,
        "eofToken": { "kind": "EofToken" },
    })
}

/// A typed module tree holding `members`.
pub fn tree(members: Vec<Value>) -> SyntaxNode {
    SyntaxNode::from_json(&module(members)).expect("Failed to build test syntax tree")
}

/// Creates a non-hidden project directory inside a fresh temp directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn create_test_project_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let project_dir = temp_dir.path().join("project");
    fs::create_dir(&project_dir).expect("Failed to create project subdirectory");
    (temp_dir, project_dir)
}
