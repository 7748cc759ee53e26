//! Selection of the declarations that get a "Preview Docs" CodeLens.
//!
//! A declaration qualifies when it is public and carries a documentation
//! block. Containers (type and class definitions) also qualify when any of
//! their members does, so a record or class with documented API is reachable
//! from the editor even if the container itself has no documentation.
//!
//! Functions outside a container are decided when the walk enters them.
//! Containers are decided when the walk leaves them, after their members
//! have been seen. The output therefore follows traversal order: a function
//! appears at its own position in the file, a container after all of its
//! members.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::syntax::{walk, NodeKind, NodePosition, SyntaxNode, TypeShape, Visitor};

/// API documentation section a declaration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocCategory {
    Function,
    Class,
    Record,
    AbstractObject,
}

impl DocCategory {
    /// Directory of the generated API docs holding this category.
    pub fn directory(&self) -> &'static str {
        match self {
            DocCategory::Function => "functions",
            DocCategory::Class => "classes",
            DocCategory::Record => "records",
            DocCategory::AbstractObject => "abstractobjects",
        }
    }

    fn of_container(kind: &NodeKind) -> Option<DocCategory> {
        match kind {
            NodeKind::TypeDefinition(TypeShape::Record) => Some(DocCategory::Record),
            NodeKind::TypeDefinition(_) => Some(DocCategory::AbstractObject),
            NodeKind::ClassDefinition => Some(DocCategory::Class),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentableDeclaration {
    pub position: NodePosition,
    pub display_name: String,
    pub module_name: String,
    pub category: DocCategory,
}

/// Knobs for what counts as a documented member of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocPolicy {
    /// Only count documented functions inside a container when they are also public.
    pub inner_functions_require_public: bool,
}

impl From<&Settings> for DocPolicy {
    fn from(settings: &Settings) -> Self {
        DocPolicy {
            inner_functions_require_public: settings.inner_functions_require_public,
        }
    }
}

/// Collect every documentable declaration of `root`, in traversal order.
///
/// `module_name` is copied into each record unchanged.
pub fn documentable_declarations(
    root: &SyntaxNode,
    module_name: &str,
    policy: DocPolicy,
) -> Vec<DocumentableDeclaration> {
    let mut visitor = DocVisibilityVisitor::new(module_name, policy);
    walk(root, &mut visitor);

    debug!(
        module = module_name,
        count = visitor.declarations.len(),
        "collected documentable declarations"
    );

    visitor.declarations
}

#[derive(Debug, Default)]
struct ContainerFrame {
    has_inner_documented_child: bool,
}

struct DocVisibilityVisitor<'a> {
    module_name: &'a str,
    policy: DocPolicy,
    /// One frame per container currently being walked, innermost last.
    containers: Vec<ContainerFrame>,
    declarations: Vec<DocumentableDeclaration>,
}

impl<'a> DocVisibilityVisitor<'a> {
    fn new(module_name: &'a str, policy: DocPolicy) -> Self {
        DocVisibilityVisitor {
            module_name,
            policy,
            containers: Vec::new(),
            declarations: Vec::new(),
        }
    }

    fn inside_container(&self) -> bool {
        !self.containers.is_empty()
    }

    fn mark_inner_documented_child(&mut self) {
        if let Some(frame) = self.containers.last_mut() {
            frame.has_inner_documented_child = true;
        }
    }

    /// Returns whether a record was emitted; nameless nodes never are.
    fn emit(&mut self, node: &SyntaxNode, category: DocCategory) -> bool {
        let Some(name) = node.name() else {
            debug!(?category, position = ?node.position, "skipping declaration without a name");
            return false;
        };

        self.declarations.push(DocumentableDeclaration {
            position: node.position,
            display_name: name.to_string(),
            module_name: self.module_name.to_string(),
            category,
        });
        true
    }

    fn open_container(&mut self) {
        self.containers.push(ContainerFrame::default());
    }

    fn close_container(&mut self, node: &SyntaxNode) {
        let frame = self.containers.pop().unwrap_or_default();

        if !(frame.has_inner_documented_child || node.is_documented_api()) {
            return;
        }

        let Some(category) = DocCategory::of_container(&node.kind) else {
            return;
        };

        // A documented nested container is documented API of its parent.
        if self.emit(node, category) {
            self.mark_inner_documented_child();
        }
    }

    fn visit_method(&mut self, node: &SyntaxNode) {
        if self.inside_container() && node.is_documented_api() {
            self.mark_inner_documented_child();
        }
    }
}

impl Visitor for DocVisibilityVisitor<'_> {
    fn begin_visit_function_definition(&mut self, node: &SyntaxNode, _parent: Option<&SyntaxNode>) {
        if !self.inside_container() {
            if node.is_documented_api() {
                self.emit(node, DocCategory::Function);
            }
            return;
        }

        let visible = node.is_public() || !self.policy.inner_functions_require_public;
        if node.is_documented() && visible {
            self.mark_inner_documented_child();
        }
    }

    fn begin_visit_type_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {
        self.open_container();
    }

    fn end_visit_type_definition(&mut self, node: &SyntaxNode, _parent: Option<&SyntaxNode>) {
        self.close_container(node);
    }

    fn begin_visit_class_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {
        self.open_container();
    }

    fn end_visit_class_definition(&mut self, node: &SyntaxNode, _parent: Option<&SyntaxNode>) {
        self.close_container(node);
    }

    fn begin_visit_method_declaration(&mut self, node: &SyntaxNode, _parent: Option<&SyntaxNode>) {
        self.visit_method(node);
    }

    fn begin_visit_object_method_definition(
        &mut self,
        node: &SyntaxNode,
        _parent: Option<&SyntaxNode>,
    ) {
        self.visit_method(node);
    }
}
