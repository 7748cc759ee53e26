use super::{NodeKind, SyntaxNode};

/// Hooks called by [`walk`] for the node kinds the documentation passes know.
///
/// Every hook defaults to a no-op, so implementors only write the ones they
/// need. `parent` is `None` for the root.
pub trait Visitor {
    fn begin_visit_module_part(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}
    fn end_visit_module_part(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}

    fn begin_visit_function_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}
    fn end_visit_function_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}

    fn begin_visit_type_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}
    fn end_visit_type_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}

    fn begin_visit_class_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}
    fn end_visit_class_definition(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}

    fn begin_visit_method_declaration(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}
    fn end_visit_method_declaration(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) {}

    fn begin_visit_object_method_definition(
        &mut self,
        _node: &SyntaxNode,
        _parent: Option<&SyntaxNode>,
    ) {
    }
    fn end_visit_object_method_definition(
        &mut self,
        _node: &SyntaxNode,
        _parent: Option<&SyntaxNode>,
    ) {
    }
}

/// Depth-first walk: begin hook, children in order, end hook.
pub fn walk<V: Visitor + ?Sized>(root: &SyntaxNode, visitor: &mut V) {
    walk_node(root, None, visitor);
}

fn walk_node<V: Visitor + ?Sized>(node: &SyntaxNode, parent: Option<&SyntaxNode>, visitor: &mut V) {
    begin_visit(node, parent, visitor);
    for child in &node.children {
        walk_node(child, Some(node), visitor);
    }
    end_visit(node, parent, visitor);
}

fn begin_visit<V: Visitor + ?Sized>(node: &SyntaxNode, parent: Option<&SyntaxNode>, visitor: &mut V) {
    match node.kind {
        NodeKind::ModulePart => visitor.begin_visit_module_part(node, parent),
        NodeKind::FunctionDefinition => visitor.begin_visit_function_definition(node, parent),
        NodeKind::TypeDefinition(_) => visitor.begin_visit_type_definition(node, parent),
        NodeKind::ClassDefinition => visitor.begin_visit_class_definition(node, parent),
        NodeKind::MethodDeclaration => visitor.begin_visit_method_declaration(node, parent),
        NodeKind::ObjectMethodDefinition => {
            visitor.begin_visit_object_method_definition(node, parent)
        }
        NodeKind::Other(_) => {}
    }
}

fn end_visit<V: Visitor + ?Sized>(node: &SyntaxNode, parent: Option<&SyntaxNode>, visitor: &mut V) {
    match node.kind {
        NodeKind::ModulePart => visitor.end_visit_module_part(node, parent),
        NodeKind::FunctionDefinition => visitor.end_visit_function_definition(node, parent),
        NodeKind::TypeDefinition(_) => visitor.end_visit_type_definition(node, parent),
        NodeKind::ClassDefinition => visitor.end_visit_class_definition(node, parent),
        NodeKind::MethodDeclaration => visitor.end_visit_method_declaration(node, parent),
        NodeKind::ObjectMethodDefinition => {
            visitor.end_visit_object_method_definition(node, parent)
        }
        NodeKind::Other(_) => {}
    }
}
