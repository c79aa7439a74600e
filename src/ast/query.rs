/*!
# AST Query Operations

Read-only tree searches used by the confirmation engine: lookup by line, by
node type, by name, enclosing definition and state-assignment collection.
All functions borrow the tree and never mutate it.
*/

use std::collections::HashSet;

use super::{Node, NodeId, NodeKind, NodeType};

/// Nodes whose source range covers the given one-based line, document order
pub fn find_nodes_by_line(root: &Node, line: usize) -> Vec<&Node> {
    let mut result = Vec::new();
    collect(root, &mut result, &|n| n.loc.covers_line(line));
    result
}

/// Descendants of the given type (the root included), document order
pub fn find_nodes_by_type(root: &Node, ty: NodeType) -> Vec<&Node> {
    let mut result = Vec::new();
    collect(root, &mut result, &|n| n.node_type() == ty);
    result
}

/// Name-bearing descendants (the root included) matching `name`
pub fn find_nodes_by_name<'a>(root: &'a Node, name: &str) -> Vec<&'a Node> {
    let mut result = Vec::new();
    collect(root, &mut result, &|n| n.name() == Some(name));
    result
}

fn collect<'a>(node: &'a Node, out: &mut Vec<&'a Node>, pred: &dyn Fn(&Node) -> bool) {
    if pred(node) {
        out.push(node);
    }
    for child in node.children() {
        collect(child, out, pred);
    }
}

/// Nearest enclosing function definition containing the node with `id`
pub fn find_enclosing_definition(root: &Node, id: NodeId) -> Option<&Node> {
    fn walk<'a>(node: &'a Node, id: NodeId, current: Option<&'a Node>) -> Option<&'a Node> {
        let current = if node.node_type() == NodeType::FunctionDefinition {
            Some(node)
        } else {
            current
        };
        if node.id() == id {
            return current;
        }
        node.children()
            .into_iter()
            .find_map(|c| walk(c, id, current))
    }
    walk(root, id, None)
}

/// Assignments to state variables within `scope`.
///
/// Collects `=` binary operations whose assigned name is not declared locally
/// in `scope` (parameters and local declarations), bounded to `max_depth`
/// levels of block nesting below the scope root and positioned in document
/// order after the node with id `after`.
pub fn find_state_assignments(scope: &Node, max_depth: usize, after: NodeId) -> Vec<&Node> {
    let locals = local_names(scope);

    let mut result = Vec::new();
    let mut seen_after = false;
    walk_assignments(scope, 0, max_depth, after, &locals, &mut seen_after, &mut result);
    result
}

fn walk_assignments<'a>(
    node: &'a Node,
    depth: usize,
    max_depth: usize,
    after: NodeId,
    locals: &HashSet<String>,
    seen_after: &mut bool,
    out: &mut Vec<&'a Node>,
) {
    if node.id() == after {
        // The marker node and everything inside it precede the search window.
        *seen_after = true;
        return;
    }
    if *seen_after {
        if let NodeKind::BinaryOperation { operator, left, .. } = &node.kind {
            if operator == "=" && assigned_name(left).is_some_and(|n| !locals.contains(n)) {
                out.push(node);
            }
        }
    }
    // The depth bound counts block nesting, not raw tree edges.
    let child_depth = if node.node_type() == NodeType::Block {
        depth + 1
    } else {
        depth
    };
    if child_depth > max_depth {
        return;
    }
    for child in node.children() {
        walk_assignments(child, child_depth, max_depth, after, locals, seen_after, out);
    }
}

/// Leftmost name of an assignment target (`x`, `x[i]`, `x.f` all resolve to `x`)
fn assigned_name(target: &Node) -> Option<&str> {
    match &target.kind {
        NodeKind::Identifier { name } => Some(name),
        NodeKind::IndexAccess { base, .. } => assigned_name(base),
        NodeKind::MemberAccess { expression, .. } => assigned_name(expression),
        _ => None,
    }
}

/// Names declared locally within the scope: parameters and local variables
fn local_names(scope: &Node) -> HashSet<String> {
    let mut names = HashSet::new();
    for param in find_nodes_by_type(scope, NodeType::Parameter) {
        if let Some(name) = param.name() {
            names.insert(name.to_string());
        }
    }
    for decl in find_nodes_by_type(scope, NodeType::VariableDeclarationStatement) {
        if let NodeKind::VariableDeclarationStatement { variables, .. } = &decl.kind {
            for var in variables {
                if let Some(name) = var.name() {
                    names.insert(name.to_string());
                }
            }
        }
    }
    names
}
