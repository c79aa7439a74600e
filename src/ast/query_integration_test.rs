//! Query operations exercised against a realistic function body.

use super::query::*;
use super::{Loc, Node, NodeKind, NodeType, Visibility};
use pretty_assertions::assert_eq;

fn ident(name: &str) -> Node {
    Node::synthesized(NodeKind::Identifier {
        name: name.to_string(),
    })
}

fn uint_param(name: &str) -> Node {
    Node::synthesized(NodeKind::Parameter {
        type_name: Box::new(Node::synthesized(NodeKind::ElementaryTypeName {
            name: "uint".to_string(),
        })),
        name: Some(name.to_string()),
        storage_location: None,
        is_state_var: false,
        is_indexed: false,
    })
}

fn assign(target: Node, value: Node) -> Node {
    Node::synthesized(NodeKind::BinaryOperation {
        operator: "=".to_string(),
        left: Box::new(target),
        right: Box::new(value),
    })
}

fn expr_stmt(line: usize, expression: Node) -> Node {
    Node::new(
        NodeKind::ExpressionStatement {
            expression: Box::new(expression),
        },
        Loc::lines(line, line),
    )
}

/// `function withdraw(uint amount) { msg.sender.call(amount); balances[msg.sender] = 0; uint x; x = 1; }`
fn withdraw_function() -> Node {
    let external_call = expr_stmt(
        6,
        Node::synthesized(NodeKind::FunctionCall {
            expression: Box::new(Node::synthesized(NodeKind::MemberAccess {
                expression: Box::new(ident("msg")),
                member_name: "call".to_string(),
            })),
            arguments: vec![ident("amount")],
            names: vec![],
        }),
    );
    let state_write = expr_stmt(
        7,
        assign(
            Node::synthesized(NodeKind::IndexAccess {
                base: Box::new(ident("balances")),
                index: Box::new(ident("msg")),
            }),
            Node::synthesized(NodeKind::NumberLiteral {
                value: "0".to_string(),
            }),
        ),
    );
    let local_decl = Node::new(
        NodeKind::VariableDeclarationStatement {
            variables: vec![uint_param("x")],
            initial_value: None,
        },
        Loc::lines(8, 8),
    );
    let local_write = expr_stmt(
        9,
        assign(
            ident("x"),
            Node::synthesized(NodeKind::NumberLiteral {
                value: "1".to_string(),
            }),
        ),
    );

    Node::new(
        NodeKind::FunctionDefinition {
            name: Some("withdraw".to_string()),
            visibility: Visibility::Public,
            is_constructor: false,
            state_mutability: None,
            modifiers: vec![],
            parameters: Box::new(Node::synthesized(NodeKind::ParameterList {
                parameters: vec![uint_param("amount")],
            })),
            return_parameters: None,
            body: Some(Box::new(Node::new(
                NodeKind::Block {
                    statements: vec![external_call, state_write, local_decl, local_write],
                },
                Loc::lines(5, 10),
            ))),
        },
        Loc::lines(5, 10),
    )
}

#[test]
fn enclosing_definition_resolves_from_nested_statement() {
    let func = withdraw_function();
    let call_stmt = find_nodes_by_line(&func, 6)
        .into_iter()
        .find(|n| n.node_type() == NodeType::ExpressionStatement)
        .unwrap();

    let scope = find_enclosing_definition(&func, call_stmt.id()).unwrap();
    assert_eq!(scope.name(), Some("withdraw"));
}

#[test]
fn state_assignments_exclude_locals_and_earlier_nodes() {
    let func = withdraw_function();
    let call_stmt = find_nodes_by_line(&func, 6)
        .into_iter()
        .find(|n| n.node_type() == NodeType::ExpressionStatement)
        .unwrap();

    let assignments = find_state_assignments(&func, 4, call_stmt.id());
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].start_line(), 0); // synthesized binop, zero loc
    assert!(find_nodes_by_name(assignments[0], "balances").len() == 1);
}

#[test]
fn state_assignments_respect_depth_bound() {
    let func = withdraw_function();
    let call_stmt = find_nodes_by_line(&func, 6)
        .into_iter()
        .find(|n| n.node_type() == NodeType::ExpressionStatement)
        .unwrap();

    // The assignment sits one block level below the function.
    assert!(find_state_assignments(&func, 0, call_stmt.id()).is_empty());
    assert_eq!(find_state_assignments(&func, 1, call_stmt.id()).len(), 1);
}

#[test]
fn assignments_before_the_marker_are_ignored() {
    let func = withdraw_function();
    // Use the last statement as marker: nothing follows it.
    let local_write = find_nodes_by_line(&func, 9)
        .into_iter()
        .find(|n| n.node_type() == NodeType::ExpressionStatement)
        .unwrap();

    assert!(find_state_assignments(&func, 4, local_write.id()).is_empty());
}
