//! Low-level node constructors shared by the remediation builders. Each
//! returns a fresh, fully-populated subtree; none reads or mutates any
//! existing tree.

use crate::ast::{Node, NodeKind};

use super::SynthesisError;

/// `name` identifier
pub fn identifier(name: &str) -> Result<Node, SynthesisError> {
    if name.is_empty() {
        return Err(SynthesisError::EmptyName("identifier"));
    }
    Ok(Node::synthesized(NodeKind::Identifier {
        name: name.to_string(),
    }))
}

/// `expression.member`
pub fn member_access(expression: Node, member_name: &str) -> Result<Node, SynthesisError> {
    if member_name.is_empty() {
        return Err(SynthesisError::EmptyName("member name"));
    }
    Ok(Node::synthesized(NodeKind::MemberAccess {
        expression: Box::new(expression),
        member_name: member_name.to_string(),
    }))
}

/// `left <op> right`
pub fn binary_operation(left: Node, operator: &str, right: Node) -> Node {
    Node::synthesized(NodeKind::BinaryOperation {
        operator: operator.to_string(),
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Positional call `expression(arguments...)`
pub fn call(expression: Node, arguments: Vec<Node>) -> Node {
    Node::synthesized(NodeKind::FunctionCall {
        expression: Box::new(expression),
        arguments,
        names: Vec::new(),
    })
}

/// `msg.sender`
pub fn msg_sender() -> Node {
    let msg = Node::synthesized(NodeKind::Identifier {
        name: "msg".to_string(),
    });
    Node::synthesized(NodeKind::MemberAccess {
        expression: Box::new(msg),
        member_name: "sender".to_string(),
    })
}

/// `address(name)` cast expression
pub fn address_cast(name: &str) -> Result<Node, SynthesisError> {
    let address_type = Node::synthesized(NodeKind::ElementaryTypeNameExpression {
        type_name: Box::new(Node::synthesized(NodeKind::ElementaryTypeName {
            name: "address".to_string(),
        })),
    });
    Ok(call(address_type, vec![identifier(name)?]))
}

/// Wraps an expression into an expression statement
pub fn to_expression_statement(expression: Node) -> Node {
    Node::synthesized(NodeKind::ExpressionStatement {
        expression: Box::new(expression),
    })
}

/// `require(condition);` statement
pub fn require_wrap(condition: Node) -> Result<Node, SynthesisError> {
    let require = call(identifier("require")?, vec![condition]);
    Ok(to_expression_statement(require))
}

/// `recipient.transfer(amount)` call
pub fn transfer_call(recipient: Node, amount: Node) -> Result<Node, SynthesisError> {
    Ok(call(member_access(recipient, "transfer")?, vec![amount]))
}
