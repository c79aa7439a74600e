/*!
# Patch Synthesis

Pure builders producing standalone AST fragments for the standard
remediations: ownership guard, safe constructor and safe withdraw. Every
builder returns a fresh subtree satisfying the same field-completeness rules
as parser-produced nodes, so no downstream component special-cases
synthesized fragments. On malformed input the builder logs the cause and
returns an error; no partially built node ever escapes.
*/

pub mod primitives;


use thiserror::Error;
use tracing::warn;

use crate::ast::{Node, NodeKind, Visibility};

use primitives::{
    address_cast, binary_operation, identifier, member_access, msg_sender, require_wrap,
    to_expression_statement, transfer_call,
};

/// Builder failure: the fragment could not be assembled
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("{0} must not be empty")]
    EmptyName(&'static str),
}

/// `require(msg.sender == <owner>);` guard statement
pub fn ownership_guard(owner: &str) -> Result<Node, SynthesisError> {
    build("ownership guard", || {
        let judge = binary_operation(msg_sender(), "==", identifier(owner)?);
        require_wrap(judge)
    })
}

/// Public constructor whose body assigns the deployer's address to `<owner>`
pub fn safe_constructor(owner: &str) -> Result<Node, SynthesisError> {
    build("safe constructor", || {
        let init_owner =
            to_expression_statement(binary_operation(identifier(owner)?, "=", msg_sender()));
        Ok(Node::synthesized(NodeKind::FunctionDefinition {
            name: None,
            visibility: Visibility::Public,
            is_constructor: true,
            state_mutability: None,
            modifiers: Vec::new(),
            parameters: Box::new(empty_parameter_list()),
            return_parameters: None,
            body: Some(Box::new(Node::synthesized(NodeKind::Block {
                statements: vec![init_owner],
            }))),
        }))
    })
}

/// Public withdraw function taking one `uint val` parameter, guarded by
/// `require(msg.sender == <owner> && val <= address(this).balance)` and
/// ending in a transfer of `val` to the caller.
pub fn safe_withdraw(owner: &str, fn_name: &str) -> Result<Node, SynthesisError> {
    build("safe withdraw", || {
        if fn_name.is_empty() {
            return Err(SynthesisError::EmptyName("function name"));
        }

        let owner_judge = binary_operation(msg_sender(), "==", identifier(owner)?);
        let balance = member_access(address_cast("this")?, "balance")?;
        let val_judge = binary_operation(identifier("val")?, "<=", balance);
        let guard = require_wrap(binary_operation(owner_judge, "&&", val_judge))?;

        let payout = to_expression_statement(transfer_call(msg_sender(), identifier("val")?)?);

        Ok(Node::synthesized(NodeKind::FunctionDefinition {
            name: Some(fn_name.to_string()),
            visibility: Visibility::Public,
            is_constructor: false,
            state_mutability: None,
            modifiers: Vec::new(),
            parameters: Box::new(Node::synthesized(NodeKind::ParameterList {
                parameters: vec![uint_parameter("val")],
            })),
            return_parameters: None,
            body: Some(Box::new(Node::synthesized(NodeKind::Block {
                statements: vec![guard, payout],
            }))),
        }))
    })
}

fn build(
    what: &'static str,
    assemble: impl FnOnce() -> Result<Node, SynthesisError>,
) -> Result<Node, SynthesisError> {
    assemble().map_err(|err| {
        warn!(builder = what, error = %err, "unable to build fragment");
        err
    })
}

fn empty_parameter_list() -> Node {
    Node::synthesized(NodeKind::ParameterList {
        parameters: Vec::new(),
    })
}

fn uint_parameter(name: &str) -> Node {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::query::find_nodes_by_type;
    use crate::ast::NodeType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ownership_guard_shape() {
        let guard = ownership_guard("owner").unwrap();
        assert_eq!(guard.node_type(), NodeType::ExpressionStatement);

        let binops = find_nodes_by_type(&guard, NodeType::BinaryOperation);
        assert_eq!(binops.len(), 1);
        let NodeKind::BinaryOperation {
            operator,
            left,
            right,
        } = &binops[0].kind
        else {
            panic!("expected binary operation");
        };
        assert_eq!(operator, "==");
        assert_eq!(left.node_type(), NodeType::MemberAccess);
        assert_eq!(right.name(), Some("owner"));
    }

    #[test]
    fn test_empty_owner_is_rejected() {
        assert_eq!(
            ownership_guard(""),
            Err(SynthesisError::EmptyName("identifier"))
        );
        assert_eq!(
            safe_constructor(""),
            Err(SynthesisError::EmptyName("identifier"))
        );
        assert_eq!(
            safe_withdraw("owner", ""),
            Err(SynthesisError::EmptyName("function name"))
        );
    }

    #[test]
    fn test_fragments_have_independent_identity() {
        let a = ownership_guard("owner").unwrap();
        let b = ownership_guard("owner").unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.kind, b.kind);
    }
}
