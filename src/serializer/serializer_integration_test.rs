//! Whole-tree serialization: pragma version gating, synthesized-fragment
//! splicing and stability of the token sequence.

use super::*;
use crate::ast::{ContractKind, Loc, Node, NodeKind};
use crate::synthesis;
use pretty_assertions::assert_eq;

fn pragma(value: &str) -> Node {
    Node::new(
        NodeKind::PragmaDirective {
            name: "solidity".to_string(),
            value: value.to_string(),
        },
        Loc::lines(1, 1),
    )
}

fn wallet(pragma_value: &str) -> Node {
    let ctor = synthesis::safe_constructor("owner").unwrap();
    let contract = Node::new(
        NodeKind::ContractDefinition {
            contract_kind: ContractKind::Contract,
            name: "Wallet".to_string(),
            base_contracts: vec![],
            parts: vec![ctor],
        },
        Loc::lines(3, 8),
    );
    Node::new(
        NodeKind::SourceUnit {
            items: vec![pragma(pragma_value), contract],
        },
        Loc::lines(1, 8),
    )
}

#[test]
fn constructor_keyword_requires_post_04_pragma() {
    let tokens = serialize_tokens(&wallet("^0.5.0"));
    assert!(tokens.contains(&"constructor".to_string()));
    assert!(!tokens.contains(&"function".to_string()));
}

#[test]
fn pre_05_constructor_serializes_as_contract_named_function() {
    let tokens = serialize_tokens(&wallet("0.4.0"));
    let pos = tokens.iter().position(|t| t == "function").unwrap();
    assert_eq!(tokens[pos + 1], "Wallet");
    assert!(!tokens.contains(&"constructor".to_string()));
}

#[test]
fn full_text_of_patched_wallet() {
    let text = serialize(&wallet("^0.5.0"));
    assert_eq!(
        text,
        "pragma solidity ^0.5.0;\n\
         contract Wallet constructor Wallet {\n\
         \x20   owner msg;\n\
         }\n\
         }\n"
    );
}

#[test]
fn serialization_is_stable() {
    let ast = wallet("^0.5.0");
    assert_eq!(serialize_tokens(&ast), serialize_tokens(&ast));
    assert_eq!(serialize(&ast), serialize(&ast));
}

#[test]
fn version_state_is_not_shared_across_calls() {
    // A 0.5 pragma in one call must not leak into the next invocation.
    let modern = wallet("^0.5.0");
    let legacy = wallet("0.4.0");
    assert!(serialize_tokens(&modern).contains(&"constructor".to_string()));
    assert!(!serialize_tokens(&legacy).contains(&"constructor".to_string()));
    assert!(serialize_tokens(&modern).contains(&"constructor".to_string()));
}

#[test]
fn unversioned_pragma_keeps_default() {
    let tokens = serialize_tokens(&wallet("experimental"));
    // Default version 0.4: pre-0.5 constructor convention.
    assert!(tokens.contains(&"function".to_string()));
}
