//! MissingInputValidation checker.
//!
//! A flagged function definition stays confirmed only when its address
//! parameters are not all guarded by `require` comparisons and every
//! non-address parameter is mentioned in a call-free `require` argument.
//! The comparison check is deliberately shallow: only the left operand of
//! the first `require` argument is inspected.

use anyhow::{Context, Result};

use super::{nodes_starting_at, push_confirmed, raw_lines, Category, ViolationReport};
use crate::ast::query::{find_nodes_by_name, find_nodes_by_type};
use crate::ast::{Node, NodeKind, NodeType};

pub(super) fn check(report: &ViolationReport, ast: &Node) -> Result<Vec<usize>> {
    let mut res = Vec::new();
    for line in raw_lines(report, Category::MissingInputValidation) {
        let resolved = line + 1;
        for func in nodes_starting_at(ast, resolved, NodeType::FunctionDefinition) {
            if confirm_function(func)? {
                push_confirmed(&mut res, resolved);
            }
        }
    }
    Ok(res)
}

fn confirm_function(func: &Node) -> Result<bool> {
    let parameters = named_parameters(func);
    let address_count = parameters.iter().filter(|(_, ty)| ty == "address").count();

    // Functions without address parameters are not candidates.
    if parameters.is_empty() || address_count == 0 {
        return Ok(false);
    }

    let requires = require_calls(func);

    let mut address_checked = 0;
    for (name, ty) in &parameters {
        if ty == "address" && address_is_checked(&requires, name)? {
            address_checked += 1;
        }
    }
    if address_count <= address_checked {
        return Ok(false);
    }

    // Every non-address parameter must appear in a call-free require argument.
    Ok(parameters
        .iter()
        .filter(|(_, ty)| ty != "address")
        .all(|(name, _)| non_address_is_checked(&requires, name)))
}

/// Parameter name → type mapping; unnamed parameters are skipped
fn named_parameters(func: &Node) -> Vec<(String, String)> {
    let NodeKind::FunctionDefinition { parameters, .. } = &func.kind else {
        return Vec::new();
    };
    let NodeKind::ParameterList { parameters } = &parameters.kind else {
        return Vec::new();
    };
    parameters
        .iter()
        .filter_map(|param| {
            let NodeKind::Parameter {
                type_name, name, ..
            } = &param.kind
            else {
                return None;
            };
            Some((name.clone()?, type_string(type_name)))
        })
        .collect()
}

fn type_string(type_name: &Node) -> String {
    match &type_name.kind {
        NodeKind::ElementaryTypeName { name } => name.clone(),
        NodeKind::ArrayTypeName { base_type, .. } => format!("{}[]", type_string(base_type)),
        _ => String::new(),
    }
}

/// All `require(...)` calls reachable within the function
fn require_calls(func: &Node) -> Vec<&Node> {
    find_nodes_by_type(func, NodeType::FunctionCall)
        .into_iter()
        .filter(|call| {
            matches!(
                &call.kind,
                NodeKind::FunctionCall { expression, .. }
                    if matches!(&expression.kind, NodeKind::Identifier { name } if name == "require")
            )
        })
        .collect()
}

/// True if some require's first argument is a binary comparison whose left
/// operand is an identifier with the parameter's name. The operator and
/// right operand are not inspected.
fn address_is_checked(requires: &[&Node], param: &str) -> Result<bool> {
    for req in requires {
        let arg = first_argument(req)?;
        if let NodeKind::BinaryOperation { left, .. } = &arg.kind {
            if matches!(&left.kind, NodeKind::Identifier { name } if name == param) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn first_argument<'a>(require: &'a Node) -> Result<&'a Node> {
    let NodeKind::FunctionCall { arguments, .. } = &require.kind else {
        anyhow::bail!("require node is not a function call");
    };
    arguments
        .first()
        .context("require call without arguments")
}

/// True if the name appears inside a require argument that contains no
/// nested function call.
fn non_address_is_checked(requires: &[&Node], param: &str) -> bool {
    requires.iter().any(|req| {
        let NodeKind::FunctionCall { arguments, .. } = &req.kind else {
            return false;
        };
        arguments.iter().any(|arg| {
            find_nodes_by_type(arg, NodeType::FunctionCall).is_empty()
                && !find_nodes_by_name(arg, param).is_empty()
        })
    })
}
