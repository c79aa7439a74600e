//! UnhandledException checker: a finding on an expression statement is
//! confirmed unless an assignment appears anywhere in its subtree. An
//! assigned call result is assumed to be checked at the assignment site.

use anyhow::Result;

use super::{nodes_starting_at, push_confirmed, raw_lines, Category, ViolationReport};
use crate::ast::query::find_nodes_by_type;
use crate::ast::{Node, NodeKind, NodeType};

pub(super) fn check(report: &ViolationReport, ast: &Node) -> Result<Vec<usize>> {
    let mut res = Vec::new();
    for line in raw_lines(report, Category::UnhandledException) {
        let resolved = line + 1;
        for stmt in nodes_starting_at(ast, resolved, NodeType::ExpressionStatement) {
            let assigned = find_nodes_by_type(stmt, NodeType::BinaryOperation)
                .iter()
                .any(|op| matches!(&op.kind, NodeKind::BinaryOperation { operator, .. } if operator == "="));
            if !assigned {
                push_confirmed(&mut res, resolved);
            }
        }
    }
    Ok(res)
}
