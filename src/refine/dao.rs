//! DAO (reentrancy-ordering) checker.
//!
//! A flagged external-call statement is confirmed when state variables are
//! still assigned after it within the enclosing definition. Findings where
//! the call or a later assignment sits inside an if/while/do-while construct
//! are treated as already ordered safely by a guard; findings whose later
//! assignments reference `now` are treated as time-lock logic and dropped.
//! Both shortcuts are known heuristic weaknesses kept on purpose.

use anyhow::{Context, Result};
use std::collections::HashSet;

use super::{nodes_starting_at, push_confirmed, raw_lines, Category, ViolationReport};
use crate::ast::query::{
    find_enclosing_definition, find_nodes_by_name, find_nodes_by_type, find_state_assignments,
};
use crate::ast::{Node, NodeId, NodeType};

pub(super) fn check(report: &ViolationReport, ast: &Node, max_depth: usize) -> Result<Vec<usize>> {
    let mut res = Vec::new();
    for line in raw_lines(report, Category::Dao) {
        let resolved = line + 1;
        for call_stmt in nodes_starting_at(ast, resolved, NodeType::ExpressionStatement) {
            let scope = find_enclosing_definition(ast, call_stmt.id())
                .context("external call has no enclosing definition")?;

            let assignments = find_state_assignments(scope, max_depth, call_stmt.id());

            let (guarded_statements, guarded_binops) = in_guard_nodes(scope);

            // Assignments touching `now` are time-lock logic, not reentrancy.
            if assignments
                .iter()
                .any(|assign| !find_nodes_by_name(assign, "now").is_empty())
            {
                continue;
            }

            let call_guarded = guarded_statements.contains(&call_stmt.id());
            let assignment_guarded = assignments
                .iter()
                .any(|assign| guarded_binops.contains(&assign.id()));

            if !call_guarded && !assignment_guarded {
                push_confirmed(&mut res, resolved);
            }
        }
    }
    Ok(res)
}

/// Ids of every expression statement and binary operation nested inside an
/// if/while/do-while construct within the scope
fn in_guard_nodes(scope: &Node) -> (HashSet<NodeId>, HashSet<NodeId>) {
    let mut guards = find_nodes_by_type(scope, NodeType::IfStatement);
    guards.extend(find_nodes_by_type(scope, NodeType::DoWhileStatement));
    guards.extend(find_nodes_by_type(scope, NodeType::WhileStatement));

    let mut statements = HashSet::new();
    let mut binops = HashSet::new();
    for guard in guards {
        for stmt in find_nodes_by_type(guard, NodeType::ExpressionStatement) {
            statements.insert(stmt.id());
        }
        for op in find_nodes_by_type(guard, NodeType::BinaryOperation) {
            binops.insert(op.id());
        }
    }
    (statements, binops)
}
