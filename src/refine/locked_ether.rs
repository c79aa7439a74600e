//! LockedEther checker: a finding is confirmed only when it points at the
//! exact start of a deployable `contract` definition. Hits on libraries and
//! interfaces are detector noise and dropped.

use anyhow::Result;

use super::{nodes_starting_at, push_confirmed, raw_lines, Category, ViolationReport};
use crate::ast::{ContractKind, Node, NodeKind, NodeType};

pub(super) fn check(report: &ViolationReport, ast: &Node) -> Result<Vec<usize>> {
    let mut res = Vec::new();
    for line in raw_lines(report, Category::LockedEther) {
        let resolved = line + 1;
        for node in nodes_starting_at(ast, resolved, NodeType::ContractDefinition) {
            if let NodeKind::ContractDefinition { contract_kind, .. } = &node.kind {
                if *contract_kind == ContractKind::Contract {
                    push_confirmed(&mut res, resolved);
                }
            }
        }
    }
    Ok(res)
}
