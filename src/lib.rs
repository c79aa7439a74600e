/*!
# solfix

Post-detection pipeline for a Solidity static analyzer. An upstream parser
produces the AST and an upstream detector emits a raw, line-based
vulnerability report with high recall and many false positives; this crate
refines that report and synthesizes remediations:

- **AST node model** — typed tree shared by every component, with read-only
  query operations (by line, by type, by name, enclosing definition,
  state-assignment search).
- **Confirmation engine** — re-examines each raw finding against structural
  patterns and suppresses false positives; one independent checker per
  vulnerability category (`DAO`, `UnhandledException`, `LockedEther`,
  `MissingInputValidation`, `UnrestrictedWrite`).
- **Patch synthesis** — pure builders producing ready-to-splice AST
  fragments: ownership guard, safe constructor, safe withdraw.
- **Source serializer** — linearizes any tree (original or patched) back
  into formatted source text.

The per-category heuristics are intentionally narrow and reproduce the
upstream detector pipeline's exact decision boundaries, including documented
weaknesses; they are not sound static analysis.

## Usage

```rust,ignore
use solfix::{refine_report, synthesis, serializer, Category};

let refined = refine_report(&raw_report, &ast);
if let Some(lines) = refined.get(Category::Dao).confirmed_lines() {
    // splice fragments into the tree, then serialize
    let guard = synthesis::ownership_guard("owner")?;
    let patched_source = serializer::serialize(&ast);
}
```
*/

pub mod ast;
pub mod refine;
pub mod serializer;
pub mod synthesis;

pub use ast::query;
pub use ast::{ContractKind, Loc, Node, NodeId, NodeKind, NodeType, Position, Visibility};
pub use refine::{
    Category, CategoryResult, ConfirmationEngine, RefineConfig, RefinedReport, ViolationReport,
};
pub use serializer::{format_tokens, serialize, serialize_tokens};
pub use synthesis::{ownership_guard, safe_constructor, safe_withdraw, SynthesisError};

/// Refines a raw detector report against an AST with default configuration
pub fn refine_report(report: &ViolationReport, ast: &Node) -> RefinedReport {
    ConfirmationEngine::new().confirm(report, ast)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refine_report_on_empty_input() {
        let ast = Node::synthesized(NodeKind::SourceUnit { items: vec![] });
        let refined = refine_report(&ViolationReport::new(), &ast);
        for category in Category::ALL {
            assert_eq!(
                refined.get(category),
                &CategoryResult::Confirmed(Vec::new())
            );
        }
    }

    #[test]
    fn test_report_deserializes_from_detector_json() {
        let json = r#"{ "Victim": { "DAO": [5], "LockedEther": [2] } }"#;
        let report: ViolationReport = serde_json::from_str(json).unwrap();
        assert_eq!(report["Victim"][&Category::Dao], vec![5]);
        assert_eq!(report["Victim"][&Category::LockedEther], vec![2]);
    }
}
