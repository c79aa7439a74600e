/*!
# Confirmation Engine

Re-examines each raw detector finding against structural patterns in the AST
and suppresses false positives. One independent checker per vulnerability
category; a checker failure is caught at the checker boundary and never
aborts the other categories.

Raw reports come from the upstream detector as contract name → category →
zero-based line numbers. Confirmed lines are one-based and duplicate-free.
*/

pub mod config;

mod dao;
mod input_validation;
mod locked_ether;
mod unhandled_exception;


pub use config::RefineConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::ast::query::find_nodes_by_line;
use crate::ast::{Node, NodeType};

/// Vulnerability categories handled by the pipeline
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "DAO")]
    Dao,
    UnhandledException,
    LockedEther,
    MissingInputValidation,
    UnrestrictedWrite,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Dao,
        Category::UnhandledException,
        Category::LockedEther,
        Category::MissingInputValidation,
        Category::UnrestrictedWrite,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Dao => write!(f, "DAO"),
            Category::UnhandledException => write!(f, "UnhandledException"),
            Category::LockedEther => write!(f, "LockedEther"),
            Category::MissingInputValidation => write!(f, "MissingInputValidation"),
            Category::UnrestrictedWrite => write!(f, "UnrestrictedWrite"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DAO" => Ok(Category::Dao),
            "UnhandledException" => Ok(Category::UnhandledException),
            "LockedEther" => Ok(Category::LockedEther),
            "MissingInputValidation" => Ok(Category::MissingInputValidation),
            "UnrestrictedWrite" => Ok(Category::UnrestrictedWrite),
            _ => Err(anyhow::anyhow!("Unknown vulnerability category: {}", s)),
        }
    }
}

/// Raw detector output: contract name → category → zero-based lines
pub type ViolationReport = BTreeMap<String, BTreeMap<Category, Vec<usize>>>;

/// Outcome of one category checker.
///
/// `Failed` means the checker could not evaluate its findings; it is distinct
/// from `Confirmed(vec![])`, which means everything was evaluated and nothing
/// was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryResult {
    /// Ordered, duplicate-free one-based confirmed lines
    Confirmed(Vec<usize>),
    /// Processing failed for this category
    Failed,
}

impl CategoryResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, CategoryResult::Failed)
    }

    pub fn confirmed_lines(&self) -> Option<&[usize]> {
        match self {
            CategoryResult::Confirmed(lines) => Some(lines),
            CategoryResult::Failed => None,
        }
    }
}

/// Refined report: one result per category, created once and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedReport {
    results: BTreeMap<Category, CategoryResult>,
}

impl RefinedReport {
    pub fn get(&self, category: Category) -> &CategoryResult {
        &self.results[&category]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryResult)> {
        self.results.iter().map(|(c, r)| (*c, r))
    }
}

/// Dispatches one checker per category over a raw report
#[derive(Debug, Clone, Default)]
pub struct ConfirmationEngine {
    config: RefineConfig,
}

impl ConfirmationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RefineConfig) -> Self {
        Self { config }
    }

    /// Confirms or suppresses every finding of the raw report.
    ///
    /// Each checker runs independently; a failing checker yields
    /// [`CategoryResult::Failed`] for its category only.
    pub fn confirm(&self, report: &ViolationReport, ast: &Node) -> RefinedReport {
        let mut results = BTreeMap::new();
        for category in Category::ALL {
            results.insert(category, self.run_checker(category, report, ast));
        }
        RefinedReport { results }
    }

    fn run_checker(
        &self,
        category: Category,
        report: &ViolationReport,
        ast: &Node,
    ) -> CategoryResult {
        if !self.config.is_enabled(category) {
            debug!(%category, "category disabled by configuration");
            return CategoryResult::Confirmed(Vec::new());
        }

        let outcome = match category {
            Category::Dao => dao::check(report, ast, self.config.max_guard_depth),
            Category::UnhandledException => unhandled_exception::check(report, ast),
            Category::LockedEther => locked_ether::check(report, ast),
            Category::MissingInputValidation => input_validation::check(report, ast),
            // Explicitly unimplemented upstream: evaluated, nothing found.
            Category::UnrestrictedWrite => Ok(Vec::new()),
        };

        match outcome {
            Ok(lines) => CategoryResult::Confirmed(lines),
            Err(err) => {
                warn!(%category, error = %err, "unable to process category");
                CategoryResult::Failed
            }
        }
    }
}

/// All raw lines reported for a category, across every contract
pub(crate) fn raw_lines(report: &ViolationReport, category: Category) -> Vec<usize> {
    report
        .values()
        .flat_map(|data| data.get(&category).into_iter().flatten().copied())
        .collect()
}

/// Nodes of the expected type starting exactly at the resolved one-based line
pub(crate) fn nodes_starting_at<'a>(ast: &'a Node, line: usize, ty: NodeType) -> Vec<&'a Node> {
    find_nodes_by_line(ast, line)
        .into_iter()
        .filter(|n| n.node_type() == ty && n.start_line() == line)
        .collect()
}

/// Appends a confirmed line unless already present
pub(crate) fn push_confirmed(res: &mut Vec<usize>, line: usize) {
    if !res.contains(&line) {
        res.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_category_round_trip() {
        for category in Category::ALL {
            let parsed: Category = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::Dao).unwrap();
        assert_eq!(json, "\"DAO\"");
        let back: Category = serde_json::from_str("\"MissingInputValidation\"").unwrap();
        assert_eq!(back, Category::MissingInputValidation);
    }

    #[test]
    fn test_failed_is_distinct_from_empty() {
        assert_ne!(
            CategoryResult::Failed,
            CategoryResult::Confirmed(Vec::new())
        );
        assert!(CategoryResult::Failed.is_failed());
        assert_eq!(
            CategoryResult::Confirmed(vec![3]).confirmed_lines(),
            Some(&[3][..])
        );
    }

    #[test]
    fn test_raw_lines_flattens_contracts() {
        let mut report = ViolationReport::new();
        report.insert(
            "A".to_string(),
            BTreeMap::from([(Category::Dao, vec![1, 2])]),
        );
        report.insert("B".to_string(), BTreeMap::from([(Category::Dao, vec![7])]));

        assert_eq!(raw_lines(&report, Category::Dao), vec![1, 2, 7]);
        assert!(raw_lines(&report, Category::LockedEther).is_empty());
    }

    #[test]
    fn test_push_confirmed_dedupes() {
        let mut res = vec![3];
        push_confirmed(&mut res, 3);
        push_confirmed(&mut res, 5);
        assert_eq!(res, vec![3, 5]);
    }
}
