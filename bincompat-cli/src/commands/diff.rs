//! Diff command - API surface diff between two builds
//!
//! Pairs old and new module files, diffs every pair through the configured
//! queries and prints the report followed by the breaking-change verdict.

use bincompat_core::printer::ReportLine;
use bincompat_core::{
    AssemblyDiffCollection, BreakingChangeRule, BreakingReason, DiffOperation, DiffPrinter,
    DiffSummary,
};
use colored::Colorize;
use serde::Serialize;

use super::{compare, file_names, Comparison};
use crate::config::BincompatConfig;
use crate::output::{Output, OutputFormat, TableDisplay};

/// Diff of one module pair
#[derive(Debug, Serialize)]
pub struct ModuleReport {
    pub module: String,
    pub identical: bool,
    pub summary: DiffSummary,
    pub diff: AssemblyDiffCollection,
    #[serde(skip)]
    pub lines: Vec<ReportLine>,
}

/// Diff result across all module pairs
#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub old: String,
    pub new: String,
    pub modules: Vec<ModuleReport>,
    /// Present only in the old set; reported, not classified.
    pub removed_modules: Vec<String>,
    pub added_modules: Vec<String>,
    pub summary: DiffSummary,
    pub breaking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BreakingReason>,
}

impl DiffReport {
    pub fn from_comparison(old: &str, new: &str, comparison: Comparison) -> Self {
        let printer = DiffPrinter::new();
        let rule = BreakingChangeRule::new();

        let mut summary = DiffSummary::new();
        let mut reason = None;
        let mut modules = Vec::with_capacity(comparison.modules.len());
        for module in comparison.modules {
            let module_summary = module.diff.summary();
            summary.merge(&module_summary);
            if reason.is_none() {
                reason = rule.reason(&module.diff);
            }
            modules.push(ModuleReport {
                lines: printer.lines(&module.diff),
                module: module.module,
                identical: module.identical,
                summary: module_summary,
                diff: module.diff,
            });
        }

        Self {
            old: old.to_string(),
            new: new.to_string(),
            modules,
            removed_modules: file_names(&comparison.paired.removed),
            added_modules: file_names(&comparison.paired.added),
            summary,
            breaking: reason.is_some(),
            reason,
        }
    }
}

/// Colour a report line by its operation.
pub fn colorize(line: &ReportLine) -> String {
    let rendered = line.render();
    match line.operation {
        Some(DiffOperation::Added) => rendered.green().to_string(),
        Some(DiffOperation::Removed) => rendered.red().to_string(),
        None if line.depth == 1 => rendered.bold().to_string(),
        None => rendered,
    }
}

/// One-line verdict shared by `diff` and `check`.
pub fn verdict(reason: Option<&BreakingReason>) -> String {
    match reason {
        Some(reason) => format!("{} {}", "BREAKING:".red().bold(), reason),
        None => format!("{} no breaking changes", "COMPATIBLE:".green().bold()),
    }
}

impl TableDisplay for DiffReport {
    fn to_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            "DIFF:".cyan().bold(),
            self.old.yellow(),
            self.new.green()
        ));

        for module in &self.modules {
            if module.diff.is_empty() {
                continue;
            }
            output.push_str(&format!("\n{} {}\n", "MODULE:".cyan().bold(), module.module));
            for line in &module.lines {
                output.push_str(&colorize(line));
                output.push('\n');
            }
        }

        if !self.removed_modules.is_empty() {
            output.push('\n');
            for name in &self.removed_modules {
                output.push_str(&format!("{} {}\n", "Removed module:".yellow(), name));
            }
        }
        if !self.added_modules.is_empty() {
            output.push('\n');
            for name in &self.added_modules {
                output.push_str(&format!("{} {}\n", "Added module:".green(), name));
            }
        }

        output.push_str(&format!(
            "\n{} ({} modules compared)\n",
            self.summary.text(),
            self.modules.len()
        ));
        output.push_str(&verdict(self.reason.as_ref()));
        output
    }
}

/// Run the diff command
pub async fn run(old: &str, new: &str, config: &BincompatConfig, format: OutputFormat) -> anyhow::Result<()> {
    let comparison = compare(old, new, config).await?;
    let report = DiffReport::from_comparison(old, new, comparison);
    tracing::debug!(modules = report.modules.len(), breaking = report.breaking, "Diff complete");
    Output::new(report, format).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bincompat_core::model::{Access, MethodNode, ModuleGraph, TypeKind, TypeNode, TypeReference, Visibility};
    use bincompat_core::scanner::{ModuleDiff, PairedFiles};
    use bincompat_core::{compute_assembly_diff, QueryAggregator};
    use std::path::PathBuf;

    fn make_comparison(old: Vec<TypeNode>, new: Vec<TypeNode>) -> Comparison {
        let mut old_graph = ModuleGraph::new("Lib");
        old_graph.types = old;
        let mut new_graph = ModuleGraph::new("Lib");
        new_graph.types = new;
        let diff = compute_assembly_diff(
            &old_graph.normalize(),
            &new_graph.normalize(),
            &QueryAggregator::public_api(),
        )
        .unwrap();
        Comparison {
            paired: PairedFiles {
                removed: vec![PathBuf::from("old/Gone.json")],
                ..Default::default()
            },
            modules: vec![ModuleDiff {
                module: "Lib".to_string(),
                old_path: PathBuf::from("old/Lib.json"),
                new_path: PathBuf::from("new/Lib.json"),
                identical: false,
                diff,
            }],
        }
    }

    fn make_class(with_method: bool) -> TypeNode {
        let ty = TypeNode::new("Lib", "A", TypeKind::Class, Visibility::Public);
        if with_method {
            ty.with_method(MethodNode::new("M", TypeReference::void(), Access::Public))
        } else {
            ty
        }
    }

    #[test]
    fn test_report_breaking() {
        colored::control::set_override(false);
        let report = DiffReport::from_comparison("old", "new", make_comparison(vec![make_class(true)], vec![make_class(false)]));
        assert!(report.breaking);
        assert_eq!(report.summary.methods_removed, 1);
        assert_eq!(report.removed_modules, vec!["Gone.json"]);

        let table = report.to_table();
        assert!(table.contains("MODULE: Lib"));
        assert!(table.contains("- public void M()"));
        assert!(table.contains("Removed module: Gone.json"));
        assert!(table.contains("BREAKING:"));
    }

    #[test]
    fn test_report_compatible() {
        colored::control::set_override(false);
        let report = DiffReport::from_comparison("old", "new", make_comparison(vec![make_class(false)], vec![make_class(true)]));
        assert!(!report.breaking);
        assert!(report.reason.is_none());
        assert!(report.to_table().contains("COMPATIBLE: no breaking changes"));
    }
}
