//! Check command - breaking-change verdict and release version
//!
//! Runs the same comparison as `diff` but prints only the verdict and, when a
//! proposed version is given, the version the release must carry.

use bincompat_core::{BreakingReason, SemanticVersionAnalyzer};
use colored::Colorize;
use serde::Serialize;

use super::diff::verdict;
use super::{compare, file_names};
use crate::config::BincompatConfig;
use crate::output::{Output, OutputFormat, TableDisplay};

/// Check result
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub breaking_changes_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BreakingReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,
    pub modules_compared: usize,
    pub removed_modules: Vec<String>,
}

impl TableDisplay for CheckResult {
    fn to_table(&self) -> String {
        let mut output = verdict(self.reason.as_ref());
        output.push_str(&format!(
            "\n{} {}",
            "Modules compared:".cyan(),
            self.modules_compared
        ));
        for name in &self.removed_modules {
            output.push_str(&format!("\n{} {}", "Removed module:".yellow(), name));
        }
        if let (Some(proposed), Some(decided)) = (&self.proposed_version, &self.version_number) {
            let decided = if proposed == decided {
                decided.green()
            } else {
                decided.red().bold()
            };
            output.push_str(&format!("\n{} {} -> {}", "Version:".cyan(), proposed, decided));
        }
        output
    }
}

/// Run the check command; returns whether a breaking change was found.
pub async fn run(
    old: &str,
    new: &str,
    proposed_version: Option<&str>,
    config: &BincompatConfig,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let comparison = compare(old, new, config).await?;
    let diffs: Vec<_> = comparison.modules.into_iter().map(|m| m.diff).collect();

    let analyzer = SemanticVersionAnalyzer::new();
    // Any valid version works when only the verdict is needed.
    let analysis = analyzer.analyze(&diffs, proposed_version.unwrap_or("0.0.0"))?;

    let result = CheckResult {
        breaking_changes_detected: analysis.breaking_changes_detected,
        reason: analysis.reason,
        proposed_version: proposed_version.map(str::to_string),
        version_number: proposed_version.map(|_| analysis.version_number),
        modules_compared: diffs.len(),
        removed_modules: file_names(&comparison.paired.removed),
    };
    let breaking = result.breaking_changes_detected;
    Output::new(result, format).render()?;
    Ok(breaking)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(breaking: bool) -> CheckResult {
        CheckResult {
            breaking_changes_detected: breaking,
            reason: breaking.then(|| BreakingReason::MethodRemoved("Lib.A".to_string())),
            proposed_version: Some("1.2.0".to_string()),
            version_number: Some(if breaking { "2.0.0" } else { "1.2.0" }.to_string()),
            modules_compared: 1,
            removed_modules: vec![],
        }
    }

    #[test]
    fn test_check_table_breaking() {
        colored::control::set_override(false);
        let table = make_result(true).to_table();
        assert!(table.contains("BREAKING: a method was removed from Lib.A"));
        assert!(table.contains("Version: 1.2.0 -> 2.0.0"));
    }

    #[test]
    fn test_check_json_omits_missing_reason() {
        let json = crate::output::JsonOutput::format(&make_result(false));
        assert!(json.contains("\"breaking_changes_detected\": false"));
        assert!(!json.contains("\"reason\""));
    }
}
