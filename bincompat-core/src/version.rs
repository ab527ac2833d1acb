//! Semantic version decision from a breaking-change verdict.

use semver::Version;
use serde::Serialize;

use crate::differ::AssemblyDiffCollection;
use crate::error::{DiffError, Result};
use crate::rules::{BreakingChangeRule, BreakingReason};

/// Outcome of a version analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub breaking_changes_detected: bool,
    /// The proposed version, or the next major version when breaking.
    pub version_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BreakingReason>,
}

#[derive(Clone, Debug, Default)]
pub struct SemanticVersionAnalyzer {
    rule: BreakingChangeRule,
}

impl SemanticVersionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every module diff and decide the version to release.
    pub fn analyze(&self, diffs: &[AssemblyDiffCollection], proposed: &str) -> Result<AnalysisResult> {
        let reason = diffs.iter().find_map(|diff| self.rule.reason(diff));
        let breaking = reason.is_some();
        let version_number = Self::decide(proposed, breaking)?;
        tracing::debug!(proposed, decided = %version_number, breaking, "Version decided");
        Ok(AnalysisResult {
            breaking_changes_detected: breaking,
            version_number,
            reason,
        })
    }

    /// `(major+1).0.0` when breaking, otherwise the proposed version.
    ///
    /// A leading `v` is accepted. Pre-release and build metadata are dropped
    /// on a major bump.
    pub fn decide(proposed: &str, breaking: bool) -> Result<String> {
        let trimmed = proposed.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let version = Version::parse(trimmed).map_err(|source| DiffError::Version {
            version: proposed.to_string(),
            source,
        })?;

        if breaking {
            let major = version.major.checked_add(1).ok_or_else(|| {
                DiffError::argument("version", format!("major version of {} cannot be bumped", proposed))
            })?;
            Ok(Version::new(major, 0, 0).to_string())
        } else {
            Ok(version.to_string())
        }
    }
}
