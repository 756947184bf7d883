//! Classification of `ct lint` output.
//!
//! `ct` reports a missing version bump as free-form text, so detection is a
//! case-insensitive phrase match. Phrases are deliberately multi-word: bare
//! keywords such as "version" also appear in failures caused by missing
//! tools or unrelated validation errors.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Lower-case phrases that signal "chart version not bumped".
pub const VERSION_BUMP_PHRASES: [&str; 4] = [
    "chart version not ok",
    "needs a version bump",
    "version bump",
    "chart version \"not ok\"",
];

/// Chart declaration inside a ct summary line, e.g.
/// `mychart => (version: "0.1.0", path: "charts/mychart")`.
static CHART_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"path:\s*"([^"]+)""#).expect("valid chart path regex"));

fn matches_phrase(lowered: &str) -> bool {
    VERSION_BUMP_PHRASES.iter().any(|p| lowered.contains(p))
}

/// True when the lint report says a chart version must be bumped.
pub fn needs_version_bump(report: &str) -> bool {
    matches_phrase(&report.to_lowercase())
}

/// Chart paths whose output block in a multi-chart report carries a
/// version-bump failure.
///
/// A failure line is attributed to the most recent chart declaration; the
/// declaration is consumed by the first failure so repeated failure lines,
/// or failures after an unrelated block, are not attributed twice.
pub fn charts_needing_bump(report: &str) -> BTreeSet<String> {
    let mut charts = BTreeSet::new();
    let mut current: Option<String> = None;

    for line in report.lines() {
        if let Some(caps) = CHART_PATH.captures(line) {
            current = Some(caps[1].to_string());
        }
        if matches_phrase(&line.to_lowercase()) {
            if let Some(path) = current.take() {
                charts.insert(path);
            }
        }
    }
    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Chart version not ok. Needs a version bump", true)]
    #[case("chart version not ok", true)]
    #[case("Some other text. Needs a version bump.", true)]
    #[case("Please apply a version bump to continue", true)]
    #[case("Error: chart version \"NOT OK\"", true)]
    #[case("Error: yamllint is not installed", false)]
    #[case("Error: yamale is not installed", false)]
    #[case("Error checking version compatibility", false)]
    #[case("Error: Invalid YAML syntax at line 5", false)]
    #[case("All charts linted successfully", false)]
    #[case("", false)]
    fn test_needs_version_bump(#[case] report: &str, #[case] expected: bool) {
        assert_eq!(needs_version_bump(report), expected, "{:?}", report);
    }

    const DECL: &str = r#" mychart => (version: "0.1.0", path: "charts/mychart")"#;

    #[test]
    fn test_single_chart_failure() {
        let report = format!(
            "Charts to be processed:\n{}\n\n>>> Checking chart version...\nError: chart version not ok. Needs a version bump!\n",
            DECL
        );
        let got = charts_needing_bump(&report);
        assert_eq!(got, BTreeSet::from(["charts/mychart".to_string()]));
    }

    #[test]
    fn test_declaration_without_failure() {
        let report = format!("{}\n>>> Linting chart\n✔︎ mychart => lint passed\n", DECL);
        assert!(charts_needing_bump(&report).is_empty());
    }

    #[test]
    fn test_repeated_failure_lines_counted_once() {
        let report = format!(
            "{}\nchart version not ok\nneeds a version bump\n",
            DECL
        );
        assert_eq!(charts_needing_bump(&report).len(), 1);
    }

    #[test]
    fn test_multiple_charts_and_stale_cursor() {
        let report = r#"
 alpha => (version: "1.0.0", path: "charts/alpha")
Error: chart version not ok. Needs a version bump!
 beta => (version: "2.0.0", path: "charts/beta")
lint passed
 gamma => (version: "0.3.0", path: "charts/gamma")
Chart version "not ok"
needs a version bump
"#;
        let got: Vec<String> = charts_needing_bump(report).into_iter().collect();
        // beta's block had no failure, and the trailing phrase after gamma
        // was already consumed by gamma's first failure line
        assert_eq!(got, vec!["charts/alpha", "charts/gamma"]);
    }

    #[test]
    fn test_failure_without_declaration_and_empty_input() {
        assert!(charts_needing_bump("needs a version bump").is_empty());
        assert!(charts_needing_bump("").is_empty());
    }

    #[test]
    fn test_same_chart_declared_twice_is_deduplicated() {
        let report = format!(
            "{d}\nversion bump required\n{d}\nversion bump required\n",
            d = DECL
        );
        assert_eq!(charts_needing_bump(&report).len(), 1);
    }
}
