//! Runner for the `BidiTest.txt` conformance format.
//!
//! The file interleaves `@Levels:` / `@Reorder:` directives with case lines
//! of the form `CLASS CLASS …; bitset`. Directives stick until overridden.
//! Bitset bits select the paragraph directions to check: 1 = auto, 2 = LTR,
//! 4 = RTL. A case passes when, for every selected direction, the resolved
//! levels match the directive (`x` entries are don't-care) and the rule-L2
//! ordering of the remaining positions matches `@Reorder:`.

use anyhow::{bail, Context, Result};

use crate::bidi::{reorder_visual, BaseLevel, BidiEngine};
use crate::class::BidiClass;

/// Outcome of a conformance run.
#[derive(Debug, Default)]
pub struct ConformanceReport {
    /// Individual direction checks executed (cases × selected directions).
    pub checks: usize,
    pub passed: usize,
    pub failed: usize,
    /// Human-readable details for the first failures, capped.
    pub failures: Vec<String>,
}

const FAILURE_DETAIL_CAP: usize = 16;

impl ConformanceReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    fn record_failure(&mut self, detail: String) {
        self.failed += 1;
        if self.failures.len() < FAILURE_DETAIL_CAP {
            self.failures.push(detail);
        }
    }
}

fn parse_levels(rest: &str, line_no: usize) -> Result<Vec<Option<u8>>> {
    rest.split_whitespace()
        .map(|tok| {
            if tok == "x" {
                Ok(None)
            } else {
                tok.parse::<u8>()
                    .map(Some)
                    .with_context(|| format!("line {line_no}: bad level {tok:?}"))
            }
        })
        .collect()
}

fn parse_reorder(rest: &str, line_no: usize) -> Result<Vec<usize>> {
    rest.split_whitespace()
        .map(|tok| {
            tok.parse::<usize>()
                .with_context(|| format!("line {line_no}: bad reorder index {tok:?}"))
        })
        .collect()
}

fn selected_directions(bitset: u32) -> Vec<(&'static str, BaseLevel)> {
    let mut out = Vec::new();
    if bitset & 1 != 0 {
        out.push(("auto", BaseLevel::Auto));
    }
    if bitset & 2 != 0 {
        out.push(("ltr", BaseLevel::Ltr));
    }
    if bitset & 4 != 0 {
        out.push(("rtl", BaseLevel::Rtl));
    }
    out
}

/// Run every case in `input` and report pass/fail counts.
pub fn run_conformance(input: &str) -> Result<ConformanceReport> {
    let engine = BidiEngine::new();
    let mut expected_levels: Vec<Option<u8>> = Vec::new();
    let mut expected_reorder: Vec<usize> = Vec::new();
    let mut report = ConformanceReport::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("@Levels:") {
            expected_levels = parse_levels(rest, line_no)?;
            continue;
        }
        if let Some(rest) = line.strip_prefix("@Reorder:") {
            expected_reorder = parse_reorder(rest, line_no)?;
            continue;
        }
        if line.starts_with('@') {
            // Unknown directive; the upstream file reserves the prefix.
            continue;
        }

        let Some((class_part, bits_part)) = line.split_once(';') else {
            bail!("line {line_no}: malformed case {line:?}");
        };
        let classes: Vec<BidiClass> = class_part
            .split_whitespace()
            .map(|name| {
                BidiClass::from_name(name)
                    .with_context(|| format!("line {line_no}: unknown class {name:?}"))
            })
            .collect::<Result<_>>()?;
        let bitset: u32 = bits_part
            .trim()
            .parse()
            .with_context(|| format!("line {line_no}: bad bitset {bits_part:?}"))?;
        if classes.len() != expected_levels.len() {
            bail!(
                "line {line_no}: case length {} does not match @Levels length {}",
                classes.len(),
                expected_levels.len()
            );
        }

        for (name, base) in selected_directions(bitset) {
            report.checks += 1;
            let para = engine.resolve_classes(&classes, base);

            let levels_ok = expected_levels
                .iter()
                .zip(&para.levels)
                .all(|(expected, actual)| expected.is_none_or(|e| e == *actual));

            // Reorder compares only the positions the directive keeps.
            let kept: Vec<usize> = (0..classes.len())
                .filter(|&i| expected_levels[i].is_some())
                .collect();
            let actual_order = reorder_visual(&kept, &para.levels);
            let reorder_ok = actual_order == expected_reorder;

            if levels_ok && reorder_ok {
                report.passed += 1;
            } else {
                report.record_failure(format!(
                    "line {line_no} [{name}]: levels {:?} (expected {:?}), reorder {:?} (expected {:?})",
                    para.levels, expected_levels, actual_order, expected_reorder
                ));
            }
        }
    }
    tracing::debug!(
        target: "bidi.conformance",
        checks = report.checks,
        passed = report.passed,
        failed = report.failed,
        "conformance_run"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directives_and_runs_cases() {
        let input = "\
# comment\n\
@Levels: 0 1\n\
@Reorder: 0 1\n\
L R; 3\n";
        let report = run_conformance(input).unwrap();
        assert_eq!(report.checks, 2);
        assert_eq!(report.failed, 0, "failures: {:?}", report.failures);
    }

    #[test]
    fn dont_care_levels_are_skipped() {
        let input = "\
@Levels: 0 x 1 x\n\
@Reorder: 0 2\n\
L RLE R PDF; 3\n";
        let report = run_conformance(input).unwrap();
        assert!(report.all_passed(), "failures: {:?}", report.failures);
    }

    #[test]
    fn failing_expectation_is_reported() {
        let input = "\
@Levels: 5 5\n\
@Reorder: 0 1\n\
L L; 2\n";
        let report = run_conformance(input).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("line 3"));
    }

    #[test]
    fn malformed_case_is_an_error() {
        assert!(run_conformance("@Levels: 0\n@Reorder: 0\nL L; 2\n").is_err());
        assert!(run_conformance("no-semicolon\n").is_err());
        assert!(run_conformance("@Levels: 0\n@Reorder: 0\nQQ; 1\n").is_err());
    }
}
