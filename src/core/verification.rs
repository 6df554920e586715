use crate::core::commission::RankTable;
use std::collections::HashSet;

const SAMPLE_BASES: [f64; 5] = [0.0, 1.0, 99.99, 1000.0, 123_456.78];
const TOLERANCE: f64 = 1e-6;
const UNKNOWN_RANK: &str = "__unknown_rank__";

/// Known-good arithmetic, checked whenever the referenced rank exists.
const EXPECTED_CASES: [(&str, f64, f64, f64); 2] = [
    ("dlx-director", 1000.0, 350.0, 650.0),
    ("starter", 1000.0, 0.0, 1000.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub checks: Vec<CheckOutcome>,
}

impl VerificationReport {
    pub fn failed(&self) -> usize {
        self.checks.iter().filter(|check| !check.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// One PASS/FAIL line per check.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .checks
            .iter()
            .map(|check| {
                let status = if check.passed { "PASS" } else { "FAIL" };
                format!("[{}] {} - {}", status, check.name, check.detail)
            })
            .collect();
        lines.push(format!(
            "{} passed, {} failed",
            self.checks.len() - self.failed(),
            self.failed()
        ));
        lines.join("\n")
    }
}

/// Self-check of the rank table's commission arithmetic.
pub fn verify_rank_table(table: &RankTable) -> VerificationReport {
    let mut checks = vec![
        check_percentages(table),
        check_monotonic(table),
        check_labels(table),
        check_unknown_rank_fallback(table),
        check_reconstruction(table),
    ];

    for (rank_id, base, commission, net) in EXPECTED_CASES {
        if table.get(rank_id).is_none() {
            tracing::debug!("Skipping expected case for missing rank '{}'", rank_id);
            continue;
        }
        let result = table.calculate_commission(base, rank_id);
        let passed = (result.commission - commission).abs() < TOLERANCE
            && (result.net - net).abs() < TOLERANCE;
        checks.push(CheckOutcome::new(
            format!("{} on {}", rank_id, base),
            passed,
            format!(
                "expected {}/{}, got {}/{}",
                commission, net, result.commission, result.net
            ),
        ));
    }

    VerificationReport { checks }
}

fn check_percentages(table: &RankTable) -> CheckOutcome {
    let out_of_range: Vec<&str> = table
        .ranks()
        .iter()
        .filter(|rank| rank.percentage > 100)
        .map(|rank| rank.id.as_str())
        .collect();

    if out_of_range.is_empty() {
        CheckOutcome::new(
            "percentages in range",
            true,
            format!("{} ranks within 0-100%", table.ranks().len()),
        )
    } else {
        CheckOutcome::new(
            "percentages in range",
            false,
            format!("out of range: {}", out_of_range.join(", ")),
        )
    }
}

fn check_monotonic(table: &RankTable) -> CheckOutcome {
    let mut ranks = table.ranks().to_vec();
    ranks.sort_by_key(|rank| rank.percentage);

    let base = 1000.0;
    let regression = ranks.windows(2).find(|pair| {
        table.calculate_commission(base, &pair[0].id).commission
            > table.calculate_commission(base, &pair[1].id).commission
    });

    match regression {
        None => CheckOutcome::new(
            "commission non-decreasing",
            true,
            ranks
                .iter()
                .map(|rank| format!("{}={}%", rank.id, rank.percentage))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Some(pair) => CheckOutcome::new(
            "commission non-decreasing",
            false,
            format!("{} pays more than {}", pair[0].id, pair[1].id),
        ),
    }
}

fn check_labels(table: &RankTable) -> CheckOutcome {
    let mut seen = HashSet::new();
    let problem = table.ranks().iter().find_map(|rank| {
        let label = rank.label.trim();
        if label.is_empty() {
            Some(format!("{} has no label", rank.id))
        } else if !seen.insert(label) {
            Some(format!("label '{}' is used more than once", label))
        } else {
            None
        }
    });

    match problem {
        None => CheckOutcome::new("rank labels", true, "labels present and distinct"),
        Some(detail) => CheckOutcome::new("rank labels", false, detail),
    }
}

fn check_unknown_rank_fallback(table: &RankTable) -> CheckOutcome {
    let Some(default_rank) = table.default_rank() else {
        return CheckOutcome::new("unknown rank fallback", false, "rank table is empty");
    };

    let unknown = table.calculate_commission(1000.0, UNKNOWN_RANK);
    let fallback = table.calculate_commission(1000.0, &default_rank.id);
    CheckOutcome::new(
        "unknown rank fallback",
        unknown == fallback,
        format!("falls back to {} ({}%)", default_rank.id, default_rank.percentage),
    )
}

fn check_reconstruction(table: &RankTable) -> CheckOutcome {
    let mismatch = table.ranks().iter().find_map(|rank| {
        SAMPLE_BASES.iter().find_map(|&base| {
            let result = table.calculate_commission(base, &rank.id);
            ((result.commission + result.net - base).abs() >= TOLERANCE)
                .then(|| format!("{} on {}", rank.id, base))
        })
    });

    match mismatch {
        None => CheckOutcome::new(
            "commission + net == base",
            true,
            format!("{} bases x {} ranks", SAMPLE_BASES.len(), table.ranks().len()),
        ),
        Some(detail) => CheckOutcome::new("commission + net == base", false, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RankDefinition;

    #[test]
    fn test_standard_table_passes() {
        let report = verify_rank_table(&RankTable::standard());
        assert!(report.all_passed(), "{}", report.render());
        assert_eq!(report.checks.len(), 7);
        assert!(report.render().ends_with("7 passed, 0 failed"));
    }

    #[test]
    fn test_out_of_range_percentage_fails() {
        let table = RankTable::new(vec![
            RankDefinition::new("starter", "Starter", 0),
            RankDefinition::new("broken", "Broken", 150),
        ]);
        let report = verify_rank_table(&table);
        assert!(!report.all_passed());
        let check = report
            .checks
            .iter()
            .find(|c| c.name == "percentages in range")
            .unwrap();
        assert!(!check.passed);
        assert!(check.detail.contains("broken"));
    }

    #[test]
    fn test_wrong_director_rate_is_caught() {
        let table = RankTable::new(vec![
            RankDefinition::new("starter", "Starter", 0),
            RankDefinition::new("dlx-director", "DLX Director", 40),
        ]);
        let report = verify_rank_table(&table);
        assert_eq!(report.failed(), 1);
        assert!(report.render().contains("[FAIL] dlx-director on 1000"));
    }

    #[test]
    fn test_shadowed_rank_id_breaks_ordering() {
        // The second "silver" is unreachable by id and pays the first one's rate.
        let table = RankTable::new(vec![
            RankDefinition::new("silver", "Silver", 10),
            RankDefinition::new("gold", "Gold", 20),
            RankDefinition::new("silver", "Silver Plus", 30),
        ]);
        let report = verify_rank_table(&table);
        let check = report
            .checks
            .iter()
            .find(|c| c.name == "commission non-decreasing")
            .unwrap();
        assert!(!check.passed);
        assert_eq!(check.detail, "gold pays more than silver");
    }

    #[test]
    fn test_duplicate_or_blank_labels_fail() {
        let duplicate = RankTable::new(vec![
            RankDefinition::new("starter", "Member", 0),
            RankDefinition::new("dlx-director", "Member", 35),
        ]);
        let report = verify_rank_table(&duplicate);
        assert_eq!(report.failed(), 1);
        assert!(report
            .render()
            .contains("[FAIL] rank labels - label 'Member' is used more than once"));

        let blank = RankTable::new(vec![RankDefinition::new("starter", "", 0)]);
        assert!(verify_rank_table(&blank)
            .render()
            .contains("[FAIL] rank labels - starter has no label"));
    }

    #[test]
    fn test_empty_table_fails_fallback() {
        let report = verify_rank_table(&RankTable::new(vec![]));
        assert!(!report.all_passed());
    }
}
