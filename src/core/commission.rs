use crate::domain::model::{CommissionResult, RankDefinition};
use crate::utils::error::{MaintError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_unique, Validate};

/// Rank → commission percentage lookup, built once per process and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    ranks: Vec<RankDefinition>,
}

impl RankTable {
    pub fn new(ranks: Vec<RankDefinition>) -> Self {
        Self { ranks }
    }

    /// The standard storefront ranks.
    pub fn standard() -> Self {
        Self::new(vec![
            RankDefinition::new("starter", "Starter", 0),
            RankDefinition::new("dlx-associate", "DLX Associate", 25),
            RankDefinition::new("dlx-manager", "DLX Manager", 30),
            RankDefinition::new("dlx-director", "DLX Director", 35),
            RankDefinition::new("dlx-president", "DLX President", 45),
        ])
    }

    pub fn ranks(&self) -> &[RankDefinition] {
        &self.ranks
    }

    pub fn get(&self, rank_id: &str) -> Option<&RankDefinition> {
        self.ranks.iter().find(|rank| rank.id == rank_id)
    }

    /// Lowest-percentage rank; first one wins on ties.
    pub fn default_rank(&self) -> Option<&RankDefinition> {
        self.ranks.iter().reduce(|lowest, rank| {
            if rank.percentage < lowest.percentage {
                rank
            } else {
                lowest
            }
        })
    }

    /// Whether `rank_id` names a rank directly, without falling back.
    pub fn is_known(&self, rank_id: &str) -> bool {
        self.get(rank_id.trim()).is_some()
    }

    /// Resolves a possibly stale or missing rank id.
    pub fn resolve(&self, rank_id: &str) -> Option<&RankDefinition> {
        self.get(rank_id.trim()).or_else(|| self.default_rank())
    }

    pub fn percentage_for(&self, rank_id: &str) -> u8 {
        self.resolve(rank_id).map(|rank| rank.percentage).unwrap_or(0)
    }

    /// Commission and net for `base_amount`. Unknown ranks use the default
    /// rank. No rounding is applied.
    pub fn calculate_commission(&self, base_amount: f64, rank_id: &str) -> CommissionResult {
        let percentage = f64::from(self.percentage_for(rank_id));
        let commission = base_amount * percentage / 100.0;
        CommissionResult {
            commission,
            net: base_amount - commission,
        }
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl Validate for RankTable {
    fn validate(&self) -> Result<()> {
        if self.ranks.is_empty() {
            return Err(MaintError::ConfigError {
                message: "rank table must define at least one rank".to_string(),
            });
        }

        for rank in &self.ranks {
            validate_non_empty_string("ranks.id", &rank.id)?;
            validate_non_empty_string("ranks.label", &rank.label)?;
            validate_range("ranks.percentage", rank.percentage, 0, 100)?;
        }

        validate_unique("ranks.id", self.ranks.iter().map(|rank| rank.id.as_str()))
    }
}
