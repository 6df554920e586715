use crate::core::commission::RankTable;
use crate::domain::model::{Currency, RankDefinition};
use crate::utils::error::{MaintError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub prices: PricesConfig,
    #[serde(default)]
    pub commissions: CommissionsConfig,
    #[serde(default)]
    pub referrals: ReferralsConfig,
    /// Overrides the standard rank table when present.
    pub ranks: Option<Vec<RankDefinition>>,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Json,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub r#type: StoreKind,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFieldConfig {
    pub name: String,
    pub currency: Currency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesConfig {
    #[serde(default = "default_prices_collection")]
    pub collection: String,
    #[serde(default = "default_price_fields")]
    pub fields: Vec<PriceFieldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionsConfig {
    #[serde(default = "default_commissions_collection")]
    pub collection: String,
    #[serde(default = "default_amount_field")]
    pub amount_field: String,
    #[serde(default = "default_rank_field")]
    pub rank_field: String,
    #[serde(default)]
    pub persist: bool,
    #[serde(default = "default_report_file")]
    pub report_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralsConfig {
    #[serde(default = "default_referrals_collection")]
    pub collection: String,
    #[serde(default = "default_referrer_field")]
    pub referrer_field: String,
    #[serde(default = "default_level_field")]
    pub level_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_prices_collection() -> String {
    "products".to_string()
}

fn default_price_fields() -> Vec<PriceFieldConfig> {
    vec![
        PriceFieldConfig {
            name: "price".to_string(),
            currency: Currency::Usd,
        },
        PriceFieldConfig {
            name: "priceInr".to_string(),
            currency: Currency::Inr,
        },
    ]
}

fn default_commissions_collection() -> String {
    "orders".to_string()
}

fn default_amount_field() -> String {
    "amount".to_string()
}

fn default_rank_field() -> String {
    "rankId".to_string()
}

fn default_report_file() -> String {
    "commissions.csv".to_string()
}

fn default_referrals_collection() -> String {
    "users".to_string()
}

fn default_referrer_field() -> String {
    "referredBy".to_string()
}

fn default_level_field() -> String {
    "referralLevel".to_string()
}

fn default_output_path() -> String {
    "./output".to_string()
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            collection: default_prices_collection(),
            fields: default_price_fields(),
        }
    }
}

impl Default for CommissionsConfig {
    fn default() -> Self {
        Self {
            collection: default_commissions_collection(),
            amount_field: default_amount_field(),
            rank_field: default_rank_field(),
            persist: false,
            report_file: default_report_file(),
        }
    }
}

impl Default for ReferralsConfig {
    fn default() -> Self {
        Self {
            collection: default_referrals_collection(),
            referrer_field: default_referrer_field(),
            level_field: default_level_field(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

impl MaintConfig {
    /// Loads a config file; `${VAR}` references are substituted before parsing.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// The rank table every job shares for this run.
    pub fn rank_table(&self) -> RankTable {
        match &self.ranks {
            Some(ranks) => RankTable::new(ranks.clone()),
            None => RankTable::standard(),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_seconds.unwrap_or(30))
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        match self.r#type {
            StoreKind::Json => {
                let path = validate_required_field("store.path", &self.path)?;
                validate_path("store.path", path)?;
            }
            StoreKind::Rest => {
                let endpoint = validate_required_field("store.endpoint", &self.endpoint)?;
                validate_url("store.endpoint", endpoint)?;
                if let Some(token) = &self.token {
                    if token.starts_with("${") {
                        return Err(MaintError::ConfigError {
                            message: format!("store.token references unset variable {}", token),
                        });
                    }
                }
            }
        }

        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("store.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}

impl Validate for MaintConfig {
    fn validate(&self) -> Result<()> {
        self.store.validate()?;

        validate_non_empty_string("prices.collection", &self.prices.collection)?;
        for field in &self.prices.fields {
            validate_non_empty_string("prices.fields.name", &field.name)?;
        }

        validate_non_empty_string("commissions.collection", &self.commissions.collection)?;
        validate_non_empty_string("commissions.amount_field", &self.commissions.amount_field)?;
        validate_non_empty_string("commissions.rank_field", &self.commissions.rank_field)?;
        validate_path("commissions.report_file", &self.commissions.report_file)?;

        validate_non_empty_string("referrals.collection", &self.referrals.collection)?;
        validate_non_empty_string("referrals.referrer_field", &self.referrals.referrer_field)?;
        validate_non_empty_string("referrals.level_field", &self.referrals.level_field)?;

        validate_path("output.path", &self.output.path)?;

        self.rank_table().validate()
    }
}
