use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A document from the store: its id plus top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: HashMap<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: serde_json::Value) -> Self {
        self.data.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.get(name)
    }
}

/// Merge update for a single document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpdate {
    pub id: String,
    pub fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub updates: Vec<DocumentUpdate>,
    pub unchanged: usize,
    pub skipped: usize,
    /// Rendered report, for jobs that produce one.
    pub report: Option<String>,
}

/// What a pipeline's load step did: writes that reached the store, plus a
/// description of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub applied: usize,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub updated: usize,
    /// Queued updates that were not written (dry run).
    pub pending: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub output: String,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} documents: {} updated, ", self.documents, self.updated)?;
        if self.pending > 0 {
            write!(f, "{} pending, ", self.pending)?;
        }
        write!(
            f,
            "{} unchanged, {} skipped -> {}",
            self.unchanged, self.skipped, self.output
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Inr,
}

impl Currency {
    pub fn symbol(self) -> char {
        match self {
            Currency::Usd => '$',
            Currency::Inr => '₹',
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Inr => write!(f, "INR"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "INR" => Ok(Currency::Inr),
            other => Err(format!("unsupported currency '{}' (expected USD or INR)", other)),
        }
    }
}

/// Raw price value as stored: free-form text or a JSON number.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceInput {
    Text(String),
    Number(f64),
}

impl PriceInput {
    /// `None` for JSON null. Arrays, objects and booleans are not prices
    /// and also map to `None`; callers that care use [`PriceInput::is_price_like`].
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(PriceInput::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(PriceInput::Number),
            _ => None,
        }
    }

    pub fn is_price_like(value: &serde_json::Value) -> bool {
        matches!(
            value,
            serde_json::Value::String(_) | serde_json::Value::Number(_) | serde_json::Value::Null
        )
    }

    pub fn to_raw_string(&self) -> String {
        match self {
            PriceInput::Text(s) => s.clone(),
            PriceInput::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        PriceInput::Text(value.to_string())
    }
}

impl From<String> for PriceInput {
    fn from(value: String) -> Self {
        PriceInput::Text(value)
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

impl From<i64> for PriceInput {
    fn from(value: i64) -> Self {
        PriceInput::Number(value as f64)
    }
}

impl From<u64> for PriceInput {
    fn from(value: u64) -> Self {
        PriceInput::Number(value as f64)
    }
}

impl From<i32> for PriceInput {
    fn from(value: i32) -> Self {
        PriceInput::Number(f64::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDefinition {
    pub id: String,
    pub label: String,
    pub percentage: u8,
}

impl RankDefinition {
    pub fn new(id: &str, label: &str, percentage: u8) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            percentage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionResult {
    pub commission: f64,
    pub net: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_input_from_json() {
        assert_eq!(
            PriceInput::from_json(&json!("$20")),
            Some(PriceInput::Text("$20".to_string()))
        );
        assert_eq!(PriceInput::from_json(&json!(1700)), Some(PriceInput::Number(1700.0)));
        assert_eq!(PriceInput::from_json(&json!(null)), None);
        assert_eq!(PriceInput::from_json(&json!([1, 2])), None);
        assert!(!PriceInput::is_price_like(&json!({"amount": 1})));
    }

    #[test]
    fn test_number_raw_string_has_no_trailing_fraction() {
        assert_eq!(PriceInput::from(1700).to_raw_string(), "1700");
        assert_eq!(PriceInput::from(29.99).to_raw_string(), "29.99");
    }

    #[test]
    fn test_run_summary_display() {
        let mut summary = RunSummary {
            documents: 5,
            updated: 4,
            pending: 0,
            unchanged: 1,
            skipped: 0,
            output: "4 documents updated in 'products'".to_string(),
        };
        assert_eq!(
            summary.to_string(),
            "5 documents: 4 updated, 1 unchanged, 0 skipped -> 4 documents updated in 'products'"
        );

        summary.updated = 0;
        summary.pending = 4;
        summary.output = "dry run".to_string();
        assert_eq!(
            summary.to_string(),
            "5 documents: 0 updated, 4 pending, 1 unchanged, 0 skipped -> dry run"
        );
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert_eq!(" INR ".parse::<Currency>(), Ok(Currency::Inr));
        assert!("EUR".parse::<Currency>().is_err());
        assert_eq!(Currency::Inr.to_string(), "INR");
    }
}
