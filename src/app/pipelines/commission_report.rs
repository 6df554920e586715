use crate::app::pipelines::apply_updates;
use crate::config::toml_config::CommissionsConfig;
use crate::core::commission::RankTable;
use crate::core::currency::strip_formatting;
use crate::core::{
    Document, DocumentStore, DocumentUpdate, LoadOutcome, Pipeline, Storage, TransformResult,
};
use crate::utils::error::{MaintError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const COMMISSION_FIELD: &str = "commission";
const NET_FIELD: &str = "netAmount";
const COMPUTED_AT_FIELD: &str = "commissionComputedAt";

#[derive(Debug, Serialize)]
struct CommissionRow<'a> {
    id: &'a str,
    rank: &'a str,
    percentage: Option<u8>,
    amount: String,
    commission: String,
    net: String,
}

/// Computes commission per document and renders a CSV report; optionally
/// persists the computed values back onto each document.
pub struct CommissionReportPipeline<D: DocumentStore, S: Storage> {
    store: D,
    storage: S,
    config: CommissionsConfig,
    ranks: Arc<RankTable>,
    output_path: String,
    dry_run: bool,
    computed_at: DateTime<Utc>,
}

impl<D: DocumentStore, S: Storage> CommissionReportPipeline<D, S> {
    pub fn new(
        store: D,
        storage: S,
        config: &CommissionsConfig,
        ranks: Arc<RankTable>,
        output_path: &str,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            storage,
            config: config.clone(),
            ranks,
            output_path: output_path.to_string(),
            dry_run,
            computed_at: Utc::now(),
        }
    }

    fn base_amount(value: &serde_json::Value) -> Option<f64> {
        let amount = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => strip_formatting(s).parse::<f64>().ok(),
            _ => None,
        };
        amount.filter(|a| a.is_finite())
    }

    fn needs_persist(document: &Document, commission: f64, net: f64) -> bool {
        let stored = |field: &str| document.get(field).and_then(|v| v.as_f64());
        stored(COMMISSION_FIELD) != Some(commission) || stored(NET_FIELD) != Some(net)
    }
}

#[async_trait::async_trait]
impl<D: DocumentStore, S: Storage> Pipeline for CommissionReportPipeline<D, S> {
    fn name(&self) -> &str {
        "commissions"
    }

    async fn extract(&self) -> Result<Vec<Document>> {
        self.store.list_documents(&self.config.collection).await
    }

    async fn transform(&self, documents: Vec<Document>) -> Result<TransformResult> {
        let mut result = TransformResult::default();
        let mut writer = csv::Writer::from_writer(Vec::new());
        let (mut total_amount, mut total_commission, mut total_net) = (0.0, 0.0, 0.0);

        for document in &documents {
            let Some(amount) = document
                .get(&self.config.amount_field)
                .and_then(Self::base_amount)
            else {
                tracing::warn!(
                    "⚠️ {}/{}: no usable '{}' amount, skipping",
                    self.config.collection,
                    document.id,
                    self.config.amount_field
                );
                result.skipped += 1;
                continue;
            };

            let rank_id = document
                .get(&self.config.rank_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let rank = self.ranks.resolve(rank_id);
            let calculated = self.ranks.calculate_commission(amount, rank_id);

            if !self.ranks.is_known(rank_id) {
                tracing::debug!(
                    "{}/{}: rank '{}' not in table, using default",
                    self.config.collection,
                    document.id,
                    rank_id
                );
            }

            writer.serialize(CommissionRow {
                id: &document.id,
                rank: rank.map(|r| r.id.as_str()).unwrap_or_default(),
                percentage: rank.map(|r| r.percentage),
                amount: format!("{:.2}", amount),
                commission: format!("{:.2}", calculated.commission),
                net: format!("{:.2}", calculated.net),
            })?;

            total_amount += amount;
            total_commission += calculated.commission;
            total_net += calculated.net;

            if self.config.persist
                && Self::needs_persist(document, calculated.commission, calculated.net)
            {
                let mut fields = HashMap::new();
                fields.insert(COMMISSION_FIELD.to_string(), serde_json::json!(calculated.commission));
                fields.insert(NET_FIELD.to_string(), serde_json::json!(calculated.net));
                fields.insert(
                    COMPUTED_AT_FIELD.to_string(),
                    serde_json::Value::String(
                        self.computed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    ),
                );
                result.updates.push(DocumentUpdate {
                    id: document.id.clone(),
                    fields,
                });
            } else {
                result.unchanged += 1;
            }
        }

        writer.serialize(CommissionRow {
            id: "TOTAL",
            rank: "",
            percentage: None,
            amount: format!("{:.2}", total_amount),
            commission: format!("{:.2}", total_commission),
            net: format!("{:.2}", total_net),
        })?;

        let bytes = writer.into_inner().map_err(|e| MaintError::ProcessingError {
            message: format!("failed to finish commission report: {}", e),
        })?;
        result.report = Some(String::from_utf8_lossy(&bytes).into_owned());

        Ok(result)
    }

    async fn load(&self, result: &TransformResult) -> Result<LoadOutcome> {
        if let Some(report) = &result.report {
            self.storage
                .write_file(&self.config.report_file, report.as_bytes())
                .await?;
        }

        let applied = apply_updates(
            &self.store,
            &self.config.collection,
            &result.updates,
            self.dry_run,
        )
        .await?;

        Ok(LoadOutcome {
            applied,
            output: Path::new(&self.output_path)
                .join(&self.config.report_file)
                .display()
                .to_string(),
        })
    }
}
