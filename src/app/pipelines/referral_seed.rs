use crate::app::pipelines::apply_updates;
use crate::config::toml_config::ReferralsConfig;
use crate::core::{
    Document, DocumentStore, DocumentUpdate, LoadOutcome, Pipeline, TransformResult,
};
use crate::utils::error::Result;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralAssignment {
    pub id: String,
    pub level: u8,
    pub referrer: Option<String>,
}

/// Splits `ids` (already ordered) into three contiguous levels. Level-2 ids
/// are referred round-robin by level 1, level-3 ids by level 2. With fewer
/// than three ids everyone sits on level 1.
pub fn assign_referral_levels(ids: &[String]) -> Vec<ReferralAssignment> {
    let total = ids.len();
    if total < 3 {
        return ids
            .iter()
            .map(|id| ReferralAssignment {
                id: id.clone(),
                level: 1,
                referrer: None,
            })
            .collect();
    }

    let first = total.div_ceil(3);
    let second = (total - first).div_ceil(2);
    let (level_one, rest) = ids.split_at(first);
    let (level_two, level_three) = rest.split_at(second);

    let mut assignments = Vec::with_capacity(total);
    assignments.extend(level_one.iter().map(|id| ReferralAssignment {
        id: id.clone(),
        level: 1,
        referrer: None,
    }));
    assignments.extend(level_two.iter().enumerate().map(|(i, id)| ReferralAssignment {
        id: id.clone(),
        level: 2,
        referrer: Some(level_one[i % level_one.len()].clone()),
    }));
    assignments.extend(level_three.iter().enumerate().map(|(i, id)| ReferralAssignment {
        id: id.clone(),
        level: 3,
        referrer: Some(level_two[i % level_two.len()].clone()),
    }));
    assignments
}

/// Seeds a deterministic referral chain over the users collection.
pub struct ReferralSeedPipeline<D: DocumentStore> {
    store: D,
    config: ReferralsConfig,
    dry_run: bool,
}

impl<D: DocumentStore> ReferralSeedPipeline<D> {
    pub fn new(store: D, config: &ReferralsConfig, dry_run: bool) -> Self {
        Self {
            store,
            config: config.clone(),
            dry_run,
        }
    }
}

#[async_trait::async_trait]
impl<D: DocumentStore> Pipeline for ReferralSeedPipeline<D> {
    fn name(&self) -> &str {
        "seed-referrals"
    }

    async fn extract(&self) -> Result<Vec<Document>> {
        let mut documents = self.store.list_documents(&self.config.collection).await?;
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    async fn transform(&self, documents: Vec<Document>) -> Result<TransformResult> {
        let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        let by_id: HashMap<&str, &Document> =
            documents.iter().map(|d| (d.id.as_str(), d)).collect();

        let mut result = TransformResult::default();
        for assignment in assign_referral_levels(&ids) {
            let referrer = assignment
                .referrer
                .clone()
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null);
            let level = serde_json::Value::from(assignment.level);

            let current = by_id.get(assignment.id.as_str());
            let up_to_date = current.is_some_and(|doc| {
                doc.get(&self.config.referrer_field) == Some(&referrer)
                    && doc.get(&self.config.level_field) == Some(&level)
            });
            if up_to_date {
                result.unchanged += 1;
                continue;
            }

            tracing::debug!(
                "{}: level {} referred by {:?}",
                assignment.id,
                assignment.level,
                assignment.referrer
            );
            let mut fields = HashMap::new();
            fields.insert(self.config.referrer_field.clone(), referrer);
            fields.insert(self.config.level_field.clone(), level);
            result.updates.push(DocumentUpdate {
                id: assignment.id,
                fields,
            });
        }

        Ok(result)
    }

    async fn load(&self, result: &TransformResult) -> Result<LoadOutcome> {
        let applied = apply_updates(
            &self.store,
            &self.config.collection,
            &result.updates,
            self.dry_run,
        )
        .await?;

        let output = if self.dry_run {
            format!(
                "dry run: {} users in '{}' would be linked",
                result.updates.len(),
                self.config.collection
            )
        } else {
            format!("{} users linked in '{}'", applied, self.config.collection)
        };
        Ok(LoadOutcome { applied, output })
    }
}
