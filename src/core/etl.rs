use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct MaintenanceEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> MaintenanceEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let name = self.pipeline.name().to_string();
        tracing::info!("🚀 Starting job '{}'", name);
        self.monitor.log_stats("Start");

        let documents = self.pipeline.extract().await?;
        let document_count = documents.len();
        tracing::info!("📥 Extracted {} documents", document_count);
        self.monitor.log_stats("Extract");

        let result = self.pipeline.transform(documents).await?;
        tracing::info!(
            "🔄 {} documents to update, {} unchanged, {} skipped",
            result.updates.len(),
            result.unchanged,
            result.skipped
        );
        self.monitor.log_stats("Transform");

        let outcome = self.pipeline.load(&result).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        tracing::info!("✅ Job '{}' finished: {}", name, outcome.output);

        Ok(RunSummary {
            documents: document_count,
            updated: outcome.applied,
            pending: result.updates.len().saturating_sub(outcome.applied),
            unchanged: result.unchanged,
            skipped: result.skipped,
            output: outcome.output,
        })
    }
}
