use clap::Parser;
use std::sync::Arc;
use storefront_maint::core::verification::verify_rank_table;
use storefront_maint::utils::{logger, validation::Validate};
use storefront_maint::{
    normalize_amount, Cli, Command, CommissionReportPipeline, ConfiguredStore, LocalStorage,
    MaintConfig, MaintError, MaintenanceEngine, PriceMigrationPipeline, ReferralSeedPipeline,
    Result,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Job failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn load_config(path: &str) -> Result<MaintConfig> {
    tracing::info!("📁 Loading configuration from: {}", path);
    let config = MaintConfig::from_file(path)?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Normalize { value, currency } => {
            println!("{}", normalize_amount(value, currency));
            Ok(())
        }
        Command::VerifyRanks => {
            let config = load_config(&cli.config)?;
            let report = verify_rank_table(&config.rank_table());
            println!("{}", report.render());
            if report.all_passed() {
                Ok(())
            } else {
                Err(MaintError::VerificationFailed {
                    failed: report.failed(),
                })
            }
        }
        Command::NormalizePrices => {
            let config = load_config(&cli.config)?;
            let monitor = cli.monitor || config.monitoring_enabled();
            let store = ConfiguredStore::from_config(&config)?;
            let pipeline = PriceMigrationPipeline::new(store, &config.prices, cli.dry_run);
            let summary = MaintenanceEngine::new_with_monitoring(pipeline, monitor)
                .run()
                .await?;
            println!("✅ {}", summary);
            Ok(())
        }
        Command::Commissions => {
            let config = load_config(&cli.config)?;
            let monitor = cli.monitor || config.monitoring_enabled();
            let store = ConfiguredStore::from_config(&config)?;
            let storage = LocalStorage::new(config.output.path.clone());
            let pipeline = CommissionReportPipeline::new(
                store,
                storage,
                &config.commissions,
                Arc::new(config.rank_table()),
                &config.output.path,
                cli.dry_run,
            );
            let summary = MaintenanceEngine::new_with_monitoring(pipeline, monitor)
                .run()
                .await?;
            println!("✅ {}", summary);
            Ok(())
        }
        Command::SeedReferrals => {
            let config = load_config(&cli.config)?;
            let monitor = cli.monitor || config.monitoring_enabled();
            let store = ConfiguredStore::from_config(&config)?;
            let pipeline = ReferralSeedPipeline::new(store, &config.referrals, cli.dry_run);
            let summary = MaintenanceEngine::new_with_monitoring(pipeline, monitor)
                .run()
                .await?;
            println!("✅ {}", summary);
            Ok(())
        }
    }
}
