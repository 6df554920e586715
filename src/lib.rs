pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::{
    json_store::JsonFileStore, rest_store::RestDocumentStore, storage::LocalStorage,
    ConfiguredStore,
};
pub use app::pipelines::{CommissionReportPipeline, PriceMigrationPipeline, ReferralSeedPipeline};
pub use config::MaintConfig;
pub use core::commission::RankTable;
pub use core::currency::{normalize_amount, normalize_currency};
pub use core::etl::MaintenanceEngine;
pub use domain::model::{CommissionResult, Currency, Document, PriceInput, RankDefinition};
pub use utils::error::{MaintError, Result};
