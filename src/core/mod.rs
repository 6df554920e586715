pub mod commission;
pub mod currency;
pub mod etl;
pub mod verification;

pub use crate::domain::model::{
    Document, DocumentUpdate, LoadOutcome, RunSummary, TransformResult,
};
pub use crate::domain::ports::{DocumentStore, Pipeline, Storage};
pub use crate::utils::error::Result;
