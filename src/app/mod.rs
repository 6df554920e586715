// Application layer: maintenance jobs built on the core utilities.

pub mod pipelines;
