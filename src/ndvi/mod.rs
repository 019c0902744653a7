//! NDVI computation: pixel arithmetic, the per-item driver and the batch loop.

pub mod batch_runner;
pub mod error;
pub mod index;
pub mod processor;

pub use batch_runner::{BatchReport, BatchRunner};
pub use error::ProcessingError;
pub use processor::{NdviProcessor, Outcome};
