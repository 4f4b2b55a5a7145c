//! Image processing pipeline.

mod processor;

pub use processor::{ImageProcessor, ProcessOutcome};
