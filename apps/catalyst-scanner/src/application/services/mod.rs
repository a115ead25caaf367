//! Application Services
//!
//! - `market_data`: single-flight quote cache over the quote source port
//! - `pipeline`: one ingestion/enrichment/filtering cycle
//! - `scheduler`: periodic, non-overlapping cycle trigger

mod market_data;
mod pipeline;
mod scheduler;

pub use market_data::{MarketDataProvider, QuoteCache};
pub use pipeline::{CatalystPipeline, CycleError, CycleReport, DropReason, PipelineSettings};
pub use scheduler::{CycleOutcome, CycleRunner, CycleStatus, LastCycle, Scheduler};
