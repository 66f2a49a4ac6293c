//! Output module for persisting harvested records and reporting results
//!
//! This module handles:
//! - Rewriting the per-year CSV after every extracted record
//! - Keeping record sets in memory for embedding and tests
//! - Printing discovery layouts and end-of-run reports

mod csv;
mod memory;
mod report;
mod traits;

pub use self::csv::{output_path, write_records, CsvSink};
pub use memory::MemorySink;
pub use report::{print_discovery, print_report, HarvestReport};
pub use traits::{OutputError, OutputResult, RecordSink};
