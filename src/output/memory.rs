use crate::record::AccidentRecord;

use super::{OutputResult, RecordSink};

/// Keeps the latest record set in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<AccidentRecord>,
    writes: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AccidentRecord] {
        &self.records
    }

    /// Number of times the record set was replaced
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl RecordSink for MemorySink {
    fn persist(&mut self, records: &[AccidentRecord]) -> OutputResult<()> {
        self.records = records.to_vec();
        self.writes += 1;
        Ok(())
    }
}
