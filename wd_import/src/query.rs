use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::record::WorkdayRecord;

/// Count of dated records in one (year, month) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// Distinct (year, month) pairs present among the stored records, with a
/// count each, newest first. Records without a date are excluded. Pure
/// read, no side effects.
pub fn available_date_ranges(records: &[WorkdayRecord]) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date {
            *buckets.entry((date.year(), date.month())).or_insert(0) += 1;
        }
    }
    buckets
        .into_iter()
        .rev()
        .map(|((year, month), count)| MonthlyCount { year, month, count })
        .collect()
}
