use std::collections::HashMap;

use crate::model::VisitRecord;

/// Bounds accepted by the loader; the database repeats them as CHECK
/// constraints.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Normalizes a merged batch in place: trims text fields, drops rows
/// outside the sanity bounds and dedupes on (unit_code, year, month)
/// keeping the last occurrence. Runs after every merge and before every
/// upsert, so re-loading the same batch is a no-op downstream.
pub fn normalize_all(records: &mut Vec<VisitRecord>) {
    for record in records.iter_mut() {
        normalize_record(record);
    }

    records.retain(|r| {
        (1..=12).contains(&r.month) && YEAR_RANGE.contains(&r.year) && r.recreation_visits >= 0
    });

    dedupe_keep_last(records);
}

fn normalize_record(record: &mut VisitRecord) {
    record.park = record.park.trim().to_string();
    record.unit_code = record.unit_code.trim().to_uppercase();
    record.park_type = record.park_type.trim().to_string();
    record.region = record.region.trim().to_string();
    record.state = record.state.trim().to_uppercase();
}

/// Later files win over earlier ones for the same park-month, matching
/// the upsert semantics of the loader.
fn dedupe_keep_last(records: &mut Vec<VisitRecord>) {
    let mut last_index: HashMap<(String, i32, u32), usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        last_index.insert(record.key(), idx);
    }

    let mut idx = 0usize;
    records.retain(|record| {
        let keep = last_index[&record.key()] == idx;
        idx += 1;
        keep
    });
}
