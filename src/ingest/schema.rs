//! Best-effort schema normalization for raw visitation CSVs.
//!
//! Raw exports disagree on header casing, column order and number
//! formatting. Resolution order:
//!   1. case-insensitive header match against the required column set,
//!   2. positional fallback (first eight columns) when the file is wide
//!      enough but the headers are unusable,
//!   3. otherwise the file is rejected with the missing column names.

use csv::StringRecord;

use crate::model::VisitRecord;

/// Canonical column set of the cleaned CSV, in output order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Park",
    "Unit Code",
    "Park Type",
    "Region",
    "State",
    "Year",
    "Month",
    "Recreation Visits",
];

/// Mapping from canonical columns to field positions in one raw file.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    indices: [usize; 8],
}

impl ColumnMap {
    /// Resolve the header row of a raw file. Returns the canonical
    /// columns that could not be located when the file is unusable.
    pub fn resolve(headers: &StringRecord) -> Result<ColumnMap, Vec<String>> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut indices = [0usize; 8];
        let mut missing = Vec::new();
        for (slot, required) in REQUIRED_COLUMNS.iter().enumerate() {
            match normalized.iter().position(|h| h == &required.to_lowercase()) {
                Some(idx) => indices[slot] = idx,
                None => missing.push(required.to_string()),
            }
        }

        if missing.is_empty() {
            return Ok(ColumnMap { indices });
        }

        // Unlabeled exports: assume the canonical order across the first
        // eight columns.
        if headers.len() >= REQUIRED_COLUMNS.len() {
            return Ok(ColumnMap {
                indices: [0, 1, 2, 3, 4, 5, 6, 7],
            });
        }

        Err(missing)
    }

    fn field<'r>(&self, record: &'r StringRecord, slot: usize) -> &'r str {
        record.get(self.indices[slot]).unwrap_or("")
    }

    /// Convert one raw row. `None` means the row is dropped (uncoercible
    /// year, month or visit count), mirroring the pandas `dropna` step.
    pub fn record_to_visit(&self, record: &StringRecord) -> Option<VisitRecord> {
        let year = parse_integer(self.field(record, 5))?;
        let month = parse_integer(self.field(record, 6))?;
        let recreation_visits = parse_visit_count(self.field(record, 7))?;

        Some(VisitRecord {
            park: self.field(record, 0).trim().to_string(),
            unit_code: self.field(record, 1).trim().to_string(),
            park_type: self.field(record, 2).trim().to_string(),
            region: self.field(record, 3).trim().to_string(),
            state: self.field(record, 4).trim().to_string(),
            year: year as i32,
            month: month as u32,
            recreation_visits,
            is_forecast: false,
        })
    }
}

/// Lenient integer parse for year/month cells: accepts "2019", " 2019 "
/// and "2019.0".
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 => Some(v as i64),
        _ => None,
    }
}

/// Visit counts arrive as "1,234,567", "1.234.567" or with stray
/// currency marks; every non-digit is stripped. An en-dash cell means
/// "no visits recorded" and maps to zero.
pub fn parse_visit_count(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        if raw.trim() == "\u{2013}" {
            return Some(0);
        }
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> StringRecord {
        StringRecord::from(cols.to_vec())
    }

    #[test]
    fn named_headers_resolve_case_insensitively() {
        let map = ColumnMap::resolve(&headers(&[
            "Recreation Visits",
            "park",
            " UNIT CODE ",
            "Park Type",
            "Region",
            "State",
            "Year",
            "Month",
        ]))
        .unwrap();

        let row = StringRecord::from(vec![
            "1,234", "Acadia NP", "ACAD", "National Park", "Northeast", "ME", "2019", "7",
        ]);
        let visit = map.record_to_visit(&row).unwrap();
        assert_eq!(visit.park, "Acadia NP");
        assert_eq!(visit.unit_code, "ACAD");
        assert_eq!(visit.recreation_visits, 1234);
        assert_eq!(visit.year, 2019);
        assert_eq!(visit.month, 7);
    }

    #[test]
    fn wide_files_with_unusable_headers_fall_back_to_positions() {
        let map = ColumnMap::resolve(&headers(&[
            "c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "extra",
        ]))
        .unwrap();
        let row = StringRecord::from(vec![
            "Zion NP", "ZION", "National Park", "Intermountain", "UT", "2020", "6",
            "350000", "ignored",
        ]);
        let visit = map.record_to_visit(&row).unwrap();
        assert_eq!(visit.state, "UT");
        assert_eq!(visit.recreation_visits, 350_000);
    }

    #[test]
    fn narrow_files_report_missing_columns() {
        let err = ColumnMap::resolve(&headers(&["Park", "State", "Year"])).unwrap_err();
        assert!(err.contains(&"Unit Code".to_string()));
        assert!(err.contains(&"Recreation Visits".to_string()));
    }

    #[test]
    fn rows_with_uncoercible_numbers_are_dropped() {
        let map = ColumnMap::resolve(&headers(&REQUIRED_COLUMNS.to_vec())).unwrap();
        let bad_year = StringRecord::from(vec![
            "P", "U", "T", "R", "ME", "n/a", "7", "100",
        ]);
        assert!(map.record_to_visit(&bad_year).is_none());

        let bad_visits = StringRecord::from(vec![
            "P", "U", "T", "R", "ME", "2019", "7", "n/a",
        ]);
        assert!(map.record_to_visit(&bad_visits).is_none());
    }

    #[test]
    fn visit_count_cleanup() {
        assert_eq!(parse_visit_count("1,234,567"), Some(1_234_567));
        assert_eq!(parse_visit_count(" $12 345 "), Some(12_345));
        assert_eq!(parse_visit_count("\u{2013}"), Some(0));
        assert_eq!(parse_visit_count(""), None);
        assert_eq!(parse_visit_count("abc"), None);
    }

    #[test]
    fn integer_parse_accepts_float_formatting() {
        assert_eq!(parse_integer("2019"), Some(2019));
        assert_eq!(parse_integer("2019.0"), Some(2019));
        assert_eq!(parse_integer("2019.5"), None);
        assert_eq!(parse_integer(""), None);
    }
}
