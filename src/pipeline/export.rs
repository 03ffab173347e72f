//! CSV serialization of the current result set.

use crate::models::{Service, ServiceField};

/// Download filename offered to browsers.
pub const CSV_FILENAME: &str = "services.csv";

/// Content type for CSV downloads.
pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// Serialize rows as CSV.
///
/// The header is the record key of every column in canonical order. An empty
/// result still yields the header line.
pub fn export_csv(rows: &[Service]) -> Vec<u8> {
    let header: Vec<&str> = ServiceField::ALL.iter().map(|f| f.key()).collect();
    let mut output = header.join(",");
    output.push('\n');

    for service in rows {
        let line: Vec<String> = ServiceField::ALL
            .iter()
            .map(|field| escape_csv(&field.value(service)))
            .collect();
        output.push_str(&line.join(","));
        output.push('\n');
    }

    output.into_bytes()
}

/// Escape a value for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
