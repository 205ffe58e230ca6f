//! CSV encoding
//!
//! The format is deliberately simple: an unquoted header line, then one line
//! per record with every value wrapped in double quotes. Embedded quotes and
//! commas are NOT escaped. Exports produced by earlier versions of this tool
//! look exactly like this and downstream sheets depend on it, so a value that
//! contains `"` yields a malformed line. [`count_quote_irregularities`]
//! reports how many values are affected.

use crate::extract::Record;

/// Encodes records as CSV text
///
/// # Arguments
///
/// * `headers` - Header labels, joined by commas without quoting
/// * `records` - Records, one line each, in the given order
/// * `field_order` - Field names selecting and ordering each line's values
///
/// Missing fields are written as `""`. Every line, the last included, ends
/// with `\n`.
///
/// # Example
///
/// ```
/// use course_harvest::encode_csv;
/// use course_harvest::extract::Record;
///
/// let record = Record::from_fields("https://x.test/c", [("name", "Rust"), ("students", "42")]);
/// let csv = encode_csv(&["Name", "Students"], &[record], &["name", "students"]);
/// assert_eq!(csv, "Name,Students\n\"Rust\",\"42\"\n");
/// ```
pub fn encode_csv<H, F>(headers: &[H], records: &[Record], field_order: &[F]) -> String
where
    H: AsRef<str>,
    F: AsRef<str>,
{
    let header_line = headers
        .iter()
        .map(|h| h.as_ref())
        .collect::<Vec<&str>>()
        .join(",");

    let mut out = String::with_capacity(header_line.len() + 1 + records.len() * 64);
    out.push_str(&header_line);
    out.push('\n');

    for record in records {
        let line = field_order
            .iter()
            .map(|field| format!("\"{}\"", record.get(field.as_ref()).unwrap_or_default()))
            .collect::<Vec<String>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    let irregular = count_quote_irregularities(records, field_order);
    if irregular > 0 {
        tracing::warn!(
            "{} CSV values contain an unescaped double quote; affected lines will not parse cleanly",
            irregular
        );
    }

    out
}

/// Counts the selected values that contain a double quote
pub fn count_quote_irregularities<F: AsRef<str>>(records: &[Record], field_order: &[F]) -> usize {
    records
        .iter()
        .flat_map(|record| {
            field_order
                .iter()
                .filter_map(move |field| record.get(field.as_ref()))
        })
        .filter(|value| value.contains('"'))
        .count()
}
