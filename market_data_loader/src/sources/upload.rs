//! Parsing of user-supplied price tables.

use std::{
    collections::hash_map::DefaultHasher,
    fs,
    hash::{Hash, Hasher},
    io::{self, Read},
    path::Path,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{errors::ParseError, models::price_point::PricePoint};

/// Columns every upload must carry, in [`PricePoint`] field order.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// Raw bytes of an uploaded table plus its display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }

    /// Reads a file from disk, naming the upload after the file.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, contents })
    }

    /// Content digest; two uploads with the same bytes share a digest.
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.contents.hash(&mut hasher);
        hasher.finish()
    }

    pub fn parse(&self) -> Result<Vec<PricePoint>, ParseError> {
        parse_price_table(self.contents.as_slice())
    }
}

/// Parses a comma-delimited table into ascending [`PricePoint`]s.
///
/// Header names are matched case-insensitively after trimming; column order is
/// free and extra columns are ignored. A table with a header but no rows
/// parses to an empty vector.
pub fn parse_price_table<R: Read>(reader: R) -> Result<Vec<PricePoint>, ParseError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = locate_columns(&headers)?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let cell = |idx: usize| record.get(columns[idx]).unwrap_or("");
        let number = |idx: usize| -> Result<f64, ParseError> {
            let raw = cell(idx);
            raw.replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseError::InvalidNumber {
                    line,
                    column: REQUIRED_COLUMNS[idx],
                    value: raw.to_string(),
                })
        };

        let date = parse_date(cell(0)).ok_or_else(|| ParseError::InvalidDate {
            line,
            value: cell(0).to_string(),
        })?;
        let volume = number(5)?;
        if volume < 0.0 {
            return Err(ParseError::NegativeVolume {
                line,
                value: volume,
            });
        }

        points.push(PricePoint {
            date,
            open: number(1)?,
            high: number(2)?,
            low: number(3)?,
            close: number(4)?,
            volume,
        });
    }

    points.sort_by_key(|p| p.date);
    if let Some(w) = points.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(ParseError::DuplicateDate { date: w[0].date });
    }

    Ok(points)
}

fn locate_columns(headers: &StringRecord) -> Result<[usize; 6], ParseError> {
    let mut found = [0usize; 6];
    for (slot, column) in found.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(column))
            .ok_or(ParseError::MissingColumn { column })?;
    }
    Ok(found)
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Accepts plain dates, RFC 3339 stamps, and the `2023-01-03 00:00:00-05:00`
/// form that exported index columns often carry. Offsets are dropped; the
/// local calendar day is kept.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
    {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_and_sorts_rows_with_free_column_order() {
        let csv = "\
Close,Date,Volume,Open,Low,High,Adj Close
11,2024-01-03,100,10,9,12,11
21,2024-01-02,200,20,19,22,21
";
        let points = parse_price_table(csv.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d(2024, 1, 2));
        assert_eq!(points[0].open, 20.0);
        assert_eq!(points[1].volume, 100.0);
    }

    #[test]
    fn header_match_ignores_case_and_padding() {
        let csv = " date , OPEN,high,Low,close,volume\n2024-01-02,1,2,0.5,1.5,10\n";
        assert_eq!(parse_price_table(csv.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn missing_column_is_named() {
        let csv = "Date,Open,High,Low,Close\n2024-01-02,1,2,0.5,1.5\n";
        let err = parse_price_table(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { column: "Volume" }));
    }

    #[test]
    fn bad_number_reports_line_and_column() {
        let csv = "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,abc,10\n";
        match parse_price_table(csv.as_bytes()).unwrap_err() {
            ParseError::InvalidNumber {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 2);
                assert_eq!(column, "Close");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_date_is_rejected() {
        let csv = "Date,Open,High,Low,Close,Volume\nyesterday,1,2,0.5,1.5,10\n";
        assert!(matches!(
            parse_price_table(csv.as_bytes()),
            Err(ParseError::InvalidDate { line: 2, .. })
        ));
    }

    #[test]
    fn duplicate_dates_and_negative_volume_are_rejected() {
        let dup = "Date,Open,High,Low,Close,Volume\n\
                   2024-01-02,1,2,0.5,1.5,10\n\
                   2024-01-02,1,2,0.5,1.5,10\n";
        assert!(matches!(
            parse_price_table(dup.as_bytes()),
            Err(ParseError::DuplicateDate { .. })
        ));

        let neg = "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,-1\n";
        assert!(matches!(
            parse_price_table(neg.as_bytes()),
            Err(ParseError::NegativeVolume { .. })
        ));
    }

    #[test]
    fn header_only_table_is_empty() {
        let csv = "Date,Open,High,Low,Close,Volume\n";
        assert!(parse_price_table(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn accepts_common_date_shapes() {
        assert_eq!(parse_date("2023-01-03"), Some(d(2023, 1, 3)));
        assert_eq!(parse_date("2023/01/03"), Some(d(2023, 1, 3)));
        assert_eq!(parse_date("01/03/2023"), Some(d(2023, 1, 3)));
        assert_eq!(parse_date("2023-01-03T00:00:00Z"), Some(d(2023, 1, 3)));
        assert_eq!(parse_date("2023-01-03 00:00:00-05:00"), Some(d(2023, 1, 3)));
        assert_eq!(parse_date("2023-01-03 09:30:00"), Some(d(2023, 1, 3)));
        assert_eq!(parse_date("3rd of Jan"), None);
    }
}
