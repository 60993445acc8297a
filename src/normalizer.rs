use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::Booking;

pub const UNKNOWN_HOTEL: &str = "Unknown Hotel";
pub const UNKNOWN_ROOM: &str = "Unknown Room";

/// Column names of the upstream export system. The names are a fixed
/// external contract and are treated as opaque string keys everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceColumns {
    pub event_name: String,
    pub hotel_name: String,
    pub room_name: String,
    pub check_in: String,
    pub check_out: String,
    pub event_start_date: String,
    pub quantity: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            event_name: "name".to_string(),
            hotel_name: "events hotels - hotelid__name".to_string(),
            room_name: "events hotelrooms - requiresitem__name".to_string(),
            check_in: "regular_checkin".to_string(),
            check_out: "regular_checkout".to_string(),
            event_start_date: "realeventstartdate".to_string(),
            quantity: "orders orderitems__quantity".to_string(),
        }
    }
}

impl SourceColumns {
    pub fn required(&self) -> [&str; 7] {
        [
            &self.event_name,
            &self.hotel_name,
            &self.room_name,
            &self.check_in,
            &self.check_out,
            &self.event_start_date,
            &self.quantity,
        ]
    }

    /// Required column names absent from the input header row.
    pub fn missing_from(&self, headers: &[&str]) -> Vec<String> {
        self.required()
            .into_iter()
            .filter(|name| !headers.contains(name))
            .map(str::to_string)
            .collect()
    }
}

/// Dataset-level schema failure: the run aborts before any row is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingColumns(pub Vec<String>);

impl fmt::Display for MissingColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "required columns missing from export: {}",
            self.0.join(", ")
        )
    }
}

impl std::error::Error for MissingColumns {}

pub fn validate_schema(headers: &[&str], columns: &SourceColumns) -> Result<(), MissingColumns> {
    let missing = columns.missing_from(headers);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingColumns(missing))
    }
}

/// One record of the export before any coercion, keyed into fields by the
/// ingest layer. `None` means the cell was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBookingRow {
    pub event_name: Option<String>,
    pub hotel_name: Option<String>,
    pub room_name: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub event_start_date: Option<String>,
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub imported: usize,
    pub dropped_blank_quantity: usize,
    pub dropped_invalid_quantity: usize,
    pub dropped_unparseable_dates: usize,
}

impl NormalizeReport {
    /// Report for records that bypassed normalization (typed payloads).
    pub fn passthrough(rows: usize) -> Self {
        Self {
            input_rows: rows,
            imported: rows,
            ..Self::default()
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped_blank_quantity + self.dropped_invalid_quantity + self.dropped_unparseable_dates
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("rows={}", self.input_rows));
        parts.push(format!("imported={}", self.imported));
        if self.dropped_blank_quantity > 0 {
            parts.push(format!("blank_quantity={}", self.dropped_blank_quantity));
        }
        if self.dropped_invalid_quantity > 0 {
            parts.push(format!("bad_quantity={}", self.dropped_invalid_quantity));
        }
        if self.dropped_unparseable_dates > 0 {
            parts.push(format!("bad_dates={}", self.dropped_unparseable_dates));
        }
        parts.join(", ")
    }
}

/// Coerces raw export rows into [`Booking`] records, dropping the rows that
/// fail. A row is retained only with parseable check-in and check-out dates
/// and a quantity that coerces to a non-negative integer; descriptive fields
/// never cause a drop.
pub fn normalize_rows(rows: Vec<RawBookingRow>) -> (Vec<Booking>, NormalizeReport) {
    let mut report = NormalizeReport {
        input_rows: rows.len(),
        ..NormalizeReport::default()
    };
    let mut bookings = Vec::with_capacity(rows.len());

    for row in rows {
        // Blank quantity drops the row before any coercion is attempted.
        let quantity_raw = row.quantity.as_deref().map(str::trim).unwrap_or("");
        if quantity_raw.is_empty() {
            report.dropped_blank_quantity += 1;
            continue;
        }

        let check_in = row.check_in.as_deref().and_then(parse_export_date);
        let check_out = row.check_out.as_deref().and_then(parse_export_date);
        let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
            report.dropped_unparseable_dates += 1;
            continue;
        };

        let Some(quantity) = parse_quantity(quantity_raw) else {
            report.dropped_invalid_quantity += 1;
            continue;
        };

        bookings.push(Booking {
            event_name: trimmed(row.event_name),
            hotel_name: non_blank(row.hotel_name).unwrap_or_else(|| UNKNOWN_HOTEL.to_string()),
            room_name: non_blank(row.room_name).unwrap_or_else(|| UNKNOWN_ROOM.to_string()),
            check_in,
            check_out,
            event_start_date: row.event_start_date.as_deref().and_then(parse_export_date),
            quantity,
        });
    }

    report.imported = bookings.len();
    (bookings, report)
}

/// Re-validation applied to records that did not pass through
/// [`normalize_rows`], e.g. a hand-edited snapshot.
pub fn validate_bookings(bookings: &[Booking]) -> Result<(), InvalidBooking> {
    for (idx, booking) in bookings.iter().enumerate() {
        if booking.quantity < 0 {
            return Err(InvalidBooking(format!(
                "booking {idx} ('{}') has negative quantity {}",
                booking.event_name, booking.quantity
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidBooking(pub String);

impl fmt::Display for InvalidBooking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InvalidBooking {}

/// Dates arrive in a handful of shapes depending on how the export was
/// produced; anything unparseable is treated as missing, not as an error.
pub fn parse_export_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    for format in [
        "%Y-%m-%d",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y",
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date);
        }
    }
    None
}

/// Quantities must coerce to a non-negative integer. Spreadsheet exports
/// write whole numbers as floats ("2.0"), which are accepted.
pub fn parse_quantity(input: &str) -> Option<i64> {
    let input = input.trim();
    if let Ok(value) = input.parse::<i64>() {
        return (value >= 0).then_some(value);
    }
    let value = input.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_accepts_integers_and_integral_floats() {
        assert_eq!(parse_quantity("2"), Some(2));
        assert_eq!(parse_quantity(" 2.0 "), Some(2));
        assert_eq!(parse_quantity("0"), Some(0));
        assert_eq!(parse_quantity("-3"), None);
        assert_eq!(parse_quantity("2.5"), None);
        assert_eq!(parse_quantity("two"), None);
    }

    #[test]
    fn export_dates_accept_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(parse_export_date("2024-01-10"), Some(expected));
        assert_eq!(parse_export_date("2024-01-10 15:30:00"), Some(expected));
        assert_eq!(parse_export_date("2024-01-10T15:30:00"), Some(expected));
        assert_eq!(parse_export_date("01/10/2024"), Some(expected));
        assert_eq!(parse_export_date("soon"), None);
        assert_eq!(parse_export_date(""), None);
    }

    #[test]
    fn missing_columns_reports_every_absent_name() {
        let columns = SourceColumns::default();
        let headers = ["name", "regular_checkin", "regular_checkout"];
        let missing = columns.missing_from(&headers);
        assert_eq!(missing.len(), 4);
        assert!(missing.contains(&"orders orderitems__quantity".to_string()));
        assert!(missing.contains(&"realeventstartdate".to_string()));
    }
}
