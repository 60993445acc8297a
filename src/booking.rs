use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::normalizer::{UNKNOWN_HOTEL, UNKNOWN_ROOM};

/// One reservation line item from the upstream export, immutable after
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub event_name: String,
    pub hotel_name: String,
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Used only for partitioning; a booking without one belongs to no
    /// partition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_start_date: Option<NaiveDate>,
    pub quantity: i64,
}

impl Booking {
    pub fn new(
        event_name: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        quantity: i64,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            hotel_name: UNKNOWN_HOTEL.to_string(),
            room_name: UNKNOWN_ROOM.to_string(),
            check_in,
            check_out,
            event_start_date: None,
            quantity,
        }
    }

    /// Nights occupied by one unit of this booking: every date in
    /// `[check_in, check_out)`. The checkout night itself is never occupied,
    /// and `check_out <= check_in` yields no nights.
    pub fn nights(&self) -> Vec<NaiveDate> {
        let mut nights = Vec::new();
        let mut current = self.check_in;
        while current < self.check_out {
            nights.push(current);
            current = current + Duration::days(1);
        }
        nights
    }

    pub fn night_count(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(7);

        let event_data: [&str; 1] = [self.event_name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("event_name"), event_data).into_column());

        let hotel_data: [&str; 1] = [self.hotel_name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("hotel_name"), hotel_data).into_column());

        let room_data: [&str; 1] = [self.room_name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("room_name"), room_data).into_column());

        columns.push(Self::series_from_date("check_in", Some(self.check_in))?.into_column());
        columns.push(Self::series_from_date("check_out", Some(self.check_out))?.into_column());
        columns.push(
            Self::series_from_date("event_start_date", self.event_start_date)?.into_column(),
        );

        let quantity_data: [i64; 1] = [self.quantity];
        columns.push(Series::new(PlSmallStr::from_static("quantity"), quantity_data).into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let event_name = df
            .column("event_name")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();
        let hotel_name = df
            .column("hotel_name")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();
        let room_name = df
            .column("room_name")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();

        let check_in = Self::date_from_series(df.column("check_in")?.date()?, row_idx)
            .ok_or_else(|| PolarsError::ComputeError("booking row missing check_in".into()))?;
        let check_out = Self::date_from_series(df.column("check_out")?.date()?, row_idx)
            .ok_or_else(|| PolarsError::ComputeError("booking row missing check_out".into()))?;
        let event_start_date =
            Self::date_from_series(df.column("event_start_date")?.date()?, row_idx);

        let quantity = df.column("quantity")?.i64()?.get(row_idx).unwrap_or(0);

        Ok(Self {
            event_name,
            hotel_name,
            room_name,
            check_in,
            check_out,
            event_start_date,
            quantity,
        })
    }

    fn series_from_date(name: &str, date: Option<NaiveDate>) -> PolarsResult<Series> {
        let data: [Option<i32>; 1] = [date.map(Self::date_to_i32)];
        Series::new(name.into(), data).cast(&DataType::Date)
    }

    fn date_from_series(chunked: &DateChunked, row_idx: usize) -> Option<NaiveDate> {
        chunked.get(row_idx).map(Self::date_from_i32)
    }

    pub(crate) fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (date - epoch).num_days() as i32
    }

    pub(crate) fn date_from_i32(days: i32) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        epoch + Duration::days(days as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn nights_exclude_checkout_day() {
        let booking = Booking::new("A", d(2024, 1, 10), d(2024, 1, 13), 2);
        assert_eq!(
            booking.nights(),
            vec![d(2024, 1, 10), d(2024, 1, 11), d(2024, 1, 12)]
        );
        assert_eq!(booking.night_count(), 3);
    }

    #[test]
    fn checkout_on_or_before_checkin_yields_no_nights() {
        let same_day = Booking::new("A", d(2024, 1, 10), d(2024, 1, 10), 4);
        assert!(same_day.nights().is_empty());
        assert_eq!(same_day.night_count(), 0);

        let inverted = Booking::new("A", d(2024, 1, 10), d(2024, 1, 5), 4);
        assert!(inverted.nights().is_empty());
        assert_eq!(inverted.night_count(), 0);
    }

    #[test]
    fn dataframe_row_round_trip() {
        let mut booking = Booking::new("Gala", d(2024, 3, 1), d(2024, 3, 4), 2);
        booking.hotel_name = "Grand Hotel".into();
        booking.room_name = "Double".into();
        booking.event_start_date = Some(d(2024, 3, 2));

        let df = booking.to_dataframe_row().unwrap();
        let restored = Booking::from_dataframe_row(&df, 0).unwrap();
        assert_eq!(restored, booking);
    }

    #[test]
    fn dataframe_row_preserves_missing_event_start_date() {
        let booking = Booking::new("Gala", d(2024, 3, 1), d(2024, 3, 4), 1);
        let df = booking.to_dataframe_row().unwrap();
        let restored = Booking::from_dataframe_row(&df, 0).unwrap();
        assert_eq!(restored.event_start_date, None);
    }
}
