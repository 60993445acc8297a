use std::collections::BTreeSet;

use chrono::NaiveDate;
use polars::prelude::*;

use crate::booking::Booking;
use crate::calculations::night_expansion::NightExpansion;
use crate::normalizer::NormalizeReport;
use crate::pivot::PartitionPivot;

/// The parsed booking export: a DataFrame with the canonical schema plus the
/// normalization report produced at ingest.
#[derive(Debug)]
pub struct BookingExport {
    df: DataFrame,
    report: NormalizeReport,
}

impl BookingExport {
    pub fn new() -> Self {
        Self::with_report(NormalizeReport::default())
    }

    pub fn with_report(report: NormalizeReport) -> Self {
        let schema = Self::default_schema();
        Self {
            df: DataFrame::empty_with_schema(&schema),
            report,
        }
    }

    pub fn from_bookings(bookings: Vec<Booking>, report: NormalizeReport) -> PolarsResult<Self> {
        let mut export = Self::with_report(report);
        for booking in bookings {
            export.append_booking(&booking)?;
        }
        Ok(export)
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("event_name".into(), DataType::String),
            Field::new("hotel_name".into(), DataType::String),
            Field::new("room_name".into(), DataType::String),
            Field::new("check_in".into(), DataType::Date),
            Field::new("check_out".into(), DataType::Date),
            Field::new("event_start_date".into(), DataType::Date),
            Field::new("quantity".into(), DataType::Int64),
        ])
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn report(&self) -> &NormalizeReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn append_booking(&mut self, booking: &Booking) -> PolarsResult<()> {
        let row = booking.to_dataframe_row()?;
        self.df = self.df.vstack(&row)?;
        Ok(())
    }

    pub fn bookings(&self) -> PolarsResult<Vec<Booking>> {
        let mut bookings = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            bookings.push(Booking::from_dataframe_row(&self.df, idx)?);
        }
        Ok(bookings)
    }

    /// Sorted distinct event names, blanks excluded. These are the values a
    /// caller may pass to [`BookingExport::pivot_partitions`].
    pub fn event_names(&self) -> PolarsResult<Vec<String>> {
        let names = self.df.column("event_name")?.str()?;
        let mut distinct: BTreeSet<String> = BTreeSet::new();
        for name in names.into_iter().flatten() {
            if !name.trim().is_empty() {
                distinct.insert(name.to_string());
            }
        }
        Ok(distinct.into_iter().collect())
    }

    /// Sorted distinct event start dates. Bookings without one belong to no
    /// partition.
    pub fn partition_dates(&self) -> PolarsResult<Vec<NaiveDate>> {
        let dates = self.df.column("event_start_date")?.date()?;
        let mut distinct: BTreeSet<i32> = BTreeSet::new();
        for days in dates.into_iter().flatten() {
            distinct.insert(days);
        }
        Ok(distinct.into_iter().map(Booking::date_from_i32).collect())
    }

    /// Runs the night expansion once per event-start-date partition of the
    /// selected events, sequentially in ascending date order. An empty
    /// selection produces nothing.
    pub fn pivot_partitions(
        &self,
        selected_events: &[String],
    ) -> PolarsResult<Vec<PartitionPivot>> {
        if selected_events.is_empty() {
            return Ok(Vec::new());
        }

        let selection: BTreeSet<&str> = selected_events.iter().map(String::as_str).collect();
        let names = self.df.column("event_name")?.str()?;
        let mask: BooleanChunked = names
            .into_iter()
            .map(|name| Some(name.is_some_and(|name| selection.contains(name))))
            .collect();
        let filtered = self.df.filter(&mask)?;

        let mut partition_days: BTreeSet<i32> = BTreeSet::new();
        for days in filtered.column("event_start_date")?.date()?.into_iter().flatten() {
            partition_days.insert(days);
        }

        let mut partitions = Vec::with_capacity(partition_days.len());
        for days in partition_days {
            let partition_mask: BooleanChunked = filtered
                .column("event_start_date")?
                .date()?
                .into_iter()
                .map(|value| Some(value == Some(days)))
                .collect();
            let partition = filtered.filter(&partition_mask)?;
            let pivot = NightExpansion::new(&partition).execute()?;
            partitions.push(PartitionPivot {
                event_date: Booking::date_from_i32(days),
                pivot,
            });
        }

        Ok(partitions)
    }
}

impl Default for BookingExport {
    fn default() -> Self {
        Self::new()
    }
}
