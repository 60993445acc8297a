use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use polars::prelude::*;

use crate::booking::Booking;
use crate::pivot::{PivotKey, PivotMatrix};

/// Expands the bookings of a single date partition into per-night room
/// counts and aggregates them into a [`PivotMatrix`].
///
/// Replicating one row per unit per night and counting group sizes would
/// produce the same table; the counts are incremented by `quantity` directly
/// so the intermediate rows are never materialized.
pub struct NightExpansion<'a> {
    df: &'a DataFrame,
}

impl<'a> NightExpansion<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    /// Returns `Ok(None)` when the partition yields no room nights at all.
    pub fn execute(&self) -> Result<Option<PivotMatrix>, PolarsError> {
        let events = self.df.column("event_name")?.str()?;
        let hotels = self.df.column("hotel_name")?.str()?;
        let rooms = self.df.column("room_name")?.str()?;
        let check_ins = self.df.column("check_in")?.date()?;
        let check_outs = self.df.column("check_out")?.date()?;
        let quantities = self.df.column("quantity")?.i64()?;

        let mut stay_dates: BTreeSet<NaiveDate> = BTreeSet::new();
        let mut counts: BTreeMap<PivotKey, BTreeMap<NaiveDate, i64>> = BTreeMap::new();

        for idx in 0..self.df.height() {
            let (Some(check_in), Some(check_out)) = (check_ins.get(idx), check_outs.get(idx))
            else {
                continue;
            };
            let quantity = quantities.get(idx).unwrap_or(0);
            if quantity <= 0 {
                continue;
            }

            let check_in = Booking::date_from_i32(check_in);
            let check_out = Booking::date_from_i32(check_out);
            // Checkout on or before check-in expands to nothing.
            if check_out <= check_in {
                continue;
            }

            let key = PivotKey {
                event_name: events.get(idx).unwrap_or("").to_string(),
                hotel_name: hotels.get(idx).unwrap_or("").to_string(),
                room_name: rooms.get(idx).unwrap_or("").to_string(),
            };
            let row_counts = counts.entry(key).or_default();

            // The checkout night itself is never occupied; quantity counts
            // parallel identical rooms, not nights.
            let mut night = check_in;
            while night < check_out {
                stay_dates.insert(night);
                *row_counts.entry(night).or_insert(0) += quantity;
                night = night + Duration::days(1);
            }
        }

        if stay_dates.is_empty() {
            return Ok(None);
        }

        let stay_dates: Vec<NaiveDate> = stay_dates.into_iter().collect();
        Ok(Some(PivotMatrix::from_counts(counts, stay_dates)))
    }
}
