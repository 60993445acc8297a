use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Row identity of the pivot: one (event, hotel, room) tuple. Ordering is
/// lexicographic over the fields in that order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PivotKey {
    pub event_name: String,
    pub hotel_name: String,
    pub room_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    #[serde(flatten)]
    pub key: PivotKey,
    pub counts: Vec<i64>,
}

/// Dense table of nightly room counts for one date partition: rows keyed by
/// (event, hotel, room), one column per stay date, zero-filled cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotMatrix {
    stay_dates: Vec<NaiveDate>,
    rows: Vec<PivotRow>,
}

impl PivotMatrix {
    pub(crate) fn from_counts(
        counts: BTreeMap<PivotKey, BTreeMap<NaiveDate, i64>>,
        stay_dates: Vec<NaiveDate>,
    ) -> Self {
        let rows = counts
            .into_iter()
            .map(|(key, nights)| PivotRow {
                counts: stay_dates
                    .iter()
                    .map(|date| nights.get(date).copied().unwrap_or(0))
                    .collect(),
                key,
            })
            .collect();
        Self { stay_dates, rows }
    }

    /// Distinct stay dates of the partition, ascending.
    pub fn stay_dates(&self) -> &[NaiveDate] {
        &self.stay_dates
    }

    /// Rows in lexicographic (event, hotel, room) order.
    pub fn rows(&self) -> &[PivotRow] {
        &self.rows
    }

    pub fn get(&self, key: &PivotKey, date: NaiveDate) -> Option<i64> {
        let column = self.stay_dates.iter().position(|d| *d == date)?;
        let row = self.rows.iter().find(|row| row.key == *key)?;
        row.counts.get(column).copied()
    }

    pub fn grand_total(&self) -> i64 {
        self.rows
            .iter()
            .map(|row| row.counts.iter().sum::<i64>())
            .sum()
    }

    /// Renders the matrix as a DataFrame with `Event`/`Hotel`/`Room` index
    /// columns followed by one `%Y-%m-%d` column per stay date.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(3 + self.stay_dates.len());

        let events: Vec<&str> = self.rows.iter().map(|r| r.key.event_name.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("Event"), events).into_column());

        let hotels: Vec<&str> = self.rows.iter().map(|r| r.key.hotel_name.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("Hotel"), hotels).into_column());

        let rooms: Vec<&str> = self.rows.iter().map(|r| r.key.room_name.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("Room"), rooms).into_column());

        for (idx, date) in self.stay_dates.iter().enumerate() {
            let label = date.format("%Y-%m-%d").to_string();
            let cells: Vec<i64> = self.rows.iter().map(|r| r.counts[idx]).collect();
            columns.push(Series::new(PlSmallStr::from(label.as_str()), cells).into_column());
        }

        DataFrame::new(columns)
    }
}

/// Pivot output for a single event-start-date partition. `pivot` is `None`
/// when the partition produced no room nights at all; callers must treat
/// that as "nothing to show" rather than an all-zero table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionPivot {
    pub event_date: NaiveDate,
    pub pivot: Option<PivotMatrix>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRunSummary {
    pub partitions: usize,
    pub empty_partitions: usize,
    pub pivot_rows: usize,
    pub unit_nights: i64,
}

impl PivotRunSummary {
    pub fn from_partitions(partitions: &[PartitionPivot]) -> Self {
        let mut summary = Self {
            partitions: partitions.len(),
            empty_partitions: 0,
            pivot_rows: 0,
            unit_nights: 0,
        };
        for partition in partitions {
            match &partition.pivot {
                Some(pivot) => {
                    summary.pivot_rows += pivot.rows().len();
                    summary.unit_nights += pivot.grand_total();
                }
                None => summary.empty_partitions += 1,
            }
        }
        summary
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("partitions={}", self.partitions));
        if self.empty_partitions > 0 {
            parts.push(format!("empty={}", self.empty_partitions));
        }
        parts.push(format!("rows={}", self.pivot_rows));
        parts.push(format!("unit_nights={}", self.unit_nights));
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn key(event: &str, hotel: &str, room: &str) -> PivotKey {
        PivotKey {
            event_name: event.to_string(),
            hotel_name: hotel.to_string(),
            room_name: room.to_string(),
        }
    }

    fn sample_matrix() -> PivotMatrix {
        let mut counts: BTreeMap<PivotKey, BTreeMap<NaiveDate, i64>> = BTreeMap::new();
        counts
            .entry(key("A", "H", "R"))
            .or_default()
            .insert(d(2024, 1, 10), 2);
        counts
            .entry(key("B", "H", "R"))
            .or_default()
            .insert(d(2024, 1, 11), 1);
        PivotMatrix::from_counts(counts, vec![d(2024, 1, 10), d(2024, 1, 11)])
    }

    #[test]
    fn cells_are_dense_and_zero_filled() {
        let matrix = sample_matrix();
        assert_eq!(matrix.get(&key("A", "H", "R"), d(2024, 1, 10)), Some(2));
        assert_eq!(matrix.get(&key("A", "H", "R"), d(2024, 1, 11)), Some(0));
        assert_eq!(matrix.get(&key("B", "H", "R"), d(2024, 1, 10)), Some(0));
        assert_eq!(matrix.get(&key("B", "H", "R"), d(2024, 1, 11)), Some(1));
        assert_eq!(matrix.grand_total(), 3);
    }

    #[test]
    fn dataframe_columns_are_index_then_dates() {
        let matrix = sample_matrix();
        let df = matrix.to_dataframe().unwrap();
        let names: Vec<String> = df
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, ["Event", "Hotel", "Room", "2024-01-10", "2024-01-11"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn summary_counts_empty_partitions() {
        let partitions = vec![
            PartitionPivot {
                event_date: d(2024, 1, 10),
                pivot: Some(sample_matrix()),
            },
            PartitionPivot {
                event_date: d(2024, 2, 1),
                pivot: None,
            },
        ];
        let summary = PivotRunSummary::from_partitions(&partitions);
        assert_eq!(summary.partitions, 2);
        assert_eq!(summary.empty_partitions, 1);
        assert_eq!(summary.pivot_rows, 2);
        assert_eq!(summary.unit_nights, 3);
    }
}
