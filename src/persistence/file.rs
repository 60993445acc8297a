use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PersistenceError, PersistenceResult};
use crate::booking::Booking;
use crate::export::BookingExport;
use crate::normalizer::{self, MissingColumns, NormalizeReport, RawBookingRow, SourceColumns};
use crate::pivot::{PartitionPivot, PivotMatrix};

/// Reads a raw booking export in CSV form. The header contract is validated
/// before any row is parsed; a missing required column aborts the whole run
/// with no partial output.
pub fn read_export<R: Read>(reader: R, columns: &SourceColumns) -> PersistenceResult<BookingExport> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let header_names: Vec<&str> = headers.iter().collect();
    let index = ColumnIndex::resolve(&header_names, columns)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(index.raw_row(&record));
    }

    let (bookings, report) = normalizer::normalize_rows(rows);
    Ok(BookingExport::from_bookings(bookings, report)?)
}

pub fn load_export_from_csv<P: AsRef<Path>>(
    path: P,
    columns: &SourceColumns,
) -> PersistenceResult<BookingExport> {
    let file = File::open(path)?;
    read_export(file, columns)
}

struct ColumnIndex {
    event_name: usize,
    hotel_name: usize,
    room_name: usize,
    check_in: usize,
    check_out: usize,
    event_start_date: usize,
    quantity: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[&str], columns: &SourceColumns) -> Result<Self, MissingColumns> {
        let find = |name: &str| headers.iter().position(|header| *header == name);
        let (
            Some(event_name),
            Some(hotel_name),
            Some(room_name),
            Some(check_in),
            Some(check_out),
            Some(event_start_date),
            Some(quantity),
        ) = (
            find(&columns.event_name),
            find(&columns.hotel_name),
            find(&columns.room_name),
            find(&columns.check_in),
            find(&columns.check_out),
            find(&columns.event_start_date),
            find(&columns.quantity),
        )
        else {
            return Err(MissingColumns(columns.missing_from(headers)));
        };

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

    fn raw_row(&self, record: &csv::StringRecord) -> RawBookingRow {
        let cell = |idx: usize| record.get(idx).map(str::to_string);
        RawBookingRow {
            event_name: cell(self.event_name),
            hotel_name: cell(self.hotel_name),
            room_name: cell(self.room_name),
            check_in: cell(self.check_in),
            check_out: cell(self.check_out),
            event_start_date: cell(self.event_start_date),
            quantity: cell(self.quantity),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ExportSnapshot {
    report: NormalizeReport,
    bookings: Vec<Booking>,
}

pub fn save_export_to_json<P: AsRef<Path>>(
    export: &BookingExport,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = ExportSnapshot {
        report: export.report().clone(),
        bookings: export.bookings()?,
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_export_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<BookingExport> {
    let file = File::open(path)?;
    let snapshot: ExportSnapshot = serde_json::from_reader(file)?;
    // Snapshots are hand-editable, so records are re-validated on load.
    normalizer::validate_bookings(&snapshot.bookings)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    Ok(BookingExport::from_bookings(
        snapshot.bookings,
        snapshot.report,
    )?)
}

/// Filename of the exported pivot CSV for one partition; embeds the
/// partition's event date.
pub fn pivot_csv_filename(event_date: NaiveDate) -> String {
    format!("pivot_{}.csv", event_date.format("%Y-%m-%d"))
}

pub fn save_pivot_to_csv<P: AsRef<Path>>(pivot: &PivotMatrix, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec![
        "Event".to_string(),
        "Hotel".to_string(),
        "Room".to_string(),
    ];
    header.extend(
        pivot
            .stay_dates()
            .iter()
            .map(|date| date.format("%Y-%m-%d").to_string()),
    );
    writer.write_record(&header)?;

    for row in pivot.rows() {
        let mut record = vec![
            row.key.event_name.clone(),
            row.key.hotel_name.clone(),
            row.key.room_name.clone(),
        ];
        record.extend(row.counts.iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes one CSV per non-empty partition into `dir`, named after the
/// partition date. Returns the paths written; empty partitions are skipped.
pub fn save_pivots_to_dir<P: AsRef<Path>>(
    partitions: &[PartitionPivot],
    dir: P,
) -> PersistenceResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for partition in partitions {
        let Some(pivot) = &partition.pivot else {
            continue;
        };
        let path = dir.join(pivot_csv_filename(partition.event_date));
        save_pivot_to_csv(pivot, &path)?;
        written.push(path);
    }
    Ok(written)
}
