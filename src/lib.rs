pub mod booking;
pub mod calculations;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod normalizer;
pub mod persistence;
pub mod pivot;

pub use booking::Booking;
pub use export::BookingExport;
pub use normalizer::{
    InvalidBooking, MissingColumns, NormalizeReport, RawBookingRow, SourceColumns, UNKNOWN_HOTEL,
    UNKNOWN_ROOM,
};
pub use persistence::{
    PersistenceError, load_export_from_csv, load_export_from_json, pivot_csv_filename,
    read_export, save_export_to_json, save_pivot_to_csv, save_pivots_to_dir,
};
pub use pivot::{PartitionPivot, PivotKey, PivotMatrix, PivotRow, PivotRunSummary};
