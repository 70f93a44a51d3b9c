//! Persistence for the daily observation series
//!
//! The series is an append-only log; see [`series`] for the on-disk format
//! and the corrupt record policy.

pub mod series;

pub use series::{
    CorruptRecordPolicy, CsvSeriesStore, LoadReport, MemorySeriesStore, SeriesStore, StoreError,
    HEADER,
};
