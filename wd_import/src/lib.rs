//! Import pipeline for Workday "Feedback on My Team" XLSX exports.
//!
//! The export is a semi-structured spreadsheet: a title banner on row 1,
//! column headers on row 2 (both configurable), then one feedback event per
//! row. Column order and naming drift between export variants, so the
//! pipeline locates columns heuristically, validates each row for semantic
//! consistency, and classifies the feedback text as either *structured*
//! (produced by this tool and round-tripped through Workday, carrying a
//! `[TENETS]` marker block) or *generic* free text.
//!
//! The entry point is [`import::import_xlsx`], which drives the whole run
//! against a [`store::FeedbackStore`] and returns an
//! [`import::ImportResult`] instead of raising: every failure mode short of
//! a programming error is captured in the result's `errors`/`warnings`
//! lists so a single call site can relay them to an operator.

use snafu::Snafu;

pub mod columns;
pub mod config;
pub mod import;
pub mod query;
pub mod record;
pub mod rows;
pub mod store;
pub mod structured;

pub use columns::{detect_columns, header_texts, ColumnMapping};
pub use config::ImportConfig;
pub use import::{import_range, import_xlsx, ImportResult};
pub use query::{available_date_ranges, MonthlyCount};
pub use record::{NaturalKey, WorkdayRecord};
pub use rows::{validate_row, RowOutcome};
pub use store::{FeedbackStore, InsertError, JsonlStore, MemoryStore};
pub use structured::{parse_structured, StructuredFeedback};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WdError {
    #[snafu(display("Error opening config {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing config {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Store I/O error on {path}"))]
    StoreIo {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Unreadable record in store {path} at line {lineno}"))]
    StoreDecoding {
        source: serde_json::Error,
        path: String,
        lineno: usize,
    },
}

pub type WdResult<T> = Result<T, WdError>;
