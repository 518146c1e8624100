//! # unsheet
//!
//! Configuration-driven tabular data extraction from XLSX workbooks.
//!
//! Given a workbook and a per-sheet configuration (which row holds headers,
//! where body data starts, which columns to include), unsheet returns parsed
//! headers plus typed row data, collecting per-sheet errors instead of
//! aborting the whole operation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unsheet::{extract_file, ExtractConfig, SheetConfig};
//!
//! let mut config = ExtractConfig::new();
//! config.insert(
//!     "Data".to_string(),
//!     SheetConfig::new()
//!         .with("headerRow", 1i64)
//!         .with("bodyRow", 1i64)
//!         .with("cols", "A:B"),
//! );
//!
//! let extraction = extract_file("report.xlsx", &config);
//! for (name, sheet) in &extraction.worksheets {
//!     println!("{}: {} rows under {:?}", name, sheet.rows.len(), sheet.headers);
//! }
//! for error in &extraction.errors {
//!     eprintln!("{}", error);
//! }
//! ```
//!
//! ## Configuration
//!
//! Settings are resolved per worksheet with silent fallback to defaults:
//!
//! | key | type | default |
//! |---|---|---|
//! | `hasHeaders` | bool | `true` |
//! | `headerRow` | int | `0` |
//! | `bodyRow` | int (offset from first used row) | `0` |
//! | `cols` | index list or `"A:B"` range | full used span |
//!
//! Configurations also deserialize from JSON via serde, preserving key
//! order.
//!
//! ## Features
//!
//! - `async`: async entry point (`extract_reader`) built on Tokio

pub mod columns;
pub mod config;
pub mod container;
pub mod error;
pub mod extract;
pub mod value;
pub mod xlsx;

// Re-exports
pub use columns::{column_to_number, parse_column_range};
pub use config::{ConfigValue, ExtractConfig, SheetConfig};
pub use error::{Error, Result};
pub use extract::{extract, extract_bytes, extract_file, Extraction, SheetData};
pub use value::CellValue;
pub use xlsx::{Cell, CellKind, Workbook, Worksheet};

#[cfg(feature = "async")]
pub use extract::extract_reader;
