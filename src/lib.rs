pub mod auth;
pub mod date;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod record;
pub mod sheets;
pub mod sync;

pub use error::{Error, Result};
pub use fetch::{PageSource, Site};
pub use record::{CellValue, Field, Kind, Percentage, Record};
pub use sheets::{GoogleSheet, Sheet, SheetCoordinate, Spreadsheet};
