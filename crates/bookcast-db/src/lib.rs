//! Bookcast Persistence Layer
//!
//! Flat-file storage for the bounded booking list. The file is a JSON array
//! of booking rows, newest first, rewritten in full after every mutation.

pub mod file;

pub use file::{BookingFile, BookingRow, DbError, DbResult};
