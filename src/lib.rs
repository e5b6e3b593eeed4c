//! cursor-usage library
//!
//! Loads Cursor usage-event CSV exports and answers questions about them:
//! filtering by date and field values, typed sorting, cost and per-model
//! breakdowns, and column views. Exports can also be pulled from the
//! dashboard with a stored session cookie.
//!
//! This tool is not affiliated with or endorsed by Anysphere, Inc. (Cursor).

pub mod config;
pub mod error;
pub mod recent;
pub mod remote;
pub mod session;
pub mod storage;
pub mod table;
