//! Core types for the agenda site.
//!
//! This crate holds everything the CLI and the HTTP server share:
//! - `event` and `registration` records as they come out of the datastore
//! - `ics` and `gcal` for turning events into calendar feeds and quick-add links
//! - `store` for reading records from the hosted datastore

pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod gcal;
pub mod ics;
pub mod lookup;
pub mod registration;
pub mod store;

pub use error::{AgendaError, AgendaResult};
pub use event::{CalendarEvent, EventId, EventRow};
