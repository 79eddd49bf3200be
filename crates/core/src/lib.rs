pub mod csv;
pub mod errors;
pub mod merge;
pub mod models;
pub mod notifications;
pub mod workflow;

pub use errors::{RosterError, RosterResult};
