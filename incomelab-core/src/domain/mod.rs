//! Domain types for the IncomeLab signal engine

pub mod factor;
pub mod instrument;
pub mod sentiment;

pub use factor::{Computed, Factor};
pub use instrument::{DatedValue, InstrumentSnapshot};
pub use sentiment::{SentimentBook, SentimentScore};
