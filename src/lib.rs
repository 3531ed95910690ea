//! Earthquake pie-chart generator.
//!
//! Buckets earthquake records by magnitude, elevation, rainfall, time of day
//! and date, counts them per bucket (optionally per city or per magnitude
//! class), and hands the resulting tables to a chart sink.
//!
//! ```text
//! records ──► classify ──► analysis ──► render::ChartSink
//!  (ingest)    (per record)  (one fold)    (svg / json / memory)
//! ```

pub mod analysis;
pub mod classify;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod profiles;
pub mod render;

pub use model::{Category, Dimension, QuakeError, Record};
