/// Input loading.
///
/// Submodules:
/// - `records` — JSON earthquake record files.

pub mod records;

pub use records::{load_records, parse_records};
