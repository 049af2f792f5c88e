//! plaidflat-ingest: seed-file reading and CSV/JSON persistence for flattened output.

pub mod cleanup;
pub mod csv_out;
pub mod json_out;
pub mod seed;

pub use cleanup::remove_stale;
pub use csv_out::write_records;
pub use json_out::write_json;
pub use seed::read_column;
