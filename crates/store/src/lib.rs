//! # Incident Store
//!
//! Holds the two uploaded tables (incidents and relations) and loads them
//! from CSV or JSON files.

mod error;
mod loader;
mod store;

pub use error::{Result, StoreError};
pub use loader::{
    load_incidents, load_relations, parse_incidents_csv, parse_incidents_json,
    parse_relations_csv, parse_relations_json, TableFormat,
};
pub use store::{distinct_values, RecordStore};
