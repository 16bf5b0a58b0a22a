pub mod client;
pub mod error;
pub mod models;
pub mod query;

pub use client::{DataApi, HttpRemoteClient};
pub use error::RemoteError;
pub use query::{Filter, FilterOp, OrderBy, SelectQuery, SortDirection, TableQuery};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode raw wire rows into a typed collection.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(RemoteError::from))
        .collect()
}
