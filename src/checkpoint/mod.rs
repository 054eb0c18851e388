//! Run storage: one directory per training run holding the value table in
//! binary and text form plus run metadata, and discovery of the latest run.

mod manager;
mod metadata;
pub mod npy;

pub use manager::{load_play_table, load_table_file, unix_timestamp, RunStore, RunStoreConfig};
pub use metadata::{RunHyperparameters, RunMetadata, RunMetrics};
