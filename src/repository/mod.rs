//! Service dataset source and write-back store.

mod dataset;
mod store;

pub use dataset::{DatasetError, ServiceDataset};
pub use store::{DatasetStore, ServiceStore};
