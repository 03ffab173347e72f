//! EoS AOP - End of Support software risk tracking.
//!
//! Loads a service inventory and drives the Annual Operating Plan table
//! (coarse and live filters, sort, selection, column visibility, CSV export),
//! bulk and single-record edits, and the risk dashboard.

pub mod cli;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod forms;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod server;
pub mod utils;
