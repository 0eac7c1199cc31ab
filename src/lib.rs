//! NEO monitoring dashboard: fetches near-earth-object records, aggregates
//! them into stat cards, chart datasets and tables, and drives the ML
//! training and prediction service.

pub mod binning;
pub mod charts;
pub mod cli;
pub mod client;
pub mod config;
pub mod format;
pub mod logging;
pub mod model;
pub mod pages;
pub mod render;
pub mod stats;
pub mod view;
