//! folio library
//!
//! Resume link caching and resolution, plus clients for the portfolio API's
//! projects and contact endpoints. The `folio` binary is a thin front end.

pub mod app;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod data;
pub mod resolver;
pub mod ui;
