//! Core library for the flooring-sync command line application.
//!
//! The library exposes the pieces that power the command-line interface as
//! well as the tests. The modules are structured to keep responsibilities
//! narrow and composable: vendor downloads live in [`fetch`], workbook
//! conversion in [`convert`], descriptor configuration in [`report`],
//! environment configuration in [`config`], and the run log plus the error
//! digest notifier in [`runlog`].

pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod report;
pub mod runlog;

pub use error::{Result, ToolError};
