//! CFP Common Library
//!
//! Shared error handling and logging initialization for the CFP
//! (Crawl Feed Pipeline) workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the [`CfpError`] type and [`Result`] alias used
//!   across all pipeline components
//! - **Logging**: `tracing`-based logging setup driven by [`logging::LogConfig`]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CfpError, Result};
