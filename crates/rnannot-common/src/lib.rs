//! rnannot Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pieces shared by every rnannot workspace member:
//!
//! - **Logging**: subscriber setup for console and rotating file output
//! - **Environment**: typed lookups of configuration variables
//! - **Errors**: the error type those helpers report
//!
//! # Example
//!
//! ```no_run
//! use rnannot_common::env::parse_var_or;
//!
//! fn workers() -> rnannot_common::Result<usize> {
//!     parse_var_or("MAX_WORKERS", 4)
//! }
//! ```

pub mod env;
pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
