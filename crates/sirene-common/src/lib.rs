//! Sirene Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging and error handling for the Sirene API workspace.
//!
//! # Overview
//!
//! - **Error Handling**: Custom error types and result types
//! - **Types**: Registry identifiers (`Siret`, `Siren`) validated at the edge
//! - **Logging**: Centralized `tracing` subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use sirene_common::types::Siret;
//!
//! fn lookup(raw: &str) -> sirene_common::Result<()> {
//!     let siret: Siret = raw.parse()?;
//!     assert_eq!(siret.siren().as_str(), &raw[..9]);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SireneError};
