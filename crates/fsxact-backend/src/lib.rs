//! `fsxact` backend layer.
//!
//! This crate defines the capability contract a journaling backend must
//! implement to participate in atomic metadata updates, plus the concrete
//! backend implementations that ship with `fsxact`.
//!
//! # Modules
//!
//! - [`traits`] - The [`Backend`] capability trait and transaction tokens
//! - [`backends`] - Concrete backend implementations
//! - [`env`] - The per-call execution context
//! - [`error`] - Backend error types

pub mod backends;
pub mod env;
pub mod error;
pub mod traits;

pub use env::Env;
pub use error::BackendError;
pub use traits::{Backend, TxnToken};
