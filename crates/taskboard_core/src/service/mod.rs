//! Use-case services composed over the stores.
//!
//! # Responsibility
//! - Gate login on the demo credential check.
//! - Wire storage backends and both stores into one injected `Board` handle.

pub mod board;
pub mod credentials;
