//! Core types and pure computations for the Vigil alert desk.
//!
//! This crate is deliberately free of HTTP and storage dependencies. The
//! client and CLI crates depend on it; everything here is a plain function of
//! its inputs so it can be tested without a server.

pub mod alert;
pub mod error;
pub mod export;
pub mod filter;
pub mod stats;
pub mod token;
pub mod user;
pub mod verification;

pub use error::{Error, Result};
