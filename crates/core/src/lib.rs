//! Tienda Core - Shared domain types.
//!
//! This crate provides the types shared by all Tienda components:
//! - `storefront` - Cart store, catalog access and search
//! - `cli` - Command-line front end over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no storage, no HTTP clients. Cart arithmetic lives here so it can be
//! tested without any persistence attached.
//!
//! # Modules
//!
//! - [`types`] - Document IDs, prices, catalog documents and cart state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
