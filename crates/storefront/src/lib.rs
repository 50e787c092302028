//! Tienda storefront library.
//!
//! Cart store with persistence, catalog and order reads over the content
//! API, and debounced product search. Front ends (the `tienda` CLI, tests)
//! build an [`state::AppState`] and drive these through it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod cms;
pub mod config;
pub mod error;
pub mod search;
pub mod state;
pub mod telemetry;
