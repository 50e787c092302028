//! Core types for Tienda.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{CartItem, CartState, GroupedItem};
pub use id::*;
pub use order::{Order, OrderLine};
pub use price::{CurrencyCode, Price, format_price};
pub use product::{Category, ImageRef, Product, Reference, Slug};
pub use status::*;
