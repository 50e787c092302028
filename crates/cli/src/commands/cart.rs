//! Cart commands.
//!
//! The cart is persisted under `TIENDA_DATA_DIR`, so it survives between
//! invocations.

use std::io::{self, Write};

use tienda_core::{CartState, ProductId, format_price};
use tienda_storefront::catalog::CatalogSource;
use tienda_storefront::error::{AppError, add_breadcrumb};
use tienda_storefront::state::AppState;

use super::CommandError;

/// Add one unit of the product with this slug.
///
/// Refuses products that are out of stock.
pub async fn add(state: &AppState, slug: &str) -> Result<(), CommandError> {
    let product = state
        .catalog()
        .product_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}'")))?;

    if product.is_out_of_stock() {
        add_breadcrumb("cart", "Rejected out-of-stock item", Some(&[("slug", slug)]));
        return Err(AppError::BadRequest(format!("'{}' is out of stock", product.name)).into());
    }

    let id = product.id.clone();
    let name = product.name.clone();
    state.cart().add_item(product);

    let mut out = io::stdout().lock();
    writeln!(out, "{name}: {} in cart", state.cart().get_item_count(&id))?;
    Ok(())
}

/// Remove one unit of a cart product.
pub fn remove(state: &AppState, slug: &str) -> Result<(), CommandError> {
    let id = cart_product_id(&state.cart().snapshot(), slug)?;
    state.cart().remove_item(&id);

    let mut out = io::stdout().lock();
    writeln!(out, "{slug}: {} in cart", state.cart().get_item_count(&id))?;
    Ok(())
}

/// Remove a cart product's line entirely.
pub fn delete(state: &AppState, slug: &str) -> Result<(), CommandError> {
    let id = cart_product_id(&state.cart().snapshot(), slug)?;
    state.cart().delete_item(&id);

    let mut out = io::stdout().lock();
    writeln!(out, "{slug}: removed from cart")?;
    Ok(())
}

/// Print cart lines and totals.
pub fn show(state: &AppState) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    write_cart(&mut out, &state.cart().snapshot())?;
    Ok(())
}

/// Empty the cart.
pub fn clear(state: &AppState) -> Result<(), CommandError> {
    state.cart().clear();

    let mut out = io::stdout().lock();
    writeln!(out, "Cart cleared")?;
    Ok(())
}

/// Resolve a slug (or raw product ID) to a product already in the cart.
fn cart_product_id(cart: &CartState, slug: &str) -> Result<ProductId, AppError> {
    cart.items()
        .iter()
        .map(|item| &item.product)
        .find(|product| product.slug() == Some(slug) || product.id.as_str() == slug)
        .map(|product| product.id.clone())
        .ok_or_else(|| AppError::NotFound(format!("'{slug}' is not in the cart")))
}

fn write_cart(out: &mut impl Write, cart: &CartState) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    for item in cart.grouped_items() {
        writeln!(
            out,
            "{:>3} x {:<32} {}",
            item.quantity,
            item.product.short_name(32),
            format_price(item.subtotal())
        )?;
    }

    let discount = cart.total_discount();
    writeln!(out)?;
    writeln!(out, "Artículos: {}", cart.total_quantity())?;
    if !discount.is_zero() {
        writeln!(out, "Descuento: {}", format_price(discount))?;
    }
    writeln!(out, "Subtotal:  {}", format_price(cart.subtotal()))
}
