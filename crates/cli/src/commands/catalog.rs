//! Catalog browsing commands.

use std::io::{self, Write};

use tienda_core::{Category, Product, ProductStatus, format_price};
use tienda_storefront::catalog::{self, CatalogSource};
use tienda_storefront::error::AppError;
use tienda_storefront::state::AppState;

use super::CommandError;

/// List products, optionally filtered by home-page tab or category slug.
///
/// Unfiltered and tab listings degrade to an empty list when the CMS is
/// unreachable, the same as the storefront pages.
pub async fn products(
    state: &AppState,
    variant: Option<&str>,
    category: Option<&str>,
) -> Result<(), CommandError> {
    let products = match (variant, category) {
        (Some(variant), _) => catalog::load_products_by_variant(state.catalog(), variant).await,
        (None, Some(slug)) => state.catalog().products_by_category(slug).await?,
        (None, None) => catalog::load_products(state.catalog()).await,
    };

    let mut out = io::stdout().lock();
    if products.is_empty() {
        writeln!(out, "No products found")?;
        return Ok(());
    }
    for product in &products {
        write_product_line(&mut out, product)?;
    }
    Ok(())
}

/// Show one product by slug.
pub async fn product(state: &AppState, slug: &str) -> Result<(), CommandError> {
    let product = state
        .catalog()
        .product_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}'")))?;

    let mut out = io::stdout().lock();
    write_product_line(&mut out, &product)?;
    if let Some(description) = &product.description {
        writeln!(out)?;
        writeln!(out, "{description}")?;
    }
    Ok(())
}

/// List categories.
pub async fn categories(state: &AppState, limit: Option<usize>) -> Result<(), CommandError> {
    let categories = catalog::load_categories(state.catalog(), limit).await;

    let mut out = io::stdout().lock();
    if categories.is_empty() {
        writeln!(out, "No categories found")?;
        return Ok(());
    }
    for category in &categories {
        write_category_line(&mut out, category)?;
    }
    Ok(())
}

/// One product per line: slug, name, price and badges.
pub fn write_product_line(out: &mut impl Write, product: &Product) -> io::Result<()> {
    write!(
        out,
        "{:<28} {:<32} {}",
        product.slug().unwrap_or("-"),
        product.short_name(32),
        format_price(product.price)
    )?;
    if let Some(original) = product.original_price() {
        write!(out, " (antes {})", format_price(original))?;
    }
    if let Some(status) = product.status.filter(|s| *s != ProductStatus::Unknown) {
        write!(out, " [{status}]")?;
    }
    if product.is_out_of_stock() {
        write!(out, " [agotado]")?;
    }
    writeln!(out)
}

fn write_category_line(out: &mut impl Write, category: &Category) -> io::Result<()> {
    let slug = category.slug.as_ref().map_or("-", |s| s.current.as_str());
    match category.range {
        Some(range) => writeln!(
            out,
            "{slug:<24} {} (desde {})",
            category.title,
            format_price(range)
        ),
        None => writeln!(out, "{slug:<24} {}", category.title),
    }
}
