//! Order history command.

use std::io::{self, Write};

use tienda_core::{Order, Price, format_price};
use tienda_storefront::catalog;
use tienda_storefront::error::set_sentry_user;
use tienda_storefront::state::AppState;

use super::CommandError;

/// List a user's orders, newest first.
pub async fn list(state: &AppState, user_id: &str) -> Result<(), CommandError> {
    if !user_id.trim().is_empty() {
        set_sentry_user(&user_id);
    }
    let orders = catalog::load_orders(state.catalog(), user_id).await?;

    let mut out = io::stdout().lock();
    if orders.is_empty() {
        writeln!(out, "No orders yet")?;
        return Ok(());
    }
    for order in &orders {
        write_order(&mut out, order)?;
    }
    Ok(())
}

fn write_order(out: &mut impl Write, order: &Order) -> io::Result<()> {
    let date = order
        .order_date
        .map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string());
    let total = Price::new(order.total_price, order.currency).display();

    writeln!(
        out,
        "#{} {date} {:<16} {} ({} items)",
        order.order_number,
        order.status.to_string(),
        total,
        order.item_count()
    )?;
    if order.has_discount() {
        writeln!(
            out,
            "    antes {} (descuento {})",
            Price::new(order.subtotal_before_discount(), order.currency).display(),
            Price::new(order.amount_discount, order.currency).display()
        )?;
    }
    for line in &order.products {
        if let Some(product) = &line.product {
            writeln!(
                out,
                "    {:>3} x {} {}",
                line.quantity,
                product.short_name(32),
                format_price(product.price)
            )?;
        }
    }
    Ok(())
}
