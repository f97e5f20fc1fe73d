//! Order commands.

use shopfront_core::{Order, OrderId};

use super::{CommandError, Shell, dollars};

#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), CommandError> {
    let shell = Shell::logged_in().await?;
    let orders = shell.store.api().orders().await?;
    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in &orders {
        print_summary(order);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn show(id: &str) -> Result<(), CommandError> {
    let shell = Shell::logged_in().await?;
    match shell.store.api().order(&OrderId::new(id)).await {
        Ok(order) => {
            print_summary(&order);
            println!("Ship to: {}", order.shipping_address);
            for line in &order.items {
                println!("  {} x {}", line.quantity, line.product_id);
            }
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            println!("Order not found.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn checkout(address: &str) -> Result<(), CommandError> {
    let mut shell = Shell::logged_in().await?;
    let order = shell.store.checkout(address).await;
    shell.ensure(order.is_some(), "checkout")?;
    if let Some(order) = order {
        print_summary(&order);
    }
    Ok(())
}

pub async fn cancel(id: &str) -> Result<(), CommandError> {
    let mut shell = Shell::logged_in().await?;
    let ok = shell.store.cancel_order(&OrderId::new(id)).await;
    shell.ensure(ok, "cancel")
}

#[allow(clippy::print_stdout)]
pub fn print_summary(order: &Order) {
    let created = order
        .created_at
        .map_or_else(String::new, |at| at.format("%Y-%m-%d %H:%M").to_string());
    println!(
        "{}  {:<10} {:>3} units  {:>10}  {created}",
        order.id,
        order.status,
        order.unit_count(),
        dollars(order.total_amount)
    );
}
