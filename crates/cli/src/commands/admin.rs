//! Administrator commands.
//!
//! The backend enforces the role; the route guard is checked first so a
//! customer account gets a clear message without a request.

use shopfront_client::{Access, Route};
use shopfront_core::{OrderId, OrderStatus, OrderUpdate, ProductId};

use super::orders::print_summary;
use super::{CommandError, Shell};

async fn admin_shell(section: &str) -> Result<Shell, CommandError> {
    let shell = Shell::logged_in().await?;
    match shell.store.authorize(&Route::Admin(section.to_string())) {
        Access::Allow => Ok(shell),
        Access::Redirect(_) => Err(CommandError::LoginRequired),
        Access::Forbidden => Err(CommandError::Rejected("administrator access")),
    }
}

#[allow(clippy::print_stdout)]
pub async fn users() -> Result<(), CommandError> {
    let shell = admin_shell("users").await?;
    for user in shell.store.api().admin_users().await? {
        println!(
            "{}  {:<20} {:<32} {:?}{}",
            user.id,
            user.username,
            user.email,
            user.role,
            if user.is_active { "" } else { " (inactive)" }
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn products() -> Result<(), CommandError> {
    let shell = admin_shell("products").await?;
    for product in shell.store.api().admin_products().await? {
        println!(
            "{}  {:<32} {:>10}  stock {}{}",
            product.id,
            product.name,
            product.price,
            product.stock_quantity,
            if product.is_active { "" } else { " (inactive)" }
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn categories() -> Result<(), CommandError> {
    let shell = admin_shell("categories").await?;
    for category in shell.store.api().admin_categories().await? {
        println!("{}  {}", category.id, category.name);
    }
    Ok(())
}

pub async fn orders() -> Result<(), CommandError> {
    let shell = admin_shell("orders").await?;
    for order in shell.store.api().admin_orders().await? {
        print_summary(&order);
    }
    Ok(())
}

pub async fn set_status(order: &str, status: &str) -> Result<(), CommandError> {
    let status: OrderStatus = status
        .parse()
        .map_err(|e: shopfront_core::UnknownStatus| CommandError::InvalidArgument(e.to_string()))?;
    let shell = admin_shell("orders").await?;
    let update = OrderUpdate {
        status: Some(status),
        shipping_address: None,
    };
    let order = shell
        .store
        .api()
        .admin_update_order(&OrderId::new(order), &update)
        .await?;
    print_summary(&order);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn delete_product(id: &str) -> Result<(), CommandError> {
    let shell = admin_shell("products").await?;
    shell
        .store
        .api()
        .admin_delete_product(&ProductId::new(id))
        .await?;
    println!("Deleted product {id}");
    Ok(())
}
