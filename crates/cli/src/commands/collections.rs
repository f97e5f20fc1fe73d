//! Cart and wishlist commands.

use shopfront_core::{CartItemId, ProductId, Quantity, WishlistItemId};

use super::{CommandError, Shell};

pub enum CartCommand {
    Show,
    Add { product: String, quantity: u32 },
    Update { item: String, quantity: i64 },
    Increment(String),
    Decrement(String),
    Remove(String),
    Clear,
}

pub enum WishlistCommand {
    Show,
    Add(String),
    Remove(String),
    Clear,
}

#[allow(clippy::print_stdout)]
pub async fn cart(command: CartCommand) -> Result<(), CommandError> {
    let mut shell = Shell::logged_in().await?;
    let cart = shell.store.cart().clone();

    match command {
        CartCommand::Show => {}
        CartCommand::Add { product, quantity } => {
            let quantity = Quantity::new(quantity)
                .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
            let ok = cart.add(&ProductId::new(product), quantity).await;
            shell.ensure(ok, "cart add")?;
        }
        CartCommand::Update { item, quantity } => {
            let ok = cart.update(&CartItemId::new(item), quantity).await;
            shell.ensure(ok, "cart update")?;
        }
        CartCommand::Increment(item) => {
            let ok = cart.increment(&CartItemId::new(item)).await;
            shell.ensure(ok, "cart inc")?;
        }
        CartCommand::Decrement(item) => {
            let ok = cart.decrement(&CartItemId::new(item)).await;
            shell.ensure(ok, "cart dec")?;
        }
        CartCommand::Remove(item) => {
            let ok = cart.remove(&CartItemId::new(item)).await;
            shell.ensure(ok, "cart remove")?;
        }
        CartCommand::Clear => {
            let ok = cart.clear().await;
            shell.ensure(ok, "cart clear")?;
        }
    }

    if cart.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }
    for line in cart.items() {
        println!(
            "{}  {:<32} {:>3} x {:>10} = {}",
            line.id,
            line.product.name,
            line.quantity,
            line.product.price,
            line.line_total()
        );
    }
    println!("{} items, total {}", cart.count(), cart.total());
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn wishlist(command: WishlistCommand) -> Result<(), CommandError> {
    let mut shell = Shell::logged_in().await?;
    let wishlist = shell.store.wishlist().clone();

    match command {
        WishlistCommand::Show => {}
        WishlistCommand::Add(product) => {
            let ok = wishlist.add(&ProductId::new(product)).await;
            shell.ensure(ok, "wishlist add")?;
        }
        WishlistCommand::Remove(product) => {
            // Accept either the product or the entry id.
            let product = ProductId::new(product);
            let entry = wishlist
                .entry_for(&product)
                .unwrap_or_else(|| WishlistItemId::new(product.into_inner()));
            let ok = wishlist.remove(&entry).await;
            shell.ensure(ok, "wishlist remove")?;
        }
        WishlistCommand::Clear => {
            let ok = wishlist.clear().await;
            shell.ensure(ok, "wishlist clear")?;
        }
    }

    if wishlist.is_empty() {
        println!("Your wishlist is empty.");
        return Ok(());
    }
    for item in wishlist.items() {
        println!(
            "{}  {:<32} {:>10}",
            item.product_id, item.product.name, item.product.price
        );
    }
    println!("{} saved", wishlist.count());
    Ok(())
}
