//! Catalog commands. No login needed.

use rust_decimal::Decimal;
use shopfront_client::api::products::ProductQuery;
use shopfront_core::{Availability, CategoryId, Price, Product, ProductId};

use super::{CommandError, Shell};

/// Arguments for `products list`.
pub struct ListFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub skip: u32,
    pub limit: u32,
}

impl ListFilter {
    fn into_query(self) -> Result<ProductQuery, CommandError> {
        let price = |value: Option<Decimal>, name: &str| {
            value
                .map(|v| {
                    Price::new(v).ok_or_else(|| {
                        CommandError::InvalidArgument(format!("{name} cannot be negative"))
                    })
                })
                .transpose()
        };

        let mut query = ProductQuery::new()
            .skip(self.skip)
            .limit(self.limit)
            .price_range(price(self.min_price, "--min-price")?, price(self.max_price, "--max-price")?);
        if let Some(search) = self.search {
            query = query.search(search);
        }
        if let Some(category) = self.category {
            query = query.category(CategoryId::new(category));
        }
        Ok(query)
    }
}

#[allow(clippy::print_stdout)]
pub async fn list(filter: ListFilter) -> Result<(), CommandError> {
    let shell = Shell::anonymous()?;
    let products = shell.store.api().list_products(&filter.into_query()?).await?;

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in &products {
        print_summary(product);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn show(id: &str) -> Result<(), CommandError> {
    let shell = Shell::anonymous()?;
    match shell.store.api().product(&ProductId::new(id)).await {
        Ok(product) => {
            print_summary(&product);
            if !product.description.is_empty() {
                println!();
                println!("{}", product.description);
            }
            if let Some(url) = &product.image_url {
                println!("Image: {url}");
            }
            Ok(())
        }
        // Not found renders as an empty state.
        Err(err) if err.is_not_found() => {
            println!("Product not found.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[allow(clippy::print_stdout)]
pub async fn categories() -> Result<(), CommandError> {
    let shell = Shell::anonymous()?;
    for category in shell.store.api().categories().await? {
        match &category.description {
            Some(description) => println!("{}  {}  {description}", category.id, category.name),
            None => println!("{}  {}", category.id, category.name),
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(product: &Product) {
    let stock = match product.availability() {
        Availability::InStock(n) => format!("{n} in stock"),
        Availability::LowStock(n) => format!("only {n} left"),
        Availability::OutOfStock => "out of stock".to_string(),
    };
    println!("{}  {:<32} {:>10}  {stock}", product.id, product.name, product.price);
}
