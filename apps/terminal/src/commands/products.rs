//! # Product Commands
//!
//! The shop's catalogue. `products add` without `--name` asks the UPC
//! database for the name and picture first.

use serde::Serialize;

use khatha_client::api::products::search_products;
use khatha_core::{Product, ProductDraft};

use crate::cli::{ProductArgs, ProductChanges, ProductsCommand};
use crate::commands::{confirm_or_cancel, retailer_api, Reply};
use crate::error::{CommandError, CommandResult};
use crate::prompt::Prompt;
use crate::state::AppState;
use crate::view;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupView {
    found: bool,
    name: Option<String>,
    image_url: Option<String>,
    message: Option<String>,
}

pub async fn run(state: &AppState, cmd: ProductsCommand, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    let (api, _) = retailer_api(state).await?;

    match cmd {
        ProductsCommand::List { search, low_stock } => {
            let products = api.products().list().await?;
            let shown: Vec<&Product> = search_products(&products, search.as_deref().unwrap_or(""))
                .into_iter()
                .filter(|p| !low_stock || p.is_low_stock() || p.is_out_of_stock())
                .collect();
            Reply::new(render_table(&shown, false), &shown)
        }
        ProductsCommand::Add(args) => {
            let mut draft = draft_from_args(&args);
            if args.name.is_none() {
                let lookup = api.products().lookup_upc(&args.barcode).await?;
                if !lookup.is_found() {
                    return Err(CommandError::validation(format!(
                        "Barcode {} is not in the UPC database; pass --name",
                        args.barcode.trim()
                    )));
                }
                lookup.apply_to(&mut draft);
            }
            let product = api.products().create(&draft).await?;
            Reply::new(format!("Added {} (id {}) at {}", product.name, product.id, product.price), &product)
        }
        ProductsCommand::Update { id, changes } => {
            let products = api.products().list().await?;
            let current = products
                .iter()
                .find(|p| p.id == id)
                .ok_or_else(|| CommandError::not_found("Product", id))?;
            let draft = apply_changes(current, changes);
            let product = api.products().update(id, &draft).await?;
            Reply::new(format!("Updated {} (id {})", product.name, product.id), &product)
        }
        ProductsCommand::Delete { id, yes } => {
            confirm_or_cancel(prompt, yes, &format!("Delete product {}?", id))?;
            api.products().delete(id).await?;
            Ok(Reply::message(format!("Product {} deleted", id)))
        }
        ProductsCommand::Lookup { barcode } => {
            let lookup = api.products().lookup_upc(&barcode).await?;
            let data = LookupView {
                found: lookup.is_found(),
                name: lookup.name.clone(),
                image_url: lookup.image_url.clone(),
                message: lookup.message.clone(),
            };
            let text = if data.found {
                format!("{}: {}", barcode.trim(), view::opt(&data.name))
            } else {
                format!(
                    "{}: not found{}",
                    barcode.trim(),
                    data.message.as_deref().map(|m| format!(" ({})", m)).unwrap_or_default()
                )
            };
            Reply::new(text, &data)
        }
    }
}

fn draft_from_args(args: &ProductArgs) -> ProductDraft {
    ProductDraft {
        name: args.name.clone().unwrap_or_default(),
        barcode: args.barcode.trim().to_string(),
        price: args.price,
        quantity: args.qty,
        product_type: args.kind.into(),
        category: args.category.clone(),
        image_url: None,
    }
}

fn apply_changes(product: &Product, changes: ProductChanges) -> ProductDraft {
    ProductDraft {
        name: changes.name.unwrap_or_else(|| product.name.clone()),
        barcode: product.barcode.clone(),
        price: changes.price.unwrap_or(product.price),
        quantity: changes.qty.unwrap_or(product.quantity),
        product_type: changes.kind.map(Into::into).unwrap_or(product.product_type),
        category: changes.category.or_else(|| product.category.clone()),
        image_url: product.image_url.clone(),
    }
}

/// Catalogue table; `with_shop` adds the retailer column for the marketplace.
pub(crate) fn render_table(products: &[&Product], with_shop: bool) -> String {
    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|p| {
            let stock = if p.is_out_of_stock() {
                "out of stock".to_string()
            } else if p.is_low_stock() {
                format!("only {} left", p.quantity)
            } else {
                p.quantity.to_string()
            };
            let mut row = vec![
                p.id.to_string(),
                p.name.clone(),
                p.barcode.clone(),
                p.price.to_string(),
                stock,
            ];
            if with_shop {
                row.push(p.retailer_id.map(|r| r.to_string()).unwrap_or_default());
            }
            row
        })
        .collect();

    let mut headers = vec!["Id", "Name", "Barcode", "Price", "Stock"];
    if with_shop {
        headers.push("Shop");
    }
    view::table_or_empty(&headers, &rows, "No products found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProductKind;
    use khatha_core::{Money, ProductType};

    fn product(quantity: i64) -> Product {
        Product {
            id: 3,
            name: "Amul Milk".into(),
            barcode: "8901262".into(),
            price: Money::from_rupees(28),
            quantity,
            product_type: ProductType::Liquid,
            category: Some("DAIRY".into()),
            image_url: None,
            retailer_id: Some(7),
        }
    }

    #[test]
    fn test_changes_keep_unset_fields() {
        let draft = apply_changes(
            &product(10),
            ProductChanges {
                price: Some(Money::from_rupees(30)),
                kind: Some(ProductKind::Unit),
                ..ProductChanges::default()
            },
        );
        assert_eq!(draft.name, "Amul Milk");
        assert_eq!(draft.price, Money::from_rupees(30));
        assert_eq!(draft.quantity, 10);
        assert_eq!(draft.product_type, ProductType::Unit);
        assert_eq!(draft.category.as_deref(), Some("DAIRY"));
    }

    #[test]
    fn test_stock_column() {
        let low = product(2);
        let out = product(0);
        let text = render_table(&[&low, &out], true);
        assert!(text.contains("only 2 left"));
        assert!(text.contains("out of stock"));
        assert!(text.lines().next().unwrap().ends_with("Shop"));
    }
}
