//! # Marketplace Commands (customer side)
//!
//! Browse every shop's products, fill one cart across shops, and check
//! out as one order per shop.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  marketplace cart          split_by_retailer          POST /orders/    │
//! │  ┌──────────────────┐      ┌──────────────────┐       create (×N,      │
//! │  │ Tea   shop 1  x2 │ ───► │ shop 1: ₹60.00   │ ───►  concurrently)    │
//! │  │ Salt  shop 1  x1 │      │ shop 2: ₹15.00   │                        │
//! │  │ Soap  shop 2  x1 │      └──────────────────┘                        │
//! │  └──────────────────┘                                                  │
//! │                                                                         │
//! │  all succeed ──► cart cleared                                          │
//! │  any fail    ──► "1 of 2 orders failed: ..."  cart kept                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use khatha_client::api::products::search_products;
use khatha_client::workflow::place_orders;
use khatha_client::KhathaApi;
use khatha_core::cart::{Cart, CartLine};
use khatha_core::order_split::split_by_retailer;
use khatha_core::{CustomerAccount, Money, Order, Product, RetailerProfile};

use crate::cli::ShopCommand;
use crate::commands::orders::{newest_first, render_table as render_orders, Party};
use crate::commands::products::render_table as render_products;
use crate::commands::{confirm_or_cancel, Reply};
use crate::error::{CommandError, CommandResult};
use crate::prompt::Prompt;
use crate::state::AppState;
use crate::view;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarketCartView {
    lines: Vec<CartLine>,
    shops: usize,
    total: Money,
}

impl From<&Cart> for MarketCartView {
    fn from(cart: &Cart) -> Self {
        let shops = split_by_retailer(cart.lines(), None)
            .map(|s| s.groups.len())
            .unwrap_or_default();
        MarketCartView {
            lines: cart.lines().to_vec(),
            shops,
            total: cart.subtotal(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutView {
    orders: Vec<Order>,
    dropped: usize,
}

pub async fn run(state: &AppState, cmd: ShopCommand, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    match cmd {
        ShopCommand::Browse { search, lat, lng } => {
            let api = state.api().await?;
            let near = lat.zip(lng);
            let products = api.products().public_catalog(near).await?;
            let shown = search_products(&products, search.as_deref().unwrap_or(""));
            Reply::new(render_products(&shown, true), &shown)
        }
        ShopCommand::Add { product } => {
            let api = state.api().await?;
            let products = api.products().public_catalog(None).await?;
            let found = find_product(&products, product)?;
            let mut cart = state.drafts.marketplace().await;
            cart.add_product(found)?;
            state.drafts.save_marketplace(&cart).await?;
            cart_reply(&cart)
        }
        ShopCommand::Remove { product } => {
            let mut cart = state.drafts.marketplace().await;
            cart.remove(product)?;
            state.drafts.save_marketplace(&cart).await?;
            cart_reply(&cart)
        }
        ShopCommand::Cart => cart_reply(&state.drafts.marketplace().await),
        ShopCommand::Checkout { pay, yes } => {
            let (api, account) = customer_api(state).await?;
            let mut cart = state.drafts.marketplace().await;
            if cart.is_empty() {
                return Err(khatha_core::CoreError::EmptyCart.into());
            }

            let preview = MarketCartView::from(&cart);
            confirm_or_cancel(
                prompt,
                yes,
                &format!(
                    "Place {} order(s) totalling {} ({})?",
                    preview.shops.max(1),
                    preview.total,
                    pay
                ),
            )?;

            let placed = place_orders(&api, &mut cart, &account, pay).await?;
            state.drafts.save_marketplace(&cart).await?;

            let mut text = format!(
                "{} order(s) placed\n\n{}",
                placed.orders.len(),
                render_orders(&placed.orders, Party::Shop)
            );
            if placed.dropped > 0 {
                text.push_str(&format!(
                    "\n{} item(s) had no shop and were left out",
                    placed.dropped
                ));
            }
            Reply::new(
                text,
                &CheckoutView {
                    orders: placed.orders,
                    dropped: placed.dropped,
                },
            )
        }
        ShopCommand::Nearby { lat, lng, radius } => {
            let api = state.api().await?;
            let shops = api.retailer().nearby(lat, lng, radius).await?;
            Reply::new(render_shops(&shops), &shops)
        }
        ShopCommand::Shops => {
            let api = state.api().await?;
            let shops = api.auth().public_retailers().await?;
            Reply::new(render_shops(&shops), &shops)
        }
        ShopCommand::Orders => {
            let (api, account) = customer_api(state).await?;
            let mut orders = api.orders().for_customer(account.customer_id).await?;
            newest_first(&mut orders);
            Reply::new(render_orders(&orders, Party::Shop), &orders)
        }
        ShopCommand::Cancel { id } => {
            let (api, account) = customer_api(state).await?;
            let orders = api.orders().for_customer(account.customer_id).await?;
            let order = orders
                .iter()
                .find(|o| o.id == id)
                .ok_or_else(|| CommandError::not_found("Order", id))?;
            api.orders().cancel(order).await?;
            Ok(Reply::message(format!("Order {} cancelled", id)))
        }
    }
}

async fn customer_api(state: &AppState) -> CommandResult<(KhathaApi, CustomerAccount)> {
    let session = state.session.snapshot().await;
    let account = session.require_customer()?.clone();
    Ok((state.api().await?, account))
}

fn find_product(products: &[Product], id: i64) -> CommandResult<&Product> {
    products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| CommandError::not_found("Product", id))
}

fn cart_reply(cart: &Cart) -> CommandResult<Reply> {
    let view = MarketCartView::from(cart);
    Reply::new(render_cart(&view), &view)
}

fn render_cart(cart: &MarketCartView) -> String {
    if cart.lines.is_empty() {
        return "Cart is empty".to_string();
    }
    let rows: Vec<Vec<String>> = cart
        .lines
        .iter()
        .map(|l| {
            vec![
                l.product_id.to_string(),
                l.name.clone(),
                l.retailer_id.map(|r| r.to_string()).unwrap_or_default(),
                l.quantity.to_string(),
                l.line_total().to_string(),
            ]
        })
        .collect();
    format!(
        "{}\n\nTotal {} from {} shop(s)",
        view::table(&["Id", "Item", "Shop", "Qty", "Amount"], &rows),
        cart.total,
        cart.shops
    )
}

fn render_shops(shops: &[RetailerProfile]) -> String {
    let rows: Vec<Vec<String>> = shops
        .iter()
        .map(|s| {
            vec![
                s.id.map(|id| id.to_string()).unwrap_or_default(),
                s.shop_name.clone().or_else(|| s.name.clone()).unwrap_or_default(),
                view::opt(&s.phone),
                view::opt(&s.address),
            ]
        })
        .collect();
    view::table_or_empty(&["Id", "Shop", "Phone", "Address"], &rows, "No shops found")
}
