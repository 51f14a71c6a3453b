//! # Products API
//!
//! The shop's catalogue, the public marketplace catalogue and barcode
//! lookups.

use serde::Deserialize;
use tracing::{debug, info};

use khatha_core::validation::{validate_name, validate_price};
use khatha_core::{Product, ProductDraft};

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Category given to products nobody has classified.
pub const MISC_CATEGORY: &str = "MISCELLANEOUS";

/// Reply to `GET /products/upc/lookup`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcLookup {
    /// `OK` or `NOT_FOUND`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UpcLookup {
    pub fn is_found(&self) -> bool {
        self.status.eq_ignore_ascii_case("OK")
    }

    /// Fills the blanks of a draft from the lookup.
    pub fn apply_to(&self, draft: &mut ProductDraft) {
        if !self.is_found() {
            return;
        }
        if let Some(ref name) = self.name {
            draft.name = name.clone();
        }
        if self.image_url.is_some() {
            draft.image_url = self.image_url.clone();
        }
        if draft.category.is_none() {
            draft.category = Some(MISC_CATEGORY.to_string());
        }
    }
}

pub struct ProductsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> ProductsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        ProductsApi { http }
    }

    /// `GET /products?retailerId=`.
    pub async fn list(&self) -> ClientResult<Vec<Product>> {
        let retailer_id = self.http.require_retailer()?;
        self.http
            .get("/products", &[("retailerId", retailer_id.to_string())])
            .await
    }

    /// `POST /products?retailerId=`.
    pub async fn create(&self, draft: &ProductDraft) -> ClientResult<Product> {
        let retailer_id = self.http.require_retailer()?;
        validate_name("name", &draft.name)?;
        validate_price(draft.price)?;

        let product: Product = self
            .http
            .post("/products", &[("retailerId", retailer_id.to_string())], draft)
            .await?;
        info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// `PUT /products/{id}`.
    pub async fn update(&self, product_id: i64, draft: &ProductDraft) -> ClientResult<Product> {
        validate_name("name", &draft.name)?;
        validate_price(draft.price)?;
        self.http.put(&format!("/products/{}", product_id), &[], draft).await
    }

    /// `DELETE /products/{id}`.
    pub async fn delete(&self, product_id: i64) -> ClientResult<()> {
        self.http.delete(&format!("/products/{}", product_id), &[]).await?;
        info!(product_id, "Product deleted");
        Ok(())
    }

    /// `GET /products/public/all[?lat=&lng=]`, de-duplicated.
    pub async fn public_catalog(&self, near: Option<(f64, f64)>) -> ClientResult<Vec<Product>> {
        let query: Vec<(&str, String)> = match near {
            Some((lat, lng)) => vec![("lat", lat.to_string()), ("lng", lng.to_string())],
            None => Vec::new(),
        };
        let raw: Vec<Product> = self.http.get("/products/public/all", &query).await?;
        Ok(dedupe_catalog(raw))
    }

    /// `GET /products/upc/lookup?barcode=`.
    pub async fn lookup_upc(&self, barcode: &str) -> ClientResult<UpcLookup> {
        let lookup: UpcLookup = self
            .http
            .get("/products/upc/lookup", &[("barcode", barcode.trim().to_string())])
            .await?;
        debug!(barcode, found = lookup.is_found(), "UPC lookup");
        Ok(lookup)
    }
}

/// Collapses the same product listed by several shops.
///
/// Keyed by barcode (else name), case-insensitive. The first listing wins
/// unless it is uncategorised and a later one is not.
pub fn dedupe_catalog(products: Vec<Product>) -> Vec<Product> {
    let mut kept: Vec<Product> = Vec::with_capacity(products.len());

    for product in products {
        let key = catalog_key(&product);
        match kept.iter_mut().find(|p| catalog_key(p) == key) {
            None => kept.push(product),
            Some(existing) => {
                if is_misc(existing) && !is_misc(&product) {
                    *existing = product;
                }
            }
        }
    }

    kept
}

fn catalog_key(product: &Product) -> String {
    let raw = if product.barcode.is_empty() { &product.name } else { &product.barcode };
    raw.trim().to_lowercase()
}

fn is_misc(product: &Product) -> bool {
    product.category.as_deref() == Some(MISC_CATEGORY)
}

/// Finds a product by exact barcode (the scanner path).
pub fn find_by_barcode<'p>(products: &'p [Product], barcode: &str) -> Option<&'p Product> {
    let barcode = barcode.trim();
    products.iter().find(|p| p.barcode == barcode)
}

/// Case-insensitive match on name, or a barcode prefix.
pub fn search_products<'p>(products: &'p [Product], query: &str) -> Vec<&'p Product> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&query) || p.barcode.to_lowercase().starts_with(&query))
        .collect()
}
