//! # Retailer API

use tracing::info;

use khatha_core::RetailerProfile;

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Search radius for nearby shops, in km.
pub const DEFAULT_NEARBY_RADIUS_KM: u32 = 10;

pub struct RetailerApi<'a> {
    http: &'a HttpClient,
}

impl<'a> RetailerApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        RetailerApi { http }
    }

    /// `GET /retailer/profile`.
    pub async fn profile(&self) -> ClientResult<RetailerProfile> {
        self.http.require_retailer()?;
        self.http.get("/retailer/profile", &[]).await
    }

    /// `PUT /retailer/profile`.
    pub async fn update_profile(&self, profile: &RetailerProfile) -> ClientResult<RetailerProfile> {
        self.http.require_retailer()?;
        let updated: RetailerProfile = self.http.put("/retailer/profile", &[], profile).await?;
        info!(upi_configured = updated.upi_id.is_some(), "Retailer profile updated");
        Ok(updated)
    }

    /// `GET /retailer/nearby?lat=&lng=&radius=`.
    pub async fn nearby(&self, lat: f64, lng: f64, radius_km: Option<u32>) -> ClientResult<Vec<RetailerProfile>> {
        let radius = radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
        self.http
            .get(
                "/retailer/nearby",
                &[
                    ("lat", lat.to_string()),
                    ("lng", lng.to_string()),
                    ("radius", radius.to_string()),
                ],
            )
            .await
    }
}
