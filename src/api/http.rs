// ============================================================================
// API Client : HTTP
// ============================================================================
// Appelle le serveur du catalogue (Flask, JSON) avec reqwest
//
// CONCEPTS RUST :
// 1. async/await : appels réseau non-bloquants
// 2. Conversion d'erreurs : reqwest::Error -> TransportError via From
// 3. #[instrument] : chaque appel a son span avec les paramètres
// 4. Url::path_segments_mut : les ids sont encodés (espaces, '#', '?', '/')
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use super::wire::{MessageResponse, PriceObservationWire, ProductWire, ProductsResponse};
use super::{CatalogApi, ProductListing};
use crate::error::TransportError;
use crate::models::{PriceHistory, PriceObservation, Product};

/// Client HTTP de l'API du catalogue
///
/// CONCEPT RUST : reqwest::Client réutilisé
/// - Un seul client pour toutes les requêtes (pool de connexions)
/// - Clone est peu coûteux (Arc interne)
#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base_url: Url,
}

impl HttpCatalogApi {
    /// Crée un client pour l'API située à `base_url` (ex: "http://localhost:5000/api")
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pricepulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(format!("création du client HTTP : {}", e)))?;

        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| TransportError::Network(format!("URL invalide {:?} : {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Network(format!("URL invalide {:?}", raw)));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Ajoute des segments au chemin de base, chacun percent-encodé
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Vérifie le statut puis décode le corps JSON
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // Vérifie que la réponse est un succès HTTP (200-299)
    if !status.is_success() {
        error!(status = %status, "Catalog API returned error status");
        return Err(TransportError::Status(status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    #[instrument(skip(self))]
    async fn list_products(&self, page: usize, per_page: usize) -> Result<ProductListing, TransportError> {
        let response = self
            .client
            .get(self.url(&["products"]))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        let body: ProductsResponse = decode(response).await?;
        let products: Vec<Product> = body.products.into_iter().map(Product::from).collect();
        info!(received = products.len(), total = body.total_count, "Fetched product page");

        Ok(ProductListing {
            products,
            total_count: body.total_count,
        })
    }

    #[instrument(skip(self))]
    async fn price_history(&self, product_id: &str) -> Result<PriceHistory, TransportError> {
        let response = self
            .client
            .get(self.url(&["price_history", product_id]))
            .send()
            .await?;

        let body: Vec<PriceObservationWire> = decode(response).await?;
        let history: PriceHistory = body.into_iter().map(PriceObservation::from).collect();
        debug!(observations = history.len(), "Fetched price history");
        Ok(history)
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, product_id: &str) -> Result<bool, TransportError> {
        let response = self
            .client
            .delete(self.url(&["delete_product", product_id]))
            .send()
            .await?;

        let body: MessageResponse = decode(response).await?;
        info!(message = %body.message, "Product deleted");
        Ok(true)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn add_product(&self, product: &Product) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.url(&["add_product"]))
            .json(&ProductWire::from(product))
            .send()
            .await?;

        let body: MessageResponse = decode(response).await?;
        info!(message = %body.message, "Product added");
        Ok(body.message)
    }
}
