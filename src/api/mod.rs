// ============================================================================
// Module : api
// ============================================================================
// Client de l'API du catalogue. Le contrôleur ne dépend que du trait
// CatalogApi : le client HTTP en production, un faux serveur en mémoire
// dans les tests.
// ============================================================================

pub mod http; // Client HTTP (reqwest)
pub mod wire; // Structures JSON échangées avec le serveur

use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::{PriceHistory, Product};

// Re-export du client principal
pub use http::HttpCatalogApi;

/// Une page de produits et le nombre total côté serveur
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub total_count: usize,
}

/// Les quatre opérations distantes du catalogue
///
/// CONCEPT RUST : async_trait
/// - Les méthodes async retournent une Future boxée
/// - Send + Sync : le client peut vivre dans le worker thread
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Liste une page de produits
    async fn list_products(&self, page: usize, per_page: usize) -> Result<ProductListing, TransportError>;

    /// Historique de prix d'un produit (plus récent en premier)
    async fn price_history(&self, product_id: &str) -> Result<PriceHistory, TransportError>;

    /// Supprime un produit, retourne true si le serveur l'a confirmé
    async fn delete_product(&self, product_id: &str) -> Result<bool, TransportError>;

    /// Ajoute un produit, retourne le message du serveur
    async fn add_product(&self, product: &Product) -> Result<String, TransportError>;
}
