// ============================================================================
// Structures JSON de l'API
// ============================================================================
// Le serveur expose les colonnes de la base telles quelles, on définit des
// structures qui matchent exactement le JSON pour que serde puisse
// désérialiser automatiquement, puis on convertit vers nos modèles.
//
// Particularités du serveur :
// - scrape_date est une HTTP-date ("Tue, 14 Oct 2025 10:00:00 GMT")
// - price_uah est un DECIMAL, sérialisé en chaîne ("1250.00")
// - bouquet_name et photo_url peuvent être null
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{PriceObservation, Product};

/// Réponse de GET /products
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductWire>,
    pub total_count: usize,
}

/// Un produit tel que renvoyé (ou attendu) par le serveur
///
/// Les champs added_at / updated_at sont ignorés.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWire {
    pub product_id: String,
    #[serde(default)]
    pub bouquet_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Un relevé de GET /price_history/<id>
#[derive(Debug, Deserialize)]
pub struct PriceObservationWire {
    pub price_uah: Decimal,
    #[serde(deserialize_with = "deserialize_scrape_date")]
    pub scrape_date: DateTime<Utc>,
}

/// Réponse de DELETE /delete_product/<id> et POST /add_product
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

impl From<ProductWire> for Product {
    fn from(wire: ProductWire) -> Self {
        Product {
            id: wire.product_id,
            display_name: wire.bouquet_name.unwrap_or_default(),
            image_url: wire.photo_url.filter(|url| !url.is_empty()),
        }
    }
}

impl From<&Product> for ProductWire {
    fn from(product: &Product) -> Self {
        ProductWire {
            product_id: product.id.clone(),
            bouquet_name: Some(product.display_name.clone()),
            photo_url: product.image_url.clone(),
        }
    }
}

impl From<PriceObservationWire> for PriceObservation {
    fn from(wire: PriceObservationWire) -> Self {
        PriceObservation::new(wire.scrape_date, wire.price_uah)
    }
}

/// Parse une date de relevé
///
/// Accepte le format HTTP-date (RFC 2822, "GMT") que produit le serveur,
/// et RFC 3339 en repli.
pub fn parse_scrape_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|date| date.with_timezone(&Utc))
        .ok()
}

fn deserialize_scrape_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_scrape_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("date de relevé invalide : {}", raw)))
}
