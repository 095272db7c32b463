// ============================================================================
// Module : models
// ============================================================================
// Structures de données du catalogue : produits et relevés de prix
// ============================================================================

pub mod price;   // Relevés de prix et prix inconnu
pub mod product; // Produit du catalogue

// Re-export des structures principales pour simplifier les imports
pub use price::{Price, PriceHistory, PriceObservation};
pub use product::Product;
