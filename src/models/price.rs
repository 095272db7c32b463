// ============================================================================
// Structures : PriceObservation et Price
// ============================================================================
// Un relevé de prix daté, et un prix qui peut être inconnu
//
// CONCEPTS RUST :
// 1. Decimal : prix exacts, pas d'erreurs d'arrondi comme avec f64
// 2. Enum au lieu d'une valeur sentinelle : Price::Unknown ne peut pas être
//    confondu avec un vrai prix à zéro
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Un relevé de prix à une date donnée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceObservation {
    /// Date du relevé (scraping)
    pub date: DateTime<Utc>,

    /// Prix en UAH
    pub price: Decimal,
}

impl PriceObservation {
    pub fn new(date: DateTime<Utc>, price: Decimal) -> Self {
        Self { date, price }
    }
}

/// Historique de prix d'un produit, dans l'ordre du serveur (plus récent en premier)
pub type PriceHistory = Vec<PriceObservation>;

/// Prix affiché sur une carte ou dans la vue détail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Price {
    /// Prix connu
    Known(Decimal),

    /// Pas d'historique pour ce produit
    Unknown,
}

impl Price {
    pub fn is_known(self) -> bool {
        matches!(self, Price::Known(_))
    }

    /// Prix le plus récent d'un historique (premier relevé)
    pub fn latest_of(history: &[PriceObservation]) -> Self {
        history.first().map(|o| o.price).into()
    }

    /// Prix précédent d'un historique (deuxième relevé)
    pub fn previous_of(history: &[PriceObservation]) -> Self {
        history.get(1).map(|o| o.price).into()
    }
}

impl From<Option<Decimal>> for Price {
    fn from(value: Option<Decimal>) -> Self {
        value.map(Price::Known).unwrap_or(Price::Unknown)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Known(price) => write!(f, "{:.2}", price),
            Price::Unknown => write!(f, "---"),
        }
    }
}
