// ============================================================================
// HistoryCache : historiques de prix par produit
// ============================================================================
// Rempli paresseusement (une requête par produit au premier affichage),
// jamais rafraîchi ensuite. Une entrée disparaît seulement quand le produit
// est supprimé.
// ============================================================================

use std::collections::{HashMap, HashSet};

use crate::models::{Price, PriceHistory, PriceObservation};

/// Cache id produit -> historique, dans l'ordre du serveur (plus récent en premier)
#[derive(Debug, Clone, Default)]
pub struct HistoryCache {
    entries: HashMap<String, PriceHistory>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Historique du produit, vide s'il n'a jamais été chargé
    pub fn get(&self, id: &str) -> &[PriceObservation] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Enregistre (ou remplace) l'historique d'un produit
    pub fn put(&mut self, id: impl Into<String>, history: PriceHistory) {
        self.entries.insert(id.into(), history);
    }

    pub fn forget(&mut self, id: &str) {
        self.entries.remove(id);
    }

    /// Prix le plus récent (premier relevé), Unknown si pas d'historique
    pub fn latest_price(&self, id: &str) -> Price {
        Price::latest_of(self.get(id))
    }

    /// Prix précédent (deuxième relevé), Unknown s'il n'existe pas
    pub fn previous_price(&self, id: &str) -> Price {
        Price::previous_of(self.get(id))
    }

    /// Ids sans entrée dans le cache, dans l'ordre donné et sans répétition
    pub fn missing<'a, I>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| !self.has(id) && seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
