// ============================================================================
// SelectionState : mode sélection et produits cochés
// ============================================================================
// CONCEPT : Multi-select Vim-like
// - Le mode sélection affiche une case à cocher sur chaque carte
// - Quitter le mode vide toujours la sélection (pas d'ids périmés)
// ============================================================================

use std::collections::BTreeSet;

/// Sélection multiple pour la suppression groupée
///
/// CONCEPT RUST : BTreeSet
/// - Ordre d'itération déterministe (tri par id)
/// - La suppression groupée traite les ids toujours dans le même ordre
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    active: bool,
    selected: BTreeSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bascule le mode sélection, la sélection est vidée à chaque bascule
    pub fn toggle_mode(&mut self) {
        self.active = !self.active;
        self.clear();
    }

    /// Quitte le mode sélection et vide la sélection
    pub fn cancel(&mut self) {
        self.active = false;
        self.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn add(&mut self, id: impl Into<String>) {
        self.selected.insert(id.into());
    }

    pub fn remove(&mut self, id: &str) {
        self.selected.remove(id);
    }

    /// Coche ou décoche un produit (case à cocher), sans effet hors mode sélection
    ///
    /// Retourne true si le produit est coché après l'appel.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.active {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Vue en lecture seule des ids cochés
    pub fn members(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Garde seulement les ids pour lesquels le prédicat est vrai
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.selected.retain(|id| keep(id));
    }
}
