// ============================================================================
// ProductStore : liste ordonnée des produits chargés
// ============================================================================
// Accumule les pages reçues de l'API, sans doublons, avec le total serveur
//
// CONCEPTS RUST :
// 1. HashSet pour la déduplication en O(1)
// 2. Slices (&[T]) : vue sur une partie du Vec sans copie
// 3. Saturating arithmetic : le total ne passe jamais sous zéro
// ============================================================================

use std::collections::HashSet;

use tracing::debug;

use crate::models::Product;

/// Produits chargés et nombre total de produits côté serveur
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: Vec<Product>,
    total: usize,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intègre une page reçue de l'API
    ///
    /// - Page 1 : remplace le contenu (rafraîchissement complet)
    /// - Autres pages : ajoute seulement les ids inconnus, dans l'ordre reçu
    ///
    /// Le total est toujours écrasé par celui du serveur.
    pub fn load_page(&mut self, page: usize, items: Vec<Product>, total: usize) {
        let received = items.len();

        if page == 1 {
            self.products.clear();
        }

        // CONCEPT RUST : HashSet<String> construit depuis les ids existants
        // - insert() retourne false si l'id est déjà présent
        // - Déduplique aussi à l'intérieur de la page reçue
        let mut seen: HashSet<String> = self.products.iter().map(|p| p.id.clone()).collect();
        for item in items {
            if seen.insert(item.id.clone()) {
                self.products.push(item);
            }
        }

        self.total = total;
        debug!(page, received, held = self.products.len(), total, "Page merged into product store");
    }

    /// Supprime le produit correspondant, retourne true s'il était présent
    ///
    /// Le total n'est pas modifié : c'est à l'appelant de le décrémenter.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        before != self.products.len()
    }

    /// Insère un produit en tête (ajout optimiste après confirmation serveur)
    ///
    /// Le total n'est pas modifié : c'est à l'appelant de l'incrémenter.
    pub fn insert_at_front(&mut self, product: Product) {
        self.products.insert(0, product);
    }

    /// Produits de la page demandée
    ///
    /// CONCEPT RUST : Slice bornée
    /// - start = (page - 1) * page_size
    /// - end = min(page * page_size, total), et jamais au-delà de ce qui est chargé
    /// - Retourne une slice vide plutôt que de paniquer
    pub fn slice(&self, page: usize, page_size: usize) -> &[Product] {
        if page == 0 || page_size == 0 {
            return &[];
        }

        let start = (page - 1).saturating_mul(page_size);
        let end = page
            .saturating_mul(page_size)
            .min(self.total)
            .min(self.products.len());

        if start >= end {
            return &[];
        }
        &self.products[start..end]
    }

    /// Nombre de pages : ceil(total / page_size)
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.total.div_ceil(page_size)
    }

    pub fn increment_total(&mut self) {
        self.total += 1;
    }

    pub fn decrement_total(&mut self) {
        self.total = self.total.saturating_sub(1);
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn contains(&self, id: &str) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
