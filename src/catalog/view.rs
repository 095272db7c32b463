// ============================================================================
// Vues et messages transmis à la couche de rendu
// ============================================================================
// Le contrôleur ne dessine rien : il produit des PageView et des Notice,
// la couche de rendu (TUI) en fait des cartes, des graphiques et une barre
// de statut.
//
// CONCEPT RUST : Trait comme frontière
// - RenderLayer est implémenté par le TUI (via un channel) et par les tests
// ============================================================================

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::TransportError;
use crate::models::{Price, PriceHistory, PriceObservation, Product};

/// Identifiant du graphique de la vue détail
pub const DETAIL_CHART_ID: &str = "modal-chart";

/// Instantané de la page courante, prêt à être dessiné
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    /// Numéro de la page affichée (à partir de 1)
    pub page: usize,

    /// Nombre total de pages
    pub page_count: usize,

    /// Nombre total de produits côté serveur
    pub total: usize,

    /// Produits de la page, dans l'ordre d'affichage
    pub products: Vec<Product>,

    /// Historiques des produits de la page
    pub histories: HashMap<String, PriceHistory>,

    /// Mode sélection actif (cases à cocher visibles)
    pub selection_active: bool,

    /// Ids cochés
    pub selected: BTreeSet<String>,
}

impl PageView {
    /// Historique d'un produit de la page, vide s'il est absent
    pub fn history(&self, id: &str) -> &[PriceObservation] {
        self.histories.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest_price(&self, id: &str) -> Price {
        Price::latest_of(self.history(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    /// Demandes de graphiques compacts, une par carte
    pub fn chart_requests(&self) -> Vec<ChartRequest> {
        self.products
            .iter()
            .map(|p| ChartRequest {
                container_id: format!("chart-{}", p.id),
                history: self.history(&p.id).to_vec(),
                emphasized: false,
            })
            .collect()
    }

    /// Données de la vue détail d'un produit de la page
    pub fn details(&self, id: &str) -> Option<ProductDetails> {
        let product = self.products.iter().find(|p| p.id == id)?;
        let history = self.history(id).to_vec();
        Some(ProductDetails {
            product: product.clone(),
            latest: Price::latest_of(&history),
            previous: Price::previous_of(&history),
            history,
        })
    }
}

/// Données de la vue détail (modal)
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub product: Product,
    pub latest: Price,
    pub previous: Price,
    pub history: PriceHistory,
}

impl ProductDetails {
    /// Graphique détaillé (axes visibles, remplissage)
    pub fn chart_request(&self) -> ChartRequest {
        ChartRequest {
            container_id: DETAIL_CHART_ID.to_string(),
            history: self.history.clone(),
            emphasized: true,
        }
    }
}

/// Demande de construction d'un graphique
///
/// `emphasized` ne change que la densité visuelle, jamais les données.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub container_id: String,
    pub history: PriceHistory,
    pub emphasized: bool,
}

/// Message affiché à l'utilisateur après une opération
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// L'API est injoignable (serveur arrêté, timeout, CORS)
    ConnectionFailed,

    /// Échec du chargement des produits pour une autre raison
    LoadFailed,

    /// Suppression groupée demandée sans produit coché
    NothingSelected,

    /// Suppression groupée terminée
    Deleted(usize),

    /// Lien vide lors d'un ajout
    EmptyLink,

    /// Produit ajouté
    Added,

    /// Échec de l'ajout
    AddFailed,
}

impl Notice {
    /// Notice pour un échec de chargement de la liste
    ///
    /// Distingue la couche transport (aucune réponse) des autres échecs.
    pub fn for_load_error(err: &TransportError) -> Self {
        if err.is_network() {
            Notice::ConnectionFailed
        } else {
            Notice::LoadFailed
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::ConnectionFailed | Notice::LoadFailed | Notice::EmptyLink | Notice::AddFailed
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ConnectionFailed => write!(
                f,
                "Erreur de connexion : vérifiez que le serveur est lancé et sa configuration"
            ),
            Notice::LoadFailed => write!(f, "Erreur de chargement des produits (voir les logs)"),
            Notice::NothingSelected => write!(f, "Aucun produit sélectionné"),
            Notice::Deleted(count) => write!(f, "{} produit(s) supprimé(s)", count),
            Notice::EmptyLink => write!(f, "Le lien ne peut pas être vide"),
            Notice::Added => write!(f, "Produit ajouté"),
            Notice::AddFailed => write!(f, "Erreur lors de l'ajout du produit"),
        }
    }
}

/// Couche de rendu alimentée par le contrôleur
pub trait RenderLayer {
    /// Nouvelle page à afficher
    fn render_page(&mut self, view: PageView);

    /// Message pour l'utilisateur
    fn notify(&mut self, notice: Notice);
}
