// ============================================================================
// Module : catalog
// ============================================================================
// Cœur de l'application : état du catalogue et orchestration
//
// - store      : produits chargés, dédupliqués, avec le total serveur
// - history    : cache des historiques de prix
// - selection  : mode sélection et produits cochés
// - controller : chargement des pages, suppression, ajout
// - view       : ce qui est transmis à la couche de rendu
// ============================================================================

pub mod controller;
pub mod history;
pub mod selection;
pub mod store;
pub mod view;

pub use controller::PageController;
pub use history::HistoryCache;
pub use selection::SelectionState;
pub use store::ProductStore;
pub use view::{ChartRequest, Notice, PageView, ProductDetails, RenderLayer};
