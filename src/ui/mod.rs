// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Grille des produits, header et footer
pub mod chart;     // Graphiques ligne des historiques
pub mod detail;    // Vue détail d'un produit

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use dashboard::render;
