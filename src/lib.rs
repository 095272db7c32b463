// ============================================================================
// PricePulse - Library
// ============================================================================
// Expose les modules publics pour le binaire TUI et les tests
// ============================================================================

pub mod api;      // Client de l'API du catalogue
pub mod app;      // État de l'interface
pub mod catalog;  // État du catalogue et orchestration
pub mod config;   // Configuration (variables d'environnement)
pub mod error;    // Erreurs typées
pub mod models;   // Structures de données
pub mod ui;       // Interface utilisateur
