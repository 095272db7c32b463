// ============================================================================
// Erreurs de la bibliothèque
// ============================================================================
// Taxonomie :
// - TransportError : réseau, statut HTTP non-2xx, corps illisible
// - CatalogError : tout ce que le contrôleur peut retourner
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère Display et std::error::Error
// - #[from] génère la conversion automatique utilisée par l'opérateur ?
// ============================================================================

use thiserror::Error;

/// Échec d'un appel à l'API du catalogue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// La requête n'a jamais obtenu de réponse (connexion refusée, timeout, CORS côté navigateur)
    #[error("connexion à l'API impossible : {0}")]
    Network(String),

    /// Le serveur a répondu avec un statut non-2xx
    #[error("l'API a retourné une erreur : HTTP {0}")]
    Status(u16),

    /// Le corps de la réponse n'a pas pu être décodé
    #[error("réponse de l'API invalide : {0}")]
    Decode(String),
}

impl TransportError {
    /// Vrai pour les échecs de la couche transport (aucune réponse HTTP reçue)
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Erreur retournée par les opérations du contrôleur
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Saisie utilisateur refusée avant tout appel réseau
    #[error("saisie invalide : {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
