// ============================================================================
// Structure : Product
// ============================================================================
// Un produit suivi par le catalogue (ex: un bouquet scrappé sur un site marchand)
//
// CONCEPTS RUST :
// 1. Identité par id : deux Product avec le même id sont le même produit
// 2. Option<String> : l'image peut ne pas exister côté serveur
// 3. Immutabilité : un produit n'est jamais modifié, il est remplacé en entier
// ============================================================================

/// Nom affiché quand le serveur n'en fournit pas
pub const UNKNOWN_NAME: &str = "Nom inconnu";

/// Nom donné aux produits ajoutés par lien, en attendant le scraping
pub const PLACEHOLDER_NAME: &str = "Nouveau produit";

/// Image affichée quand le produit n'en a pas
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/100";

/// Produit du catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Identifiant unique (ex: "product-1718000000000")
    pub id: String,

    /// Nom affiché (peut être vide si le serveur n'en a pas)
    pub display_name: String,

    /// URL de l'image du produit
    pub image_url: Option<String>,
}

impl Product {
    /// Crée un produit sans image
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            image_url: None,
        }
    }

    /// Ajoute une image au produit
    ///
    /// CONCEPT RUST : Builder pattern par valeur
    /// - self est consommé puis retourné modifié
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Produit provisoire créé localement lors d'un ajout par lien
    ///
    /// Le lien saisi est conservé comme image, le nom réel arrivera
    /// au prochain passage de l'ETL.
    pub fn placeholder(id: impl Into<String>, link: &str) -> Self {
        Self::new(id, PLACEHOLDER_NAME).with_image(link)
    }

    /// Nom à afficher, avec repli si le serveur n'en a pas fourni
    pub fn name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            UNKNOWN_NAME
        } else {
            &self.display_name
        }
    }

    /// URL d'image à afficher, avec repli sur l'image générique
    pub fn image(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Nom tronqué pour tenir dans une carte de la grille
    ///
    /// CONCEPT RUST : chars() vs bytes
    /// - Les noms sont en UTF-8 (cyrillique), on compte les caractères
    pub fn short_name(&self, max_chars: usize) -> String {
        let name = self.name();
        if name.chars().count() <= max_chars {
            name.to_string()
        } else {
            let truncated: String = name.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{}…", truncated)
        }
    }
}
