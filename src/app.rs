// ============================================================================
// Structure : App
// ============================================================================
// État de l'interface TUI : ce qui est affiché, le produit sous le curseur,
// les saisies et confirmations en cours.
//
// L'état du catalogue lui-même (produits, historiques, sélection) appartient
// au PageController du worker thread. App n'en garde que le dernier
// instantané reçu (PageView).
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use crate::catalog::{Notice, PageView, ProductDetails};
use crate::models::Product;

/// Nombre de cartes par ligne de la grille
pub const GRID_COLUMNS: usize = 3;

/// Écrans de l'application
///
/// CONCEPT RUST : Enums pour state machines
/// - Un seul écran actif à la fois
/// - Le compilateur force à gérer tous les cas
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Grille des produits de la page courante
    Grid,

    /// Vue détail (modal) d'un produit
    Detail,

    /// Saisie d'un lien pour ajouter un produit
    AddLink,
}

/// État principal de l'interface
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Dernière page reçue du contrôleur
    pub view: PageView,

    /// Index du produit sous le curseur, dans la page
    pub focus: usize,

    /// Données de la vue détail ouverte
    pub detail: Option<ProductDetails>,

    /// Dernier message pour l'utilisateur
    pub notice: Option<Notice>,

    /// Two-step quit : première pression de 'q' -> confirm_quit = true
    pub confirm_quit: bool,

    /// Two-step delete : première pression -> confirm_delete = true
    pub confirm_delete: bool,

    /// Une opération réseau est en cours
    pub is_loading: bool,

    /// Message affiché pendant le chargement
    pub loading_message: Option<String>,

    /// Buffer de saisie du lien
    pub input_buffer: String,

    /// Prompt affiché en mode saisie
    pub input_prompt: String,

    /// Un ajout est parti au serveur, le formulaire attend sa réponse
    pub add_pending: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            current_screen: Screen::Grid,
            view: PageView::default(),
            focus: 0,
            detail: None,
            notice: None,
            confirm_quit: false,
            confirm_delete: false,
            is_loading: false,
            loading_message: None,
            input_buffer: String::new(),
            input_prompt: String::new(),
            add_pending: false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Page courante
    // ========================================================================

    /// Remplace l'instantané affiché
    ///
    /// Le curseur est ramené dans la page. Si la vue détail est ouverte sur
    /// un produit qui n'est plus dans la page, elle est fermée.
    pub fn apply_page(&mut self, view: PageView) {
        self.view = view;
        self.focus = self.focus.min(self.view.products.len().saturating_sub(1));

        let open_id = self.detail.as_ref().map(|d| d.product.id.clone());
        if let Some(id) = open_id {
            match self.view.details(&id) {
                Some(fresh) => self.detail = Some(fresh),
                None => self.close_details(),
            }
        }
    }

    /// Produit sous le curseur
    pub fn focused_product(&self) -> Option<&Product> {
        self.view.products.get(self.focus)
    }

    // Navigation dans la grille (GRID_COLUMNS cartes par ligne)

    /// Carte du dessus, sans effet sur la première ligne
    pub fn navigate_up(&mut self) {
        if self.focus >= GRID_COLUMNS {
            self.focus -= GRID_COLUMNS;
        }
    }

    /// Carte du dessous, ou dernière carte si la ligne suivante est incomplète
    pub fn navigate_down(&mut self) {
        let count = self.view.products.len();
        if self.focus + GRID_COLUMNS < count {
            self.focus += GRID_COLUMNS;
        } else if count > 0 && self.focus / GRID_COLUMNS < (count - 1) / GRID_COLUMNS {
            self.focus = count - 1;
        }
    }

    /// Carte de gauche, sans changer de ligne
    pub fn navigate_left(&mut self) {
        if self.focus % GRID_COLUMNS > 0 {
            self.focus -= 1;
        }
    }

    /// Carte de droite, sans changer de ligne
    pub fn navigate_right(&mut self) {
        if self.focus % GRID_COLUMNS < GRID_COLUMNS - 1 && self.focus + 1 < self.view.products.len() {
            self.focus += 1;
        }
    }

    pub fn selection_active(&self) -> bool {
        self.view.selection_active
    }

    pub fn selected_count(&self) -> usize {
        self.view.selected.len()
    }

    // ========================================================================
    // Vue détail
    // ========================================================================

    /// Ouvre la vue détail du produit sous le curseur
    ///
    /// Sans effet en mode sélection : Enter/Espace y coche les cases.
    pub fn open_details(&mut self) -> bool {
        if self.selection_active() {
            return false;
        }
        let details = self
            .focused_product()
            .and_then(|product| self.view.details(&product.id));

        match details {
            Some(details) => {
                self.detail = Some(details);
                self.current_screen = Screen::Detail;
                true
            }
            None => false,
        }
    }

    pub fn close_details(&mut self) {
        self.detail = None;
        if self.current_screen == Screen::Detail {
            self.current_screen = Screen::Grid;
        }
    }

    pub fn is_on_grid(&self) -> bool {
        self.current_screen == Screen::Grid
    }

    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::Detail
    }

    // ========================================================================
    // Messages
    // ========================================================================

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Affiche un message du contrôleur
    ///
    /// Le formulaire d'ajout se ferme seulement quand l'ajout a réussi :
    /// après un échec, le lien saisi reste modifiable.
    pub fn apply_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Added => {
                if self.add_pending && self.is_in_input_mode() {
                    self.cancel_input();
                }
                self.add_pending = false;
            }
            Notice::AddFailed | Notice::EmptyLink => self.add_pending = false,
            _ => {}
        }
        self.set_notice(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // ========================================================================
    // Confirmations two-step
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.confirm_delete
    }

    /// Annule toutes les confirmations en attente
    pub fn cancel_confirmations(&mut self) {
        self.cancel_quit();
        self.cancel_delete();
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Saisie du lien
    // ========================================================================

    /// Entre en mode saisie (formulaire d'ajout)
    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::AddLink;
        self.input_buffer.clear();
        self.input_prompt = prompt;
        self.add_pending = false;
    }

    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Grid;
        self.input_buffer.clear();
        self.input_prompt.clear();
        self.add_pending = false;
    }

    /// Lien à envoyer au serveur
    ///
    /// Le formulaire reste ouvert jusqu'à la réponse (voir apply_notice).
    /// None si un envoi est déjà en attente.
    pub fn submit_input(&mut self) -> Option<String> {
        if self.add_pending {
            return None;
        }
        self.add_pending = true;
        Some(self.input_buffer.clone())
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::AddLink
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[&str], selection_active: bool) -> PageView {
        PageView {
            page: 1,
            page_count: 1,
            total: ids.len(),
            products: ids.iter().map(|id| Product::new(*id, format!("Produit {}", id))).collect(),
            selection_active,
            ..PageView::default()
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.is_on_grid());
        assert!(app.focused_product().is_none());
    }

    #[test]
    fn test_navigation_follows_grid() {
        let mut app = App::new();
        app.apply_page(page(&["p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8"], false));

        app.navigate_right();
        app.navigate_right();
        app.navigate_right();
        assert_eq!(app.focused_product().unwrap().id, "p3");

        app.navigate_down();
        assert_eq!(app.focused_product().unwrap().id, "p6");

        // Dernière ligne incomplète : on va sur la dernière carte
        app.navigate_down();
        assert_eq!(app.focused_product().unwrap().id, "p8");
        app.navigate_down();
        assert_eq!(app.focus, 7);

        app.navigate_right();
        assert_eq!(app.focus, 7);
        app.navigate_left();
        app.navigate_left();
        app.navigate_left();
        assert_eq!(app.focused_product().unwrap().id, "p7");

        app.navigate_up();
        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.focused_product().unwrap().id, "p1");
    }

    #[test]
    fn test_navigation_stays_in_page() {
        let mut app = App::new();
        app.apply_page(page(&["p1", "p2"], false));
        app.navigate_down();
        assert_eq!(app.focus, 0);
        app.navigate_right();
        app.navigate_right();
        assert_eq!(app.focus, 1);

        // Page plus courte : le curseur est ramené dans la page
        app.apply_page(page(&["p4"], false));
        assert_eq!(app.focus, 0);
    }

    #[test]
    fn test_details_not_opened_in_selection_mode() {
        let mut app = App::new();
        app.apply_page(page(&["p1"], true));
        assert!(!app.open_details());
        assert!(app.is_on_grid());

        app.apply_page(page(&["p1"], false));
        assert!(app.open_details());
        assert!(app.is_on_detail());
        assert_eq!(app.detail.as_ref().unwrap().product.id, "p1");
    }

    #[test]
    fn test_details_closed_when_product_leaves_page() {
        let mut app = App::new();
        app.apply_page(page(&["p1", "p2"], false));
        assert!(app.open_details());

        app.apply_page(page(&["p2"], false));
        assert!(app.detail.is_none());
        assert!(app.is_on_grid());
    }

    fn type_link(app: &mut App, link: &str) {
        app.start_input("Lien : ".to_string());
        for c in link.chars() {
            app.append_char(c);
        }
    }

    #[test]
    fn test_submit_input_waits_for_result() {
        let mut app = App::new();
        type_link(&mut app, "https://x");
        app.backspace();

        assert_eq!(app.submit_input().as_deref(), Some("https://"));
        assert!(app.is_in_input_mode());

        // Un seul envoi à la fois
        assert_eq!(app.submit_input(), None);

        app.apply_notice(Notice::Added);
        assert!(app.is_on_grid());
        assert!(app.input_buffer.is_empty());
        assert!(!app.add_pending);
    }

    #[test]
    fn test_failed_add_keeps_typed_link() {
        let mut app = App::new();
        type_link(&mut app, "https://shop.example/rose");
        app.submit_input();

        app.apply_notice(Notice::AddFailed);
        assert!(app.is_in_input_mode());
        assert_eq!(app.input_buffer, "https://shop.example/rose");
        assert_eq!(app.notice, Some(Notice::AddFailed));

        // Nouvel essai possible
        assert_eq!(app.submit_input().as_deref(), Some("https://shop.example/rose"));
    }

    #[test]
    fn test_empty_link_keeps_form_open() {
        let mut app = App::new();
        type_link(&mut app, "   ");
        app.submit_input();

        app.apply_notice(Notice::EmptyLink);
        assert!(app.is_in_input_mode());
        assert!(!app.add_pending);
    }

    #[test]
    fn test_quit() {
        let mut app = App::new();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_confirmations();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }
}
