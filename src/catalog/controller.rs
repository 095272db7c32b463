// ============================================================================
// PageController : orchestration chargement -> cache -> rendu
// ============================================================================
// Possède tout l'état du catalogue (produits, historiques, sélection) et le
// client API. Toutes les mutations passent par ici, sur un seul fil
// d'exécution : les seuls points de suspension sont les appels réseau.
//
// Protocole d'un refresh(page) :
// 1. GET de la page (échec -> notice, état inchangé)
// 2. Fusion dans le ProductStore
// 3. Historiques manquants de la page chargés en parallèle (join_all),
//    un échec donne un historique vide
// 4. Rendu de la page
// ============================================================================

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use super::history::HistoryCache;
use super::selection::SelectionState;
use super::store::ProductStore;
use super::view::{Notice, PageView, RenderLayer};
use crate::api::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::models::Product;

/// Préfixe des ids générés localement lors d'un ajout
const LOCAL_ID_PREFIX: &str = "product-";

// ============================================================================
// Génération d'ids locaux
// ============================================================================

/// Ids "product-<millis>" strictement croissants
///
/// L'horloge peut renvoyer deux fois la même milliseconde (ou reculer) :
/// on prend toujours au moins last + 1, et on saute les ids déjà présents.
#[derive(Debug, Default)]
struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    fn next<F>(&mut self, now_millis: i64, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut candidate = now_millis.max(self.last + 1);
        let mut id = format!("{}{}", LOCAL_ID_PREFIX, candidate);
        while taken(&id) {
            candidate += 1;
            id = format!("{}{}", LOCAL_ID_PREFIX, candidate);
        }
        self.last = candidate;
        id
    }
}

// ============================================================================
// Contrôleur
// ============================================================================

/// Contrôleur de pagination du catalogue
///
/// CONCEPT RUST : Génériques avec trait bounds
/// - A : client API (HTTP en production, faux serveur dans les tests)
/// - R : couche de rendu (channel vers le TUI, enregistreur dans les tests)
pub struct PageController<A, R> {
    api: A,
    render: R,
    store: ProductStore,
    history: HistoryCache,
    selection: SelectionState,
    current_page: usize,
    page_size: usize,
    ids: IdGenerator,
}

impl<A, R> PageController<A, R>
where
    A: CatalogApi,
    R: RenderLayer,
{
    /// Crée un contrôleur vide, sur la page 1
    pub fn new(api: A, render: R, page_size: usize) -> Self {
        Self {
            api,
            render,
            store: ProductStore::new(),
            history: HistoryCache::new(),
            selection: SelectionState::new(),
            current_page: 1,
            page_size: page_size.max(1),
            ids: IdGenerator::default(),
        }
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn render_layer(&self) -> &R {
        &self.render
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.store.page_count(self.page_size)
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Charge une page puis l'affiche
    ///
    /// En cas d'échec du chargement de la liste, rien n'est modifié.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self, page: usize) -> Result<()> {
        let listing = match self.api.list_products(page, self.page_size).await {
            Ok(listing) => listing,
            Err(err) => {
                error!(page, error = %err, network = err.is_network(), "Failed to load product page");
                self.render.notify(Notice::for_load_error(&err));
                return Err(err.into());
            }
        };

        self.store.load_page(page, listing.products, listing.total_count);

        // La sélection ne référence que des produits encore chargés
        let store = &self.store;
        self.selection.retain(|id| store.contains(id));

        let missing = self
            .history
            .missing(self.store.slice(page, self.page_size).iter().map(|p| p.id.as_str()));
        self.fetch_histories(missing).await;

        self.current_page = page;
        self.render_current();
        Ok(())
    }

    /// Recharge tout depuis la page 1
    pub async fn reload(&mut self) -> Result<()> {
        info!("Reloading catalog from first page");
        self.refresh(1).await
    }

    /// Se déplace de `delta` pages, sans effet hors de [1, page_count]
    ///
    /// Retourne true si une page a été chargée.
    pub async fn go_to_page(&mut self, delta: isize) -> Result<bool> {
        let target = self.current_page as isize + delta;
        let page_count = self.page_count() as isize;

        if target < 1 || target > page_count {
            debug!(current = self.current_page, delta, page_count, "Page change out of range, ignored");
            return Ok(false);
        }

        self.refresh(target as usize).await?;
        Ok(true)
    }

    pub async fn next_page(&mut self) -> Result<bool> {
        self.go_to_page(1).await
    }

    pub async fn previous_page(&mut self) -> Result<bool> {
        self.go_to_page(-1).await
    }

    /// Charge en parallèle les historiques demandés
    ///
    /// CONCEPT : Fan-out / fan-in
    /// - Toutes les requêtes partent en même temps
    /// - join_all attend qu'elles soient toutes terminées
    /// - Un échec n'empêche pas les autres, il donne un historique vide
    async fn fetch_histories(&mut self, ids: Vec<String>) {
        if ids.is_empty() {
            return;
        }
        debug!(count = ids.len(), "Fetching missing price histories");

        let api = &self.api;
        let results = join_all(ids.into_iter().map(|id| async move {
            let result = api.price_history(&id).await;
            (id, result)
        }))
        .await;

        for (id, result) in results {
            let history = match result {
                Ok(history) => history,
                Err(err) => {
                    warn!(product_id = %id, error = %err, "Price history unavailable, using empty history");
                    Vec::new()
                }
            };
            self.history.put(id, history);
        }
    }

    // ========================================================================
    // Suppression
    // ========================================================================

    /// Supprime un produit côté serveur puis localement
    ///
    /// Pas de nouvel essai en cas d'échec.
    #[instrument(skip(self))]
    pub async fn delete_one(&mut self, id: &str) -> bool {
        match self.api.delete_product(id).await {
            Ok(true) => {
                self.store.remove_by_id(id);
                self.store.decrement_total();
                self.history.forget(id);
                self.selection.remove(id);
                info!(total = self.store.total(), "Product deleted");
                true
            }
            Ok(false) => {
                warn!("Server did not confirm deletion");
                false
            }
            Err(err) => {
                error!(error = %err, "Failed to delete product");
                false
            }
        }
    }

    /// Supprime tous les produits cochés, un par un
    ///
    /// `confirmed` : réponse de l'utilisateur à la demande de confirmation.
    /// Retourne le nombre de suppressions réussies.
    pub async fn delete_selected(&mut self, confirmed: bool) -> usize {
        if self.selection.count() == 0 {
            info!("Bulk delete requested with empty selection");
            self.render.notify(Notice::NothingSelected);
            return 0;
        }

        if !confirmed {
            info!(selected = self.selection.count(), "Bulk delete not confirmed");
            return 0;
        }

        // Copie des ids : delete_one modifie la sélection pendant la boucle
        let ids: Vec<String> = self.selection.members().iter().cloned().collect();
        info!(count = ids.len(), "Deleting selected products");

        // CONCEPT : Séquentiel volontaire
        // - Une requête à la fois, le store n'est jamais muté en concurrence
        let mut deleted = 0;
        for id in &ids {
            if self.delete_one(id).await {
                deleted += 1;
            }
        }

        self.selection.cancel();
        self.current_page = 1;

        // Resynchronise total et pagination ; l'échec a déjà sa notice
        if let Err(err) = self.refresh(1).await {
            warn!(error = %err, "Refresh after bulk delete failed");
            self.render_current();
        }

        info!(deleted, requested = ids.len(), "Bulk delete finished");
        self.render.notify(Notice::Deleted(deleted));
        deleted
    }

    // ========================================================================
    // Sélection
    // ========================================================================

    pub fn toggle_selection_mode(&mut self) {
        self.selection.toggle_mode();
        debug!(active = self.selection.is_active(), "Selection mode toggled");
        self.render_current();
    }

    /// Coche ou décoche un produit chargé
    pub fn toggle_selected(&mut self, id: &str) {
        if !self.store.contains(id) {
            warn!(product_id = %id, "Ignoring selection of unknown product");
            return;
        }
        let checked = self.selection.toggle(id);
        debug!(product_id = %id, checked, selected = self.selection.count(), "Selection changed");
        self.render_current();
    }

    pub fn cancel_selection(&mut self) {
        self.selection.cancel();
        self.render_current();
    }

    /// Bouton unique de la barre d'outils
    ///
    /// En mode sélection avec des produits cochés : suppression groupée.
    /// Sinon : bascule du mode sélection.
    pub async fn selection_action(&mut self, confirmed: bool) -> usize {
        if self.selection.is_active() && self.selection.count() > 0 {
            self.delete_selected(confirmed).await
        } else {
            self.toggle_selection_mode();
            0
        }
    }

    // ========================================================================
    // Ajout
    // ========================================================================

    /// Ajoute un produit à partir d'un lien
    ///
    /// Lien vide -> ValidationError sans appel réseau. En cas de succès le
    /// produit provisoire est inséré en tête et la page 1 est affichée.
    #[instrument(skip(self))]
    pub async fn add_product(&mut self, link: &str) -> Result<()> {
        let link = link.trim();
        if link.is_empty() {
            info!("Rejected empty product link");
            self.render.notify(Notice::EmptyLink);
            return Err(CatalogError::Validation("le lien est vide".to_string()));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let store = &self.store;
        let id = self.ids.next(now, |candidate| store.contains(candidate));
        let product = Product::placeholder(id.clone(), link);

        match self.api.add_product(&product).await {
            Ok(message) => {
                info!(product_id = %id, %message, "Product added");
                self.store.insert_at_front(product);
                self.fetch_histories(vec![id]).await;
                self.store.increment_total();

                self.current_page = 1;
                self.render_current();
                self.render.notify(Notice::Added);
                Ok(())
            }
            Err(err) => {
                error!(product_id = %id, error = %err, "Failed to add product");
                self.render.notify(Notice::AddFailed);
                Err(err.into())
            }
        }
    }

    // ========================================================================
    // Rendu
    // ========================================================================

    /// Instantané de la page courante, sans appel réseau
    pub fn view(&self) -> PageView {
        let products = self.store.slice(self.current_page, self.page_size).to_vec();
        let histories = products
            .iter()
            .map(|p| (p.id.clone(), self.history.get(&p.id).to_vec()))
            .collect();

        PageView {
            page: self.current_page,
            page_count: self.page_count(),
            total: self.store.total(),
            products,
            histories,
            selection_active: self.selection.is_active(),
            selected: self.selection.members().clone(),
        }
    }

    /// Envoie la page courante à la couche de rendu
    pub fn render_current(&mut self) {
        let view = self.view();
        self.render.render_page(view);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ProductListing;
    use crate::error::TransportError;
    use crate::models::{Price, PriceHistory, PriceObservation};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    // ------------------------------------------------------------------------
    // Faux serveur en mémoire
    // ------------------------------------------------------------------------

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        List(usize, usize),
        History(String),
        Delete(String),
        Add(String),
    }

    #[derive(Default)]
    struct FakeServer {
        products: Vec<Product>,
        histories: HashMap<String, PriceHistory>,
        list_error: Option<TransportError>,
        failing_histories: HashSet<String>,
        failing_deletes: HashSet<String>,
        add_error: Option<TransportError>,
        calls: Vec<Call>,
    }

    #[derive(Clone, Default)]
    struct FakeApi {
        server: Arc<Mutex<FakeServer>>,
    }

    impl FakeApi {
        /// Serveur avec p1..=pN, chaque produit ayant deux relevés
        fn with_products(count: usize) -> Self {
            let api = FakeApi::default();
            {
                let mut server = api.server.lock().unwrap();
                for i in 1..=count {
                    let id = format!("p{}", i);
                    server.products.push(Product::new(id.clone(), format!("Bouquet {}", i)));
                    server.histories.insert(id, history(i as i64 * 100));
                }
            }
            api
        }

        fn server(&self) -> std::sync::MutexGuard<'_, FakeServer> {
            self.server.lock().unwrap()
        }

        fn calls(&self) -> Vec<Call> {
            self.server().calls.clone()
        }

        fn history_calls(&self) -> usize {
            self.calls().iter().filter(|c| matches!(c, Call::History(_))).count()
        }

        fn clear_calls(&self) {
            self.server().calls.clear();
        }
    }

    /// Deux relevés, le plus récent en premier
    fn history(latest: i64) -> PriceHistory {
        vec![
            PriceObservation::new(Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap(), Decimal::new(latest, 0)),
            PriceObservation::new(Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(), Decimal::new(latest - 10, 0)),
        ]
    }

    #[async_trait]
    impl CatalogApi for FakeApi {
        async fn list_products(&self, page: usize, per_page: usize) -> std::result::Result<ProductListing, TransportError> {
            let mut server = self.server();
            server.calls.push(Call::List(page, per_page));
            if let Some(err) = server.list_error.clone() {
                return Err(err);
            }
            let products = server
                .products
                .iter()
                .skip((page - 1) * per_page)
                .take(per_page)
                .cloned()
                .collect();
            Ok(ProductListing {
                products,
                total_count: server.products.len(),
            })
        }

        async fn price_history(&self, product_id: &str) -> std::result::Result<PriceHistory, TransportError> {
            let mut server = self.server();
            server.calls.push(Call::History(product_id.to_string()));
            if server.failing_histories.contains(product_id) {
                return Err(TransportError::Status(500));
            }
            Ok(server.histories.get(product_id).cloned().unwrap_or_default())
        }

        async fn delete_product(&self, product_id: &str) -> std::result::Result<bool, TransportError> {
            let mut server = self.server();
            server.calls.push(Call::Delete(product_id.to_string()));
            if server.failing_deletes.contains(product_id) {
                return Err(TransportError::Status(500));
            }
            server.products.retain(|p| p.id != product_id);
            server.histories.remove(product_id);
            Ok(true)
        }

        async fn add_product(&self, product: &Product) -> std::result::Result<String, TransportError> {
            let mut server = self.server();
            server.calls.push(Call::Add(product.id.clone()));
            if let Some(err) = server.add_error.clone() {
                return Err(err);
            }
            server.products.insert(0, product.clone());
            Ok(format!("Product {} added", product.id))
        }
    }

    // ------------------------------------------------------------------------
    // Couche de rendu qui enregistre tout
    // ------------------------------------------------------------------------

    #[derive(Default)]
    struct Recorder {
        pages: Vec<PageView>,
        notices: Vec<Notice>,
    }

    impl RenderLayer for Recorder {
        fn render_page(&mut self, view: PageView) {
            self.pages.push(view);
        }

        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice);
        }
    }

    fn controller(api: &FakeApi) -> PageController<FakeApi, Recorder> {
        PageController::new(api.clone(), Recorder::default(), 9)
    }

    fn page_ids(view: &PageView) -> Vec<&str> {
        view.products.iter().map(|p| p.id.as_str()).collect()
    }

    // ------------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_refresh_loads_page_and_its_histories() {
        let api = FakeApi::with_products(19);
        let mut ctl = controller(&api);

        ctl.refresh(1).await.unwrap();

        assert_eq!(ctl.page_count(), 3);
        assert_eq!(ctl.store().total(), 19);
        assert_eq!(api.calls()[0], Call::List(1, 9));
        assert_eq!(api.history_calls(), 9);

        let view = ctl.render_layer().pages.last().unwrap();
        assert_eq!(view.page, 1);
        assert_eq!(view.products.len(), 9);
        assert_eq!(view.latest_price("p1"), Price::Known(Decimal::new(100, 0)));
        assert!(ctl.render_layer().notices.is_empty());
    }

    #[tokio::test]
    async fn test_cached_histories_are_not_refetched() {
        let api = FakeApi::with_products(19);
        let mut ctl = controller(&api);

        ctl.refresh(1).await.unwrap();
        assert!(ctl.next_page().await.unwrap());
        assert_eq!(api.history_calls(), 18);

        api.clear_calls();
        assert!(ctl.previous_page().await.unwrap());
        assert_eq!(api.calls(), vec![Call::List(1, 9)]);
        assert_eq!(ctl.current_page(), 1);
    }

    #[tokio::test]
    async fn test_failed_history_degrades_to_empty() {
        let api = FakeApi::with_products(3);
        api.server().failing_histories.insert("p2".to_string());
        let mut ctl = controller(&api);

        ctl.refresh(1).await.unwrap();

        assert!(ctl.history().has("p2"));
        assert!(ctl.history().get("p2").is_empty());
        assert_eq!(ctl.history().latest_price("p2"), Price::Unknown);
        assert!(ctl.history().latest_price("p1").is_known());
        assert_eq!(ctl.render_layer().pages.last().unwrap().products.len(), 3);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_previous_state() {
        let api = FakeApi::with_products(19);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        let rendered = ctl.render_layer().pages.len();

        api.server().list_error = Some(TransportError::Network("connection refused".into()));
        let err = ctl.next_page().await.unwrap_err();

        assert!(matches!(err, CatalogError::Transport(TransportError::Network(_))));
        assert_eq!(ctl.render_layer().notices, vec![Notice::ConnectionFailed]);
        assert_eq!(ctl.current_page(), 1);
        assert_eq!(ctl.store().len(), 9);
        assert_eq!(ctl.store().total(), 19);
        assert_eq!(ctl.render_layer().pages.len(), rendered);
    }

    #[tokio::test]
    async fn test_status_failure_is_generic_notice() {
        let api = FakeApi::with_products(3);
        api.server().list_error = Some(TransportError::Status(500));
        let mut ctl = controller(&api);

        assert!(ctl.refresh(1).await.is_err());
        assert_eq!(ctl.render_layer().notices, vec![Notice::LoadFailed]);
        assert!(ctl.store().is_empty());
    }

    #[tokio::test]
    async fn test_go_to_page_out_of_range_is_noop() {
        let api = FakeApi::with_products(19);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        api.clear_calls();

        assert!(!ctl.go_to_page(-1).await.unwrap());
        assert_eq!(ctl.current_page(), 1);
        assert!(api.calls().is_empty());

        assert!(ctl.go_to_page(1).await.unwrap());
        assert!(ctl.go_to_page(1).await.unwrap());
        assert_eq!(ctl.current_page(), 3);
        api.clear_calls();

        assert!(!ctl.go_to_page(1).await.unwrap());
        assert_eq!(ctl.current_page(), 3);
        assert!(api.calls().is_empty());

        let view = ctl.render_layer().pages.last().unwrap();
        assert_eq!(view.products.len(), 1);
        assert!(!view.has_next());
    }

    #[tokio::test]
    async fn test_go_to_page_on_empty_catalog() {
        let api = FakeApi::default();
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        assert_eq!(ctl.page_count(), 0);
        assert!(!ctl.next_page().await.unwrap());
    }

    // ------------------------------------------------------------------------
    // Suppression
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_one_updates_all_state() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.toggle_selection_mode();
        ctl.toggle_selected("p2");

        assert!(ctl.delete_one("p2").await);

        assert!(!ctl.store().contains("p2"));
        assert!(!ctl.history().has("p2"));
        assert!(!ctl.selection().contains("p2"));
        assert_eq!(ctl.store().total(), 2);
    }

    #[tokio::test]
    async fn test_delete_one_failure_changes_nothing() {
        let api = FakeApi::with_products(3);
        api.server().failing_deletes.insert("p1".to_string());
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();

        assert!(!ctl.delete_one("p1").await);
        assert!(ctl.store().contains("p1"));
        assert_eq!(ctl.store().total(), 3);
        assert_eq!(api.calls().iter().filter(|c| matches!(c, Call::Delete(_))).count(), 1);
    }

    #[tokio::test]
    async fn test_delete_selected_reports_partial_success() {
        let api = FakeApi::with_products(5);
        api.server().failing_deletes.insert("p2".to_string());
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();

        ctl.toggle_selection_mode();
        ctl.toggle_selected("p1");
        ctl.toggle_selected("p2");
        api.clear_calls();

        let deleted = ctl.delete_selected(true).await;

        assert_eq!(deleted, 1);
        assert_eq!(
            api.calls()[..2],
            [Call::Delete("p1".to_string()), Call::Delete("p2".to_string())]
        );
        assert!(!ctl.store().contains("p1"));
        assert!(ctl.store().contains("p2"));
        assert_eq!(ctl.store().total(), 4);
        assert!(!ctl.selection().is_active());
        assert_eq!(ctl.selection().count(), 0);
        assert_eq!(ctl.current_page(), 1);
        assert_eq!(ctl.render_layer().notices.last(), Some(&Notice::Deleted(1)));
    }

    #[tokio::test]
    async fn test_delete_selected_resets_to_first_page() {
        let api = FakeApi::with_products(19);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.next_page().await.unwrap();

        ctl.toggle_selection_mode();
        ctl.toggle_selected("p10");
        assert_eq!(ctl.delete_selected(true).await, 1);

        assert_eq!(ctl.current_page(), 1);
        assert_eq!(ctl.store().total(), 18);
        assert_eq!(ctl.page_count(), 2);
        let view = ctl.render_layer().pages.last().unwrap();
        assert_eq!(view.page, 1);
        assert!(!view.selection_active);
    }

    #[tokio::test]
    async fn test_delete_selected_renders_local_state_when_refresh_fails() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.toggle_selection_mode();
        ctl.toggle_selected("p1");

        api.server().list_error = Some(TransportError::Network("connection refused".into()));
        assert_eq!(ctl.delete_selected(true).await, 1);

        let view = ctl.render_layer().pages.last().unwrap();
        assert_eq!(page_ids(view), vec!["p2", "p3"]);
        assert!(!view.selection_active);
        assert!(view.selected.is_empty());
        assert_eq!(view.total, 2);
        assert_eq!(
            ctl.render_layer().notices,
            vec![Notice::ConnectionFailed, Notice::Deleted(1)]
        );
    }

    #[tokio::test]
    async fn test_reload_prunes_selection_of_vanished_products() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.toggle_selection_mode();
        ctl.toggle_selected("p1");
        ctl.toggle_selected("p2");

        // Supprimé côté serveur par un autre client
        api.server().products.retain(|p| p.id != "p1");
        ctl.reload().await.unwrap();

        assert!(!ctl.selection().contains("p1"));
        assert!(ctl.selection().contains("p2"));
        assert!(ctl.selection().is_active());
        let view = ctl.render_layer().pages.last().unwrap();
        assert_eq!(view.selected.iter().map(String::as_str).collect::<Vec<_>>(), vec!["p2"]);
        assert_eq!(page_ids(view), vec!["p2", "p3"]);
    }

    #[tokio::test]
    async fn test_reload_clears_selection_when_all_checked_products_vanish() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.toggle_selection_mode();
        ctl.toggle_selected("p1");

        api.server().products.retain(|p| p.id != "p1");
        ctl.reload().await.unwrap();

        assert!(!ctl.selection().contains("p1"));
        assert!(ctl.render_layer().pages.last().unwrap().selected.is_empty());
    }

    #[tokio::test]
    async fn test_delete_selected_requires_selection_and_confirmation() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        api.clear_calls();

        assert_eq!(ctl.delete_selected(true).await, 0);
        assert_eq!(ctl.render_layer().notices, vec![Notice::NothingSelected]);

        ctl.toggle_selection_mode();
        ctl.toggle_selected("p1");
        assert_eq!(ctl.delete_selected(false).await, 0);
        assert!(ctl.selection().contains("p1"));
        assert!(ctl.store().contains("p1"));
        assert!(api.calls().is_empty());
    }

    // ------------------------------------------------------------------------
    // Sélection
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_selection_action_toggles_or_deletes() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();

        assert_eq!(ctl.selection_action(false).await, 0);
        assert!(ctl.selection().is_active());

        ctl.toggle_selected("p3");
        assert!(ctl.render_layer().pages.last().unwrap().is_selected("p3"));
        assert_eq!(ctl.selection_action(true).await, 1);
        assert!(!ctl.store().contains("p3"));

        // Mode actif sans sélection : simple bascule
        ctl.toggle_selection_mode();
        assert_eq!(ctl.selection_action(true).await, 0);
        assert!(!ctl.selection().is_active());
    }

    #[tokio::test]
    async fn test_toggle_selected_ignores_unknown_ids() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.toggle_selection_mode();

        ctl.toggle_selected("absent");
        assert_eq!(ctl.selection().count(), 0);

        ctl.toggle_selected("p1");
        ctl.cancel_selection();
        assert!(!ctl.selection().is_active());
        assert_eq!(ctl.selection().count(), 0);
    }

    // ------------------------------------------------------------------------
    // Ajout
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_empty_link_makes_no_call() {
        let api = FakeApi::with_products(3);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        api.clear_calls();

        for link in ["", "   "] {
            let err = ctl.add_product(link).await.unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)));
        }

        assert!(api.calls().is_empty());
        assert_eq!(ctl.store().len(), 3);
        assert_eq!(ctl.store().total(), 3);
        assert_eq!(ctl.render_layer().notices, vec![Notice::EmptyLink, Notice::EmptyLink]);
    }

    #[tokio::test]
    async fn test_add_product_inserts_at_front() {
        let api = FakeApi::with_products(19);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.next_page().await.unwrap();
        api.clear_calls();

        ctl.add_product("  https://shop.example/rose  ").await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        let Call::Add(id) = &calls[0] else { panic!("expected add call, got {:?}", calls[0]) };
        assert!(id.starts_with("product-"));
        assert_eq!(calls[1], Call::History(id.clone()));

        assert_eq!(ctl.store().total(), 20);
        assert_eq!(ctl.current_page(), 1);
        assert!(ctl.history().has(id));

        let view = ctl.render_layer().pages.last().unwrap();
        assert_eq!(view.products[0].id, *id);
        assert_eq!(view.products[0].image(), "https://shop.example/rose");
        assert_eq!(view.products.len(), 9);
        assert_eq!(ctl.render_layer().notices, vec![Notice::Added]);
    }

    #[tokio::test]
    async fn test_add_failure_leaves_state_unchanged() {
        let api = FakeApi::with_products(3);
        api.server().add_error = Some(TransportError::Status(500));
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();

        assert!(ctl.add_product("https://shop.example/rose").await.is_err());

        assert_eq!(ctl.store().len(), 3);
        assert_eq!(ctl.store().total(), 3);
        assert_eq!(api.history_calls(), 3);
        assert_eq!(ctl.render_layer().notices, vec![Notice::AddFailed]);
    }

    #[tokio::test]
    async fn test_reload_replaces_store() {
        let api = FakeApi::with_products(19);
        let mut ctl = controller(&api);
        ctl.refresh(1).await.unwrap();
        ctl.next_page().await.unwrap();
        assert_eq!(ctl.store().len(), 18);

        ctl.reload().await.unwrap();
        assert_eq!(ctl.store().len(), 9);
        assert_eq!(ctl.current_page(), 1);
    }

    // ------------------------------------------------------------------------
    // Ids locaux
    // ------------------------------------------------------------------------

    #[test]
    fn test_generated_ids_never_repeat() {
        let mut ids = IdGenerator::default();
        let first = ids.next(1_000, |_| false);
        let second = ids.next(1_000, |_| false);
        let third = ids.next(500, |_| false);
        assert_eq!(first, "product-1000");
        assert_eq!(second, "product-1001");
        assert_eq!(third, "product-1002");
    }

    #[test]
    fn test_generated_ids_skip_taken() {
        let mut ids = IdGenerator::default();
        let id = ids.next(2_000, |candidate| candidate == "product-2000" || candidate == "product-2001");
        assert_eq!(id, "product-2002");
    }
}
