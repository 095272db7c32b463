// ============================================================================
// PricePulse - Suivi des prix d'un catalogue de produits
// ============================================================================
// Programme TUI : grille paginée de produits avec leurs historiques de prix,
// vue détail, sélection multiple, suppression groupée et ajout par lien.
//
// ARCHITECTURE :
// - Thread UI : event loop, rendering, état App
// - Worker thread : runtime tokio + PageController (appels HTTP)
// - Channels mpsc : commandes vers le worker, résultats vers l'UI
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use pricepulse::api::HttpCatalogApi;
use pricepulse::app::App;
use pricepulse::catalog::{Notice, PageController, PageView, RenderLayer};
use pricepulse::config::Config;
use pricepulse::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les appels async via le PageController
// ============================================================================

#[derive(Debug, Clone)]
enum AppCommand {
    /// Recharge la page 1
    Reload,
    NextPage,
    PreviousPage,
    ToggleSelectionMode,
    ToggleSelected { id: String },
    CancelSelection,

    /// Bouton "Sélectionner / Supprimer"
    SelectionAction { confirmed: bool },

    DeleteSelected { confirmed: bool },
    AddProduct { link: String },

    /// Formulaire d'ajout fermé sans valider
    CancelAdd,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    Page(PageView),
    Notice(Notice),

    /// Le worker n'a pas pu démarrer
    WorkerFailed(String),
}

// ============================================================================
// ChannelRenderer : couche de rendu du contrôleur
// ============================================================================
// Le contrôleur vit dans le worker thread, le dessin dans le thread UI :
// chaque rendu devient un message.
// ============================================================================

struct ChannelRenderer {
    tx: mpsc::Sender<AppResult>,
}

impl RenderLayer for ChannelRenderer {
    fn render_page(&mut self, view: PageView) {
        if self.tx.send(AppResult::Page(view)).is_err() {
            debug!("UI thread gone, dropping page");
        }
    }

    fn notify(&mut self, notice: Notice) {
        if self.tx.send(AppResult::Notice(notice)).is_err() {
            debug!("UI thread gone, dropping notice");
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Logs dans un fichier à rotation quotidienne (le terminal est pris par le TUI)
///
/// Niveau via RUST_LOG, par défaut "pricepulse=debug,info".
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Échec de la création du répertoire de logs {:?}", config.log_dir))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "pricepulse.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricepulse=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du logging")?;

    info!(log_dir = ?config.log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env().context("Configuration invalide")?;

    // Le logging est optionnel : on continue sans
    if let Err(e) = init_logging(&config) {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    }

    info!(api_url = %config.api_url, page_size = config.page_size, "PricePulse starting up");

    let mut terminal = setup_terminal()?;

    let app = Arc::new(Mutex::new(App::new()));
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(config, command_rx, result_tx, app.clone());

    let events = EventHandler::new();
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }
    result
}

/// Accès à App même si un thread a paniqué en le tenant
fn with_app<T>(app: &Mutex<App>, f: impl FnOnce(&mut App) -> T) -> T {
    let mut guard = app.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

// ============================================================================
// Worker thread
// ============================================================================
// CONCEPT RUST : Runtime tokio dans un thread dédié
// - block_on exécute chaque commande jusqu'au bout
// - Les commandes sont traitées dans l'ordre d'arrivée
// ============================================================================

fn spawn_background_worker(
    config: Config,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    app: Arc<Mutex<App>>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "Failed to create tokio runtime");
                let _ = result_tx.send(AppResult::WorkerFailed(e.to_string()));
                return;
            }
        };

        let api = match HttpCatalogApi::new(config.api_url.clone(), config.request_timeout) {
            Ok(api) => api,
            Err(e) => {
                error!(error = %e, "Failed to build HTTP client");
                let _ = result_tx.send(AppResult::WorkerFailed(e.to_string()));
                return;
            }
        };

        let renderer = ChannelRenderer { tx: result_tx };
        let mut controller = PageController::new(api, renderer, config.page_size);

        with_app(&app, |a| a.start_loading(Some("Chargement des produits...".to_string())));
        if let Err(e) = runtime.block_on(controller.refresh(1)) {
            warn!(error = %e, "Initial load failed");
        }
        with_app(&app, App::stop_loading);

        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            if let Some(message) = loading_message(&command) {
                with_app(&app, |a| a.start_loading(Some(message.to_string())));
            }

            runtime.block_on(async {
                match command {
                    AppCommand::Reload | AppCommand::CancelAdd => {
                        if let Err(e) = controller.reload().await {
                            debug!(error = %e, "Reload failed");
                        }
                    }
                    AppCommand::NextPage => {
                        if let Err(e) = controller.next_page().await {
                            debug!(error = %e, "Next page failed");
                        }
                    }
                    AppCommand::PreviousPage => {
                        if let Err(e) = controller.previous_page().await {
                            debug!(error = %e, "Previous page failed");
                        }
                    }
                    AppCommand::ToggleSelectionMode => controller.toggle_selection_mode(),
                    AppCommand::ToggleSelected { id } => controller.toggle_selected(&id),
                    AppCommand::CancelSelection => controller.cancel_selection(),
                    AppCommand::SelectionAction { confirmed } => {
                        controller.selection_action(confirmed).await;
                    }
                    AppCommand::DeleteSelected { confirmed } => {
                        controller.delete_selected(confirmed).await;
                    }
                    AppCommand::AddProduct { link } => {
                        if let Err(e) = controller.add_product(&link).await {
                            debug!(error = %e, "Add product failed");
                        }
                    }
                }
            });

            with_app(&app, App::stop_loading);
        }

        info!("Worker thread exiting (channel closed)");
    });
}

/// Message de chargement des commandes qui appellent le réseau
fn loading_message(command: &AppCommand) -> Option<&'static str> {
    match command {
        AppCommand::Reload | AppCommand::CancelAdd => Some("Chargement des produits..."),
        AppCommand::NextPage | AppCommand::PreviousPage => Some("Chargement de la page..."),
        AppCommand::SelectionAction { confirmed: true } | AppCommand::DeleteSelected { confirmed: true } => {
            Some("Suppression en cours...")
        }
        AppCommand::AddProduct { .. } => Some("Ajout du produit..."),
        _ => None,
    }
}

// ============================================================================
// Terminal
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Échec de l'entrée dans l'alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Échec de la désactivation du raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)
        .context("Échec de la sortie de l'alternate screen")?;
    terminal.show_cursor().context("Échec de l'affichage du curseur")?;
    Ok(())
}

// ============================================================================
// Event loop
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    let mut worker_alive = true;

    while with_app(&app, |a| a.is_running()) {
        // Applique tous les résultats arrivés depuis le dernier tour
        loop {
            match result_rx.try_recv() {
                Ok(result) => with_app(&app, |a| apply_result(a, result)),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if worker_alive {
                        error!("Worker thread disconnected");
                        worker_alive = false;
                    }
                    break;
                }
            }
        }

        terminal.draw(|frame| with_app(&app, |a| render(frame, a)))?;

        match events.next() {
            Ok(event) => with_app(&app, |a| handle_event(a, event, &command_tx)),
            Err(e) => debug!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

fn apply_result(app: &mut App, result: AppResult) {
    match result {
        AppResult::Page(view) => {
            debug!(page = view.page, products = view.products.len(), "Page received");
            app.apply_page(view);
        }
        AppResult::Notice(notice) => {
            info!(%notice, "Notice received");
            app.apply_notice(notice);
        }
        AppResult::WorkerFailed(reason) => {
            error!(%reason, "Worker failed to start");
            app.stop_loading();
            app.set_notice(Notice::ConnectionFailed);
        }
    }
}

/// Envoie une commande au worker
fn send(command_tx: &mpsc::Sender<AppCommand>, command: AppCommand) {
    if command_tx.send(command).is_err() {
        warn!("Worker thread unavailable, command dropped");
    }
}

fn handle_event(app: &mut App, event: pricepulse::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use pricepulse::ui::events::{
        get_char_from_event, is_add_event, is_backspace_event, is_delete_event, is_down_event,
        is_enter_event, is_escape_event, is_left_event, is_link_char_event, is_next_page_event,
        is_previous_page_event, is_quit_event, is_reload_event, is_right_event, is_select_event,
        is_space_event, is_up_event, Event,
    };

    if let Event::Tick = event {
        return;
    }

    // ------------------------------------------------------------------------
    // Mode saisie : toutes les touches vont au formulaire
    // ------------------------------------------------------------------------
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            info!("User cancelled add");
            app.cancel_input();
            send(command_tx, AppCommand::CancelAdd);
        } else if is_enter_event(&event) {
            match app.submit_input() {
                Some(link) => {
                    info!(%link, "User submitted product link");
                    send(command_tx, AppCommand::AddProduct { link });
                }
                None => debug!("Add already pending, ignoring submit"),
            }
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_link_char_event(&event) {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        return;
    }

    // ------------------------------------------------------------------------
    // Confirmations two-step
    // ------------------------------------------------------------------------
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            app.cancel_delete();
            app.request_quit();
        }
        return;
    }

    if app.is_awaiting_delete_confirmation() {
        app.cancel_confirmations();
        if is_delete_event(&event) || is_select_event(&event) {
            info!(selected = app.selected_count(), "User confirmed bulk delete");
            send(command_tx, AppCommand::DeleteSelected { confirmed: true });
        } else {
            info!("User declined bulk delete");
        }
        return;
    }

    app.cancel_quit();

    // ------------------------------------------------------------------------
    // Vue détail
    // ------------------------------------------------------------------------
    if app.is_on_detail() {
        if is_escape_event(&event) || is_space_event(&event) || is_enter_event(&event) {
            debug!("User closed details");
            app.close_details();
        }
        return;
    }

    // ------------------------------------------------------------------------
    // Grille
    // ------------------------------------------------------------------------
    if is_up_event(&event) {
        app.navigate_up();
    } else if is_down_event(&event) {
        app.navigate_down();
    } else if is_left_event(&event) {
        app.navigate_left();
    } else if is_right_event(&event) {
        app.navigate_right();
    } else if is_next_page_event(&event) {
        send(command_tx, AppCommand::NextPage);
    } else if is_previous_page_event(&event) {
        send(command_tx, AppCommand::PreviousPage);
    } else if is_reload_event(&event) {
        send(command_tx, AppCommand::Reload);
    } else if is_add_event(&event) {
        app.clear_notice();
        app.start_input("Lien du produit : ".to_string());
    } else if is_select_event(&event) {
        if app.selection_active() && app.selected_count() > 0 {
            app.request_delete();
        } else {
            send(command_tx, AppCommand::SelectionAction { confirmed: false });
        }
    } else if is_delete_event(&event) {
        if app.selected_count() > 0 {
            app.request_delete();
        } else {
            send(command_tx, AppCommand::DeleteSelected { confirmed: false });
        }
    } else if is_escape_event(&event) {
        if app.selection_active() {
            send(command_tx, AppCommand::CancelSelection);
        }
    } else if is_space_event(&event) || is_enter_event(&event) {
        if app.selection_active() {
            if let Some(product) = app.focused_product() {
                send(command_tx, AppCommand::ToggleSelected { id: product.id.clone() });
            }
        } else if is_enter_event(&event) {
            if let Some(product) = app.focused_product() {
                info!(product_id = %product.id, "User opened details");
            }
            app.open_details();
        }
    }
}
