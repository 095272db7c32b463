// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine la grille des produits de la page courante
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage en lignes puis en colonnes (grille de cartes)
// 3. Block::inner : zone utile d'une carte, sous ses bordures
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen, GRID_COLUMNS};
use crate::catalog::{ChartRequest, Notice};
use crate::models::{Price, Product};
use crate::ui::chart::{self, ChartSpec};
use crate::ui::detail;

/// Longueur max d'un nom dans le titre d'une carte
const CARD_NAME_CHARS: usize = 28;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - La vue détail se dessine par-dessus la grille
/// - Le mode saisie garde la grille et remplace le footer
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, chunks[0]);
    render_grid(frame, app, chunks[1]);

    match app.current_screen {
        Screen::Grid => render_footer(frame, app, chunks[2]),
        Screen::AddLink => render_input_footer(frame, app, chunks[2]),
        Screen::Detail => {
            render_footer(frame, app, chunks[2]);
            if let Some(details) = &app.detail {
                detail::render_detail(frame, details, size);
            }
        }
    }
}

/// Header, grille, footer (statut + raccourcis)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Grille
            Constraint::Length(4), // Footer : statut + raccourcis
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : titre et pagination
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" PricePulse ")
        .title_alignment(Alignment::Center);

    let arrow_style = |enabled: bool| {
        if enabled {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let line = Line::from(vec![
        Span::styled("◀ ", arrow_style(app.view.has_previous())),
        Span::styled(
            pagination_label(app.view.page, app.view.page_count),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▶", arrow_style(app.view.has_next())),
        Span::styled(
            format!("   {} produit(s)", app.view.total),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// "Page X / Y", avec au moins une page affichée
pub fn pagination_label(page: usize, page_count: usize) -> String {
    format!("Page {} / {}", page.max(1), page_count.max(1))
}

// ============================================================================
// Grille de cartes
// ============================================================================

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    if app.view.products.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let message = if app.is_loading_data() {
            "Chargement..."
        } else {
            "Aucun produit"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let requests = app.view.chart_requests();
    let rows = grid_rows(app.view.products.len());
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row_index, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(*row_area);

        for (column, cell) in cells.iter().enumerate() {
            let index = row_index * GRID_COLUMNS + column;
            if let (Some(product), Some(request)) = (app.view.products.get(index), requests.get(index)) {
                render_card(frame, app, product, request, index == app.focus, *cell);
            }
        }
    }
}

/// Nombre de lignes de la grille pour `count` cartes
pub fn grid_rows(count: usize) -> usize {
    count.div_ceil(GRID_COLUMNS).max(1)
}

fn render_card(
    frame: &mut Frame,
    app: &App,
    product: &Product,
    request: &ChartRequest,
    focused: bool,
    area: Rect,
) {
    let checkbox = app
        .selection_active()
        .then(|| app.view.is_selected(&product.id));

    let border_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if checkbox == Some(true) {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(card_title(product, checkbox));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let price = app.view.latest_price(&product.id);
    let price_style = if price.is_known() {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(price_line(price), price_style)),
        parts[0],
    );

    chart::render_chart(frame, parts[1], &ChartSpec::from_request(request), Block::default());
}

/// Titre d'une carte, avec la case à cocher en mode sélection
pub fn card_title(product: &Product, checkbox: Option<bool>) -> String {
    let name = product.short_name(CARD_NAME_CHARS);
    match checkbox {
        Some(true) => format!(" [x] {} ", name),
        Some(false) => format!(" [ ] {} ", name),
        None => format!(" {} ", name),
    }
}

/// Ligne de prix d'une carte
pub fn price_line(price: Price) -> String {
    match price {
        Price::Known(_) => format!("Prix actuel : {} UAH", price),
        Price::Unknown => format!("Prix actuel : {}", price),
    }
}

// ============================================================================
// Footer : statut et raccourcis
// ============================================================================

fn key_style(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn warning_line(key: &str, message: String) -> Line<'static> {
    Line::from(vec![
        Span::styled("⚠  Appuyez sur ", key_style(Color::Yellow)),
        Span::styled(
            key.to_string(),
            key_style(Color::Red).add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(message, key_style(Color::Yellow)),
    ])
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_delete_confirmation() {
        warning_line(
            "[d]",
            format!(
                " à nouveau pour supprimer {} produit(s), ou autre touche pour annuler ⚠",
                app.selected_count()
            ),
        )
    } else if app.is_awaiting_quit_confirmation() {
        warning_line(
            "[q]",
            " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠".to_string(),
        )
    } else if app.is_on_detail() {
        Line::from(vec![
            Span::styled("[Esc]", key_style(Color::Yellow)),
            Span::raw(" Fermer  "),
            Span::styled("[q]", key_style(Color::Yellow)),
            Span::raw(" Quitter"),
        ])
    } else if app.selection_active() {
        Line::from(vec![
            Span::styled("[Espace]", key_style(Color::Yellow)),
            Span::raw(" Cocher  "),
            Span::styled("[s]", key_style(Color::Red)),
            Span::raw(format!(" Supprimer ({})  ", app.selected_count())),
            Span::styled("[Esc]", key_style(Color::Yellow)),
            Span::raw(" Annuler"),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key_style(Color::Yellow)),
            Span::raw(" Quitter  "),
            Span::styled("[↑↓←→]", key_style(Color::Yellow)),
            Span::raw(" Naviguer  "),
            Span::styled("[PgUp/PgDn]", key_style(Color::Yellow)),
            Span::raw(" Pages  "),
            Span::styled("[Enter]", key_style(Color::Yellow)),
            Span::raw(" Détails  "),
            Span::styled("[a]", key_style(Color::Green)),
            Span::raw(" Ajouter  "),
            Span::styled("[s]", key_style(Color::Magenta)),
            Span::raw(" Sélectionner  "),
            Span::styled("[r]", key_style(Color::Yellow)),
            Span::raw(" Recharger"),
        ])
    };

    let paragraph = Paragraph::new(vec![status_line(app), shortcuts])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Chargement en cours, sinon dernier message
fn status_line(app: &App) -> Line<'static> {
    if app.is_loading_data() {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement...".to_string());
        return Line::from(Span::styled(message, Style::default().fg(Color::Yellow)));
    }

    match &app.notice {
        Some(notice) => Line::from(Span::styled(notice.to_string(), notice_style(notice))),
        None => Line::from(""),
    }
}

fn notice_style(notice: &Notice) -> Style {
    if notice.is_error() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    }
}

/// Footer en mode saisie : prompt, buffer et curseur
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let mut help_line = Line::from(vec![
        Span::styled("[Enter]", key_style(Color::Green)),
        Span::raw(" Ajouter  "),
        Span::styled("[Esc]", key_style(Color::Red)),
        Span::raw(" Annuler   "),
    ]);
    // Chargement ou résultat du dernier envoi
    help_line.spans.extend(status_line(app).spans);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
