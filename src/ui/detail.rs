// ============================================================================
// Vue détail d'un produit
// ============================================================================
// Popup centré par-dessus la grille : nom, image, derniers prix et
// graphique détaillé de l'historique
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::catalog::ProductDetails;
use crate::models::Price;
use crate::ui::chart::{self, ChartSpec};

/// Dessine la vue détail dans un popup de 80% de `area`
pub fn render_detail(frame: &mut Frame, details: &ProductDetails, area: Rect) {
    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", details.product.name()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(inner);

    let label = Style::default().fg(Color::Gray);
    let lines = vec![
        Line::from(vec![
            Span::styled("Image : ", label),
            Span::styled(details.product.image(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Prix actuel : ", label),
            Span::styled(
                price_label(details.latest),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Prix précédent : ", label),
            Span::styled(price_label(details.previous), Style::default().fg(Color::White)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), parts[0]);

    let spec = ChartSpec::from_request(&details.chart_request());
    let chart_block = Block::default()
        .borders(Borders::TOP)
        .title(" Historique des prix ");
    chart::render_chart(frame, parts[1], &spec, chart_block);
}

/// Prix suivi de la devise, ou "---"
pub fn price_label(price: Price) -> String {
    match price {
        Price::Known(_) => format!("{} UAH", price),
        Price::Unknown => price.to_string(),
    }
}

/// Rectangle centré occupant un pourcentage de `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
