// ============================================================================
// Chart - Graphiques ligne des historiques de prix
// ============================================================================
// Deux densités pour les mêmes données :
// - compact (cartes de la grille) : ligne fine, pas d'axes
// - emphasized (vue détail) : ligne épaisse, points, axes, fond teinté
//   (rouge après une hausse, vert sinon)
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::catalog::ChartRequest;

/// Sens de la dernière variation de prix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

/// Graphique prêt à dessiner, construit depuis une ChartRequest
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Points (index, prix), par date croissante
    pub points: Vec<(f64, f64)>,

    /// Dates des points (YYYY-MM-DD), même ordre
    pub dates: Vec<String>,

    /// Dernière variation
    pub trend: Trend,

    /// Vue détail (dense) ou carte (compacte)
    pub emphasized: bool,
}

impl ChartSpec {
    /// Trie l'historique par date croissante et calcule la tendance
    ///
    /// CONCEPT RUST : sort_by_key stable
    /// - Deux relevés à la même date gardent l'ordre du serveur
    pub fn from_request(request: &ChartRequest) -> Self {
        let mut history = request.history.clone();
        history.sort_by_key(|o| o.date);

        let points: Vec<(f64, f64)> = history
            .iter()
            .enumerate()
            .map(|(i, o)| (i as f64, o.price.to_f64().unwrap_or(0.0)))
            .collect();
        let dates = history.iter().map(|o| o.date.format("%Y-%m-%d").to_string()).collect();

        let trend = match history.as_slice() {
            [.., before, last] if last.price > before.price => Trend::Rising,
            [.., before, last] if last.price < before.price => Trend::Falling,
            _ => Trend::Flat,
        };

        Self {
            points,
            dates,
            trend,
            emphasized: request.emphasized,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Hausse en rouge, baisse en vert, stable en bleu
    pub fn line_color(&self) -> Color {
        match self.trend {
            Trend::Rising => Color::Red,
            Trend::Falling => Color::Green,
            Trend::Flat => Color::Blue,
        }
    }

    /// Block : ligne épaisse, Braille : ligne fine
    pub fn line_marker(&self) -> symbols::Marker {
        if self.emphasized {
            symbols::Marker::Block
        } else {
            symbols::Marker::Braille
        }
    }

    /// Points marqués : toujours pour un relevé unique, sinon en vue détail
    pub fn shows_points(&self) -> bool {
        self.points.len() == 1 || self.emphasized
    }

    pub fn shows_axes(&self) -> bool {
        self.emphasized
    }

    /// Fond teinté en vue détail : rouge après une hausse, vert sinon
    ///
    /// Un relevé unique n'a pas de variation, donc pas de fond.
    pub fn fill_color(&self) -> Option<Color> {
        if !self.emphasized || self.points.len() < 2 {
            return None;
        }
        match self.trend {
            Trend::Rising => Some(Color::Rgb(48, 0, 0)),
            Trend::Falling | Trend::Flat => Some(Color::Rgb(0, 40, 0)),
        }
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.points.len().saturating_sub(1)).max(1) as f64]
    }

    /// Bornes Y avec une marge de 5% pour que le graphique respire
    pub fn y_bounds(&self) -> [f64; 2] {
        let (min_price, max_price) = self
            .points
            .iter()
            .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| (min.min(y), max.max(y)));

        if self.points.is_empty() {
            return [0.0, 1.0];
        }

        // Prix constant : marge autour de la valeur
        let margin = if max_price > min_price {
            (max_price - min_price) * 0.05
        } else {
            (max_price.abs() * 0.05).max(1.0)
        };
        [(min_price - margin).max(0.0), max_price + margin]
    }
}

/// Dessine un graphique dans le block fourni
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, block: Block) {
    if spec.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Pas d'historique",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let color = spec.line_color();
    let mut datasets = Vec::new();

    if spec.points.len() > 1 {
        datasets.push(
            Dataset::default()
                .marker(spec.line_marker())
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(&spec.points),
        );
    }

    if spec.shows_points() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::White))
                .data(&spec.points),
        );
    }

    let [y_min, y_max] = spec.y_bounds();
    let mut x_axis = Axis::default().bounds(spec.x_bounds());
    let mut y_axis = Axis::default().bounds([y_min, y_max]);

    if spec.shows_axes() {
        let first = spec.dates.first().cloned().unwrap_or_default();
        let last = spec.dates.last().cloned().unwrap_or_default();
        x_axis = x_axis
            .title("Date")
            .style(Style::default().fg(Color::Gray))
            .labels(vec![Span::raw(first), Span::raw(last)]);
        y_axis = y_axis
            .title("Prix (UAH)")
            .style(Style::default().fg(Color::Gray))
            .labels(vec![
                Span::raw(format!("{:.0}", y_min)),
                Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
                Span::raw(format!("{:.0}", y_max)),
            ]);
    }

    let mut chart = Chart::new(datasets).block(block).x_axis(x_axis).y_axis(y_axis);
    if let Some(fill) = spec.fill_color() {
        chart = chart.style(Style::default().bg(fill));
    }

    frame.render_widget(chart, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceObservation;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn request(prices_newest_first: &[i64], emphasized: bool) -> ChartRequest {
        let count = prices_newest_first.len() as u32;
        let history = prices_newest_first
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                PriceObservation::new(
                    Utc.with_ymd_and_hms(2025, 3, count - i as u32, 0, 0, 0).unwrap(),
                    Decimal::new(price, 0),
                )
            })
            .collect();
        ChartRequest {
            container_id: "chart-p1".to_string(),
            history,
            emphasized,
        }
    }

    #[test]
    fn test_points_sorted_by_date() {
        let spec = ChartSpec::from_request(&request(&[300, 200, 100], false));
        assert_eq!(spec.points, vec![(0.0, 100.0), (1.0, 200.0), (2.0, 300.0)]);
        assert_eq!(spec.dates, vec!["2025-03-01", "2025-03-02", "2025-03-03"]);
    }

    #[test]
    fn test_trend_follows_last_change() {
        assert_eq!(ChartSpec::from_request(&request(&[300, 200], false)).trend, Trend::Rising);
        assert_eq!(ChartSpec::from_request(&request(&[100, 200], false)).trend, Trend::Falling);
        assert_eq!(ChartSpec::from_request(&request(&[200, 200], false)).trend, Trend::Flat);
        assert_eq!(ChartSpec::from_request(&request(&[200], false)).trend, Trend::Flat);
        assert_eq!(ChartSpec::from_request(&request(&[300, 200], false)).line_color(), Color::Red);
    }

    #[test]
    fn test_emphasis_changes_density_not_data() {
        let compact = ChartSpec::from_request(&request(&[300, 200, 100], false));
        let detailed = ChartSpec::from_request(&request(&[300, 200, 100], true));

        assert_eq!(compact.points, detailed.points);
        assert!(!compact.shows_axes());
        assert!(detailed.shows_axes());
        assert!(!compact.shows_points());
        assert!(detailed.shows_points());
        assert_eq!(compact.fill_color(), None);
        assert!(detailed.fill_color().is_some());
    }

    #[test]
    fn test_detail_fill_is_green_unless_rising() {
        let rising = ChartSpec::from_request(&request(&[300, 200], true));
        let falling = ChartSpec::from_request(&request(&[100, 200], true));
        let flat = ChartSpec::from_request(&request(&[200, 200], true));
        let single = ChartSpec::from_request(&request(&[200], true));

        assert_eq!(rising.fill_color(), Some(Color::Rgb(48, 0, 0)));
        assert_eq!(falling.fill_color(), Some(Color::Rgb(0, 40, 0)));
        assert_eq!(flat.fill_color(), Some(Color::Rgb(0, 40, 0)));
        assert_eq!(flat.line_color(), Color::Blue);
        assert_eq!(single.fill_color(), None);
    }

    #[test]
    fn test_single_point_is_marked() {
        let spec = ChartSpec::from_request(&request(&[250], false));
        assert!(spec.shows_points());
        assert_eq!(spec.x_bounds(), [0.0, 1.0]);
        let [low, high] = spec.y_bounds();
        assert!(low < 250.0 && high > 250.0);
    }

    #[test]
    fn test_empty_history() {
        let spec = ChartSpec::from_request(&request(&[], true));
        assert!(spec.is_empty());
        assert_eq!(spec.y_bounds(), [0.0, 1.0]);
    }
}
