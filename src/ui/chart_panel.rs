// ============================================================================
// ChartPanel - Chandeliers japonais sur deux semaines
// ============================================================================
// Rendu texte ligne par ligne de la série `CandleDatum` (un chandelier par
// jour), coloré selon le thème, avec un curseur (←/→) qui affiche la date et
// les valeurs O/H/L/C du chandelier sélectionné.
//
// ALGORITHME :
// - Rendu vertical : ligne par ligne de haut en bas
// - Pour chaque ligne, on détermine quel caractère Unicode afficher
// - Logique des 3 zones : mèche supérieure, corps, mèche inférieure
// - Seuils fractionnaires (0.25, 0.75) pour précision sub-caractère
//
// CARACTÈRES UNICODE :
// ┃ Corps plein          │ Mèche pleine
// ╻ Demi-corps (bas)     ╹ Demi-corps (haut)
// ╽ Transition top       ╿ Transition bottom
// ╷ Demi-mèche sup       ╵ Demi-mèche inf
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::window_for;
use crate::models::CandleDatum;
use crate::router::Tab;
use crate::theme::Palette;
use crate::ui::screen::{error_lines, render_message};

// ============================================================================
// Constantes
// ============================================================================

const UNICODE_VOID: char = ' ';
const UNICODE_BODY: char = '┃';
const UNICODE_HALF_BODY_BOTTOM: char = '╻';
const UNICODE_HALF_BODY_TOP: char = '╹';
const UNICODE_WICK: char = '│';
const UNICODE_TOP: char = '╽';
const UNICODE_BOTTOM: char = '╿';
const UNICODE_UPPER_WICK: char = '╷';
const UNICODE_LOWER_WICK: char = '╵';

/// Largeur de l'axe Y : "{:>9.0} │ "
const Y_AXIS_WIDTH: u16 = 12;

/// Lignes réservées sous le graphique : ticks + dates
const X_AXIS_HEIGHT: u16 = 2;

/// Largeur minimale pour dessiner le graphique
const MIN_TERMINAL_WIDTH: u16 = 60;

// ============================================================================
// Renderer
// ============================================================================

/// Renderer de chandeliers japonais en mode texte
pub struct CandlestickRenderer<'a> {
    candles: &'a [CandleDatum],
    palette: Palette,
    /// Index (dans `candles`) du chandelier sous le curseur
    cursor: Option<usize>,
    min_price: f64,
    max_price: f64,
    height: u16,
    width: u16,
}

/// Position d'un chandelier dans le graphique
///
/// CONCEPT : Single source of truth for alignment
/// - Chandeliers, ticks et dates utilisent les mêmes colonnes
#[derive(Debug, Clone, Copy, PartialEq)]
struct CandlePosition {
    column: usize,
}

impl<'a> CandlestickRenderer<'a> {
    /// `area` : zone intérieure (sans bordures) réservée au graphique
    pub fn new(candles: &'a [CandleDatum], palette: Palette, cursor: Option<usize>, area: Rect) -> Self {
        let (min_price, max_price) = Self::compute_price_bounds(candles);

        Self {
            candles,
            palette,
            cursor,
            min_price,
            max_price,
            height: area.height.saturating_sub(X_AXIS_HEIGHT),
            width: area.width.saturating_sub(Y_AXIS_WIDTH),
        }
    }

    /// Prix min et max sur tous les chandeliers, avec une marge de 2%
    fn compute_price_bounds(candles: &[CandleDatum]) -> (f64, f64) {
        let max_price = candles.iter().fold(f64::NEG_INFINITY, |max, c| max.max(c.high()));
        let min_price = candles.iter().fold(f64::INFINITY, |min, c| min.min(c.low()));

        let margin = (max_price - min_price) * 0.02;
        ((min_price - margin).max(0.0), max_price + margin)
    }

    /// Convertit un prix en coordonnée de hauteur
    fn price_to_height(&self, price: f64) -> f64 {
        if self.max_price == self.min_price {
            return self.height as f64 / 2.0;
        }

        (price - self.min_price) / (self.max_price - self.min_price) * self.height as f64
    }

    fn candle_color(&self, candle: &CandleDatum) -> Color {
        if candle.is_bullish() {
            self.palette.bullish
        } else {
            self.palette.bearish
        }
    }

    /// Glyphe du chandelier sur la ligne `y` (1 = bas du graphique)
    ///
    /// Une ligne couvre une unité de hauteur. La ligne est classée dans la
    /// mèche haute, le corps ou la mèche basse, puis la distance jusqu'au prix
    /// voisin choisit entre trait plein et demi-trait (seuils au quart).
    fn render_candle(&self, candle: &CandleDatum, y: u16) -> char {
        let row = y as f64;

        let high = self.price_to_height(candle.high());
        let low = self.price_to_height(candle.low());
        let body_top = self.price_to_height(candle.open().max(candle.close()));
        let body_bottom = self.price_to_height(candle.open().min(candle.close()));

        if row <= high.ceil() && row >= body_top.floor() {
            upper_glyph(body_top - row, high - row)
        } else if row <= body_top.floor() && row >= body_bottom.ceil() {
            UNICODE_BODY
        } else if row <= body_bottom.ceil() && row >= low.floor() {
            lower_glyph(body_bottom - row, low - row)
        } else {
            UNICODE_VOID
        }
    }

    /// Axe Y : un prix sans décimale toutes les 4 lignes
    fn render_y_axis(&self, y: u16) -> String {
        if y % 4 == 0 {
            let price = self.min_price + (y as f64 * (self.max_price - self.min_price) / self.height as f64);
            format!("{:>9.0} │ ", price)
        } else {
            format!("{:>9} │ ", "")
        }
    }

    /// Les N derniers chandeliers qui tiennent à l'écran, avec l'offset du
    /// premier visible dans la série complète
    fn visible_candles(&self) -> (usize, &'a [CandleDatum]) {
        let max_visible = self.width as usize;
        if self.candles.len() <= max_visible {
            (0, self.candles)
        } else {
            let offset = self.candles.len() - max_visible;
            (offset, &self.candles[offset..])
        }
    }

    /// Colonne de chaque chandelier
    ///
    /// CONCEPT : Accumulator pattern pour éviter le drift
    /// - Chaque position = index × spacing (pas position_précédente + spacing)
    /// - Chandelier unique : centré
    fn compute_candle_positions(chart_width: usize, num_candles: usize) -> Vec<CandlePosition> {
        if num_candles == 0 {
            return Vec::new();
        }

        if num_candles == 1 {
            return vec![CandlePosition { column: chart_width / 2 }];
        }

        let spacing = chart_width as f64 / num_candles as f64;

        (0..num_candles)
            .map(|i| CandlePosition {
                column: ((i as f64 * spacing).round() as usize).min(chart_width.saturating_sub(1)),
            })
            .collect()
    }

    /// Génère toutes les lignes du graphique (chandeliers + axe X)
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let (offset, visible) = self.visible_candles();
        if visible.is_empty() {
            return Vec::new();
        }

        let positions = Self::compute_candle_positions(self.width as usize, visible.len());
        let axis_style = Style::default().fg(self.palette.muted);
        let mut lines = Vec::with_capacity(self.height as usize + X_AXIS_HEIGHT as usize);

        // De haut en bas
        for y in (1..=self.height).rev() {
            let mut spans = vec![Span::styled(self.render_y_axis(y), axis_style)];
            let mut column = 0;

            for (i, (candle, position)) in visible.iter().zip(&positions).enumerate() {
                if position.column > column {
                    spans.push(Span::raw(" ".repeat(position.column - column)));
                }

                let mut style = Style::default().fg(self.candle_color(candle));
                if self.cursor == Some(offset + i) {
                    style = style.add_modifier(Modifier::BOLD);
                }

                spans.push(Span::styled(self.render_candle(candle, y).to_string(), style));
                column = position.column + 1;
            }

            lines.push(Line::from(spans));
        }

        lines.extend(self.render_x_axis(offset, visible, &positions));
        lines
    }

    /// Ligne de ticks (le curseur est marqué ▲) puis ligne de dates "dd/mm"
    fn render_x_axis(&self, offset: usize, visible: &[CandleDatum], positions: &[CandlePosition]) -> Vec<Line<'static>> {
        let axis_style = Style::default().fg(self.palette.muted);
        let padding = " ".repeat(Y_AXIS_WIDTH as usize);

        // "dd/mm" + au moins 2 espaces entre deux labels
        let min_label_gap = 7;

        let mut tick_spans = vec![Span::raw(padding.clone())];
        let mut date_spans = vec![Span::raw(padding)];
        let mut tick_column = 0;
        let mut date_column = 0;

        for (i, (candle, position)) in visible.iter().zip(positions).enumerate() {
            if position.column > tick_column {
                tick_spans.push(Span::raw(" ".repeat(position.column - tick_column)));
            }
            let tick = if self.cursor == Some(offset + i) {
                Span::styled("▲", Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD))
            } else {
                Span::styled("│", axis_style)
            };
            tick_spans.push(tick);
            tick_column = position.column + 1;

            // Date si elle ne chevauche pas la précédente
            if position.column >= date_column {
                if let Some(time) = candle.timestamp() {
                    let label = time.format("%d/%m").to_string();
                    if position.column + label.len() <= self.width as usize {
                        if position.column > date_column {
                            date_spans.push(Span::raw(" ".repeat(position.column - date_column)));
                        }
                        date_column = position.column + min_label_gap;
                        let end = position.column + label.len();
                        date_spans.push(Span::styled(label, axis_style));
                        if date_column > end {
                            date_spans.push(Span::raw(" ".repeat(date_column - end)));
                        }
                    }
                }
            }
        }

        vec![Line::from(tick_spans), Line::from(date_spans)]
    }
}

/// Ligne entre le haut et le corps
///
/// `to_body` / `to_high` : hauteur du haut du corps / du plus haut, relative
/// au bas de la ligne
fn upper_glyph(to_body: f64, to_high: f64) -> char {
    if to_body > 0.75 {
        UNICODE_BODY
    } else if to_body > 0.25 {
        // Le corps commence au milieu de la ligne
        if to_high > 0.75 {
            UNICODE_TOP
        } else {
            UNICODE_HALF_BODY_BOTTOM
        }
    } else if to_high > 0.75 {
        UNICODE_WICK
    } else if to_high > 0.25 {
        UNICODE_UPPER_WICK
    } else {
        UNICODE_VOID
    }
}

/// Ligne entre le corps et le bas, symétrique de `upper_glyph`
fn lower_glyph(to_body: f64, to_low: f64) -> char {
    if to_body < 0.25 {
        UNICODE_BODY
    } else if to_body < 0.75 {
        if to_low < 0.25 {
            UNICODE_BOTTOM
        } else {
            UNICODE_HALF_BODY_TOP
        }
    } else if to_low < 0.25 {
        UNICODE_WICK
    } else if to_low < 0.75 {
        UNICODE_LOWER_WICK
    } else {
        UNICODE_VOID
    }
}

// ============================================================================
// Ligne du curseur (équivalent d'un tooltip)
// ============================================================================

/// "14/01/2024  O 706.00  H 711.00  L 701.00  C 707.00"
pub fn cursor_label(candle: &CandleDatum) -> String {
    let date = candle
        .timestamp()
        .map(|t| t.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "?".to_string());

    format!(
        "{}  O {:.2}  H {:.2}  L {:.2}  C {:.2}",
        date,
        candle.open(),
        candle.high(),
        candle.low(),
        candle.close()
    )
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

pub fn render(frame: &mut Frame, app: &App, coin_id: &str, palette: &Palette, area: Rect) {
    let title = " Chart (2 weeks) ";

    let state = match app.data.ohlcv_state(coin_id, window_for(Tab::Chart)) {
        Some(state) if !state.is_loading => state,
        _ => {
            render_message(frame, area, palette, title, vec![Line::from("Loading chart...")]);
            return;
        }
    };

    if state.is_failed() {
        let message = state.error.as_deref().unwrap_or("unknown error");
        render_message(frame, area, palette, title, error_lines(message, palette));
        return;
    }

    let candles = app.chart_candles();
    if candles.is_empty() {
        render_message(
            frame,
            area,
            palette,
            title,
            vec![Line::from(Span::styled("Insufficient data", Style::default().fg(palette.muted)))],
        );
        return;
    }

    // CONCEPT : Graceful degradation pour terminaux étroits
    if area.width < MIN_TERMINAL_WIDTH {
        render_message(
            frame,
            area,
            palette,
            " ⚠ Terminal too narrow ",
            vec![
                Line::from("Terminal too narrow for the chart"),
                Line::from(format!("Minimum width: {} columns", MIN_TERMINAL_WIDTH)),
            ],
        );
        return;
    }

    let mut panel_title = format!(" Chart (2 weeks, {} candles)", candles.len());
    if state.is_error() {
        panel_title.push_str(" ⚠ refresh failed");
    }
    panel_title.push(' ');

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(panel_title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let cursor = app.cursor_index(candles.len());
    if let Some(candle) = cursor.and_then(|i| candles.get(i)) {
        let line = Line::from(Span::styled(
            format!(" {}", cursor_label(candle)),
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), chunks[0]);
    }

    let renderer = CandlestickRenderer::new(&candles, *palette, cursor, chunks[1]);
    frame.render_widget(Paragraph::new(renderer.render_lines()), chunks[1]);
}

// ============================================================================
// Tests unitaires
// ============================================================================
