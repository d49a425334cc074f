// ============================================================================
// PricePanel - Extrêmes sur un an + variations récentes
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::window_for;
use crate::models::{format_change, price_extremes, CoinMarket, DayPrice};
use crate::router::Tab;
use crate::theme::Palette;
use crate::ui::screen::{error_lines, render_message};

pub fn render(frame: &mut Frame, app: &App, coin_id: &str, ticker: &CoinMarket, palette: &Palette, area: Rect) {
    let title = " Price (1 year) ";

    let state = match app.data.ohlcv_state(coin_id, window_for(Tab::Price)) {
        Some(state) if !state.is_loading => state,
        _ => {
            render_message(frame, area, palette, title, vec![Line::from("Loading price history...")]);
            return;
        }
    };

    if state.is_failed() {
        let message = state.error.as_deref().unwrap_or("unknown error");
        render_message(frame, area, palette, title, error_lines(message, palette));
        return;
    }

    // Données conservées malgré l'échec du dernier rafraîchissement
    let title = if state.is_error() {
        " Price (1 year) ⚠ refresh failed "
    } else {
        title
    };

    let mut lines = vec![
        Line::from(""),
        change_line("15m change", ticker.change_15m(), palette),
        change_line("24h change", ticker.change_24h(), palette),
        Line::from(""),
    ];

    let points = state.data.unwrap_or_default();
    match price_extremes(&points) {
        Some(extremes) => {
            lines.push(day_price_line("Highest price", &extremes.highest, palette));
            lines.push(day_price_line("Lowest price ", &extremes.lowest, palette));
        }
        None => lines.push(Line::from(Span::styled(
            " No data for this period",
            Style::default().fg(palette.muted),
        ))),
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(title),
    );
    frame.render_widget(paragraph, area);
}

/// Variation colorée selon son signe
fn change_line(label: &str, change: Option<f64>, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {}: ", label), Style::default().fg(palette.muted)),
        Span::styled(
            format_change(change),
            Style::default()
                .fg(palette.change_color(change))
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

/// "Highest price: $20.00 on 2024-01-02"
fn day_price_line(label: &str, day_price: &DayPrice, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {}: ", label), Style::default().fg(palette.muted)),
        Span::styled(
            format!("${}", day_price.price_label()),
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" on ", Style::default().fg(palette.muted)),
        Span::styled(day_price.day_label(), Style::default().fg(palette.text)),
    ])
}
