// ============================================================================
// DetailView - Fiche d'une crypto
// ============================================================================
// Métadonnées (/v1/coins/{id}) + cotation (/v1/tickers/{id}), puis la barre
// d'onglets et le panneau de l'onglet actif.
//
// - Tant que l'une des deux ressources charge : placeholder seul
// - Si l'une a échoué sans données : message d'erreur + retry
// - Sinon : résumé, description, offre, onglets, panneau
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::{CoinInfo, CoinMarket};
use crate::query::QueryState;
use crate::router::Tab;
use crate::theme::Palette;
use crate::ui::screen::{error_lines, render_message};
use crate::ui::{chart_panel, price_panel};

pub fn render(frame: &mut Frame, app: &App, coin_id: &str, tab: Option<Tab>, palette: &Palette, area: Rect) {
    let title = format!(" {} ", coin_id);

    let (info, market) = match (app.data.info_state(coin_id), app.data.market_state(coin_id)) {
        (Some(info), Some(market)) if !info.is_loading && !market.is_loading => (info, market),
        _ => {
            render_message(frame, area, palette, &title, vec![Line::from("Loading...")]);
            return;
        }
    };

    if let Some(message) = failure(&info).or_else(|| failure(&market)) {
        render_message(frame, area, palette, &title, error_lines(&message, palette));
        return;
    }

    let (Some(coin), Some(ticker)) = (info.data.as_ref(), market.data.as_ref()) else {
        return;
    };

    // Une erreur de rafraîchissement avec des données encore affichables
    let stale = info.is_error() || market.is_error();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(content_title(coin_id, &market, stale));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Résumé
            Constraint::Length(5), // Description + caractéristiques
            Constraint::Length(1), // Offre
            Constraint::Length(1), // Onglets
            Constraint::Min(0),    // Panneau
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(summary_line(coin, ticker, palette)), chunks[0]);
    frame.render_widget(
        Paragraph::new(description_lines(coin, palette)).wrap(Wrap { trim: true }),
        chunks[1],
    );
    frame.render_widget(Paragraph::new(supply_line(ticker, palette)), chunks[2]);
    frame.render_widget(Paragraph::new(tab_bar(tab, palette)), chunks[3]);

    // CONCEPT RUST : match exhaustif sur l'onglet
    match tab {
        Some(Tab::Price) => price_panel::render(frame, app, coin_id, ticker, palette, chunks[4]),
        Some(Tab::Chart) => chart_panel::render(frame, app, coin_id, palette, chunks[4]),
        None => {}
    }
}

/// " btc-bitcoin · updated 14:03:27 UTC ", avec l'alerte si le dernier
/// rafraîchissement a échoué
fn content_title(coin_id: &str, market: &QueryState<CoinMarket>, stale: bool) -> String {
    let mut title = format!(" {}", coin_id);
    if let Some(updated_at) = market.updated_at {
        title.push_str(&format!(" · updated {}", updated_at.format("%H:%M:%S UTC")));
    }
    if stale {
        title.push_str(" ⚠ refresh failed");
    }
    title.push(' ');
    title
}

/// Message d'erreur si la ressource a échoué sans rien à afficher
fn failure<T>(state: &QueryState<T>) -> Option<String> {
    if state.is_failed() {
        state.error.clone()
    } else {
        None
    }
}

/// "Rank: 1   Symbol: $BTC   Price: $43251"
fn summary_line(coin: &CoinInfo, ticker: &CoinMarket, palette: &Palette) -> Line<'static> {
    let label = Style::default().fg(palette.muted);
    let value = Style::default().fg(palette.text).add_modifier(Modifier::BOLD);

    Line::from(vec![
        Span::styled(" Rank: ", label),
        Span::styled(coin.rank.to_string(), value),
        Span::styled("   Symbol: ", label),
        Span::styled(coin.display_symbol(), value),
        Span::styled("   Price: ", label),
        Span::styled(format!("${:.0}", ticker.price()), value),
    ])
}

fn description_lines(coin: &CoinInfo, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(" {}", coin.description_text()),
        Style::default().fg(palette.text),
    ))];

    let flags = coin.technical_flags();
    if !flags.is_empty() {
        let text = flags
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("  ·  ");
        lines.push(Line::from(Span::styled(format!(" {}", text), Style::default().fg(palette.muted))));
    }

    lines
}

fn supply_line(ticker: &CoinMarket, palette: &Palette) -> Line<'static> {
    let label = Style::default().fg(palette.muted);
    let value = Style::default().fg(palette.text);

    Line::from(vec![
        Span::styled(" Total Supply: ", label),
        Span::styled(format!("{:.0}", ticker.total_supply), value),
        Span::styled("   Max Supply: ", label),
        Span::styled(format!("{:.0}", ticker.max_supply), value),
    ])
}

/// Onglets dans l'ordre d'affichage, l'actif en violet
fn tab_bar(active: Option<Tab>, palette: &Palette) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];

    for tab in Tab::all() {
        let (key, name) = match tab {
            Tab::Chart => ("c", "Chart"),
            Tab::Price => ("p", "Price"),
        };

        let style = if Some(tab) == active {
            Style::default().fg(palette.active_tab).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(palette.muted)
        };

        spans.push(Span::styled(format!("[{}] {}", key, name), style));
        spans.push(Span::raw("   "));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn market_state(updated_at: Option<chrono::DateTime<Utc>>) -> QueryState<CoinMarket> {
        QueryState {
            is_loading: false,
            data: None,
            error: None,
            updated_at,
        }
    }

    #[test]
    fn test_content_title_shows_last_refresh() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 3).unwrap();
        assert_eq!(
            content_title("btc-bitcoin", &market_state(Some(at)), false),
            " btc-bitcoin · updated 09:05:03 UTC "
        );
        assert_eq!(
            content_title("btc-bitcoin", &market_state(Some(at)), true),
            " btc-bitcoin · updated 09:05:03 UTC ⚠ refresh failed "
        );
    }

    #[test]
    fn test_content_title_without_refresh_time() {
        assert_eq!(content_title("btc-bitcoin", &market_state(None), false), " btc-bitcoin ");
    }
}
