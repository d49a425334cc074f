// ============================================================================
// ListView - Catalogue des cryptos
// ============================================================================
// Les 100 premières entrées du catalogue, dans l'ordre de la source.
// Chaque ligne est un lien "{name} →" vers "/{id}" (Enter pour l'ouvrir).
//
// CONCEPT RATATUI : List + ListState
// - render_stateful_widget fait défiler la liste pour garder la sélection
//   visible
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::models::CoinLink;
use crate::theme::Palette;
use crate::ui::screen::{error_lines, render_message};

pub fn render(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = match app.data.catalog_state() {
        Some(state) if !state.is_loading => state,
        _ => {
            render_message(frame, area, palette, " Coins ", vec![Line::from("Loading...")]);
            return;
        }
    };

    if state.is_failed() {
        let message = state.error.as_deref().unwrap_or("unknown error");
        render_message(frame, area, palette, " ⚠ Coins ", error_lines(message, palette));
        return;
    }

    let links = app.catalog_links();
    let items: Vec<ListItem> = links.iter().map(|link| list_row(link, palette)).collect();

    let title = format!(" Coins ({}) ", links.len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .title(title),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// " #1  BTC      Bitcoin →"
fn list_row(link: &CoinLink, palette: &Palette) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(format!(" #{:<4}", link.rank), Style::default().fg(palette.muted)),
        Span::styled(format!("{:<8} ", link.symbol), Style::default().fg(palette.text)),
        Span::styled(link.label(), Style::default().fg(palette.accent)),
    ]))
}
