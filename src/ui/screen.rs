// ============================================================================
// Screen - Cadre commun et routage du rendu
// ============================================================================
// Header (accueil + bascule de thème), contenu selon la route, footer
// (raccourcis ou confirmation de quit)
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Style : les couleurs viennent de la palette du thème, jamais en dur
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::router::Route;
use crate::theme::Palette;
use crate::ui::{detail_view, list_view};

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit que chaque écran est géré
pub fn render(frame: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    let size = frame.size();

    // Fond de l'écran dans la couleur du thème
    frame.render_widget(Block::default().style(palette.base()), size);

    let chunks = create_layout(size);
    render_header(frame, app, &palette, chunks[0]);

    match &app.route {
        Route::List => list_view::render(frame, app, &palette, chunks[1]),
        Route::Detail { coin_id, tab } => detail_view::render(frame, app, coin_id, *tab, &palette, chunks[1]),
    }

    render_footer(frame, app, &palette, chunks[2]);
}

/// Header, contenu, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

/// Libellé de la bascule : le mode vers lequel 't' bascule
pub fn theme_toggle_label(is_dark: bool) -> &'static str {
    if is_dark {
        "Light Mode"
    } else {
        "Dark Mode"
    }
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" LazyCoin ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);

    let home_style = if app.is_on_list() {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.text)
    };

    let left = Line::from(vec![
        Span::styled(" Home", home_style),
        Span::styled(format!("  {}", app.route), Style::default().fg(palette.muted)),
    ]);
    frame.render_widget(Paragraph::new(left), halves[0]);

    let right = Line::from(vec![
        Span::styled("[t] ", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::styled(theme_toggle_label(app.theme.get()), Style::default().fg(palette.text)),
        Span::raw(" "),
    ]);
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), halves[1]);
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let key = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        // CONCEPT : Style avec BLINK pour attirer l'attention
        Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(palette.rise).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(palette.rise)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(palette.rise).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.is_on_list() {
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[↑↓ / j k]", key),
            Span::raw(" Navigate  "),
            Span::styled("[Enter]", key),
            Span::raw(" Open  "),
            Span::styled("[r]", key),
            Span::raw(" Retry"),
        ])
    } else {
        Line::from(vec![
            Span::styled("[Esc]", key),
            Span::raw(" Back  "),
            Span::styled("[c/p/Tab]", key),
            Span::raw(" Tabs  "),
            Span::styled("[← →]", key),
            Span::raw(" Cursor  "),
            Span::styled("[r]", key),
            Span::raw(" Retry  "),
            Span::styled("[q]", key),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Message centré dans un bloc (chargement, erreur, absence de données)
pub fn render_message(frame: &mut Frame, area: Rect, palette: &Palette, title: &str, lines: Vec<Line<'static>>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted))
        .title(title.to_string());

    let mut text = vec![Line::from("")];
    text.extend(lines);

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Lignes d'erreur avec l'invite de retry
pub fn error_lines(message: &str, palette: &Palette) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(palette.rise))),
        Line::from(""),
        Line::from(Span::styled("[r] Retry", Style::default().fg(palette.muted))),
    ]
}

// ============================================================================
// Tests : rendu dans un TestBackend
// ============================================================================
