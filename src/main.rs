// ============================================================================
// LazyCoin - Cryptos coinpaprika dans le terminal
// ============================================================================
// Liste des cryptos, fiche détaillée, prix sur un an et chandeliers sur deux
// semaines, rafraîchis en arrière-plan.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : le runtime tokio fait tourner le polling, l'UI reste
//    sur le thread principal et lit des instantanés du cache
// 4. RAII : changer d'écran drop les abonnements de l'ancien
// ============================================================================

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use lazycoin::api::PaprikaClient;
use lazycoin::app::App;
use lazycoin::config::Config;
use lazycoin::data::CoinData;
use lazycoin::theme::ThemeStore;
use lazycoin::ui::events::{
    is_back_event, is_cycle_tab_event, is_down_event, is_enter_event, is_left_event, is_quit_event,
    is_retry_event, is_right_event, is_theme_event, is_up_event, tab_from_event, Event,
};
use lazycoin::ui::{render, EventHandler};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans `<log_dir>/lazycoin.log.<date>` :
/// ```bash
/// tail -f ~/.local/share/lazycoin/logs/lazycoin.log.*
/// RUST_LOG=lazycoin=trace lazycoin
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "lazycoin.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true) // Les tâches de polling tournent sur les workers tokio
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycoin=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    // Si le logging échoue, on continue sans
    init_logging(&config.log_dir()).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api_url = %config.api_url, refresh_ms = config.refresh_ms, route = %config.route, "LazyCoin starting up");

    // CONCEPT RUST : Runtime tokio possédé par main
    // - Les boucles de polling sont spawn dessus via un Handle
    // - Le runtime vit jusqu'à la fin de main (drop → arrêt des tâches)
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let client = PaprikaClient::new(&config.api_url)?;
    let data = CoinData::new(Arc::new(client), config.refresh(), runtime.handle().clone());

    let mut theme = ThemeStore::new(config.dark);
    theme.subscribe(|dark| info!(dark, "Theme changed"));

    let mut app = App::new(data, theme, config.initial_route());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================
// 1. TITLE : titre de la fenêtre, seulement quand la route change
// 2. RENDER : dessine l'écran depuis les instantanés du cache
// 3. INPUT : attend une touche (250ms max)
// 4. UPDATE : tick
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App, events: &EventHandler) -> Result<()> {
    let mut window_title = String::new();

    while app.is_running() {
        let title = app.window_title();
        if title != window_title {
            execute!(terminal.backend_mut(), SetTitle(&title))?;
            window_title = title;
        }

        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => error!(error = ?e, "Failed to read terminal event"),
        }

        app.tick();
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - L'ordre des bras compte : le premier qui matche gagne
/// - Le contexte (liste / détail) restreint certaines touches
fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step quit pour éviter les sorties accidentelles
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
            return;
        }

        Event::Key(_) if is_theme_event(&event) => app.toggle_theme(),

        Event::Key(_) if is_retry_event(&event) => {
            info!(route = %app.route, "User requested retry");
            app.retry();
        }

        Event::Key(_) if is_up_event(&event) && app.is_on_list() => app.navigate_up(),
        Event::Key(_) if is_down_event(&event) && app.is_on_list() => app.navigate_down(),

        Event::Key(_) if is_enter_event(&event) && app.is_on_list() => {
            if let Some(link) = app.selected_link() {
                info!(coin = %link.id, "User opened coin");
            }
            app.open_selected();
        }

        Event::Key(_) if is_back_event(&event) && app.is_on_detail() => {
            debug!("User returned to list");
            app.back();
        }

        Event::Key(_) if is_cycle_tab_event(&event) && app.is_on_detail() => app.cycle_tab(),

        Event::Key(_) if is_left_event(&event) && app.is_on_detail() => app.cursor_left(),
        Event::Key(_) if is_right_event(&event) && app.is_on_detail() => app.cursor_right(),

        Event::Key(_) if app.is_on_detail() => {
            if let Some(tab) = tab_from_event(&event) {
                app.select_tab(tab);
            }
        }

        Event::Key(_) => {}

        Event::Tick => return,
    }

    // Toute touche autre que 'q' annule la confirmation de quit
    app.cancel_quit();
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Raw mode : pas d'écho, pas de buffering ligne par ligne
    enable_raw_mode()?;

    // Alternate screen : l'écran précédent est restauré en quittant
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    terminal.show_cursor()?;

    Ok(())
}
