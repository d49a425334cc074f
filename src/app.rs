// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. RAII : les abonnements de l'écran courant vivent dans `mounts`
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les données distantes ne sont jamais copiées dans App : le rendu lit
//   des instantanés du cache (`CoinData`)
// ============================================================================

use tracing::{debug, info};

use crate::data::{window_for, CoinData, Mounts};
use crate::models::{catalog_links, to_candles, CandleDatum, CoinLink};
use crate::router::{Route, Tab};
use crate::theme::ThemeStore;

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' arme, la seconde quitte,
    /// toute autre touche annule
    pub confirm_quit: bool,

    /// Écran courant
    pub route: Route,

    /// Mode clair / sombre
    pub theme: ThemeStore,

    /// Caches et polling
    pub data: CoinData,

    /// Abonnements de l'écran courant
    mounts: Mounts,

    /// Index sélectionné dans la liste
    pub selected_index: usize,

    /// Chandelier sélectionné dans le graphique (None : le plus récent)
    pub chart_cursor: Option<usize>,
}

impl App {
    /// Crée l'application sur `route` et monte ses abonnements
    pub fn new(data: CoinData, theme: ThemeStore, route: Route) -> Self {
        let mounts = data.mount(&route);
        info!(%route, dark = theme.get(), "Application state created");

        Self {
            running: true,
            confirm_quit: false,
            route,
            theme,
            data,
            mounts,
            selected_index: 0,
            chart_cursor: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// Les données arrivent en arrière-plan : on garde juste la sélection
    /// dans les bornes de la liste (une fois le catalogue chargé).
    pub fn tick(&mut self) {
        if self.route == Route::List {
            let len = self.catalog_links().len();
            if len > 0 {
                self.selected_index = self.selected_index.min(len - 1);
            }
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Change d'écran
    ///
    /// CONCEPT RUST : ordre des drops
    /// - Les nouveaux abonnements sont créés AVANT que les anciens soient
    ///   drop (à l'affectation) : une ressource commune aux deux écrans garde
    ///   son cache et sa boucle
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }

        info!(from = %self.route, to = %route, "Navigating");
        let mounts = self.data.mount(&route);
        self.mounts = mounts;

        if route.coin_id() != self.route.coin_id() || route.tab() != self.route.tab() {
            self.chart_cursor = None;
        }
        self.route = route;
    }

    /// Navigue vers un chemin ("/", "/btc-bitcoin/chart", ...)
    pub fn open_path(&mut self, path: &str) {
        self.navigate(Route::parse(path));
    }

    /// Ouvre le détail de la crypto sélectionnée dans la liste
    pub fn open_selected(&mut self) {
        if self.route != Route::List {
            return;
        }
        if let Some(link) = self.selected_link() {
            self.open_path(&link.target());
        }
    }

    /// Retour à la liste (la sélection est conservée)
    pub fn back(&mut self) {
        self.navigate(Route::List);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if let Route::Detail { .. } = self.route {
            self.navigate(self.route.with_tab(tab));
        }
    }

    /// Onglet suivant ; sans onglet, ouvre le premier affiché (graphique)
    pub fn cycle_tab(&mut self) {
        let tab = match self.route.tab() {
            Some(tab) => tab.next(),
            None => Tab::all()[0],
        };
        self.select_tab(tab);
    }

    pub fn is_on_list(&self) -> bool {
        self.route == Route::List
    }

    pub fn is_on_detail(&self) -> bool {
        matches!(self.route, Route::Detail { .. })
    }

    /// Titre de la fenêtre du terminal : "Coins" ou l'id de la crypto
    pub fn window_title(&self) -> String {
        match &self.route {
            Route::List => "Coins".to_string(),
            Route::Detail { coin_id, .. } => coin_id.clone(),
        }
    }

    // ========================================================================
    // Liste
    // ========================================================================

    /// Liens de la liste (100 premiers du catalogue, vide tant qu'il charge)
    pub fn catalog_links(&self) -> Vec<CoinLink> {
        self.data
            .catalog_state()
            .and_then(|state| state.data)
            .map(|coins| catalog_links(&coins))
            .unwrap_or_default()
    }

    pub fn selected_link(&self) -> Option<CoinLink> {
        self.catalog_links().into_iter().nth(self.selected_index)
    }

    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.catalog_links().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    // ========================================================================
    // Graphique
    // ========================================================================

    /// Chandeliers du graphique courant (vide hors onglet graphique)
    pub fn chart_candles(&self) -> Vec<CandleDatum> {
        match &self.route {
            Route::Detail {
                coin_id,
                tab: Some(Tab::Chart),
            } => self
                .data
                .ohlcv_state(coin_id, window_for(Tab::Chart))
                .and_then(|state| state.data)
                .map(|points| to_candles(&points))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Index effectif du curseur pour une série de `len` chandeliers
    pub fn cursor_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.chart_cursor.unwrap_or(len - 1).min(len - 1))
    }

    pub fn cursor_left(&mut self) {
        let len = self.chart_candles().len();
        if let Some(index) = self.cursor_index(len) {
            self.chart_cursor = Some(index.saturating_sub(1));
        }
    }

    pub fn cursor_right(&mut self) {
        let len = self.chart_candles().len();
        if let Some(index) = self.cursor_index(len) {
            self.chart_cursor = Some((index + 1).min(len - 1));
        }
    }

    // ========================================================================
    // Thème, retry, quit
    // ========================================================================

    pub fn toggle_theme(&mut self) {
        self.theme.toggle();
    }

    /// Relance immédiatement les requêtes de l'écran courant
    pub fn retry(&mut self) {
        debug!(route = %self.route, "Retry requested");
        self.data.retry(&self.route);
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Abonnements montés (inspection)
    pub fn mounts(&self) -> &Mounts {
        &self.mounts
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
