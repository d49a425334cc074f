// ============================================================================
// Router : chemins → écrans
// ============================================================================
// Chemins supportés :
// - "/"                → liste
// - "/:coinId"         → détail sans onglet
// - "/:coinId/price"   → détail + panneau prix
// - "/:coinId/chart"   → détail + graphique
//
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois, le compilateur force à gérer tous les cas
// ============================================================================

use std::fmt;

/// Onglet du détail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Price,
    Chart,
}

impl Tab {
    /// Segment de chemin ("price" / "chart")
    pub fn segment(&self) -> &'static str {
        match self {
            Tab::Price => "price",
            Tab::Chart => "chart",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Tab> {
        match segment {
            "price" => Some(Tab::Price),
            "chart" => Some(Tab::Chart),
            _ => None,
        }
    }

    /// Onglet suivant (cycle, touche Tab)
    pub fn next(&self) -> Tab {
        match self {
            Tab::Chart => Tab::Price,
            Tab::Price => Tab::Chart,
        }
    }

    /// Ordre d'affichage dans la barre d'onglets
    pub fn all() -> [Tab; 2] {
        [Tab::Chart, Tab::Price]
    }
}

/// Écran courant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Detail { coin_id: String, tab: Option<Tab> },
}

impl Route {
    /// Parse un chemin ; les segments inconnus après l'id sont ignorés
    pub fn parse(path: &str) -> Route {
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match segments.next() {
            None => Route::List,
            Some(coin_id) => Route::Detail {
                coin_id: coin_id.to_string(),
                tab: segments.next().and_then(Tab::from_segment),
            },
        }
    }

    pub fn detail(coin_id: &str, tab: Option<Tab>) -> Route {
        Route::Detail {
            coin_id: coin_id.to_string(),
            tab,
        }
    }

    pub fn coin_id(&self) -> Option<&str> {
        match self {
            Route::List => None,
            Route::Detail { coin_id, .. } => Some(coin_id),
        }
    }

    pub fn tab(&self) -> Option<Tab> {
        match self {
            Route::List => None,
            Route::Detail { tab, .. } => *tab,
        }
    }

    /// Même crypto, autre onglet (no-op sur la liste)
    pub fn with_tab(&self, tab: Tab) -> Route {
        match self {
            Route::List => Route::List,
            Route::Detail { coin_id, .. } => Route::detail(coin_id, Some(tab)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::List => write!(f, "/"),
            Route::Detail { coin_id, tab: None } => write!(f, "/{}", coin_id),
            Route::Detail { coin_id, tab: Some(tab) } => write!(f, "/{}/{}", coin_id, tab.segment()),
        }
    }
}
