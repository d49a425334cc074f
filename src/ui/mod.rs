// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;      // Gestion des événements clavier
pub mod screen;      // Cadre commun (header, footer) et routage du rendu
pub mod list_view;   // Liste des cryptos
pub mod detail_view; // Fiche d'une crypto + onglets
pub mod price_panel; // Onglet prix : extrêmes et variations
pub mod chart_panel; // Onglet graphique : chandeliers japonais (Unicode text)

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use screen::render;
