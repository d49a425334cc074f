// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier (crossterm) et produit des événements de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : une fonction helper par raccourci
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::router::Tab;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (redessine avec les dernières données du cache)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend max 250ms
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),

                // Release, resize, souris : simple redessin
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : KeyEvent → action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' (quitter, en deux temps)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Échap ou Backspace : retour à la liste
pub fn is_back_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc | KeyCode::Backspace))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

/// Flèche vers le haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

/// Flèche gauche ou 'h' : chandelier précédent
pub fn is_left_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left | KeyCode::Char('h')))
}

/// Flèche droite ou 'l' : chandelier suivant
pub fn is_right_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right | KeyCode::Char('l')))
}

/// 't' : bascule clair / sombre
pub fn is_theme_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('t') | KeyCode::Char('T')))
}

/// 'r' : relance les requêtes de l'écran
pub fn is_retry_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// Tab : onglet suivant
pub fn is_cycle_tab_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab))
}

/// 'c' → graphique, 'p' → prix
pub fn tab_from_event(event: &Event) -> Option<Tab> {
    match key_code(event)? {
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Tab::Chart),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Tab::Price),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_back_and_moves() {
        assert!(is_back_event(&key(KeyCode::Esc)));
        assert!(is_back_event(&key(KeyCode::Backspace)));
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Down)));
        assert!(is_left_event(&key(KeyCode::Char('h'))));
        assert!(is_right_event(&key(KeyCode::Right)));
    }

    #[test]
    fn test_tab_keys() {
        assert_eq!(tab_from_event(&key(KeyCode::Char('c'))), Some(Tab::Chart));
        assert_eq!(tab_from_event(&key(KeyCode::Char('p'))), Some(Tab::Price));
        assert_eq!(tab_from_event(&key(KeyCode::Char('x'))), None);
        assert_eq!(tab_from_event(&Event::Tick), None);
        assert!(is_cycle_tab_event(&key(KeyCode::Tab)));
    }
}
