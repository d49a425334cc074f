// ============================================================================
// ThemeStore : mode clair / sombre
// ============================================================================
// Un booléen `is_dark` détenu par l'état de l'application et passé
// explicitement aux fonctions de rendu (pas de variable globale).
//
// CONCEPTS RUST :
// 1. Box<dyn FnMut> : callbacks stockés (observer pattern)
// 2. Pas de Send/Sync : le store ne vit que sur le thread UI
// ============================================================================

use ratatui::style::{Color, Style};

use crate::models::ChangeDirection;

/// Identifiant d'un abonné, rendu par `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(bool)>;

/// Store du thème, défaut : clair
pub struct ThemeStore {
    is_dark: bool,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl ThemeStore {
    pub fn new(is_dark: bool) -> Self {
        Self {
            is_dark,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> bool {
        self.is_dark
    }

    /// Inverse le mode et notifie tous les abonnés (synchrone)
    pub fn toggle(&mut self) {
        self.is_dark = !self.is_dark;
        self.notify();
    }

    /// Force un mode ; ne notifie que si la valeur change
    pub fn set(&mut self, is_dark: bool) {
        if self.is_dark != is_dark {
            self.is_dark = is_dark;
            self.notify();
        }
    }

    /// Enregistre un callback appelé avec la nouvelle valeur à chaque changement
    pub fn subscribe(&mut self, listener: impl FnMut(bool) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Retire un abonné ; retourne false s'il n'existait pas
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Couleurs du mode courant
    pub fn palette(&self) -> Palette {
        if self.is_dark {
            Palette::dark()
        } else {
            Palette::light()
        }
    }

    fn notify(&mut self) {
        let value = self.is_dark;
        for (_, listener) in self.listeners.iter_mut() {
            listener(value);
        }
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(false)
    }
}

// ============================================================================
// Palette
// ============================================================================

/// Couleurs utilisées par le rendu
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    /// Liens de la liste et bordures
    pub accent: Color,
    /// Onglet actif
    pub active_tab: Color,
    /// Variation positive
    pub rise: Color,
    /// Variation nulle ou négative
    pub fall: Color,
    pub muted: Color,
    /// Chandeliers
    pub bullish: Color,
    pub bearish: Color,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            background: Color::Rgb(0xf5, 0xf6, 0xfa),
            text: Color::Rgb(0x2f, 0x36, 0x40),
            accent: Color::Rgb(0x9c, 0x88, 0xff),
            active_tab: Color::Rgb(0xee, 0x82, 0xee), // violet
            rise: Color::Red,
            fall: Color::Blue,
            muted: Color::Rgb(120, 120, 120),
            bullish: Color::Rgb(30, 160, 70),
            bearish: Color::Rgb(210, 50, 60),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(0x2f, 0x36, 0x40),
            text: Color::Rgb(0xf5, 0xf6, 0xfa),
            accent: Color::Rgb(0x9c, 0x88, 0xff),
            active_tab: Color::Rgb(0xee, 0x82, 0xee),
            rise: Color::Rgb(255, 90, 90),
            fall: Color::Rgb(110, 160, 255),
            muted: Color::Rgb(160, 160, 160),
            bullish: Color::Rgb(52, 208, 88),
            bearish: Color::Rgb(234, 74, 90),
        }
    }

    /// Style de base : texte sur fond du thème
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    /// Couleur d'une variation : hausse, sinon baisse (zéro compris) ;
    /// atténuée si la donnée manque
    pub fn change_color(&self, change: Option<f64>) -> Color {
        match change.map(ChangeDirection::of) {
            Some(ChangeDirection::Positive) => self.rise,
            Some(ChangeDirection::NonPositive) => self.fall,
            None => self.muted,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
