// ============================================================================
// Structure : Coin
// ============================================================================
// Une entrée du catalogue coinpaprika (GET /v1/coins)
//
// CONCEPTS RUST :
// 1. #[serde(rename = "...")] : "type" est un mot-clé Rust, on le renomme
// 2. Slices : le ListView ne garde que les 100 premières entrées
// ============================================================================

use serde::{Deserialize, Serialize};

/// Nombre maximum d'entrées affichées dans la liste
pub const CATALOG_LIMIT: usize = 100;

/// Cryptomonnaie du catalogue
///
/// Identité = `id` (ex: "btc-bitcoin"). Jamais modifiée après le fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
    pub is_new: bool,
    pub is_active: bool,

    /// "coin" ou "token"
    #[serde(rename = "type")]
    pub coin_type: String,
}

/// Lien de navigation affiché dans le ListView
///
/// CONCEPT : View-model
/// - Séparé de Coin pour que le rendu ne manipule que ce qu'il affiche
/// - Testable sans terminal
#[derive(Debug, Clone, PartialEq)]
pub struct CoinLink {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
}

impl CoinLink {
    /// Texte du lien (ex: "Bitcoin →")
    pub fn label(&self) -> String {
        format!("{} →", self.name)
    }

    /// Route cible (ex: "/btc-bitcoin")
    pub fn target(&self) -> String {
        format!("/{}", self.id)
    }
}

impl From<&Coin> for CoinLink {
    fn from(coin: &Coin) -> Self {
        Self {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            rank: coin.rank,
        }
    }
}

/// Construit les liens du ListView : les `CATALOG_LIMIT` premières entrées,
/// dans l'ordre de la source
pub fn catalog_links(coins: &[Coin]) -> Vec<CoinLink> {
    coins.iter().take(CATALOG_LIMIT).map(CoinLink::from).collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================
