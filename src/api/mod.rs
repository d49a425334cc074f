// ============================================================================
// Module : api
// ============================================================================
// Accès aux données distantes. `CoinSource` est la frontière entre l'UI et
// le réseau : le client coinpaprika l'implémente, les tests utilisent une
// source en mémoire.
// ============================================================================

pub mod coinpaprika; // Client API coinpaprika

#[cfg(test)]
pub(crate) mod fake; // Source en mémoire pour les tests

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Coin, CoinInfo, CoinMarket, OhlcvPoint, OhlcvWindow};

pub use coinpaprika::PaprikaClient;

/// Source des données crypto
///
/// CONCEPT RUST : async_trait
/// - Les méthodes async dans un trait objet (Arc<dyn CoinSource>)
/// - Send + Sync : la source est partagée avec les tâches de polling
#[async_trait]
pub trait CoinSource: Send + Sync {
    /// Catalogue complet (ordre de la source)
    async fn coins(&self) -> Result<Vec<Coin>>;

    /// Métadonnées d'une crypto
    async fn coin_info(&self, coin_id: &str) -> Result<CoinInfo>;

    /// Cotation d'une crypto
    async fn ticker(&self, coin_id: &str) -> Result<CoinMarket>;

    /// Historique OHLCV sur la fenêtre se terminant maintenant
    async fn ohlcv(&self, coin_id: &str, window: OhlcvWindow) -> Result<Vec<OhlcvPoint>>;
}
