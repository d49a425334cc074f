// ============================================================================
// API Client : coinpaprika
// ============================================================================
// Récupère catalogue, métadonnées, cotations et historique OHLCV depuis
// l'API publique coinpaprika (GET + JSON, sans authentification)
//
// CONCEPTS RUST :
// 1. async/await : requêtes non-bloquantes
// 2. Result<T> + Context : erreurs avec contexte lisible
// 3. Génériques : une seule fonction `get_json<T>` pour tous les endpoints
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::CoinSource;
use crate::models::{Coin, CoinInfo, CoinMarket, OhlcvPoint, OhlcvWindow};

/// URL de base par défaut
pub const DEFAULT_BASE_URL: &str = "https://api.coinpaprika.com";

/// Corps d'erreur renvoyé par coinpaprika (ex: {"error": "id not found"})
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Client HTTP coinpaprika
///
/// CONCEPT : reqwest::Client est réutilisé
/// - Contient un pool de connexions, on le crée une seule fois
pub struct PaprikaClient {
    http: reqwest::Client,
    base_url: String,
}

impl PaprikaClient {
    /// Crée un client pointant sur `base_url` (sans "/" final)
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lazycoin/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` et désérialise le JSON
    ///
    /// - Statut non-2xx : erreur avec le message coinpaprika s'il existe
    /// - JSON invalide : erreur de parsing avec contexte
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "Sending HTTP request to coinpaprika");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", path))?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            error!(status = %status, message = %message, "coinpaprika returned error status");
            anyhow::bail!("coinpaprika a retourné une erreur : HTTP {} ({})", status, message.trim());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Échec du parsing JSON de la réponse {}", path))
    }
}

#[async_trait]
impl CoinSource for PaprikaClient {
    #[instrument(skip(self))]
    async fn coins(&self) -> Result<Vec<Coin>> {
        let coins: Vec<Coin> = self.get_json("/v1/coins", &[]).await?;
        info!(count = coins.len(), "Fetched coin catalog");
        Ok(coins)
    }

    #[instrument(skip(self))]
    async fn coin_info(&self, coin_id: &str) -> Result<CoinInfo> {
        self.get_json(&coin_path(coin_id), &[]).await
    }

    #[instrument(skip(self))]
    async fn ticker(&self, coin_id: &str) -> Result<CoinMarket> {
        self.get_json(&ticker_path(coin_id), &[]).await
    }

    #[instrument(skip(self, window), fields(window = window.label()))]
    async fn ohlcv(&self, coin_id: &str, window: OhlcvWindow) -> Result<Vec<OhlcvPoint>> {
        let (start, end) = window.range_ending_at(chrono::Utc::now());
        let points: Vec<OhlcvPoint> = self
            .get_json(
                &ohlcv_path(coin_id),
                &[("start", start.to_string()), ("end", end.to_string())],
            )
            .await?;

        info!(points = points.len(), "Fetched OHLCV history");
        Ok(points)
    }
}

fn coin_path(coin_id: &str) -> String {
    format!("/v1/coins/{}", coin_id)
}

fn ticker_path(coin_id: &str) -> String {
    format!("/v1/tickers/{}", coin_id)
}

fn ohlcv_path(coin_id: &str) -> String {
    format!("/v1/coins/{}/ohlcv/historical", coin_id)
}

// ============================================================================
// Tests unitaires
// ============================================================================
