// ============================================================================
// Configuration : ligne de commande + variables d'environnement
// ============================================================================
// CONCEPT RUST : clap derive
// - La struct décrit les options, clap génère le parser et l'aide (--help)
// - `env = ...` : fallback sur une variable d'environnement
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use crate::api::coinpaprika::DEFAULT_BASE_URL;
use crate::router::Route;

/// Intervalle de rafraîchissement minimal accepté
pub const MIN_REFRESH_MS: u64 = 500;

/// Options de lancement de lazycoin
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Crypto listings, prices and charts from coinpaprika", long_about = None)]
pub struct Config {
    /// URL de base de l'API coinpaprika
    #[arg(long, env = "LAZYCOIN_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Intervalle de polling des métadonnées, cotations et historiques (ms)
    #[arg(long, env = "LAZYCOIN_REFRESH_MS", default_value_t = 5000)]
    pub refresh_ms: u64,

    /// Écran initial ("/", "/btc-bitcoin", "/btc-bitcoin/chart", ...)
    #[arg(long, default_value = "/")]
    pub route: String,

    /// Démarre en mode sombre
    #[arg(long, default_value_t = false)]
    pub dark: bool,

    /// Répertoire des logs (défaut : répertoire de données local)
    #[arg(long, env = "LAZYCOIN_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Vérifie les valeurs qui passent le parsing mais restent inutilisables
    pub fn validate(&self) -> Result<()> {
        if self.refresh_ms < MIN_REFRESH_MS {
            bail!(
                "--refresh-ms doit être ≥ {} (reçu {})",
                MIN_REFRESH_MS,
                self.refresh_ms
            );
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            bail!("--api-url doit commencer par http:// ou https:// (reçu {:?})", self.api_url);
        }

        Ok(())
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn initial_route(&self) -> Route {
        Route::parse(&self.route)
    }

    /// Répertoire des logs
    ///
    /// - Linux : ~/.local/share/lazycoin/logs
    /// - macOS : ~/Library/Application Support/lazycoin/logs
    /// - Sinon (aucun répertoire de données connu) : ./logs
    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .map(|dir| dir.join("lazycoin").join("logs"))
                .unwrap_or_else(|| PathBuf::from("./logs")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Tab;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("lazycoin").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.refresh(), Duration::from_millis(5000));
        assert_eq!(config.initial_route(), Route::List);
        assert!(!config.dark);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--api-url",
            "http://localhost:8080",
            "--refresh-ms",
            "1000",
            "--route",
            "/btc-bitcoin/chart",
            "--dark",
            "--log-dir",
            "/tmp/lazycoin",
        ]);

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.refresh_ms, 1000);
        assert_eq!(config.initial_route(), Route::detail("btc-bitcoin", Some(Tab::Chart)));
        assert!(config.dark);
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/lazycoin"));
    }

    #[test]
    fn test_validation() {
        let config = parse(&["--refresh-ms", "100"]);
        assert!(config.validate().is_err());

        let config = parse(&["--refresh-ms", "500"]);
        assert!(config.validate().is_ok());

        let config = parse(&["--api-url", "ftp://example.com"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_numeric_refresh() {
        let result = Config::try_parse_from(["lazycoin", "--refresh-ms", "soon"]);
        assert!(result.is_err());
    }
}
