// ============================================================================
// Structure : CoinMarket
// ============================================================================
// Données de marché d'une crypto (GET /v1/tickers/{coinId})
//
// La réponse contient un objet "quotes" indexé par devise ; on ne lit que USD.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Cotation en dollars (quotes.USD)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsdQuote {
    pub price: f64,
    pub volume_24h: f64,
    pub volume_24h_change_24h: f64,
    pub market_cap: f64,
    pub market_cap_change_24h: f64,
    pub percent_change_15m: Option<f64>,
    pub percent_change_30m: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_6h: Option<f64>,
    pub percent_change_12h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub percent_change_30d: Option<f64>,
    pub percent_change_1y: Option<f64>,
    pub ath_price: Option<f64>,
    pub ath_date: Option<String>,
    pub percent_from_price_ath: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Quotes {
    #[serde(rename = "USD")]
    pub usd: UsdQuote,
}

/// Données de marché d'une cryptomonnaie
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinMarket {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
    pub circulating_supply: f64,
    pub total_supply: f64,
    pub max_supply: f64,
    pub beta_value: f64,
    pub first_data_at: Option<String>,
    pub last_updated: Option<String>,
    pub quotes: Quotes,
}

impl CoinMarket {
    /// Prix actuel en USD
    pub fn price(&self) -> f64 {
        self.quotes.usd.price
    }

    /// Variation sur 15 minutes (%)
    pub fn change_15m(&self) -> Option<f64> {
        self.quotes.usd.percent_change_15m
    }

    /// Variation sur 24 heures (%)
    pub fn change_24h(&self) -> Option<f64> {
        self.quotes.usd.percent_change_24h
    }
}

/// Sens d'une variation en pourcentage
///
/// CONCEPT : Zéro est traité comme non-positif (même couleur qu'une baisse)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Positive,
    NonPositive,
}

impl ChangeDirection {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            ChangeDirection::Positive
        } else {
            ChangeDirection::NonPositive
        }
    }
}

/// Formate une variation pour l'affichage ("N/A" si absente)
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(value) => format!("{:+.2}%", value),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker() {
        let json = r#"{
            "id": "btc-bitcoin",
            "name": "Bitcoin",
            "symbol": "BTC",
            "rank": 1,
            "circulating_supply": 19000000,
            "total_supply": 19000000,
            "max_supply": 21000000,
            "beta_value": 0.9,
            "last_updated": "2024-01-01T00:00:00Z",
            "quotes": {
                "USD": {
                    "price": 42000.5,
                    "volume_24h": 1.5e10,
                    "market_cap": 8.0e11,
                    "percent_change_15m": -0.12,
                    "percent_change_24h": 2.5,
                    "ath_price": 69000.0,
                    "ath_date": "2021-11-10T16:51:15Z"
                }
            }
        }"#;

        let market: CoinMarket = serde_json::from_str(json).unwrap();
        assert_eq!(market.price(), 42000.5);
        assert_eq!(market.max_supply, 21_000_000.0);
        assert_eq!(market.change_15m(), Some(-0.12));
        assert_eq!(market.change_24h(), Some(2.5));
        assert!(market.quotes.usd.percent_change_1y.is_none());
    }

    #[test]
    fn test_change_direction() {
        assert_eq!(ChangeDirection::of(1.2), ChangeDirection::Positive);
        assert_eq!(ChangeDirection::of(-0.5), ChangeDirection::NonPositive);
        // Zéro compte comme non-positif
        assert_eq!(ChangeDirection::of(0.0), ChangeDirection::NonPositive);
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(Some(2.5)), "+2.50%");
        assert_eq!(format_change(Some(-0.123)), "-0.12%");
        assert_eq!(format_change(None), "N/A");
    }
}
