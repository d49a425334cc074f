// ============================================================================
// Structure : OhlcvPoint (Open, High, Low, Close, Volume)
// ============================================================================
// Une barre de prix historique renvoyée par
// GET /v1/coins/{coinId}/ohlcv/historical?start=..&end=..
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. #[serde(deserialize_with = "...")] : parsing de date sur mesure
// 3. Iterators : scan linéaire pour le plus haut / plus bas
// ============================================================================

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fenêtre historique demandée à l'API
///
/// CONCEPT : La fenêtre fait partie de la clé de cache
/// - Le graphique (14 jours) et le panneau prix (365 jours) ne partagent
///   jamais le même résultat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OhlcvWindow {
    /// 14 jours (ChartPanel)
    TwoWeeks,
    /// 365 jours (PricePanel)
    OneYear,
}

impl OhlcvWindow {
    /// Retourne le nombre de jours correspondant
    pub fn to_days(&self) -> i64 {
        match self {
            OhlcvWindow::TwoWeeks => 14,
            OhlcvWindow::OneYear => 365,
        }
    }

    /// Retourne le label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            OhlcvWindow::TwoWeeks => "14D",
            OhlcvWindow::OneYear => "1Y",
        }
    }

    /// Calcule (start, end) en secondes Unix, `end` = maintenant
    pub fn range_ending_at(&self, now: DateTime<Utc>) -> (i64, i64) {
        let end = now.timestamp();
        let start = end - self.to_days() * 24 * 60 * 60;
        (start, end)
    }
}

/// Une barre OHLCV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvPoint {
    /// Ouverture de la période
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time_open: DateTime<Utc>,

    /// Fermeture de la période
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time_close: DateTime<Utc>,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    /// Peut être null pour les cryptos récentes
    #[serde(default)]
    pub volume: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,
}

impl OhlcvPoint {
    /// Jour calendaire de l'ouverture
    pub fn day(&self) -> NaiveDate {
        self.time_open.date_naive()
    }
}

/// Accepte "2021-01-01T00:00:00Z" (RFC 3339) ou "2021-01-01" (minuit UTC)
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// Parse un timestamp coinpaprika
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

// ============================================================================
// Plus haut / plus bas (PricePanel)
// ============================================================================

/// Un prix associé au jour où il a été atteint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayPrice {
    pub price: f64,
    pub day: NaiveDate,
}

impl DayPrice {
    /// Jour au format "YYYY-MM-DD"
    pub fn day_label(&self) -> String {
        self.day.format("%Y-%m-%d").to_string()
    }

    /// Prix avec 2 décimales
    pub fn price_label(&self) -> String {
        format!("{:.2}", self.price)
    }
}

/// Plus haut et plus bas sur une série
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceExtremes {
    pub highest: DayPrice,
    pub lowest: DayPrice,
}

/// Calcule le plus haut (max `high`) et le plus bas (min `low`)
///
/// CONCEPT : Un seul passage, comparaisons strictes
/// - En cas d'égalité, la première barre rencontrée gagne
/// - Série vide → None (pas de valeurs sentinelles)
pub fn price_extremes(points: &[OhlcvPoint]) -> Option<PriceExtremes> {
    let first = points.first()?;

    let mut highest = DayPrice { price: first.high, day: first.day() };
    let mut lowest = DayPrice { price: first.low, day: first.day() };

    for point in &points[1..] {
        if point.high > highest.price {
            highest = DayPrice { price: point.high, day: point.day() };
        }
        if point.low < lowest.price {
            lowest = DayPrice { price: point.low, day: point.day() };
        }
    }

    Some(PriceExtremes { highest, lowest })
}

// ============================================================================
// Série de chandeliers (ChartPanel)
// ============================================================================

/// Un point de la série candlestick
///
/// - `x` : ouverture en millisecondes Unix
/// - `y` : [open, high, low, close] arrondis à 2 décimales
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleDatum {
    pub x: i64,
    pub y: [f64; 4],
}

impl CandleDatum {
    pub fn open(&self) -> f64 {
        self.y[0]
    }

    pub fn high(&self) -> f64 {
        self.y[1]
    }

    pub fn low(&self) -> f64 {
        self.y[2]
    }

    pub fn close(&self) -> f64 {
        self.y[3]
    }

    pub fn is_bullish(&self) -> bool {
        self.close() >= self.open()
    }

    /// Reconvertit `x` en date (pour les labels de l'axe X)
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.x)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Transforme une série OHLCV en série candlestick (même ordre, même taille)
pub fn to_candles(points: &[OhlcvPoint]) -> Vec<CandleDatum> {
    points
        .iter()
        .map(|p| CandleDatum {
            x: p.time_open.timestamp_millis(),
            y: [round2(p.open), round2(p.high), round2(p.low), round2(p.close)],
        })
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: &str, open: f64, high: f64, low: f64, close: f64) -> OhlcvPoint {
        let time = parse_timestamp(day).unwrap();
        OhlcvPoint {
            time_open: time,
            time_close: time,
            open,
            high,
            low,
            close,
            volume: None,
            market_cap: None,
        }
    }

    #[test]
    fn test_parse_ohlcv_json() {
        let json = r#"[
            {"time_open":"2021-01-01T00:00:00Z","time_close":"2021-01-01T23:59:59Z",
             "open":29000.1,"high":29600.0,"low":28800.5,"close":29374.2,
             "volume":40730301359,"market_cap":546095000000},
            {"time_open":"2021-01-02","time_close":"2021-01-02",
             "open":29374.2,"high":33000.0,"low":29000.0,"close":32127.3,
             "volume":null,"market_cap":null}
        ]"#;

        let points: Vec<OhlcvPoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].day().to_string(), "2021-01-01");
        assert_eq!(points[1].day().to_string(), "2021-01-02");
        assert!(points[1].volume.is_none());
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        let json = r#"{"time_open":"yesterday","time_close":"2021-01-02",
                       "open":1.0,"high":1.0,"low":1.0,"close":1.0}"#;
        assert!(serde_json::from_str::<OhlcvPoint>(json).is_err());
    }

    #[test]
    fn test_price_extremes_scenario() {
        let points = vec![
            point("2021-01-01", 95.0, 100.0, 90.0, 95.0),
            point("2021-01-02", 95.0, 120.0, 80.0, 110.0),
        ];

        let extremes = price_extremes(&points).unwrap();
        assert_eq!(extremes.highest.price, 120.0);
        assert_eq!(extremes.highest.day_label(), "2021-01-02");
        assert_eq!(extremes.lowest.price, 80.0);
        assert_eq!(extremes.lowest.day_label(), "2021-01-02");
    }

    #[test]
    fn test_price_extremes_ties_first_wins() {
        let points = vec![
            point("2021-03-01", 10.0, 50.0, 5.0, 20.0),
            point("2021-03-02", 10.0, 50.0, 5.0, 20.0),
            point("2021-03-03", 10.0, 40.0, 6.0, 20.0),
        ];

        let extremes = price_extremes(&points).unwrap();
        assert_eq!(extremes.highest.day_label(), "2021-03-01");
        assert_eq!(extremes.lowest.day_label(), "2021-03-01");
    }

    #[test]
    fn test_price_extremes_matches_max_min() {
        let points: Vec<OhlcvPoint> = (1..=28)
            .map(|d| {
                let x = ((d * 37) % 11) as f64;
                point(&format!("2022-02-{:02}", d), 10.0, 100.0 + x, 50.0 - x, 10.0)
            })
            .collect();

        let extremes = price_extremes(&points).unwrap();
        let max_high = points.iter().map(|p| p.high).fold(f64::MIN, f64::max);
        let min_low = points.iter().map(|p| p.low).fold(f64::MAX, f64::min);
        assert_eq!(extremes.highest.price, max_high);
        assert_eq!(extremes.lowest.price, min_low);
    }

    #[test]
    fn test_price_extremes_empty() {
        assert!(price_extremes(&[]).is_none());
    }

    #[test]
    fn test_to_candles_preserves_order() {
        let points = vec![
            point("2021-01-03", 1.005, 2.0, 0.5, 1.234),
            point("2021-01-01", 3.0, 4.0, 2.0, 3.5),
            point("2021-01-02", 5.0, 6.0, 4.0, 5.5),
        ];

        let candles = to_candles(&points);
        assert_eq!(candles.len(), points.len());
        for (candle, point) in candles.iter().zip(&points) {
            assert_eq!(candle.x, point.time_open.timestamp_millis());
        }
        assert_eq!(candles[0].close(), 1.23);
        assert_eq!(candles[0].x, 1_609_632_000_000);
    }

    #[test]
    fn test_window_range() {
        let now = parse_timestamp("2024-01-15T00:00:00Z").unwrap();
        let (start, end) = OhlcvWindow::TwoWeeks.range_ending_at(now);
        assert_eq!(end - start, 14 * 86_400);
        assert_eq!(end, now.timestamp());
        assert_eq!(OhlcvWindow::OneYear.to_days(), 365);
    }
}
