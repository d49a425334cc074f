// ============================================================================
// Module : models
// ============================================================================
// Structures de données renvoyées par coinpaprika et view-models dérivés
// ============================================================================

pub mod coin;      // Catalogue (/v1/coins)
pub mod coin_info; // Métadonnées (/v1/coins/{id})
pub mod market;    // Cotation (/v1/tickers/{id})
pub mod ohlcv;     // Historique OHLCV + dérivés (extrêmes, chandeliers)

pub use coin::{catalog_links, Coin, CoinLink, CATALOG_LIMIT};
pub use coin_info::CoinInfo;
pub use market::{format_change, ChangeDirection, CoinMarket};
pub use ohlcv::{price_extremes, to_candles, CandleDatum, DayPrice, OhlcvPoint, OhlcvWindow, PriceExtremes};
