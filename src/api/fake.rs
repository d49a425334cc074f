// Source en mémoire pour les tests (aucun appel réseau)

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::api::CoinSource;
use crate::models::{Coin, CoinInfo, CoinMarket, OhlcvPoint, OhlcvWindow};

/// Source déterministe : une crypto "xxx-name" a un prix de base dérivé de
/// la longueur de son id, la série OHLCV compte `window.to_days()` points
#[derive(Default)]
pub struct FakeSource {
    pub catalog: Vec<Coin>,
    pub calls: AtomicUsize,
    /// Ids pour lesquels toutes les requêtes échouent
    pub failing: Mutex<Vec<String>>,
    /// Séries OHLCV imposées par id (sinon générées)
    pub series: HashMap<String, Vec<OhlcvPoint>>,
}

impl FakeSource {
    pub fn with_catalog(size: usize) -> Self {
        let catalog = (0..size)
            .map(|i| Coin {
                id: format!("c{}-coin", i),
                name: format!("Coin {}", i),
                symbol: format!("C{}", i),
                rank: i as u32 + 1,
                is_new: false,
                is_active: true,
                coin_type: "coin".to_string(),
            })
            .collect();

        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn fail(&self, coin_id: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.push(coin_id.to_string());
        }
    }

    fn check(&self, coin_id: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing.lock().map(|f| f.contains(&coin_id.to_string())).unwrap_or(false);
        if failing {
            anyhow::bail!("HTTP 404 ({} not found)", coin_id);
        }
        Ok(())
    }

    fn base_price(coin_id: &str) -> f64 {
        coin_id.len() as f64 * 100.0
    }
}

pub fn point(day_offset: i64, open: f64, high: f64, low: f64, close: f64) -> OhlcvPoint {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
    let time_open = start + Duration::days(day_offset);
    OhlcvPoint {
        time_open,
        time_close: time_open + Duration::hours(23),
        open,
        high,
        low,
        close,
        volume: Some(1000.0),
        market_cap: None,
    }
}

#[async_trait]
impl CoinSource for FakeSource {
    async fn coins(&self) -> Result<Vec<Coin>> {
        self.check("catalog")?;
        Ok(self.catalog.clone())
    }

    async fn coin_info(&self, coin_id: &str) -> Result<CoinInfo> {
        self.check(coin_id)?;
        let coin = self.catalog.iter().find(|c| c.id == coin_id).context("unknown coin")?;
        Ok(CoinInfo {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            rank: coin.rank,
            description: Some(format!("{} description", coin.name)),
            ..CoinInfo::default()
        })
    }

    async fn ticker(&self, coin_id: &str) -> Result<CoinMarket> {
        self.check(coin_id)?;
        let mut market = CoinMarket {
            id: coin_id.to_string(),
            total_supply: 1000.0,
            max_supply: 2000.0,
            ..CoinMarket::default()
        };
        market.quotes.usd.price = Self::base_price(coin_id);
        market.quotes.usd.percent_change_15m = Some(0.5);
        market.quotes.usd.percent_change_24h = Some(-1.0);
        Ok(market)
    }

    async fn ohlcv(&self, coin_id: &str, window: OhlcvWindow) -> Result<Vec<OhlcvPoint>> {
        self.check(coin_id)?;
        if let Some(series) = self.series.get(coin_id) {
            return Ok(series.clone());
        }

        let base = Self::base_price(coin_id);
        Ok((0..window.to_days())
            .map(|d| {
                let shift = (d % 7) as f64;
                point(d, base + shift, base + shift + 5.0, base + shift - 5.0, base + shift + 1.0)
            })
            .collect())
    }
}
