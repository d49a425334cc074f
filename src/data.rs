// ============================================================================
// Couche données : clés de cache + abonnements par écran
// ============================================================================
// Relie `CoinSource` (réseau) et `QueryClient` (polling) :
// - une clé typée par ressource : deux cryptos ou deux fenêtres historiques
//   n'occupent jamais la même entrée de cache
// - `mount(route)` crée les abonnements d'un écran ; les dropper arrête le
//   polling qui n'est plus utilisé
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

use crate::api::CoinSource;
use crate::models::{Coin, CoinInfo, CoinMarket, OhlcvPoint, OhlcvWindow};
use crate::query::{producer, QueryClient, QueryState, Subscription};
use crate::router::{Route, Tab};

/// Clé d'une ressource distante
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Catalog,
    CoinInfo(String),
    Ticker(String),
    Ohlcv { coin_id: String, window: OhlcvWindow },
}

impl QueryKey {
    pub fn ohlcv(coin_id: &str, window: OhlcvWindow) -> QueryKey {
        QueryKey::Ohlcv {
            coin_id: coin_id.to_string(),
            window,
        }
    }
}

/// Fenêtre historique utilisée par chaque onglet
pub fn window_for(tab: Tab) -> OhlcvWindow {
    match tab {
        Tab::Price => OhlcvWindow::OneYear,
        Tab::Chart => OhlcvWindow::TwoWeeks,
    }
}

/// Abonnements actifs d'un écran
///
/// CONCEPT RUST : RAII
/// - Remplacer `Mounts` drop les anciens abonnements
/// - Les ressources partagées entre l'ancien et le nouvel écran (ex: même
///   crypto, autre onglet) restent en cache car le nouveau est créé avant
#[derive(Debug, Default)]
pub struct Mounts {
    pub catalog: Option<Subscription<QueryKey, Vec<Coin>>>,
    pub info: Option<Subscription<QueryKey, CoinInfo>>,
    pub market: Option<Subscription<QueryKey, CoinMarket>>,
    pub ohlcv: Option<Subscription<QueryKey, Vec<OhlcvPoint>>>,
}

/// Caches et polling de toutes les ressources coinpaprika
pub struct CoinData {
    source: Arc<dyn CoinSource>,
    refresh: Duration,
    pub catalog: QueryClient<QueryKey, Vec<Coin>>,
    pub info: QueryClient<QueryKey, CoinInfo>,
    pub market: QueryClient<QueryKey, CoinMarket>,
    pub ohlcv: QueryClient<QueryKey, Vec<OhlcvPoint>>,
}

impl CoinData {
    pub fn new(source: Arc<dyn CoinSource>, refresh: Duration, runtime: Handle) -> Self {
        Self {
            source,
            refresh,
            catalog: QueryClient::new("catalog", runtime.clone()),
            info: QueryClient::new("coin_info", runtime.clone()),
            market: QueryClient::new("ticker", runtime.clone()),
            ohlcv: QueryClient::new("ohlcv", runtime),
        }
    }

    /// Catalogue : un seul fetch, pas de polling
    pub fn subscribe_catalog(&self) -> Subscription<QueryKey, Vec<Coin>> {
        let source = self.source.clone();
        self.catalog.subscribe(
            QueryKey::Catalog,
            producer(move || {
                let source = source.clone();
                async move { source.coins().await }
            }),
            None,
        )
    }

    pub fn subscribe_info(&self, coin_id: &str) -> Subscription<QueryKey, CoinInfo> {
        let source = self.source.clone();
        let id = coin_id.to_string();
        self.info.subscribe(
            QueryKey::CoinInfo(id.clone()),
            producer(move || {
                let (source, id) = (source.clone(), id.clone());
                async move { source.coin_info(&id).await }
            }),
            Some(self.refresh),
        )
    }

    pub fn subscribe_market(&self, coin_id: &str) -> Subscription<QueryKey, CoinMarket> {
        let source = self.source.clone();
        let id = coin_id.to_string();
        self.market.subscribe(
            QueryKey::Ticker(id.clone()),
            producer(move || {
                let (source, id) = (source.clone(), id.clone());
                async move { source.ticker(&id).await }
            }),
            Some(self.refresh),
        )
    }

    pub fn subscribe_ohlcv(&self, coin_id: &str, window: OhlcvWindow) -> Subscription<QueryKey, Vec<OhlcvPoint>> {
        let source = self.source.clone();
        let id = coin_id.to_string();
        self.ohlcv.subscribe(
            QueryKey::ohlcv(coin_id, window),
            producer(move || {
                let (source, id) = (source.clone(), id.clone());
                async move { source.ohlcv(&id, window).await }
            }),
            Some(self.refresh),
        )
    }

    /// Abonnements nécessaires pour afficher `route`
    ///
    /// Le panneau non affiché n'est pas abonné : aucun fetch.
    pub fn mount(&self, route: &Route) -> Mounts {
        debug!(%route, "Mounting route");
        match route {
            Route::List => Mounts {
                catalog: Some(self.subscribe_catalog()),
                ..Mounts::default()
            },
            Route::Detail { coin_id, tab } => Mounts {
                catalog: None,
                info: Some(self.subscribe_info(coin_id)),
                market: Some(self.subscribe_market(coin_id)),
                ohlcv: tab.map(|tab| self.subscribe_ohlcv(coin_id, window_for(tab))),
            },
        }
    }

    /// Relance immédiatement toutes les requêtes de `route`
    pub fn retry(&self, route: &Route) {
        match route {
            Route::List => {
                self.catalog.refetch(&QueryKey::Catalog);
            }
            Route::Detail { coin_id, tab } => {
                self.info.refetch(&QueryKey::CoinInfo(coin_id.clone()));
                self.market.refetch(&QueryKey::Ticker(coin_id.clone()));
                if let Some(tab) = tab {
                    self.ohlcv.refetch(&QueryKey::ohlcv(coin_id, window_for(*tab)));
                }
            }
        }
    }

    pub fn catalog_state(&self) -> Option<QueryState<Vec<Coin>>> {
        self.catalog.state(&QueryKey::Catalog)
    }

    pub fn info_state(&self, coin_id: &str) -> Option<QueryState<CoinInfo>> {
        self.info.state(&QueryKey::CoinInfo(coin_id.to_string()))
    }

    pub fn market_state(&self, coin_id: &str) -> Option<QueryState<CoinMarket>> {
        self.market.state(&QueryKey::Ticker(coin_id.to_string()))
    }

    pub fn ohlcv_state(&self, coin_id: &str, window: OhlcvWindow) -> Option<QueryState<Vec<OhlcvPoint>>> {
        self.ohlcv.state(&QueryKey::ohlcv(coin_id, window))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeSource;
    use std::sync::atomic::Ordering;
    use tokio::time::sleep;

    const REFRESH: Duration = Duration::from_millis(5000);

    fn data_with(source: Arc<FakeSource>) -> CoinData {
        CoinData::new(source, REFRESH, Handle::current())
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_mount_fetches_catalog_only() {
        let source = Arc::new(FakeSource::with_catalog(5));
        let data = data_with(source.clone());

        let mounts = data.mount(&Route::List);
        assert!(mounts.catalog.is_some());
        assert!(mounts.info.is_none());

        sleep(Duration::from_millis(1)).await;
        assert_eq!(data.catalog_state().unwrap().data.unwrap().len(), 5);

        // Pas de polling du catalogue
        sleep(REFRESH * 3).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_without_tab_has_no_panel_fetch() {
        let source = Arc::new(FakeSource::with_catalog(3));
        let data = data_with(source.clone());

        let _mounts = data.mount(&Route::detail("c1-coin", None));
        sleep(Duration::from_millis(1)).await;

        assert!(data.info_state("c1-coin").unwrap().data.is_some());
        assert!(data.market_state("c1-coin").unwrap().data.is_some());
        assert!(data.ohlcv.active_keys().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_coins_same_window_do_not_collide() {
        let source = Arc::new(FakeSource::with_catalog(20));
        let data = data_with(source);

        let _btc = data.subscribe_ohlcv("c1-coin", OhlcvWindow::TwoWeeks);
        let _eth = data.subscribe_ohlcv("c12-coin", OhlcvWindow::TwoWeeks);
        sleep(Duration::from_millis(1)).await;
        sleep(REFRESH).await;

        let btc = data.ohlcv_state("c1-coin", OhlcvWindow::TwoWeeks).unwrap().data.unwrap();
        let eth = data.ohlcv_state("c12-coin", OhlcvWindow::TwoWeeks).unwrap().data.unwrap();
        // Prix de base : longueur de l'id × 100
        assert_eq!(btc[0].open, 700.0);
        assert_eq!(eth[0].open, 800.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_price_and_chart_windows_do_not_collide() {
        let source = Arc::new(FakeSource::with_catalog(3));
        let data = data_with(source);

        let _chart = data.mount(&Route::detail("c1-coin", Some(Tab::Chart)));
        let _price = data.mount(&Route::detail("c1-coin", Some(Tab::Price)));
        sleep(Duration::from_millis(1)).await;

        let chart = data.ohlcv_state("c1-coin", OhlcvWindow::TwoWeeks).unwrap().data.unwrap();
        let price = data.ohlcv_state("c1-coin", OhlcvWindow::OneYear).unwrap().data.unwrap();
        assert_eq!(chart.len(), 14);
        assert_eq!(price.len(), 365);

        // Métadonnées partagées : un seul abonnement par clé, deux abonnés
        assert_eq!(data.info.subscriber_count(&QueryKey::CoinInfo("c1-coin".into())), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_switch_keeps_detail_cache() {
        let source = Arc::new(FakeSource::with_catalog(3));
        let data = data_with(source);

        let mut mounts = data.mount(&Route::detail("c1-coin", Some(Tab::Chart)));
        sleep(Duration::from_millis(1)).await;

        // Le nouveau montage est créé avant que l'ancien soit drop
        mounts = {
            let next = data.mount(&Route::detail("c1-coin", Some(Tab::Price)));
            drop(mounts);
            next
        };

        let info = data.info_state("c1-coin").unwrap();
        assert!(!info.is_loading);
        assert!(data.ohlcv_state("c1-coin", OhlcvWindow::TwoWeeks).is_none());
        assert!(data.ohlcv_state("c1-coin", OhlcvWindow::OneYear).unwrap().is_loading);

        drop(mounts);
        assert!(data.info.active_keys().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_failure() {
        let source = Arc::new(FakeSource::with_catalog(3));
        source.fail("c1-coin");
        let data = data_with(source.clone());

        let route = Route::detail("c1-coin", None);
        let _mounts = data.mount(&route);
        sleep(Duration::from_millis(1)).await;
        assert!(data.info_state("c1-coin").unwrap().is_failed());

        source.failing.lock().unwrap().clear();
        data.retry(&route);
        sleep(Duration::from_millis(1)).await;

        let info = data.info_state("c1-coin").unwrap();
        assert!(info.data.is_some());
        assert!(!info.is_error());
    }
}
