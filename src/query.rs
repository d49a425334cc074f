// ============================================================================
// QueryClient : polling coordonné par clé
// ============================================================================
// Chaque ressource distante (catalogue, métadonnées, cotation, historique)
// est identifiée par une clé typée. Pour une clé donnée :
// - une seule boucle de polling, quel que soit le nombre d'abonnés
// - compteur de références : le dernier abonné qui se désabonne annule la
//   boucle et supprime l'entrée
// - jamais deux requêtes en vol pour la même clé (le tick suivant attend la
//   fin de la requête précédente)
//
// CONCEPTS RUST :
// 1. Arc<Mutex<..>> : cache partagé entre le thread UI et les tâches tokio
// 2. RAII : `Subscription` se désabonne dans son Drop
// 3. Weak : la tâche de polling ne garde pas le client en vie
// 4. Génériques : QueryClient<K, T> pour chaque type de ressource
// ============================================================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Future renvoyée par un producteur
pub type QueryFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Fonction qui lance un fetch ; appelée à chaque tick
pub type Producer<T> = Arc<dyn Fn() -> QueryFuture<T> + Send + Sync>;

/// Construit un `Producer` à partir d'une closure async
pub fn producer<T, F, Fut>(f: F) -> Producer<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move || -> QueryFuture<T> { Box::pin(f()) })
}

// ============================================================================
// QueryState : ce que voit le rendu
// ============================================================================

/// Instantané d'une requête
///
/// - `is_loading` : vrai uniquement avant le tout premier résultat
/// - `data` : dernière valeur reçue avec succès (conservée en cas d'erreur)
/// - `error` : erreur du dernier fetch, effacée au succès suivant
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub is_loading: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryState<T> {
    fn loading() -> Self {
        Self {
            is_loading: true,
            data: None,
            error: None,
            updated_at: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Erreur sans aucune donnée à afficher
    pub fn is_failed(&self) -> bool {
        !self.is_loading && self.data.is_none() && self.error.is_some()
    }
}

// ============================================================================
// Table interne
// ============================================================================

struct Entry<T> {
    subscribers: usize,
    /// Distingue un remontage d'une ancienne entrée de même clé
    generation: u64,
    state: QueryState<T>,
    wake: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

struct Table<K, T> {
    entries: HashMap<K, Entry<T>>,
    next_generation: u64,
}

struct Inner<K, T> {
    name: &'static str,
    runtime: Handle,
    table: Mutex<Table<K, T>>,
}

impl<K, T> Inner<K, T>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    T: Send + 'static,
{
    /// Le cache reste lisible même si un thread a paniqué en le tenant
    fn lock(&self) -> MutexGuard<'_, Table<K, T>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Écrit un résultat ; retourne false si l'entrée n'existe plus
    fn store(&self, key: &K, generation: u64, result: Result<T>) -> bool {
        let mut table = self.lock();

        let entry = match table.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => entry,
            _ => {
                debug!(query = self.name, ?key, "Discarding result for unmounted query");
                return false;
            }
        };

        match result {
            Ok(data) => {
                entry.state.data = Some(data);
                entry.state.error = None;
                entry.state.updated_at = Some(Utc::now());
            }
            Err(e) => {
                warn!(query = self.name, ?key, error = %format!("{:#}", e), "Query fetch failed");
                entry.state.error = Some(format!("{:#}", e));
            }
        }
        entry.state.is_loading = false;

        true
    }

    fn release(&self, key: &K) {
        let mut table = self.lock();

        let remaining = match table.entries.get_mut(key) {
            Some(entry) => {
                entry.subscribers = entry.subscribers.saturating_sub(1);
                entry.subscribers
            }
            None => return,
        };

        if remaining == 0 {
            if let Some(entry) = table.entries.remove(key) {
                if let Some(task) = entry.task {
                    task.abort();
                }
            }
            debug!(query = self.name, ?key, "Last subscriber left, polling stopped");
        }
    }
}

// ============================================================================
// QueryClient
// ============================================================================

/// Cache + ordonnanceur de polling pour un type de ressource
pub struct QueryClient<K, T> {
    inner: Arc<Inner<K, T>>,
}

impl<K, T> Clone for QueryClient<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, T> QueryClient<K, T>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    T: Clone + Send + 'static,
{
    /// Crée un client ; les boucles de polling tournent sur `runtime`
    pub fn new(name: &'static str, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                runtime,
                table: Mutex::new(Table {
                    entries: HashMap::new(),
                    next_generation: 0,
                }),
            }),
        }
    }

    /// S'abonne à `key`
    ///
    /// - Premier abonné : crée l'entrée (état loading) et démarre la boucle
    /// - Abonnés suivants : incrémente le compteur, le producteur est ignoré
    /// - `interval = None` : un seul fetch (plus `refetch` manuel)
    pub fn subscribe(&self, key: K, producer: Producer<T>, interval: Option<Duration>) -> Subscription<K, T> {
        let mut table = self.inner.lock();

        if let Some(entry) = table.entries.get_mut(&key) {
            entry.subscribers += 1;
            debug!(query = self.inner.name, ?key, subscribers = entry.subscribers, "Joined existing query");
        } else {
            let generation = table.next_generation;
            table.next_generation += 1;

            let wake = Arc::new(Notify::new());
            let task = self.inner.runtime.spawn(poll_loop(
                Arc::downgrade(&self.inner),
                key.clone(),
                generation,
                producer,
                interval,
                wake.clone(),
            ));

            table.entries.insert(
                key.clone(),
                Entry {
                    subscribers: 1,
                    generation,
                    state: QueryState::loading(),
                    wake,
                    task: Some(task),
                },
            );
            info!(query = self.inner.name, ?key, ?interval, "Started polling");
        }

        Subscription {
            key,
            inner: self.inner.clone(),
        }
    }

    /// Instantané de l'état (None si personne n'est abonné à `key`)
    pub fn state(&self, key: &K) -> Option<QueryState<T>> {
        self.inner.lock().entries.get(key).map(|entry| entry.state.clone())
    }

    /// Déclenche un fetch immédiat ; retourne false si la clé n'est pas montée
    pub fn refetch(&self, key: &K) -> bool {
        match self.inner.lock().entries.get(key) {
            Some(entry) => {
                debug!(query = self.inner.name, ?key, "Manual refetch requested");
                entry.wake.notify_one();
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self, key: &K) -> usize {
        self.inner
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.subscribers)
            .unwrap_or(0)
    }

    pub fn active_keys(&self) -> Vec<K> {
        self.inner.lock().entries.keys().cloned().collect()
    }
}

/// Boucle de polling d'une clé
///
/// Le tick suivant n'est attendu qu'après la résolution du fetch : pas de
/// requêtes qui se chevauchent, les ticks manqués sont retardés.
async fn poll_loop<K, T>(
    inner: Weak<Inner<K, T>>,
    key: K,
    generation: u64,
    producer: Producer<T>,
    interval: Option<Duration>,
    wake: Arc<Notify>,
) where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    T: Send + 'static,
{
    let mut ticker = interval.map(|period| {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    // Le premier tick d'un Interval est immédiat
    if let Some(ticker) = ticker.as_mut() {
        ticker.tick().await;
    }

    loop {
        let result = producer().await;

        match inner.upgrade() {
            Some(inner) => {
                if !inner.store(&key, generation, result) {
                    return;
                }
            }
            None => return,
        }

        match ticker.as_mut() {
            Some(ticker) => {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = wake.notified() => ticker.reset(),
                }
            }
            None => wake.notified().await,
        }
    }
}

// ============================================================================
// Subscription (RAII)
// ============================================================================

/// Abonnement à une clé ; se désabonne quand il est drop
pub struct Subscription<K, T>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    T: Send + 'static,
{
    key: K,
    inner: Arc<Inner<K, T>>,
}

impl<K, T> Drop for Subscription<K, T>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    T: Send + 'static,
{
    fn drop(&mut self) {
        self.inner.release(&self.key);
    }
}

impl<K, T> Debug for Subscription<K, T>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    T: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("query", &self.inner.name)
            .field("key", &self.key)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
// CONCEPT : start_paused
// - L'horloge tokio est figée et avance automatiquement quand toutes les
//   tâches attendent : 5 secondes de polling s'exécutent instantanément
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    const REFRESH: Duration = Duration::from_millis(5000);

    fn counting(calls: Arc<AtomicUsize>) -> Producer<usize> {
        producer(move || {
            let calls = calls.clone();
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        })
    }

    fn client() -> QueryClient<&'static str, usize> {
        QueryClient::new("test", Handle::current())
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_load_then_data() {
        let client = client();
        let calls = Arc::new(AtomicUsize::new(0));

        let _sub = client.subscribe("a", counting(calls.clone()), Some(REFRESH));
        let state = client.state(&"a").unwrap();
        assert!(state.is_loading);
        assert!(state.data.is_none());

        sleep(Duration::from_millis(1)).await;
        let state = client.state(&"a").unwrap();
        assert!(!state.is_loading);
        assert_eq!(state.data, Some(1));
        assert!(!state.is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_replaces_data() {
        let client = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let _sub = client.subscribe("a", counting(calls.clone()), Some(REFRESH));

        sleep(Duration::from_millis(1)).await;
        assert_eq!(client.state(&"a").unwrap().data, Some(1));

        sleep(REFRESH).await;
        assert_eq!(client.state(&"a").unwrap().data, Some(2));

        sleep(REFRESH * 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ref_counted_single_loop() {
        let client = client();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = client.subscribe("a", counting(calls.clone()), Some(REFRESH));
        let second = client.subscribe("a", counting(calls.clone()), Some(REFRESH));
        assert_eq!(client.subscriber_count(&"a"), 2);

        sleep(Duration::from_millis(1)).await;
        // Une seule boucle malgré deux abonnés
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(first);
        assert_eq!(client.subscriber_count(&"a"), 1);
        assert!(client.state(&"a").is_some());

        drop(second);
        assert!(client.active_keys().is_empty());
        assert!(client.state(&"a").is_none());

        // La boucle est annulée : plus aucun fetch
        sleep(REFRESH * 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_last_good_data() {
        let client: QueryClient<&'static str, usize> = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let flaky = producer(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    Ok(42)
                } else {
                    anyhow::bail!("HTTP 503")
                }
            }
        });

        let _sub = client.subscribe("a", flaky, Some(REFRESH));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(client.state(&"a").unwrap().data, Some(42));

        sleep(REFRESH).await;
        let state = client.state(&"a").unwrap();
        assert_eq!(state.data, Some(42));
        assert!(state.is_error());
        assert!(!state.is_failed());
        assert!(state.error.unwrap().contains("503"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_load_failure() {
        let client = client();
        let failing = producer(|| async { anyhow::bail!("connection refused") });

        let _sub = client.subscribe("a", failing, Some(REFRESH));
        sleep(Duration::from_millis(1)).await;

        let state = client.state(&"a").unwrap();
        assert!(!state.is_loading);
        assert!(state.data.is_none());
        assert!(state.is_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_once_and_manual_refetch() {
        let client = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let _sub = client.subscribe("catalog", counting(calls.clone()), None);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(client.refetch(&"catalog"));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.state(&"catalog").unwrap().data, Some(2));

        assert!(!client.refetch(&"missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_does_not_overlap() {
        let client = client();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let (current, max) = (in_flight.clone(), max_in_flight.clone());

        // Le fetch dure plus longtemps que l'intervalle
        let slow = producer(move || {
            let (current, max) = (current.clone(), max.clone());
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_secs(12)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(0)
            }
        });

        let _sub = client.subscribe("a", slow, Some(REFRESH));
        sleep(Duration::from_secs(60)).await;
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remount_ignores_stale_result() {
        let client: QueryClient<&'static str, usize> = client();

        let slow = producer(|| async {
            sleep(Duration::from_secs(1)).await;
            Ok(1)
        });
        let sub = client.subscribe("a", slow, Some(REFRESH));
        sleep(Duration::from_millis(10)).await;
        drop(sub);

        let fast = producer(|| async { Ok(2) });
        let _sub = client.subscribe("a", fast, Some(REFRESH));

        sleep(Duration::from_secs(2)).await;
        assert_eq!(client.state(&"a").unwrap().data, Some(2));
    }
}
