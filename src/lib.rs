// ============================================================================
// LazyCoin - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // API coinpaprika
pub mod models; // Structures de données
pub mod query;  // Polling coordonné par clé
pub mod data;   // Clés de cache et abonnements par écran
pub mod router; // Chemins → écrans
pub mod theme;  // Mode clair / sombre
pub mod config; // Ligne de commande
pub mod app;    // État de l'application
pub mod ui;     // Interface utilisateur
