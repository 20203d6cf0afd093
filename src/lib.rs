// ============================================================================
// Hindsight - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // API CryptoCompare
pub mod models;    // Cryptos, simulation, formatage
pub mod config;    // Arguments de la ligne de commande
pub mod app;       // État de l'application
pub mod ui;        // Interface utilisateur
