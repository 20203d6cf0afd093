// ============================================================================
// Module : api
// ============================================================================
// Client de l'API de prix (CryptoCompare)
// ============================================================================

pub mod cryptocompare;  // Prix historiques et actuels

// Re-export des fonctions principales
pub use cryptocompare::{fetch_random_coins, PriceClient, DEFAULT_BASE_URL};
