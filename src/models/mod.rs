// ============================================================================
// Module : models
// ============================================================================
// Structures de données et calculs de la simulation
// ============================================================================

pub mod coin;       // Crypto sélectionnée + catalogue fixe
pub mod simulation; // Date historique, tirage, formatage

// Re-export des structures principales pour simplifier les imports
// On peut faire : use hindsight::models::Coin;
pub use coin::{Coin, CoinInfo, COIN_CATALOG};
pub use simulation::{
    default_earliest_date, format_currency, format_long_date, format_price, format_whole_dollars,
    pick_coins,
    random_historical_date, Investment, InvestmentError, TOTAL_COINS, TOTAL_INVESTMENT,
};
