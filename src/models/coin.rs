// ============================================================================
// Structure : Coin
// ============================================================================
// Une crypto tirée au sort, avec son prix à la date historique et son prix
// actuel. La valeur actuelle de l'investissement se déduit de ces deux prix.
//
// CONCEPTS RUST :
// 1. &'static str : le catalogue est une constante, pas d'allocation
// 2. Option<f64> : le multiplicateur n'existe pas si la crypto n'était pas cotée
// ============================================================================

/// Entrée du catalogue fixe de cryptos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinInfo {
    /// Symbole (ex: "BTC")
    pub symbol: &'static str,

    /// Nom complet (ex: "Bitcoin")
    pub name: &'static str,
}

impl CoinInfo {
    pub const fn new(symbol: &'static str, name: &'static str) -> Self {
        Self { symbol, name }
    }
}

/// Catalogue dans lequel les cryptos sont tirées au sort
///
/// Certaines n'existaient pas encore en 2015 : leur prix historique vaut 0
/// et l'argent reste alors dans le portefeuille (voir `Coin::value`).
pub const COIN_CATALOG: [CoinInfo; 20] = [
    CoinInfo::new("BTC", "Bitcoin"),
    CoinInfo::new("ETH", "Ethereum"),
    CoinInfo::new("XRP", "Ripple"),
    CoinInfo::new("LTC", "Litecoin"),
    CoinInfo::new("BCH", "Bitcoin Cash"),
    CoinInfo::new("ADA", "Cardano"),
    CoinInfo::new("XLM", "Stellar"),
    CoinInfo::new("XMR", "Monero"),
    CoinInfo::new("DASH", "Dash"),
    CoinInfo::new("NEO", "NEO"),
    CoinInfo::new("EOS", "EOS"),
    CoinInfo::new("XEM", "NEM"),
    CoinInfo::new("ETC", "Ethereum Classic"),
    CoinInfo::new("ZEC", "Zcash"),
    CoinInfo::new("DOGE", "Dogecoin"),
    CoinInfo::new("TRX", "TRON"),
    CoinInfo::new("BNB", "Binance Coin"),
    CoinInfo::new("LINK", "Chainlink"),
    CoinInfo::new("XTZ", "Tezos"),
    CoinInfo::new("DOT", "Polkadot"),
];

/// Crypto sélectionnée avec ses deux prix chargés
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    /// Symbole (ex: "BTC")
    pub symbol: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// Prix en USD à la date historique (0 si pas encore cotée)
    pub price_then: f64,

    /// Prix en USD aujourd'hui
    pub price_now: f64,

    /// La valeur a-t-elle été dévoilée par l'utilisateur ?
    pub revealed: bool,
}

impl Coin {
    /// Crée une crypto encore cachée
    pub fn new(symbol: String, name: String, price_then: f64, price_now: f64) -> Self {
        Self {
            symbol,
            name,
            price_then,
            price_now,
            revealed: false,
        }
    }

    /// Crée une crypto depuis une entrée du catalogue
    pub fn from_info(info: CoinInfo, price_then: f64, price_now: f64) -> Self {
        Self::new(info.symbol.to_string(), info.name.to_string(), price_then, price_now)
    }

    /// La crypto était-elle cotée à la date historique ?
    pub fn is_listed(&self) -> bool {
        self.price_then.is_finite() && self.price_then > 0.0
    }

    /// Nombre d'unités achetées avec `invested` dollars
    pub fn units_bought(&self, invested: f64) -> f64 {
        if self.is_listed() {
            invested / self.price_then
        } else {
            0.0
        }
    }

    /// Valeur actuelle de la part investie dans cette crypto
    ///
    /// Si la crypto n'était pas encore cotée, rien n'a pu être acheté :
    /// le montant investi est restitué tel quel.
    pub fn value(&self, invested: f64) -> f64 {
        if self.is_listed() {
            self.units_bought(invested) * self.price_now
        } else {
            invested
        }
    }

    /// Facteur de multiplication entre les deux dates
    pub fn multiplier(&self) -> Option<f64> {
        self.is_listed().then(|| self.price_now / self.price_then)
    }

    /// Vrai si l'investissement n'a pas perdu d'argent
    pub fn is_positive(&self) -> bool {
        self.multiplier().map(|m| m >= 1.0).unwrap_or(true)
    }

    /// Dévoile la crypto
    ///
    /// Retourne true uniquement la première fois : une crypto ne compte
    /// qu'une seule fois dans le total.
    pub fn reveal(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        self.revealed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc() -> Coin {
        Coin::new("BTC".to_string(), "Bitcoin".to_string(), 250.0, 50_000.0)
    }

    #[test]
    fn test_value_scales_with_price() {
        let coin = btc();
        assert!(coin.is_listed());
        assert_eq!(coin.units_bought(500.0), 2.0);
        assert_eq!(coin.value(500.0), 100_000.0);
        assert_eq!(coin.multiplier(), Some(200.0));
        assert!(coin.is_positive());
    }

    #[test]
    fn test_losing_coin() {
        let coin = Coin::new("XEM".to_string(), "NEM".to_string(), 0.5, 0.25);
        assert_eq!(coin.value(100.0), 50.0);
        assert!(!coin.is_positive());
    }

    #[test]
    fn test_unlisted_coin_keeps_money() {
        let coin = Coin::new("DOT".to_string(), "Polkadot".to_string(), 0.0, 7.0);
        assert!(!coin.is_listed());
        assert_eq!(coin.units_bought(100.0), 0.0);
        assert_eq!(coin.value(100.0), 100.0);
        assert_eq!(coin.multiplier(), None);
        assert!(coin.is_positive());
    }

    #[test]
    fn test_reveal_only_once() {
        let mut coin = btc();
        assert!(!coin.revealed);
        assert!(coin.reveal());
        assert!(coin.revealed);
        assert!(!coin.reveal());
    }

    #[test]
    fn test_catalog_symbols_are_unique() {
        let mut symbols: Vec<&str> = COIN_CATALOG.iter().map(|c| c.symbol).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), COIN_CATALOG.len());
    }
}
