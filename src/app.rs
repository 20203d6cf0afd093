// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
//
// Le total (worth) est toujours la somme des valeurs des cryptos dévoilées :
// chaque crypto n'y contribue qu'une fois, au moment où elle est dévoilée.
// ============================================================================

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::Coin;

/// Nombre de cartes par ligne dans la grille des cryptos
pub const GRID_COLUMNS: usize = 3;

/// Contenu de la zone des cryptos
///
/// CONCEPT RUST : Enum dérivée de l'état
/// - Calculée à la demande, jamais stockée
/// - Le rendu fait un match exhaustif dessus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinArea {
    /// Le chargement a échoué : message d'erreur, aucune carte
    Error,

    /// En attente des prix
    Loading,

    /// Cartes des cryptos
    Coins,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Date de l'investissement simulé
    pub historical_date: NaiveDate,

    /// Montant total investi (USD)
    pub total_investment: f64,

    /// Nombre de cryptos demandées
    pub total_coins: usize,

    /// Cryptos chargées (vide pendant le chargement ou après une erreur)
    pub coins: Vec<Coin>,

    /// Valeur actuelle cumulée des cryptos dévoilées
    pub worth: f64,

    /// Le dernier chargement a échoué
    pub has_error: bool,

    /// Un chargement est en cours
    pub is_loading: bool,

    /// Index de la carte sélectionnée
    pub selected_index: usize,

    /// Numéro du chargement en cours
    /// CONCEPT : Génération
    /// - Incrémenté à chaque nouveau tirage
    /// - Un résultat d'une génération passée est ignoré
    pub generation: u64,

    /// Two-step quit : première pression de 'q' = confirmation demandée
    pub confirm_quit: bool,
}

impl App {
    /// Crée l'application pour la date historique donnée
    ///
    /// L'état initial est "en chargement" : le premier fetch porte la
    /// génération 0.
    pub fn new(config: &Config, historical_date: NaiveDate) -> Self {
        Self {
            running: true,
            historical_date,
            total_investment: config.investment.total,
            total_coins: config.investment.coins,
            coins: Vec::new(),
            worth: 0.0,
            has_error: false,
            is_loading: true,
            selected_index: 0,
            generation: 0,
            confirm_quit: false,
        }
    }

    /// Montant investi dans chaque crypto
    pub fn invested_per_coin(&self) -> f64 {
        self.total_investment / self.total_coins as f64
    }

    /// Contenu à afficher dans la zone des cryptos
    pub fn coin_area(&self) -> CoinArea {
        if self.has_error {
            CoinArea::Error
        } else if self.coins.is_empty() {
            CoinArea::Loading
        } else {
            CoinArea::Coins
        }
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    /// "Show me the money!" : nouveau tirage
    ///
    /// Remet le total à zéro, vide les cryptos, change la date et efface
    /// l'erreur. Retourne la génération du chargement à lancer.
    pub fn show_me_the_money(&mut self, historical_date: NaiveDate) -> u64 {
        self.generation += 1;
        self.worth = 0.0;
        self.coins.clear();
        self.historical_date = historical_date;
        self.has_error = false;
        self.is_loading = true;
        self.selected_index = 0;

        info!(generation = self.generation, %historical_date, "New draw requested");
        self.generation
    }

    /// Installe les cryptos chargées si elles sont de la génération courante
    pub fn coins_loaded(&mut self, generation: u64, coins: Vec<Coin>) {
        if generation != self.generation {
            warn!(generation, current = self.generation, "Dropping stale coin results");
            return;
        }

        debug!(generation, coins = coins.len(), "Coins installed");
        self.coins = coins;
        self.is_loading = false;
        self.selected_index = 0;
    }

    /// Passe en état d'erreur si l'échec concerne la génération courante
    pub fn load_failed(&mut self, generation: u64) {
        if generation != self.generation {
            warn!(generation, current = self.generation, "Dropping stale load failure");
            return;
        }

        self.has_error = true;
        self.is_loading = false;
    }

    // ========================================================================
    // Total
    // ========================================================================

    /// Ajoute une valeur au total
    pub fn update_worth(&mut self, value: f64) {
        self.worth += value;
    }

    /// Dévoile la crypto sélectionnée
    ///
    /// Retourne la valeur ajoutée au total (None si déjà dévoilée).
    pub fn reveal_selected(&mut self) -> Option<f64> {
        let invested = self.invested_per_coin();
        let coin = self.coins.get_mut(self.selected_index)?;

        if !coin.reveal() {
            return None;
        }

        let value = coin.value(invested);
        info!(symbol = %coin.symbol, value, "Coin revealed");
        self.update_worth(value);
        Some(value)
    }

    /// Dévoile toutes les cryptos encore cachées
    pub fn reveal_all(&mut self) -> f64 {
        let invested = self.invested_per_coin();
        let added: f64 = self
            .coins
            .iter_mut()
            .filter_map(|coin| coin.reveal().then(|| coin.value(invested)))
            .sum();

        self.update_worth(added);
        added
    }

    /// Nombre de cryptos dévoilées
    pub fn revealed_count(&self) -> usize {
        self.coins.iter().filter(|c| c.revealed).count()
    }

    // ========================================================================
    // Navigation dans la grille
    // ========================================================================

    pub fn navigate_left(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_right(&mut self) {
        let max_index = self.coins.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    pub fn navigate_up(&mut self) {
        if self.selected_index >= GRID_COLUMNS {
            self.selected_index -= GRID_COLUMNS;
        }
    }

    pub fn navigate_down(&mut self) {
        if self.selected_index + GRID_COLUMNS < self.coins.len() {
            self.selected_index += GRID_COLUMNS;
        }
    }

    /// Retourne la crypto sélectionnée
    pub fn selected_coin(&self) -> Option<&Coin> {
        self.coins.get(self.selected_index)
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
