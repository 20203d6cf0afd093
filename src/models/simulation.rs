// ============================================================================
// Simulation : date historique, tirage des cryptos, formatage
// ============================================================================
// Petites fonctions pures utilisées par l'application :
// - tirage d'une date historique au hasard
// - tirage de N cryptos distinctes dans le catalogue
// - formatage monétaire en-US ("$1,234.50") et date longue ("January 5, 2018")
//
// CONCEPT RUST : Générique sur le générateur aléatoire
// - `R: Rng + ?Sized` accepte thread_rng() en production
//   et un StdRng avec seed fixe dans les tests (résultats déterministes)
// ============================================================================

use chrono::{Days, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::models::CoinInfo;

/// Montant investi au total par défaut (USD)
pub const TOTAL_INVESTMENT: f64 = 1000.0;

/// Nombre de cryptos par défaut
pub const TOTAL_COINS: usize = 6;

/// Borne basse par défaut de la date historique
pub fn default_earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Tire une date au hasard dans [earliest, latest]
///
/// Si l'intervalle est vide ou inversé, retourne `earliest`.
pub fn random_historical_date<R: Rng + ?Sized>(
    rng: &mut R,
    earliest: NaiveDate,
    latest: NaiveDate,
) -> NaiveDate {
    let span = (latest - earliest).num_days();
    if span <= 0 {
        return earliest;
    }

    let offset = rng.gen_range(0..=span) as u64;
    earliest.checked_add_days(Days::new(offset)).unwrap_or(earliest)
}

/// Tire `count` cryptos distinctes dans le catalogue
///
/// `count` est borné à la taille du catalogue.
pub fn pick_coins<R: Rng + ?Sized>(rng: &mut R, catalog: &[CoinInfo], count: usize) -> Vec<CoinInfo> {
    catalog.choose_multiple(rng, count).copied().collect()
}

/// Formate un montant en dollars à la manière en-US
///
/// ```
/// use hindsight::models::format_currency;
/// assert_eq!(format_currency(1234.5), "$1,234.50");
/// ```
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "N/A".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let remainder = cents % 100;

    // Groupe les milliers de droite à gauche
    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, remainder)
}

/// Formate un prix unitaire
///
/// Sous 1$, les centimes ne suffisent pas (DOGE valait 0.0002$ en 2015) :
/// jusqu'à 6 décimales, zéros finaux retirés, au moins 2 décimales.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() || price.abs() >= 1.0 || price == 0.0 {
        return format_currency(price);
    }

    let digits = format!("{:.6}", price.abs());
    let trimmed = digits.trim_end_matches('0');
    let decimals = trimmed.split('.').nth(1).map(str::len).unwrap_or(0);
    let padded = if decimals < 2 {
        format!("{:.2}", price.abs())
    } else {
        trimmed.to_string()
    };

    // Arrondi à 6 décimales qui tombe à zéro
    if padded.trim_start_matches(['0', '.']).is_empty() {
        return "< $0.000001".to_string();
    }

    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}${}", sign, padded)
}

/// Montant sans centimes quand il est rond ("$1,000"), sinon `format_currency`
pub fn format_whole_dollars(amount: f64) -> String {
    let formatted = format_currency(amount);
    match formatted.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

/// Formate une date en forme longue en-US ("January 5, 2018")
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Erreurs de paramétrage d'un investissement
#[derive(Debug, Error, PartialEq)]
pub enum InvestmentError {
    #[error("le montant investi doit être positif (reçu {0})")]
    InvalidAmount(f64),

    #[error("il faut au moins une crypto")]
    NoCoins,

    #[error("au plus {max} cryptos disponibles (demandé {requested})")]
    TooManyCoins { requested: usize, max: usize },
}

/// Paramètres de l'investissement simulé
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Investment {
    /// Montant total investi (USD)
    pub total: f64,

    /// Nombre de cryptos entre lesquelles il est réparti
    pub coins: usize,
}

impl Investment {
    /// Valide et crée un investissement
    pub fn new(total: f64, coins: usize, catalog_size: usize) -> Result<Self, InvestmentError> {
        if !total.is_finite() || total <= 0.0 {
            return Err(InvestmentError::InvalidAmount(total));
        }
        if coins == 0 {
            return Err(InvestmentError::NoCoins);
        }
        if coins > catalog_size {
            return Err(InvestmentError::TooManyCoins {
                requested: coins,
                max: catalog_size,
            });
        }
        Ok(Self { total, coins })
    }

    /// Montant investi dans chaque crypto
    pub fn per_coin(&self) -> f64 {
        self.total / self.coins as f64
    }
}

impl Default for Investment {
    fn default() -> Self {
        Self {
            total: TOTAL_INVESTMENT,
            coins: TOTAL_COINS,
        }
    }
}
