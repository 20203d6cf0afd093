// ============================================================================
// Configuration : arguments de la ligne de commande
// ============================================================================
// CONCEPT RUST : clap derive
// - #[derive(Parser)] génère le parsing à partir de la structure
// - Chaque champ devient une option (--amount, --coins, ...)
// - Les doc comments deviennent l'aide (--help)
// ============================================================================

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;
use crate::models::{default_earliest_date, Investment, InvestmentError, COIN_CATALOG};

/// Et si j'avais investi dans des cryptos au hasard ?
#[derive(Debug, Parser)]
#[command(name = "hindsight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Montant total investi en USD
    #[arg(long, default_value_t = crate::models::TOTAL_INVESTMENT)]
    pub amount: f64,

    /// Nombre de cryptos tirées au sort
    #[arg(long, default_value_t = crate::models::TOTAL_COINS)]
    pub coins: usize,

    /// Date la plus ancienne possible (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub since: Option<NaiveDate>,

    /// Date historique fixe au lieu d'une date au hasard (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// URL de base de l'API CryptoCompare
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Répertoire des logs (défaut : ~/.local/share/hindsight/logs)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Erreurs de validation de la configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Investment(#[from] InvestmentError),

    #[error("la date de début {since} est dans le futur")]
    SinceInFuture { since: NaiveDate },

    #[error("la date {date} doit être entre {since} et {latest}")]
    DateOutOfRange {
        date: NaiveDate,
        since: NaiveDate,
        latest: NaiveDate,
    },
}

/// Configuration validée de l'application
#[derive(Debug, Clone)]
pub struct Config {
    pub investment: Investment,

    /// Borne basse de la date historique
    pub earliest: NaiveDate,

    /// Borne haute de la date historique (hier)
    pub latest: NaiveDate,

    /// Date fixée par l'utilisateur (sinon tirée au hasard)
    pub fixed_date: Option<NaiveDate>,

    pub api_url: String,

    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Valide les arguments, avec `today` comme date du jour
    pub fn into_config_at(self, today: NaiveDate) -> Result<Config, ConfigError> {
        let investment = Investment::new(self.amount, self.coins, COIN_CATALOG.len())?;

        let latest = today.pred_opt().unwrap_or(today);
        let earliest = self.since.unwrap_or_else(default_earliest_date);
        if earliest > latest {
            return Err(ConfigError::SinceInFuture { since: earliest });
        }

        if let Some(date) = self.date {
            if date < earliest || date > latest {
                return Err(ConfigError::DateOutOfRange {
                    date,
                    since: earliest,
                    latest,
                });
            }
        }

        Ok(Config {
            investment,
            earliest,
            latest,
            fixed_date: self.date,
            api_url: self.api_url,
            log_dir: self.log_dir,
        })
    }

    /// Valide les arguments par rapport à la date UTC courante
    pub fn into_config(self) -> Result<Config, ConfigError> {
        self.into_config_at(Utc::now().date_naive())
    }
}

impl Default for Config {
    fn default() -> Self {
        let today = Utc::now().date_naive();
        Self {
            investment: Investment::default(),
            earliest: default_earliest_date(),
            latest: today.pred_opt().unwrap_or(today),
            fixed_date: None,
            api_url: DEFAULT_BASE_URL.to_string(),
            log_dir: None,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("date invalide '{}' : {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["hindsight"]);
        let config = cli.into_config_at(today()).unwrap();

        assert_eq!(config.investment.total, 1000.0);
        assert_eq!(config.investment.coins, 6);
        assert_eq!(config.earliest, date(2015, 1, 1));
        assert_eq!(config.latest, date(2024, 6, 14));
        assert_eq!(config.fixed_date, None);
        assert_eq!(config.api_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_custom_arguments() {
        let cli = Cli::parse_from([
            "hindsight",
            "--amount",
            "500",
            "--coins",
            "4",
            "--since",
            "2017-01-01",
            "--date",
            "2018-01-05",
        ]);
        let config = cli.into_config_at(today()).unwrap();

        assert_eq!(config.investment.per_coin(), 125.0);
        assert_eq!(config.earliest, date(2017, 1, 1));
        assert_eq!(config.fixed_date, Some(date(2018, 1, 5)));
    }

    #[test]
    fn test_invalid_date_format() {
        assert!(Cli::try_parse_from(["hindsight", "--since", "01/01/2017"]).is_err());
    }

    #[test]
    fn test_validation_errors() {
        let cli = Cli::parse_from(["hindsight", "--coins", "0"]);
        assert_eq!(
            cli.into_config_at(today()).unwrap_err(),
            ConfigError::Investment(InvestmentError::NoCoins)
        );

        let cli = Cli::parse_from(["hindsight", "--since", "2030-01-01"]);
        assert!(matches!(
            cli.into_config_at(today()),
            Err(ConfigError::SinceInFuture { .. })
        ));

        let cli = Cli::parse_from(["hindsight", "--date", "2014-01-01"]);
        assert!(matches!(
            cli.into_config_at(today()),
            Err(ConfigError::DateOutOfRange { .. })
        ));
    }
}
