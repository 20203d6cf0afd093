// ============================================================================
// API Client : CryptoCompare
// ============================================================================
// Récupère le prix d'une crypto à une date donnée et son prix actuel
// depuis l'API publique min-api.cryptocompare.com
//
// Endpoints utilisés :
// - /data/pricehistorical?fsym=BTC&tsyms=USD&ts=1514764800
//     -> {"BTC": {"USD": 13657.2}}
// - /data/price?fsym=BTC&tsyms=USD
//     -> {"USD": 43210.5}
// - En cas d'erreur, l'API répond HTTP 200 avec :
//     -> {"Response": "Error", "Message": "..."}
//
// CONCEPTS RUST :
// 1. #[serde(untagged)] : essaie chaque variant jusqu'à ce qu'un match
// 2. tokio::try_join! : attend deux futures en parallèle, échoue à la 1re erreur
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{pick_coins, Coin, CoinInfo, COIN_CATALOG};

/// URL de production de l'API
pub const DEFAULT_BASE_URL: &str = "https://min-api.cryptocompare.com";

/// Devise dans laquelle tous les prix sont exprimés
const QUOTE_CURRENCY: &str = "USD";

// ============================================================================
// Structures pour parser les réponses JSON
// ============================================================================

/// Corps d'erreur renvoyé par CryptoCompare (avec un statut HTTP 200)
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "Response")]
    response: String,

    #[serde(rename = "Message")]
    message: String,
}

/// Réponse : soit une erreur, soit les données attendues
///
/// CONCEPT RUST : #[serde(untagged)]
/// - Pas de champ discriminant dans le JSON
/// - Serde essaie Error puis Data dans l'ordre
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse<T> {
    Error(ApiError),
    Data(T),
}

/// {"BTC": {"USD": 13657.2}}
type HistoricalPrices = HashMap<String, HashMap<String, f64>>;

/// {"USD": 43210.5}
type CurrentPrices = HashMap<String, f64>;

// ============================================================================
// Client
// ============================================================================

/// Client HTTP pour l'API de prix
#[derive(Debug, Clone)]
pub struct PriceClient {
    http: reqwest::Client,
    base_url: String,
}

impl PriceClient {
    /// Crée un client pointant vers `base_url` (sans slash final)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hindsight/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .context("Échec de la création du client HTTP")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "Price client created");

        Ok(Self { http, base_url })
    }

    /// Client pointant vers l'API de production
    pub fn production() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Prix en USD de `symbol` à la date `date` (minuit UTC)
    ///
    /// Une cotation absente ou nulle donne 0.0 : la crypto n'existait pas
    /// encore à cette date.
    #[instrument(skip(self))]
    pub async fn historical_price(&self, symbol: &str, date: NaiveDate) -> Result<f64> {
        let url = build_historical_url(&self.base_url, symbol, date);
        let body = self.get_text(&url).await?;
        let price = parse_historical_price(&body, symbol)?;

        if price == 0.0 {
            warn!(symbol, %date, "No historical quote, coin was probably not listed yet");
        }
        Ok(price)
    }

    /// Prix actuel en USD de `symbol`
    #[instrument(skip(self))]
    pub async fn current_price(&self, symbol: &str) -> Result<f64> {
        let url = build_current_url(&self.base_url, symbol);
        let body = self.get_text(&url).await?;
        parse_current_price(&body, symbol)
    }

    /// Charge les deux prix de chaque crypto sélectionnée
    ///
    /// L'ordre de la sélection est conservé. Une seule erreur fait échouer
    /// tout le lot : l'interface affiche alors l'état d'erreur.
    #[instrument(skip(self, selection), fields(count = selection.len()))]
    pub async fn fetch_coins(&self, selection: &[CoinInfo], date: NaiveDate) -> Result<Vec<Coin>> {
        let mut coins = Vec::with_capacity(selection.len());

        for (i, info) in selection.iter().enumerate() {
            debug!(symbol = info.symbol, progress = i + 1, total = selection.len(), "Fetching coin prices");

            // Les deux requêtes sont indépendantes : on les lance ensemble
            let (price_then, price_now) = tokio::try_join!(
                self.historical_price(info.symbol, date),
                self.current_price(info.symbol),
            )
            .with_context(|| format!("Échec du chargement des prix de {}", info.symbol))?;

            coins.push(Coin::from_info(*info, price_then, price_now));
        }

        info!(coins = coins.len(), %date, "Coins fetched successfully");
        Ok(coins)
    }

    /// GET + vérification du statut HTTP
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "Sending HTTP request to CryptoCompare");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Échec de la requête HTTP vers CryptoCompare")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "CryptoCompare returned error status");
            anyhow::bail!("CryptoCompare a retourné une erreur : HTTP {}", status);
        }

        response
            .text()
            .await
            .context("Échec de la lecture de la réponse CryptoCompare")
    }
}

/// Tire `count` cryptos au hasard puis charge leurs prix
///
/// Le tirage se fait avant la première requête : le générateur n'est pas
/// gardé pendant les appels réseau.
pub async fn fetch_random_coins<R: Rng + ?Sized>(
    client: &PriceClient,
    rng: &mut R,
    count: usize,
    date: NaiveDate,
) -> Result<Vec<Coin>> {
    let selection = pick_coins(rng, &COIN_CATALOG, count);
    let symbols: Vec<&str> = selection.iter().map(|c| c.symbol).collect();
    info!(?symbols, %date, "Coins picked");

    client.fetch_coins(&selection, date).await
}

// ============================================================================
// URLs
// ============================================================================

/// Timestamp Unix de minuit UTC pour la date donnée
fn unix_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn build_historical_url(base_url: &str, symbol: &str, date: NaiveDate) -> String {
    format!(
        "{}/data/pricehistorical?fsym={}&tsyms={}&ts={}",
        base_url,
        symbol,
        QUOTE_CURRENCY,
        unix_timestamp(date)
    )
}

fn build_current_url(base_url: &str, symbol: &str) -> String {
    format!("{}/data/price?fsym={}&tsyms={}", base_url, symbol, QUOTE_CURRENCY)
}

// ============================================================================
// Parsing
// ============================================================================

/// Désérialise une réponse et transforme le corps d'erreur en Err
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let parsed: ApiResponse<T> =
        serde_json::from_str(body).context("Échec du parsing JSON de la réponse CryptoCompare")?;

    match parsed {
        ApiResponse::Data(data) => Ok(data),
        ApiResponse::Error(err) => {
            error!(response = %err.response, message = %err.message, "CryptoCompare returned an error body");
            anyhow::bail!("CryptoCompare : {}", err.message)
        }
    }
}

fn parse_historical_price(body: &str, symbol: &str) -> Result<f64> {
    let prices: HistoricalPrices = parse_response(body)?;

    let price = prices
        .get(symbol)
        .and_then(|quotes| quotes.get(QUOTE_CURRENCY))
        .copied()
        .unwrap_or(0.0);

    Ok(price)
}

fn parse_current_price(body: &str, symbol: &str) -> Result<f64> {
    let prices: CurrentPrices = parse_response(body)?;

    prices
        .get(QUOTE_CURRENCY)
        .copied()
        .with_context(|| format!("Pas de prix actuel pour {}", symbol))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_build_urls() {
        let url = build_historical_url(DEFAULT_BASE_URL, "BTC", date(2018, 1, 1));
        assert_eq!(
            url,
            "https://min-api.cryptocompare.com/data/pricehistorical?fsym=BTC&tsyms=USD&ts=1514764800"
        );

        let url = build_current_url("http://localhost:1234", "ETH");
        assert_eq!(url, "http://localhost:1234/data/price?fsym=ETH&tsyms=USD");
    }

    #[test]
    fn test_parse_historical_price() {
        let body = r#"{"BTC":{"USD":13657.2}}"#;
        assert_eq!(parse_historical_price(body, "BTC").unwrap(), 13657.2);

        // Pas encore cotée
        let body = r#"{"DOT":{"USD":0}}"#;
        assert_eq!(parse_historical_price(body, "DOT").unwrap(), 0.0);
        assert_eq!(parse_historical_price("{}", "DOT").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_current_price() {
        assert_eq!(parse_current_price(r#"{"USD":43210.5}"#, "BTC").unwrap(), 43210.5);
        assert!(parse_current_price("{}", "BTC").is_err());
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"Response":"Error","Message":"fsym param is invalid","HasWarning":false,"Type":2,"Data":{}}"#;

        let err = parse_current_price(body, "NOPE").unwrap_err();
        assert!(err.to_string().contains("fsym param is invalid"));

        assert!(parse_historical_price(body, "NOPE").is_err());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_current_price("<html>", "BTC").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = PriceClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    // ------------------------------------------------------------------------
    // Serveur HTTP minimal pour tester le client de bout en bout
    // ------------------------------------------------------------------------

    /// Lance un serveur local qui répond via `handler(path) -> (status, body)`
    async fn spawn_stub(handler: fn(&str) -> (u16, String)) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                    let (status, body) = handler(&path);
                    let response = format!(
                        "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    fn query_symbol(path: &str) -> String {
        path.split(['?', '&'])
            .find_map(|part| part.strip_prefix("fsym="))
            .unwrap_or_default()
            .to_string()
    }

    /// Prix historique = 10, prix actuel = 30 pour toutes les cryptos
    fn happy_handler(path: &str) -> (u16, String) {
        let symbol = query_symbol(path);
        if path.starts_with("/data/pricehistorical") {
            (200, format!(r#"{{"{}":{{"USD":10.0}}}}"#, symbol))
        } else {
            (200, r#"{"USD":30.0}"#.to_string())
        }
    }

    fn failing_handler(path: &str) -> (u16, String) {
        if query_symbol(path) == "ETH" {
            (500, "{}".to_string())
        } else {
            happy_handler(path)
        }
    }

    #[tokio::test]
    async fn test_fetch_coins_against_stub() {
        let base_url = spawn_stub(happy_handler).await;
        let client = PriceClient::new(base_url).unwrap();

        let selection = [COIN_CATALOG[0], COIN_CATALOG[3]];
        let coins = client.fetch_coins(&selection, date(2017, 6, 1)).await.unwrap();

        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].symbol, "BTC");
        assert_eq!(coins[1].symbol, "LTC");
        assert_eq!(coins[0].price_then, 10.0);
        assert_eq!(coins[0].price_now, 30.0);
        assert!(coins.iter().all(|c| !c.revealed));
    }

    #[tokio::test]
    async fn test_fetch_coins_fails_whole_batch() {
        let base_url = spawn_stub(failing_handler).await;
        let client = PriceClient::new(base_url).unwrap();

        let selection = [COIN_CATALOG[0], COIN_CATALOG[1], COIN_CATALOG[2]];
        let result = client.fetch_coins(&selection, date(2017, 6, 1)).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_random_coins_count() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let base_url = spawn_stub(happy_handler).await;
        let client = PriceClient::new(base_url).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let coins = fetch_random_coins(&client, &mut rng, 6, date(2019, 2, 2)).await.unwrap();
        assert_eq!(coins.len(), 6);
    }

    // Test avec un vrai appel API (peut échouer si pas de connexion)
    #[tokio::test]
    async fn test_real_api_smoke() {
        let client = PriceClient::production().unwrap();

        match client.historical_price("BTC", date(2018, 1, 1)).await {
            Ok(price) => assert!(price > 0.0),
            Err(e) => println!("⚠ Test skippé (pas de connexion?) : {}", e),
        }
    }
}
