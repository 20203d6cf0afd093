// ============================================================================
// Hindsight : "If I invested $1,000 in 6 random cryptocurrencies..."
// ============================================================================
// Programme TUI qui tire une date passée et des cryptos au hasard, charge
// leurs prix depuis CryptoCompare et affiche ce que vaudrait l'investissement
// aujourd'hui, crypto par crypto.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread : appels réseau async sans bloquer l'UI
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use hindsight::api::{fetch_random_coins, PriceClient};
use hindsight::app::App;
use hindsight::config::{Cli, Config};
use hindsight::models::{random_historical_date, Coin};
use hindsight::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand / AppResult : communication avec le worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Tirer `count` cryptos et charger leurs prix à la date `date`
    LoadCoins {
        generation: u64,
        date: NaiveDate,
        count: usize,
    },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    CoinsLoaded { generation: u64, coins: Vec<Coin> },

    LoadFailed { generation: u64, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Répertoire des logs : --log-dir, sinon ~/.local/share/hindsight/logs
fn log_directory(config: &Config) -> PathBuf {
    config
        .log_dir
        .clone()
        .or_else(|| dirs::data_local_dir().map(|dir| dir.join("hindsight").join("logs")))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/hindsight/logs/hindsight.log.*
/// RUST_LOG=hindsight=trace hindsight
/// ```
fn init_logging(log_dir: PathBuf) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "hindsight.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hindsight=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Cli::parse().into_config().context("Configuration invalide")?;

    init_logging(log_directory(&config)).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(?config, "Hindsight starting up");

    let historical_date = next_historical_date(&config);
    let mut app = App::new(&config, historical_date);

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(config.api_url.clone(), command_rx, result_tx);

    // Premier chargement (génération 0)
    let generation = app.generation;
    request_coins(&mut app, &command_tx, generation);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &config, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!(worth = app.worth, "Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Date fixée par l'utilisateur, sinon une date au hasard
fn next_historical_date(config: &Config) -> NaiveDate {
    config
        .fixed_date
        .unwrap_or_else(|| random_historical_date(&mut rand::thread_rng(), config.earliest, config.latest))
}

/// Envoie la commande de chargement au worker
///
/// Si le worker est mort, le chargement échoue immédiatement.
fn request_coins(app: &mut App, command_tx: &mpsc::Sender<AppCommand>, generation: u64) {
    let command = AppCommand::LoadCoins {
        generation,
        date: app.historical_date,
        count: app.total_coins,
    };

    if command_tx.send(command).is_err() {
        error!(generation, "Worker thread is gone, cannot load coins");
        app.load_failed(generation);
    }
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// - Thread séparé avec son propre runtime tokio
// - Reçoit des AppCommand, renvoie des AppResult
// - Un chargement à la fois : pas d'annulation, pas de retry
// ============================================================================

fn spawn_background_worker(
    api_url: String,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker exiting");
                return;
            }
        };

        let client = match PriceClient::new(api_url) {
            Ok(client) => client,
            Err(e) => {
                error!(error = ?e, "Failed to create price client, worker exiting");
                return;
            }
        };

        let mut rng = StdRng::from_entropy();

        // Boucle de traitement des commandes, jusqu'à fermeture du channel
        while let Ok(command) = command_rx.recv() {
            let command = newest_command(command, &command_rx);
            info!(?command, "Worker received command");

            match command {
                AppCommand::LoadCoins { generation, date, count } => {
                    let result = runtime.block_on(fetch_random_coins(&client, &mut rng, count, date));

                    let message = match result {
                        Ok(coins) => AppResult::CoinsLoaded { generation, coins },
                        Err(e) => {
                            error!(generation, error = ?e, "Failed to load coins");
                            AppResult::LoadFailed {
                                generation,
                                error: format!("{:#}", e),
                            }
                        }
                    };

                    if result_tx.send(message).is_err() {
                        break;
                    }
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

/// Vide la file et ne garde que la commande la plus récente
///
/// Chaque "Show me the money!" rend les tirages précédents obsolètes :
/// inutile de charger leurs prix.
fn newest_command(first: AppCommand, command_rx: &mpsc::Receiver<AppCommand>) -> AppCommand {
    let mut newest = first;
    while let Ok(next) = command_rx.try_recv() {
        debug!(skipped = ?newest, "Skipping outdated command");
        newest = next;
    }
    newest
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Render
//   2. Input
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // 0. RÉSULTATS : try_recv ne bloque pas
        match result_rx.try_recv() {
            Ok(AppResult::CoinsLoaded { generation, coins }) => {
                info!(generation, coins = coins.len(), "Coins received from worker");
                app.coins_loaded(generation, coins);
            }
            Ok(AppResult::LoadFailed { generation, error }) => {
                error!(generation, error = %error, "Coin loading failed");
                app.load_failed(generation);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                if app.is_loading {
                    error!("Worker thread disconnected while loading");
                    app.load_failed(app.generation);
                }
            }
        }

        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(app, config, event, command_tx),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

fn handle_event(
    app: &mut App,
    config: &Config,
    event: hindsight::ui::events::Event,
    command_tx: &mpsc::Sender<AppCommand>,
) {
    use hindsight::ui::events::{
        is_down_event, is_left_event, is_quit_event, is_reshuffle_event, is_reveal_all_event,
        is_reveal_event, is_right_event, is_up_event, Event,
    };

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // "Show me the money!" : nouveau tirage
        Event::Key(_) if is_reshuffle_event(&event) => {
            app.cancel_quit();
            let generation = app.show_me_the_money(next_historical_date(config));
            request_coins(app, command_tx, generation);
        }

        Event::Key(_) if is_reveal_event(&event) => {
            app.cancel_quit();
            if let Some(value) = app.reveal_selected() {
                debug!(value, worth = app.worth, "Worth updated");
            }
        }

        Event::Key(_) if is_reveal_all_event(&event) => {
            app.cancel_quit();
            let added = app.reveal_all();
            info!(added, worth = app.worth, "User revealed all coins");
        }

        Event::Key(_) if is_left_event(&event) => {
            app.cancel_quit();
            app.navigate_left();
        }
        Event::Key(_) if is_right_event(&event) => {
            app.cancel_quit();
            app.navigate_right();
        }
        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) => {
            app.cancel_quit();
            app.navigate_down();
        }

        // Toute autre touche : annule la confirmation de quit
        Event::Key(_) => app.cancel_quit(),

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(generation: u64) -> AppCommand {
        AppCommand::LoadCoins {
            generation,
            date: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
            count: 6,
        }
    }

    fn generation_of(command: &AppCommand) -> u64 {
        match command {
            AppCommand::LoadCoins { generation, .. } => *generation,
        }
    }

    #[test]
    fn test_newest_command_skips_queued_draws() {
        let (tx, rx) = mpsc::channel();
        for generation in 2..=5 {
            tx.send(load(generation)).unwrap();
        }

        let command = newest_command(load(1), &rx);
        assert_eq!(generation_of(&command), 5);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_newest_command_with_empty_queue() {
        let (_tx, rx) = mpsc::channel();
        let command = newest_command(load(0), &rx);
        assert_eq!(generation_of(&command), 0);
    }
}
