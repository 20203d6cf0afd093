// ============================================================================
// Dashboard - Rendu de l'écran principal
// ============================================================================
// Un seul écran, de haut en bas :
// 1. Titre : "If I invested $1,000 in 6 random cryptocurrencies on ..."
// 2. Total actuel (en vert)
// 3. Zone des cryptos : erreur, chargement ou grille de cartes
// 4. Footer : raccourcis clavier ("Show me the money!")
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'espace en zones
// 2. Constraint::Ratio : grille de taille égale
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, CoinArea, GRID_COLUMNS};
use crate::models::{format_currency, format_long_date, format_whole_dollars};
use crate::ui::coin_card::render_coin_card;

/// Message affiché quand le chargement a échoué
pub const ERROR_MESSAGE: &str = "OH Nooo!!! I just broke the blockchain. Please try again.";

/// Message affiché pendant le chargement
pub const LOADING_MESSAGE: &str = "computing the crypto bubble...";

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_headline(frame, app, chunks[0]);
    render_worth(frame, app, chunks[1]);
    render_coin_area(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

/// Crée le layout principal (titre, total, cryptos, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Titre : 3 lignes + bordures
            Constraint::Length(3), // Total
            Constraint::Min(0),    // Cryptos : tout le reste
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Titre
// ============================================================================

/// Texte du titre, une ligne par élément
pub fn headline_lines(app: &App) -> [String; 3] {
    [
        format!(
            "If I invested {} in {} random cryptocurrencies",
            format_whole_dollars(app.total_investment),
            app.total_coins
        ),
        format!("on {}", format_long_date(app.historical_date)),
        "now I have worth of".to_string(),
    ]
}

fn render_headline(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Hindsight ")
        .title_alignment(Alignment::Center);

    let [first, date, last] = headline_lines(app);
    let text = vec![
        Line::from(first),
        Line::from(Span::styled(
            date,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(last),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Total
// ============================================================================

fn render_worth(frame: &mut Frame, app: &App, area: Rect) {
    let text = Line::from(Span::styled(
        format_currency(app.worth),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::BOTTOM))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Zone des cryptos
// ============================================================================

fn render_coin_area(frame: &mut Frame, app: &App, area: Rect) {
    match app.coin_area() {
        CoinArea::Error => render_message(
            frame,
            area,
            ERROR_MESSAGE,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        CoinArea::Loading => render_message(
            frame,
            area,
            LOADING_MESSAGE,
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ),
        CoinArea::Coins => render_coin_grid(frame, app, area),
    }
}

/// Message centré verticalement dans la zone
fn render_message(frame: &mut Frame, area: Rect, message: &str, style: Style) {
    let padding = area.height.saturating_sub(1) / 2;
    let mut text: Vec<Line> = (0..padding).map(|_| Line::from("")).collect();
    text.push(Line::from(Span::styled(message.to_string(), style)));

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Grille de cartes, GRID_COLUMNS par ligne
fn render_coin_grid(frame: &mut Frame, app: &App, area: Rect) {
    let invested = app.invested_per_coin();
    let rows = app.coins.len().div_ceil(GRID_COLUMNS) as u32;

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..rows).map(|_| Constraint::Ratio(1, rows)))
        .split(area);

    for (row, chunk) in app.coins.chunks(GRID_COLUMNS).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..GRID_COLUMNS).map(|_| Constraint::Ratio(1, GRID_COLUMNS as u32)))
            .split(row_areas[row]);

        for (col, coin) in chunk.iter().enumerate() {
            let index = row * GRID_COLUMNS + col;
            render_coin_card(frame, coin, invested, index == app.selected_index, cells[col]);
        }
    }
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Yellow)),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, any other key to cancel", Style::default().fg(Color::Yellow)),
        ])
    } else {
        let mut spans = vec![
            key("[m]", Color::Green),
            Span::raw(" Show me the money!  "),
            key("[←→↑↓]", Color::Yellow),
            Span::raw(" Navigate  "),
            key("[Enter]", Color::Yellow),
            Span::raw(" Reveal  "),
            key("[a]", Color::Yellow),
            Span::raw(" Reveal all  "),
            key("[q]", Color::Red),
            Span::raw(" Quit"),
        ];
        if !app.coins.is_empty() {
            spans.push(Span::styled(
                format!("   {}/{} revealed", app.revealed_count(), app.coins.len()),
                Style::default().fg(Color::Gray),
            ));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests : rendu dans un terminal virtuel
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Coin;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(&Config::default(), NaiveDate::from_ymd_opt(2018, 1, 5).unwrap())
    }

    fn coins() -> Vec<Coin> {
        ["BTC", "ETH", "XRP", "LTC", "XMR", "ZEC"]
            .iter()
            .map(|s| Coin::new(s.to_string(), format!("{} coin", s), 10.0, 20.0))
            .collect()
    }

    /// Rend l'app et retourne l'écran ligne par ligne
    fn render_to_text(app: &App) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn count(screen: &[String], needle: &str) -> usize {
        screen.iter().map(|line| line.matches(needle).count()).sum()
    }

    #[test]
    fn test_headline() {
        let [first, date, last] = headline_lines(&app());
        assert_eq!(first, "If I invested $1,000 in 6 random cryptocurrencies");
        assert_eq!(date, "on January 5, 2018");
        assert_eq!(last, "now I have worth of");
    }

    #[test]
    fn test_loading_screen() {
        let screen = render_to_text(&app());
        assert_eq!(count(&screen, LOADING_MESSAGE), 1);
        assert_eq!(count(&screen, "press Enter to reveal"), 0);
        assert_eq!(count(&screen, "$0.00"), 1);
    }

    #[test]
    fn test_one_card_per_coin() {
        let mut app = app();
        app.coins_loaded(0, coins());

        let screen = render_to_text(&app);
        assert_eq!(count(&screen, "press Enter to reveal"), 6);
        for coin in &app.coins {
            assert_eq!(count(&screen, &format!(" {} coin", coin.symbol)), 1, "{}", coin.symbol);
        }
        assert_eq!(count(&screen, LOADING_MESSAGE), 0);
    }

    #[test]
    fn test_revealed_card_and_worth() {
        let mut app = app();
        app.coins_loaded(0, coins());
        app.reveal_selected();

        let screen = render_to_text(&app);
        assert_eq!(count(&screen, "press Enter to reveal"), 5);
        // 1000/6 * 2 = 333.33, affiché dans la carte et dans le total
        assert_eq!(count(&screen, "$333.33"), 2);
        assert_eq!(count(&screen, "1/6 revealed"), 1);
    }

    #[test]
    fn test_error_screen_has_no_cards() {
        let mut app = app();
        app.load_failed(0);

        let screen = render_to_text(&app);
        assert_eq!(count(&screen, ERROR_MESSAGE), 1);
        assert_eq!(count(&screen, "press Enter to reveal"), 0);
        assert_eq!(count(&screen, LOADING_MESSAGE), 0);
    }

    #[test]
    fn test_quit_confirmation_footer() {
        let mut app = app();
        app.request_quit();

        let screen = render_to_text(&app);
        assert_eq!(count(&screen, "again to quit"), 1);
    }
}
