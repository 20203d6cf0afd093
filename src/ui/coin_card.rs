// ============================================================================
// Coin card - Widget d'une crypto
// ============================================================================
// Une carte par crypto tirée :
// - cachée : symbole, nom et invitation à la dévoiler
// - dévoilée : prix d'alors, prix actuel, multiplicateur et valeur actuelle
//   en vert (gain) ou rouge (perte)
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::{format_currency, format_price, Coin};

/// Dessine la carte d'une crypto dans `area`
pub fn render_coin_card(frame: &mut Frame, coin: &Coin, invested: f64, selected: bool, area: Rect) {
    let border_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected { BorderType::Thick } else { BorderType::Plain })
        .border_style(border_style)
        .title(format!(" {} ", coin.symbol))
        .title_alignment(Alignment::Center);

    let mut lines = vec![Line::from(Span::styled(
        coin.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if coin.revealed {
        lines.extend(revealed_lines(coin, invested));
    } else {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "press Enter to reveal",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Lignes affichées une fois la crypto dévoilée
fn revealed_lines(coin: &Coin, invested: f64) -> Vec<Line<'static>> {
    let value = coin.value(invested);
    let color = if coin.is_positive() { Color::Green } else { Color::Red };

    let performance = match coin.multiplier() {
        Some(m) => {
            let arrow = if m >= 1.0 { "▲" } else { "▼" };
            format!("{} x{:.2}", arrow, m)
        }
        None => "not listed yet".to_string(),
    };

    vec![
        Line::from(format!("then {}", format_price(coin.price_then))),
        Line::from(format!("now  {}", format_price(coin.price_now))),
        Line::from(Span::styled(performance, Style::default().fg(color))),
        Line::from(Span::styled(
            format_currency(value),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ]
}
