// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier (crossterm) et les traduit en actions
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. matches! : pattern matching qui retourne un bool
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (rafraîchissement)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// - Si pas d'événement avant `tick_rate`, retourne Ok(Event::Tick)
    /// - Seuls les Press sont remontés (certains OS envoient aussi Release)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : KeyEvent -> action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (avec confirmation)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Entrée ou Espace : dévoiler la crypto sélectionnée
pub fn is_reveal_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter | KeyCode::Char(' ')))
}

/// 'a' : tout dévoiler
pub fn is_reveal_all_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('a') | KeyCode::Char('A')))
}

/// 'm' ou 'r' : "Show me the money!" (nouveau tirage)
pub fn is_reshuffle_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Char('r') | KeyCode::Char('R'))
    )
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j')))
}

/// Flèche gauche ou 'h' (vim)
pub fn is_left_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left | KeyCode::Char('h')))
}

/// Flèche droite ou 'l' (vim)
pub fn is_right_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right | KeyCode::Char('l')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_reveal_keys() {
        assert!(is_reveal_event(&key(KeyCode::Enter)));
        assert!(is_reveal_event(&key(KeyCode::Char(' '))));
        assert!(!is_reveal_event(&key(KeyCode::Char('a'))));
        assert!(is_reveal_all_event(&key(KeyCode::Char('a'))));
    }

    #[test]
    fn test_reshuffle_keys() {
        assert!(is_reshuffle_event(&key(KeyCode::Char('m'))));
        assert!(is_reshuffle_event(&key(KeyCode::Char('r'))));
        assert!(!is_reshuffle_event(&key(KeyCode::Enter)));
    }

    #[test]
    fn test_navigation_keys() {
        assert!(is_up_event(&key(KeyCode::Up)));
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Char('j'))));
        assert!(is_left_event(&key(KeyCode::Left)));
        assert!(is_left_event(&key(KeyCode::Char('h'))));
        assert!(is_right_event(&key(KeyCode::Char('l'))));
        assert!(!is_right_event(&Event::Tick));
    }
}
