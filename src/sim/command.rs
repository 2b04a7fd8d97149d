/// Key → command mapping and command application.
///
/// Unrecognized keys map to nothing and are silently dropped — a
/// deliberate contract, not an omission. Key release events never
/// produce a command.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::world::{Simulation, MIN_DELAY_US};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    /// Double the inter-generation delay (slower). No ceiling.
    RaiseDelay,
    /// Halve the inter-generation delay (faster), down to the floor.
    LowerDelay,
    TogglePause,
    /// Replace the field with a fresh random seeding.
    Reseed,
    Quit,
}

impl Command {
    pub fn from_key(key: KeyEvent) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        // Ctrl-C arrives as an ordinary key event in raw mode; treat it
        // as quit so it flows through the same orderly teardown.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            return Some(Command::Quit);
        }
        match key.code {
            KeyCode::Char('+' | '=') => Some(Command::RaiseDelay),
            KeyCode::Char('-') => Some(Command::LowerDelay),
            KeyCode::Char('p' | 'P' | ' ') => Some(Command::TogglePause),
            KeyCode::Char('n' | 'N') => Some(Command::Reseed),
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Apply a command to the simulation. Returns false when the run loop
/// should stop after the current tick.
pub fn apply(command: Command, sim: &mut Simulation) -> bool {
    match command {
        Command::RaiseDelay => {
            sim.state.delay_us = sim.state.delay_us.saturating_mul(2);
        }
        Command::LowerDelay => {
            if sim.state.delay_us > MIN_DELAY_US {
                sim.state.delay_us = (sim.state.delay_us / 2).max(MIN_DELAY_US);
            }
        }
        Command::TogglePause => {
            sim.state.paused = !sim.state.paused;
        }
        Command::Reseed => {
            sim.reseed();
        }
        Command::Quit => return false,
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sim() -> Simulation {
        Simulation::with_rng(StdRng::seed_from_u64(42), 10, 10, 0.5, 100_000).unwrap()
    }

    // ── Mapping ──

    #[test]
    fn keys_map_to_their_commands() {
        assert_eq!(Command::from_key(press(KeyCode::Char('+'))), Some(Command::RaiseDelay));
        assert_eq!(Command::from_key(press(KeyCode::Char('='))), Some(Command::RaiseDelay));
        assert_eq!(Command::from_key(press(KeyCode::Char('-'))), Some(Command::LowerDelay));
        assert_eq!(Command::from_key(press(KeyCode::Char('p'))), Some(Command::TogglePause));
        assert_eq!(Command::from_key(press(KeyCode::Char('P'))), Some(Command::TogglePause));
        assert_eq!(Command::from_key(press(KeyCode::Char(' '))), Some(Command::TogglePause));
        assert_eq!(Command::from_key(press(KeyCode::Char('n'))), Some(Command::Reseed));
        assert_eq!(Command::from_key(press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(Command::from_key(press(KeyCode::Esc)), Some(Command::Quit));
    }

    #[test]
    fn ctrl_c_maps_to_quit() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Command::from_key(key), Some(Command::Quit));
        // A plain 'c' does not.
        assert_eq!(Command::from_key(press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn unrecognized_keys_map_to_nothing() {
        assert_eq!(Command::from_key(press(KeyCode::Char('x'))), None);
        assert_eq!(Command::from_key(press(KeyCode::Enter)), None);
        assert_eq!(Command::from_key(press(KeyCode::F(1))), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let key = KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(Command::from_key(key), None);
    }

    // ── Application ──

    #[test]
    fn raising_delay_doubles_without_ceiling() {
        let mut sim = sim();
        assert!(apply(Command::RaiseDelay, &mut sim));
        assert_eq!(sim.state.delay_us, 200_000);
        for _ in 0..20 {
            apply(Command::RaiseDelay, &mut sim);
        }
        assert_eq!(sim.state.delay_us, 200_000 << 20);
    }

    #[test]
    fn lowering_delay_stops_at_the_floor() {
        let mut sim = sim();
        assert!(apply(Command::LowerDelay, &mut sim));
        assert_eq!(sim.state.delay_us, MIN_DELAY_US);
        // Repeated lowering never passes the floor.
        for _ in 0..10 {
            apply(Command::LowerDelay, &mut sim);
            assert_eq!(sim.state.delay_us, MIN_DELAY_US);
        }
    }

    #[test]
    fn delay_round_trips_through_the_floor() {
        let mut sim = sim();
        apply(Command::LowerDelay, &mut sim);
        apply(Command::RaiseDelay, &mut sim);
        assert_eq!(sim.state.delay_us, 100_000);
    }

    #[test]
    fn pause_toggles_back_and_forth() {
        let mut sim = sim();
        assert!(apply(Command::TogglePause, &mut sim));
        assert!(sim.state.paused);
        assert!(apply(Command::TogglePause, &mut sim));
        assert!(!sim.state.paused);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut sim = sim();
        assert!(!apply(Command::Quit, &mut sim));
    }

    #[test]
    fn reseed_replaces_the_field() {
        let mut sim = sim();
        let before = sim.current().clone();
        assert!(apply(Command::Reseed, &mut sim));
        assert_ne!(sim.current(), &before);
    }
}
