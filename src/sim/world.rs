/// Simulation: owns the two cell buffers and drives the control loop.
///
/// ## Double buffer
///
/// `buffers[active]` is the generation on screen: the render source
/// and the step source. The other slot is scratch: either stale or the
/// freshly computed next generation. A step borrows the active buffer
/// immutably and the scratch buffer mutably (`split_at_mut`), then
/// flips `active`; the grids themselves never move or reallocate.
///
/// ## Loop ordering
///
/// render → step (unless paused) → bounded wait for a key → apply
/// command. Generation N is always fully rendered before N+1 is
/// computed. The wait doubles as the inter-generation delay: it
/// returns early only when a key arrives.

use std::io;
use std::time::Duration;

use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::domain::grid::{Grid, GridError};
use super::command::{self, Command};
use super::step::{self, StepError};

/// Floor for the inter-generation delay: halving stops here.
pub const MIN_DELAY_US: u64 = 50_000;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Step(#[from] StepError),
}

/// Run-control knobs, mutated only by command application.
pub struct SimState {
    pub paused: bool,
    /// Inter-generation delay in microseconds. Never below
    /// `MIN_DELAY_US`; raising has no ceiling.
    pub delay_us: u64,
}

/// What the display needs to know beyond the cells themselves.
pub struct HudInfo {
    pub delay_us: u64,
    pub paused: bool,
    pub generation: u64,
    pub population: usize,
}

/// Render surface. The simulation never talks to the terminal
/// directly; tests substitute a recording fake.
pub trait Display {
    fn render(&mut self, grid: &Grid, hud: &HudInfo) -> io::Result<()>;
}

/// Key source. Waits at most `wait`, returns the first key press in
/// that window or None.
pub trait Input {
    fn poll_key(&mut self, wait: Duration) -> io::Result<Option<KeyEvent>>;
}

pub struct Simulation {
    buffers: [Grid; 2],
    active: usize, // 0 or 1, selects the current buffer
    pub state: SimState,
    generation: u64,
    density: f64,
    rng: StdRng,
}

impl Simulation {
    /// Allocate both buffers and randomly seed the active one.
    /// A configured delay below the floor is clamped up to it.
    pub fn new(
        width: usize,
        height: usize,
        density: f64,
        delay_us: u64,
    ) -> Result<Self, GridError> {
        Self::with_rng(StdRng::from_entropy(), width, height, density, delay_us)
    }

    /// Seedable constructor so tests are deterministic.
    pub fn with_rng(
        mut rng: StdRng,
        width: usize,
        height: usize,
        density: f64,
        delay_us: u64,
    ) -> Result<Self, GridError> {
        let seeded = Grid::random(width, height, &mut rng, density)?;
        let scratch = Grid::new(width, height)?;
        Ok(Simulation {
            buffers: [seeded, scratch],
            active: 0,
            state: SimState {
                paused: false,
                delay_us: delay_us.max(MIN_DELAY_US),
            },
            generation: 0,
            density,
            rng,
        })
    }

    /// The buffer currently on screen.
    pub fn current(&self) -> &Grid {
        &self.buffers[self.active]
    }

    #[allow(dead_code)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Refill the scratch buffer with a fresh random field and make it
    /// current. Pause state and delay survive a reseed; the generation
    /// count starts over.
    pub fn reseed(&mut self) {
        let scratch = 1 - self.active;
        self.buffers[scratch].scatter(&mut self.rng, self.density);
        self.active = scratch;
        self.generation = 0;
    }

    /// One pass of the control loop. Returns false when a quit command
    /// was applied and the loop should stop.
    pub fn tick(
        &mut self,
        display: &mut impl Display,
        input: &mut impl Input,
    ) -> Result<bool, SimError> {
        let hud = self.hud();
        display.render(self.current(), &hud)?;

        if !self.state.paused {
            self.step_once()?;
        }

        let wait = Duration::from_micros(self.state.delay_us);
        if let Some(key) = input.poll_key(wait)? {
            if let Some(cmd) = Command::from_key(key) {
                return Ok(command::apply(cmd, self));
            }
        }

        Ok(true)
    }

    /// Tick until a quit command.
    pub fn run(
        &mut self,
        display: &mut impl Display,
        input: &mut impl Input,
    ) -> Result<(), SimError> {
        while self.tick(display, input)? {}
        Ok(())
    }

    // ── Internal ──

    /// Advance active → scratch, then swap roles. The two disjoint
    /// borrows guarantee the step never reads what it just wrote.
    fn step_once(&mut self) -> Result<(), StepError> {
        let (head, tail) = self.buffers.split_at_mut(1);
        let (source, dest) = if self.active == 0 {
            (&head[0], &mut tail[0])
        } else {
            (&tail[0], &mut head[0])
        };
        step::advance(source, dest)?;
        self.active = 1 - self.active;
        self.generation += 1;
        Ok(())
    }

    fn hud(&self) -> HudInfo {
        HudInfo {
            delay_us: self.state.delay_us,
            paused: self.state.paused,
            generation: self.generation,
            population: self.current().population(),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    /// Display fake: records every rendered frame.
    struct RecordingDisplay {
        frames: Vec<(Grid, bool)>,
    }

    impl RecordingDisplay {
        fn new() -> Self {
            RecordingDisplay { frames: Vec::new() }
        }
    }

    impl Display for RecordingDisplay {
        fn render(&mut self, grid: &Grid, hud: &HudInfo) -> io::Result<()> {
            self.frames.push((grid.clone(), hud.paused));
            Ok(())
        }
    }

    /// Input fake: replays a script, then reports no keys.
    struct ScriptedInput {
        script: VecDeque<Option<KeyEvent>>,
    }

    impl ScriptedInput {
        fn new(script: &[Option<KeyCode>]) -> Self {
            ScriptedInput {
                script: script
                    .iter()
                    .map(|k| k.map(|code| KeyEvent::new(code, KeyModifiers::NONE)))
                    .collect(),
            }
        }

        fn silent() -> Self {
            ScriptedInput { script: VecDeque::new() }
        }
    }

    impl Input for ScriptedInput {
        fn poll_key(&mut self, _wait: Duration) -> io::Result<Option<KeyEvent>> {
            Ok(self.script.pop_front().flatten())
        }
    }

    fn sim(seed: u64) -> Simulation {
        Simulation::with_rng(StdRng::seed_from_u64(seed), 20, 10, 0.5, 100_000).unwrap()
    }

    /// Reference step: what one generation of `grid` should look like.
    fn stepped(grid: &Grid) -> Grid {
        let mut next = Grid::new(grid.width(), grid.height()).unwrap();
        step::advance(grid, &mut next).unwrap();
        next
    }

    #[test]
    fn invalid_dimensions_refuse_to_start() {
        assert!(Simulation::new(0, 20, 0.5, 100_000).is_err());
        assert!(Simulation::new(50, 0, 0.5, 100_000).is_err());
    }

    #[test]
    fn configured_delay_is_clamped_to_the_floor() {
        let sim = Simulation::with_rng(StdRng::seed_from_u64(0), 5, 5, 0.5, 10_000).unwrap();
        assert_eq!(sim.state.delay_us, MIN_DELAY_US);
    }

    #[test]
    fn tick_renders_then_advances_one_generation() {
        let mut sim = sim(7);
        let start = sim.current().clone();
        let expected = stepped(&start);

        let mut display = RecordingDisplay::new();
        let mut input = ScriptedInput::silent();
        assert!(sim.tick(&mut display, &mut input).unwrap());

        // The frame shows the generation as it was BEFORE the step.
        assert_eq!(display.frames.len(), 1);
        assert_eq!(display.frames[0].0, start);
        // The active buffer flipped to the freshly computed generation.
        assert_eq!(sim.current(), &expected);
        assert_eq!(sim.generation(), 1);
    }

    #[test]
    fn paused_ticks_render_but_never_step() {
        let mut sim = sim(8);
        sim.state.paused = true;
        let frozen = sim.current().clone();

        let mut display = RecordingDisplay::new();
        let mut input = ScriptedInput::silent();
        for _ in 0..3 {
            assert!(sim.tick(&mut display, &mut input).unwrap());
        }

        assert_eq!(display.frames.len(), 3);
        assert_eq!(sim.current(), &frozen);
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn unpausing_resumes_exactly_one_step_per_tick() {
        let mut sim = sim(9);
        sim.state.paused = true;
        let frozen = sim.current().clone();

        let mut display = RecordingDisplay::new();
        // Tick 1: paused, 'p' arrives → unpause. Tick 2: one step.
        let mut input = ScriptedInput::new(&[Some(KeyCode::Char('p')), None]);
        sim.tick(&mut display, &mut input).unwrap();
        assert_eq!(sim.current(), &frozen);

        sim.tick(&mut display, &mut input).unwrap();
        assert_eq!(sim.current(), &stepped(&frozen));
        assert_eq!(sim.generation(), 1);
    }

    #[test]
    fn reseed_while_paused_takes_effect_immediately() {
        let mut sim = sim(10);
        sim.state.paused = true;
        let before = sim.current().clone();

        sim.reseed();

        assert_ne!(sim.current(), &before);
        assert!(sim.state.paused);
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn reseed_resets_the_generation_counter() {
        let mut sim = sim(11);
        let mut display = RecordingDisplay::new();
        let mut input = ScriptedInput::silent();
        for _ in 0..5 {
            sim.tick(&mut display, &mut input).unwrap();
        }
        assert_eq!(sim.generation(), 5);

        sim.reseed();
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn run_stops_on_quit_command() {
        let mut sim = sim(12);
        let mut display = RecordingDisplay::new();
        let mut input = ScriptedInput::new(&[None, None, Some(KeyCode::Char('q'))]);

        sim.run(&mut display, &mut input).unwrap();

        // Two free-running ticks plus the one that saw 'q'.
        assert_eq!(display.frames.len(), 3);
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let mut sim = sim(13);
        let start = sim.current().clone();
        let mut display = RecordingDisplay::new();
        let mut input = ScriptedInput::new(&[Some(KeyCode::Char('x'))]);

        assert!(sim.tick(&mut display, &mut input).unwrap());
        assert!(!sim.state.paused);
        assert_eq!(sim.current(), &stepped(&start));
    }
}
