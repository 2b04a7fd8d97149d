/// Entry point and control-loop wiring.

mod config;
mod domain;
mod sim;
mod ui;

use std::process::ExitCode;

use config::SimConfig;
use sim::world::Simulation;
use ui::input::TerminalInput;
use ui::renderer::Renderer;

// Distinct exit codes so scripts can tell a bad config.toml from a
// hostile terminal.
const EXIT_BAD_CONFIG: u8 = 2;
const EXIT_NO_TERMINAL: u8 = 3;

fn main() -> ExitCode {
    let config = SimConfig::load();

    let mut sim = match Simulation::new(
        config.grid.width,
        config.grid.height,
        config.grid.density,
        config.delay_us,
    ) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            return ExitCode::from(EXIT_BAD_CONFIG);
        }
    };

    let mut renderer = Renderer::new(&config.display);
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::from(EXIT_NO_TERMINAL);
    }

    let mut input = TerminalInput::new();
    let result = sim.run(&mut renderer, &mut input);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Simulation error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
