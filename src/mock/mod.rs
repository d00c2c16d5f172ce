mod chip;
mod delay;
mod grid;
mod strip;
mod terminal;

pub use chip::{SimulatedBusError, SimulatedChip};
pub use delay::{NoDelay, StdDelay};
pub use grid::{GridCall, MockGridError, RecordingGrid};
pub use strip::{RecordingStrip, StripFault};
pub use terminal::run_simulator;
