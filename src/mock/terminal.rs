use std::io::{self, Write};

use embedded_hal::delay::DelayNs;

use super::{RecordingStrip, SimulatedBusError, SimulatedChip, StdDelay};
use crate::chip::ChipRegisterGridDriver;
use crate::clock::{Clock, LocalTime};
use crate::config::{Backend, ClockConfig};
use crate::layout::LayoutError;
use crate::renderer::{RenderOutcome, TimeRenderer};
use crate::strip::{self, PixelStripGridDriver};
use crate::{Coordinate, GridDriver, GridError};

/// Letters of the English front plate, one string per row.
const PLATE: [&str; 10] = [
    "ITLISASTIME",
    "ACQUARTERDC",
    "TWENTYFIVEX",
    "HALFSTENFTO",
    "PASTERUNINE",
    "ONESIXTHREE",
    "FOURFIVETWO",
    "EIGHTELEVEN",
    "SEVENTWELVE",
    "TENSEOCLOCK",
];

/// Error setting up the terminal simulator.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("simulated chip bring-up failed: {0}")]
    ChipBringUp(GridError<SimulatedBusError>),
}

/// A simulated panel that can report which cells are currently visible.
trait Panel: GridDriver {
    fn visible(&self) -> Vec<Coordinate>;
}

impl<D: DelayNs> Panel for ChipRegisterGridDriver<SimulatedChip, D> {
    fn visible(&self) -> Vec<Coordinate> {
        if self.bus().is_bright() {
            self.bus().lit_coordinates()
        } else {
            Vec::new()
        }
    }
}

impl<D: DelayNs> Panel for PixelStripGridDriver<RecordingStrip, D> {
    fn visible(&self) -> Vec<Coordinate> {
        let Some(frame) = self.strip().last_frame() else {
            return Vec::new();
        };
        (0..strip::HEIGHT)
            .flat_map(|y| (0..strip::WIDTH).map(move |x| Coordinate::new(x, y)))
            .filter(|c| {
                strip::pixel_index(c.x, c.y)
                    .and_then(|i| frame.get(i))
                    .is_some_and(|p| p.r > 0 || p.g > 0 || p.b > 0)
            })
            .collect()
    }
}

/// Clears the screen and moves cursor to top-left.
#[inline]
fn clear_screen() {
    print!("\x1B[2J\x1B[H");
}

/// Runs the clock against a simulated panel, drawing it in the terminal.
///
/// The backend from `config` is simulated in memory; the terminal shows
/// what the simulated hardware would display after each redraw.
pub fn run_simulator(config: &ClockConfig) -> Result<(), SimulatorError> {
    match config.backend {
        Backend::Chip => {
            let driver = ChipRegisterGridDriver::new(SimulatedChip::new(), StdDelay)
                .map_err(SimulatorError::ChipBringUp)?;
            run(driver, config)
        }
        Backend::Strip => {
            let driver = PixelStripGridDriver::new(
                RecordingStrip::with_history(1),
                StdDelay,
                config.strip.colour(),
            );
            run(driver, config)
        }
    }
}

fn run<G: Panel>(driver: G, config: &ClockConfig) -> Result<(), SimulatorError> {
    let renderer = TimeRenderer::new(driver, config.layout(), config.render_options())?;
    let mut clock = Clock::new(renderer, LocalTime::new(), config.poll_interval_ms);
    let mut delay = StdDelay;

    loop {
        match clock.tick() {
            Ok(RenderOutcome::Rendered(time)) => {
                clear_screen();
                let visible = clock.renderer().driver().visible();
                if let Err(e) = draw_panel(&mut io::stdout(), &visible) {
                    eprintln!("Failed to draw panel: {}", e);
                }
                println!("It is {time}");
            }
            Ok(RenderOutcome::Unchanged) => {}
            Err(e) => eprintln!("Render failed: {}", e),
        }
        delay.delay_ms(config.poll_interval_ms);
    }
}

/// Draw the front plate with `lit` cells highlighted. Extracted for testability.
fn draw_panel(w: &mut impl Write, lit: &[Coordinate]) -> io::Result<()> {
    for (y, letters) in PLATE.iter().enumerate() {
        for (x, letter) in letters.chars().enumerate() {
            if lit.contains(&Coordinate::new(x, y)) {
                write!(w, "\x1b[1;33m{letter}\x1b[0m ")?;
            } else {
                write!(w, "\x1b[2m{letter}\x1b[0m ")?;
            }
        }
        writeln!(w)?;
    }

    // Corner pixels below the plate
    for x in 0..4 {
        let tick = if lit.contains(&Coordinate::new(x, PLATE.len())) {
            "●"
        } else {
            "·"
        };
        write!(w, "{tick} ")?;
    }
    writeln!(w)?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TimeLayout;
    use crate::mock::NoDelay;
    use crate::renderer::{DisplayTime, RenderOptions};

    fn render_to_string(lit: &[Coordinate]) -> String {
        let mut buf = Vec::new();
        draw_panel(&mut buf, lit).expect("rendering to buffer should succeed");
        String::from_utf8(buf).expect("output should be valid UTF-8")
    }

    #[test]
    fn test_plate_matches_panel_size() {
        assert_eq!(PLATE.len(), crate::chip::HEIGHT);
        assert!(PLATE.iter().all(|row| row.chars().count() == crate::chip::WIDTH));
    }

    #[test]
    fn test_dark_panel_has_no_highlight() {
        let output = render_to_string(&[]);
        assert!(!output.contains("\x1b[1;33m"));
        assert!(output.contains("·"));
    }

    #[test]
    fn test_lit_cells_are_highlighted() {
        let output = render_to_string(&[Coordinate::new(0, 0), Coordinate::new(2, 10)]);
        assert!(output.contains("\x1b[1;33mI\x1b[0m"));
        assert!(output.contains("●"));
    }

    #[test]
    fn test_lit_words_spell_the_time() {
        let layout = TimeLayout::english();
        let options = RenderOptions {
            animations: true,
            minute_ticks: false,
        };
        let driver = ChipRegisterGridDriver::new(SimulatedChip::new(), NoDelay).unwrap();
        let mut renderer = TimeRenderer::new(driver, layout, options).unwrap();
        renderer.update_time(3, 15).unwrap();

        let visible = renderer.driver().visible();
        let spelled: String = visible
            .iter()
            .map(|c| PLATE[c.y].as_bytes()[c.x] as char)
            .collect();

        assert_eq!(spelled, "ITISQUARTERPASTTHREE");
        assert_eq!(
            visible.len(),
            renderer
                .frame(&DisplayTime::from_wall_clock(3, 15).unwrap())
                .len()
        );
    }

    #[test]
    fn test_strip_panel_shows_last_frame() {
        let driver = PixelStripGridDriver::new(
            RecordingStrip::with_history(1),
            NoDelay,
            crate::strip::DEFAULT_COLOUR,
        );
        let mut renderer = TimeRenderer::new(
            driver,
            TimeLayout::english(),
            RenderOptions {
                animations: true,
                minute_ticks: true,
            },
        )
        .unwrap();
        renderer.update_time(9, 2).unwrap();

        let visible = renderer.driver().visible();
        assert!(visible.contains(&Coordinate::new(0, 10)));
        assert!(visible.contains(&Coordinate::new(1, 10)));
        assert!(!visible.contains(&Coordinate::new(2, 10)));
    }
}
