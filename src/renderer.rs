use std::collections::BTreeSet;
use std::fmt;

use crate::layout::{LayoutError, TimeLayout};
use crate::{Coordinate, GridDriver};

/// Error when rendering a time fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError<E> {
    #[error("{hour:02}:{minute:02} is not a valid wall-clock time")]
    InvalidTime { hour: u8, minute: u8 },

    #[error("grid driver failed: {0}")]
    Grid(E),
}

/// Result of a call to [`TimeRenderer::update_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The panel was redrawn to show this time.
    Rendered(DisplayTime),
    /// The panel already shows this time; no driver calls were made.
    Unchanged,
}

/// A wall-clock time as the panel spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayTime {
    /// Hour on a 12-hour dial, already advanced for "to" phrases.
    pub hour: u8,
    /// Minute rounded to the nearest multiple of five, `0..=55`.
    pub quantized_minute: u8,
    /// Whether the minute is read as "N to" the displayed hour.
    pub to_next_hour: bool,
    /// The unrounded minute modulo five, for the corner ticks.
    pub remainder: u8,
}

impl DisplayTime {
    /// Convert a 24-hour wall-clock time into what the panel shows.
    ///
    /// Returns `None` for hours past 23 or minutes past 59.
    pub fn from_wall_clock(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }

        // Round half up; 58 and 59 round up to the next full hour
        let mut quantized = (minute + 2) / 5 * 5;
        let mut hour = hour;
        if quantized == 60 {
            quantized = 0;
            hour += 1;
        }

        let to_next_hour = 30 < quantized && quantized <= 55;
        if to_next_hour {
            hour += 1;
        }

        Some(Self {
            hour: hour % 12,
            quantized_minute: quantized,
            to_next_hour,
            remainder: minute % 5,
        })
    }
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = if self.hour == 0 { 12 } else { self.hour };
        match (self.quantized_minute, self.to_next_hour) {
            (0, _) => write!(f, "{hour} o'clock"),
            (m, false) => write!(f, "{m} past {hour}"),
            (m, true) => write!(f, "{} to {hour}", 60 - m),
        }
    }
}

/// Options controlling how the renderer drives the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fade out before and fade in after redrawing.
    pub animations: bool,
    /// Light the corner ticks for minutes past the five-minute mark.
    pub minute_ticks: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            animations: true,
            minute_ticks: false,
        }
    }
}

/// Turns wall-clock times into lit cells on a [`GridDriver`].
///
/// Only redraws when the displayed five-minute mark changes (or the
/// corner ticks, when enabled). Redraws block for the full length of
/// any fade.
pub struct TimeRenderer<G> {
    driver: G,
    layout: TimeLayout,
    options: RenderOptions,
    /// Key of the last successful render; `None` until the first one.
    last_rendered: Option<(u8, u8)>,
}

impl<G: GridDriver> TimeRenderer<G> {
    /// Create a renderer drawing `layout` on `driver`.
    ///
    /// Fails if the layout uses cells outside the driver's grid or cells
    /// without an LED.
    pub fn new(driver: G, layout: TimeLayout, options: RenderOptions) -> Result<Self, LayoutError> {
        layout.validate(G::WIDTH, G::HEIGHT, options.minute_ticks, G::has_led)?;
        Ok(Self {
            driver,
            layout,
            options,
            last_rendered: None,
        })
    }

    #[inline]
    pub fn driver(&self) -> &G {
        &self.driver
    }

    /// Consume the renderer, returning the driver.
    pub fn into_driver(self) -> G {
        self.driver
    }

    /// Cells to light for `time`.
    pub fn frame(&self, time: &DisplayTime) -> BTreeSet<Coordinate> {
        let mut cells: BTreeSet<Coordinate> = self.layout.common.iter().copied().collect();
        cells.extend(&self.layout.hours[time.hour as usize]);
        cells.extend(&self.layout.five_minute_marks[time.quantized_minute as usize / 5]);
        if self.options.minute_ticks {
            cells.extend(&self.layout.minute_remainder[time.remainder as usize]);
        }
        cells
    }

    /// Show `hour:minute` (24-hour clock) on the panel.
    ///
    /// Errors are logged and returned; the same time is redrawn on the
    /// next call since only successful renders are remembered.
    pub fn update_time(
        &mut self,
        hour: u8,
        minute: u8,
    ) -> Result<RenderOutcome, RenderError<G::Error>> {
        let result = self.try_update(hour, minute);
        if let Err(e) = &result {
            log::error!("Failed to render {hour:02}:{minute:02}: {e}");
        }
        result
    }

    fn try_update(
        &mut self,
        hour: u8,
        minute: u8,
    ) -> Result<RenderOutcome, RenderError<G::Error>> {
        log::debug!("{hour}:{minute}");
        let time = DisplayTime::from_wall_clock(hour, minute)
            .ok_or(RenderError::InvalidTime { hour, minute })?;

        let key = (
            time.quantized_minute,
            if self.options.minute_ticks {
                time.remainder
            } else {
                0
            },
        );
        if self.last_rendered == Some(key) {
            return Ok(RenderOutcome::Unchanged);
        }

        log::debug!("It is {time}");
        self.render(&time).map_err(RenderError::Grid)?;
        self.last_rendered = Some(key);
        Ok(RenderOutcome::Rendered(time))
    }

    fn render(&mut self, time: &DisplayTime) -> Result<(), G::Error> {
        let cells = self.frame(time);

        if self.options.animations {
            self.driver.fade_out()?;
        }
        self.driver.clear()?;
        for cell in cells {
            self.driver.set_led(cell.x, cell.y, true)?;
        }
        if self.options.animations {
            self.driver.fade_in()
        } else {
            self.driver.show()
        }
    }
}

impl<G: fmt::Debug> fmt::Debug for TimeRenderer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeRenderer")
            .field("driver", &self.driver)
            .field("options", &self.options)
            .field("last_rendered", &self.last_rendered)
            .finish()
    }
}
