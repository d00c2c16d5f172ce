use embedded_hal::delay::DelayNs;
use time::OffsetDateTime;

use crate::GridDriver;
use crate::renderer::{RenderError, RenderOutcome, TimeRenderer};

/// Trait for reading the current wall-clock time.
pub trait TimeSource {
    /// Current `(hour, minute)` on a 24-hour clock.
    fn now(&mut self) -> (u8, u8);
}

/// Local time from the system clock.
///
/// Falls back to UTC when the local offset cannot be determined,
/// which is common on embedded targets without a timezone database.
#[derive(Debug, Default)]
pub struct LocalTime {
    warned: bool,
}

impl LocalTime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for LocalTime {
    fn now(&mut self) -> (u8, u8) {
        let now = OffsetDateTime::now_local().unwrap_or_else(|e| {
            if !self.warned {
                log::warn!("Local time offset unavailable ({e}), using UTC");
                self.warned = true;
            }
            OffsetDateTime::now_utc()
        });
        (now.hour(), now.minute())
    }
}

/// Polls a [`TimeSource`] and keeps the panel up to date.
///
/// Each tick renders the latest time; a tick that arrives while a fade
/// is running simply waits, so triggers never pile up.
#[derive(Debug)]
pub struct Clock<G, T> {
    renderer: TimeRenderer<G>,
    source: T,
    interval_ms: u32,
}

impl<G: GridDriver, T: TimeSource> Clock<G, T> {
    pub fn new(renderer: TimeRenderer<G>, source: T, interval_ms: u32) -> Self {
        Self {
            renderer,
            source,
            interval_ms,
        }
    }

    #[inline]
    pub fn renderer(&self) -> &TimeRenderer<G> {
        &self.renderer
    }

    /// Render the current time once.
    pub fn tick(&mut self) -> Result<RenderOutcome, RenderError<G::Error>> {
        let (hour, minute) = self.source.now();
        self.renderer.update_time(hour, minute)
    }

    /// Tick forever, sleeping `interval_ms` between ticks.
    ///
    /// Render failures are already logged by the renderer and retried
    /// on the next tick.
    pub fn run(&mut self, delay: &mut impl DelayNs) -> ! {
        log::info!("Clock running, polling every {} ms", self.interval_ms);
        loop {
            // Logged by the renderer
            let _ = self.tick();
            delay.delay_ms(self.interval_ms);
        }
    }
}

/// Render every minute of a day in order, calling `on_step` after each.
///
/// Returns the number of times the panel was actually redrawn. Stops at
/// the first failure.
pub fn sweep_day<G: GridDriver>(
    renderer: &mut TimeRenderer<G>,
    mut on_step: impl FnMut(u8, u8, &RenderOutcome),
) -> Result<usize, RenderError<G::Error>> {
    let mut renders = 0;
    for hour in 0..24 {
        for minute in 0..60 {
            let outcome = renderer.update_time(hour, minute)?;
            if matches!(outcome, RenderOutcome::Rendered(_)) {
                renders += 1;
            }
            on_step(hour, minute, &outcome);
        }
    }
    Ok(renders)
}
