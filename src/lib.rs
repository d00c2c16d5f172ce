use serde::Deserialize;

pub mod chip;
pub mod clock;
pub mod config;
pub mod layout;
pub mod renderer;
pub mod strip;
pub mod transport;

/// A cell on the word clock panel.
///
/// `x` counts columns from the left, `y` counts rows from the top.
/// Deserializes from a two-element `[x, y]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(from = "(usize, usize)")]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors shared by every grid driver backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError<E> {
    /// The requested cell is outside the backend's grid.
    #[error("LED ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// The bus or strip underneath the driver failed.
    #[error("transport fault: {0:?}")]
    Transport(E),
}

/// Trait for driving the LEDs of the word clock panel.
///
/// Abstracts over the register-addressed LED driver chip and the
/// addressable pixel strip, providing a uniform interface for
/// [`renderer::TimeRenderer`].
///
/// For any backend, `clear()`, then `set_led` for each cell of a set `S`,
/// then `fade_in()` or `show()` leaves exactly the cells of `S` lit at
/// full brightness.
pub trait GridDriver {
    /// Error type for driver operations.
    type Error: std::fmt::Debug + std::fmt::Display;

    /// Number of columns on the panel.
    const WIDTH: usize;

    /// Number of rows on the panel.
    const HEIGHT: usize;

    /// Mark a single cell as on or off.
    ///
    /// Fails with an out-of-bounds error if `x >= WIDTH` or `y >= HEIGHT`.
    /// Does not necessarily make the change visible.
    fn set_led(&mut self, x: usize, y: usize, value: bool) -> Result<(), Self::Error>;

    /// Turn every cell off immediately, without animation.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Ramp brightness from minimum to maximum, blocking until done.
    fn fade_in(&mut self) -> Result<(), Self::Error>;

    /// Ramp brightness from maximum to minimum, blocking until done.
    ///
    /// Leaves the panel dark but keeps the enabled cells enabled.
    fn fade_out(&mut self) -> Result<(), Self::Error>;

    /// Make the enabled cells visible at full brightness without a fade.
    ///
    /// Backends whose `set_led` already reaches the panel keep the default.
    fn show(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Whether the cell at `(x, y)` has an LED behind it.
    fn has_led(x: usize, y: usize) -> bool {
        x < Self::WIDTH && y < Self::HEIGHT
    }
}

/// Reject coordinates outside a `width`×`height` grid.
pub(crate) fn check_bounds<E>(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Result<(), GridError<E>> {
    if x < width && y < height {
        Ok(())
    } else {
        Err(GridError::OutOfBounds {
            x,
            y,
            width,
            height,
        })
    }
}

#[cfg(target_os = "espidf")]
pub mod esp32;

#[cfg(not(target_os = "espidf"))]
pub mod mock;
