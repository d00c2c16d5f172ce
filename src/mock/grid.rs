use std::collections::BTreeSet;

use crate::{Coordinate, GridDriver, GridError, check_bounds};

/// A call made on a [`RecordingGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCall {
    SetLed { x: usize, y: usize, value: bool },
    Clear,
    FadeIn,
    FadeOut,
    Show,
}

/// Error from [`RecordingGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("injected grid fault")]
pub struct MockGridError;

/// Grid driver that records every call and tracks which cells are lit.
///
/// Uses the strip panel's dimensions and pixel map so every layout
/// table fits.
#[derive(Debug, Clone)]
pub struct RecordingGrid {
    calls: Vec<GridCall>,
    lit: BTreeSet<Coordinate>,
    bright: bool,
    fail_next_clear: bool,
}

impl Default for RecordingGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGrid {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            lit: BTreeSet::new(),
            bright: true,
            fail_next_clear: false,
        }
    }

    #[inline]
    pub fn calls(&self) -> &[GridCall] {
        &self.calls
    }

    /// Cells currently enabled.
    #[inline]
    pub fn lit(&self) -> &BTreeSet<Coordinate> {
        &self.lit
    }

    /// Whether the last fade or show left the panel at full brightness.
    #[inline]
    pub fn is_bright(&self) -> bool {
        self.bright
    }

    /// Make the next `clear` fail with [`MockGridError`].
    pub fn fail_next_clear(&mut self) {
        self.fail_next_clear = true;
    }
}

impl GridDriver for RecordingGrid {
    type Error = GridError<MockGridError>;

    const WIDTH: usize = crate::strip::WIDTH;
    const HEIGHT: usize = crate::strip::HEIGHT;

    fn set_led(&mut self, x: usize, y: usize, value: bool) -> Result<(), Self::Error> {
        check_bounds::<MockGridError>(x, y, Self::WIDTH, Self::HEIGHT)?;
        self.calls.push(GridCall::SetLed { x, y, value });
        if value {
            self.lit.insert(Coordinate::new(x, y));
        } else {
            self.lit.remove(&Coordinate::new(x, y));
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        if std::mem::take(&mut self.fail_next_clear) {
            return Err(GridError::Transport(MockGridError));
        }
        self.calls.push(GridCall::Clear);
        self.lit.clear();
        Ok(())
    }

    fn fade_in(&mut self) -> Result<(), Self::Error> {
        self.calls.push(GridCall::FadeIn);
        self.bright = true;
        Ok(())
    }

    fn fade_out(&mut self) -> Result<(), Self::Error> {
        self.calls.push(GridCall::FadeOut);
        self.bright = false;
        Ok(())
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        self.calls.push(GridCall::Show);
        self.bright = true;
        Ok(())
    }

    fn has_led(x: usize, y: usize) -> bool {
        crate::strip::pixel_index(x, y).is_some()
    }
}
