use embedded_hal::delay::DelayNs;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::{GridDriver, GridError, check_bounds};

/// Number of columns on the strip panel.
pub const WIDTH: usize = 11;

/// Number of rows on the strip panel; the last row holds the four corner pixels.
pub const HEIGHT: usize = 10 + 1;

/// Number of pixels on the strip.
pub const PIXEL_COUNT: usize = 114;

/// Brightness levels used by the fades, `0..=MAX_LEVEL`.
pub const MAX_LEVEL: u8 = 5;

/// Delay between two fade steps.
const FADE_STEP_DELAY_US: u32 = 100;

pub const DEFAULT_COLOUR: RGB8 = RGB8::new(255, 255, 255);

const OFF: RGB8 = RGB8::new(0, 0, 0);

/// Strip index of each cell, indexed `[y][x]`; `None` where no pixel exists.
///
/// The strip snakes through the panel row by row, then finishes with
/// the four corner pixels.
pub const ADDRESS_MAP: [[Option<u8>; WIDTH]; HEIGHT] = {
    let mut map = [[None; WIDTH]; HEIGHT];
    let mut y = 0;
    while y < HEIGHT - 1 {
        let mut x = 0;
        while x < WIDTH {
            let column = if y % 2 == 0 { x } else { WIDTH - 1 - x };
            map[y][x] = Some((y * WIDTH + column) as u8);
            x += 1;
        }
        y += 1;
    }
    let mut corner = 0;
    while corner < 4 {
        map[HEIGHT - 1][corner] = Some(((HEIGHT - 1) * WIDTH + corner) as u8);
        corner += 1;
    }
    map
};

/// Strip index of the cell at `(x, y)`, if it has a pixel.
#[inline]
pub fn pixel_index(x: usize, y: usize) -> Option<usize> {
    ADDRESS_MAP
        .get(y)
        .and_then(|row| row.get(x))
        .copied()
        .flatten()
        .map(usize::from)
}

/// Scale `colour` to fade `level`, component by component.
pub fn scale_colour(colour: RGB8, level: u8) -> RGB8 {
    let level = level.min(MAX_LEVEL) as u16;
    let scale = |c: u8| (c as u16 * level / MAX_LEVEL as u16) as u8;
    RGB8::new(scale(colour.r), scale(colour.g), scale(colour.b))
}

/// Word clock panel made of an addressable pixel strip.
///
/// Keeps an enable flag per pixel; nothing reaches the strip until a
/// clear, a fade or `show` transmits the whole buffer.
#[derive(Debug)]
pub struct PixelStripGridDriver<S, D> {
    strip: S,
    delay: D,
    colour: RGB8,
    enabled: [bool; PIXEL_COUNT],
}

impl<S, D> PixelStripGridDriver<S, D>
where
    S: SmartLedsWrite,
    S::Color: From<RGB8>,
    S::Error: std::fmt::Debug,
    D: DelayNs,
{
    pub fn new(strip: S, delay: D, colour: RGB8) -> Self {
        log::info!(
            "Setup grid {WIDTH}x{HEIGHT} with {PIXEL_COUNT} pixels of colour ({}, {}, {})",
            colour.r,
            colour.g,
            colour.b
        );
        Self {
            strip,
            delay,
            colour,
            enabled: [false; PIXEL_COUNT],
        }
    }

    /// Access the underlying strip.
    #[inline]
    pub fn strip(&self) -> &S {
        &self.strip
    }

    /// Whether the pixel at strip index `index` is enabled.
    #[inline]
    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.get(index).copied().unwrap_or(false)
    }

    /// Consume the driver, returning the strip.
    pub fn release(self) -> S {
        self.strip
    }

    /// Transmit the enable buffer with enabled pixels at `level`.
    fn transmit(&mut self, level: u8) -> Result<(), GridError<S::Error>> {
        let lit = scale_colour(self.colour, level);
        let pixels = self.enabled.map(|on| if on { lit } else { OFF });
        self.strip.write(pixels).map_err(GridError::Transport)
    }

    fn fade(&mut self, levels: impl Iterator<Item = u8>) -> Result<(), GridError<S::Error>> {
        for level in levels {
            self.transmit(level)?;
            self.delay.delay_us(FADE_STEP_DELAY_US);
        }
        Ok(())
    }
}

impl<S, D> GridDriver for PixelStripGridDriver<S, D>
where
    S: SmartLedsWrite,
    S::Color: From<RGB8>,
    S::Error: std::fmt::Debug,
    D: DelayNs,
{
    type Error = GridError<S::Error>;

    const WIDTH: usize = WIDTH;
    const HEIGHT: usize = HEIGHT;

    fn set_led(&mut self, x: usize, y: usize, value: bool) -> Result<(), Self::Error> {
        check_bounds::<S::Error>(x, y, WIDTH, HEIGHT)?;
        if let Some(index) = pixel_index(x, y) {
            self.enabled[index] = value;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        log::trace!("Clearing strip");
        self.enabled = [false; PIXEL_COUNT];
        self.transmit(0)
    }

    fn fade_in(&mut self) -> Result<(), Self::Error> {
        log::trace!("Fading strip in");
        self.fade(0..=MAX_LEVEL)
    }

    fn fade_out(&mut self) -> Result<(), Self::Error> {
        log::trace!("Fading strip out");
        self.fade((0..=MAX_LEVEL).rev())
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        self.transmit(MAX_LEVEL)
    }

    fn has_led(x: usize, y: usize) -> bool {
        pixel_index(x, y).is_some()
    }
}
