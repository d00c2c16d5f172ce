//! Grid driver for an AS1130-style LED driver chip.
//!
//! The chip exposes one byte-addressed register space whose meaning
//! depends on the currently selected RAM section. Writing a section id
//! to [`REG_SELECTION`] makes every following read/write address that
//! section until another section is selected.

use embedded_hal::delay::DelayNs;

use crate::transport::RegisterBus;
use crate::{GridDriver, GridError, check_bounds};

/// Section select register, valid in every section.
pub const REG_SELECTION: u8 = 0xFD;

/// Number of columns on the chip panel.
pub const WIDTH: usize = 11;

/// Number of rows on the chip panel.
pub const HEIGHT: usize = 10;

// Control section registers
const REG_PICTURE: u8 = 0x00;
const REG_DISPLAY_OPTION: u8 = 0x04;
const REG_CURRENT_SOURCE: u8 = 0x05;
const REG_CONFIG: u8 = 0x06;
const REG_SHUTDOWN: u8 = 0x09;

/// On/off bytes of a frame.
const FRAME_ADDRESSES: std::ops::RangeInclusive<u8> = 0x00..=0x17;

/// Blink bits in the blink & PWM section.
const BLINK_ADDRESSES: std::ops::RangeInclusive<u8> = 0x00..=0x17;

/// Per-LED PWM values in the blink & PWM section.
const PWM_ADDRESSES: std::ops::RangeInclusive<u8> = 0x18..=0x9B;

/// Brightness levels used by the fades, `0..=FADE_MAX_LEVEL`.
pub const FADE_MAX_LEVEL: u8 = 100;

/// Delay between two fade steps.
const FADE_STEP_DELAY_US: u32 = 100;

/// Delay before talking to a freshly powered chip.
const STARTUP_DELAY_MS: u32 = 10;

/// RAM sections of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// On/off frame 0.
    Frame,
    /// Blink & PWM set 0, holding the brightness table.
    BlinkPwm,
    /// Control registers.
    Control,
}

impl Section {
    /// Value written to [`REG_SELECTION`] to select this section.
    #[inline]
    pub const fn id(self) -> u8 {
        match self {
            Section::Frame => 0x01,
            Section::BlinkPwm => 0x40,
            Section::Control => 0xC0,
        }
    }

    /// Inverse of [`Section::id`].
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0x01 => Some(Section::Frame),
            0x40 => Some(Section::BlinkPwm),
            0xC0 => Some(Section::Control),
            _ => None,
        }
    }
}

/// Frame address of each LED as `(byte address, bit mask)`, indexed `[y][x]`.
///
/// The wiring follows the chip's segment layout, so rows wrap into the
/// neighbouring segment bytes.
pub const ADDRESS_MAP: [[(u8, u8); WIDTH]; HEIGHT] = [
    [(0x01, 0x02), (0x01, 0x01), (0x00, 0x80), (0x00, 0x40), (0x00, 0x20), (0x00, 0x10), (0x00, 0x08), (0x00, 0x04), (0x00, 0x02), (0x00, 0x01), (0x02, 0x01)],
    [(0x03, 0x02), (0x03, 0x01), (0x02, 0x80), (0x02, 0x40), (0x02, 0x20), (0x02, 0x10), (0x02, 0x08), (0x02, 0x04), (0x02, 0x02), (0x04, 0x02), (0x04, 0x01)],
    [(0x05, 0x02), (0x05, 0x01), (0x04, 0x80), (0x04, 0x40), (0x04, 0x20), (0x04, 0x10), (0x04, 0x08), (0x04, 0x04), (0x06, 0x04), (0x06, 0x02), (0x06, 0x01)],
    [(0x07, 0x02), (0x07, 0x01), (0x06, 0x80), (0x06, 0x40), (0x06, 0x20), (0x06, 0x10), (0x06, 0x08), (0x08, 0x08), (0x08, 0x04), (0x08, 0x02), (0x08, 0x01)],
    [(0x09, 0x02), (0x09, 0x01), (0x08, 0x80), (0x08, 0x40), (0x08, 0x20), (0x08, 0x10), (0x0A, 0x10), (0x0A, 0x08), (0x0A, 0x04), (0x0A, 0x02), (0x0A, 0x01)],
    [(0x0B, 0x02), (0x0B, 0x01), (0x0A, 0x80), (0x0A, 0x40), (0x0A, 0x20), (0x0C, 0x20), (0x0C, 0x10), (0x0C, 0x08), (0x0C, 0x04), (0x0C, 0x02), (0x0C, 0x01)],
    [(0x0D, 0x02), (0x0D, 0x01), (0x0C, 0x80), (0x0C, 0x40), (0x0E, 0x40), (0x0E, 0x20), (0x0E, 0x10), (0x0E, 0x08), (0x0E, 0x04), (0x0E, 0x02), (0x0E, 0x01)],
    [(0x0F, 0x02), (0x0F, 0x01), (0x0E, 0x80), (0x10, 0x80), (0x10, 0x40), (0x10, 0x20), (0x10, 0x10), (0x10, 0x08), (0x10, 0x04), (0x10, 0x02), (0x10, 0x01)],
    [(0x11, 0x02), (0x11, 0x01), (0x13, 0x01), (0x12, 0x80), (0x12, 0x40), (0x12, 0x20), (0x12, 0x10), (0x12, 0x08), (0x12, 0x04), (0x12, 0x02), (0x12, 0x01)],
    [(0x13, 0x02), (0x15, 0x02), (0x15, 0x01), (0x14, 0x80), (0x14, 0x40), (0x14, 0x20), (0x14, 0x10), (0x14, 0x08), (0x14, 0x04), (0x14, 0x02), (0x14, 0x01)],
];

/// Scale a fade level to the chip's 8-bit PWM range.
#[inline]
pub const fn pwm_for_level(level: u8) -> u8 {
    (0xFF * level as u16 / FADE_MAX_LEVEL as u16) as u8
}

/// Word clock panel driven by an AS1130-style chip.
///
/// Lit cells live in the chip's frame memory, so there is no separate
/// enable buffer. Fades change one global brightness for the whole panel.
/// Register access is read-modify-write and assumes this driver is the
/// only user of the bus.
#[derive(Debug)]
pub struct ChipRegisterGridDriver<B, D> {
    bus: B,
    delay: D,
}

impl<B, D> ChipRegisterGridDriver<B, D>
where
    B: RegisterBus,
    D: DelayNs,
{
    /// Bring up the chip behind `bus` and return a driver for it.
    ///
    /// Leaves the frame dark and the brightness table at full scale.
    pub fn new(bus: B, delay: D) -> Result<Self, GridError<B::Error>> {
        let mut driver = Self { bus, delay };
        driver.bring_up()?;
        Ok(driver)
    }

    /// Wrap a chip that was already brought up elsewhere.
    pub fn from_initialized(bus: B, delay: D) -> Self {
        Self { bus, delay }
    }

    /// Access the underlying bus.
    #[inline]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Consume the driver, returning the bus.
    pub fn release(self) -> B {
        self.bus
    }

    /// Run the power-on configuration sequence.
    ///
    /// RAM configuration 1, frame cleared, no blinking, full PWM,
    /// maximum current, picture mode on frame 0, full scan limit and
    /// finally leave shutdown.
    pub fn bring_up(&mut self) -> Result<(), GridError<B::Error>> {
        log::info!("Bringing up LED driver chip");
        self.delay.delay_ms(STARTUP_DELAY_MS);

        self.select(Section::Control)?;
        self.write(REG_CONFIG, 0x01)?;
        self.clear_frame()?;
        self.fill(Section::BlinkPwm, BLINK_ADDRESSES, 0x00)?;
        self.fill(Section::BlinkPwm, PWM_ADDRESSES, 0xFF)?;

        self.select(Section::Control)?;
        self.write(REG_CURRENT_SOURCE, 0xFF)?;
        self.write(REG_PICTURE, 0b0100_0000)?;
        self.write(REG_DISPLAY_OPTION, 0b0010_1010)?;
        self.write(REG_SHUTDOWN, 0x03)?;
        Ok(())
    }

    /// Read all 256 addresses of `section` and log them as a hex table.
    pub fn dump(&mut self, section: Section) -> Result<[u8; 256], GridError<B::Error>> {
        self.select(section)?;
        let mut bytes = [0u8; 256];
        for (address, byte) in (0..=u8::MAX).zip(bytes.iter_mut()) {
            *byte = self.read(address)?;
        }

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Dump of section {section:?} ({:#04x}):", section.id());
            for (row, chunk) in bytes.chunks(16).enumerate() {
                let line = chunk
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                log::debug!("{:02x}: {line}", row * 16);
            }
        }
        Ok(bytes)
    }

    fn select(&mut self, section: Section) -> Result<(), GridError<B::Error>> {
        self.write(REG_SELECTION, section.id())
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), GridError<B::Error>> {
        self.bus
            .write(register, value)
            .map_err(GridError::Transport)
    }

    fn read(&mut self, register: u8) -> Result<u8, GridError<B::Error>> {
        self.bus.read(register).map_err(GridError::Transport)
    }

    fn fill(
        &mut self,
        section: Section,
        addresses: std::ops::RangeInclusive<u8>,
        value: u8,
    ) -> Result<(), GridError<B::Error>> {
        self.select(section)?;
        for address in addresses {
            self.write(address, value)?;
        }
        Ok(())
    }

    fn clear_frame(&mut self) -> Result<(), GridError<B::Error>> {
        self.fill(Section::Frame, FRAME_ADDRESSES, 0x00)
    }

    fn set_pwm_all(&mut self, value: u8) -> Result<(), GridError<B::Error>> {
        self.fill(Section::BlinkPwm, PWM_ADDRESSES, value)
    }

    fn fade(&mut self, levels: impl Iterator<Item = u8>) -> Result<(), GridError<B::Error>> {
        for level in levels {
            self.set_pwm_all(pwm_for_level(level))?;
            self.delay.delay_us(FADE_STEP_DELAY_US);
        }
        Ok(())
    }
}

impl<B, D> GridDriver for ChipRegisterGridDriver<B, D>
where
    B: RegisterBus,
    D: DelayNs,
{
    type Error = GridError<B::Error>;

    const WIDTH: usize = WIDTH;
    const HEIGHT: usize = HEIGHT;

    fn set_led(&mut self, x: usize, y: usize, value: bool) -> Result<(), Self::Error> {
        check_bounds::<B::Error>(x, y, WIDTH, HEIGHT)?;
        let (address, mask) = ADDRESS_MAP[y][x];

        self.select(Section::Frame)?;
        let current = self.read(address)?;
        let updated = if value {
            current | mask
        } else {
            current & !mask
        };
        self.write(address, updated)
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        log::trace!("Clearing chip frame");
        self.clear_frame()
    }

    fn fade_in(&mut self) -> Result<(), Self::Error> {
        log::trace!("Fading chip in");
        self.fade(0..=FADE_MAX_LEVEL)
    }

    fn fade_out(&mut self) -> Result<(), Self::Error> {
        log::trace!("Fading chip out");
        self.fade((0..=FADE_MAX_LEVEL).rev())
    }
}
