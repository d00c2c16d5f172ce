use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver, I2cError};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use crate::GridError;
use crate::chip::ChipRegisterGridDriver;
use crate::config::{Backend, ClockConfig};
use crate::transport::I2cRegisterBus;

/// I2C clock for the LED driver chip.
const I2C_BAUDRATE: Hertz = Hertz(400_000);

/// Chip panel on the ESP32's first I2C controller.
pub type Esp32ChipGrid = ChipRegisterGridDriver<I2cRegisterBus<I2cDriver<'static>>, FreeRtos>;

/// Error types for ESP32 panel setup.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("ESP-IDF error: {0}")]
    Esp(#[from] EspError),

    #[error("LED driver chip bring-up failed: {0}")]
    BringUp(GridError<I2cError>),

    #[error("backend {0:?} is not available on this board")]
    Unsupported(Backend),
}

/// Bring up the LED driver chip wired to I2C0 (SDA GPIO21, SCL GPIO22).
pub fn open_chip_grid(config: &ClockConfig) -> Result<Esp32ChipGrid, PanelError> {
    if config.backend != Backend::Chip {
        return Err(PanelError::Unsupported(config.backend));
    }

    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE);
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    )?;

    log::info!("LED driver chip at I2C address {:#04x}", config.chip.address);
    let bus = I2cRegisterBus::new(i2c, config.chip.address);
    ChipRegisterGridDriver::new(bus, FreeRtos).map_err(PanelError::BringUp)
}
