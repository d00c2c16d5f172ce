use crate::Coordinate;
use crate::chip::{ADDRESS_MAP, REG_SELECTION, Section};
use crate::transport::RegisterBus;

/// Error from the simulated register bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimulatedBusError {
    #[error("no RAM section selected")]
    NoSectionSelected,

    #[error("unknown RAM section {0:#04x}")]
    UnknownSection(u8),

    #[error("injected bus fault")]
    Injected,
}

/// In-memory model of an AS1130-style register bank.
///
/// Tracks the selected RAM section and keeps 256 bytes per section,
/// so drivers can be checked against what would end up on the chip.
#[derive(Debug, Clone)]
pub struct SimulatedChip {
    frame: [u8; 256],
    blink_pwm: [u8; 256],
    control: [u8; 256],
    selected: Option<Section>,
    writes: usize,
    fail_after: Option<usize>,
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChip {
    /// Create a chip with every register zeroed and no section selected.
    pub fn new() -> Self {
        Self {
            frame: [0; 256],
            blink_pwm: [0; 256],
            control: [0; 256],
            selected: None,
            writes: 0,
            fail_after: None,
        }
    }

    /// Current value of `address` in `section`.
    #[inline]
    pub fn register(&self, section: Section, address: u8) -> u8 {
        self.bank(section)[address as usize]
    }

    /// Number of successful writes so far, section selects included.
    #[inline]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Fail every bus access after `count` more successful ones.
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(count);
    }

    /// Cells whose frame bit is set, in row-major order.
    pub fn lit_coordinates(&self) -> Vec<Coordinate> {
        ADDRESS_MAP
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(move |(_, (address, mask))| self.frame[*address as usize] & mask != 0)
                    .map(move |(x, _)| Coordinate::new(x, y))
            })
            .collect()
    }

    /// Whether every PWM entry is at full scale.
    pub fn is_bright(&self) -> bool {
        self.blink_pwm[0x18..=0x9B].iter().all(|&pwm| pwm == 0xFF)
    }

    fn bank(&self, section: Section) -> &[u8; 256] {
        match section {
            Section::Frame => &self.frame,
            Section::BlinkPwm => &self.blink_pwm,
            Section::Control => &self.control,
        }
    }

    fn bank_mut(&mut self, section: Section) -> &mut [u8; 256] {
        match section {
            Section::Frame => &mut self.frame,
            Section::BlinkPwm => &mut self.blink_pwm,
            Section::Control => &mut self.control,
        }
    }

    fn check_fault(&mut self) -> Result<(), SimulatedBusError> {
        match self.fail_after {
            Some(0) => Err(SimulatedBusError::Injected),
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl RegisterBus for SimulatedChip {
    type Error = SimulatedBusError;

    fn write(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.check_fault()?;
        if register == REG_SELECTION {
            let section =
                Section::from_id(value).ok_or(SimulatedBusError::UnknownSection(value))?;
            self.selected = Some(section);
        } else {
            let section = self.selected.ok_or(SimulatedBusError::NoSectionSelected)?;
            self.bank_mut(section)[register as usize] = value;
        }
        self.writes += 1;
        Ok(())
    }

    fn read(&mut self, register: u8) -> Result<u8, Self::Error> {
        self.check_fault()?;
        let section = self.selected.ok_or(SimulatedBusError::NoSectionSelected)?;
        Ok(self.bank(section)[register as usize])
    }
}
