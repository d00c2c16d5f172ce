mod panel;

pub use panel::{Esp32ChipGrid, PanelError, open_chip_grid};
