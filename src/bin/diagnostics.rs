//! Drives every minute of a day through the renderer with animations
//! off, so every word of the panel lights up at least once.

use word_clock::clock::sweep_day;
use word_clock::config::ClockConfig;
use word_clock::layout::TimeLayout;
use word_clock::renderer::{RenderOptions, RenderOutcome, TimeRenderer};

const OPTIONS: RenderOptions = RenderOptions {
    animations: false,
    minute_ticks: false,
};

#[cfg(target_os = "espidf")]
fn main() {
    use embedded_hal::delay::DelayNs;
    use esp_idf_svc::hal::delay::FreeRtos;

    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Word Clock diagnostics - ESP32");

    let result = ClockConfig::builtin()
        .map_err(|e| e.to_string())
        .and_then(|config| word_clock::esp32::open_chip_grid(&config).map_err(|e| e.to_string()))
        .and_then(|driver| {
            TimeRenderer::new(driver, TimeLayout::english(), OPTIONS).map_err(|e| e.to_string())
        });
    let mut renderer = match result {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    let mut delay = FreeRtos;
    match sweep_day(&mut renderer, |hour, minute, outcome| {
        if let RenderOutcome::Rendered(time) = outcome {
            log::info!("{hour:02}:{minute:02} -> {time}");
        }
        delay.delay_ms(100);
    }) {
        Ok(renders) => log::info!("Sweep done, {renders} renders"),
        Err(e) => log::error!("Sweep failed: {e}"),
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use word_clock::chip::ChipRegisterGridDriver;
    use word_clock::mock::{NoDelay, RecordingStrip, SimulatedChip};
    use word_clock::strip::PixelStripGridDriver;

    let config = match ClockConfig::builtin() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let chip = match ChipRegisterGridDriver::new(SimulatedChip::new(), NoDelay) {
        Ok(chip) => chip,
        Err(e) => {
            eprintln!("Chip bring-up failed: {e}");
            std::process::exit(1);
        }
    };
    let strip = PixelStripGridDriver::new(
        RecordingStrip::with_history(1),
        NoDelay,
        config.strip.colour(),
    );

    let mut failed = false;
    match TimeRenderer::new(chip, TimeLayout::english(), OPTIONS) {
        Ok(mut renderer) => failed |= !report("chip", &mut renderer),
        Err(e) => {
            eprintln!("chip: {e}");
            failed = true;
        }
    }
    match TimeRenderer::new(strip, TimeLayout::english(), OPTIONS) {
        Ok(mut renderer) => failed |= !report("strip", &mut renderer),
        Err(e) => {
            eprintln!("strip: {e}");
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "espidf"))]
fn report<G: word_clock::GridDriver>(name: &str, renderer: &mut TimeRenderer<G>) -> bool {
    let mut shown = std::collections::BTreeSet::new();
    let result = sweep_day(renderer, |_, _, outcome| {
        if let RenderOutcome::Rendered(time) = outcome {
            shown.insert(time.to_string());
        }
    });

    match result {
        Ok(renders) => {
            println!(
                "{name}: {renders} renders, {} distinct times shown",
                shown.len()
            );
            true
        }
        Err(e) => {
            eprintln!("{name}: sweep failed: {e}");
            false
        }
    }
}
