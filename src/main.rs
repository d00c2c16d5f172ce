use word_clock::config::ClockConfig;

#[cfg(target_os = "espidf")]
fn main() {
    use esp_idf_svc::hal::delay::FreeRtos;
    use word_clock::clock::{Clock, LocalTime};
    use word_clock::renderer::TimeRenderer;

    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Word Clock - ESP32");

    let config = match ClockConfig::builtin() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let driver = match word_clock::esp32::open_chip_grid(&config) {
        Ok(driver) => driver,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let renderer = match TimeRenderer::new(driver, config.layout(), config.render_options()) {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    Clock::new(renderer, LocalTime::new(), config.poll_interval_ms).run(&mut FreeRtos)
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    let config = match std::env::args_os().nth(1) {
        Some(path) => ClockConfig::load(path.as_ref()),
        None => ClockConfig::builtin(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = word_clock::mock::run_simulator(&config) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
