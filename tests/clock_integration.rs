#![cfg(not(target_os = "espidf"))]

use std::collections::BTreeSet;

use word_clock::chip::{self, ChipRegisterGridDriver};
use word_clock::layout::{LayoutError, TimeLayout};
use word_clock::mock::{NoDelay, RecordingStrip, SimulatedChip};
use word_clock::renderer::{DisplayTime, RenderError, RenderOptions, RenderOutcome, TimeRenderer};
use word_clock::strip::{self, PixelStripGridDriver};
use word_clock::{Coordinate, GridDriver, GridError};

type ChipGrid = ChipRegisterGridDriver<SimulatedChip, NoDelay>;
type StripGrid = PixelStripGridDriver<RecordingStrip, NoDelay>;

/// Helper: chip panel after bring-up.
fn chip_grid() -> ChipGrid {
    ChipRegisterGridDriver::new(SimulatedChip::new(), NoDelay).expect("bring-up succeeds")
}

/// Helper: strip panel in the default colour.
fn strip_grid() -> StripGrid {
    PixelStripGridDriver::new(RecordingStrip::new(), NoDelay, strip::DEFAULT_COLOUR)
}

fn options(animations: bool, minute_ticks: bool) -> RenderOptions {
    RenderOptions {
        animations,
        minute_ticks,
    }
}

/// Cells the strip is currently showing at full colour.
fn strip_lit(grid: &StripGrid) -> BTreeSet<Coordinate> {
    let frame = grid.strip().last_frame().expect("strip was written");
    (0..strip::HEIGHT)
        .flat_map(|y| (0..strip::WIDTH).map(move |x| Coordinate::new(x, y)))
        .filter(|c| {
            strip::pixel_index(c.x, c.y).is_some_and(|i| frame[i] == strip::DEFAULT_COLOUR)
        })
        .collect()
}

// ---------------------------------------------------------------
// Grid contract: clear, set, fade in -> exactly the set is lit
// ---------------------------------------------------------------

#[test]
fn chip_contract_clear_set_fade_in() {
    let mut grid = chip_grid();
    grid.set_led(10, 9, true).unwrap();

    let cells = [Coordinate::new(0, 0), Coordinate::new(5, 5), Coordinate::new(10, 0)];
    grid.clear().unwrap();
    for c in cells {
        grid.set_led(c.x, c.y, true).unwrap();
    }
    grid.fade_in().unwrap();

    assert_eq!(grid.bus().lit_coordinates(), vec![cells[0], cells[2], cells[1]]);
    assert!(grid.bus().is_bright());
}

#[test]
fn strip_contract_clear_set_fade_in() {
    let mut grid = strip_grid();
    grid.set_led(10, 9, true).unwrap();

    let cells: BTreeSet<Coordinate> =
        [Coordinate::new(0, 0), Coordinate::new(5, 5), Coordinate::new(3, 10)].into();
    grid.clear().unwrap();
    for c in &cells {
        grid.set_led(c.x, c.y, true).unwrap();
    }
    grid.fade_in().unwrap();

    assert_eq!(strip_lit(&grid), cells);
}

#[test]
fn both_backends_reject_out_of_bounds() {
    let mut chip = chip_grid();
    let mut strip = strip_grid();

    assert!(matches!(
        chip.set_led(chip::WIDTH, 0, true),
        Err(GridError::OutOfBounds { .. })
    ));
    assert!(matches!(
        chip.set_led(0, chip::HEIGHT, true),
        Err(GridError::OutOfBounds { .. })
    ));
    assert!(matches!(
        strip.set_led(strip::WIDTH, 0, true),
        Err(GridError::OutOfBounds { .. })
    ));
    assert!(matches!(
        strip.set_led(0, strip::HEIGHT, true),
        Err(GridError::OutOfBounds { .. })
    ));
}

#[test]
fn every_cell_has_an_address() {
    for y in 0..chip::HEIGHT {
        for x in 0..chip::WIDTH {
            let (_, mask) = chip::ADDRESS_MAP[y][x];
            assert_ne!(mask, 0, "chip cell ({x}, {y}) has no bit");
        }
    }
    // Only the corner row may be unmapped on the strip
    for y in 0..strip::HEIGHT - 1 {
        for x in 0..strip::WIDTH {
            assert!(strip::pixel_index(x, y).is_some(), "strip cell ({x}, {y})");
        }
    }
}

// ---------------------------------------------------------------
// Rendering a full day on real driver logic
// ---------------------------------------------------------------

#[test]
fn chip_shows_rendered_frame_every_minute() {
    let mut renderer =
        TimeRenderer::new(chip_grid(), TimeLayout::english(), options(true, false)).unwrap();

    for hour in 0..24 {
        for minute in 0..60 {
            renderer.update_time(hour, minute).unwrap();
            let time = DisplayTime::from_wall_clock(hour, minute).unwrap();
            let expected: Vec<Coordinate> = {
                let mut cells: Vec<_> = renderer.frame(&time).into_iter().collect();
                cells.sort_by_key(|c| (c.y, c.x));
                cells
            };
            assert_eq!(
                renderer.driver().bus().lit_coordinates(),
                expected,
                "{hour:02}:{minute:02}"
            );
            assert!(renderer.driver().bus().is_bright());
        }
    }
}

#[test]
fn strip_shows_rendered_frame_with_ticks() {
    let mut renderer =
        TimeRenderer::new(strip_grid(), TimeLayout::english(), options(true, true)).unwrap();

    for minute in 0..60 {
        renderer.update_time(17, minute).unwrap();
        let time = DisplayTime::from_wall_clock(17, minute).unwrap();
        assert_eq!(
            strip_lit(renderer.driver()),
            renderer.frame(&time),
            "17:{minute:02}"
        );
    }
}

#[test]
fn twenty_six_past_one_lights_expected_words() {
    let layout = TimeLayout::english();
    let mut renderer =
        TimeRenderer::new(chip_grid(), layout.clone(), options(false, false)).unwrap();

    let outcome = renderer.update_time(1, 26).unwrap();
    let RenderOutcome::Rendered(time) = outcome else {
        panic!("first update should render");
    };
    assert_eq!(time.quantized_minute, 25);
    assert!(!time.to_next_hour);
    assert_eq!(time.hour, 1);

    let expected: BTreeSet<Coordinate> = layout
        .common
        .iter()
        .chain(&layout.hours[1])
        .chain(&layout.five_minute_marks[5])
        .copied()
        .collect();
    let lit: BTreeSet<Coordinate> = renderer.driver().bus().lit_coordinates().into_iter().collect();
    assert_eq!(lit, expected);
}

#[test]
fn repeated_time_makes_no_bus_traffic() {
    let mut renderer =
        TimeRenderer::new(chip_grid(), TimeLayout::english(), options(true, false)).unwrap();
    renderer.update_time(1, 26).unwrap();
    let writes = renderer.driver().bus().writes();

    assert_eq!(renderer.update_time(1, 26).unwrap(), RenderOutcome::Unchanged);
    assert_eq!(renderer.driver().bus().writes(), writes);
}

#[test]
fn repeated_time_makes_no_strip_traffic() {
    let mut renderer =
        TimeRenderer::new(strip_grid(), TimeLayout::english(), options(true, false)).unwrap();
    renderer.update_time(1, 26).unwrap();
    let frames = renderer.driver().strip().frames().len();

    renderer.update_time(1, 26).unwrap();
    assert_eq!(renderer.driver().strip().frames().len(), frames);
}

#[test]
fn strip_without_animations_shows_rendered_frame() {
    let mut renderer =
        TimeRenderer::new(strip_grid(), TimeLayout::english(), options(false, false)).unwrap();

    for (hour, minute) in [(1, 26), (8, 0), (8, 5), (23, 57)] {
        renderer.update_time(hour, minute).unwrap();
        let time = DisplayTime::from_wall_clock(hour, minute).unwrap();
        assert_eq!(
            strip_lit(renderer.driver()),
            renderer.frame(&time),
            "{hour:02}:{minute:02}"
        );
    }

    // A dark frame from the clear and one full frame per render, no fades
    assert_eq!(renderer.driver().strip().frames().len(), 2 * 4);
}

// ---------------------------------------------------------------
// Failures
// ---------------------------------------------------------------

#[test]
fn minute_ticks_do_not_fit_chip_panel() {
    let result = TimeRenderer::new(chip_grid(), TimeLayout::english(), options(true, true));
    assert!(matches!(
        result,
        Err(LayoutError::OutOfGrid {
            table: "minute_remainder",
            ..
        })
    ));
}

#[test]
fn layout_cell_without_strip_pixel_is_rejected() {
    let mut layout = TimeLayout::english();
    layout.five_minute_marks[0].push(Coordinate::new(5, 10));

    assert!(matches!(
        TimeRenderer::new(strip_grid(), layout, options(true, false)),
        Err(LayoutError::NoLed {
            table: "five_minute_marks",
            ..
        })
    ));
}

#[test]
fn bus_fault_surfaces_and_next_call_retries() {
    let mut renderer =
        TimeRenderer::new(chip_grid(), TimeLayout::english(), options(false, false)).unwrap();
    renderer.update_time(6, 30).unwrap();

    let mut chip = renderer.into_driver().release();
    chip.fail_after(3);
    let grid = ChipRegisterGridDriver::from_initialized(chip, NoDelay);
    let mut renderer =
        TimeRenderer::new(grid, TimeLayout::english(), options(false, false)).unwrap();

    assert!(matches!(
        renderer.update_time(6, 40),
        Err(RenderError::Grid(GridError::Transport(_)))
    ));
}

#[test]
fn invalid_times_are_rejected() {
    let mut renderer =
        TimeRenderer::new(strip_grid(), TimeLayout::english(), options(true, false)).unwrap();

    assert_eq!(
        renderer.update_time(7, 60),
        Err(RenderError::InvalidTime { hour: 7, minute: 60 })
    );
    assert!(renderer.driver().strip().frames().is_empty());
}
