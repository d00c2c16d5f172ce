use serde::Deserialize;

use crate::Coordinate;

/// Error when a layout does not fit the panel it is rendered on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{table} uses LED {coordinate} outside the {width}x{height} grid")]
    OutOfGrid {
        table: &'static str,
        coordinate: Coordinate,
        width: usize,
        height: usize,
    },

    #[error("{table} uses cell {coordinate}, which has no LED")]
    NoLed {
        table: &'static str,
        coordinate: Coordinate,
    },
}

/// Which cells spell out which part of the time.
///
/// Every hour, five-minute mark and minute remainder has an entry by
/// construction, so lookups never miss. Only the coordinates themselves
/// need checking against a panel, see [`TimeLayout::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeLayout {
    /// Always lit ("IT IS").
    pub common: Vec<Coordinate>,
    /// Hour words, indexed by hour on a 12-hour dial.
    pub hours: [Vec<Coordinate>; 12],
    /// Minute phrases, indexed by quantized minute / 5.
    pub five_minute_marks: [Vec<Coordinate>; 12],
    /// Corner ticks, indexed by minutes past the last multiple of five.
    #[serde(default)]
    pub minute_remainder: [Vec<Coordinate>; 5],
}

fn cells(coords: &[(usize, usize)]) -> Vec<Coordinate> {
    coords.iter().copied().map(Coordinate::from).collect()
}

fn row(y: usize, xs: std::ops::RangeInclusive<usize>) -> Vec<(usize, usize)> {
    xs.map(|x| (x, y)).collect()
}

impl TimeLayout {
    /// The English front plate:
    ///
    /// ```text
    /// ITLISASTIME
    /// ACQUARTERDC
    /// TWENTYFIVEX
    /// HALFSTENFTO
    /// PASTERUNINE
    /// ONESIXTHREE
    /// FOURFIVETWO
    /// EIGHTELEVEN
    /// SEVENTWELVE
    /// TENSEOCLOCK
    /// ```
    ///
    /// Below the grid sit four corner pixels counting single minutes.
    pub fn english() -> Self {
        let past = row(4, 0..=3);
        let to = row(3, 9..=10);
        let five = row(2, 6..=9);
        let ten = row(3, 5..=7);
        let quarter = row(1, 2..=8);
        let twenty = row(2, 0..=5);
        let twenty_five = row(2, 0..=9);
        let half = row(3, 0..=3);
        let phrase = |minutes: &[(usize, usize)], direction: &[(usize, usize)]| {
            cells(&[minutes, direction].concat())
        };

        Self {
            common: cells(&[(0, 0), (1, 0), (3, 0), (4, 0)]),
            hours: [
                cells(&row(8, 5..=10)), // TWELVE
                cells(&row(5, 0..=2)),  // ONE
                cells(&row(6, 8..=10)), // TWO
                cells(&row(5, 6..=10)), // THREE
                cells(&row(6, 0..=3)),  // FOUR
                cells(&row(6, 4..=7)),  // FIVE
                cells(&row(5, 3..=5)),  // SIX
                cells(&row(8, 0..=4)),  // SEVEN
                cells(&row(7, 0..=4)),  // EIGHT
                cells(&row(4, 7..=10)), // NINE
                cells(&row(9, 0..=2)),  // TEN
                cells(&row(7, 5..=10)), // ELEVEN
            ],
            five_minute_marks: [
                cells(&row(9, 5..=10)), // O'CLOCK
                phrase(&five, &past),
                phrase(&ten, &past),
                phrase(&quarter, &past),
                phrase(&twenty, &past),
                phrase(&twenty_five, &past),
                phrase(&half, &past),
                phrase(&twenty_five, &to),
                phrase(&twenty, &to),
                phrase(&quarter, &to),
                phrase(&ten, &to),
                phrase(&five, &to),
            ],
            minute_remainder: [
                Vec::new(),
                cells(&[(0, 10)]),
                cells(&[(0, 10), (1, 10)]),
                cells(&[(0, 10), (1, 10), (2, 10)]),
                cells(&[(0, 10), (1, 10), (2, 10), (3, 10)]),
            ],
        }
    }

    /// Check every coordinate against a `width`×`height` panel whose
    /// populated cells are given by `has_led`.
    ///
    /// Minute remainders are only checked when `minute_ticks` is set,
    /// since they are never rendered otherwise.
    pub fn validate(
        &self,
        width: usize,
        height: usize,
        minute_ticks: bool,
        has_led: impl Fn(usize, usize) -> bool,
    ) -> Result<(), LayoutError> {
        let mut tables: Vec<(&'static str, &[Coordinate])> = vec![("common", &self.common)];
        tables.extend(self.hours.iter().map(|h| ("hours", h.as_slice())));
        tables.extend(
            self.five_minute_marks
                .iter()
                .map(|m| ("five_minute_marks", m.as_slice())),
        );
        if minute_ticks {
            tables.extend(
                self.minute_remainder
                    .iter()
                    .map(|m| ("minute_remainder", m.as_slice())),
            );
        }

        for (table, coordinates) in tables {
            if let Some(&coordinate) = coordinates
                .iter()
                .find(|c| c.x >= width || c.y >= height)
            {
                return Err(LayoutError::OutOfGrid {
                    table,
                    coordinate,
                    width,
                    height,
                });
            }
            if let Some(&coordinate) = coordinates.iter().find(|c| !has_led(c.x, c.y)) {
                return Err(LayoutError::NoLed { table, coordinate });
            }
        }
        Ok(())
    }
}

impl Default for TimeLayout {
    fn default() -> Self {
        Self::english()
    }
}
