use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

/// Error from [`RecordingStrip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("injected strip fault")]
pub struct StripFault;

/// Pixel strip that keeps every transmitted buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingStrip {
    frames: Vec<Vec<RGB8>>,
    history: Option<usize>,
    fail_next: bool,
}

impl RecordingStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the latest `limit` buffers.
    pub fn with_history(limit: usize) -> Self {
        Self {
            history: Some(limit.max(1)),
            ..Self::default()
        }
    }

    /// Every buffer written so far, oldest first.
    #[inline]
    pub fn frames(&self) -> &[Vec<RGB8>] {
        &self.frames
    }

    /// The buffer currently shown on the strip.
    #[inline]
    pub fn last_frame(&self) -> Option<&[RGB8]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Make the next write fail with [`StripFault`].
    pub fn fail_next_write(&mut self) {
        self.fail_next = true;
    }
}

impl SmartLedsWrite for RecordingStrip {
    type Error = StripFault;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        if std::mem::take(&mut self.fail_next) {
            return Err(StripFault);
        }
        self.frames
            .push(iterator.into_iter().map(Into::into).collect());
        if let Some(limit) = self.history {
            let excess = self.frames.len().saturating_sub(limit);
            self.frames.drain(..excess);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_drops_oldest_frames() {
        let mut strip = RecordingStrip::with_history(2);
        for level in 0..4u8 {
            strip.write([RGB8::new(level, 0, 0)]).unwrap();
        }

        assert_eq!(strip.frames().len(), 2);
        assert_eq!(strip.last_frame(), Some(&[RGB8::new(3, 0, 0)][..]));
    }

    #[test]
    fn test_failed_write_records_nothing() {
        let mut strip = RecordingStrip::new();
        strip.fail_next_write();

        assert_eq!(strip.write([RGB8::new(1, 2, 3)]), Err(StripFault));
        assert!(strip.frames().is_empty());
        assert!(strip.write([RGB8::new(1, 2, 3)]).is_ok());
    }
}
