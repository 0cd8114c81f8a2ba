use std::time::Instant;

/// Refresh timeline for the desktop host: milliseconds since creation,
/// the same unit a browser hands to animation callbacks.
#[derive(Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock started
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    /// Restart the timeline at zero
    pub fn reset(&mut self) {
        self.origin = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_elapsed() {
        let clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let ms = clock.now_ms();

        assert!(ms >= 9.0);
    }

    #[test]
    fn clock_resets() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        clock.reset();

        // Should be very small since we just reset
        assert!(clock.now_ms() < 5.0);
    }
}
