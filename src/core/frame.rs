/// Animation state carried from one tick to the next
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameClock {
    /// Ticks completed so far
    pub number: u64,
    /// Seconds on the host's refresh timeline
    pub time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure step to the state of the frame stamped `timestamp_ms`
    pub fn advance(self, timestamp_ms: f64) -> Self {
        Self {
            number: self.number + 1,
            time: (timestamp_ms * 0.001) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_counts_and_converts() {
        let clock = FrameClock::new().advance(0.0).advance(16.0);
        assert_eq!(clock.number, 2);
        assert!((clock.time - 0.016).abs() < 1e-7);
    }

    #[test]
    fn advance_is_pure() {
        let clock = FrameClock::new().advance(33.0);
        assert_eq!(clock.advance(50.0), clock.advance(50.0));
        assert_eq!(clock.number, 1);
    }
}
