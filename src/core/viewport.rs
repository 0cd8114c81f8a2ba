/// Drawing surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 for a collapsed viewport
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Minimised windows report zero-sized viewports
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_new() {
        let viewport = Viewport::new(1920, 1080);
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
    }

    #[test]
    fn test_viewport_aspect() {
        let test_cases = [
            (640, 480, 4.0 / 3.0),
            (1280, 720, 16.0 / 9.0),
            (1000, 1000, 1.0),
        ];

        for (width, height, aspect) in test_cases {
            let viewport = Viewport::new(width, height);
            assert!((viewport.aspect() - aspect).abs() < 1e-6);
        }
    }

    #[test]
    fn test_viewport_empty() {
        assert!(Viewport::new(0, 600).is_empty());
        assert!(Viewport::new(800, 0).is_empty());
        assert!(!Viewport::new(1, 1).is_empty());
        assert_eq!(Viewport::new(0, 0).aspect(), 1.0);
    }
}
