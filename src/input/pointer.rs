/// A pointer position normalized against the viewport, origin top-left.
///
/// Both coordinates are always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    x: f32,
    y: f32,
}

impl PointerSample {
    /// Viewport center.
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// Sample from already-normalized coordinates, clamped into `[0, 1]`.
    /// Non-finite values fall back to the center.
    pub fn new(x: f32, y: f32) -> Self {
        let norm = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            x: norm(x),
            y: norm(y),
        }
    }

    /// Normalize client coordinates against a viewport size. A zero-sized
    /// viewport yields the center.
    pub fn from_client(x: f32, y: f32, width: f32, height: f32) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::CENTER;
        }
        Self::new(x / width, y / height)
    }

    /// Horizontal position, 0 at the left edge.
    pub fn x(self) -> f32 {
        self.x
    }

    /// Vertical position, 0 at the top edge.
    pub fn y(self) -> f32 {
        self.y
    }
}

impl Default for PointerSample {
    fn default() -> Self {
        Self::CENTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_coordinates_normalize() {
        let s = PointerSample::from_client(200.0, 150.0, 800.0, 600.0);
        assert!((s.x() - 0.25).abs() < 1e-6);
        assert!((s.y() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn out_of_viewport_is_clamped() {
        let s = PointerSample::from_client(-40.0, 900.0, 800.0, 600.0);
        assert_eq!((s.x(), s.y()), (0.0, 1.0));
    }

    #[test]
    fn degenerate_input_falls_back_to_center() {
        assert_eq!(
            PointerSample::from_client(10.0, 10.0, 0.0, 600.0),
            PointerSample::CENTER
        );
        assert_eq!(PointerSample::new(f32::NAN, 0.2).x(), 0.5);
    }
}
