//! Eye closure weights from face tracking

/// Per-eye closure weights in `[0, 1]`, 0 fully open and 1 fully closed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EyeClosure {
    pub left: f32,
    pub right: f32,
}

impl EyeClosure {
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: left.clamp(0.0, 1.0),
            right: right.clamp(0.0, 1.0),
        }
    }

    pub const OPEN: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    pub const CLOSED: Self = Self {
        left: 1.0,
        right: 1.0,
    };

    /// Both weights above `threshold`.
    pub fn both_above(&self, threshold: f32) -> bool {
        self.left > threshold && self.right > threshold
    }

    /// Exactly one weight below `threshold`.
    pub fn one_below(&self, threshold: f32) -> bool {
        (self.left < threshold) != (self.right < threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_weights() {
        let eyes = EyeClosure::new(-0.5, 1.5);
        assert_eq!(eyes, EyeClosure::new(0.0, 1.0));
    }

    #[test]
    fn test_asymmetry() {
        assert!(EyeClosure::new(0.0, 0.8).one_below(0.05));
        assert!(!EyeClosure::OPEN.one_below(0.05));
        assert!(!EyeClosure::CLOSED.one_below(0.05));
    }
}
