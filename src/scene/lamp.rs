/// Desk lamp switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampState {
    /// Whether the lamp is lit.
    pub on: bool,
}

impl LampState {
    /// Lamp switched on.
    pub const ON: Self = Self { on: true };

    /// Flip the switch.
    #[must_use]
    pub fn toggled(self) -> Self {
        Self { on: !self.on }
    }

    /// Ambient multiplier and lamp glow for this state.
    pub fn factors(self) -> (f32, f32) {
        if self.on {
            (1.0, 0.6)
        } else {
            (0.35, 0.0)
        }
    }
}

impl Default for LampState {
    fn default() -> Self {
        Self::ON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_dims() {
        let off = LampState::default().toggled();
        assert!(!off.on);
        let (ambient, glow) = off.factors();
        assert!(ambient < 1.0);
        assert_eq!(glow, 0.0);
        assert_eq!(off.toggled(), LampState::ON);
    }
}
