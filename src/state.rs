//! System state representation
//!
//! The state is the triple integrated by the solver:
//! - information_fidelity (I)
//! - error_correction (E)
//! - damage (D)

use serde::{Deserialize, Serialize};

/// State of the aging system at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// Information fidelity
    pub information_fidelity: f64,
    /// Error-correction capacity
    pub error_correction: f64,
    /// Molecular damage
    pub damage: f64,
}

impl SystemState {
    /// Create a new state
    pub fn new(information_fidelity: f64, error_correction: f64, damage: f64) -> Self {
        Self {
            information_fidelity,
            error_correction,
            damage,
        }
    }

    /// Youthful starting point: full fidelity, capacity `e0`, trace damage
    pub fn initial(e0: f64) -> Self {
        Self::new(1.0, e0, 0.01)
    }

    pub fn is_finite(&self) -> bool {
        self.information_fidelity.is_finite()
            && self.error_correction.is_finite()
            && self.damage.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.information_fidelity, self.error_correction, self.damage]
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl From<[f64; 3]> for SystemState {
    fn from(values: [f64; 3]) -> Self {
        Self::from_array(values)
    }
}

impl From<SystemState> for [f64; 3] {
    fn from(state: SystemState) -> Self {
        state.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_uses_capacity() {
        let state = SystemState::initial(0.9);
        assert_eq!(state, SystemState::new(1.0, 0.9, 0.01));
    }

    #[test]
    fn array_conversion_keeps_order() {
        let state: SystemState = [0.7, 0.8, 0.2].into();
        assert_eq!(state.information_fidelity, 0.7);
        assert_eq!(state.damage, 0.2);
        let back: [f64; 3] = state.into();
        assert_eq!(back, [0.7, 0.8, 0.2]);
    }

    #[test]
    fn non_finite_detected() {
        assert!(!SystemState::new(f64::INFINITY, 1.0, 0.0).is_finite());
        assert!(SystemState::initial(1.0).is_finite());
    }
}
