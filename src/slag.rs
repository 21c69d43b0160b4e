use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Inert residue with mass and volume but no molecular identity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Slag {
    pub mass: f64,
    pub volume: f64,
}

impl Slag {
    pub const EMPTY: Slag = Slag {
        mass: 0.0,
        volume: 0.0,
    };

    pub fn new(mass: f64, volume: f64) -> Self {
        Self { mass, volume }
    }
}

impl Add for Slag {
    type Output = Slag;

    fn add(self, other: Slag) -> Slag {
        Slag::new(self.mass + other.mass, self.volume + other.volume)
    }
}

impl Sub for Slag {
    type Output = Slag;

    fn sub(self, other: Slag) -> Slag {
        Slag::new(self.mass - other.mass, self.volume - other.volume)
    }
}

impl Mul<f64> for Slag {
    type Output = Slag;

    fn mul(self, factor: f64) -> Slag {
        Slag::new(self.mass * factor, self.volume * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_componentwise_ops() {
        let a = Slag::new(2.0, 3.0);
        let b = Slag::new(0.5, 1.0);

        assert_eq!(a + b, Slag::new(2.5, 4.0));
        assert_eq!(a - b, Slag::new(1.5, 2.0));
        assert_eq!(a * 0.5, Slag::new(1.0, 1.5));
    }

    #[test]
    fn test_scaled_parts_sum_to_whole() {
        let slag = Slag::new(7.3, 11.9);
        let kept = slag * 0.37;
        let rest = slag - kept;
        let whole = kept + rest;

        assert_abs_diff_eq!(whole.mass, slag.mass, epsilon = 1e-12);
        assert_abs_diff_eq!(whole.volume, slag.volume, epsilon = 1e-12);
    }
}
