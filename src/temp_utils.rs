//! Utilities for converting between temperature and thermal energy
//! using the room temperature reference.

use crate::constants::{NEAR_ZERO, ROOM_TEMPERATURE};

/// True when `value` is close enough to zero to be treated as zero.
pub fn near_zero(value: f64) -> bool {
    value.abs() < NEAR_ZERO
}

/// Computes temperature in Kelvin from thermal energy and mass.
///
/// Near-zero mass yields zero temperature instead of infinity/NaN.
pub fn calculate_temperature(energy: f64, mass: f64) -> f64 {
    if near_zero(mass) {
        0.0
    } else {
        energy / mass * ROOM_TEMPERATURE
    }
}

/// Computes the thermal energy a body of `mass` holds at `temperature`.
pub fn energy_for_temperature(mass: f64, temperature: f64) -> f64 {
    mass * temperature / ROOM_TEMPERATURE
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let zeroes = 10_f64.powi(places);
    (value * zeroes).round() / zeroes
}
