// Reference temperature: one unit of temperature is one unit of energy per unit of mass,
// scaled so that energy == mass puts a body at room temperature.
pub const ROOM_TEMPERATURE: f64 = 300.0; // K

// Masses and volumes below this are treated as exactly zero
pub const NEAR_ZERO: f64 = 0.000001;

// Mixtures keep at most this many distinct molecule species; the rest become slag
pub const TRACE_KEEP_DEFAULT: usize = 100;

// === Molecule physics ===

pub const BOILING_MASS_DIVISOR: f64 = 3.75;
pub const LIQUID_VOLUME_SCALE: f64 = 0.625; // ml per (mass * bond slot), divided by e
pub const GAS_EXPANSION_FACTOR: f64 = 100.0;
