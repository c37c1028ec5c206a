//! Per-planet coordinate displacement and noise salts.
//!
//! Every planet samples the same noise fields, displaced horizontally by a
//! shift derived from its id and decorrelated by per-noise salts. Derivations
//! are pure functions of the id, so the same planet gets the same terrain on
//! every run and platform.

use serde::{Deserialize, Serialize};

/// Shifts and salts are reduced into `0..SHIFT_RANGE`.
pub const SHIFT_RANGE: i32 = 5000;

/// Spacing between the salts of consecutive noises of one kind.
pub const SALT_STRIDE: u32 = 1000;

/// Horizontal axis of a coordinate shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    fn discriminator(self) -> &'static str {
        match self {
            Self::X => "shift_x",
            Self::Z => "shift_z",
        }
    }
}

/// 31-multiplier polynomial hash over the UTF-16 code units of `s`.
///
/// Wrapping `i32` arithmetic; matches the host's string hash, so ids hash the
/// same here and inside the host.
pub fn stable_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Horizontal offset for `planet_id` along `axis`, in `0..5000`.
pub fn derive_shift(planet_id: &str, axis: Axis) -> i32 {
    stable_hash(&format!("{}:{planet_id}", axis.discriminator())).rem_euclid(SHIFT_RANGE)
}

/// Salt for the `index`-th noise of `noise_kind` on `planet_id`.
///
/// The base lies in `0..5000`; each index adds [`SALT_STRIDE`].
pub fn derive_salt(planet_id: &str, noise_kind: &str, index: u32) -> i32 {
    let base = stable_hash(&format!("{noise_kind}:{planet_id}")).rem_euclid(SHIFT_RANGE);
    salt_step(base, index)
}

/// `base + index * SALT_STRIDE` in wrapping 32-bit arithmetic.
fn salt_step(base: i32, index: u32) -> i32 {
    base.wrapping_add_unsigned(index.wrapping_mul(SALT_STRIDE))
}

/// A planet's displacement in noise space plus its base terrain salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinateShift {
    pub shift_x: i32,
    pub shift_z: i32,
    pub salt: i32,
}

impl CoordinateShift {
    /// No displacement and no salt: the unmodified reference terrain.
    pub const ZERO: Self = Self {
        shift_x: 0,
        shift_z: 0,
        salt: 0,
    };

    /// Derives the shift for a planet id.
    pub fn derive(planet_id: &str) -> Self {
        Self {
            shift_x: derive_shift(planet_id, Axis::X),
            shift_z: derive_shift(planet_id, Axis::Z),
            salt: derive_salt(planet_id, "terrain", 0),
        }
    }

    /// Salt of the `index`-th terrain noise.
    pub fn noise_salt(&self, index: u32) -> i32 {
        salt_step(self.salt, index)
    }
}
