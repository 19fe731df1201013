// SPDX-License-Identifier: MIT
//
// Seeded fractal value noise.
//
// A lattice of pseudo-random values, smoothly interpolated between lattice
// points, summed over octaves. Octave `o` has a lattice spacing of
// `period >> o` cells and weight `persistence^o`; the sum is normalized back
// into [0, 1). Lattice values come from an integer hash of
// (seed, octave, x, y), so a field is reproducible from its seed alone.

/// Lattice spacing of the first octave, in cells.
pub const DEFAULT_PERIOD: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalNoise {
    seed: u64,
    octaves: u32,
    persistence: f32,
    period: u32,
}

impl FractalNoise {
    /// Eight equally weighted octaves over a 128-cell base period.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            octaves: 8,
            persistence: 1.0,
            period: DEFAULT_PERIOD,
        }
    }

    #[must_use]
    pub const fn with_octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves;
        self
    }

    #[must_use]
    pub const fn with_persistence(mut self, persistence: f32) -> Self {
        self.persistence = persistence;
        self
    }

    /// Base lattice spacing. Zero is treated as one.
    #[must_use]
    pub const fn with_period(mut self, period: u32) -> Self {
        self.period = if period == 0 { 1 } else { period };
        self
    }

    /// Noise value at cell `(x, y)`, in `[0, 1)`.
    #[must_use]
    pub fn sample(&self, x: u32, y: u32) -> f32 {
        let mut total = 0.0;
        let mut weight = 0.0;
        let mut amplitude = 1.0;

        for octave in 0..self.octaves {
            let spacing = self.period.checked_shr(octave).unwrap_or(0).max(1);
            total += amplitude * self.octave_value(octave, spacing, x, y);
            weight += amplitude;
            amplitude *= self.persistence;
        }

        if weight > 0.0 {
            (total / weight).clamp(0.0, MAX_UNIT)
        } else {
            0.0
        }
    }

    /// Sample a `width × height` field and scale it to `0..range`.
    ///
    /// Row-major with stride `width`, the same layout as a canvas of that
    /// size.
    #[must_use]
    pub fn field(&self, width: u16, height: u16, range: u32) -> Vec<u32> {
        let mut values = Vec::with_capacity(usize::from(width) * usize::from(height));
        for y in 0..u32::from(height) {
            for x in 0..u32::from(width) {
                values.push(scale(self.sample(x, y), range));
            }
        }
        values
    }

    fn octave_value(&self, octave: u32, spacing: u32, x: u32, y: u32) -> f32 {
        let (cx, fx) = (x / spacing, x % spacing);
        let (cy, fy) = (y / spacing, y % spacing);
        #[allow(clippy::cast_precision_loss)]
        let (tx, ty) = (
            smoothstep(fx as f32 / spacing as f32),
            smoothstep(fy as f32 / spacing as f32),
        );

        let corner = |dx: u32, dy: u32| {
            lattice(self.seed, octave, cx.wrapping_add(dx), cy.wrapping_add(dy))
        };
        let top = lerp(corner(0, 0), corner(1, 0), tx);
        let bottom = lerp(corner(0, 1), corner(1, 1), tx);
        lerp(top, bottom, ty)
    }
}

/// Largest f32 below 1.0.
const MAX_UNIT: f32 = 1.0 - f32::EPSILON / 2.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn scale(unit: f32, range: u32) -> u32 {
    let scaled = (f64::from(unit) * f64::from(range)) as u32;
    scaled.min(range.saturating_sub(1))
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lattice value in `[0, 1)` for one grid point.
#[allow(clippy::cast_precision_loss)]
fn lattice(seed: u64, octave: u32, x: u32, y: u32) -> f32 {
    let key = seed
        ^ (u64::from(octave) << 58)
        ^ (u64::from(x) << 29)
        ^ u64::from(y).rotate_left(7);
    // Top 24 bits map exactly onto f32's mantissa.
    (mix(key) >> 40) as f32 / (1u64 << 24) as f32
}

/// `SplitMix64` finalizer.
const fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
