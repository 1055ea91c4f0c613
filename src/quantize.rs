//! Conversion between raw register integers and physical values.

/// Default full-scale reading of a 12-bit converter.
pub const DEFAULT_RAW_MAX: u32 = 4095;

/// Default full-scale voltage of a CV jack.
pub const DEFAULT_V_MAX: f32 = 10.0;

/// Maps physical values in `[0, v_max]` onto register integers in
/// `[0, raw_max]` and back.
///
/// Every conversion saturates: nothing outside the ranges ever comes out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantizer {
    raw_max: u32,
    v_max: f32,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new(DEFAULT_RAW_MAX, DEFAULT_V_MAX)
    }
}

impl Quantizer {
    /// Create a quantizer.
    ///
    /// `raw_max` is raised to 1 and `v_max` to `f32::EPSILON` so the
    /// conversions never divide by zero.
    pub fn new(raw_max: u32, v_max: f32) -> Self {
        Self {
            raw_max: raw_max.max(1),
            v_max: v_max.max(f32::EPSILON),
        }
    }

    #[inline]
    pub fn raw_max(&self) -> u32 {
        self.raw_max
    }

    #[inline]
    pub fn v_max(&self) -> f32 {
        self.v_max
    }

    /// Physical value to register integer, rounding to nearest.
    #[inline]
    pub fn quantize(&self, value: f32) -> u32 {
        // also catches NaN
        if !(value > 0.0) {
            0
        } else if value >= self.v_max {
            self.raw_max
        } else {
            let raw = (value / self.v_max * self.raw_max as f32).round() as u32;
            raw.min(self.raw_max)
        }
    }

    /// Clamp a signed register reading into `[0, raw_max]`.
    #[inline]
    pub fn clamp_raw(&self, raw: i64) -> u32 {
        raw.clamp(0, self.raw_max as i64) as u32
    }

    /// Register reading to `[0.0, 1.0]`.
    #[inline]
    pub fn normalize(&self, raw: i64) -> f32 {
        self.clamp_raw(raw) as f32 / self.raw_max as f32
    }

    /// Register reading to `[0.0, v_max]`.
    #[inline]
    pub fn dequantize(&self, raw: i64) -> f32 {
        self.normalize(raw) * self.v_max
    }

    /// Size of one quantization step in physical units.
    #[inline]
    pub fn step(&self) -> f32 {
        self.v_max / self.raw_max as f32
    }
}
