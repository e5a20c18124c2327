//! Voyage colours.
//!
//! Colours are sampled along a "warm" cubehelix ramp (hue -100°..80°,
//! saturation 0.75..1.5, lightness 0.35..0.8). Voyage `i` of `n` sits at
//! `(i - 1) / (n - 1)`, so the first voyage lies just before the ramp start
//! and the last one short of its end.

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const A: f64 = -0.14861;
const B: f64 = 1.78277;
const C: f64 = -0.29227;
const D: f64 = -0.90649;
const E: f64 = 1.97294;

const START: (f64, f64, f64) = (-100.0, 0.75, 0.35);
const END: (f64, f64, f64) = (80.0, 1.50, 0.80);

fn cubehelix_to_rgb(hue_deg: f64, saturation: f64, lightness: f64) -> Rgb {
    let h = (hue_deg + 120.0).to_radians();
    let l = lightness;
    let a = saturation * l * (1.0 - l);
    let (sin_h, cos_h) = h.sin_cos();

    let channel = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: channel(l + a * (A * cos_h + B * sin_h)),
        g: channel(l + a * (C * cos_h + D * sin_h)),
        b: channel(l + a * (E * cos_h)),
    }
}

/// Samples the warm ramp at `t` in `[0, 1]` (clamped).
pub fn warm(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    sample(t)
}

// Extrapolates linearly outside [0, 1]; only the RGB channels are clamped.
fn sample(t: f64) -> Rgb {
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    cubehelix_to_rgb(
        lerp(START.0, END.0),
        lerp(START.1, END.1),
        lerp(START.2, END.2),
    )
}

/// One colour per voyage, voyage `i` at `(i - 1) / (n - 1)`. A single
/// voyage takes the middle of the ramp.
pub fn assign_colors(count: usize) -> Vec<Rgb> {
    match count {
        0 => Vec::new(),
        1 => vec![warm(0.5)],
        n => {
            let span = (n - 1) as f64;
            (0..n).map(|i| sample((i as f64 - 1.0) / span)).collect()
        }
    }
}
