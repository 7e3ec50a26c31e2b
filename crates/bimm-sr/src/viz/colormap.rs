//! # Colormaps

use image::Rgb;

/// A piecewise-linear channel: ``(position, value)`` knots over ``[0, 1]``.
type Segments = &'static [(f64, f64)];

const JET_RED: Segments = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: Segments = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: Segments = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

fn interpolate(
    segments: Segments,
    t: f64,
) -> f64 {
    for pair in segments.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    segments[segments.len() - 1].1
}

fn to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// The `jet` colormap, sampled at ``t`` in ``[0, 1]``; values outside are clamped.
pub fn jet(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    Rgb([
        to_u8(interpolate(JET_RED, t)),
        to_u8(interpolate(JET_GREEN, t)),
        to_u8(interpolate(JET_BLUE, t)),
    ])
}

/// Map a value in ``[vmin, vmax]`` through `jet`; non-finite values are white.
pub fn jet_range(
    value: f64,
    vmin: f64,
    vmax: f64,
) -> Rgb<u8> {
    if !value.is_finite() {
        return Rgb([255, 255, 255]);
    }
    let span = vmax - vmin;
    let t = if span > 0.0 { (value - vmin) / span } else { 0.5 };
    jet(t)
}
