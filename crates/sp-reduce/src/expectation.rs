//! Expected field alignment of independent dipoles.
//!
//! With `X` the ratio of magnetic to thermal energy, dipole orientations
//! follow a von Mises distribution about the field direction with
//! concentration `X`. The expected magnetization is its mean `cos θ`.

use sp_core::{CoreResult, ensure_finite};
use std::f64::consts::PI;

/// Concentrations below this are evaluated at this value.
pub const MIN_CONCENTRATION: f64 = 0.001;

/// Mesh points on `[-π, π]`, endpoints included.
pub const MESH_POINTS: usize = 500;

/// Mean `cos θ` of a von Mises distribution centred on the field.
pub fn mean_cos(x: f64) -> CoreResult<f64> {
    let kappa = ensure_finite(x, "concentration")?.max(MIN_CONCENTRATION);
    let step = 2.0 * PI / (MESH_POINTS - 1) as f64;

    // Trapezoid rule; density scaled by exp(-kappa) so large
    // concentrations stay finite.
    let (mut num, mut den) = (0.0, 0.0);
    for i in 0..MESH_POINTS {
        let c = (-PI + step * i as f64).cos();
        let end = i == 0 || i == MESH_POINTS - 1;
        let w = (kappa * (c - 1.0)).exp() * if end { 0.5 } else { 1.0 };
        num += c * w;
        den += w;
    }
    Ok(num / den)
}

/// [`mean_cos`] for each energy ratio.
pub fn magnetization_expectation(xs: &[f64]) -> CoreResult<Vec<f64>> {
    xs.iter().map(|&x| mean_cos(x)).collect()
}
