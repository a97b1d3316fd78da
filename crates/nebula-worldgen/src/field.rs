//! Deterministic scalar noise fields.
//!
//! Every field is a pure function of its query coordinates and immutable
//! configuration: lattice value noise, fractal sums of it, cellular (Worley)
//! distance noise, domain warping, and a simplex-backed fBm.

mod cellular;
mod config;
mod fractal;
mod simplex;
mod value;
mod warp;

use std::sync::Arc;

pub use cellular::CellularNoise;
pub use config::{NoiseConfig, NoiseConfigError};
pub use fractal::FractalNoise;
pub use simplex::SimplexFbm;
pub use value::ValueNoise;
pub use warp::DomainWarp;

/// A deterministic scalar field over 2D or 3D space.
///
/// Implementations must not let any internal state affect the output: the
/// same query always returns the same value.
pub trait ScalarField: Send + Sync {
    /// Samples the field on the horizontal plane.
    fn sample2(&self, x: f64, z: f64) -> f64;

    /// Samples the field in 3D.
    fn sample3(&self, x: f64, y: f64, z: f64) -> f64;
}

impl<T: ScalarField + ?Sized> ScalarField for Arc<T> {
    fn sample2(&self, x: f64, z: f64) -> f64 {
        (**self).sample2(x, z)
    }

    fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        (**self).sample3(x, y, z)
    }
}

impl<T: ScalarField + ?Sized> ScalarField for Box<T> {
    fn sample2(&self, x: f64, z: f64) -> f64 {
        (**self).sample2(x, z)
    }

    fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        (**self).sample3(x, y, z)
    }
}

/// Shared handle to a type-erased field.
pub type SharedField = Arc<dyn ScalarField>;

/// Smoothstep fade curve `t²(3 − 2t)`.
#[inline]
pub(crate) fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Splits a coordinate into its lattice cell and the fractional offset.
#[inline]
pub(crate) fn lattice_cell(v: f64) -> (i32, f64) {
    let floor = v.floor();
    (floor as i32, v - floor)
}
