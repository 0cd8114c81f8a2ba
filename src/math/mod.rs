mod psrdnoise;
mod simplex;

pub use psrdnoise::{noise2, RIBBON_PERIOD};
pub use simplex::noise3;

/// GLSL-style linear blend
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
