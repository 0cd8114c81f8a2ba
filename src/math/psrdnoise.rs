use glam::{Vec2, Vec3};

/// Period used by the ribbon displacement on both axes
pub const RIBBON_PERIOD: Vec2 = Vec2::new(10.0, 10.0);

/// GLSL `mod`, which floors rather than truncates
#[inline]
fn glsl_mod(x: Vec3, y: f32) -> Vec3 {
    x - y * (x / y).floor()
}

/// Tiling 2D simplex noise with rotating gradients and analytic derivative.
///
/// `period` components of zero disable tiling on that axis. `alpha` rotates
/// every lattice gradient, so animating it makes the field flow in place
/// without re-hashing the lattice. Returns `(value, d value / d x)`.
pub fn noise2(x: Vec2, period: Vec2, alpha: f32) -> (f32, Vec2) {
    // Transform to the sheared simplex grid
    let uv = Vec2::new(x.x + x.y * 0.5, x.y);
    let i0 = uv.floor();
    let f0 = uv - i0;

    let cmp = if f0.x < f0.y { 0.0 } else { 1.0 };
    let o1 = Vec2::new(cmp, 1.0 - cmp);
    let i1 = i0 + o1;
    let i2 = i0 + Vec2::ONE;

    // Corners back in regular space
    let v0 = Vec2::new(i0.x - i0.y * 0.5, i0.y);
    let v1 = Vec2::new(v0.x + o1.x - o1.y * 0.5, v0.y + o1.y);
    let v2 = Vec2::new(v0.x + 0.5, v0.y + 1.0);

    let x0 = x - v0;
    let x1 = x - v1;
    let x2 = x - v2;

    let (iu, iv) = if period.x > 0.0 || period.y > 0.0 {
        let mut xw = Vec3::new(v0.x, v1.x, v2.x);
        let mut yw = Vec3::new(v0.y, v1.y, v2.y);
        if period.x > 0.0 {
            xw = glsl_mod(xw, period.x);
        }
        if period.y > 0.0 {
            yw = glsl_mod(yw, period.y);
        }
        (
            (xw + 0.5 * yw + 0.5).floor(),
            (yw + 0.5).floor(),
        )
    } else {
        (
            Vec3::new(i0.x, i1.x, i2.x),
            Vec3::new(i0.y, i1.y, i2.y),
        )
    };

    // Permutation polynomial hash, exact in f32 for these ranges
    let hash = glsl_mod(iu, 289.0);
    let hash = glsl_mod((hash * 51.0 + 2.0) * hash + iv, 289.0);
    let hash = glsl_mod((hash * 34.0 + 10.0) * hash, 289.0);

    let psi = hash * 0.07482 + alpha;
    let g0 = Vec2::new(psi.x.cos(), psi.x.sin());
    let g1 = Vec2::new(psi.y.cos(), psi.y.sin());
    let g2 = Vec2::new(psi.z.cos(), psi.z.sin());

    let w = (Vec3::splat(0.8) - Vec3::new(x0.dot(x0), x1.dot(x1), x2.dot(x2))).max(Vec3::ZERO);
    let w2 = w * w;
    let w4 = w2 * w2;
    let gdotx = Vec3::new(g0.dot(x0), g1.dot(x1), g2.dot(x2));
    let n = w4.dot(gdotx);

    let w3 = w2 * w;
    let dw = -8.0 * w3 * gdotx;
    let dn0 = w4.x * g0 + dw.x * x0;
    let dn1 = w4.y * g1 + dw.y * x1;
    let dn2 = w4.z * g2 + dw.z * x2;

    (10.9 * n, 10.9 * (dn0 + dn1 + dn2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_period_disables_tiling() {
        let p = Vec2::new(0.3, 0.7);
        let (a, _) = noise2(p, Vec2::ZERO, 0.0);
        let (b, _) = noise2(p + Vec2::new(10.0, 0.0), Vec2::ZERO, 0.0);
        assert_ne!(a, b);
    }

    #[test]
    fn period_tiles_the_field() {
        let p = Vec2::new(0.3, 0.7);
        let (a, ga) = noise2(p, RIBBON_PERIOD, 0.4);
        let (b, gb) = noise2(p + Vec2::new(10.0, 0.0), RIBBON_PERIOD, 0.4);
        assert!((a - b).abs() < 1e-4);
        assert!((ga - gb).length() < 1e-3);
    }

    #[test]
    fn alpha_changes_the_field() {
        let p = Vec2::new(1.3, -2.2);
        let (a, _) = noise2(p, RIBBON_PERIOD, 0.0);
        let (b, _) = noise2(p, RIBBON_PERIOD, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn stays_bounded() {
        for i in 0..400 {
            let p = Vec2::new((i % 20) as f32 * 0.31, (i / 20) as f32 * 0.29);
            let (n, g) = noise2(p, RIBBON_PERIOD, 0.5);
            assert!(n.abs() <= 1.5, "value {n} at {p}");
            assert!(g.is_finite());
        }
    }
}
