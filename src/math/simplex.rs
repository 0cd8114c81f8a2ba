use glam::{Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

const C: [f32; 2] = [1.0 / 6.0, 1.0 / 3.0];
const N_: f32 = 0.142857142857; // 1/7

#[inline]
fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + 1.0) * x)
}

/// GLSL `step(edge, x)`: 0.0 where `x < edge`, else 1.0
#[inline]
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmplt(edge), Vec3::ZERO, Vec3::ONE)
}

#[inline]
fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

/// 3D gradient simplex noise, output roughly in [-1, 1]
///
/// Mirrors `snoise` in `shaders/simplex3.wgsl` operation for operation so the
/// CPU result can stand in for the environment pass in tests.
pub fn noise3(v: Vec3) -> f32 {
    // Skew to the simplex cell and find the first corner
    let i = (v + Vec3::splat(v.dot(Vec3::splat(C[1])))).floor();
    let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(C[0])));

    // Remaining corners, ordered by the magnitude of x0's components
    let g = step3(x0.yzx(), x0);
    let l = Vec3::ONE - g;
    let i1 = g.min(l.zxy());
    let i2 = g.max(l.zxy());

    let x1 = x0 - i1 + C[0];
    let x2 = x0 - i2 + C[1];
    let x3 = x0 - 0.5;

    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients on a 7x7 ring mapped onto an octahedron
    let ns = Vec3::new(2.0 * N_, 0.5 * N_ - 1.0, N_);

    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + ns.y;
    let y = y_ * ns.x + ns.y;
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
    let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    // Fast inverse-sqrt normalisation
    let norm = Vec4::splat(1.79284291400159)
        - 0.85373472095314 * Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    let m = (Vec4::splat(0.6) - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
        .max(Vec4::ZERO);
    let m = m * m;

    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise3_is_pure() {
        let p = Vec3::new(1.25, -3.5, 0.75);
        assert_eq!(noise3(p).to_bits(), noise3(p).to_bits());
    }

    #[test]
    fn noise3_matches_reference_at_origin() {
        // The first inner corner sits at |x1|^2 = 1/12, inside the falloff
        assert!((noise3(Vec3::ZERO) - (-0.412_198_75)).abs() < 1e-5);
    }

    #[test]
    fn noise3_stays_in_unit_range() {
        let mut max = 0.0f32;
        for ix in 0..24 {
            for iy in 0..24 {
                for iz in 0..6 {
                    let p = Vec3::new(ix as f32 * 0.37, iy as f32 * 0.41 - 4.0, iz as f32 * 0.53);
                    let n = noise3(p);
                    assert!(n.is_finite());
                    max = max.max(n.abs());
                }
            }
        }
        assert!(max <= 1.1, "noise3 peaked at {max}");
        assert!(max > 0.3, "noise3 looks flat, peak {max}");
    }
}
