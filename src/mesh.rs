use glam::{Mat3, Vec2, Vec3, Vec4};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::types::{PlaneVertex, RibbonVertex};

/// Radius of the hairpin fold
pub const FOLD_RADIUS: f32 = 0.1;

/// Indexed triangle mesh with the attributes the ribbon shader consumes
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// xyz tangent, w handedness
    pub tangents: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Flat grid in the XY plane facing +Z, centered on the origin.
    ///
    /// Rows run top to bottom; uv origin is the bottom-left corner.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let grid_x1 = grid_x + 1;
        let grid_y1 = grid_y + 1;
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;

        let count = (grid_x1 * grid_y1) as usize;
        let mut positions = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);

        for iy in 0..grid_y1 {
            let y = height * 0.5 - iy as f32 * segment_height;
            for ix in 0..grid_x1 {
                let x = ix as f32 * segment_width - width * 0.5;
                positions.push(Vec3::new(x, y, 0.0));
                uvs.push(Vec2::new(
                    ix as f32 / grid_x as f32,
                    1.0 - iy as f32 / grid_y as f32,
                ));
            }
        }

        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + grid_x1 * iy;
                let b = ix + grid_x1 * (iy + 1);
                let c = ix + 1 + grid_x1 * (iy + 1);
                let d = ix + 1 + grid_x1 * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let mut mesh = Self {
            normals: vec![Vec3::Z; count],
            tangents: vec![Vec4::ZERO; count],
            positions,
            uvs,
            indices,
        };
        mesh.compute_tangents();
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Smooth normals from area-weighted face normals
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];
        for [a, b, c] in self.triangles() {
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let face = (pc - pb).cross(pa - pb);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }
        self.normals = accum.into_iter().map(|n| n.normalize_or_zero()).collect();
    }

    /// UV-aligned tangents, Gram-Schmidt orthogonalised against the normal
    pub fn compute_tangents(&mut self) {
        let count = self.positions.len();
        let mut tan1 = vec![Vec3::ZERO; count];
        let mut tan2 = vec![Vec3::ZERO; count];

        for [a, b, c] in self.triangles() {
            let (v_a, v_b, v_c) = (self.positions[a], self.positions[b], self.positions[c]);
            let (uv_a, uv_b, uv_c) = (self.uvs[a], self.uvs[b], self.uvs[c]);

            let e1 = v_b - v_a;
            let e2 = v_c - v_a;
            let d1 = uv_b - uv_a;
            let d2 = uv_c - uv_a;

            let det = d1.x * d2.y - d2.x * d1.y;
            if det == 0.0 || !det.is_finite() {
                continue;
            }
            let r = 1.0 / det;
            let s_dir = (e1 * d2.y - e2 * d1.y) * r;
            let t_dir = (e2 * d1.x - e1 * d2.x) * r;

            for i in [a, b, c] {
                tan1[i] += s_dir;
                tan2[i] += t_dir;
            }
        }

        self.tangents = (0..count)
            .map(|i| {
                let n = self.normals[i];
                let t = tan1[i];
                let tangent = (t - n * n.dot(t)).normalize_or_zero();
                let w = if n.cross(t).dot(tan2[i]) < 0.0 { -1.0 } else { 1.0 };
                tangent.extend(w)
            })
            .collect();
    }

    pub fn ribbon_vertices(&self) -> Vec<RibbonVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.tangents)
            .map(|((p, n), t)| RibbonVertex {
                position: p.to_array(),
                normal: n.to_array(),
                tangent: t.to_array(),
            })
            .collect()
    }

    pub fn plane_vertices(&self) -> Vec<PlaneVertex> {
        self.positions
            .iter()
            .map(|p| PlaneVertex { position: p.to_array() })
            .collect()
    }
}

/// Which part of the fold a vertex falls into, by its flat X coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    LeftFold,
    CenterArc,
    RightFold,
}

impl Band {
    pub fn classify(x: f32, radius: f32) -> Self {
        let quarter = quarter_circumference(radius);
        if x < -quarter {
            Band::LeftFold
        } else if x < quarter {
            Band::CenterArc
        } else {
            Band::RightFold
        }
    }

    /// Position of a flat-plane vertex after folding
    pub fn fold(self, v: Vec3, radius: f32) -> Vec3 {
        let quarter = quarter_circumference(radius);
        match self {
            Band::LeftFold => Vec3::new(v.x, v.y, v.z + radius),
            Band::CenterArc => {
                let theta = (v.x + quarter) / (quarter * 2.0) * PI;
                Vec3::new(
                    (theta - FRAC_PI_2).cos() * radius - quarter,
                    v.y,
                    theta.cos() * radius,
                )
            }
            Band::RightFold => Vec3::new(-v.x, v.y, v.z - radius),
        }
    }
}

fn quarter_circumference(radius: f32) -> f32 {
    radius * PI / 2.0
}

/// Orientation applied after folding: Euler XYZ (pi/2, 0, pi/2)
pub fn ribbon_orientation() -> Mat3 {
    Mat3::from_rotation_x(FRAC_PI_2) * Mat3::from_rotation_z(FRAC_PI_2)
}

/// Bend a flat plane into the hairpin ribbon, then re-derive its frame.
///
/// Connectivity is untouched; only positions move.
pub fn fold_ribbon(mesh: &mut MeshData) {
    let rotation = ribbon_orientation();
    for p in mesh.positions.iter_mut() {
        let folded = Band::classify(p.x, FOLD_RADIUS).fold(*p, FOLD_RADIUS);
        *p = rotation * folded;
    }
    mesh.compute_vertex_normals();
    mesh.compute_tangents();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_has_expected_counts() {
        let mesh = MeshData::plane(8.0, 10.0, 4, 5);
        assert_eq!(mesh.vertex_count(), 5 * 6);
        assert_eq!(mesh.indices.len(), 4 * 5 * 6);
        assert_eq!(mesh.positions[0], Vec3::new(-4.0, 5.0, 0.0));
        assert_eq!(mesh.uvs[0], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn flat_plane_tangent_follows_u() {
        let mesh = MeshData::plane(2.0, 2.0, 2, 2);
        for t in &mesh.tangents {
            assert!((t.truncate() - Vec3::X).length() < 1e-5);
            assert_eq!(t.w, 1.0);
        }
    }

    #[test]
    fn flat_plane_normals_face_z() {
        let mut mesh = MeshData::plane(2.0, 2.0, 3, 3);
        mesh.compute_vertex_normals();
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn band_boundaries() {
        let q = FOLD_RADIUS * PI / 2.0;
        assert_eq!(Band::classify(-1.0, FOLD_RADIUS), Band::LeftFold);
        assert_eq!(Band::classify(-q, FOLD_RADIUS), Band::CenterArc);
        assert_eq!(Band::classify(0.0, FOLD_RADIUS), Band::CenterArc);
        assert_eq!(Band::classify(q, FOLD_RADIUS), Band::RightFold);
    }

    #[test]
    fn left_fold_lifts_z() {
        let p = Band::LeftFold.fold(Vec3::new(-2.0, 1.0, 0.0), FOLD_RADIUS);
        assert_eq!(p, Vec3::new(-2.0, 1.0, FOLD_RADIUS));
    }

    #[test]
    fn right_fold_mirrors_and_drops() {
        let p = Band::RightFold.fold(Vec3::new(2.0, 1.0, 0.0), FOLD_RADIUS);
        assert_eq!(p, Vec3::new(-2.0, 1.0, -FOLD_RADIUS));
    }

    #[test]
    fn arc_joins_both_folds() {
        let q = FOLD_RADIUS * PI / 2.0;
        let start = Band::CenterArc.fold(Vec3::new(-q, 0.0, 0.0), FOLD_RADIUS);
        assert!((start - Band::LeftFold.fold(Vec3::new(-q, 0.0, 0.0), FOLD_RADIUS)).length() < 1e-5);

        let end = Band::CenterArc.fold(Vec3::new(q - 1e-6, 0.0, 0.0), FOLD_RADIUS);
        let right = Band::RightFold.fold(Vec3::new(q, 0.0, 0.0), FOLD_RADIUS);
        assert!((end - right).length() < 1e-4);
    }

    #[test]
    fn arc_keeps_constant_radius() {
        let q = FOLD_RADIUS * PI / 2.0;
        let center = Vec3::new(-q, 0.0, 0.0);
        for i in 0..=10 {
            let x = -q + 2.0 * q * i as f32 / 10.0;
            let p = Band::CenterArc.fold(Vec3::new(x, 0.0, 0.0), FOLD_RADIUS);
            assert!(((p - center).length() - FOLD_RADIUS).abs() < 1e-5);
        }
    }

    #[test]
    fn orientation_maps_axes() {
        let r = ribbon_orientation();
        assert!((r * Vec3::X - Vec3::Z).length() < 1e-6);
        assert!((r * Vec3::Y - -Vec3::X).length() < 1e-6);
        assert!((r * Vec3::Z - -Vec3::Y).length() < 1e-6);
    }
}
