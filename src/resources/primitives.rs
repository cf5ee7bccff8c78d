//! Procedural primitives: sphere, plane and torus.
//!
//! All three are laid out as a `(precision + 1)` x `(precision + 1)` grid of
//! vertices (the plane being the 1x1 case) so seams get their own texture
//! coordinates, and are indexed as two triangles per grid cell.

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::mesh::{MeshData, MeshVertex};

/// Precision used when a caller does not pick one.
pub const DEFAULT_PRECISION: u32 = 48;
const MIN_PRECISION: u32 = 3;

/// Unit sphere around the origin. `precision` is the number of slices and
/// stacks; values below 3 are raised to 3.
pub fn sphere(precision: u32) -> MeshData {
    let prec = precision.max(MIN_PRECISION);
    let mut vertices = Vec::with_capacity(((prec + 1) * (prec + 1)) as usize);

    for i in 0..=prec {
        // stacks run from the south pole (-Y) to the north pole (+Y)
        let polar = std::f32::consts::PI * i as f32 / prec as f32;
        let y = -polar.cos();
        let ring = polar.sin().abs();
        for j in 0..=prec {
            let azimuth = 2.0 * std::f32::consts::PI * j as f32 / prec as f32;
            let normal = Vector3::new(-azimuth.cos() * ring, y, azimuth.sin() * ring);

            let around = Vector3::unit_y().cross(normal);
            let tangent = if around.magnitude2() < 1e-8 {
                -Vector3::unit_z()
            } else {
                around.normalize()
            };
            let bitangent = normal.cross(tangent);

            vertices.push(MeshVertex {
                position: normal.into(),
                tex_coords: [j as f32 / prec as f32, i as f32 / prec as f32],
                normal: normal.into(),
                tangent: tangent.into(),
                bitangent: bitangent.into(),
            });
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(prec),
    }
}

/// A 2 x 2 quad in the XZ plane facing +Y.
pub fn plane() -> MeshData {
    let normal = Vector3::unit_y();
    let tangent = Vector3::unit_x();
    let bitangent = normal.cross(tangent);
    let corner = |x: f32, z: f32| MeshVertex {
        position: [x, 0.0, z],
        tex_coords: [(x + 1.0) * 0.5, (z + 1.0) * 0.5],
        normal: normal.into(),
        tangent: tangent.into(),
        bitangent: bitangent.into(),
    };

    MeshData {
        vertices: vec![
            corner(-1.0, -1.0),
            corner(-1.0, 1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
        ],
        indices: grid_indices(1),
    }
}

/// Torus around the Y axis. `inner` is the distance from the origin to the
/// centre of the tube, `outer` the radius of the tube itself.
pub fn torus(inner: f32, outer: f32, precision: u32) -> MeshData {
    let prec = precision.max(MIN_PRECISION);
    let tau = 2.0 * std::f32::consts::PI;
    let mut vertices = Vec::with_capacity(((prec + 1) * (prec + 1)) as usize);

    for i in 0..=prec {
        let u = tau * i as f32 / prec as f32;
        let (sin_u, cos_u) = u.sin_cos();
        for j in 0..=prec {
            let v = tau * j as f32 / prec as f32;
            let (sin_v, cos_v) = v.sin_cos();

            let normal = Vector3::new(cos_v * cos_u, sin_v, cos_v * sin_u);
            let position = Vector3::new(inner * cos_u, 0.0, inner * sin_u) + normal * outer;
            let tangent = Vector3::new(-sin_u, 0.0, cos_u);
            let bitangent = normal.cross(tangent);

            vertices.push(MeshVertex {
                position: position.into(),
                tex_coords: [i as f32 / prec as f32, j as f32 / prec as f32],
                normal: normal.into(),
                tangent: tangent.into(),
                bitangent: bitangent.into(),
            });
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(prec),
    }
}

/// Default torus proportions: tube centre at 0.5, tube radius 0.2.
pub fn default_torus() -> MeshData {
    torus(0.5, 0.2, DEFAULT_PRECISION)
}

fn grid_indices(prec: u32) -> Vec<u32> {
    let stride = prec + 1;
    let mut indices = Vec::with_capacity((prec * prec * 6) as usize);
    for i in 0..prec {
        for j in 0..prec {
            let here = i * stride + j;
            let above = (i + 1) * stride + j;
            indices.extend_from_slice(&[here, here + 1, above, here + 1, above + 1, above]);
        }
    }
    indices
}
