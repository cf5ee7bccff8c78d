//! Engine data structures: meshes, textures, lights, drawables and the
//! per-pixel fragment lists.
//!
//! - `mesh` holds the vertex format and GPU mesh buffers
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `light` is the point light and its uniform block layout
//! - `object` holds per-drawable transform, material and uniform buffer
//! - `fragment_list` owns the head pointers and node storage for transparency

pub mod fragment_list;
pub mod light;
pub mod mesh;
pub mod object;
pub mod texture;
