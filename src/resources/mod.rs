//! Loading of external files (shader sources, textures) and procedural meshes.
//!
//! Paths are relative to the `assets/` directory next to the working directory.

use std::path::PathBuf;

use anyhow::Context as _;

use crate::data_structures::texture;

pub mod primitives;
pub mod shader;

pub const ASSET_DIR: &str = "assets";

pub fn asset_path(file_name: &str) -> PathBuf {
    std::path::Path::new("./").join(ASSET_DIR).join(file_name)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let path = asset_path(file_name);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = asset_path(file_name);
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

pub async fn load_texture(
    file_name: &str,
    is_normal_map: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let data = load_binary(file_name).await?;
    texture::Texture::from_bytes(device, queue, &data, file_name, is_normal_map)
}
