//! Flat colour program: `ObjectProperties::color` straight to the target.

use crate::{
    data_structures::mesh::MeshVertex,
    pipelines::{
        BlendVariants,
        basic::{DepthTest, mk_pipeline_layout, mk_render_pipeline},
    },
    resources::shader::Shader,
};

pub const VERTEX_SHADER: &str = "shaders/unlit/unlit.vert.wgsl";
pub const FRAGMENT_SHADER: &str = "shaders/unlit/unlit.frag.wgsl";

/// Bind groups: 0 frame, 1 object.
pub async fn mk_pipelines(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    frame_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
    depth: DepthTest,
) -> anyhow::Result<BlendVariants> {
    let shader = Shader::load(device, "Unlit Shader", VERTEX_SHADER, FRAGMENT_SHADER).await?;
    let layout = mk_pipeline_layout(device, "Unlit Pipeline Layout", &[frame_layout, object_layout]);
    Ok(BlendVariants::new(|blend| {
        mk_render_pipeline(
            device,
            &format!("Unlit Pipeline ({blend:?})"),
            &layout,
            color_format,
            blend.state(),
            wgpu::ColorWrites::ALL,
            depth,
            &[MeshVertex::desc()],
            &shader,
        )
    }))
}
