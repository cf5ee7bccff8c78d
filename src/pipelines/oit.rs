//! Programs for the per-pixel linked lists.
//!
//! The build program writes no colour; each fragment is pushed onto its
//! pixel's list instead. The resolve program draws one fullscreen triangle,
//! sorts every list and composites it over what the target already holds.

use crate::{
    data_structures::mesh::MeshVertex,
    pipelines::{
        BlendVariants,
        basic::{DepthTest, mk_pipeline_layout, mk_render_pipeline},
    },
    resources::shader::Shader,
};

pub const BUILD_VERTEX_SHADER: &str = "shaders/oit/build_list.vert.wgsl";
pub const BUILD_FRAGMENT_SHADER: &str = "shaders/oit/build_list.frag.wgsl";
pub const RESOLVE_VERTEX_SHADER: &str = "shaders/oit/resolve_list.vert.wgsl";
pub const RESOLVE_FRAGMENT_SHADER: &str = "shaders/oit/resolve_list.frag.wgsl";

/// Premultiplied "over": the resolve shader outputs colour already scaled by
/// its accumulated coverage.
pub const RESOLVE_BLEND: wgpu::BlendState = wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING;

#[derive(Debug)]
pub struct OitPipelines {
    pub build: BlendVariants,
    pub resolve: wgpu::RenderPipeline,
}

/// Build: 0 frame, 1 lists, 2 object. Resolve: 0 frame, 1 lists.
pub async fn mk_pipelines(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    frame_layout: &wgpu::BindGroupLayout,
    lists_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<OitPipelines> {
    let (build_shader, resolve_shader) = futures::try_join!(
        Shader::load(device, "Build List Shader", BUILD_VERTEX_SHADER, BUILD_FRAGMENT_SHADER),
        Shader::load(
            device,
            "Resolve List Shader",
            RESOLVE_VERTEX_SHADER,
            RESOLVE_FRAGMENT_SHADER
        ),
    )?;

    let build_layout = mk_pipeline_layout(
        device,
        "Build List Pipeline Layout",
        &[frame_layout, lists_layout, object_layout],
    );
    let build = BlendVariants::new(|blend| {
        mk_render_pipeline(
            device,
            &format!("Build List Pipeline ({blend:?})"),
            &build_layout,
            color_format,
            blend.state(),
            wgpu::ColorWrites::empty(),
            DepthTest::None,
            &[MeshVertex::desc()],
            &build_shader,
        )
    });

    let resolve_layout =
        mk_pipeline_layout(device, "Resolve List Pipeline Layout", &[frame_layout, lists_layout]);
    let resolve = mk_render_pipeline(
        device,
        "Resolve List Pipeline",
        &resolve_layout,
        color_format,
        Some(RESOLVE_BLEND),
        wgpu::ColorWrites::ALL,
        DepthTest::None,
        &[],
        &resolve_shader,
    );

    Ok(OitPipelines { build, resolve })
}
