//! Tangent-space normal mapping. The normal map lives in bind group 2.

use crate::{
    data_structures::{mesh::MeshVertex, texture},
    pipelines::{
        BlendVariants,
        basic::{DepthTest, mk_pipeline_layout, mk_render_pipeline},
    },
    resources::shader::Shader,
};

pub const VERTEX_SHADER: &str = "shaders/normal_mapping/normal_mapping.vert.wgsl";
pub const FRAGMENT_SHADER: &str = "shaders/normal_mapping/normal_mapping.frag.wgsl";

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("normal_map_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    normal_map: &texture::Texture,
) -> wgpu::BindGroup {
    let fallback;
    let sampler = match &normal_map.sampler {
        Some(sampler) => sampler,
        None => {
            fallback = texture::create_default_sampler(device);
            &fallback
        }
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&normal_map.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("normal_map_bind_group"),
    })
}

/// Bind groups: 0 frame, 1 object, 2 normal map.
pub async fn mk_pipelines(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    frame_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
    normal_map_layout: &wgpu::BindGroupLayout,
    depth: DepthTest,
) -> anyhow::Result<BlendVariants> {
    let shader =
        Shader::load(device, "Normal Mapping Shader", VERTEX_SHADER, FRAGMENT_SHADER).await?;
    let layout = mk_pipeline_layout(
        device,
        "Normal Mapping Pipeline Layout",
        &[frame_layout, object_layout, normal_map_layout],
    );
    Ok(BlendVariants::new(|blend| {
        mk_render_pipeline(
            device,
            &format!("Normal Mapping Pipeline ({blend:?})"),
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
