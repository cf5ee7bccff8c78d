//! Render pipelines and their bind group layouts.
//!
//! wgpu bakes the blend state into each pipeline, so every program that
//! draws under a [`BlendMode`] is built twice and wrapped in [`BlendVariants`].

use crate::render::BlendMode;

pub mod basic;
pub mod frame;
pub mod lit;
pub mod normal_mapping;
pub mod oit;
pub mod unlit;

/// Every shader program as `(label, vertex path, fragment path)`.
pub const PROGRAMS: [(&str, &str, &str); 5] = [
    ("Unlit Shader", unlit::VERTEX_SHADER, unlit::FRAGMENT_SHADER),
    ("Blinn-Phong Shader", lit::VERTEX_SHADER, lit::FRAGMENT_SHADER),
    (
        "Normal Mapping Shader",
        normal_mapping::VERTEX_SHADER,
        normal_mapping::FRAGMENT_SHADER,
    ),
    (
        "Build List Shader",
        oit::BUILD_VERTEX_SHADER,
        oit::BUILD_FRAGMENT_SHADER,
    ),
    (
        "Resolve List Shader",
        oit::RESOLVE_VERTEX_SHADER,
        oit::RESOLVE_FRAGMENT_SHADER,
    ),
];

/// One pipeline per [`BlendMode`].
#[derive(Debug)]
pub struct BlendVariants {
    pub disabled: wgpu::RenderPipeline,
    pub enabled: wgpu::RenderPipeline,
}

impl BlendVariants {
    pub fn new(mut mk: impl FnMut(BlendMode) -> wgpu::RenderPipeline) -> Self {
        Self {
            disabled: mk(BlendMode::Disabled),
            enabled: mk(BlendMode::Enabled),
        }
    }

    pub fn select(&self, blend: BlendMode) -> &wgpu::RenderPipeline {
        match blend {
            BlendMode::Disabled => &self.disabled,
            BlendMode::Enabled => &self.enabled,
        }
    }
}
