//! Vertex + fragment shader pairs.
//!
//! Each program is stored on disk as two WGSL files, one per stage. They are
//! joined into a single module behind a generated prelude that declares the
//! shared uniform blocks, so every program sees `CameraProperties` and
//! `LightProperties` at the same group and binding.

use crate::{
    pipelines::frame::{CAMERA_PROPERTIES_BINDING, FRAME_GROUP, LIGHT_PROPERTIES_BINDING},
    resources::load_string,
};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL declarations shared by every program.
pub fn prelude() -> String {
    format!(
        "\
struct CameraProperties {{
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    position: vec4<f32>,
}};

struct LightProperties {{
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    global_ambient: vec4<f32>,
}};

{camera}
{light}
",
        camera = block_declaration(FRAME_GROUP, CAMERA_PROPERTIES_BINDING, "camera", "CameraProperties"),
        light = block_declaration(FRAME_GROUP, LIGHT_PROPERTIES_BINDING, "light", "LightProperties"),
    )
}

fn block_declaration(group: u32, binding: u32, var: &str, block: &str) -> String {
    format!("@group({group}) @binding({binding}) var<uniform> {var}: {block};")
}

/// Concatenate the prelude and both stages into one WGSL source.
pub fn compose_source(vertex: &str, fragment: &str) -> String {
    let mut source = prelude();
    source.push_str("\n// vertex stage\n");
    source.push_str(vertex);
    source.push_str("\n// fragment stage\n");
    source.push_str(fragment);
    source
}

/// A compiled shader program.
#[derive(Debug)]
pub struct Shader {
    pub label: String,
    pub source: String,
    pub module: wgpu::ShaderModule,
}

impl Shader {
    /// Load `vertex_path` and `fragment_path` (relative to `assets/`) and build
    /// the module.
    pub async fn load(
        device: &wgpu::Device,
        label: &str,
        vertex_path: &str,
        fragment_path: &str,
    ) -> anyhow::Result<Self> {
        let source = load_source(vertex_path, fragment_path).await?;
        Ok(Self::from_source(device, label, source))
    }

    pub fn from_sources(device: &wgpu::Device, label: &str, vertex: &str, fragment: &str) -> Self {
        Self::from_source(device, label, compose_source(vertex, fragment))
    }

    fn from_source(device: &wgpu::Device, label: &str, source: String) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
        });
        Self {
            label: label.to_string(),
            source,
            module,
        }
    }

    /// Whether this program declares the uniform block `block` at `group`/`binding`.
    pub fn declares_block(&self, block: &str, group: u32, binding: u32) -> bool {
        source_declares_block(&self.source, block, group, binding)
    }
}

/// Load both stages from `assets/` and compose them behind the prelude.
pub async fn load_source(vertex_path: &str, fragment_path: &str) -> anyhow::Result<String> {
    let (vertex, fragment) =
        futures::try_join!(load_string(vertex_path), load_string(fragment_path))?;
    log::debug!("loaded shader pair {vertex_path} + {fragment_path}");
    Ok(compose_source(&vertex, &fragment))
}

pub fn source_declares_block(source: &str, block: &str, group: u32, binding: u32) -> bool {
    let needle = format!("@group({group}) @binding({binding}) var<uniform>");
    let suffix = format!(": {block};");
    source
        .lines()
        .map(str::trim)
        .any(|line| line.starts_with(&needle) && line.ends_with(&suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_pins_block_bindings() {
        let prelude = prelude();
        assert!(source_declares_block(&prelude, "CameraProperties", 0, 24));
        assert!(source_declares_block(&prelude, "LightProperties", 0, 25));
        assert!(!source_declares_block(&prelude, "CameraProperties", 0, 25));
    }

    #[test]
    fn every_composed_program_shares_the_bindings() {
        let pairs = [
            ("fn vs_main() {}", "fn fs_main() {}"),
            ("// unlit vertex", "// unlit fragment"),
        ];
        for (vertex, fragment) in pairs {
            let source = compose_source(vertex, fragment);
            assert!(source_declares_block(
                &source,
                "CameraProperties",
                FRAME_GROUP,
                CAMERA_PROPERTIES_BINDING
            ));
            assert!(source_declares_block(
                &source,
                "LightProperties",
                FRAME_GROUP,
                LIGHT_PROPERTIES_BINDING
            ));
        }
    }

    #[test]
    fn asset_programs_leave_frame_group_to_prelude() {
        for (label, vertex_path, fragment_path) in crate::pipelines::PROGRAMS {
            let read = |path: &str| {
                let path = crate::resources::asset_path(path);
                std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
            };
            let (vertex, fragment) = (read(vertex_path), read(fragment_path));
            assert!(vertex.contains(&format!("fn {VERTEX_ENTRY}(")), "{label}");
            assert!(fragment.contains(&format!("fn {FRAGMENT_ENTRY}(")), "{label}");
            for source in [&vertex, &fragment] {
                assert!(!source.contains("@group(0)"), "{label} redeclares group 0");
            }
        }
    }

    #[tokio::test]
    async fn loaded_programs_declare_the_frame_blocks() {
        for (label, vertex_path, fragment_path) in crate::pipelines::PROGRAMS {
            let source = load_source(vertex_path, fragment_path).await.unwrap();
            assert!(
                source_declares_block(
                    &source,
                    "CameraProperties",
                    FRAME_GROUP,
                    CAMERA_PROPERTIES_BINDING
                ),
                "{label}"
            );
            assert!(
                source_declares_block(
                    &source,
                    "LightProperties",
                    FRAME_GROUP,
                    LIGHT_PROPERTIES_BINDING
                ),
                "{label}"
            );
        }
    }

    #[test]
    fn stages_keep_their_order() {
        let source = compose_source("VERTEX_MARK", "FRAGMENT_MARK");
        let v = source.find("VERTEX_MARK").unwrap();
        let f = source.find("FRAGMENT_MARK").unwrap();
        assert!(v < f);
    }
}
