//! A single sphere shaded through a tangent-space normal map.

use std::time::Duration;

use cgmath::{Vector3, Vector4};
use winit::event::WindowEvent;

use crate::{
    camera::{Camera, CameraController},
    context::Context,
    data_structures::{
        light::Light,
        mesh::{DrawMesh, Mesh},
        object::{self, DrawObject, Material, ObjectProperties, Transform},
        texture::Texture,
    },
    pipelines::{BlendVariants, basic::DepthTest, frame::FrameBindings, normal_mapping},
    render::{FramePlan, RenderState},
    resources::{self, primitives},
    scenes::{BeginFuture, Scene},
};

pub const NORMAL_MAP: &str = "textures/normalmap_brick.png";

struct NormalMappingResources {
    frame: FrameBindings,
    sphere: Mesh,
    object: DrawObject,
    normal_map: wgpu::BindGroup,
    pipelines: BlendVariants,
}

pub struct NormalMappingScene {
    camera: Camera,
    controller: CameraController,
    light: Light,
    plan: FramePlan,
    gpu: Option<NormalMappingResources>,
}

impl NormalMappingScene {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Camera::with_speed(Vector3::new(0.0, 0.0, 4.0), 0.02);
        camera.aspect = aspect;
        Self {
            camera,
            controller: CameraController::new(),
            light: Light::default(),
            plan: FramePlan::forward(),
            gpu: None,
        }
    }
}

impl Scene for NormalMappingScene {
    fn name(&self) -> &str {
        "normal-mapping"
    }

    fn begin_scene<'a>(&'a mut self, ctx: &'a Context) -> BeginFuture<'a> {
        Box::pin(async move {
            log::info!("begin normal mapping scene");
            let device = &ctx.device;
            let frame = FrameBindings::new(device);
            let object_layout = object::object_bind_group_layout(device);
            let normal_map_layout = normal_mapping::mk_bind_group_layout(device);

            let pipelines = normal_mapping::mk_pipelines(
                device,
                ctx.config.format,
                &frame.layout,
                &object_layout,
                &normal_map_layout,
                DepthTest::Compare(wgpu::CompareFunction::Less),
            )
            .await?;

            let texture = match resources::load_texture(NORMAL_MAP, true, device, &ctx.queue).await
            {
                Ok(texture) => texture,
                Err(e) => {
                    log::warn!("{e:#}; using a flat normal map");
                    Texture::create_default_normal_map(2, 2, device, &ctx.queue)
                }
            };
            let normal_map = normal_mapping::mk_bind_group(device, &normal_map_layout, &texture);

            let sphere = Mesh::upload(
                device,
                "sphere",
                &primitives::sphere(primitives::DEFAULT_PRECISION),
            );
            let object = DrawObject::new(
                device,
                &object_layout,
                "sphere",
                ObjectProperties::new(
                    &Transform::new(),
                    Vector4::new(1.0, 1.0, 1.0, 1.0),
                    &Material::default(),
                ),
            );

            let (width, height) = ctx.size();
            self.camera.set_aspect(width, height);
            frame.write_camera(&ctx.queue, &self.camera);
            frame.write_light(&ctx.queue, &self.light, Vector4::new(0.2, 0.2, 0.2, 1.0));

            self.gpu = Some(NormalMappingResources {
                frame,
                sphere,
                object,
                normal_map,
                pipelines,
            });
            Ok(())
        })
    }

    fn is_ready(&self) -> bool {
        self.gpu.is_some()
    }

    fn frame_plan(&self) -> &FramePlan {
        &self.plan
    }

    fn clear_colour(&self) -> wgpu::Color {
        wgpu::Color {
            r: 0.0,
            g: 0.0,
            b: 0.1,
            a: 1.0,
        }
    }

    fn uses_depth(&self) -> bool {
        true
    }

    fn render_geometry(
        &mut self,
        ctx: &Context,
        pass: &mut wgpu::RenderPass<'static>,
        state: &RenderState,
        _current_time: f64,
    ) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        gpu.frame.write_camera(&ctx.queue, &self.camera);
        pass.set_pipeline(gpu.pipelines.select(state.blend));
        pass.set_bind_group(0, &gpu.frame.bind_group, &[]);
        pass.set_bind_group(1, &gpu.object.bind_group, &[]);
        pass.set_bind_group(2, &gpu.normal_map, &[]);
        pass.draw_mesh(&gpu.sphere);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controller.handle_window_events(event)
    }

    fn update(&mut self, dt: Duration) {
        self.controller.update(&mut self.camera, dt);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_moves_slowly() {
        let scene = NormalMappingScene::new(1.5);
        assert_eq!(scene.camera.speed, 0.02);
        assert_eq!(scene.camera.aspect, 1.5);
        assert_eq!(scene.camera.position.z, 4.0);
    }
}
