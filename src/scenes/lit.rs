//! Three translucent spheres composited through per-pixel fragment lists.

use std::time::Duration;

use cgmath::{Rad, Vector3, Vector4, Zero};
use winit::event::WindowEvent;

use crate::{
    camera::{Camera, CameraController},
    config::OitConfig,
    context::Context,
    data_structures::{
        fragment_list::FragmentLists,
        light::{Light, light_orbit_position},
        mesh::{DrawMesh, Mesh},
        object::{self, DrawObject, ObjectProperties, Transform},
    },
    pipelines::{
        BlendVariants,
        basic::DepthTest,
        frame::FrameBindings,
        oit::{self, OitPipelines},
        unlit,
    },
    render::{FramePlan, RenderState},
    resources::primitives,
    scenes::{BeginFuture, Scene},
};

pub const SPHERE_PRECISION: u32 = 32;

/// Scale, colour, rotation axis and rotation angle of each sphere at
/// `current_time` seconds.
pub fn sphere_transforms(current_time: f64) -> [(Transform, Vector4<f32>); 3] {
    [
        (Transform::new().scaled(0.8), Vector4::new(0.0, 0.5, 0.5, 0.7)),
        (
            Transform::new()
                .scaled(1.0)
                .rotated(Vector3::new(1.0, 0.3, 0.0), Rad(0.0)),
            Vector4::new(0.0, 0.5, 0.0, 0.3),
        ),
        (
            Transform::new()
                .scaled(1.2)
                .rotated(Vector3::new(1.0, 1.0, 0.0), Rad((2.0 * current_time) as f32)),
            Vector4::new(1.0, 0.5, 0.5, 0.3),
        ),
    ]
}

struct LitResources {
    frame: FrameBindings,
    sphere: Mesh,
    spheres: Vec<DrawObject>,
    lists: FragmentLists,
    oit: OitPipelines,
    unlit: BlendVariants,
}

pub struct LitScene {
    camera: Camera,
    controller: CameraController,
    light: Light,
    oit_config: OitConfig,
    plan: FramePlan,
    gpu: Option<LitResources>,
}

impl LitScene {
    pub fn new(fovy: f32, aspect: f32, near: f32, far: f32, oit_config: OitConfig) -> Self {
        let camera = Camera::new(Vector4::new(0.0, 0.0, 4.0, 0.0), fovy, aspect, near, far);
        let light = Light::new(
            Vector4::new(0.0, 0.0, 5.0, 0.0),
            Vector4::zero(),
            Vector4::new(50.0, 45.0, 43.0, 1.0),
            Vector4::new(1.0, 1.0, 1.0, 1.0),
        );
        Self {
            camera,
            controller: CameraController::new(),
            light,
            plan: FramePlan::order_independent(oit_config.resolve),
            oit_config,
            gpu: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    fn warn_if_exceeds_lists(&self, width: u32, height: u32) {
        if width > self.oit_config.max_width || height > self.oit_config.max_height {
            log::warn!(
                "surface {width}x{height} exceeds the fragment-list extent {}x{}; pixels outside it stay empty",
                self.oit_config.max_width,
                self.oit_config.max_height
            );
        }
    }
}

impl Scene for LitScene {
    fn name(&self) -> &str {
        "lit"
    }

    fn begin_scene<'a>(&'a mut self, ctx: &'a Context) -> BeginFuture<'a> {
        Box::pin(async move {
            log::info!("begin lit scene");
            let device = &ctx.device;
            let format = ctx.config.format;

            let frame = FrameBindings::new(device);
            let object_layout = object::object_bind_group_layout(device);
            let lists = FragmentLists::new(device, &self.oit_config);

            let (oit, unlit) = futures::try_join!(
                oit::mk_pipelines(device, format, &frame.layout, &lists.layout, &object_layout),
                unlit::mk_pipelines(device, format, &frame.layout, &object_layout, DepthTest::None),
            )?;

            let sphere = Mesh::upload(device, "sphere", &primitives::sphere(SPHERE_PRECISION));
            let spheres = sphere_transforms(0.0)
                .iter()
                .enumerate()
                .map(|(i, (transform, color))| {
                    DrawObject::new(
                        device,
                        &object_layout,
                        &format!("sphere {i}"),
                        ObjectProperties::unlit(transform, *color),
                    )
                })
                .collect();

            let (width, height) = ctx.size();
            self.camera.set_aspect(width, height);
            self.warn_if_exceeds_lists(width, height);
            frame.write_camera(&ctx.queue, &self.camera);
            frame.write_light(&ctx.queue, &self.light, Vector4::zero());

            self.gpu = Some(LitResources {
                frame,
                sphere,
                spheres,
                lists,
                oit,
                unlit,
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
        wgpu::Color::TRANSPARENT
    }

    fn uses_depth(&self) -> bool {
        false
    }

    fn render_geometry(
        &mut self,
        ctx: &Context,
        pass: &mut wgpu::RenderPass<'static>,
        state: &RenderState,
        current_time: f64,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        self.light.set_world_pos(light_orbit_position(current_time));
        gpu.frame.write_camera(&ctx.queue, &self.camera);
        gpu.frame.write_light(&ctx.queue, &self.light, Vector4::zero());

        let build_lists = self.oit_config.resolve && state.fragment_lists_bound;
        pass.set_bind_group(0, &gpu.frame.bind_group, &[]);
        if build_lists {
            pass.set_pipeline(gpu.oit.build.select(state.blend));
            pass.set_bind_group(1, &gpu.lists.bind_group, &[]);
        } else {
            pass.set_pipeline(gpu.unlit.select(state.blend));
        }
        let object_group = if build_lists { 2 } else { 1 };

        for (object, (transform, color)) in gpu
            .spheres
            .iter_mut()
            .zip(sphere_transforms(current_time).iter())
        {
            object.update(&ctx.queue, ObjectProperties::unlit(transform, *color));
            pass.set_bind_group(object_group, &object.bind_group, &[]);
            pass.draw_mesh(&gpu.sphere);
        }
    }

    fn render_resolve(
        &mut self,
        _ctx: &Context,
        pass: &mut wgpu::RenderPass<'static>,
        _state: &RenderState,
        _current_time: f64,
    ) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        pass.set_pipeline(&gpu.oit.resolve);
        pass.set_bind_group(0, &gpu.frame.bind_group, &[]);
        pass.set_bind_group(1, &gpu.lists.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn fragment_lists(&self) -> Option<&FragmentLists> {
        self.gpu.as_ref().map(|gpu| &gpu.lists)
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controller.handle_window_events(event)
    }

    fn update(&mut self, dt: Duration) {
        self.controller.update(&mut self.camera, dt);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        self.warn_if_exceeds_lists(width, height);
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, One, SquareMatrix};

    use super::*;
    use crate::render::{BlendMode, PassStep};

    #[test]
    fn spheres_grow_outward() {
        let scales: Vec<f32> = sphere_transforms(0.0)
            .iter()
            .map(|(t, _)| t.scale.x)
            .collect();
        assert_eq!(scales, vec![0.8, 1.0, 1.2]);
    }

    #[test]
    fn only_the_outer_sphere_spins() {
        let at_zero = sphere_transforms(0.0);
        let later = sphere_transforms(1.5);
        assert_eq!(at_zero[0].0, later[0].0);
        assert_eq!(at_zero[1].0, later[1].0);
        assert_ne!(at_zero[2].0, later[2].0);
        assert_eq!(at_zero[2].0.to_matrix(), Matrix4::from_scale(1.2));
        assert!(at_zero[1].0.to_matrix().invert().is_some());
        assert_eq!(
            Transform::new().rotated(Vector3::new(1.0, 0.3, 0.0), Rad(0.0)).to_matrix(),
            Matrix4::one()
        );
    }

    #[test]
    fn sphere_colours_are_translucent() {
        let alphas: Vec<f32> = sphere_transforms(0.0).iter().map(|(_, c)| c.w).collect();
        assert_eq!(alphas, vec![0.7, 0.3, 0.3]);
    }

    #[test]
    fn new_scene_places_camera_and_light() {
        let scene = LitScene::new(1.0, 1.0, 0.1, 1000.0, OitConfig::default());
        assert_eq!(scene.camera().position.z, 4.0);
        assert_eq!(scene.light().world_pos, Vector4::new(0.0, 0.0, 5.0, 0.0));
        assert_eq!(scene.light().diffuse, Vector4::new(50.0, 45.0, 43.0, 1.0));
        assert!(!scene.is_ready());
        assert!(scene.fragment_lists().is_none());
    }

    #[test]
    fn resolve_toggle_shapes_the_plan() {
        let with = LitScene::new(1.0, 1.0, 0.1, 1000.0, OitConfig::default());
        let without = LitScene::new(
            1.0,
            1.0,
            0.1,
            1000.0,
            OitConfig {
                resolve: false,
                ..OitConfig::default()
            },
        );
        assert_eq!(with.frame_plan().steps().last(), Some(&PassStep::Resolve));
        assert_eq!(
            without.frame_plan().steps().last(),
            Some(&PassStep::Blend(BlendMode::Disabled))
        );
    }
}
