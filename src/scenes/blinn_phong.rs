//! Lit spheres and a torus around a light on a wide orbit.

use std::time::Duration;

use cgmath::{Rad, Vector3, Vector4};
use winit::event::WindowEvent;

use crate::{
    camera::{Camera, CameraController},
    context::Context,
    data_structures::{
        light::Light,
        mesh::{DrawMesh, Mesh},
        object::{self, DrawObject, Material, ObjectProperties, Transform},
    },
    pipelines::{BlendVariants, basic::DepthTest, frame::FrameBindings, lit, unlit},
    render::{FramePlan, RenderState},
    resources::primitives,
    scenes::{BeginFuture, Scene},
};

const LIGHT_ORBIT_RADIUS: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Sphere,
    Torus,
}

/// One draw of the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub shape: Shape,
    /// Drawn with the flat colour program instead of Blinn-Phong.
    pub unlit: bool,
    pub transform: Transform,
    pub material: Material,
}

pub fn global_ambient() -> Vector4<f32> {
    Vector4::new(0.5, 0.1, 0.25, 1.0)
}

pub fn light_position(current_time: f64) -> Vector4<f32> {
    Vector4::new(
        (current_time.sin() * LIGHT_ORBIT_RADIUS) as f32,
        0.0,
        (current_time.cos() * LIGHT_ORBIT_RADIUS) as f32,
        1.0,
    )
}

/// Everything drawn at `current_time` seconds, in draw order.
pub fn placements(current_time: f64) -> [Placement; 4] {
    let t = current_time;
    let base = Material::default();
    [
        Placement {
            shape: Shape::Sphere,
            unlit: true,
            transform: Transform::at(light_position(t).truncate()),
            material: base,
        },
        Placement {
            shape: Shape::Sphere,
            unlit: false,
            transform: Transform::new(),
            material: base,
        },
        Placement {
            shape: Shape::Torus,
            unlit: false,
            transform: Transform::at(Vector3::new(
                (t.sin() * 2.0) as f32,
                (t.cos() * 2.5) as f32,
                0.0,
            ))
            .rotated(Vector3::new(1.0, 0.2, 0.0), Rad(t as f32)),
            material: base.with_ambient(0.2, 0.2, 0.2),
        },
        Placement {
            shape: Shape::Sphere,
            unlit: false,
            transform: Transform::at(Vector3::new(
                (t.cos() * -5.0) as f32,
                (-t.sin() * 4.0) as f32,
                (t.sin() * 3.0) as f32,
            )),
            material: base.with_ambient(0.2, 0.5, 0.78),
        },
    ]
}

struct BlinnPhongResources {
    frame: FrameBindings,
    sphere: Mesh,
    torus: Mesh,
    objects: Vec<DrawObject>,
    lit: BlendVariants,
    unlit: BlendVariants,
}

pub struct BlinnPhongScene {
    camera: Camera,
    controller: CameraController,
    light: Light,
    plan: FramePlan,
    gpu: Option<BlinnPhongResources>,
}

fn properties(placement: &Placement) -> ObjectProperties {
    let white = Vector4::new(1.0, 1.0, 1.0, 1.0);
    if placement.unlit {
        ObjectProperties::unlit(&placement.transform, white)
    } else {
        ObjectProperties::new(&placement.transform, white, &placement.material)
    }
}

impl BlinnPhongScene {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Camera::with_speed(Vector3::new(0.0, 0.0, 4.0), 0.05);
        camera.aspect = aspect;
        let light = Light::new(
            light_position(0.0),
            Vector4::new(0.6, 0.5, 0.5, 1.0),
            Vector4::new(0.7, 0.7, 0.7, 1.0),
            Vector4::new(0.7, 0.5, 0.2, 1.0),
        );
        Self {
            camera,
            controller: CameraController::new(),
            light,
            plan: FramePlan::forward(),
            gpu: None,
        }
    }
}

impl Scene for BlinnPhongScene {
    fn name(&self) -> &str {
        "blinn-phong"
    }

    fn begin_scene<'a>(&'a mut self, ctx: &'a Context) -> BeginFuture<'a> {
        Box::pin(async move {
            log::info!("begin blinn-phong scene");
            let device = &ctx.device;
            let format = ctx.config.format;
            let depth = DepthTest::Compare(wgpu::CompareFunction::LessEqual);

            let frame = FrameBindings::new(device);
            let object_layout = object::object_bind_group_layout(device);
            let (lit, unlit) = futures::try_join!(
                lit::mk_pipelines(device, format, &frame.layout, &object_layout, depth),
                unlit::mk_pipelines(device, format, &frame.layout, &object_layout, depth),
            )?;

            let sphere = Mesh::upload(
                device,
                "sphere",
                &primitives::sphere(primitives::DEFAULT_PRECISION),
            );
            let torus = Mesh::upload(device, "torus", &primitives::default_torus());
            let objects = placements(0.0)
                .iter()
                .enumerate()
                .map(|(i, placement)| {
                    DrawObject::new(
                        device,
                        &object_layout,
                        &format!("{:?} {i}", placement.shape),
                        properties(placement),
                    )
                })
                .collect();

            let (width, height) = ctx.size();
            self.camera.set_aspect(width, height);
            frame.write_camera(&ctx.queue, &self.camera);
            frame.write_light(&ctx.queue, &self.light, global_ambient());

            self.gpu = Some(BlinnPhongResources {
                frame,
                sphere,
                torus,
                objects,
                lit,
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
        wgpu::Color {
            r: 0.1,
            g: 0.1,
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
        current_time: f64,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        self.light.set_world_pos(light_position(current_time));
        gpu.frame.write_camera(&ctx.queue, &self.camera);
        gpu.frame.write_light(&ctx.queue, &self.light, global_ambient());

        pass.set_bind_group(0, &gpu.frame.bind_group, &[]);
        for (object, placement) in gpu.objects.iter_mut().zip(placements(current_time).iter()) {
            object.update(&ctx.queue, properties(placement));
            let pipeline = if placement.unlit {
                gpu.unlit.select(state.blend)
            } else {
                gpu.lit.select(state.blend)
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &object.bind_group, &[]);
            match placement.shape {
                Shape::Sphere => pass.draw_mesh(&gpu.sphere),
                Shape::Torus => pass.draw_mesh(&gpu.torus),
            }
        }
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
    use cgmath::Zero;

    use super::*;

    #[test]
    fn light_orbits_at_fifteen_units() {
        let p = light_position(0.0);
        assert_eq!(p, Vector4::new(0.0, 0.0, 15.0, 1.0));
        let q = light_position(std::f64::consts::FRAC_PI_2);
        assert!((q.x - 15.0).abs() < 1e-4);
        assert!(q.z.abs() < 1e-4);
    }

    #[test]
    fn light_source_marker_follows_the_light() {
        for t in [0.0, 0.7, 3.0] {
            let marker = &placements(t)[0];
            assert!(marker.unlit);
            assert_eq!(marker.transform.position, light_position(t).truncate());
        }
    }

    #[test]
    fn torus_and_second_sphere_use_their_own_ambient() {
        let [_, sphere, torus, second] = placements(1.0);
        assert_eq!(sphere.transform.position, Vector3::zero());
        assert_eq!(sphere.material.ambient.x, 0.5);
        assert_eq!(torus.shape, Shape::Torus);
        assert_eq!(torus.material.ambient.truncate(), Vector3::new(0.2, 0.2, 0.2));
        assert_eq!(
            second.material.ambient.truncate(),
            Vector3::new(0.2, 0.5, 0.78)
        );
        assert_eq!(second.material.diffuse, sphere.material.diffuse);
    }

    #[test]
    fn second_sphere_path_at_zero() {
        let second = &placements(0.0)[3];
        assert_eq!(second.transform.position, Vector3::new(-5.0, 0.0, 0.0));
    }
}
