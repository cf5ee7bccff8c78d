//! Fly camera, keyboard controller and the `CameraProperties` uniform block.

use std::time::Duration;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, Vector4, perspective};
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// cgmath builds OpenGL clip space (z in -1..1); wgpu expects z in 0..1.
#[rustfmt::skip]
fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.0,
        0.0, 0.0, 0.5, 1.0,
    )
}

const SAFE_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.0001;
/// Movement speeds are expressed per frame at this rate.
const REFERENCE_FPS: f32 = 60.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// World units travelled per reference frame while a key is held.
    pub speed: f32,
}

impl Camera {
    /// A camera at `position` looking down -Z.
    pub fn new(position: Vector4<f32>, fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Point3::new(position.x, position.y, position.z),
            yaw: Rad(-std::f32::consts::FRAC_PI_2),
            pitch: Rad(0.0),
            fovy: Rad(fovy),
            aspect,
            near,
            far,
            speed: 0.05,
        }
    }

    /// Camera with the default lens (60 degrees, 0.1..1000) and the given speed.
    pub fn with_speed(position: Vector3<f32>, speed: f32) -> Self {
        Self {
            speed,
            ..Self::new(position.extend(0.0), std::f32::consts::FRAC_PI_3, 1.0, 0.1, 1000.0)
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        opengl_to_wgpu_matrix() * perspective(self.fovy, self.aspect, self.near, self.far)
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn properties(&self) -> CameraProperties {
        CameraProperties {
            view: self.view_matrix().into(),
            projection: self.projection_matrix().into(),
            position: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }

    /// Push view, projection and position into the camera uniform block.
    pub fn update_uniform_block(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[self.properties()]));
    }
}

/// GPU layout of the `CameraProperties` uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraProperties {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 4],
}

/// Keyboard state for moving a [`Camera`].
///
/// W/S move along the view direction, A/D strafe, Q/E move down/up and the
/// arrow keys turn.
#[derive(Debug, Default)]
pub struct CameraController {
    forward: f32,
    backward: f32,
    left: f32,
    right: f32,
    up: f32,
    down: f32,
    turn_left: f32,
    turn_right: f32,
    turn_up: f32,
    turn_down: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the event was a key this controller tracks.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.handle_key(*code, *state),
            _ => false,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, state: ElementState) -> bool {
        let amount = if state == ElementState::Pressed { 1.0 } else { 0.0 };
        let slot = match code {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.backward,
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            KeyCode::KeyE | KeyCode::Space => &mut self.up,
            KeyCode::KeyQ | KeyCode::ShiftLeft => &mut self.down,
            KeyCode::ArrowLeft => &mut self.turn_left,
            KeyCode::ArrowRight => &mut self.turn_right,
            KeyCode::ArrowUp => &mut self.turn_up,
            KeyCode::ArrowDown => &mut self.turn_down,
            _ => return false,
        };
        *slot = amount;
        true
    }

    pub fn update(&self, camera: &mut Camera, dt: Duration) {
        let frames = dt.as_secs_f32() * REFERENCE_FPS;
        let step = camera.speed * frames;

        let forward = camera.forward();
        let right = forward.cross(Vector3::unit_y()).normalize();
        camera.position += forward * (self.forward - self.backward) * step;
        camera.position += right * (self.right - self.left) * step;
        camera.position.y += (self.up - self.down) * step;

        // one degree per reference frame
        let turn = 1f32.to_radians() * frames;
        camera.yaw += Rad((self.turn_right - self.turn_left) * turn);
        camera.pitch += Rad((self.turn_up - self.turn_down) * turn);
        camera.pitch = Rad(camera.pitch.0.clamp(-SAFE_PITCH, SAFE_PITCH));
    }
}
