//! Bind group 0: the camera and light uniform blocks every program shares.

use crate::{
    camera::{Camera, CameraProperties},
    data_structures::light::{Light, LightProperties},
};

pub const FRAME_GROUP: u32 = 0;
pub const CAMERA_PROPERTIES_BINDING: u32 = 24;
pub const LIGHT_PROPERTIES_BINDING: u32 = 25;

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let block = |binding: u32, size: usize| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            block(CAMERA_PROPERTIES_BINDING, std::mem::size_of::<CameraProperties>()),
            block(LIGHT_PROPERTIES_BINDING, std::mem::size_of::<LightProperties>()),
        ],
        label: Some("frame_bind_group_layout"),
    })
}

/// Camera and light uniform buffers bound at group 0.
#[derive(Debug)]
pub struct FrameBindings {
    pub camera_buffer: wgpu::Buffer,
    pub light_buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let mk_buffer = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let camera_buffer = mk_buffer("Camera Properties", std::mem::size_of::<CameraProperties>());
        let light_buffer = mk_buffer("Light Properties", std::mem::size_of::<LightProperties>());
        let layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: CAMERA_PROPERTIES_BINDING,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: LIGHT_PROPERTIES_BINDING,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
            label: Some("frame_bind_group"),
        });
        Self {
            camera_buffer,
            light_buffer,
            layout,
            bind_group,
        }
    }

    pub fn write_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        camera.update_uniform_block(queue, &self.camera_buffer);
    }

    pub fn write_light(
        &self,
        queue: &wgpu::Queue,
        light: &Light,
        global_ambient: cgmath::Vector4<f32>,
    ) {
        light.update_uniform_block(queue, &self.light_buffer, global_ambient);
    }
}
