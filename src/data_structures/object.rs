//! Per-object transforms and uniforms.
//!
//! Every drawable owns its own uniform buffer and bind group. Queue writes
//! only land at submit time, so objects drawn in the same pass cannot share
//! one buffer.

use cgmath::{InnerSpace, Matrix4, One, Quaternion, Rad, Rotation3, Vector3, Vector4, Zero};
use wgpu::util::DeviceExt;

/// Translation, rotation and scale, applied as `T * R * S`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Rotate by `angle` about `axis`. The axis does not need to be normalised;
    /// a zero axis leaves the rotation untouched.
    pub fn rotated(mut self, axis: Vector3<f32>, angle: Rad<f32>) -> Self {
        if axis.magnitude2() > 0.0 {
            self.rotation = Quaternion::from_axis_angle(axis.normalize(), angle);
        }
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale = Vector3::new(factor, factor, factor);
        self
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Surface description for the lit shaders. `shininess` is packed into the
/// specular term's `w`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    pub shininess: f32,
}

impl Material {
    pub fn uniform(ambient: f32, diffuse: f32, specular: f32, shininess: f32) -> Self {
        Self {
            ambient: Vector4::new(ambient, ambient, ambient, 1.0),
            diffuse: Vector4::new(diffuse, diffuse, diffuse, 1.0),
            specular: Vector4::new(specular, specular, specular, 1.0),
            shininess,
        }
    }

    pub fn with_ambient(mut self, r: f32, g: f32, b: f32) -> Self {
        self.ambient = Vector4::new(r, g, b, 1.0);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::uniform(0.5, 0.5, 0.2, 0.7)
    }
}

/// GPU layout of the per-object uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectProperties {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// xyz = specular colour, w = shininess
    pub specular: [f32; 4],
}

impl ObjectProperties {
    pub fn new(transform: &Transform, color: Vector4<f32>, material: &Material) -> Self {
        let mut specular: [f32; 4] = material.specular.into();
        specular[3] = material.shininess;
        Self {
            model: transform.to_matrix().into(),
            color: color.into(),
            ambient: material.ambient.into(),
            diffuse: material.diffuse.into(),
            specular,
        }
    }

    pub fn unlit(transform: &Transform, color: Vector4<f32>) -> Self {
        Self::new(transform, color, &Material::default())
    }
}

pub fn object_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(
                    std::mem::size_of::<ObjectProperties>() as u64,
                ),
            },
            count: None,
        }],
        label: Some("object_bind_group_layout"),
    })
}

/// A drawable's uniform buffer and bind group.
#[derive(Debug)]
pub struct DrawObject {
    pub properties: ObjectProperties,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl DrawObject {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        properties: ObjectProperties,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Object Buffer")),
            contents: bytemuck::cast_slice(&[properties]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} Object Bind Group")),
        });
        Self {
            properties,
            buffer,
            bind_group,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, properties: ObjectProperties) {
        self.properties = properties;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.properties]));
    }
}
