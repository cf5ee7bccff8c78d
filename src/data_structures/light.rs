use cgmath::Vector4;

/// Where the transparency scene's light sits at `current_time` seconds:
/// a circle of radius 5 in the XZ plane, one revolution every 10π seconds.
pub fn light_orbit_position(current_time: f64) -> Vector4<f32> {
    const DISTANCE: f64 = 5.0;
    let angle = current_time / 5.0;
    Vector4::new(
        (angle.sin() * DISTANCE) as f32,
        0.0,
        (angle.cos() * DISTANCE) as f32,
        0.0,
    )
}

/// A point light.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub world_pos: Vector4<f32>,
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
}

impl Light {
    pub fn new(
        world_pos: Vector4<f32>,
        ambient: Vector4<f32>,
        diffuse: Vector4<f32>,
        specular: Vector4<f32>,
    ) -> Self {
        Self {
            world_pos,
            ambient,
            diffuse,
            specular,
        }
    }

    pub fn set_world_pos(&mut self, world_pos: Vector4<f32>) {
        self.world_pos = world_pos;
    }

    pub fn properties(&self, global_ambient: Vector4<f32>) -> LightProperties {
        LightProperties {
            position: self.world_pos.into(),
            ambient: self.ambient.into(),
            diffuse: self.diffuse.into(),
            specular: self.specular.into(),
            global_ambient: global_ambient.into(),
        }
    }

    /// Push the light into its uniform block.
    pub fn update_uniform_block(
        &self,
        queue: &wgpu::Queue,
        buffer: &wgpu::Buffer,
        global_ambient: Vector4<f32>,
    ) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[self.properties(global_ambient)]));
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            world_pos: Vector4::new(5.0, 5.0, 5.0, 1.0),
            ambient: Vector4::new(0.1, 0.1, 0.1, 1.0),
            diffuse: Vector4::new(1.0, 1.0, 1.0, 1.0),
            specular: Vector4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// GPU layout of the `LightProperties` uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightProperties {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub global_ambient: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_starts_on_positive_z() {
        let p = light_orbit_position(0.0);
        assert_eq!(p, Vector4::new(0.0, 0.0, 5.0, 0.0));
    }

    #[test]
    fn orbit_matches_formula() {
        for t in [0.5, 1.0, 7.25, 31.4, 1000.0] {
            let p = light_orbit_position(t);
            let expected_x = ((t / 5.0).sin() * 5.0) as f32;
            let expected_z = ((t / 5.0).cos() * 5.0) as f32;
            assert!((p.x - expected_x).abs() < 1e-5);
            assert_eq!(p.y, 0.0);
            assert!((p.z - expected_z).abs() < 1e-5);
            assert_eq!(p.w, 0.0);
        }
    }

    #[test]
    fn orbit_keeps_constant_radius() {
        let p = light_orbit_position(12.0);
        assert!(((p.x * p.x + p.z * p.z).sqrt() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn properties_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<LightProperties>(), 80);
        assert_eq!(std::mem::size_of::<LightProperties>() % 16, 0);
    }

    #[test]
    fn properties_copy_every_term() {
        let mut light = Light::new(
            Vector4::new(0.0, 0.0, 5.0, 0.0),
            Vector4::new(0.0, 0.0, 0.0, 0.0),
            Vector4::new(50.0, 45.0, 43.0, 1.0),
            Vector4::new(1.0, 1.0, 1.0, 1.0),
        );
        light.set_world_pos(light_orbit_position(0.0));
        let props = light.properties(Vector4::new(0.5, 0.1, 0.25, 1.0));
        assert_eq!(props.position, [0.0, 0.0, 5.0, 0.0]);
        assert_eq!(props.diffuse, [50.0, 45.0, 43.0, 1.0]);
        assert_eq!(props.global_ambient, [0.5, 0.1, 0.25, 1.0]);
    }
}
