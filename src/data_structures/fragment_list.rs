//! Per-pixel linked lists of transparent fragments.
//!
//! Every covered pixel owns a head pointer into a shared node pool. The list
//! building shader allocates a node with an atomic counter, stores the
//! fragment's packed colour and depth in it and swaps it in as the new head.
//!
//! Head pointers hold `node index + 1`; zero marks an empty list so a plain
//! zero fill clears them.

use wgpu::util::DeviceExt;

use crate::config::OitConfig;

pub const HEAD_POINTERS_BINDING: u32 = 0;
pub const NODES_BINDING: u32 = 1;
pub const COUNTER_BINDING: u32 = 2;
pub const PROPERTIES_BINDING: u32 = 3;

/// One list node as stored on the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ListNode {
    /// `pack4x8unorm` RGBA
    pub color: u32,
    pub depth: f32,
    pub next: u32,
    pub _pad: u32,
}

pub const NODE_SIZE: u64 = std::mem::size_of::<ListNode>() as u64;

/// Uniform block telling the shaders how the storage is laid out.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ListProperties {
    /// Head pointers per row.
    pub stride: u32,
    pub rows: u32,
    /// Number of nodes in the pool.
    pub capacity: u32,
    pub _pad: u32,
}

/// Buffer sizes derived from an [`OitConfig`] and the device limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListSizing {
    pub stride: u32,
    pub rows: u32,
    pub capacity: u32,
    /// `capacity` is smaller than requested because of the binding limit.
    pub clamped: bool,
    /// `stride` or `rows` is smaller than requested because of the binding limit.
    pub extent_clamped: bool,
}

impl ListSizing {
    pub fn new(config: &OitConfig, max_storage_binding_size: u64) -> Self {
        // one u32 head pointer per pixel has to fit a single binding too
        let max_pointers = (max_storage_binding_size / 4).max(1);
        let stride = u64::from(config.max_width.max(1)).min(max_pointers);
        let rows = u64::from(config.max_height.max(1)).min(max_pointers / stride);
        let extent_clamped =
            stride < u64::from(config.max_width.max(1)) || rows < u64::from(config.max_height.max(1));

        let limit = max_storage_binding_size / NODE_SIZE;
        let requested = config.requested_nodes().max(1);
        let capacity = requested.min(limit).min(u64::from(u32::MAX)) as u32;
        Self {
            stride: stride as u32,
            rows: rows as u32,
            capacity,
            clamped: u64::from(capacity) < requested,
            extent_clamped,
        }
    }

    pub fn head_pointer_bytes(&self) -> u64 {
        u64::from(self.stride) * u64::from(self.rows) * 4
    }

    pub fn node_bytes(&self) -> u64 {
        u64::from(self.capacity) * NODE_SIZE
    }

    /// Bytes of head pointers that cover a surface `surface_height` rows high.
    ///
    /// Rows past `rows` do not exist, so taller surfaces clear the whole image.
    pub fn clear_bytes(&self, surface_height: u32) -> u64 {
        u64::from(surface_height.min(self.rows)) * u64::from(self.stride) * 4
    }

    pub fn properties(&self) -> ListProperties {
        ListProperties {
            stride: self.stride,
            rows: self.rows,
            capacity: self.capacity,
            _pad: 0,
        }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let storage = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            storage(HEAD_POINTERS_BINDING),
            storage(NODES_BINDING),
            storage(COUNTER_BINDING),
            wgpu::BindGroupLayoutEntry {
                binding: PROPERTIES_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ListProperties>() as u64,
                    ),
                },
                count: None,
            },
        ],
        label: Some("fragment_lists_bind_group_layout"),
    })
}

/// GPU storage for the per-pixel lists.
#[derive(Debug)]
pub struct FragmentLists {
    pub sizing: ListSizing,
    pub head_pointers: wgpu::Buffer,
    pub nodes: wgpu::Buffer,
    pub counter: wgpu::Buffer,
    pub properties: wgpu::Buffer,
    /// Zero-filled source for clearing `head_pointers`.
    clear_buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl FragmentLists {
    pub fn new(device: &wgpu::Device, config: &OitConfig) -> Self {
        let limit = u64::from(device.limits().max_storage_buffer_binding_size);
        let sizing = ListSizing::new(config, limit);
        if sizing.extent_clamped {
            log::warn!(
                "head pointer image clamped to {}x{} ({}x{} requested)",
                sizing.stride,
                sizing.rows,
                config.max_width,
                config.max_height
            );
        }
        if sizing.clamped {
            log::warn!(
                "fragment node pool clamped to {} nodes ({} requested)",
                sizing.capacity,
                config.requested_nodes()
            );
        }
        log::info!(
            "fragment lists: {}x{} head pointers, {} nodes",
            sizing.stride,
            sizing.rows,
            sizing.capacity
        );

        let head_pointers = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Head Pointers"),
            size: sizing.head_pointer_bytes(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let clear_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Head Pointer Clear"),
            size: sizing.head_pointer_bytes(),
            usage: wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: true,
        });
        clear_buffer.slice(..).get_mapped_range_mut().fill(0);
        clear_buffer.unmap();

        let nodes = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fragment Nodes"),
            size: sizing.node_bytes(),
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let counter = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Counter"),
            contents: bytemuck::cast_slice(&[0u32]),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let properties = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("List Properties"),
            contents: bytemuck::cast_slice(&[sizing.properties()]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: HEAD_POINTERS_BINDING,
                    resource: head_pointers.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: NODES_BINDING,
                    resource: nodes.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: COUNTER_BINDING,
                    resource: counter.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: PROPERTIES_BINDING,
                    resource: properties.as_entire_binding(),
                },
            ],
            label: Some("fragment_lists_bind_group"),
        });

        Self {
            sizing,
            head_pointers,
            nodes,
            counter,
            properties,
            clear_buffer,
            layout,
            bind_group,
        }
    }

    /// Zero the node allocator. The write lands before the next submit.
    pub fn reset_counter(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.counter, 0, bytemuck::cast_slice(&[0u32]));
    }

    /// Record a copy that empties every list covering a surface
    /// `surface_height` rows high.
    pub fn clear_head_pointers(&self, encoder: &mut wgpu::CommandEncoder, surface_height: u32) {
        let bytes = self.sizing.clear_bytes(surface_height);
        if bytes == 0 {
            return;
        }
        encoder.copy_buffer_to_buffer(&self.clear_buffer, 0, &self.head_pointers, 0, bytes);
    }
}

impl Drop for FragmentLists {
    fn drop(&mut self) {
        self.head_pointers.destroy();
        self.nodes.destroy();
        self.counter.destroy();
        self.properties.destroy();
        self.clear_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_LIMIT: u64 = 128 << 20;

    #[test]
    fn node_matches_shader_layout() {
        assert_eq!(NODE_SIZE, 16);
        assert_eq!(std::mem::size_of::<ListProperties>(), 16);
    }

    #[test]
    fn capacity_follows_nodes_per_pixel() {
        let config = OitConfig {
            max_width: 64,
            max_height: 32,
            nodes_per_pixel: 3,
            resolve: true,
        };
        let sizing = ListSizing::new(&config, DEFAULT_LIMIT);
        assert_eq!(sizing.capacity, 64 * 32 * 3);
        assert!(!sizing.clamped);
        assert_eq!(sizing.head_pointer_bytes(), 64 * 32 * 4);
        assert_eq!(sizing.node_bytes(), 64 * 32 * 3 * 16);
    }

    #[test]
    fn capacity_is_clamped_to_binding_limit() {
        let sizing = ListSizing::new(&OitConfig::default(), DEFAULT_LIMIT);
        assert!(sizing.clamped);
        assert_eq!(sizing.capacity as u64, DEFAULT_LIMIT / NODE_SIZE);
        assert!(sizing.node_bytes() <= DEFAULT_LIMIT);
    }

    #[test]
    fn head_pointer_image_is_clamped_to_binding_limit() {
        let config = OitConfig {
            max_width: 8192,
            max_height: 8192,
            ..OitConfig::default()
        };
        let sizing = ListSizing::new(&config, DEFAULT_LIMIT);
        assert!(sizing.extent_clamped);
        assert_eq!(sizing.stride, 8192);
        assert_eq!(sizing.rows, 4096);
        assert!(sizing.head_pointer_bytes() <= DEFAULT_LIMIT);
        assert!(sizing.node_bytes() <= DEFAULT_LIMIT);
        assert_eq!(sizing.clear_bytes(8192), sizing.head_pointer_bytes());
    }

    #[test]
    fn default_extent_fits_the_binding_limit() {
        let sizing = ListSizing::new(&OitConfig::default(), DEFAULT_LIMIT);
        assert!(!sizing.extent_clamped);
        assert_eq!((sizing.stride, sizing.rows), (2048, 2048));
    }

    #[test]
    fn clear_covers_surface_rows_only() {
        let sizing = ListSizing::new(&OitConfig::default(), DEFAULT_LIMIT);
        assert_eq!(sizing.clear_bytes(1080), 1080 * 2048 * 4);
        assert_eq!(sizing.clear_bytes(0), 0);
    }

    #[test]
    fn clear_never_exceeds_head_pointer_image() {
        let config = OitConfig {
            max_width: 16,
            max_height: 8,
            ..OitConfig::default()
        };
        let sizing = ListSizing::new(&config, DEFAULT_LIMIT);
        assert_eq!(sizing.clear_bytes(4096), sizing.head_pointer_bytes());
    }

    #[test]
    fn properties_mirror_sizing() {
        let sizing = ListSizing::new(&OitConfig::default(), DEFAULT_LIMIT);
        let props = sizing.properties();
        assert_eq!(props.stride, 2048);
        assert_eq!(props.rows, 2048);
        assert_eq!(props.capacity, sizing.capacity);
    }
}
