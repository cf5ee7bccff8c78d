//! scene-ngin
//!
//! A small set of real-time demo scenes rendered directly on wgpu and winit:
//! a Blinn-Phong lit scene, a normal-mapping scene and an order-independent
//! transparency scene built on per-pixel fragment linked lists. The crate has
//! no asset pipeline and no scene graph; each scene owns a fixed set of meshes,
//! shaders and GPU buffers and records its passes in a fixed order every frame.
//!
//! High-level modules
//! - `app`: window, event loop and the per-frame driver
//! - `camera`: fly camera, keyboard controller and the camera uniform block
//! - `config`: application, scene and fragment-list configuration
//! - `context`: GPU device/queue/surface owner and per-frame targets
//! - `data_structures`: meshes, lights, per-object uniforms, textures, fragment lists
//! - `pipelines`: render pipeline builders and the shared frame bindings
//! - `render`: ordered frame plans and their execution
//! - `resources`: asset loading, shader pairs and procedural primitives
//! - `scenes`: the `Scene` trait and the three demo scenes
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scenes;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::event::WindowEvent;
