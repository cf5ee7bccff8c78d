//! Window and event loop.
//!
//! [`run`] opens a window, builds the GPU [`Context`] and the configured
//! [`Scene`], then drives it:
//! 1. Forward window events to the scene (camera keys)
//! 2. On every redraw advance the camera by the elapsed time
//! 3. Record the scene's frame plan into the surface texture
//! 4. Present and request the next redraw
//!
//! Nothing is rendered unless start-up fully succeeded.

use std::sync::Arc;

use anyhow::Context as _;
use instant::Instant;
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    config::AppConfig,
    context::{Context, FrameTarget},
    scenes::{Scene, build_scene},
};

/// Outcome of window, context and scene creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Startup {
    #[default]
    Pending,
    Ready,
    Failed,
}

impl Startup {
    pub fn should_render(self) -> bool {
        self == Startup::Ready
    }
}

struct Running {
    ctx: Context,
    scene: Box<dyn Scene>,
}

pub struct App {
    config: AppConfig,
    async_runtime: Runtime,
    startup: Startup,
    running: Option<Running>,
    start_time: Instant,
    last_time: Instant,
}

impl App {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let async_runtime = Runtime::new()?;
        Ok(Self {
            config,
            async_runtime,
            startup: Startup::Pending,
            running: None,
            start_time: Instant::now(),
            last_time: Instant::now(),
        })
    }

    pub fn startup(&self) -> Startup {
        self.startup
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let config = &self.config;
        let (ctx, scene) = self.async_runtime.block_on(async move {
            let ctx = Context::new(window, config).await?;
            let mut scene = build_scene(config.scene, config, ctx.aspect_ratio());
            scene.begin_scene(&ctx).await?;
            scene
                .frame_plan()
                .validate()
                .with_context(|| format!("scene '{}' has an invalid frame plan", scene.name()))?;
            anyhow::Ok((ctx, scene))
        })?;
        log::info!("scene '{}' ready", scene.name());
        Ok(Running { ctx, scene })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.startup.should_render() {
            return;
        }
        let Some(running) = &mut self.running else {
            return;
        };

        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();
        running.scene.update(dt);

        let surface = match &running.ctx.surface {
            Some(surface) => surface,
            None => return,
        };
        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                running.ctx.reconfigure();
                running.ctx.request_redraw();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                running.ctx.request_redraw();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::error!("Unable to render {e}");
                running.ctx.request_redraw();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = running
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let depth_view = &running.ctx.depth_texture.view;
            let mut target = FrameTarget::new(&mut encoder, &view, depth_view);
            let current_time = self.start_time.elapsed().as_secs_f64();
            if let Err(e) = running
                .scene
                .render_scene(&running.ctx, &mut target, current_time)
            {
                log::error!("frame not recorded: {e:#}");
            }
        }
        running.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        running.ctx.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.startup != Startup::Pending {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.ctx.request_redraw();
                self.running = Some(running);
                self.startup = Startup::Ready;
                self.start_time = Instant::now();
                self.last_time = self.start_time;
            }
            Err(e) => {
                log::error!("start-up failed: {e:#}");
                self.startup = Startup::Failed;
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let Some(running) = &mut self.running {
            running.scene.handle_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(running) = &mut self.running {
                    if running.ctx.resize(size.width, size.height) {
                        running.scene.resize(size.width, size.height);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }
}

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    log::info!("starting scene '{}'", config.scene);
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    if app.startup() == Startup::Failed {
        anyhow::bail!("start-up failed, nothing was rendered");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_a_ready_startup_renders() {
        assert!(!Startup::Pending.should_render());
        assert!(!Startup::Failed.should_render());
        assert!(Startup::Ready.should_render());
    }

    #[test]
    fn new_app_has_not_started() {
        let app = App::new(AppConfig::default()).unwrap();
        assert_eq!(app.startup(), Startup::Pending);
        assert!(app.running.is_none());
    }
}
