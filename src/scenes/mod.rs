//! Demo scenes.
//!
//! A [`Scene`] owns its camera, light and GPU resources. `begin_scene` is run
//! once after the context exists; afterwards the app calls
//! [`Scene::render_scene`] every frame, which walks the scene's [`FramePlan`]
//! and dispatches to the per-step hooks.
//!
//! - [`LitScene`] draws three translucent spheres through per-pixel lists
//! - [`NormalMappingScene`] draws a normal-mapped sphere
//! - [`BlinnPhongScene`] draws lit spheres and a torus around an orbiting light

use std::{future::Future, pin::Pin, time::Duration};

use winit::event::WindowEvent;

use crate::{
    config::{AppConfig, SceneKind},
    context::{Context, FrameTarget},
    data_structures::fragment_list::FragmentLists,
    render::{FramePlan, FrameReport, RenderState, execute_plan},
};

pub mod blinn_phong;
pub mod lit;
pub mod normal_mapping;

pub use blinn_phong::BlinnPhongScene;
pub use lit::LitScene;
pub use normal_mapping::NormalMappingScene;

/// Future returned by [`Scene::begin_scene`].
pub type BeginFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>;

pub trait Scene {
    fn name(&self) -> &str;

    /// Create every GPU resource the scene draws with.
    fn begin_scene<'a>(&'a mut self, ctx: &'a Context) -> BeginFuture<'a>;

    /// Whether `begin_scene` completed.
    fn is_ready(&self) -> bool;

    fn frame_plan(&self) -> &FramePlan;

    fn clear_colour(&self) -> wgpu::Color;

    fn uses_depth(&self) -> bool;

    fn render_sky_box(
        &mut self,
        _ctx: &Context,
        _pass: &mut wgpu::RenderPass<'static>,
        _state: &RenderState,
        _current_time: f64,
    ) {
    }

    fn render_shadow(
        &mut self,
        _ctx: &Context,
        _pass: &mut wgpu::RenderPass<'static>,
        _state: &RenderState,
        _current_time: f64,
    ) {
    }

    fn render_geometry(
        &mut self,
        ctx: &Context,
        pass: &mut wgpu::RenderPass<'static>,
        state: &RenderState,
        current_time: f64,
    );

    fn render_resolve(
        &mut self,
        _ctx: &Context,
        _pass: &mut wgpu::RenderPass<'static>,
        _state: &RenderState,
        _current_time: f64,
    ) {
    }

    fn fragment_lists(&self) -> Option<&FragmentLists> {
        None
    }

    /// Returns true when the event was consumed.
    fn handle_window_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    fn update(&mut self, _dt: Duration) {}

    fn resize(&mut self, width: u32, height: u32);

    /// Record one frame at `current_time` seconds into `target`.
    ///
    /// Returns `None` when the scene has not begun yet.
    fn render_scene(
        &mut self,
        ctx: &Context,
        target: &mut FrameTarget<'_>,
        current_time: f64,
    ) -> anyhow::Result<Option<FrameReport>> {
        if !self.is_ready() {
            log::warn!("{} rendered before begin_scene, skipping frame", self.name());
            return Ok(None);
        }
        execute_plan(self, ctx, target, current_time).map(Some)
    }
}

/// The scene `kind` as configured by `config`, not yet begun.
pub fn build_scene(kind: SceneKind, config: &AppConfig, aspect: f32) -> Box<dyn Scene> {
    match kind {
        SceneKind::Lit => Box::new(LitScene::new(
            std::f32::consts::FRAC_PI_3,
            aspect,
            0.1,
            1000.0,
            config.oit.clone(),
        )),
        SceneKind::NormalMapping => Box::new(NormalMappingScene::new(aspect)),
        SceneKind::BlinnPhong => Box::new(BlinnPhongScene::new(aspect)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::BlendMode;

    #[test]
    fn every_kind_builds_an_unbegun_scene() {
        let config = AppConfig::default();
        for kind in [SceneKind::Lit, SceneKind::NormalMapping, SceneKind::BlinnPhong] {
            let scene = build_scene(kind, &config, 1.0);
            assert!(!scene.is_ready());
            assert_eq!(scene.frame_plan().final_blend(), BlendMode::Disabled);
            scene.frame_plan().validate().unwrap();
        }
    }

    #[test]
    fn only_the_lit_scene_uses_fragment_lists() {
        let config = AppConfig::default();
        let lit = build_scene(SceneKind::Lit, &config, 1.0);
        assert!(lit.frame_plan().uses_fragment_lists());
        assert!(!lit.uses_depth());
        for kind in [SceneKind::NormalMapping, SceneKind::BlinnPhong] {
            let scene = build_scene(kind, &config, 1.0);
            assert!(!scene.frame_plan().uses_fragment_lists());
            assert!(scene.uses_depth());
        }
    }
}
