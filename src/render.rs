//! Ordered frame plans and their execution.
//!
//! A scene describes its frame as a [`FramePlan`]: a fixed list of
//! [`PassStep`]s run front to back. Buffer copies and draws cannot share a
//! render pass in wgpu, so a plan is lowered to [`Command`]s: passes open
//! lazily on the first draw step and close again before any copy step or
//! before the resolve step (which must observe everything the geometry pass
//! wrote).
//!
//! # Key types
//!
//! - [`PassStep`] is one entry of a plan
//! - [`BlendMode`] is the blending state draws pick their pipeline variant from
//! - [`RenderState`] is the state the executor hands to each draw step
//! - [`FrameReport`] is what [`execute_plan`] recorded
//!

use crate::{
    context::{Context, FrameTarget},
    scenes::Scene,
};

/// Blending applied to the colour target by the draws that follow.
///
/// wgpu bakes blending into pipelines, so "enabling" blending selects the
/// blended variant of each pipeline for later draw steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Disabled,
    /// Colour: `src * src.a + dst * (1 - src.a)`, alpha: `src.a + dst.a`.
    Enabled,
}

impl BlendMode {
    pub fn state(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Disabled => None,
            BlendMode::Enabled => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassStep {
    /// Zero the fragment-list node allocator.
    ResetAtomicCounter,
    /// Copy the zero-filled clear buffer over the head pointers.
    ClearHeadPointers,
    /// Make head pointers and node storage visible to the following draws.
    BindFragmentLists,
    Blend(BlendMode),
    SkyBox,
    Shadow,
    Geometry,
    /// Traverse the per-pixel lists and composite them into the colour target.
    Resolve,
}

impl PassStep {
    fn needs_fragment_lists(self) -> bool {
        matches!(
            self,
            PassStep::ResetAtomicCounter
                | PassStep::ClearHeadPointers
                | PassStep::BindFragmentLists
                | PassStep::Resolve
        )
    }
}

/// State visible to draw steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderState {
    pub blend: BlendMode,
    pub fragment_lists_bound: bool,
}

/// One recorded action of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Buffer work recorded outside any render pass.
    Copy(PassStep),
    /// The state later draws see.
    SetState(RenderState),
    /// Close the open pass and start another. Only the first pass clears.
    BeginPass { clear: bool },
    Draw(PassStep),
}

/// What [`execute_plan`] actually recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub passes_opened: usize,
    pub draws: usize,
    /// State after the last command.
    pub state: RenderState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePlan {
    steps: Vec<PassStep>,
}

impl FramePlan {
    pub fn new(steps: Vec<PassStep>) -> Self {
        Self { steps }
    }

    /// Sky box, shadow, geometry.
    pub fn forward() -> Self {
        Self::new(vec![PassStep::SkyBox, PassStep::Shadow, PassStep::Geometry])
    }

    /// The per-pixel linked-list transparency frame.
    pub fn order_independent(resolve: bool) -> Self {
        let mut steps = vec![
            PassStep::ResetAtomicCounter,
            PassStep::ClearHeadPointers,
            PassStep::BindFragmentLists,
            PassStep::Blend(BlendMode::Enabled),
            PassStep::SkyBox,
            PassStep::Shadow,
            PassStep::Geometry,
            PassStep::Blend(BlendMode::Disabled),
        ];
        if resolve {
            steps.push(PassStep::Resolve);
        }
        Self::new(steps)
    }

    pub fn steps(&self) -> &[PassStep] {
        &self.steps
    }

    /// The state the plan leaves behind, starting from the default state.
    pub fn final_state(&self) -> RenderState {
        self.steps
            .iter()
            .fold(RenderState::default(), |state, step| step.apply(state))
    }

    pub fn final_blend(&self) -> BlendMode {
        self.final_state().blend
    }

    pub fn uses_fragment_lists(&self) -> bool {
        self.steps.iter().any(|step| step.needs_fragment_lists())
    }

    /// The commands [`execute_plan`] records for this plan, in order.
    ///
    /// Copy steps close the open pass, the first draw step opens one and
    /// `Resolve` always starts a fresh pass. A plan without draws still gets
    /// one pass so the target is cleared.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.steps.len() + 2);
        let mut state = RenderState::default();
        let mut open = false;
        let mut opened = 0usize;
        for step in self.steps.iter().copied() {
            match step {
                PassStep::ResetAtomicCounter | PassStep::ClearHeadPointers => {
                    open = false;
                    commands.push(Command::Copy(step));
                }
                PassStep::BindFragmentLists | PassStep::Blend(_) => {
                    state = step.apply(state);
                    commands.push(Command::SetState(state));
                }
                PassStep::SkyBox | PassStep::Shadow | PassStep::Geometry | PassStep::Resolve => {
                    if step == PassStep::Resolve {
                        open = false;
                    }
                    if !open {
                        commands.push(Command::BeginPass {
                            clear: opened == 0,
                        });
                        opened += 1;
                        open = true;
                    }
                    commands.push(Command::Draw(step));
                }
            }
        }
        if opened == 0 {
            commands.push(Command::BeginPass { clear: true });
        }
        commands
    }

    /// Number of render passes the executor opens for this plan.
    pub fn pass_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|command| matches!(command, Command::BeginPass { .. }))
            .count()
    }

    /// Check the ordering rules the executor relies on.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut counter_reset = false;
        let mut heads_cleared = false;
        let mut state = RenderState::default();
        let mut geometry_seen = false;
        for step in &self.steps {
            match step {
                PassStep::ResetAtomicCounter => counter_reset = true,
                PassStep::ClearHeadPointers => heads_cleared = true,
                PassStep::Geometry => geometry_seen = true,
                PassStep::Resolve => {
                    anyhow::ensure!(
                        counter_reset && heads_cleared && state.fragment_lists_bound,
                        "resolve needs the lists reset, cleared and bound first"
                    );
                    anyhow::ensure!(geometry_seen, "resolve runs after the geometry step");
                }
                _ => (),
            }
            if *step == PassStep::BindFragmentLists {
                anyhow::ensure!(
                    counter_reset && heads_cleared,
                    "fragment lists are bound before they were reset"
                );
            }
            state = step.apply(state);
        }
        Ok(())
    }
}

impl PassStep {
    fn apply(self, state: RenderState) -> RenderState {
        match self {
            PassStep::Blend(blend) => RenderState { blend, ..state },
            PassStep::BindFragmentLists => RenderState {
                fragment_lists_bound: true,
                ..state
            },
            _ => state,
        }
    }
}

/// Run `scene`'s frame plan into `target`.
///
/// The plan is validated first; an invalid plan records nothing. The first
/// render pass clears colour (and depth, when the scene uses it); later passes
/// load what is already there.
pub fn execute_plan<S: Scene + ?Sized>(
    scene: &mut S,
    ctx: &Context,
    target: &mut FrameTarget<'_>,
    current_time: f64,
) -> anyhow::Result<FrameReport> {
    let plan = scene.frame_plan();
    plan.validate()?;
    let commands = plan.commands();

    let mut report = FrameReport::default();
    let mut pass: Option<wgpu::RenderPass<'static>> = None;
    for command in commands {
        match command {
            Command::Copy(step) => {
                // copies are illegal inside a render pass
                drop(pass.take());
                match scene.fragment_lists() {
                    Some(lists) if step == PassStep::ResetAtomicCounter => {
                        lists.reset_counter(&ctx.queue)
                    }
                    Some(lists) => lists.clear_head_pointers(target.encoder, ctx.config.height),
                    None => log::warn!("{step:?} skipped: the scene has no fragment lists"),
                }
            }
            Command::SetState(state) => report.state = state,
            Command::BeginPass { clear } => {
                drop(pass.take());
                pass = Some(begin_pass(&*scene, target, clear));
                report.passes_opened += 1;
            }
            Command::Draw(step) => {
                let Some(render_pass) = pass.as_mut() else {
                    anyhow::bail!("{step:?} recorded outside a render pass");
                };
                let state = report.state;
                match step {
                    PassStep::SkyBox => scene.render_sky_box(ctx, render_pass, &state, current_time),
                    PassStep::Shadow => scene.render_shadow(ctx, render_pass, &state, current_time),
                    PassStep::Geometry => {
                        scene.render_geometry(ctx, render_pass, &state, current_time)
                    }
                    _ => scene.render_resolve(ctx, render_pass, &state, current_time),
                }
                report.draws += 1;
            }
        }
    }
    Ok(report)
}

fn begin_pass<S: Scene + ?Sized>(
    scene: &S,
    target: &mut FrameTarget<'_>,
    first: bool,
) -> wgpu::RenderPass<'static> {
    let color_load = if first {
        wgpu::LoadOp::Clear(scene.clear_colour())
    } else {
        wgpu::LoadOp::Load
    };
    let depth_stencil_attachment = scene.uses_depth().then(|| wgpu::RenderPassDepthStencilAttachment {
        view: target.depth_view,
        depth_ops: Some(wgpu::Operations {
            load: if first {
                wgpu::LoadOp::Clear(1.0)
            } else {
                wgpu::LoadOp::Load
            },
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    });
    target
        .encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        })
        .forget_lifetime()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_plan_draws_in_fixed_order() {
        assert_eq!(
            FramePlan::forward().steps(),
            &[PassStep::SkyBox, PassStep::Shadow, PassStep::Geometry]
        );
        assert!(!FramePlan::forward().uses_fragment_lists());
    }

    #[test]
    fn oit_plan_prepares_lists_before_drawing() {
        let plan = FramePlan::order_independent(true);
        assert_eq!(
            &plan.steps()[..4],
            &[
                PassStep::ResetAtomicCounter,
                PassStep::ClearHeadPointers,
                PassStep::BindFragmentLists,
                PassStep::Blend(BlendMode::Enabled),
            ]
        );
        assert!(plan.uses_fragment_lists());
        plan.validate().unwrap();
    }

    #[test]
    fn oit_plan_leaves_blending_disabled() {
        for resolve in [true, false] {
            let plan = FramePlan::order_independent(resolve);
            assert_eq!(plan.final_blend(), BlendMode::Disabled);
            assert!(plan.final_state().fragment_lists_bound);
        }
    }

    #[test]
    fn geometry_runs_with_blending_enabled() {
        let plan = FramePlan::order_independent(false);
        let geometry = plan
            .steps()
            .iter()
            .position(|s| *s == PassStep::Geometry)
            .unwrap();
        let state_at_geometry = FramePlan::new(plan.steps()[..geometry].to_vec()).final_state();
        assert_eq!(state_at_geometry.blend, BlendMode::Enabled);
    }

    #[test]
    fn resolve_gets_its_own_pass() {
        assert_eq!(FramePlan::order_independent(true).pass_count(), 2);
        assert_eq!(FramePlan::order_independent(false).pass_count(), 1);
        assert_eq!(FramePlan::forward().pass_count(), 1);
    }

    #[test]
    fn oit_commands_copy_before_the_first_pass() {
        let commands = FramePlan::order_independent(true).commands();
        let bound = RenderState {
            blend: BlendMode::Disabled,
            fragment_lists_bound: true,
        };
        let blended = RenderState {
            blend: BlendMode::Enabled,
            ..bound
        };
        assert_eq!(
            commands,
            vec![
                Command::Copy(PassStep::ResetAtomicCounter),
                Command::Copy(PassStep::ClearHeadPointers),
                Command::SetState(bound),
                Command::SetState(blended),
                Command::BeginPass { clear: true },
                Command::Draw(PassStep::SkyBox),
                Command::Draw(PassStep::Shadow),
                Command::Draw(PassStep::Geometry),
                Command::SetState(bound),
                Command::BeginPass { clear: false },
                Command::Draw(PassStep::Resolve),
            ]
        );
    }

    #[test]
    fn draws_see_the_state_set_before_them() {
        let commands = FramePlan::order_independent(false).commands();
        let mut state = RenderState::default();
        for command in commands {
            match command {
                Command::SetState(next) => state = next,
                Command::Draw(PassStep::Geometry) => {
                    assert_eq!(state.blend, BlendMode::Enabled);
                    assert!(state.fragment_lists_bound);
                }
                _ => (),
            }
        }
        assert_eq!(state, FramePlan::order_independent(false).final_state());
    }

    #[test]
    fn plan_without_draws_still_clears() {
        let plan = FramePlan::new(vec![PassStep::Blend(BlendMode::Enabled)]);
        assert_eq!(
            plan.commands().last(),
            Some(&Command::BeginPass { clear: true })
        );
        assert_eq!(plan.pass_count(), 1);
    }

    #[test]
    fn copy_between_draws_splits_the_pass() {
        let plan = FramePlan::new(vec![
            PassStep::Geometry,
            PassStep::ResetAtomicCounter,
            PassStep::Geometry,
        ]);
        let begins: Vec<_> = plan
            .commands()
            .into_iter()
            .filter(|c| matches!(c, Command::BeginPass { .. }))
            .collect();
        assert_eq!(
            begins,
            vec![
                Command::BeginPass { clear: true },
                Command::BeginPass { clear: false }
            ]
        );
    }

    #[test]
    fn resolve_without_cleared_lists_is_rejected() {
        let plan = FramePlan::new(vec![
            PassStep::BindFragmentLists,
            PassStep::Geometry,
            PassStep::Resolve,
        ]);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn blend_state_matches_separate_blend_func() {
        assert!(BlendMode::Disabled.state().is_none());
        let blend = BlendMode::Enabled.state().unwrap();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(blend.alpha.src_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.alpha.dst_factor, wgpu::BlendFactor::One);
    }
}
