use scene_ngin::{
    app,
    config::{AppConfig, SceneKind},
};

fn main() -> anyhow::Result<()> {
    let scene = match std::env::args().nth(1) {
        Some(name) => name.parse::<SceneKind>()?,
        None => SceneKind::default(),
    };
    app::run(AppConfig::default().with_scene(scene))
}
