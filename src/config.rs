//! Application configuration.
//!
//! Everything is configured programmatically: [`AppConfig`] describes the
//! window and which scene to run, [`OitConfig`] sizes the per-pixel fragment
//! lists of the transparency scene. The binary only reads an optional scene
//! name from its arguments; logging is filtered through `RUST_LOG`.

use std::{fmt, str::FromStr};

/// Which demo scene the application drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneKind {
    /// Order-independent transparency with per-pixel linked lists.
    #[default]
    Lit,
    NormalMapping,
    BlinnPhong,
}

impl FromStr for SceneKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lit" | "oit" => Ok(SceneKind::Lit),
            "normal-mapping" | "normal_mapping" | "normal" => Ok(SceneKind::NormalMapping),
            "blinn-phong" | "blinn_phong" | "phong" => Ok(SceneKind::BlinnPhong),
            other => anyhow::bail!(
                "unknown scene '{other}', expected one of: lit, normal-mapping, blinn-phong"
            ),
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneKind::Lit => "lit",
            SceneKind::NormalMapping => "normal-mapping",
            SceneKind::BlinnPhong => "blinn-phong",
        };
        f.write_str(name)
    }
}

/// Sizing of the fragment-list storage used by the transparency scene.
///
/// The head-pointer image is allocated once at `max_width` x `max_height`
/// regardless of the window size. Fragments landing outside of it are dropped
/// by the list-building shader.
#[derive(Clone, Debug, PartialEq)]
pub struct OitConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Average number of list nodes reserved per pixel.
    pub nodes_per_pixel: u32,
    /// Composite the lists into the colour target after the geometry pass.
    /// When off, the geometry is drawn straight into the colour target with
    /// plain alpha blending.
    pub resolve: bool,
}

impl Default for OitConfig {
    fn default() -> Self {
        Self {
            max_width: 2048,
            max_height: 2048,
            nodes_per_pixel: 3,
            resolve: true,
        }
    }
}

impl OitConfig {
    /// Number of list nodes requested before any device limit is applied.
    pub fn requested_nodes(&self) -> u64 {
        u64::from(self.max_width) * u64::from(self.max_height) * u64::from(self.nodes_per_pixel)
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Present with vsync (FIFO) instead of the first mode the surface offers.
    pub vsync: bool,
    pub scene: SceneKind,
    pub oit: OitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "scene-ngin".to_string(),
            width: 1080,
            height: 1080,
            vsync: true,
            scene: SceneKind::default(),
            oit: OitConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn with_scene(mut self, scene: SceneKind) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scene_aliases() {
        assert_eq!("lit".parse::<SceneKind>().unwrap(), SceneKind::Lit);
        assert_eq!("OIT".parse::<SceneKind>().unwrap(), SceneKind::Lit);
        assert_eq!(" normal ".parse::<SceneKind>().unwrap(), SceneKind::NormalMapping);
        assert_eq!("blinn_phong".parse::<SceneKind>().unwrap(), SceneKind::BlinnPhong);
    }

    #[test]
    fn rejects_unknown_scene() {
        let err = "skybox".parse::<SceneKind>().unwrap_err();
        assert!(err.to_string().contains("unknown scene 'skybox'"));
    }

    #[test]
    fn scene_names_parse_back() {
        for kind in [SceneKind::Lit, SceneKind::NormalMapping, SceneKind::BlinnPhong] {
            assert_eq!(kind.to_string().parse::<SceneKind>().unwrap(), kind);
        }
    }

    #[test]
    fn default_oit_extent_matches_fixed_allocation() {
        let oit = OitConfig::default();
        assert_eq!((oit.max_width, oit.max_height), (2048, 2048));
        assert_eq!(oit.requested_nodes(), 2048 * 2048 * 3);
        assert!(oit.resolve);
    }

    #[test]
    fn aspect_ratio_never_divides_by_zero() {
        let config = AppConfig::default().with_size(1920, 0);
        assert_eq!(config.aspect_ratio(), 1920.0);
    }
}
