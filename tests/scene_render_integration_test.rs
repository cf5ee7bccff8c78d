#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod scene_render {
    use scene_ngin::{
        config::OitConfig,
        pipelines::{PROGRAMS, frame::{CAMERA_PROPERTIES_BINDING, FRAME_GROUP, LIGHT_PROPERTIES_BINDING}},
        render::BlendMode,
        resources::shader::Shader,
        scenes::{BlinnPhongScene, LitScene, NormalMappingScene, Scene},
    };

    use crate::common::test_utils::{
        SIZE, centre, colour_to_rgba, corner, headless_context, render_frame,
        render_frame_with_report,
    };

    fn close(a: image::Rgba<u8>, b: image::Rgba<u8>) -> bool {
        a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= 1)
    }

    fn small_lists(resolve: bool) -> OitConfig {
        OitConfig {
            max_width: SIZE,
            max_height: SIZE,
            nodes_per_pixel: 4,
            resolve,
        }
    }

    #[tokio::test]
    async fn lit_scene_renders_at_time_zero() {
        let ctx = headless_context().await.unwrap();
        let mut scene = LitScene::new(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 1000.0, small_lists(true));
        scene.begin_scene(&ctx).await.unwrap();
        assert!(scene.is_ready());

        let (img, report) = render_frame_with_report(&ctx, &mut scene, 0.0).await.unwrap();
        let report = report.expect("a begun scene records its plan");
        assert_eq!(report.state.blend, BlendMode::Disabled);
        assert!(report.state.fragment_lists_bound);
        assert_eq!(report.passes_opened, 2);
        assert_eq!(report.draws, 4);
        assert_eq!(corner(&img), image::Rgba([0, 0, 0, 0]));
        assert!(centre(&img)[3] > 0, "spheres cover the centre");
    }

    #[tokio::test]
    async fn lit_scene_without_resolve_blends_directly() {
        let ctx = headless_context().await.unwrap();
        let mut scene = LitScene::new(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 1000.0, small_lists(false));
        scene.begin_scene(&ctx).await.unwrap();

        let (img, report) = render_frame_with_report(&ctx, &mut scene, 0.0).await.unwrap();
        let report = report.unwrap();
        assert_eq!(report.state.blend, BlendMode::Disabled);
        assert_eq!(report.passes_opened, 1);
        assert_eq!(corner(&img), image::Rgba([0, 0, 0, 0]));
        assert!(centre(&img)[3] > 0);
    }

    #[tokio::test]
    async fn lit_scene_survives_consecutive_frames() {
        let ctx = headless_context().await.unwrap();
        let mut scene = LitScene::new(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 1000.0, small_lists(true));
        scene.begin_scene(&ctx).await.unwrap();

        let first = render_frame(&ctx, &mut scene, 0.0).await.unwrap();
        let again = render_frame(&ctx, &mut scene, 0.0).await.unwrap();
        // lists are emptied every frame, so nothing accumulates
        assert_eq!(centre(&first), centre(&again));
    }

    #[tokio::test]
    async fn rendering_before_begin_draws_nothing() {
        let ctx = headless_context().await.unwrap();
        let mut scene = BlinnPhongScene::new(1.0);
        assert!(!scene.is_ready());
        let (_, report) = render_frame_with_report(&ctx, &mut scene, 0.0).await.unwrap();
        assert!(report.is_none());
    }

    #[tokio::test]
    async fn every_program_declares_the_frame_blocks() {
        let ctx = headless_context().await.unwrap();
        for (label, vertex, fragment) in PROGRAMS {
            let shader = Shader::load(&ctx.device, label, vertex, fragment).await.unwrap();
            assert!(
                shader.declares_block("CameraProperties", FRAME_GROUP, CAMERA_PROPERTIES_BINDING),
                "{label}"
            );
            assert!(
                shader.declares_block("LightProperties", FRAME_GROUP, LIGHT_PROPERTIES_BINDING),
                "{label}"
            );
        }
    }

    #[tokio::test]
    async fn blinn_phong_scene_draws_over_the_clear_colour() {
        let ctx = headless_context().await.unwrap();
        let mut scene = BlinnPhongScene::new(1.0);
        scene.begin_scene(&ctx).await.unwrap();

        let img = render_frame(&ctx, &mut scene, 0.0).await.unwrap();
        let clear = colour_to_rgba(scene.clear_colour());
        assert!(close(corner(&img), clear));
        assert!(!close(centre(&img), clear));
    }

    #[tokio::test]
    async fn normal_mapping_scene_draws_the_sphere() {
        let ctx = headless_context().await.unwrap();
        let mut scene = NormalMappingScene::new(1.0);
        scene.begin_scene(&ctx).await.unwrap();

        let img = render_frame(&ctx, &mut scene, 0.0).await.unwrap();
        let clear = colour_to_rgba(scene.clear_colour());
        assert!(close(corner(&img), clear));
        assert!(!close(centre(&img), clear));
    }
}
