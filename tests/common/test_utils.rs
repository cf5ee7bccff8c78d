use std::time::Duration;

use scene_ngin::{
    context::{Context, FrameTarget},
    render::FrameReport,
    scenes::Scene,
};

/// Readback rows must be 256-byte aligned, which any multiple of 64 RGBA pixels is.
pub(crate) const SIZE: u32 = 256;

pub(crate) async fn headless_context() -> anyhow::Result<Context> {
    Context::headless(SIZE, SIZE).await
}

fn offscreen_texture(ctx: &Context) -> wgpu::Texture {
    ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test target"),
        size: extent(ctx),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: Context::HEADLESS_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn extent(ctx: &Context) -> wgpu::Extent3d {
    let (width, height) = ctx.size();
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

pub(crate) async fn render_frame(
    ctx: &Context,
    scene: &mut dyn Scene,
    current_time: f64,
) -> anyhow::Result<image::RgbaImage> {
    let (img, _) = render_frame_with_report(ctx, scene, current_time).await?;
    Ok(img)
}

/// Record `scene`'s frame at `current_time` into an offscreen texture and read
/// the pixels back, along with what the executor recorded.
pub(crate) async fn render_frame_with_report(
    ctx: &Context,
    scene: &mut dyn Scene,
    current_time: f64,
) -> anyhow::Result<(image::RgbaImage, Option<FrameReport>)> {
    let texture = offscreen_texture(ctx);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let (width, height) = ctx.size();
    let u32_size = std::mem::size_of::<u32>() as u32;

    let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        size: (u32_size * width * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        label: Some("test readback"),
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });
    let report = {
        let mut target = FrameTarget::new(&mut encoder, &view, &ctx.depth_texture.view);
        scene.render_scene(ctx, &mut target, current_time)?
    };
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(u32_size * width),
                rows_per_image: Some(height),
            },
        },
        extent(ctx),
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .unwrap();
    rx.receive().await.unwrap()?;

    let data = buffer_slice.get_mapped_range().to_vec();
    output_buffer.unmap();
    let img = image::RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| anyhow::anyhow!("readback has the wrong size"))?;
    Ok((img, report))
}

pub(crate) fn centre(img: &image::RgbaImage) -> image::Rgba<u8> {
    *img.get_pixel(img.width() / 2, img.height() / 2)
}

pub(crate) fn corner(img: &image::RgbaImage) -> image::Rgba<u8> {
    *img.get_pixel(0, 0)
}

pub(crate) fn colour_to_rgba(colour: wgpu::Color) -> image::Rgba<u8> {
    // the target is sRGB, so the stored bytes are the encoded clear colour
    let encode = |v: f64| {
        let v = v.clamp(0.0, 1.0);
        let srgb = if v <= 0.0031308 {
            v * 12.92
        } else {
            1.055 * v.powf(1.0 / 2.4) - 0.055
        };
        (srgb * 255.0).round() as u8
    };
    image::Rgba([
        encode(colour.r),
        encode(colour.g),
        encode(colour.b),
        (colour.a.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}
