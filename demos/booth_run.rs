use filmbooth::export::COLLAGE_FILE_NAME;
use filmbooth::{Exporter, PhotoBooth, SvgRasterizer, SyntheticCamera};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let camera = SyntheticCamera::new(640, 480)?;
    let mut booth = PhotoBooth::new(camera)?;
    pollster::block_on(booth.start())?;

    for name in ["vintage", "neon", "grayscale"] {
        booth.select_filter(name)?;
        let photo = booth.take_photo()?;
        println!("captured {name} as selfie-{}", photo.sequence_index() + 1);
    }

    let mut raster = SvgRasterizer::new();
    let artifact = pollster::block_on(booth.render_collage(&mut raster))?;

    let exporter = Exporter::new("shots");
    let path = exporter.to_file(&artifact.encode_png()?, COLLAGE_FILE_NAME)?;
    println!(
        "collage: {} ({}x{}, {} frames)",
        path.display(),
        artifact.width,
        artifact.height,
        artifact.frame_count
    );

    booth.stop();
    Ok(())
}
