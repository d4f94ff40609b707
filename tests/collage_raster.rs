use std::path::PathBuf;

use filmbooth::export::COLLAGE_FILE_NAME;
use filmbooth::{
    CollageArtifact, CollageComposer, CollageTheme, EncodedBitmap, Exporter, PhotoCollection,
    SceneRasterizer, Snapshot, SvgRasterizer,
};

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "filmbooth_{}_{}_{}",
        tag,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn red_gallery(n: usize) -> PhotoCollection {
    let mut gallery = PhotoCollection::new();
    for _ in 0..n {
        let px: Vec<u8> = (0..16).flat_map(|_| [255u8, 0, 0, 255]).collect();
        gallery.append(Snapshot {
            bitmap: EncodedBitmap::png_from_rgba8(4, 4, &px).unwrap(),
            taken_at: chrono::Local::now(),
            filter: "none".to_string(),
        });
    }
    gallery
}

fn px(artifact: &CollageArtifact, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * artifact.width + x) * 4) as usize;
    artifact.rgba8[i..i + 4].try_into().unwrap()
}

#[test]
fn strip_renders_with_film_chrome() {
    let gallery = red_gallery(2);
    let mut composer = CollageComposer::with_seed(CollageTheme::default(), 3).unwrap();
    let scene = composer.compose(gallery.all()).unwrap();
    assert_eq!(scene.width, 480.0);
    assert_eq!(scene.height, 428.0);

    let mut raster = SvgRasterizer::new();
    let artifact = pollster::block_on(raster.rasterize(&scene, 1.0)).unwrap();
    assert_eq!((artifact.width, artifact.height), (480, 428));
    assert_eq!(artifact.frame_count, 2);

    // outside the rounded strip corner
    assert_eq!(px(&artifact, 0, 0)[3], 0);

    // first left-edge perforation
    let hole = px(&artifact, 14, 48);
    assert!(hole[0] < 30 && hole[1] < 30 && hole[2] < 30, "{hole:?}");
    assert_eq!(hole[3], 255);

    // backdrop gradient near the strip bottom
    let backdrop = px(&artifact, 240, 418);
    assert!(
        backdrop[0] < 70 && backdrop[1] < 70 && backdrop[2] < 70,
        "{backdrop:?}"
    );

    // tinted red photo at the first frame center
    let photo = px(&artifact, 240, 122);
    assert!(photo[0] > 180 && photo[1] < 60 && photo[2] < 60, "{photo:?}");

    // lower half of the title pill, left of the label text; the upper
    // half hangs past the strip edge and is clipped
    let pill = px(&artifact, 195, 5);
    assert!(pill[0] > 200 && pill[1] > 150 && pill[2] < 80, "{pill:?}");
}

#[test]
fn oversampling_scales_the_raster_only() {
    let gallery = red_gallery(2);
    let mut composer = CollageComposer::with_seed(CollageTheme::default(), 3).unwrap();
    let scene = composer.compose(gallery.all()).unwrap();

    let mut raster = SvgRasterizer::new();
    let artifact = pollster::block_on(raster.rasterize(&scene, 2.0)).unwrap();
    assert_eq!((artifact.width, artifact.height), (960, 856));

    let photo = px(&artifact, 480, 244);
    assert!(photo[0] > 180 && photo[1] < 60 && photo[2] < 60, "{photo:?}");
}

#[test]
fn degenerate_strip_still_rasterizes() {
    let gallery = red_gallery(0);
    let mut composer = CollageComposer::with_seed(CollageTheme::default(), 3).unwrap();
    let scene = composer.compose(gallery.all()).unwrap();

    let mut raster = SvgRasterizer::new();
    let artifact = pollster::block_on(raster.rasterize(&scene, 1.0)).unwrap();
    assert_eq!(artifact.frame_count, 0);
    assert!(artifact.height > 0);
}

#[test]
fn exported_collage_decodes_at_raster_size() {
    let gallery = red_gallery(2);
    let mut composer = CollageComposer::with_seed(CollageTheme::default(), 9).unwrap();
    let scene = composer.compose(gallery.all()).unwrap();

    let mut raster = SvgRasterizer::new();
    let artifact = pollster::block_on(raster.rasterize(&scene, 2.0)).unwrap();

    let dir = temp_dir("raster_export");
    let exporter = Exporter::new(&dir);
    let path = exporter
        .to_file(&artifact.encode_png().unwrap(), COLLAGE_FILE_NAME)
        .unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (artifact.width, artifact.height));

    std::fs::remove_dir_all(&dir).unwrap();
}
