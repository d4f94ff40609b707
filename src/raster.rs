use std::sync::Arc;

use anyhow::Context;

use crate::collage::{BADGE_DIAMETER, CollageScene, STRIP_BORDER, STRIP_RADIUS};
use crate::error::{BoothError, BoothResult};
use crate::snapshot::EncodedBitmap;

// Film strip palette.
const STRIP_EDGE: &str = "#111827";
const STRIP_MID: &str = "#1f2937";
const STRIP_STROKE: &str = "#374151";
const HOLE_FILL: &str = "#000000";
const HOLE_STROKE: &str = "#4b5563";
const FRAME_FILL: &str = "#ffffff";
const FRAME_DASH: &str = "#9ca3af";
const MAT_FROM: &str = "#fffbeb";
const MAT_TO: &str = "#fef3c7";
const BADGE_FILL: &str = "#dc2626";
const BADGE_RING: &str = "#ffffff";
const TITLE_FILL: &str = "#facc15";
const TITLE_TEXT: &str = "#111827";
const DIVIDER_FILL: &str = "#4b5563";
const STAMP_TEXT: &str = "#ffffff";

const MAX_DIM: u32 = 16_384;

/// A rasterized film strip in straight-alpha rgba8.
#[derive(Clone, Debug)]
pub struct CollageArtifact {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
    pub frame_count: usize,
}

impl CollageArtifact {
    pub fn encode_png(&self) -> BoothResult<EncodedBitmap> {
        EncodedBitmap::png_from_rgba8(self.width, self.height, &self.rgba8)
    }
}

/// Renders a composed scene description to a bitmap at a given
/// oversampling factor. The one suspension point of the compose flow.
#[allow(async_fn_in_trait)]
pub trait SceneRasterizer {
    async fn rasterize(
        &mut self,
        scene: &CollageScene,
        oversample: f64,
    ) -> BoothResult<CollageArtifact>;
}

/// Shipped rasterizer: serializes the scene to SVG markup and renders it
/// with resvg, resolving photo hrefs from the scene's in-memory bitmaps
/// and text through the system font database.
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgRasterizer {
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self {
            fontdb: Arc::new(db),
        }
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRasterizer for SvgRasterizer {
    #[tracing::instrument(skip(self, scene), fields(frames = scene.frame_count()))]
    async fn rasterize(
        &mut self,
        scene: &CollageScene,
        oversample: f64,
    ) -> BoothResult<CollageArtifact> {
        if !oversample.is_finite() || oversample < 1.0 {
            return Err(BoothError::validation("oversample must be >= 1"));
        }
        if !(scene.width.is_finite() && scene.height.is_finite())
            || scene.width < 1.0
            || scene.height < 1.0
        {
            return Err(BoothError::composition("collage target has zero size"));
        }

        let width = (scene.width * oversample).ceil() as u32;
        let height = (scene.height * oversample).ceil() as u32;
        if width > MAX_DIM || height > MAX_DIM {
            return Err(BoothError::composition(format!(
                "collage raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }

        let markup = scene_svg(scene);
        let photos: Vec<Arc<Vec<u8>>> = scene
            .frames
            .iter()
            .map(|f| f.photo.shared_bytes())
            .collect();
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            image_href_resolver: usvg::ImageHrefResolver {
                resolve_string: Box::new(move |href: &str, _opts: &usvg::Options| {
                    let idx: usize = href.strip_prefix("photo:")?.parse().ok()?;
                    photos.get(idx).map(|png| usvg::ImageKind::PNG(Arc::clone(png)))
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(markup.as_bytes(), &opts)
            .context("parse collage svg")
            .map_err(|e| BoothError::composition(format!("{e:#}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| BoothError::composition("failed to allocate collage pixmap"))?;
        let sx = (width as f32) / tree.size().width();
        let sy = (height as f32) / tree.size().height();
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        let mut rgba8 = pixmap.data().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba8);

        Ok(CollageArtifact {
            width,
            height,
            rgba8,
            frame_count: scene.frame_count(),
        })
    }
}

/// The scene's declarative SVG form, one element per scene node.
pub fn scene_svg(scene: &CollageScene) -> String {
    let w = scene.width;
    let h = scene.height;
    let mut s = String::new();
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{w:.2}\" height=\"{h:.2}\" viewBox=\"0 0 {w:.2} {h:.2}\">\n"
    ));

    s.push_str("<defs>\n");
    s.push_str(&format!(
        "<linearGradient id=\"strip\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">\
         <stop offset=\"0\" stop-color=\"{STRIP_EDGE}\"/>\
         <stop offset=\"0.5\" stop-color=\"{STRIP_MID}\"/>\
         <stop offset=\"1\" stop-color=\"{STRIP_EDGE}\"/></linearGradient>\n"
    ));
    s.push_str(&format!(
        "<linearGradient id=\"mat\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\">\
         <stop offset=\"0\" stop-color=\"{MAT_FROM}\"/>\
         <stop offset=\"1\" stop-color=\"{MAT_TO}\"/></linearGradient>\n"
    ));
    for frame in &scene.frames {
        let p = frame.photo_rect;
        s.push_str(&format!(
            "<clipPath id=\"photo-clip-{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" \
             height=\"{:.2}\" rx=\"4\"/></clipPath>\n",
            frame.index,
            p.x0,
            p.y0,
            p.width(),
            p.height()
        ));
    }
    s.push_str("</defs>\n");

    // backdrop with border and rounded corners
    let inset = STRIP_BORDER / 2.0;
    s.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{STRIP_RADIUS:.2}\" \
         fill=\"url(#strip)\" stroke=\"{STRIP_STROKE}\" stroke-width=\"{STRIP_BORDER:.2}\"/>\n",
        inset,
        inset,
        w - STRIP_BORDER,
        h - STRIP_BORDER
    ));

    for hole in &scene.perforations {
        s.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{HOLE_FILL}\" \
             stroke=\"{HOLE_STROKE}\" stroke-width=\"1\"/>\n",
            hole.center.x,
            hole.center.y,
            hole.diameter / 2.0
        ));
    }

    for frame in &scene.frames {
        let c = frame.rect.center();
        s.push_str(&format!(
            "<g transform=\"rotate({:.3} {:.2} {:.2})\">\n",
            frame.rotation_deg, c.x, c.y
        ));
        s.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" \
             fill=\"{FRAME_FILL}\" stroke=\"{FRAME_DASH}\" stroke-width=\"2\" \
             stroke-dasharray=\"6 4\"/>\n",
            frame.rect.x0,
            frame.rect.y0,
            frame.rect.width(),
            frame.rect.height()
        ));
        s.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" \
             fill=\"url(#mat)\"/>\n",
            frame.mat_rect.x0,
            frame.mat_rect.y0,
            frame.mat_rect.width(),
            frame.mat_rect.height()
        ));
        s.push_str(&format!(
            "<image x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" \
             preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#photo-clip-{})\" \
             xlink:href=\"photo:{}\"/>\n",
            frame.photo_rect.x0,
            frame.photo_rect.y0,
            frame.photo_rect.width(),
            frame.photo_rect.height(),
            frame.index,
            frame.index
        ));

        let stamp_w = frame.date_stamp.len() as f64 * 7.2 + 16.0;
        s.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{stamp_w:.2}\" height=\"17\" rx=\"3\" \
             fill=\"#000000\" fill-opacity=\"0.7\"/>\n",
            frame.stamp_pos.x,
            frame.stamp_pos.y - 17.0
        ));
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"monospace\" font-size=\"12\" \
             fill=\"{STAMP_TEXT}\">{}</text>\n",
            frame.stamp_pos.x + 8.0,
            frame.stamp_pos.y - 5.0,
            xml_escape(&frame.date_stamp)
        ));

        s.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{BADGE_FILL}\" \
             stroke=\"{BADGE_RING}\" stroke-width=\"2\"/>\n",
            frame.badge_center.x,
            frame.badge_center.y,
            BADGE_DIAMETER / 2.0
        ));
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"12\" \
             font-weight=\"bold\" text-anchor=\"middle\" fill=\"{BADGE_RING}\">{}</text>\n",
            frame.badge_center.x,
            frame.badge_center.y + 4.0,
            xml_escape(&frame.badge_text)
        ));

        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"18\">{}</text>\n",
            frame.sticker_pos.x,
            frame.sticker_pos.y + 16.0,
            frame.sticker
        ));
        s.push_str("</g>\n");
    }

    for d in &scene.dividers {
        s.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" \
             fill=\"{DIVIDER_FILL}\"/>\n",
            d.x0,
            d.y0,
            d.width(),
            d.height()
        ));
    }

    let title_w = scene.title.text.chars().count() as f64 * 9.0 + 32.0;
    s.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{title_w:.2}\" height=\"22\" rx=\"11\" \
         fill=\"{TITLE_FILL}\"/>\n",
        scene.title.center.x - title_w / 2.0,
        scene.title.center.y - 11.0
    ));
    s.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"14\" \
         font-weight=\"bold\" text-anchor=\"middle\" fill=\"{TITLE_TEXT}\">{}</text>\n",
        scene.title.center.x,
        scene.title.center.y + 5.0,
        xml_escape(&scene.title.text)
    ));

    for glyph in &scene.corner_glyphs {
        let anchor = if glyph.pos.x < w / 2.0 { "start" } else { "end" };
        let baseline = if glyph.pos.y < h / 2.0 {
            glyph.pos.y + glyph.size * 0.8
        } else {
            glyph.pos.y
        };
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{baseline:.2}\" font-size=\"{:.2}\" \
             text-anchor=\"{anchor}\">{}</text>\n",
            glyph.pos.x, glyph.size, glyph.glyph
        ));
    }

    s.push_str("</svg>\n");
    s
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn unpremultiply_rgba8_in_place(px: &mut [u8]) {
    for p in px.chunks_exact_mut(4) {
        let a = u16::from(p[3]);
        if a == 0 {
            p[0] = 0;
            p[1] = 0;
            p[2] = 0;
        } else if a < 255 {
            for c in &mut p[..3] {
                *c = (((u16::from(*c) * 255) + a / 2) / a).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collage::{CollageComposer, CollageTheme, TitleBand};
    use crate::gallery::PhotoCollection;
    use crate::snapshot::Snapshot;
    use kurbo::Point;

    fn gallery_of(n: usize) -> PhotoCollection {
        let mut gallery = PhotoCollection::new();
        for _ in 0..n {
            let px: Vec<u8> = (0..16).flat_map(|_| [220u8, 30, 30, 255]).collect();
            gallery.append(Snapshot {
                bitmap: EncodedBitmap::png_from_rgba8(4, 4, &px).unwrap(),
                taken_at: chrono::Local::now(),
                filter: "none".to_string(),
            });
        }
        gallery
    }

    fn scene_of(n: usize) -> CollageScene {
        let mut composer = CollageComposer::with_seed(CollageTheme::default(), 5).unwrap();
        composer.compose(gallery_of(n).all()).unwrap()
    }

    #[test]
    fn markup_covers_every_scene_node() {
        let svg = scene_svg(&scene_of(2));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("photo:0"));
        assert!(svg.contains("photo:1"));
        assert!(svg.contains(">1</text>"));
        assert!(svg.contains(">2</text>"));
        assert!(svg.contains(">memories</text>"));
        assert_eq!(svg.matches("<circle").count(), 16 + 2);
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn markup_escapes_title_text() {
        let mut scene = scene_of(0);
        scene.title = TitleBand {
            text: "cats & <dogs>".to_string(),
            center: Point::new(100.0, 16.0),
        };
        let svg = scene_svg(&scene);
        assert!(svg.contains("cats &amp; &lt;dogs&gt;"));
        assert!(!svg.contains("cats & <dogs>"));
    }

    #[test]
    fn zero_size_target_is_composition_unavailable() {
        let mut scene = scene_of(1);
        scene.width = 0.0;
        let mut raster = SvgRasterizer::new();
        let err = pollster::block_on(raster.rasterize(&scene, 2.0)).unwrap_err();
        assert!(matches!(err, BoothError::CompositionUnavailable(_)));
    }

    #[test]
    fn oversample_below_one_is_rejected() {
        let scene = scene_of(1);
        let mut raster = SvgRasterizer::new();
        let err = pollster::block_on(raster.rasterize(&scene, 0.5)).unwrap_err();
        assert!(matches!(err, BoothError::Validation(_)));
    }

    #[test]
    fn oversized_target_is_rejected() {
        let mut scene = scene_of(1);
        scene.width = 20_000.0;
        let mut raster = SvgRasterizer::new();
        let err = pollster::block_on(raster.rasterize(&scene, 2.0)).unwrap_err();
        assert!(matches!(err, BoothError::CompositionUnavailable(_)));
    }

    #[test]
    fn unpremultiply_restores_straight_alpha() {
        let mut px = [128u8, 64, 0, 128, 0, 0, 0, 0];
        unpremultiply_rgba8_in_place(&mut px);
        assert_eq!(&px[..4], &[255, 128, 0, 128]);
        assert_eq!(&px[4..], &[0, 0, 0, 0]);
    }
}
