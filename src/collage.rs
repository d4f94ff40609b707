use kurbo::{Point, Rect};

use crate::decor::Styler;
use crate::error::{BoothError, BoothResult};
use crate::filter::{FilterOp, apply_ops_in_place};
use crate::gallery::Photo;
use crate::snapshot::EncodedBitmap;

// Film strip metrics at 1x, in px.
pub(crate) const STRIP_BORDER: f64 = 4.0;
pub(crate) const STRIP_RADIUS: f64 = 12.0;
pub(crate) const BADGE_DIAMETER: f64 = 24.0;
const STRIP_PAD: f64 = 16.0;
const SIDE_MARGIN: f64 = 24.0;
const CONTENT_PAD_Y: f64 = 16.0;
const FRAME_GAP: f64 = 12.0;
const FRAME_BORDER: f64 = 2.0;
const FRAME_PAD: f64 = 8.0;
const MAT_PAD: f64 = 12.0;
const HOLE_DIAMETER: f64 = 12.0;
const HOLE_INSET: f64 = 8.0;
const DIVIDER_WIDTH: f64 = 32.0;
const DIVIDER_HEIGHT: f64 = 4.0;

/// The photo inside each frame gets a subtle vintage cast.
const FRAME_TINT: &[FilterOp] = &[
    FilterOp::Sepia { amount: 0.2 },
    FilterOp::Contrast { factor: 1.1 },
    FilterOp::Brightness { factor: 0.95 },
];

const CORNER_GLYPHS: [&str; 4] = ["🎞️", "📷", "🎬", "🍿"];

/// Knobs of the film strip layout. Everything else about the motif is
/// fixed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollageTheme {
    pub width: f64,
    pub photo_height: f64,
    pub oversample: f64,
    pub title: String,
    pub perforations_per_side: u32,
}

impl Default for CollageTheme {
    fn default() -> Self {
        Self {
            width: 480.0,
            photo_height: 128.0,
            oversample: 2.0,
            title: "memories".to_string(),
            perforations_per_side: 8,
        }
    }
}

impl CollageTheme {
    pub fn validate(&self) -> BoothResult<()> {
        if !self.width.is_finite() || self.width < 160.0 {
            return Err(BoothError::validation("theme width must be >= 160"));
        }
        if !self.photo_height.is_finite() || self.photo_height <= 0.0 {
            return Err(BoothError::validation("theme photo_height must be > 0"));
        }
        if !self.oversample.is_finite() || self.oversample < 1.0 {
            return Err(BoothError::validation("theme oversample must be >= 1"));
        }
        if self.perforations_per_side == 0 {
            return Err(BoothError::validation(
                "theme needs at least one perforation per side",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct TitleBand {
    pub text: String,
    pub center: Point,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct Perforation {
    pub center: Point,
    pub diameter: f64,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct CornerGlyph {
    pub glyph: &'static str,
    pub pos: Point,
    pub size: f64,
}

/// One framed photo of the strip: white frame, warm mat, tinted photo,
/// badge, sticker and date stamp. Rotation applies around the frame
/// center.
#[derive(Clone, Debug, serde::Serialize)]
pub struct FilmFrame {
    pub index: u32,
    pub badge_text: String,
    pub sticker: &'static str,
    pub date_stamp: String,
    pub rotation_deg: f64,
    pub rect: Rect,
    pub mat_rect: Rect,
    pub photo_rect: Rect,
    pub badge_center: Point,
    pub sticker_pos: Point,
    pub stamp_pos: Point,
    #[serde(skip)]
    pub photo: EncodedBitmap,
}

/// Declarative description of a composed film strip. A faithful snapshot
/// of the visual state at compose time; rasterizers consume it as-is.
#[derive(Clone, Debug, serde::Serialize)]
pub struct CollageScene {
    pub width: f64,
    pub height: f64,
    pub title: TitleBand,
    pub perforations: Vec<Perforation>,
    pub frames: Vec<FilmFrame>,
    pub dividers: Vec<Rect>,
    pub corner_glyphs: Vec<CornerGlyph>,
}

impl CollageScene {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Geometry and text dump for debugging; photo bytes are skipped.
    pub fn to_json(&self) -> BoothResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoothError::serde(e.to_string()))
    }
}

/// Builds film strip scenes from the gallery's ordered view. Styling rolls
/// advance once per compose, so recomposing the same photos restyles them.
pub struct CollageComposer {
    theme: CollageTheme,
    styler: Styler,
}

impl CollageComposer {
    pub fn new(theme: CollageTheme) -> BoothResult<Self> {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(theme, seed)
    }

    pub fn with_seed(theme: CollageTheme, seed: u64) -> BoothResult<Self> {
        theme.validate()?;
        Ok(Self {
            theme,
            styler: Styler::new(seed),
        })
    }

    pub fn theme(&self) -> &CollageTheme {
        &self.theme
    }

    pub fn styler(&mut self) -> &mut Styler {
        &mut self.styler
    }

    /// Composes the strip for the given photos, in order. Accepts any
    /// count; 0 or 1 photos produce a degenerate strip instead of failing.
    #[tracing::instrument(skip(self, photos), fields(count = photos.len()))]
    pub fn compose(&mut self, photos: &[Photo]) -> BoothResult<CollageScene> {
        let theme = &self.theme;
        let pass = self.styler.next_pass();

        let frame_w = theme.width - 2.0 * (STRIP_BORDER + STRIP_PAD + SIDE_MARGIN);
        let frame_h = theme.photo_height + 2.0 * (MAT_PAD + FRAME_PAD + FRAME_BORDER);
        let frame_x = STRIP_BORDER + STRIP_PAD + SIDE_MARGIN;
        let content_top = STRIP_BORDER + STRIP_PAD + CONTENT_PAD_Y;

        let count = photos.len();
        let stacked = count as f64 * frame_h + count.saturating_sub(1) as f64 * FRAME_GAP;
        let height = 2.0 * (STRIP_BORDER + STRIP_PAD + CONTENT_PAD_Y) + stacked;

        let mut frames = Vec::with_capacity(count);
        let mut dividers = Vec::new();
        for (slot, photo) in photos.iter().enumerate() {
            let index = photo.sequence_index();
            let y = content_top + slot as f64 * (frame_h + FRAME_GAP);
            let rect = Rect::new(frame_x, y, frame_x + frame_w, y + frame_h);
            let mat_rect = rect.inset(-(FRAME_BORDER + FRAME_PAD));
            let photo_rect = mat_rect.inset(-MAT_PAD);

            frames.push(FilmFrame {
                index,
                badge_text: (index + 1).to_string(),
                sticker: pass.sticker_for(index),
                date_stamp: photo.taken_at().format("%m/%d/%y").to_string(),
                rotation_deg: f64::from(pass.jitter_deg(index)),
                rect,
                mat_rect,
                photo_rect,
                badge_center: Point::new(
                    mat_rect.x1 + 4.0 - BADGE_DIAMETER / 2.0,
                    mat_rect.y1 + 4.0 - BADGE_DIAMETER / 2.0,
                ),
                sticker_pos: Point::new(mat_rect.x0 - 8.0, mat_rect.y0 - 8.0),
                stamp_pos: Point::new(mat_rect.x0 + 4.0, mat_rect.y1 - 4.0),
                photo: tint_photo(photo.bitmap())?,
            });

            if slot + 1 < count {
                let cx = rect.center().x;
                let top = rect.y1 + FRAME_GAP / 2.0 - DIVIDER_HEIGHT / 2.0;
                dividers.push(Rect::new(
                    cx - DIVIDER_WIDTH / 2.0,
                    top,
                    cx + DIVIDER_WIDTH / 2.0,
                    top + DIVIDER_HEIGHT,
                ));
            }
        }

        let mut perforations = Vec::with_capacity(2 * theme.perforations_per_side as usize);
        let per_side = theme.perforations_per_side;
        for side in [HOLE_INSET, theme.width - HOLE_INSET - HOLE_DIAMETER] {
            let cx = side + HOLE_DIAMETER / 2.0;
            for i in 0..per_side {
                let cy = height * f64::from(i + 1) / f64::from(per_side + 1);
                perforations.push(Perforation {
                    center: Point::new(cx, cy),
                    diameter: HOLE_DIAMETER,
                });
            }
        }

        let corner_glyphs = vec![
            CornerGlyph {
                glyph: CORNER_GLYPHS[0],
                pos: Point::new(HOLE_INSET, HOLE_INSET),
                size: 30.0,
            },
            CornerGlyph {
                glyph: CORNER_GLYPHS[1],
                pos: Point::new(theme.width - HOLE_INSET, HOLE_INSET),
                size: 24.0,
            },
            CornerGlyph {
                glyph: CORNER_GLYPHS[2],
                pos: Point::new(HOLE_INSET, height - HOLE_INSET),
                size: 24.0,
            },
            CornerGlyph {
                glyph: CORNER_GLYPHS[3],
                pos: Point::new(theme.width - HOLE_INSET, height - HOLE_INSET),
                size: 24.0,
            },
        ];

        Ok(CollageScene {
            width: theme.width,
            height,
            title: TitleBand {
                // centered on the top edge; the rasterizer clips the upper half
                text: theme.title.clone(),
                center: Point::new(theme.width / 2.0, 0.0),
            },
            perforations,
            frames,
            dividers,
            corner_glyphs,
        })
    }
}

fn tint_photo(bitmap: &EncodedBitmap) -> BoothResult<EncodedBitmap> {
    let mut decoded = bitmap.decode()?;
    apply_ops_in_place(&mut decoded.rgba8, FRAME_TINT)?;
    EncodedBitmap::png_from_rgba8(decoded.width, decoded.height, &decoded.rgba8)
}
