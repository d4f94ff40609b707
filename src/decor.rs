/// Decorative framing applied at render time. Styles are never stored on
/// photos: every render pass re-rolls them, so the same photo can wear a
/// different look from one render to the next.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PresentationStyle {
    pub name: &'static str,
    pub badge_glyph: &'static str,
    /// Backdrop gradient, top-left to bottom-right.
    pub backdrop: [&'static str; 2],
    pub border: Option<Border>,
    pub tilt_deg: f32,
    pub symbols: [&'static str; 3],
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Border {
    pub dashed: bool,
    pub color: &'static str,
    pub width: f32,
}

const STYLES: &[PresentationStyle] = &[
    PresentationStyle {
        name: "polaroid",
        badge_glyph: "📸",
        backdrop: ["#fefce8", "#ffedd5"],
        border: None,
        tilt_deg: 1.0,
        symbols: ["⭐", "💫", "✨"],
    },
    PresentationStyle {
        name: "scrapbook",
        badge_glyph: "💕",
        backdrop: ["#fce7f3", "#f3e8ff"],
        border: Some(Border {
            dashed: true,
            color: "#f9a8d4",
            width: 2.0,
        }),
        tilt_deg: -1.0,
        symbols: ["🌸", "💖", "🦄"],
    },
    PresentationStyle {
        name: "retro",
        badge_glyph: "🕺",
        backdrop: ["#ffedd5", "#fee2e2"],
        border: Some(Border {
            dashed: false,
            color: "#fdba74",
            width: 4.0,
        }),
        tilt_deg: 2.0,
        symbols: ["🌟", "⚡", "🎵"],
    },
    PresentationStyle {
        name: "neon",
        badge_glyph: "🌈",
        backdrop: ["#cffafe", "#f3e8ff"],
        border: Some(Border {
            dashed: false,
            color: "#22d3ee",
            width: 2.0,
        }),
        tilt_deg: 0.0,
        symbols: ["💎", "🔮", "⚡"],
    },
];

const STICKERS: &[&str] = &["🌟", "❤️", "✨", "🎭", "🎨", "💫"];

pub fn styles() -> &'static [PresentationStyle] {
    STYLES
}

/// Seeded source of styling rolls. A fixed seed replays exactly;
/// consecutive passes differ.
#[derive(Clone, Debug)]
pub struct Styler {
    seed: u64,
    pass: u64,
}

impl Styler {
    pub fn new(seed: u64) -> Self {
        Self { seed, pass: 0 }
    }

    /// Roll for the next render pass.
    pub fn next_pass(&mut self) -> StylePass {
        self.pass += 1;
        StylePass::derive(self.seed, self.pass)
    }

    /// Replay of an earlier pass.
    pub fn pass_at(&self, pass: u64) -> StylePass {
        StylePass::derive(self.seed, pass)
    }
}

/// One render pass worth of styling decisions.
#[derive(Clone, Copy, Debug)]
pub struct StylePass {
    style_seed: u64,
    jitter_seed: u64,
}

impl StylePass {
    fn derive(seed: u64, pass: u64) -> Self {
        Self {
            style_seed: stable_hash64(seed, &format!("style/{pass}")),
            jitter_seed: stable_hash64(seed, &format!("jitter/{pass}")),
        }
    }

    pub fn style_for(&self, index: u32) -> &'static PresentationStyle {
        let roll = roll_rng(self.style_seed, index).next_u64();
        &STYLES[(roll % STYLES.len() as u64) as usize]
    }

    /// Sticker glyphs cycle with the sequence index.
    pub fn sticker_for(&self, index: u32) -> &'static str {
        STICKERS[index as usize % STICKERS.len()]
    }

    /// Frame rotation jitter: alternating sign, magnitude under 3 degrees.
    pub fn jitter_deg(&self, index: u32) -> f32 {
        let unit = roll_rng(self.jitter_seed, index).next_f64_01() as f32;
        let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
        sign * unit * 3.0
    }
}

fn stable_hash64(seed: u64, s: &str) -> u64 {
    // FNV-1a 64, seeded.
    let mut h = 0xcbf2_9ce4_8422_2325u64 ^ seed;
    for &b in s.as_bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    h
}

fn roll_rng(seed: u64, index: u32) -> Rng64 {
    Rng64::new(seed ^ u64::from(index).wrapping_mul(0xD6E8_FEB8_6659_FD93))
}

/// SplitMix64. Stable across platforms, cheap to reseed per roll.
#[derive(Clone, Copy, Debug)]
struct Rng64 {
    state: u64,
}

impl Rng64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1), 53 bits of precision.
    fn next_f64_01(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}
