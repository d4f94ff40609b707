use crate::error::{BoothError, BoothResult};

/// One color operation of a filter's transform spec. Ops are applied in
/// declared order; they do not commute.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum FilterOp {
    HueRotate { degrees: f32 },
    Saturate { factor: f32 },
    Contrast { factor: f32 },
    Brightness { factor: f32 },
    Sepia { amount: f32 },
    Grayscale { amount: f32 },
}

impl FilterOp {
    pub fn validate(&self) -> BoothResult<()> {
        let (name, v) = match *self {
            Self::HueRotate { degrees } => {
                if !degrees.is_finite() {
                    return Err(BoothError::validation("hue-rotate degrees must be finite"));
                }
                return Ok(());
            }
            Self::Saturate { factor } => ("saturate", factor),
            Self::Contrast { factor } => ("contrast", factor),
            Self::Brightness { factor } => ("brightness", factor),
            Self::Sepia { amount } => ("sepia", amount),
            Self::Grayscale { amount } => ("grayscale", amount),
        };
        if !v.is_finite() || v < 0.0 {
            return Err(BoothError::validation(format!(
                "{name} magnitude must be finite and >= 0"
            )));
        }
        Ok(())
    }
}

// Filter Effects Module Level 1 luminance coefficients.
const LUM_R: f32 = 0.213;
const LUM_G: f32 = 0.715;
const LUM_B: f32 = 0.072;

/// Affine transform on normalized rgb: out = m * rgb + offset. Alpha is
/// untouched.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorMatrix {
    pub m: [[f32; 3]; 3],
    pub offset: [f32; 3],
}

impl ColorMatrix {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        offset: [0.0, 0.0, 0.0],
    };

    pub fn for_op(op: FilterOp) -> Self {
        match op {
            FilterOp::HueRotate { degrees } => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                Self {
                    m: [
                        [
                            LUM_R + cos * (1.0 - LUM_R) - sin * LUM_R,
                            LUM_G - cos * LUM_G - sin * LUM_G,
                            LUM_B - cos * LUM_B + sin * (1.0 - LUM_B),
                        ],
                        [
                            LUM_R - cos * LUM_R + sin * 0.143,
                            LUM_G + cos * (1.0 - LUM_G) + sin * 0.140,
                            LUM_B - cos * LUM_B - sin * 0.283,
                        ],
                        [
                            LUM_R - cos * LUM_R - sin * (1.0 - LUM_R),
                            LUM_G - cos * LUM_G + sin * LUM_G,
                            LUM_B + cos * (1.0 - LUM_B) + sin * LUM_B,
                        ],
                    ],
                    offset: [0.0, 0.0, 0.0],
                }
            }
            FilterOp::Saturate { factor } => {
                let s = factor;
                Self {
                    m: [
                        [LUM_R + (1.0 - LUM_R) * s, LUM_G - LUM_G * s, LUM_B - LUM_B * s],
                        [LUM_R - LUM_R * s, LUM_G + (1.0 - LUM_G) * s, LUM_B - LUM_B * s],
                        [LUM_R - LUM_R * s, LUM_G - LUM_G * s, LUM_B + (1.0 - LUM_B) * s],
                    ],
                    offset: [0.0, 0.0, 0.0],
                }
            }
            FilterOp::Contrast { factor } => {
                let off = 0.5 - 0.5 * factor;
                Self {
                    m: [[factor, 0.0, 0.0], [0.0, factor, 0.0], [0.0, 0.0, factor]],
                    offset: [off, off, off],
                }
            }
            FilterOp::Brightness { factor } => Self {
                m: [[factor, 0.0, 0.0], [0.0, factor, 0.0], [0.0, 0.0, factor]],
                offset: [0.0, 0.0, 0.0],
            },
            FilterOp::Sepia { amount } => {
                // g interpolates toward identity as the amount drops.
                let g = 1.0 - amount.clamp(0.0, 1.0);
                Self {
                    m: [
                        [0.393 + 0.607 * g, 0.769 - 0.769 * g, 0.189 - 0.189 * g],
                        [0.349 - 0.349 * g, 0.686 + 0.314 * g, 0.168 - 0.168 * g],
                        [0.272 - 0.272 * g, 0.534 - 0.534 * g, 0.131 + 0.869 * g],
                    ],
                    offset: [0.0, 0.0, 0.0],
                }
            }
            FilterOp::Grayscale { amount } => {
                let g = 1.0 - amount.clamp(0.0, 1.0);
                Self {
                    m: [
                        [0.2126 + 0.7874 * g, 0.7152 - 0.7152 * g, 0.0722 - 0.0722 * g],
                        [0.2126 - 0.2126 * g, 0.7152 + 0.2848 * g, 0.0722 - 0.0722 * g],
                        [0.2126 - 0.2126 * g, 0.7152 - 0.7152 * g, 0.0722 + 0.9278 * g],
                    ],
                    offset: [0.0, 0.0, 0.0],
                }
            }
        }
    }

    /// Composition: applying `self` first, `next` second.
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        let mut out = ColorMatrix {
            m: [[0.0; 3]; 3],
            offset: [0.0; 3],
        };
        for i in 0..3 {
            for j in 0..3 {
                let mut acc = 0.0;
                for k in 0..3 {
                    acc += next.m[i][k] * self.m[k][j];
                }
                out.m[i][j] = acc;
            }
            let mut off = next.offset[i];
            for k in 0..3 {
                off += next.m[i][k] * self.offset[k];
            }
            out.offset[i] = off;
        }
        out
    }

    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for i in 0..3 {
            out[i] = self.m[i][0] * rgb[0]
                + self.m[i][1] * rgb[1]
                + self.m[i][2] * rgb[2]
                + self.offset[i];
        }
        out
    }
}

/// Folds a transform spec into one matrix, left to right. Pure affine
/// composition, no gamut clamp between ops.
pub fn bake_ops(ops: &[FilterOp]) -> BoothResult<ColorMatrix> {
    let mut baked = ColorMatrix::IDENTITY;
    for op in ops {
        op.validate()?;
        baked = baked.then(&ColorMatrix::for_op(*op));
    }
    Ok(baked)
}

pub fn apply_matrix_in_place(px: &mut [u8], matrix: &ColorMatrix) -> BoothResult<()> {
    if !px.len().is_multiple_of(4) {
        return Err(BoothError::validation(
            "apply_matrix_in_place expects an rgba8 buffer",
        ));
    }
    if *matrix == ColorMatrix::IDENTITY {
        return Ok(());
    }
    for p in px.chunks_exact_mut(4) {
        let rgb = [
            f32::from(p[0]) / 255.0,
            f32::from(p[1]) / 255.0,
            f32::from(p[2]) / 255.0,
        ];
        let out = matrix.apply(rgb);
        for (dst, v) in p[..3].iter_mut().zip(out) {
            *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
    Ok(())
}

/// Applies a transform spec in declared order, one op at a time. Each
/// op's output is clamped back to gamut before the next op reads it.
pub fn apply_ops_in_place(px: &mut [u8], ops: &[FilterOp]) -> BoothResult<()> {
    if !px.len().is_multiple_of(4) {
        return Err(BoothError::validation(
            "apply_ops_in_place expects an rgba8 buffer",
        ));
    }
    for op in ops {
        op.validate()?;
    }
    for op in ops {
        apply_matrix_in_place(px, &ColorMatrix::for_op(*op))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn empty_spec_bakes_to_identity() {
        let m = bake_ops(&[]).unwrap();
        assert_eq!(m, ColorMatrix::IDENTITY);
    }

    #[test]
    fn grayscale_full_equalizes_channels() {
        let m = bake_ops(&[FilterOp::Grayscale { amount: 1.0 }]).unwrap();
        let [r, g, b] = m.apply([0.8, 0.2, 0.4]);
        assert!(close(r, g) && close(g, b));
    }

    #[test]
    fn sepia_full_orders_channels_warm() {
        let m = bake_ops(&[FilterOp::Sepia { amount: 1.0 }]).unwrap();
        let [r, g, b] = m.apply([0.5, 0.5, 0.5]);
        assert!(r > g && g > b);
    }

    #[test]
    fn contrast_fixes_the_midpoint() {
        let m = bake_ops(&[FilterOp::Contrast { factor: 1.6 }]).unwrap();
        let [r, g, b] = m.apply([0.5, 0.5, 0.5]);
        assert!(close(r, 0.5) && close(g, 0.5) && close(b, 0.5));
    }

    #[test]
    fn hue_rotate_full_turn_is_identity() {
        let m = bake_ops(&[FilterOp::HueRotate { degrees: 360.0 }]).unwrap();
        let [r, g, b] = m.apply([0.3, 0.6, 0.9]);
        assert!(close(r, 0.3) && close(g, 0.6) && close(b, 0.9));
    }

    #[test]
    fn op_order_changes_the_result() {
        let declared = bake_ops(&[
            FilterOp::Contrast { factor: 1.4 },
            FilterOp::Brightness { factor: 1.3 },
        ])
        .unwrap();
        let swapped = bake_ops(&[
            FilterOp::Brightness { factor: 1.3 },
            FilterOp::Contrast { factor: 1.4 },
        ])
        .unwrap();
        assert_ne!(declared.apply([0.25, 0.5, 0.75]), swapped.apply([0.25, 0.5, 0.75]));
    }

    #[test]
    fn negative_magnitude_is_rejected() {
        let err = bake_ops(&[FilterOp::Saturate { factor: -1.0 }]).unwrap_err();
        assert!(err.to_string().contains("validation error:"));
    }

    #[test]
    fn in_place_requires_rgba8_buffer() {
        let mut px = [0u8; 5];
        let m = ColorMatrix::for_op(FilterOp::Brightness { factor: 2.0 });
        assert!(apply_matrix_in_place(&mut px, &m).is_err());
    }

    #[test]
    fn in_place_leaves_alpha_untouched() {
        let mut px = [100u8, 100, 100, 77];
        apply_ops_in_place(&mut px, &[FilterOp::Brightness { factor: 2.0 }]).unwrap();
        assert_eq!(px[3], 77);
        assert_eq!(px[0], 200);
    }

    #[test]
    fn chains_clamp_between_ops() {
        // Saturate pushes this red out of gamut; grayscale must read the
        // clamped (255, 0, 0), not the raw matrix output.
        let ops = [
            FilterOp::Saturate { factor: 3.0 },
            FilterOp::Grayscale { amount: 1.0 },
        ];
        let mut stepped = [230u8, 20, 20, 255];
        apply_ops_in_place(&mut stepped, &ops).unwrap();
        assert_eq!(stepped, [54, 54, 54, 255]);

        let mut folded = [230u8, 20, 20, 255];
        apply_matrix_in_place(&mut folded, &bake_ops(&ops).unwrap()).unwrap();
        assert_ne!(stepped, folded);
    }

    #[test]
    fn ops_serialize_with_css_names() {
        let json = serde_json::to_string(&FilterOp::HueRotate { degrees: 90.0 }).unwrap();
        assert!(json.contains("hue-rotate"));
    }
}
