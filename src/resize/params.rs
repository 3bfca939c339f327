//! Typed resize parameters.
//!
//! # Responsibilities
//! - Convert raw route captures into a typed `ResizeRequest`
//! - Apply defaults (pad color `ffffff`)
//! - Reject malformed values (zero dimensions, odd hex lengths)
//!
//! # Design Decisions
//! - Width and height are per-axis `Option<u32>`: routes always supply
//!   both, raw directives may constrain a single axis
//! - Hex colors accept 3, 4, 6, and 8 digits; 5 and 7 slip through the
//!   router's `{3,8}` capture and are rejected here

use crate::error::ProxyError;

/// RGBA pad color. Default is opaque white.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadColor(pub [u8; 4]);

impl Default for PadColor {
    fn default() -> Self {
        Self([0xff, 0xff, 0xff, 0xff])
    }
}

impl PadColor {
    /// Parse a 3/4/6/8-digit hex color. Short forms expand each nibble
    /// (`f80` → `ff8800`); missing alpha defaults to opaque.
    pub fn parse(hex: &str) -> Result<Self, ProxyError> {
        let nibbles: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| ProxyError::InvalidParameter(format!("bad hex color {:?}", hex)))?;

        let rgba = match nibbles.as_slice() {
            [r, g, b] => [r * 17, g * 17, b * 17, 0xff],
            [r, g, b, a] => [r * 17, g * 17, b * 17, a * 17],
            [r1, r0, g1, g0, b1, b0] => [r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 0xff],
            [r1, r0, g1, g0, b1, b0, a1, a0] => {
                [r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, a1 * 16 + a0]
            }
            _ => {
                return Err(ProxyError::InvalidParameter(format!(
                    "hex color must be 3, 4, 6 or 8 digits, got {}",
                    hex.len()
                )))
            }
        };
        Ok(Self(rgba))
    }

    /// Render as lowercase hex: 6 digits when opaque, 8 otherwise.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0;
        if a == 0xff {
            format!("{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

/// Whether the resize fills a canvas or only bounds the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
    /// Aspect-preserving fit within the target box; output dimensions may
    /// be smaller than the box on one axis.
    BoundingBox,
    /// Exact output dimensions; unused canvas area filled with `color`.
    Pad { color: PadColor },
}

/// A normalized resize request, decoupled from URL syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    /// Origin path of the source asset.
    pub source_path: String,
    /// Target width; `None` leaves the axis unconstrained.
    pub width: Option<u32>,
    /// Target height; `None` leaves the axis unconstrained.
    pub height: Option<u32>,
    pub mode: CanvasMode,
}

impl ResizeRequest {
    /// Build a bounding-box request from raw captures.
    pub fn bounding_box(width: &str, height: &str, path: String) -> Result<Self, ProxyError> {
        Ok(Self {
            source_path: path,
            width: Some(parse_dimension(width, "width")?),
            height: Some(parse_dimension(height, "height")?),
            mode: CanvasMode::BoundingBox,
        })
    }

    /// Build a pad request from raw captures; no color means white.
    pub fn pad(
        width: &str,
        height: &str,
        color: Option<&str>,
        path: String,
    ) -> Result<Self, ProxyError> {
        let color = match color {
            Some(hex) => PadColor::parse(hex)?,
            None => PadColor::default(),
        };
        Ok(Self {
            source_path: path,
            width: Some(parse_dimension(width, "width")?),
            height: Some(parse_dimension(height, "height")?),
            mode: CanvasMode::Pad { color },
        })
    }
}

/// Parse a dimension capture. The router caps these at four digits, so
/// the only runtime failure is zero.
pub fn parse_dimension(raw: &str, axis: &str) -> Result<u32, ProxyError> {
    let value: u32 = raw
        .parse()
        .map_err(|_| ProxyError::InvalidParameter(format!("{} {:?} is not a number", axis, raw)))?;
    if value == 0 {
        return Err(ProxyError::InvalidParameter(format!(
            "{} must be positive",
            axis
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_defaults_to_white() {
        let req = ResizeRequest::pad("100", "80", None, "a.jpg".into()).unwrap();
        assert_eq!(
            req.mode,
            CanvasMode::Pad {
                color: PadColor([0xff, 0xff, 0xff, 0xff])
            }
        );
        assert_eq!(req.width, Some(100));
        assert_eq!(req.height, Some(80));
    }

    #[test]
    fn test_hex_expansion() {
        assert_eq!(PadColor::parse("f80").unwrap().0, [0xff, 0x88, 0x00, 0xff]);
        assert_eq!(PadColor::parse("f80a").unwrap().0, [0xff, 0x88, 0x00, 0xaa]);
        assert_eq!(
            PadColor::parse("12ab34").unwrap().0,
            [0x12, 0xab, 0x34, 0xff]
        );
        assert_eq!(
            PadColor::parse("12ab3480").unwrap().0,
            [0x12, 0xab, 0x34, 0x80]
        );
    }

    #[test]
    fn test_odd_hex_lengths_rejected() {
        assert!(PadColor::parse("12345").is_err());
        assert!(PadColor::parse("1234567").is_err());
        assert!(PadColor::parse("xyz").is_err());
    }

    #[test]
    fn test_to_hex_round_trip() {
        assert_eq!(PadColor::parse("ff8800").unwrap().to_hex(), "ff8800");
        assert_eq!(PadColor::parse("ff880040").unwrap().to_hex(), "ff880040");
        assert_eq!(PadColor::default().to_hex(), "ffffff");
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(ResizeRequest::bounding_box("0", "100", "a.jpg".into()).is_err());
        assert!(ResizeRequest::pad("100", "0", None, "a.jpg".into()).is_err());
    }

    #[test]
    fn test_full_range_accepted() {
        for raw in ["1", "9999"] {
            assert!(ResizeRequest::bounding_box(raw, raw, "a.jpg".into()).is_ok());
        }
    }
}
