//! Imaging backend directive.
//!
//! # Responsibilities
//! - Translate a `ResizeRequest` into the structured directive the
//!   imaging backend consumes
//! - Render and parse the backend's `small_light(k=v,...)` wire syntax
//!
//! # Design Decisions
//! - This module is the only place the wire syntax appears; swapping the
//!   backend touches nothing else
//! - Unknown wire keys are ignored with a debug log, matching the legacy
//!   backend's tolerant parser
//! - The historical alpha-inversion quirk is applied only while rendering
//!   or parsing the wire color, controlled by `imaging.invert_pad_alpha`

use crate::config::schema::ImagingConfig;
use crate::error::ProxyError;
use crate::resize::params::{parse_dimension, CanvasMode, PadColor, ResizeRequest};

/// Exact canvas the output is composed onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasBox {
    pub width: u32,
    pub height: u32,
    pub color: PadColor,
}

/// Structured directive for one transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeDirective {
    /// Engine selector (`e=` on the wire), e.g. "gd".
    pub engine: String,
    /// Destination bounding box (`dw`/`dh`); `None` leaves the axis
    /// unconstrained.
    pub dest_width: Option<u32>,
    pub dest_height: Option<u32>,
    /// Canvas box (`cw`/`ch`/`cc`); absent for bounding-box resizes.
    pub canvas: Option<CanvasBox>,
    /// JPEG encode quality (`q=`), 1-100.
    pub quality: Option<u8>,
    /// Output format override (`of=`), a short format name like "png".
    /// Absent means: keep the source format.
    pub output_format: Option<String>,
}

impl ResizeDirective {
    /// Translate a normalized request. Pad mode sets the canvas equal to
    /// the destination box.
    pub fn from_request(request: &ResizeRequest, imaging: &ImagingConfig) -> Self {
        let canvas = match request.mode {
            CanvasMode::BoundingBox => None,
            CanvasMode::Pad { color } => Some(CanvasBox {
                // Pad routes always carry both dimensions.
                width: request.width.unwrap_or(1),
                height: request.height.unwrap_or(1),
                color,
            }),
        };
        Self {
            engine: imaging.engine.clone(),
            dest_width: request.width,
            dest_height: request.height,
            canvas,
            quality: Some(imaging.quality),
            output_format: None,
        }
    }

    /// Parse the comma-separated `k=v` payload of a raw
    /// `/small_light(...)/` route.
    pub fn parse(raw: &str, imaging: &ImagingConfig) -> Result<Self, ProxyError> {
        let mut directive = Self {
            engine: imaging.engine.clone(),
            dest_width: None,
            dest_height: None,
            canvas: None,
            quality: Some(imaging.quality),
            output_format: None,
        };
        let mut canvas_width = None;
        let mut canvas_height = None;
        let mut canvas_color = PadColor::default();

        for pair in raw.split(',').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ProxyError::InvalidParameter(format!("directive entry {:?} is not k=v", pair))
            })?;
            match key {
                "e" => directive.engine = value.to_string(),
                "dw" => directive.dest_width = Some(parse_dimension(value, "dw")?),
                "dh" => directive.dest_height = Some(parse_dimension(value, "dh")?),
                "cw" => canvas_width = Some(parse_dimension(value, "cw")?),
                "ch" => canvas_height = Some(parse_dimension(value, "ch")?),
                "cc" => {
                    let mut color = PadColor::parse(value)?;
                    if imaging.invert_pad_alpha {
                        color.0[3] = 0xff - color.0[3];
                    }
                    canvas_color = color;
                }
                "q" => {
                    let q: u8 = value.parse().map_err(|_| {
                        ProxyError::InvalidParameter(format!("q {:?} is not a number", value))
                    })?;
                    if !(1..=100).contains(&q) {
                        return Err(ProxyError::InvalidParameter("q must be 1-100".into()));
                    }
                    directive.quality = Some(q);
                }
                "of" => directive.output_format = Some(value.to_string()),
                other => {
                    tracing::debug!(key = other, "ignoring unknown directive key");
                }
            }
        }

        if let (Some(width), Some(height)) = (canvas_width, canvas_height) {
            let pixels = width as u64 * height as u64;
            if pixels > imaging.max_pixels {
                return Err(ProxyError::InvalidParameter(format!(
                    "canvas {}x{} exceeds the {} pixel limit",
                    width, height, imaging.max_pixels
                )));
            }
            directive.canvas = Some(CanvasBox {
                width,
                height,
                color: canvas_color,
            });
        } else if canvas_width.is_some() || canvas_height.is_some() {
            return Err(ProxyError::InvalidParameter(
                "canvas needs both cw and ch".into(),
            ));
        }

        Ok(directive)
    }

    /// Render the wire syntax. Only used when talking to an out-of-process
    /// backend; the in-process engine consumes the struct directly.
    pub fn render(&self, invert_pad_alpha: bool) -> String {
        let mut parts = vec![format!("e={}", self.engine)];
        if let Some(dw) = self.dest_width {
            parts.push(format!("dw={}", dw));
        }
        if let Some(dh) = self.dest_height {
            parts.push(format!("dh={}", dh));
        }
        if let Some(canvas) = &self.canvas {
            parts.push(format!("cw={}", canvas.width));
            parts.push(format!("ch={}", canvas.height));
            let mut color = canvas.color;
            if invert_pad_alpha {
                color.0[3] = 0xff - color.0[3];
            }
            parts.push(format!("cc={}", color.to_hex()));
        }
        if let Some(q) = self.quality {
            parts.push(format!("q={}", q));
        }
        if let Some(of) = &self.output_format {
            parts.push(format!("of={}", of));
        }
        format!("small_light({})", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imaging() -> ImagingConfig {
        ImagingConfig::default()
    }

    #[test]
    fn test_bounding_box_has_no_canvas() {
        // Holds for the whole 1..9999 range the router admits.
        for (w, h) in [(1, 1), (120, 90), (9999, 9999)] {
            let request = ResizeRequest::bounding_box(
                &w.to_string(),
                &h.to_string(),
                "a.jpg".into(),
            )
            .unwrap();
            let directive = ResizeDirective::from_request(&request, &imaging());
            assert_eq!(directive.dest_width, Some(w));
            assert_eq!(directive.dest_height, Some(h));
            assert!(directive.canvas.is_none());
        }
    }

    #[test]
    fn test_pad_canvas_mirrors_destination() {
        let request = ResizeRequest::pad("300", "200", None, "a.jpg".into()).unwrap();
        let directive = ResizeDirective::from_request(&request, &imaging());
        let canvas = directive.canvas.unwrap();
        assert_eq!((canvas.width, canvas.height), (300, 200));
        assert_eq!(canvas.color, PadColor::default());
    }

    #[test]
    fn test_render_wire_syntax() {
        let request = ResizeRequest::pad("64", "48", Some("00ff00"), "a.jpg".into()).unwrap();
        let directive = ResizeDirective::from_request(&request, &imaging());
        assert_eq!(
            directive.render(false),
            "small_light(e=gd,dw=64,dh=48,cw=64,ch=48,cc=00ff00,q=90)"
        );
    }

    #[test]
    fn test_render_inverted_alpha_variant() {
        // The legacy backend expected ffffff00 for opaque white.
        let request = ResizeRequest::pad("64", "48", None, "a.jpg".into()).unwrap();
        let directive = ResizeDirective::from_request(&request, &imaging());
        assert_eq!(
            directive.render(true),
            "small_light(e=gd,dw=64,dh=48,cw=64,ch=48,cc=ffffff00,q=90)"
        );
    }

    #[test]
    fn test_parse_raw_payload() {
        let directive =
            ResizeDirective::parse("dw=120,dh=90,cw=128,ch=96,cc=abcdef,q=75,of=png", &imaging())
                .unwrap();
        assert_eq!(directive.dest_width, Some(120));
        assert_eq!(directive.dest_height, Some(90));
        let canvas = directive.canvas.unwrap();
        assert_eq!((canvas.width, canvas.height), (128, 96));
        assert_eq!(canvas.color, PadColor::parse("abcdef").unwrap());
        assert_eq!(directive.quality, Some(75));
        assert_eq!(directive.output_format.as_deref(), Some("png"));
    }

    #[test]
    fn test_parse_single_axis() {
        let directive = ResizeDirective::parse("dw=500", &imaging()).unwrap();
        assert_eq!(directive.dest_width, Some(500));
        assert_eq!(directive.dest_height, None);
        assert!(directive.canvas.is_none());
    }

    #[test]
    fn test_parse_unknown_keys_ignored() {
        let directive = ResizeDirective::parse("dw=10,sharpen=3", &imaging()).unwrap();
        assert_eq!(directive.dest_width, Some(10));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ResizeDirective::parse("dw", &imaging()).is_err());
        assert!(ResizeDirective::parse("dw=0", &imaging()).is_err());
        assert!(ResizeDirective::parse("cw=10", &imaging()).is_err());
        assert!(ResizeDirective::parse("q=200", &imaging()).is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_canvas() {
        // Default pixel limit is 100M; both of these parse as u32 but
        // would ask for canvases far beyond it.
        assert!(ResizeDirective::parse("cw=20000,ch=20000", &imaging()).is_err());
        assert!(ResizeDirective::parse("cw=4000000000,ch=4000000000", &imaging()).is_err());
    }

    #[test]
    fn test_parse_inverted_alpha_round_trip() {
        let mut config = imaging();
        config.invert_pad_alpha = true;
        let directive = ResizeDirective::parse("cw=10,ch=10,cc=ffffff00", &config).unwrap();
        // With the quirk enabled, the legacy zero alpha means opaque.
        assert_eq!(directive.canvas.unwrap().color, PadColor::default());
    }
}
