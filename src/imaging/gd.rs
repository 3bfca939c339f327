//! In-process GD-compatible engine.
//!
//! # Responsibilities
//! - Decode source bytes with a pixel-count guard
//! - Bounding-box resize (aspect-preserving fit)
//! - Pad resize (fit, then center on a colored canvas)
//! - Encode to the source format, or the directive's `of=` override
//!
//! # Design Decisions
//! - Lanczos3 for downscaling quality; deterministic, so repeated
//!   transforms are byte-identical
//! - JPEG output flattens alpha (the format has none); other formats
//!   keep the canvas alpha as-is

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};

use crate::config::schema::ImagingConfig;
use crate::imaging::{ImageInfo, ImagingBackend, ImagingError, TransformedImage};
use crate::resize::ResizeDirective;

/// GD-compatible engine built on the `image` crate.
pub struct GdEngine {
    max_pixels: u64,
}

impl GdEngine {
    pub fn new(config: &ImagingConfig) -> Self {
        Self {
            max_pixels: config.max_pixels,
        }
    }

    /// Sniff the container format and check the pixel budget before the
    /// full decode.
    fn probe(&self, source: &[u8]) -> Result<(ImageFormat, u32, u32), ImagingError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| ImagingError::Decode(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| ImagingError::UnsupportedFormat("unrecognized magic bytes".into()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImagingError::Decode(e.to_string()))?;

        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(ImagingError::TooLarge {
                pixels,
                limit: self.max_pixels,
            });
        }
        Ok((format, width, height))
    }

    fn decode(&self, source: &[u8]) -> Result<(DynamicImage, ImageFormat), ImagingError> {
        let (format, _, _) = self.probe(source)?;
        let image = image::load_from_memory_with_format(source, format)
            .map_err(|e| ImagingError::Decode(e.to_string()))?;
        Ok((image, format))
    }
}

impl ImagingBackend for GdEngine {
    fn transform(
        &self,
        source: &[u8],
        directive: &ResizeDirective,
    ) -> Result<TransformedImage, ImagingError> {
        // The canvas is allocated at full size, so it is subject to the
        // same pixel budget as decoded sources.
        if let Some(canvas) = &directive.canvas {
            let pixels = canvas.width as u64 * canvas.height as u64;
            if pixels > self.max_pixels {
                return Err(ImagingError::TooLarge {
                    pixels,
                    limit: self.max_pixels,
                });
            }
        }

        let (image, source_format) = self.decode(source)?;

        let bound_w = directive.dest_width.unwrap_or(u32::MAX);
        let bound_h = directive.dest_height.unwrap_or(u32::MAX);
        let fitted = if directive.dest_width.is_some() || directive.dest_height.is_some() {
            image.resize(bound_w, bound_h, FilterType::Lanczos3)
        } else {
            image
        };

        let result = match &directive.canvas {
            None => fitted,
            Some(canvas) => {
                let [r, g, b, a] = canvas.color.0;
                let mut composed =
                    RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([r, g, b, a]));
                let x = (canvas.width.saturating_sub(fitted.width())) / 2;
                let y = (canvas.height.saturating_sub(fitted.height())) / 2;
                image::imageops::overlay(&mut composed, &fitted.to_rgba8(), x as i64, y as i64);
                DynamicImage::ImageRgba8(composed)
            }
        };

        let output_format = match &directive.output_format {
            Some(name) => ImageFormat::from_extension(name)
                .ok_or_else(|| ImagingError::UnsupportedFormat(name.clone()))?,
            None => source_format,
        };

        let mut bytes = Vec::new();
        if output_format == ImageFormat::Jpeg {
            let quality = directive.quality.unwrap_or(90);
            let flattened = result.to_rgb8();
            JpegEncoder::new_with_quality(&mut Cursor::new(&mut bytes), quality)
                .encode_image(&flattened)
                .map_err(|e| ImagingError::Encode(e.to_string()))?;
        } else {
            result
                .write_to(&mut Cursor::new(&mut bytes), output_format)
                .map_err(|e| ImagingError::Encode(e.to_string()))?;
        }

        Ok(TransformedImage {
            bytes,
            content_type: format_mime(output_format),
        })
    }

    fn inspect(&self, source: &[u8]) -> Result<ImageInfo, ImagingError> {
        let (format, width, height) = self.probe(source)?;
        Ok(ImageInfo {
            width,
            height,
            format: format_name(format),
        })
    }
}

/// Lowercase short name for the `/info/` document.
fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Ico => "ico",
        ImageFormat::Avif => "avif",
        _ => "unknown",
    }
}

/// MIME type for composed responses.
fn format_mime(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resize::params::PadColor;
    use crate::resize::{CanvasBox, ResizeRequest};

    fn engine() -> GdEngine {
        GdEngine::new(&ImagingConfig::default())
    }

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn directive_for(request: &ResizeRequest) -> ResizeDirective {
        ResizeDirective::from_request(request, &ImagingConfig::default())
    }

    #[test]
    fn test_bounding_box_preserves_aspect() {
        let source = png(200, 100, [10, 20, 30, 255]);
        let request = ResizeRequest::bounding_box("50", "50", "a.png".into()).unwrap();
        let out = engine().transform(&source, &directive_for(&request)).unwrap();

        assert_eq!(out.content_type, "image/png");
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 25));
    }

    #[test]
    fn test_pad_produces_exact_canvas() {
        let source = png(200, 100, [10, 20, 30, 255]);
        let request = ResizeRequest::pad("60", "60", Some("ff0000"), "a.png".into()).unwrap();
        let out = engine().transform(&source, &directive_for(&request)).unwrap();

        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (60, 60));
        // Corners are canvas; the fitted 60x30 image is centered.
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(decoded.get_pixel(30, 30), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_output_format_override() {
        let source = png(10, 10, [0, 0, 0, 255]);
        let mut directive = directive_for(
            &ResizeRequest::bounding_box("5", "5", "a.png".into()).unwrap(),
        );
        directive.output_format = Some("jpg".into());
        let out = engine().transform(&source, &directive).unwrap();

        assert_eq!(out.content_type, "image/jpeg");
        assert!(out.bytes.starts_with(&[0xff, 0xd8]));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let source = png(100, 80, [200, 100, 50, 255]);
        let directive = directive_for(
            &ResizeRequest::bounding_box("33", "33", "a.png".into()).unwrap(),
        );
        let first = engine().transform(&source, &directive).unwrap();
        let second = engine().transform(&source, &directive).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_inspect_reports_metadata() {
        let source = png(123, 45, [0, 0, 0, 255]);
        let info = engine().inspect(&source).unwrap();
        assert_eq!(
            info,
            ImageInfo {
                width: 123,
                height: 45,
                format: "png"
            }
        );
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(matches!(
            engine().inspect(b"not an image"),
            Err(ImagingError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_pixel_budget_enforced() {
        let mut config = ImagingConfig::default();
        config.max_pixels = 100;
        let engine = GdEngine::new(&config);
        let source = png(20, 20, [0, 0, 0, 255]);
        assert!(matches!(
            engine.inspect(&source),
            Err(ImagingError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_canvas_pixel_budget_enforced() {
        let source = png(2, 2, [0, 0, 0, 255]);
        let directive = ResizeDirective {
            engine: "gd".into(),
            dest_width: None,
            dest_height: None,
            canvas: Some(CanvasBox {
                width: 4_000_000_000,
                height: 4_000_000_000,
                color: PadColor::parse("ffffff").unwrap(),
            }),
            quality: None,
            output_format: None,
        };
        // Rejected before the canvas is allocated.
        assert!(matches!(
            engine().transform(&source, &directive),
            Err(ImagingError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_canvas_only_directive_pads_without_resize() {
        let source = png(10, 10, [1, 2, 3, 255]);
        let directive = ResizeDirective {
            engine: "gd".into(),
            dest_width: None,
            dest_height: None,
            canvas: Some(CanvasBox {
                width: 20,
                height: 20,
                color: PadColor::parse("000000").unwrap(),
            }),
            quality: None,
            output_format: None,
        };
        let out = engine().transform(&source, &directive).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 20));
    }
}
