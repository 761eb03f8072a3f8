use std::borrow::Cow;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use crate::domain::error::DomainError;

pub(crate) const DEFAULT_MAX_BYTES: usize = 1024 * 1024;
pub(crate) const DEFAULT_MAX_DIMENSION: u32 = 1200;
pub(crate) const DEFAULT_JPEG_QUALITY: u8 = 80;
pub(crate) const DEFAULT_WEBP_QUALITY: u8 = 80;

/// (max dimension, JPEG quality) steps tried when the first pass is too large.
pub(crate) const FALLBACK_LADDER: [(u32, u8); 3] = [(1000, 60), (800, 50), (600, 40)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ImageLimits {
    pub(crate) max_bytes: usize,
    pub(crate) max_dimension: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl OutputFormat {
    pub(crate) fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Gif => "image/gif",
        }
    }

    pub(crate) fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NormalizedImage {
    pub(crate) bytes: Vec<u8>,
    pub(crate) format: OutputFormat,
    /// `None` for pass-through GIFs, which are never decoded.
    pub(crate) dimensions: Option<(u32, u32)>,
}

impl NormalizedImage {
    pub(crate) fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Lowercased MIME essence: `"Image/PNG; q=1"` becomes `"image/png"`.
pub(crate) fn mime_essence(declared: &str) -> String {
    declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Compresses an uploaded image so that it fits `limits`.
///
/// GIFs are returned untouched so animation survives. Every other input is
/// resized to fit (never upscaled) and re-encoded in its own format; if the
/// result is still over `max_bytes` the original is re-encoded as JPEG along
/// [`FALLBACK_LADDER`], and the last step is accepted even when oversized.
pub(crate) fn normalize(
    bytes: &[u8],
    declared_mime: &str,
    limits: &ImageLimits,
) -> Result<NormalizedImage, DomainError> {
    let mime = mime_essence(declared_mime);

    if mime == "image/gif" {
        return pass_through_gif(bytes, limits);
    }

    let source = image::load_from_memory(bytes)
        .map_err(|err| DomainError::ImageProcessing(format!("decode {mime}: {err}")))?;

    let first = match mime.as_str() {
        "image/png" => encode_png(&fit_within(&source, limits.max_dimension))?,
        "image/webp" => encode_webp(&fit_within(&source, limits.max_dimension))?,
        _ => encode_jpeg(
            &fit_within(&source, limits.max_dimension),
            DEFAULT_JPEG_QUALITY,
        )?,
    };
    if first.bytes.len() <= limits.max_bytes {
        return Ok(first);
    }
    debug!(
        size = first.bytes.len(),
        max_bytes = limits.max_bytes,
        "first pass too large, escalating"
    );

    let mut last = first;
    for (dimension, quality) in FALLBACK_LADDER {
        let dimension = dimension.min(limits.max_dimension);
        let candidate = encode_jpeg(&fit_within(&source, dimension), quality)?;
        if candidate.bytes.len() <= limits.max_bytes {
            return Ok(candidate);
        }
        last = candidate;
    }

    warn!(
        size = last.bytes.len(),
        max_bytes = limits.max_bytes,
        "image still exceeds size limit after fallback ladder"
    );
    Ok(last)
}

fn pass_through_gif(bytes: &[u8], limits: &ImageLimits) -> Result<NormalizedImage, DomainError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Gif) => {}
        _ => {
            return Err(DomainError::ImageProcessing(
                "declared image/gif but data is not a GIF".to_string(),
            ));
        }
    }
    if bytes.len() > limits.max_bytes {
        warn!(
            size = bytes.len(),
            max_bytes = limits.max_bytes,
            "GIF exceeds size limit, stored as is"
        );
    }
    Ok(NormalizedImage {
        bytes: bytes.to_vec(),
        format: OutputFormat::Gif,
        dimensions: None,
    })
}

fn fit_within(source: &DynamicImage, max_dimension: u32) -> Cow<'_, DynamicImage> {
    if source.width() <= max_dimension && source.height() <= max_dimension {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(source.resize(max_dimension, max_dimension, FilterType::Lanczos3))
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<NormalizedImage, DomainError> {
    let rgb = image.to_rgb8();
    let mut bytes = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))
        .map_err(|err| DomainError::ImageProcessing(format!("encode jpeg: {err}")))?;
    Ok(NormalizedImage {
        bytes,
        format: OutputFormat::Jpeg,
        dimensions: Some(rgb.dimensions()),
    })
}

fn encode_png(image: &DynamicImage) -> Result<NormalizedImage, DomainError> {
    let mut bytes = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, PngFilter::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|err| DomainError::ImageProcessing(format!("encode png: {err}")))?;
    Ok(NormalizedImage {
        bytes,
        format: OutputFormat::Png,
        dimensions: Some((image.width(), image.height())),
    })
}

fn encode_webp(image: &DynamicImage) -> Result<NormalizedImage, DomainError> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let bytes = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
        .encode_simple(false, f32::from(DEFAULT_WEBP_QUALITY))
        .map_err(|err| DomainError::ImageProcessing(format!("encode webp: {err:?}")))?
        .to_vec();
    Ok(NormalizedImage {
        bytes,
        format: OutputFormat::Webp,
        dimensions: Some((width, height)),
    })
}
