//! Image resources shared between the style system and the box builder.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! The builder never decodes pixels: a replaced box only needs to know that
//! an image resource exists, what kind it is and (when cheap to find) its
//! intrinsic size.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::net::FetchError;

/// Image formats recognised by sniffing the first bytes of a resource.
///
/// [MIME Sniffing § 6.1 Matching an image type pattern](https://mimesniff.spec.whatwg.org/#matching-an-image-type-pattern)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/png`
    Png,
    /// `image/gif`
    Gif,
    /// `image/jpeg`
    Jpeg,
    /// `image/svg+xml`
    Svg,
}

impl ImageFormat {
    /// Detect the format of `bytes`, falling back to the MIME type hint for
    /// formats without a binary signature.
    #[must_use]
    pub fn sniff(bytes: &[u8], mime_hint: Option<&str>) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(Self::Png);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        let text = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
        let text = text.trim_start();
        if text.starts_with("<svg") || text.starts_with("<?xml") {
            return Some(Self::Svg);
        }
        match mime_hint.map(str::trim) {
            Some("image/svg+xml") => Some(Self::Svg),
            _ => None,
        }
    }
}

/// [§ 5.1 'image-orientation'](https://www.w3.org/TR/css-images-3/#the-image-orientation)
///
/// "This property specifies a rotation, in degrees, and/or a flip to be
/// applied to the image."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageOrientation {
    /// "If the image has an orientation specified in its metadata, such as
    /// EXIF, this value computes to the angle that the metadata specifies is
    /// necessary to correctly orient the image."
    #[default]
    FromImage,
    /// "Does not apply any additional rotation or flipping to the image."
    None,
    /// An explicit rotation in degrees (a multiple of 90), optionally
    /// followed by a horizontal flip.
    Angle {
        /// Rotation, normalized to 0, 90, 180 or 270.
        degrees: u16,
        /// Whether the image is flipped horizontally after rotation.
        flip: bool,
    },
}

impl FromStr for ImageOrientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "from-image" => return Ok(Self::FromImage),
            "none" => return Ok(Self::None),
            "flip" => return Ok(Self::Angle { degrees: 0, flip: true }),
            _ => {}
        }
        let mut parts = value.split_whitespace();
        let angle = parts.next().ok_or_else(|| s.to_string())?;
        let flip = match parts.next() {
            None => false,
            Some("flip") => true,
            Some(_) => return Err(s.to_string()),
        };
        let degrees: f64 = angle
            .strip_suffix("deg")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| s.to_string())?;
        // "The angle is rounded to the nearest quarter turn."
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let quarter = ((degrees / 90.0).round().rem_euclid(4.0)) as u16;
        Ok(Self::Angle {
            degrees: quarter * 90,
            flip,
        })
    }
}

impl fmt::Display for ImageOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FromImage => f.write_str("from-image"),
            Self::None => f.write_str("none"),
            Self::Angle { degrees, flip } => {
                write!(f, "{degrees}deg")?;
                if *flip {
                    f.write_str(" flip")?;
                }
                Ok(())
            }
        }
    }
}

/// A fetched image resource, referenced by replaced boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    url: String,
    format: ImageFormat,
    intrinsic_size: Option<(u32, u32)>,
    orientation: ImageOrientation,
    data: Vec<u8>,
}

impl Image {
    /// Build an image from raw resource bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsupportedFormat`] if the bytes are not a
    /// recognised image.
    pub fn from_bytes(
        url: &str,
        data: Vec<u8>,
        mime_hint: Option<&str>,
        orientation: ImageOrientation,
    ) -> Result<Self, FetchError> {
        let format = ImageFormat::sniff(&data, mime_hint)
            .ok_or_else(|| FetchError::UnsupportedFormat(url.to_string()))?;
        let intrinsic_size = intrinsic_size(format, &data);
        Ok(Self {
            url: url.to_string(),
            format,
            intrinsic_size,
            orientation,
            data,
        })
    }

    /// The URL the image was loaded from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The sniffed format.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// Intrinsic dimensions as `(width, height)`, when the format header
    /// gives them.
    #[must_use]
    pub const fn intrinsic_size(&self) -> Option<(u32, u32)> {
        self.intrinsic_size
    }

    /// The orientation requested when the image was fetched.
    #[must_use]
    pub const fn orientation(&self) -> ImageOrientation {
        self.orientation
    }

    /// Raw resource bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Read intrinsic dimensions from the image header.
fn intrinsic_size(format: ImageFormat, data: &[u8]) -> Option<(u32, u32)> {
    match format {
        // IHDR is always the first chunk: width and height are big-endian
        // u32 at offsets 16 and 20.
        ImageFormat::Png => {
            let width = u32::from_be_bytes(data.get(16..20)?.try_into().ok()?);
            let height = u32::from_be_bytes(data.get(20..24)?.try_into().ok()?);
            Some((width, height))
        }
        // Logical screen descriptor: little-endian u16 at offsets 6 and 8.
        ImageFormat::Gif => {
            let width = u16::from_le_bytes(data.get(6..8)?.try_into().ok()?);
            let height = u16::from_le_bytes(data.get(8..10)?.try_into().ok()?);
            Some((u32::from(width), u32::from(height)))
        }
        ImageFormat::Jpeg | ImageFormat::Svg => None,
    }
}

/// Something that can turn a URL into an image resource.
///
/// Implemented by [`crate::net::ResourceFetcher`] for real documents and by
/// [`crate::net::InMemoryFetcher`] for tests.
pub trait ImageFetcher {
    /// Fetch the image at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the resource cannot be loaded or is
    /// not an image.
    fn fetch_image(
        &self,
        url: &str,
        mime_hint: Option<&str>,
        orientation: ImageOrientation,
    ) -> Result<Rc<Image>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x04\0\0\0\x02";

    #[test]
    fn sniffs_png_size() {
        let image =
            Image::from_bytes("a.png", PNG_HEADER.to_vec(), None, ImageOrientation::None)
                .unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.intrinsic_size(), Some((4, 2)));
    }

    #[test]
    fn sniffs_svg_text() {
        assert_eq!(
            ImageFormat::sniff(b"  <svg></svg>", None),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::sniff(b"hello", None), None);
    }

    #[test]
    fn parses_orientation() {
        assert_eq!(
            "from-image".parse::<ImageOrientation>(),
            Ok(ImageOrientation::FromImage)
        );
        assert_eq!(
            "-90deg flip".parse::<ImageOrientation>(),
            Ok(ImageOrientation::Angle {
                degrees: 270,
                flip: true
            })
        );
        assert!("sideways".parse::<ImageOrientation>().is_err());
    }
}
