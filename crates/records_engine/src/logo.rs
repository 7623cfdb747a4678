use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

use crate::service::{build_client, map_reqwest_error, read_limited};
use crate::ServiceSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    Url(String),
    Path(PathBuf),
}

impl LogoSource {
    /// `http(s)://` locations are fetched, anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            LogoSource::Url(raw.to_string())
        } else {
            LogoSource::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for LogoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoSource::Url(url) => f.write_str(url),
            LogoSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssetLoadError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("unsupported image: {0}")]
    UnsupportedFormat(String),
}

/// How the image bytes are embedded in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Baseline or progressive JPEG, passed through as-is.
    Jpeg { components: u8 },
    /// Concatenated PNG `IDAT` payload (zlib with PNG predictors).
    Png { colors: u8, palette: Option<Vec<u8>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
    pub data: Bytes,
}

impl LogoImage {
    /// Inspects `bytes` and keeps what is needed to embed the image without
    /// re-encoding it.
    pub fn decode(bytes: Bytes) -> Result<Self, AssetLoadError> {
        if bytes.starts_with(&[0xFF, 0xD8]) {
            decode_jpeg(bytes)
        } else if bytes.starts_with(PNG_SIGNATURE) {
            decode_png(&bytes)
        } else {
            Err(AssetLoadError::UnsupportedFormat(
                "neither JPEG nor PNG".to_string(),
            ))
        }
    }
}

/// Loads and inspects the logo. Callers treat every error as non-fatal.
pub async fn load_logo(
    source: &LogoSource,
    settings: &ServiceSettings,
) -> Result<LogoImage, AssetLoadError> {
    let bytes = match source {
        LogoSource::Path(path) => tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|err| AssetLoadError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            })?,
        LogoSource::Url(url) => fetch_bytes(url, settings).await?,
    };
    LogoImage::decode(bytes)
}

async fn fetch_bytes(url: &str, settings: &ServiceSettings) -> Result<Bytes, AssetLoadError> {
    let client = build_client(settings).map_err(|err| AssetLoadError::Fetch(err.to_string()))?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| AssetLoadError::Fetch(map_reqwest_error(err).to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(AssetLoadError::Fetch(format!("http status {}", status.as_u16())));
    }
    read_limited(response, settings.max_bytes)
        .await
        .map(Bytes::from)
        .map_err(|err| AssetLoadError::Fetch(err.to_string()))
}

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn decode_jpeg(bytes: Bytes) -> Result<LogoImage, AssetLoadError> {
    let truncated = || AssetLoadError::UnsupportedFormat("truncated JPEG".to_string());
    let mut pos = 2;
    loop {
        // Skip fill bytes up to the marker code.
        while bytes.get(pos) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *bytes.get(pos).ok_or_else(truncated)?;
        pos += 1;
        match marker {
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return Err(truncated()),
            _ => {}
        }
        let segment = bytes.get(pos..pos + 2).ok_or_else(truncated)?;
        let len = usize::from(u16::from_be_bytes([segment[0], segment[1]]));
        if matches!(marker, 0xC0..=0xC2) {
            let header = bytes.get(pos + 2..pos + 8).ok_or_else(truncated)?;
            let height = u32::from(u16::from_be_bytes([header[1], header[2]]));
            let width = u32::from(u16::from_be_bytes([header[3], header[4]]));
            let components = header[5];
            if !matches!(components, 1 | 3 | 4) {
                return Err(AssetLoadError::UnsupportedFormat(format!(
                    "JPEG with {components} components"
                )));
            }
            return Ok(LogoImage {
                width,
                height,
                encoding: ImageEncoding::Jpeg { components },
                data: bytes,
            });
        }
        if matches!(marker, 0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            return Err(AssetLoadError::UnsupportedFormat(
                "lossless or arithmetic-coded JPEG".to_string(),
            ));
        }
        pos += len;
    }
}

fn decode_png(bytes: &[u8]) -> Result<LogoImage, AssetLoadError> {
    let truncated = || AssetLoadError::UnsupportedFormat("truncated PNG".to_string());
    let mut pos = PNG_SIGNATURE.len();
    let mut header: Option<(u32, u32, u8)> = None;
    let mut palette = None;
    let mut idat = Vec::new();

    while pos + 8 <= bytes.len() {
        let len = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
            as usize;
        let kind = &bytes[pos + 4..pos + 8];
        let data = bytes.get(pos + 8..pos + 8 + len).ok_or_else(truncated)?;
        match kind {
            b"IHDR" => {
                if data.len() < 13 {
                    return Err(truncated());
                }
                let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
                let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
                let (bit_depth, color_type, interlace) = (data[8], data[9], data[12]);
                if bit_depth != 8 || interlace != 0 {
                    return Err(AssetLoadError::UnsupportedFormat(format!(
                        "PNG bit depth {bit_depth}, interlace {interlace}"
                    )));
                }
                header = Some((width, height, color_type));
            }
            b"PLTE" => palette = Some(data.to_vec()),
            b"IDAT" => idat.extend_from_slice(data),
            b"IEND" => break,
            _ => {}
        }
        // length + type + data + crc
        pos += 12 + len;
    }

    let (width, height, color_type) = header.ok_or_else(truncated)?;
    let (colors, palette) = match color_type {
        0 => (1, None),
        2 => (3, None),
        3 => (1, Some(palette.ok_or_else(truncated)?)),
        other => {
            return Err(AssetLoadError::UnsupportedFormat(format!(
                "PNG color type {other} (alpha channels are not embedded)"
            )))
        }
    };
    if idat.is_empty() {
        return Err(truncated());
    }
    Ok(LogoImage {
        width,
        height,
        encoding: ImageEncoding::Png { colors, palette },
        data: Bytes::from(idat),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_chunk(kind: &[u8], data: &[u8]) -> Vec<u8> {
        let mut chunk = (data.len() as u32).to_be_bytes().to_vec();
        chunk.extend_from_slice(kind);
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(&[0, 0, 0, 0]);
        chunk
    }

    fn png(color_type: u8) -> Bytes {
        let mut bytes = PNG_SIGNATURE.to_vec();
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&4u32.to_be_bytes());
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
        bytes.extend(png_chunk(b"IHDR", &ihdr));
        bytes.extend(png_chunk(b"IDAT", &[0x78, 0x9C, 0x01]));
        bytes.extend(png_chunk(b"IDAT", &[0x02]));
        bytes.extend(png_chunk(b"IEND", &[]));
        Bytes::from(bytes)
    }

    #[test]
    fn rgb_png_keeps_idat_payload() {
        let logo = LogoImage::decode(png(2)).unwrap();
        assert_eq!((logo.width, logo.height), (4, 2));
        assert_eq!(
            logo.encoding,
            ImageEncoding::Png {
                colors: 3,
                palette: None
            }
        );
        assert_eq!(logo.data.as_ref(), &[0x78, 0x9C, 0x01, 0x02]);
    }

    #[test]
    fn rgba_png_is_rejected() {
        let err = LogoImage::decode(png(6)).unwrap_err();
        assert!(matches!(err, AssetLoadError::UnsupportedFormat(_)));
    }

    #[test]
    fn jpeg_dimensions_come_from_frame_header() {
        let bytes = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, // APP0, 2 payload bytes
            0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x20, 0x00, 0x40, 0x03, 0x00, 0x00, 0x00,
            0xFF, 0xD9,
        ];
        let logo = LogoImage::decode(Bytes::from(bytes)).unwrap();
        assert_eq!((logo.width, logo.height), (64, 32));
        assert_eq!(logo.encoding, ImageEncoding::Jpeg { components: 3 });
    }

    #[test]
    fn unknown_bytes_are_unsupported() {
        let err = LogoImage::decode(Bytes::from_static(b"GIF89a")).unwrap_err();
        assert!(matches!(err, AssetLoadError::UnsupportedFormat(_)));
    }

    #[test]
    fn logo_source_distinguishes_urls_from_paths() {
        assert_eq!(
            LogoSource::parse("https://example.com/logo.png"),
            LogoSource::Url("https://example.com/logo.png".to_string())
        );
        assert_eq!(
            LogoSource::parse("assets/logo.png"),
            LogoSource::Path(PathBuf::from("assets/logo.png"))
        );
    }
}
