//! FITS primary-HDU decoding.
//!
//! Parses the FITS container directly: 2880-byte blocks, 80-character header
//! records, big-endian payload. BZERO/BSCALE are applied during decode, so
//! the resulting [`Image`] holds calibrated values in an unspecified absolute
//! range; callers normalize afterwards. A `BAYERPAT = 'RGGB'` header routes
//! the frame through superpixel demosaicing.

use std::collections::HashMap;
use std::collections::TryReserveError;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::demosaic::superpixel_rggb;
use super::{Image, ImageDimensions, ImageError};

const BLOCK_SIZE: usize = 2880;
const RECORD_SIZE: usize = 80;

// ============================================================================
// BitPix
// ============================================================================

/// FITS BITPIX values representing pixel data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitPix {
    #[default]
    UInt8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl BitPix {
    pub fn from_fits_value(value: i64) -> Option<Self> {
        match value {
            8 => Some(BitPix::UInt8),
            16 => Some(BitPix::Int16),
            32 => Some(BitPix::Int32),
            -32 => Some(BitPix::Float32),
            -64 => Some(BitPix::Float64),
            _ => None,
        }
    }

    pub fn to_fits_value(self) -> i64 {
        match self {
            BitPix::UInt8 => 8,
            BitPix::Int16 => 16,
            BitPix::Int32 => 32,
            BitPix::Float32 => -32,
            BitPix::Float64 => -64,
        }
    }

    fn byte_size(self) -> usize {
        match self {
            BitPix::UInt8 => 1,
            BitPix::Int16 => 2,
            BitPix::Int32 | BitPix::Float32 => 4,
            BitPix::Float64 => 8,
        }
    }
}

// ============================================================================
// ImageMetadata
// ============================================================================

/// Metadata captured from FITS file headers.
#[derive(Debug, Clone, Default)]
pub struct ImageMetadata {
    pub object: Option<String>,
    pub instrument: Option<String>,
    pub telescope: Option<String>,
    pub date_obs: Option<String>,
    pub exposure_time: Option<f64>,
    pub bitpix: BitPix,
    /// Raw BAYERPAT header value, if the frame was mosaiced.
    pub bayer_pattern: Option<String>,
}

// ============================================================================
// Loading
// ============================================================================

/// Load the primary HDU of a FITS file as an [`Image`].
pub fn load_fits(path: &Path) -> Result<(Image, ImageMetadata), ImageError> {
    let file = File::open(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let (image, metadata) = decode(&mut reader).map_err(|err| err.into_image_error(path))?;

    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        object = metadata.object.as_deref().unwrap_or("-"),
        exposure = metadata.exposure_time.unwrap_or(0.0),
        "loaded FITS image"
    );

    Ok((image, metadata))
}

/// Internal decode error; `load_fits` attaches the offending path.
#[derive(Debug)]
enum DecodeError {
    Io(io::Error),
    Invalid(String),
    OutOfMemory(TryReserveError),
}

impl DecodeError {
    fn into_image_error(self, path: &Path) -> ImageError {
        match self {
            DecodeError::Io(source) => ImageError::Io {
                path: path.to_path_buf(),
                source,
            },
            DecodeError::Invalid(reason) => ImageError::InvalidImage {
                path: path.to_path_buf(),
                reason,
            },
            DecodeError::OutOfMemory(err) => ImageError::OutOfMemory(err),
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        DecodeError::Io(err)
    }
}

impl From<TryReserveError> for DecodeError {
    fn from(err: TryReserveError) -> Self {
        DecodeError::OutOfMemory(err)
    }
}

fn invalid(reason: impl Into<String>) -> DecodeError {
    DecodeError::Invalid(reason.into())
}

/// Decode a FITS stream: header, then big-endian payload.
fn decode<R: Read>(reader: &mut R) -> Result<(Image, ImageMetadata), DecodeError> {
    let header = read_header(reader)?;

    if header.get("SIMPLE").is_none() {
        return Err(invalid("not a FITS file (missing SIMPLE)"));
    }

    let bitpix_raw = header
        .get_i64("BITPIX")
        .ok_or_else(|| invalid("missing BITPIX"))?;
    let bitpix = BitPix::from_fits_value(bitpix_raw)
        .ok_or_else(|| invalid(format!("unsupported BITPIX {bitpix_raw}")))?;

    let naxis = header
        .get_i64("NAXIS")
        .ok_or_else(|| invalid("missing NAXIS"))?;
    let (width, height, channels) = match naxis {
        2 => (
            header
                .get_i64("NAXIS1")
                .ok_or_else(|| invalid("missing NAXIS1"))? as usize,
            header
                .get_i64("NAXIS2")
                .ok_or_else(|| invalid("missing NAXIS2"))? as usize,
            1usize,
        ),
        3 => (
            header
                .get_i64("NAXIS1")
                .ok_or_else(|| invalid("missing NAXIS1"))? as usize,
            header
                .get_i64("NAXIS2")
                .ok_or_else(|| invalid("missing NAXIS2"))? as usize,
            header
                .get_i64("NAXIS3")
                .ok_or_else(|| invalid("missing NAXIS3"))? as usize,
        ),
        n => return Err(invalid(format!("unsupported NAXIS {n}"))),
    };

    if width == 0 || height == 0 {
        return Err(invalid("image has zero dimensions"));
    }
    if channels != 1 && channels != 3 {
        return Err(invalid(format!("unsupported channel count {channels}")));
    }

    let bzero = header.get_f64("BZERO").unwrap_or(0.0);
    let bscale = header.get_f64("BSCALE").unwrap_or(1.0);

    let values = read_payload(reader, width * height * channels, bitpix, bscale, bzero)?;

    // FITS stores 3D data planar (all of channel 0, then channel 1, ...).
    let (dimensions, pixels) = if channels == 3 {
        let plane = width * height;
        let mut interleaved = Vec::new();
        interleaved.try_reserve_exact(values.len())?;
        for i in 0..plane {
            interleaved.push(values[i]);
            interleaved.push(values[plane + i]);
            interleaved.push(values[2 * plane + i]);
        }
        (ImageDimensions::new(width, height, 3), interleaved)
    } else if let Some(pattern) = header.get("BAYERPAT") {
        if !pattern.trim().eq_ignore_ascii_case("RGGB") {
            return Err(invalid(format!("unknown Bayer pattern '{}'", pattern.trim())));
        }
        if width < 2 || height < 2 {
            return Err(invalid("mosaiced image smaller than one Bayer quad"));
        }
        superpixel_rggb(&values, width, height)?
    } else {
        (ImageDimensions::new(width, height, 1), values)
    };

    let metadata = ImageMetadata {
        object: header.get("OBJECT").map(str::to_string),
        instrument: header.get("INSTRUME").map(str::to_string),
        telescope: header.get("TELESCOP").map(str::to_string),
        date_obs: header.get("DATE-OBS").map(str::to_string),
        exposure_time: header.get_f64("EXPTIME"),
        bitpix,
        bayer_pattern: header.get("BAYERPAT").map(|s| s.trim().to_string()),
    };

    Ok((Image::from_pixels(dimensions, pixels), metadata))
}

// ============================================================================
// Header parsing
// ============================================================================

/// Parsed FITS header: keyword to raw value string (quotes stripped).
#[derive(Debug, Default)]
struct FitsHeader {
    keywords: HashMap<String, String>,
}

impl FitsHeader {
    fn get(&self, key: &str) -> Option<&str> {
        self.keywords.get(key).map(String::as_str)
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.parse().ok()
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        // FITS allows Fortran-style 'D' exponents.
        self.get(key)?.replace(['D', 'd'], "E").parse().ok()
    }
}

/// Read 2880-byte header blocks until the END record.
fn read_header<R: Read>(reader: &mut R) -> Result<FitsHeader, DecodeError> {
    let mut header = FitsHeader::default();
    let mut block = [0u8; BLOCK_SIZE];
    let mut blocks_read = 0usize;

    loop {
        reader.read_exact(&mut block).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                invalid("truncated FITS header")
            } else {
                DecodeError::Io(err)
            }
        })?;
        blocks_read += 1;

        for record in block.chunks_exact(RECORD_SIZE) {
            let keyword = std::str::from_utf8(&record[..8])
                .map_err(|_| invalid("non-ASCII header keyword"))?
                .trim();

            if keyword == "END" {
                return Ok(header);
            }
            if let Some((key, value)) = parse_record(keyword, record) {
                header.keywords.entry(key).or_insert(value);
            }
        }

        // A conforming header ends with END well before this.
        if blocks_read > 1000 {
            return Err(invalid("header END record not found"));
        }
    }
}

/// Parse a single `KEYWORD = value / comment` record.
fn parse_record(keyword: &str, record: &[u8]) -> Option<(String, String)> {
    if keyword.is_empty() || keyword == "COMMENT" || keyword == "HISTORY" {
        return None;
    }
    if record[8] != b'=' {
        return None;
    }

    let rest = String::from_utf8_lossy(&record[10..]);
    let rest = rest.trim();

    let value = if let Some(quoted) = rest.strip_prefix('\'') {
        match quoted.find('\'') {
            Some(end) => quoted[..end].trim_end().to_string(),
            None => quoted.trim_end().to_string(),
        }
    } else {
        match rest.find('/') {
            Some(idx) => rest[..idx].trim().to_string(),
            None => rest.to_string(),
        }
    };

    Some((keyword.to_string(), value))
}

// ============================================================================
// Payload
// ============================================================================

/// Read `count` big-endian values, applying `v * BSCALE + BZERO`.
fn read_payload<R: Read>(
    reader: &mut R,
    count: usize,
    bitpix: BitPix,
    bscale: f64,
    bzero: f64,
) -> Result<Vec<f32>, DecodeError> {
    let byte_len = count * bitpix.byte_size();
    let mut raw = Vec::new();
    raw.try_reserve_exact(byte_len)?;
    raw.resize(byte_len, 0u8);
    reader.read_exact(&mut raw).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            invalid("truncated FITS payload")
        } else {
            DecodeError::Io(err)
        }
    })?;

    let mut values = Vec::new();
    values.try_reserve_exact(count)?;

    let scale = |v: f64| (v * bscale + bzero) as f32;
    match bitpix {
        BitPix::UInt8 => {
            values.extend(raw.iter().map(|&b| scale(b as f64)));
        }
        BitPix::Int16 => {
            values.extend(
                raw.chunks_exact(2)
                    .map(|c| scale(i16::from_be_bytes([c[0], c[1]]) as f64)),
            );
        }
        BitPix::Int32 => {
            values.extend(
                raw.chunks_exact(4)
                    .map(|c| scale(i32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f64)),
            );
        }
        BitPix::Float32 => {
            values.extend(
                raw.chunks_exact(4)
                    .map(|c| scale(f32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f64)),
            );
        }
        BitPix::Float64 => {
            values.extend(raw.chunks_exact(8).map(|c| {
                scale(f64::from_be_bytes([
                    c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7],
                ]))
            }));
        }
    }

    Ok(values)
}

// ============================================================================
// Tests
// ============================================================================
