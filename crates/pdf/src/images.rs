use std::io::{Cursor, Write};

use doctrans_core::layout::{ImageAsset, ImageEncoding, ImageKind, RawColor};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::PdfError;

/// Pixel data pulled out of an Image XObject, ready to become an
/// [`ImageAsset`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub encoding: ImageEncoding,
    pub bytes: Vec<u8>,
}

/// Layout of undecoded sample data as described by the stream dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SampleLayout {
    width: u32,
    height: u32,
    bits_per_component: u8,
    channels: u8,
}

impl SampleLayout {
    /// Byte count including per-row padding for sub-byte depths.
    fn expected_byte_count(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    fn bytes_per_row(&self) -> usize {
        let bits_per_row =
            self.width as usize * self.channels as usize * self.bits_per_component as usize;
        bits_per_row.div_ceil(8)
    }
}

/// Turn an Image XObject stream into a [`DecodedImage`].
///
/// JPEG and JPEG 2000 data are passed through untouched, CCITT Group 4 is
/// decoded to 8-bit gray, and everything else must decompress to samples in
/// a gray, RGB or CMYK colour space.  The error is a human-readable reason.
pub fn decode_image_stream(
    doc: &lopdf::Document,
    stream: &lopdf::Stream,
) -> Result<DecodedImage, String> {
    let dict = &stream.dict;
    let width = dict_u32(dict, b"Width").ok_or("missing /Width")?;
    let height = dict_u32(dict, b"Height").ok_or("missing /Height")?;
    if width == 0 || height == 0 {
        return Err(format!("degenerate image {}x{}", width, height));
    }

    let is_mask = dict
        .get(b"ImageMask")
        .ok()
        .and_then(|o| o.as_bool().ok())
        .unwrap_or(false);
    if is_mask {
        return Err("stencil masks are not supported".into());
    }

    let filters = filter_names(dict);
    let channels = color_channels(doc, dict);

    match filters.as_slice() {
        [only] if only == "DCTDecode" => Ok(DecodedImage {
            encoding: ImageEncoding {
                width,
                height,
                kind: ImageKind::Jpeg {
                    components: channels.unwrap_or(3),
                },
            },
            bytes: stream.content.clone(),
        }),
        [only] if only == "JPXDecode" => Ok(DecodedImage {
            encoding: ImageEncoding {
                width,
                height,
                kind: ImageKind::Jpeg2000,
            },
            bytes: stream.content.clone(),
        }),
        [only] if only == "CCITTFaxDecode" => decode_ccitt(dict, &stream.content),
        [.., last] if matches!(last.as_str(), "DCTDecode" | "JPXDecode" | "CCITTFaxDecode") => {
            Err(format!("{} behind another filter is not supported", last))
        }
        _ => {
            let samples = if filters.is_empty() {
                stream.content.clone()
            } else {
                stream
                    .decompressed_content()
                    .map_err(|e| format!("cannot decompress {:?}: {}", filters, e))?
            };
            let channels = channels.ok_or("unsupported colour space")?;
            let bits_per_component = dict
                .get(b"BitsPerComponent")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(8);
            let layout = SampleLayout {
                width,
                height,
                bits_per_component: u8::try_from(bits_per_component)
                    .map_err(|_| format!("bad /BitsPerComponent {}", bits_per_component))?,
                channels,
            };
            decode_samples(&layout, &samples)
        }
    }
}

/// Normalise decompressed samples to 8 bits per component.
fn decode_samples(layout: &SampleLayout, samples: &[u8]) -> Result<DecodedImage, String> {
    let color = RawColor::from_channels(layout.channels as i64)
        .ok_or_else(|| format!("{} colour channels", layout.channels))?;

    if samples.len() < layout.expected_byte_count() {
        return Err(format!(
            "expected {} bytes of samples, got {}",
            layout.expected_byte_count(),
            samples.len()
        ));
    }
    let samples = &samples[..layout.expected_byte_count()];

    let bytes = match layout.bits_per_component {
        8 => samples.to_vec(),
        1 | 2 | 4 => expand_sub_byte_samples(samples, layout),
        // Keep the most significant byte of each big-endian sample.
        16 => samples.iter().step_by(2).copied().collect(),
        other => return Err(format!("{} bits per component", other)),
    };

    Ok(DecodedImage {
        encoding: ImageEncoding {
            width: layout.width,
            height: layout.height,
            kind: ImageKind::Raw { color },
        },
        bytes,
    })
}

/// Expand packed 1/2/4-bit samples to 8 bits, dropping row padding.
fn expand_sub_byte_samples(samples: &[u8], layout: &SampleLayout) -> Vec<u8> {
    let per_row = layout.width as usize * layout.channels as usize;
    let bpc = layout.bits_per_component;
    let max_val = (1u16 << bpc) - 1;
    let per_byte = 8 / bpc as usize;

    let mut result = Vec::with_capacity(per_row * layout.height as usize);
    for row in samples.chunks(layout.bytes_per_row()) {
        let mut count = 0;
        'row: for &byte in row {
            for i in 0..per_byte {
                if count == per_row {
                    break 'row;
                }
                let shift = 8 - bpc * (i as u8 + 1);
                let val = (byte >> shift) as u16 & max_val;
                result.push((val * 255 / max_val) as u8);
                count += 1;
            }
        }
    }
    result
}

/// Decode CCITT Group 4 data to one 8-bit gray sample per pixel.
fn decode_ccitt(dict: &lopdf::Dictionary, data: &[u8]) -> Result<DecodedImage, String> {
    let parms = decode_parms(dict).ok_or("CCITT image without /DecodeParms")?;

    let k = parms.get(b"K").ok().and_then(|o| o.as_i64().ok()).unwrap_or(0);
    if k >= 0 {
        return Err("only CCITT Group 4 is supported".into());
    }

    let columns = parms
        .get(b"Columns")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(1728);
    let width = u16::try_from(columns).map_err(|_| format!("bad /Columns {}", columns))?;
    let rows = parms
        .get(b"Rows")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .and_then(|r| u16::try_from(r).ok());
    let (black, white) = (0u8, 255u8);
    let mut pixels: Vec<u8> = Vec::new();
    let mut height: u32 = 0;

    fax::decoder::decode_g4(data.iter().copied(), width, rows, |transitions| {
        let start = pixels.len();
        pixels.resize(start + width as usize, white);
        let row = &mut pixels[start..];
        let mut is_black = false;
        let mut prev: usize = 0;
        for &pos in transitions {
            let pos = (pos as usize).min(width as usize);
            if is_black && pos > prev {
                row[prev..pos].fill(black);
            }
            prev = pos;
            is_black = !is_black;
        }
        if is_black {
            row[prev..].fill(black);
        }
        height += 1;
    })
    .ok_or("corrupt CCITT data")?;

    if height == 0 {
        return Err("CCITT image has no rows".into());
    }

    Ok(DecodedImage {
        encoding: ImageEncoding {
            width: width as u32,
            height,
            kind: ImageKind::Raw {
                color: RawColor::Gray,
            },
        },
        bytes: pixels,
    })
}

/// Encode an asset as a standalone image file: `(extension, bytes)`.
///
/// JPEG and JPEG 2000 are written as-is; raw samples become PNG.
pub fn export_image(asset: &ImageAsset) -> Result<(&'static str, Vec<u8>), PdfError> {
    let ImageEncoding {
        width,
        height,
        kind,
    } = asset.encoding;

    let color = match kind {
        ImageKind::Jpeg { .. } => return Ok(("jpg", asset.bytes.clone())),
        ImageKind::Jpeg2000 => return Ok(("jp2", asset.bytes.clone())),
        ImageKind::Raw { color } => color,
    };

    if Some(asset.bytes.len()) != asset.encoding.expected_raw_len() {
        return Err(PdfError::Write(format!(
            "image has {} bytes, expected {:?}",
            asset.bytes.len(),
            asset.encoding.expected_raw_len()
        )));
    }

    let dyn_image = match color {
        RawColor::Gray => image::GrayImage::from_raw(width, height, asset.bytes.clone())
            .map(image::DynamicImage::ImageLuma8),
        RawColor::Rgb => image::RgbImage::from_raw(width, height, asset.bytes.clone())
            .map(image::DynamicImage::ImageRgb8),
        RawColor::Cmyk => image::RgbImage::from_raw(width, height, cmyk_to_rgb(&asset.bytes))
            .map(image::DynamicImage::ImageRgb8),
    }
    .ok_or_else(|| PdfError::Write("pixel buffer does not match dimensions".into()))?;

    let mut buf = Vec::new();
    dyn_image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PdfError::Write(format!("cannot encode PNG: {}", e)))?;
    Ok(("png", buf))
}

fn cmyk_to_rgb(cmyk_bytes: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk_bytes.len() / 4 * 3);
    for pixel in cmyk_bytes.chunks_exact(4) {
        let k = pixel[3] as u16;
        for &ink in &pixel[..3] {
            rgb.push(255u16.saturating_sub((ink as u16 + k).min(255)) as u8);
        }
    }
    rgb
}

/// Zlib-compress raw samples for a `/FlateDecode` stream.
pub fn flate_compress(data: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn dict_u32(dict: &lopdf::Dictionary, key: &[u8]) -> Option<u32> {
    dict.get(key)
        .ok()
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
}

/// Filter names in application order.  `Filter` may be a name or an array.
fn filter_names(dict: &lopdf::Dictionary) -> Vec<String> {
    let name = |o: &lopdf::Object| o.as_name().ok().map(|n| String::from_utf8_lossy(n).into_owned());
    match dict.get(b"Filter") {
        Ok(lopdf::Object::Array(arr)) => arr.iter().filter_map(name).collect(),
        Ok(obj) => name(obj).into_iter().collect(),
        Err(_) => Vec::new(),
    }
}

fn decode_parms(dict: &lopdf::Dictionary) -> Option<&lopdf::Dictionary> {
    match dict.get(b"DecodeParms").ok()? {
        lopdf::Object::Dictionary(d) => Some(d),
        lopdf::Object::Array(arr) => arr.first().and_then(|o| o.as_dict().ok()),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Number of colour components, for the colour spaces we can decode.
fn color_channels(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<u8> {
    let cs = resolve(doc, dict.get(b"ColorSpace").ok()?);
    match cs {
        lopdf::Object::Name(name) => channels_for_family(name),
        lopdf::Object::Array(arr) => {
            let family = arr.first()?.as_name().ok()?;
            if family == b"ICCBased" {
                let profile = resolve(doc, arr.get(1)?).as_stream().ok()?;
                let n = profile.dict.get(b"N").ok()?.as_i64().ok()?;
                RawColor::from_channels(n).map(|c| c.channels())
            } else {
                channels_for_family(family)
            }
        }
        _ => None,
    }
}

fn channels_for_family(name: &[u8]) -> Option<u8> {
    match name {
        b"DeviceGray" | b"CalGray" | b"G" => Some(1),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
        b"DeviceCMYK" | b"CMYK" => Some(4),
        _ => None,
    }
}
