//! Frozen copy of the captured window, decoded to RGBA8

use anyhow::{bail, Result};

/// How a Z-pixmap image is laid out in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    pub bits_per_pixel: u8,
    /// Bytes per row, including scanline padding
    pub stride: usize,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    /// Server image byte order is most significant byte first
    pub msb_first: bool,
}

impl PixelLayout {
    /// Row stride for `width` pixels padded to `scanline_pad` bits
    pub fn padded_stride(width: u16, bits_per_pixel: u8, scanline_pad: u8) -> usize {
        let bits = usize::from(width) * usize::from(bits_per_pixel);
        let pad = usize::from(scanline_pad.max(8));
        bits.div_ceil(pad) * pad / 8
    }
}

#[derive(Debug)]
pub struct Screenshot {
    pub width: u16,
    pub height: u16,
    /// Row-major RGBA, top row first
    pub rgba: Vec<u8>,
}

impl Screenshot {
    pub fn from_zpixmap(width: u16, height: u16, data: &[u8], layout: PixelLayout) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Cannot capture an empty image ({width}x{height})");
        }

        let bytes_per_pixel = match layout.bits_per_pixel {
            24 => 3,
            32 => 4,
            other => bail!("Unsupported pixel size: {other} bits per pixel (need a 24/32-bit TrueColor visual)"),
        };

        let row_bytes = usize::from(width) * bytes_per_pixel;
        if layout.stride < row_bytes {
            bail!("Image stride {} is smaller than a {width} pixel row", layout.stride);
        }
        let needed = layout.stride * (usize::from(height) - 1) + row_bytes;
        if data.len() < needed {
            bail!("Image data too short: got {} bytes, need {needed}", data.len());
        }

        let red = Channel::from_mask(layout.red_mask)?;
        let green = Channel::from_mask(layout.green_mask)?;
        let blue = Channel::from_mask(layout.blue_mask)?;

        let mut rgba = Vec::with_capacity(usize::from(width) * usize::from(height) * 4);
        for row in data.chunks(layout.stride).take(usize::from(height)) {
            for px in row[..row_bytes].chunks_exact(bytes_per_pixel) {
                let pixel = read_pixel(px, layout.msb_first);
                rgba.extend_from_slice(&[red.extract(pixel), green.extract(pixel), blue.extract(pixel), 0xFF]);
            }
        }

        Ok(Self { width, height, rgba })
    }
}

fn read_pixel(bytes: &[u8], msb_first: bool) -> u32 {
    if msb_first {
        bytes.iter().fold(0, |acc, b| (acc << 8) | u32::from(*b))
    } else {
        bytes.iter().rev().fold(0, |acc, b| (acc << 8) | u32::from(*b))
    }
}

/// One color channel of a TrueColor visual
#[derive(Debug, Clone, Copy)]
struct Channel {
    mask: u32,
    shift: u32,
    max: u32,
}

impl Channel {
    fn from_mask(mask: u32) -> Result<Self> {
        if mask == 0 {
            bail!("Visual has an empty color channel mask");
        }
        let shift = mask.trailing_zeros();
        Ok(Self { mask, shift, max: mask >> shift })
    }

    fn extract(self, pixel: u32) -> u8 {
        let value = (pixel & self.mask) >> self.shift;
        if self.max == 0xFF {
            value as u8
        } else {
            (u64::from(value) * 0xFF / u64::from(self.max)) as u8
        }
    }
}
