//! Raw sample conversion.
//!
//! Slide readers return premultiplied ARGB samples packed into `u32` values in
//! the host byte order. The byte order is an explicit parameter here; callers
//! detect it once with [`PixelByteOrder::native`] or inject it.

/// Byte order of packed ARGB samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelByteOrder {
    /// `0xAARRGGBB` stored as `[BB, GG, RR, AA]`
    LittleEndian,
    /// `0xAARRGGBB` stored as `[AA, RR, GG, BB]`
    BigEndian,
}

impl PixelByteOrder {
    /// Byte order of the current target.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            PixelByteOrder::BigEndian
        } else {
            PixelByteOrder::LittleEndian
        }
    }

    /// Byte positions of the alpha, red, green and blue channels in a sample.
    const fn channel_offsets(self) -> [usize; 4] {
        match self {
            PixelByteOrder::LittleEndian => [3, 2, 1, 0],
            PixelByteOrder::BigEndian => [0, 1, 2, 3],
        }
    }
}

impl Default for PixelByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

/// Reorder packed ARGB samples into RGBA bytes, in place.
///
/// Trailing bytes that do not form a whole sample are left untouched.
pub fn argb_to_rgba(data: &mut [u8], order: PixelByteOrder) {
    let [a, r, g, b] = order.channel_offsets();
    for sample in data.chunks_exact_mut(4) {
        let rgba = [sample[r], sample[g], sample[b], sample[a]];
        sample.copy_from_slice(&rgba);
    }
}

/// Convert premultiplied RGBA bytes to straight alpha, in place.
pub fn unpremultiply(data: &mut [u8]) {
    for pixel in data.chunks_exact_mut(4) {
        let alpha = pixel[3] as u32;
        match alpha {
            0 => pixel[..3].fill(0),
            255 => {}
            _ => {
                for channel in &mut pixel[..3] {
                    *channel = ((*channel as u32 * 255 + alpha / 2) / alpha).min(255) as u8;
                }
            }
        }
    }
}
