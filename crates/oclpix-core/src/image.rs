//! Packed RGBA pixel buffer.
//!
//! # Layout
//!
//! One `u32` per pixel, 8 bits per channel, row-major with no padding:
//! pixel `(x, y)` lives at index `y * width + x`. This is the exact
//! layout the device-side image objects in `oclpix-compute` consume and
//! produce, so a buffer travels host → device → host without any
//! repacking.
//!
//! Decoding image files into this layout (and encoding back out) is the
//! caller's job; this crate never touches file formats.

use crate::{CoreError, CoreResult};

/// Host-resident image: packed 32-bit RGBA, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelImage {
    pub(crate) data: Vec<u32>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelImage {
    /// Create a zero-filled (transparent black) image.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            data: vec![0; len],
            width,
            height,
        }
    }

    /// Wrap an existing pixel buffer.
    ///
    /// Fails with [`CoreError::BufferSizeMismatch`] when the buffer
    /// length is not `width * height`.
    pub fn from_raw(data: Vec<u32>, width: u32, height: u32) -> CoreResult<Self> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(CoreError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Pixel data, one packed RGBA value per pixel.
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Mutable pixel data.
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Image dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of the pixel data in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<u32>()
    }

    /// Read the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Write the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, value: u32) {
        if x < self.width && y < self.height {
            self.data[(y as usize) * (self.width as usize) + (x as usize)] = value;
        }
    }

    /// View the pixel data as raw bytes (native endianness).
    ///
    /// Useful when handing the buffer to an encoder that wants `&[u8]`.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl std::fmt::Debug for PixelImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero_filled() {
        let img = PixelImage::new(4, 3);
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.data().len(), 12);
        assert!(img.data().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(PixelImage::from_raw(vec![0; 12], 4, 3).is_ok());

        let err = PixelImage::from_raw(vec![0; 11], 4, 3).unwrap_err();
        assert_eq!(
            err,
            CoreError::BufferSizeMismatch {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_pixel_accessors() {
        let mut img = PixelImage::new(3, 2);
        img.put_pixel(2, 1, 0xAABBCCDD);
        assert_eq!(img.pixel(2, 1), Some(0xAABBCCDD));
        assert_eq!(img.pixel(0, 0), Some(0));
        assert_eq!(img.pixel(3, 0), None);
        assert_eq!(img.pixel(0, 2), None);

        // Row-major: (2, 1) is the last element.
        assert_eq!(img.data()[5], 0xAABBCCDD);
    }

    #[test]
    fn test_as_bytes_length() {
        let img = PixelImage::new(5, 5);
        assert_eq!(img.as_bytes().len(), 100);
    }
}
