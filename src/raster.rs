use std::error;
use std::fmt;

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

use crate::pixel::Pixel;

/// A `width` x `height` grid of RGB pixels stored in row-major order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl RasterImage {
    /// Creates an image from row-major pixels. Fails unless there are exactly `width * height`
    /// pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, DimensionsError> {
        let expected = width as u64 * height as u64;
        if pixels.len() as u64 != expected {
            return Err(DimensionsError {
                width,
                height,
                num_pixels: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates an image with every position set to `pixel`.
    ///
    /// # Panics
    /// Panics if `width * height` does not fit in `usize`.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        let len = usize::try_from(width as u64 * height as u64)
            .expect("image dimensions overflow usize");
        Self {
            width,
            height,
            pixels: vec![pixel; len],
        }
    }

    /// Builds an image around a buffer the caller has already sized to `width * height`.
    pub(crate) fn from_parts_unchecked(width: u32, height: u32, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len() as u64, width as u64 * height as u64);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Iterates over the rows of the image, top to bottom. A zero-width image still yields
    /// `height` empty rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> + '_ {
        let width = self.width as usize;
        (0..self.height as usize).map(move |y| &self.pixels[y * width..(y + 1) * width])
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    /// Writes `pixel` at `(x, y)`. Returns false, leaving the image untouched, if the position is
    /// out of bounds.
    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) -> bool {
        match self.index_of(x, y) {
            Some(i) => {
                self.pixels[i] = pixel;
                true
            }
            None => false,
        }
    }

    fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn from_rgb_image(image: &RgbImage) -> Self {
        let pixels = image.pixels().map(|&Rgb(rgb)| Pixel::from(rgb)).collect();
        Self::from_parts_unchecked(image.width(), image.height(), pixels)
    }

    /// Converts any image the `image` crate can decode, discarding its alpha channel.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::from_rgb_image(&image.to_rgb8())
    }

    /// Converts to an RGBA buffer in which every pixel is fully opaque.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            Rgba(self.pixels[y as usize * self.width as usize + x as usize].rgba())
        })
    }
}

#[derive(Debug)]
pub struct DimensionsError {
    width: u32,
    height: u32,
    num_pixels: usize,
}

impl DimensionsError {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn num_pixels(&self) -> usize {
        self.num_pixels
    }
}

impl fmt::Display for DimensionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pixels given for a {}x{} image, expected {}",
            self.num_pixels,
            self.width,
            self.height,
            self.width as u64 * self.height as u64
        )
    }
}

impl error::Error for DimensionsError {}
