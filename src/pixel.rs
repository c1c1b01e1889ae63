/// An opaque RGB pixel. JAIF carries no alpha channel; wherever an alpha value is needed it is
/// `u8::MAX`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    /// The value of every position a decoder did not fill.
    pub const ZERO: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(u8::MAX, u8::MAX, u8::MAX);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, u8::MAX]
    }

    #[inline]
    pub const fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Pixel {
    #[inline]
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Pixel> for [u8; 3] {
    #[inline]
    fn from(pixel: Pixel) -> Self {
        pixel.rgb()
    }
}
