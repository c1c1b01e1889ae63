/// The fixed-width header at the start of every JAIF document: the image width followed by the
/// image height, each stored as a little-endian `u32`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Header {
    width: u32,
    height: u32,
}

impl Header {
    pub const LEN: usize = 8;

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Number of pixels the header declares, which may exceed `usize` on 32-bit targets.
    pub const fn num_pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut bytes = [0; Self::LEN];
        bytes[..4].copy_from_slice(&self.width.to_le_bytes());
        bytes[4..].copy_from_slice(&self.height.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        let [w0, w1, w2, w3, h0, h1, h2, h3] = bytes;
        Self::new(
            u32::from_le_bytes([w0, w1, w2, w3]),
            u32::from_le_bytes([h0, h1, h2, h3]),
        )
    }
}

impl From<[u8; Header::LEN]> for Header {
    fn from(bytes: [u8; Header::LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Header> for [u8; Header::LEN] {
    fn from(header: Header) -> Self {
        header.to_bytes()
    }
}
