/// How a decoder treats the newline separators between rows of hex.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum RowPolicy {
    /// Strip every newline and address pixels from the flat hex stream using the declared width.
    /// Missing or misplaced separators go unnoticed.
    #[default]
    Flatten,
    /// Require exactly `height` rows, each exactly `width * 6` characters long.
    Strict,
}

/// Options that control decoding.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DecodeOptions {
    row_policy: RowPolicy,
    max_pixels: Option<u64>,
}

impl DecodeOptions {
    /// A sensible cap for untrusted input, 16384 x 16384. Not applied unless asked for.
    pub const DEFAULT_MAX_PIXELS: u64 = 1 << 28;

    /// Flattened rows and no pixel limit.
    pub const fn new() -> Self {
        Self {
            row_policy: RowPolicy::Flatten,
            max_pixels: None,
        }
    }

    pub const fn row_policy(&self) -> RowPolicy {
        self.row_policy
    }

    pub const fn max_pixels(&self) -> Option<u64> {
        self.max_pixels
    }

    pub const fn with_row_policy(mut self, row_policy: RowPolicy) -> Self {
        self.row_policy = row_policy;
        self
    }

    /// Sets the largest `width * height` a decoder will allocate for. `None` removes the limit, in
    /// which case only allocation failure stops an oversized image.
    pub const fn with_max_pixels(mut self, max_pixels: Option<u64>) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}
