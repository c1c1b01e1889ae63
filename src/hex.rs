use std::error;
use std::fmt;

const LOWER_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Renders a byte slice as lowercase hex, two characters per byte.
pub(crate) struct HexBytes<'a> {
    bytes: &'a [u8],
}

impl<'a> HexBytes<'a> {
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl<'a> fmt::Display for HexBytes<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bytes
            .iter()
            .copied()
            .map(encode_byte)
            .map(|[h1, h2]| write!(f, "{}{}", h1 as char, h2 as char))
            .collect()
    }
}

/// Encodes a byte as two lowercase ASCII hex digits, most significant nibble first.
#[inline]
pub fn encode_byte(byte: u8) -> [u8; 2] {
    [
        LOWER_DIGITS[(byte >> 4) as usize],
        LOWER_DIGITS[(byte & 0x0F) as usize],
    ]
}

/// Decodes two ASCII hex digits into a byte. Both upper and lower case digits are accepted.
#[inline]
pub fn decode_pair(pair: [u8; 2]) -> Result<u8, HexError> {
    match (hex_to_nibble(pair[0]), hex_to_nibble(pair[1])) {
        (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
        _ => Err(HexError { bad_pair: pair }),
    }
}

#[inline]
fn hex_to_nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HexError {
    bad_pair: [u8; 2],
}

impl HexError {
    pub fn bad_pair(&self) -> [u8; 2] {
        self.bad_pair
    }
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid hex pair {:?} (bytes {})",
            String::from_utf8_lossy(&self.bad_pair),
            HexBytes::new(&self.bad_pair)
        )
    }
}

impl error::Error for HexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_survives_a_round_trip() {
        for v in 0..=u8::MAX {
            assert_eq!(decode_pair(encode_byte(v)), Ok(v));
        }
    }

    #[test]
    fn encodes_lowercase_zero_padded() {
        assert_eq!(&encode_byte(0x0A), b"0a");
        assert_eq!(&encode_byte(0x00), b"00");
        assert_eq!(&encode_byte(0xFF), b"ff");
        assert_eq!(&encode_byte(0xB7), b"b7");
    }

    #[test]
    fn accepts_uppercase_on_decode() {
        assert_eq!(decode_pair(*b"FF"), Ok(0xFF));
        assert_eq!(decode_pair(*b"aB"), Ok(0xAB));
    }

    #[test]
    fn rejects_non_hex_digits() {
        for pair in [*b"zz", *b"0g", *b"g0", *b" 1", *b"\n0", *b"-1"] {
            let err = decode_pair(pair).unwrap_err();
            assert_eq!(err.bad_pair(), pair);
        }
    }

    #[test]
    fn hex_bytes_display() {
        assert_eq!(HexBytes::new(&[0x00, 0x0a, 0xff]).to_string(), "000aff");
        assert_eq!(HexBytes::new(&[]).to_string(), "");
    }
}
