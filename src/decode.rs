use std::convert::Infallible;
use std::error;
use std::fmt;
use std::io;

use log::{debug, trace, warn};

use crate::byte_stream::{ByteStream, ReadByteStream, SliceByteStream, StreamError};
use crate::header::Header;
use crate::hex::{self, HexError};
use crate::options::{DecodeOptions, RowPolicy};
use crate::pixel::Pixel;
use crate::raster::RasterImage;

const HEX_PER_PIXEL: usize = 6;
const ROW_SEPARATOR: u8 = b'\n';

/// Decodes a complete JAIF document held in memory, using the default [`DecodeOptions`]. The
/// declared dimensions are those of the returned image.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, DecodeError<Infallible>> {
    decode_with_options(bytes, &DecodeOptions::default())
}

pub fn decode_with_options(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<RasterImage, DecodeError<Infallible>> {
    let (_header, body) = Decoder::new_from_slice(bytes).decode_header()?;
    body.decode_image(options)
}

pub struct Decoder<S> {
    stream: S,
}

impl<'a> Decoder<SliceByteStream<'a>> {
    pub fn new_from_slice(slice: &'a [u8]) -> Self {
        Self::new(slice.into())
    }
}

impl<R> Decoder<ReadByteStream<R>>
where
    R: io::Read,
{
    pub fn new_from_reader(reader: R) -> Self {
        Self::new(reader.into())
    }
}

impl<S> Decoder<S>
where
    S: ByteStream,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn decode_header(
        mut self,
    ) -> Result<(Header, BodyDecoder<S>), HeaderDecodeError<S::IoError>> {
        let header = Header::from_bytes(self.stream.read_n()?);
        debug!("Width: {}, height: {}", header.width(), header.height());

        Ok((
            header,
            BodyDecoder {
                stream: self.stream,
                header,
            },
        ))
    }
}

/// Decodes the hex body following a JAIF header. The whole body is read into memory before any
/// pixel is decoded.
pub struct BodyDecoder<S> {
    stream: S,
    header: Header,
}

impl<S> BodyDecoder<S>
where
    S: ByteStream,
{
    pub fn header(&self) -> Header {
        self.header
    }

    /// Reads the rest of the stream and decodes it into an image of the declared dimensions.
    ///
    /// Pixels are placed in row-major order according to the declared width alone. Positions the
    /// body does not reach keep [`Pixel::ZERO`]; pixels past the end of the image are dropped.
    pub fn decode_image(
        mut self,
        options: &DecodeOptions,
    ) -> Result<RasterImage, DecodeError<S::IoError>> {
        let (width, height) = self.header.dimensions();
        let num_pixels = self.header.num_pixels();

        if options.max_pixels().map_or(false, |max| num_pixels > max) {
            return Err(DecodeError::TooLarge);
        }
        let num_pixels = usize::try_from(num_pixels).map_err(|_| DecodeError::TooLarge)?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(num_pixels)
            .map_err(|_| DecodeError::TooLarge)?;
        pixels.resize(num_pixels, Pixel::ZERO);

        let body = self.stream.read_rest()?;
        trace!("Read {} body bytes", body.len());

        debug!("Row policy: {:?}", options.row_policy());
        let hex_digits = match options.row_policy() {
            RowPolicy::Flatten => flatten_rows(&body),
            RowPolicy::Strict => strict_rows::<S::IoError>(&body, self.header)?,
        };

        if hex_digits.len() % HEX_PER_PIXEL != 0 {
            return Err(DecodeError::OddHexLength {
                len: hex_digits.len(),
            });
        }

        let decoded = hex_digits.len() / HEX_PER_PIXEL;
        if decoded > num_pixels {
            warn!(
                "Body holds {} pixels but a {}x{} image only has room for {}, extra pixels are dropped",
                decoded, width, height, num_pixels
            );
        } else if decoded < num_pixels {
            warn!(
                "Body holds {} pixels, {} trailing pixels of the {}x{} image are left unset",
                decoded,
                num_pixels - decoded,
                width,
                height
            );
        }

        for (n, group) in hex_digits.chunks_exact(HEX_PER_PIXEL).enumerate() {
            let pixel = decode_pixel::<S::IoError>(group, n * HEX_PER_PIXEL)?;
            // Pixel n lands at flat row-major index n, i.e. y * width + x. Anything past the end of
            // the image is clipped, but still has to be valid hex.
            if let Some(slot) = pixels.get_mut(n) {
                *slot = pixel;
            }
        }

        Ok(RasterImage::from_parts_unchecked(width, height, pixels))
    }
}

fn decode_pixel<E>(group: &[u8], offset: usize) -> Result<Pixel, DecodeError<E>> {
    let channel = |i: usize| {
        hex::decode_pair([group[i], group[i + 1]]).map_err(|source| {
            DecodeError::<E>::Format {
                offset: offset + i,
                source,
            }
        })
    };
    Ok(Pixel::new(channel(0)?, channel(2)?, channel(4)?))
}

fn flatten_rows(body: &[u8]) -> Vec<u8> {
    body.iter()
        .copied()
        .filter(|&b| b != ROW_SEPARATOR)
        .collect()
}

fn strict_rows<E>(body: &[u8], header: Header) -> Result<Vec<u8>, DecodeError<E>> {
    let expected_rows = header.height() as u64;
    let row_len = header.width() as u64 * HEX_PER_PIXEL as u64;

    // An empty body is the only valid encoding of an image with no rows.
    if expected_rows == 0 {
        return if body.is_empty() {
            Ok(Vec::new())
        } else {
            Err(DecodeError::RowCount {
                expected: 0,
                found: body.split(|&b| b == ROW_SEPARATOR).count() as u64,
            })
        };
    }

    let found_rows = body.split(|&b| b == ROW_SEPARATOR).count() as u64;
    if found_rows != expected_rows {
        return Err(DecodeError::RowCount {
            expected: expected_rows,
            found: found_rows,
        });
    }

    let mut hex_digits = Vec::with_capacity(body.len());
    for (row, segment) in body.split(|&b| b == ROW_SEPARATOR).enumerate() {
        if segment.len() as u64 != row_len {
            return Err(DecodeError::RowLength {
                row: row as u32,
                expected: row_len,
                found: segment.len(),
            });
        }
        hex_digits.extend_from_slice(segment);
    }
    Ok(hex_digits)
}

#[derive(Debug)]
pub enum HeaderDecodeError<E> {
    TruncatedHeader,
    Io(E),
}

impl<E> fmt::Display for HeaderDecodeError<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedHeader => write!(
                f,
                "truncated header, expected at least {} bytes",
                Header::LEN
            ),
            Self::Io(err) => err.fmt(f),
        }
    }
}

impl<E> error::Error for HeaderDecodeError<E> where E: error::Error {}

impl<E> From<StreamError<E>> for HeaderDecodeError<E> {
    fn from(err: StreamError<E>) -> Self {
        match err {
            StreamError::UnexpectedEof => Self::TruncatedHeader,
            StreamError::Io(err) => Self::Io(err),
        }
    }
}

#[derive(Debug)]
pub enum DecodeError<E> {
    /// The document is shorter than the fixed header.
    TruncatedHeader,
    Io(E),
    /// A pair of characters in the body is not a valid hex byte. `offset` counts characters from
    /// the start of the body with row separators removed.
    Format { offset: usize, source: HexError },
    /// The body, without row separators, does not divide into whole pixels.
    OddHexLength { len: usize },
    /// Strict rows only: the number of newline separated rows differs from the declared height.
    RowCount { expected: u64, found: u64 },
    /// Strict rows only: a row is not exactly `width * 6` characters long.
    RowLength { row: u32, expected: u64, found: usize },
    /// The declared dimensions exceed the configured pixel limit or cannot be allocated.
    TooLarge,
}

impl<E> fmt::Display for DecodeError<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedHeader => write!(
                f,
                "truncated header, expected at least {} bytes",
                Header::LEN
            ),
            Self::Io(err) => err.fmt(f),
            Self::Format { offset, source } => {
                write!(f, "bad pixel data at body offset {}: {}", offset, source)
            }
            Self::OddHexLength { len } => write!(
                f,
                "body has {} hex characters, which is not a multiple of {}",
                len, HEX_PER_PIXEL
            ),
            Self::RowCount { expected, found } => {
                write!(f, "expected {} rows, found {}", expected, found)
            }
            Self::RowLength {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} characters, expected {}",
                row, found, expected
            ),
            Self::TooLarge => f.write_str("image too large"),
        }
    }
}

impl<E> error::Error for DecodeError<E>
where
    E: error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Format { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl<E> From<StreamError<E>> for DecodeError<E> {
    fn from(err: StreamError<E>) -> Self {
        match err {
            // Only the body is read through this conversion, and reading the rest of a stream
            // never runs past its end.
            StreamError::UnexpectedEof => Self::TruncatedHeader,
            StreamError::Io(err) => Self::Io(err),
        }
    }
}

impl<E> From<HeaderDecodeError<E>> for DecodeError<E> {
    fn from(err: HeaderDecodeError<E>) -> Self {
        match err {
            HeaderDecodeError::TruncatedHeader => Self::TruncatedHeader,
            HeaderDecodeError::Io(err) => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn document(width: u32, height: u32, body: &[u8]) -> Vec<u8> {
        let mut bytes = Header::new(width, height).to_bytes().to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn truncated_header() {
        for len in 0..Header::LEN {
            let bytes = vec![0; len];
            assert!(matches!(decode(&bytes), Err(DecodeError::TruncatedHeader)));
        }
    }

    #[test]
    fn header_only_decodes_to_empty_image() {
        let image = decode(&[0; 8]).unwrap();
        assert_eq!(image.dimensions(), (0, 0));
        assert!(image.pixels().is_empty());
    }

    #[test]
    fn malformed_hex_is_an_error_not_zero() {
        let err = decode(&document(1, 1, b"zz0000")).unwrap_err();
        match err {
            DecodeError::Format { offset, source } => {
                assert_eq!(offset, 0);
                assert_eq!(source.bad_pair(), *b"zz");
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = decode(&document(2, 1, b"000000ff00fg")).unwrap_err();
        assert!(matches!(err, DecodeError::Format { offset: 10, .. }));
    }

    #[test]
    fn partial_pixel_is_rejected() {
        let err = decode(&document(1, 1, b"ff00")).unwrap_err();
        assert!(matches!(err, DecodeError::OddHexLength { len: 4 }));
    }

    #[test]
    fn short_body_leaves_zero_pixels() {
        let image = decode(&document(2, 2, b"ffffff")).unwrap();
        assert_eq!(image.get(0, 0), Some(Pixel::WHITE));
        assert_eq!(image.get(1, 0), Some(Pixel::ZERO));
        assert_eq!(image.get(1, 1), Some(Pixel::ZERO));
    }

    #[test]
    fn flatten_ignores_row_boundaries() {
        // Three pixels on the first line, one on the second, for a 2x2 image
        let image = decode(&document(2, 2, b"010101020202030303\n040404")).unwrap();
        assert_eq!(image.get(0, 1), Some(Pixel::new(3, 3, 3)));
        assert_eq!(image.get(1, 1), Some(Pixel::new(4, 4, 4)));
    }

    #[test]
    fn excess_pixels_are_clipped() {
        let image = decode(&document(1, 1, b"010203\n040506")).unwrap();
        assert_eq!(image.pixels(), &[Pixel::new(1, 2, 3)]);

        let err = decode(&document(1, 1, b"010203\nxx0506")).unwrap_err();
        assert!(matches!(err, DecodeError::Format { offset: 6, .. }));
    }

    #[test]
    fn strict_rows_checks_layout() {
        let strict = DecodeOptions::default().with_row_policy(RowPolicy::Strict);

        let image =
            decode_with_options(&document(1, 2, b"010203\n040506"), &strict).unwrap();
        assert_eq!(image.get(0, 1), Some(Pixel::new(4, 5, 6)));

        let err = decode_with_options(&document(2, 2, b"010101020202030303\n040404"), &strict)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::RowLength {
                row: 0,
                expected: 12,
                found: 18
            }
        ));

        let err = decode_with_options(&document(1, 2, b"010203040506"), &strict).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::RowCount {
                expected: 2,
                found: 1
            }
        ));

        let err = decode_with_options(&document(1, 1, b"010203\n"), &strict).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::RowCount {
                expected: 1,
                found: 2
            }
        ));

        assert!(decode_with_options(&document(0, 0, b""), &strict).is_ok());
        assert!(decode_with_options(&document(0, 3, b"\n\n"), &strict).is_ok());
        assert!(decode_with_options(&document(0, 0, b"\n"), &strict).is_err());
    }

    #[test]
    fn pixel_limit() {
        let limited = DecodeOptions::default().with_max_pixels(Some(3));
        let err = decode_with_options(&document(2, 2, b""), &limited).unwrap_err();
        assert!(matches!(err, DecodeError::TooLarge));

        // No limit by default, but the buffer still cannot be reserved
        let err = decode(&document(u32::MAX, u32::MAX, b"")).unwrap_err();
        assert!(matches!(err, DecodeError::TooLarge));
    }

    /// Yields its bytes, then fails with a non-EOF error.
    struct FailingReader {
        data: io::Cursor<Vec<u8>>,
    }

    impl io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection lost")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn reader_failure_mid_body_is_io_error() {
        let reader = FailingReader {
            data: io::Cursor::new(document(2, 1, b"ff00")),
        };
        let (header, body) = Decoder::new_from_reader(reader).decode_header().unwrap();
        assert_eq!(header.dimensions(), (2, 1));

        match body.decode_image(&DecodeOptions::default()) {
            Err(DecodeError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn body_decoder_exposes_header() {
        let bytes = document(7, 9, b"");
        let (header, body) = Decoder::new_from_slice(&bytes).decode_header().unwrap();
        assert_eq!(header.dimensions(), (7, 9));
        assert_eq!(body.header(), header);
    }

    #[test]
    fn decodes_from_reader() {
        let bytes = document(1, 1, b"0a0b0c");
        let (_, body) = Decoder::new_from_reader(io::Cursor::new(bytes))
            .decode_header()
            .unwrap();
        let image = body.decode_image(&DecodeOptions::default()).unwrap();
        assert_eq!(image.pixels(), &[Pixel::new(0x0a, 0x0b, 0x0c)]);

        let result = Decoder::new_from_reader(io::Cursor::new(vec![1u8, 2, 3])).decode_header();
        assert!(matches!(result, Err(HeaderDecodeError::TruncatedHeader)));
    }
}
