use std::io::{self, Write};

use log::trace;

use crate::header::Header;
use crate::hex;
use crate::pixel::Pixel;
use crate::raster::RasterImage;

const HEX_PER_PIXEL: u64 = 6;
const ROW_SEPARATOR: u8 = b'\n';

/// Encodes `image` into an in-memory JAIF document. Encoding the same image always produces the
/// same bytes.
pub fn encode(image: &RasterImage) -> Vec<u8> {
    let capacity = encoded_len(image.width(), image.height())
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    let mut buf = Vec::with_capacity(capacity);
    Encoder::new(&mut buf)
        .encode(image)
        .expect("writing to a Vec cannot fail");
    buf
}

/// Exact size in bytes of the JAIF document for an image of the given dimensions, or `None` if it
/// does not fit in a `u64`.
pub fn encoded_len(width: u32, height: u32) -> Option<u64> {
    let body = (width as u64)
        .checked_mul(height as u64)?
        .checked_mul(HEX_PER_PIXEL)?;
    let separators = (height as u64).saturating_sub(1);
    body.checked_add(separators)?
        .checked_add(Header::LEN as u64)
}

/// Writes JAIF documents to an underlying byte sink. The sink is written one row at a time, so
/// wrapping a file in a `BufWriter` is not required.
pub struct Encoder<W> {
    writer: W,
    row_buf: Vec<u8>,
}

impl<W> Encoder<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            row_buf: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the header followed by one newline-separated row of hex per image row, with no
    /// newline after the final row. Returns the number of bytes written.
    pub fn encode(&mut self, image: &RasterImage) -> io::Result<usize> {
        let header = Header::new(image.width(), image.height());
        self.writer.write_all(&header.to_bytes())?;
        let mut written = Header::LEN;

        for (y, row) in image.rows().enumerate() {
            if y > 0 {
                self.writer.write_all(&[ROW_SEPARATOR])?;
                written += 1;
            }
            encode_row(row, &mut self.row_buf);
            self.writer.write_all(&self.row_buf)?;
            written += self.row_buf.len();
        }

        self.writer.flush()?;
        trace!(
            "Encoded {}x{} image into {} bytes",
            image.width(),
            image.height(),
            written
        );
        Ok(written)
    }
}

fn encode_row(row: &[Pixel], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(row.len() * HEX_PER_PIXEL as usize);
    for pixel in row {
        for channel in pixel.rgb() {
            out.extend_from_slice(&hex::encode_byte(channel));
        }
    }
}
