//! Encoder and decoder for JAIF, an image interchange format made of an 8-byte little-endian
//! width/height header followed by newline separated rows of lowercase hex RGB pixels.
//!
//! ```
//! use jaif::{Pixel, RasterImage};
//!
//! let image = RasterImage::new(2, 1, vec![Pixel::new(255, 0, 0), Pixel::new(0, 255, 0)]).unwrap();
//! let bytes = jaif::encode(&image);
//! assert_eq!(&bytes[8..], b"ff000000ff00");
//! assert_eq!(jaif::decode(&bytes).unwrap(), image);
//! ```

pub mod byte_stream;
pub mod decode;
pub mod encode;
pub mod header;
pub mod hex;
pub mod options;
pub mod pixel;
pub mod raster;

pub use decode::{decode, decode_with_options, DecodeError, Decoder, HeaderDecodeError};
pub use encode::{encode, Encoder};
pub use header::Header;
pub use options::{DecodeOptions, RowPolicy};
pub use pixel::Pixel;
pub use raster::RasterImage;
