use std::convert::Infallible;
use std::error;
use std::fmt;
use std::io::{self, Read};

/// A trait representing a fallible, finite sequence of bytes that a JAIF document is read from.
pub trait ByteStream {
    type IoError;

    /// Returns the next `N` bytes in the sequence. If there are fewer than `N` bytes remaining in
    /// the sequence, a `StreamError::UnexpectedEof` should be returned. Implementors of the trait
    /// can also define an IO error type, which they may return if some IO error occurs while
    /// producing the bytes.
    fn read_n<const N: usize>(&mut self) -> Result<[u8; N], StreamError<Self::IoError>>;

    /// Consumes every remaining byte of the sequence. An exhausted stream yields an empty vec
    /// rather than an error.
    fn read_rest(&mut self) -> Result<Vec<u8>, StreamError<Self::IoError>>;
}

pub struct SliceByteStream<'a> {
    slice: &'a [u8],
}

impl<'a> SliceByteStream<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        Self { slice }
    }

    pub fn inner(&self) -> &'a [u8] {
        self.slice
    }
}

impl<'a> From<&'a [u8]> for SliceByteStream<'a> {
    fn from(slice: &'a [u8]) -> Self {
        Self::new(slice)
    }
}

impl<'a> ByteStream for SliceByteStream<'a> {
    // Reading from a slice can never encounter an IO error
    type IoError = Infallible;

    fn read_n<const N: usize>(&mut self) -> Result<[u8; N], StreamError<Self::IoError>> {
        if self.slice.len() < N {
            return Err(StreamError::UnexpectedEof);
        }
        let (head, rest) = self.slice.split_at(N);
        let mut bytes = [0; N];
        bytes.copy_from_slice(head);
        self.slice = rest;
        Ok(bytes)
    }

    fn read_rest(&mut self) -> Result<Vec<u8>, StreamError<Self::IoError>> {
        let rest = self.slice.to_vec();
        self.slice = &[];
        Ok(rest)
    }
}

pub struct ReadByteStream<R> {
    reader: R,
}

impl<R> ReadByteStream<R>
where
    R: Read,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R> From<R> for ReadByteStream<R>
where
    R: Read,
{
    fn from(reader: R) -> Self {
        Self::new(reader)
    }
}

impl<R> ByteStream for ReadByteStream<R>
where
    R: Read,
{
    type IoError = Box<io::Error>;

    fn read_n<const N: usize>(&mut self) -> Result<[u8; N], StreamError<Self::IoError>> {
        let mut buf = [0; N];
        self.reader
            .read_exact(&mut buf)
            .map(|_| buf)
            .map_err(|err| match err.kind() {
                io::ErrorKind::UnexpectedEof => StreamError::UnexpectedEof,
                _ => StreamError::Io(Box::new(err)),
            })
    }

    fn read_rest(&mut self) -> Result<Vec<u8>, StreamError<Self::IoError>> {
        let mut buf = Vec::new();
        self.reader
            .read_to_end(&mut buf)
            .map_err(|err| StreamError::Io(Box::new(err)))?;
        Ok(buf)
    }
}

#[derive(Debug)]
pub enum StreamError<E> {
    UnexpectedEof,
    Io(E),
}

impl<E> fmt::Display for StreamError<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::UnexpectedEof => f.write_str("unexpected eof"),
            StreamError::Io(err) => err.fmt(f),
        }
    }
}

impl<E> error::Error for StreamError<E> where E: error::Error {}
