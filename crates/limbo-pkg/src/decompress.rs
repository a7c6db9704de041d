//! Chunked zlib decompression for `.d` container entries.
//!
//! Decoders hand out fixed-size chunks together with an end-of-stream
//! flag, so the extractor does not depend on any backend's short-read
//! conventions.

use std::io::{self, Read};

use flate2::read::ZlibDecoder;

use crate::DecompressError;

/// Default chunk size for inflating (1 MiB).
pub const CHUNK_SIZE: usize = 0x100000;

/// One piece of decoder output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub data: &'a [u8],
    /// No more output follows this chunk.
    pub is_final: bool,
}

/// A streaming decoder producing output chunk by chunk.
pub trait ChunkDecoder {
    fn next_chunk(&mut self) -> Result<Chunk<'_>, DecompressError>;
}

/// zlib inflate over any reader.
pub struct InflateChunks<R: Read> {
    decoder: ZlibDecoder<R>,
    buffer: Vec<u8>,
    pending: Option<u8>,
    finished: bool,
}

impl<R: Read> InflateChunks<R> {
    /// Create a decoder with the default chunk size.
    pub fn new(input: R) -> Self {
        Self::with_chunk_size(input, CHUNK_SIZE)
    }

    /// Create a decoder producing chunks of `chunk_size` bytes.
    pub fn with_chunk_size(input: R, chunk_size: usize) -> Self {
        Self {
            decoder: ZlibDecoder::new(input),
            buffer: vec![0; chunk_size.max(1)],
            pending: None,
            finished: false,
        }
    }
}

impl<R: Read> ChunkDecoder for InflateChunks<R> {
    fn next_chunk(&mut self) -> Result<Chunk<'_>, DecompressError> {
        if self.finished {
            return Ok(Chunk {
                data: &[],
                is_final: true,
            });
        }

        let mut filled = 0;
        if let Some(byte) = self.pending.take() {
            self.buffer[0] = byte;
            filled = 1;
        }

        filled += read_full(&mut self.decoder, &mut self.buffer[filled..])?;

        // A full chunk says nothing about what follows; probe one byte ahead
        // so the final chunk is flagged exactly.
        if filled == self.buffer.len() {
            let mut probe = [0u8; 1];
            if read_full(&mut self.decoder, &mut probe)? == 1 {
                self.pending = Some(probe[0]);
            } else {
                self.finished = true;
            }
        } else {
            self.finished = true;
        }

        Ok(Chunk {
            data: &self.buffer[..filled],
            is_final: self.finished,
        })
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Drain a decoder into a single buffer.
pub fn inflate<D: ChunkDecoder + ?Sized>(decoder: &mut D) -> Result<Vec<u8>, DecompressError> {
    let mut output = Vec::new();
    loop {
        let chunk = decoder.next_chunk()?;
        if chunk.data.is_empty() && !chunk.is_final {
            return Err(DecompressError::EmptyChunk);
        }

        output.extend_from_slice(chunk.data);
        if chunk.is_final {
            return Ok(output);
        }
    }
}

/// Inflate a complete zlib stream.
pub fn inflate_zlib(data: &[u8]) -> Result<Vec<u8>, DecompressError> {
    inflate(&mut InflateChunks::new(data))
}
