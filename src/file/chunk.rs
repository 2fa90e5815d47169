use crate::byte_cursor::{ByteCursor, ByteResult};
use crate::error::Result;
use log::{debug, trace};
use snafu::ensure;
use std::borrow::Cow;

pub(crate) const MTHD: [u8; 4] = *b"MThd";
pub(crate) const MTRK: [u8; 4] = *b"MTrk";

const RIFF: [u8; 4] = *b"RIFF";
const RMID: [u8; 4] = *b"RMID";
const RIFF_DATA: [u8; 4] = *b"data";

/// 2.1 - Chunks: a four-character type followed by a 32-bit big-endian length and that many
/// bytes of data. The body borrows from the file buffer and lives only as long as the import.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RawChunk<'a> {
    id: [u8; 4],
    body: &'a [u8],
    /// Absolute position of the first body byte.
    offset: usize,
}

impl<'a> RawChunk<'a> {
    pub(crate) fn id_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.id)
    }

    pub(crate) fn is(&self, id: [u8; 4]) -> bool {
        self.id == id
    }

    pub(crate) fn len(&self) -> usize {
        self.body.len()
    }

    /// A cursor that cannot read beyond the declared length of this chunk.
    pub(crate) fn cursor(&self) -> ByteCursor<'a> {
        ByteCursor::with_base(self.body, self.offset)
    }
}

/// Splits a file into chunks, in file order, without interpreting their ids.
pub(crate) struct ChunkReader<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> ChunkReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(bytes),
        }
    }

    pub(crate) fn is_end(&self) -> bool {
        self.cursor.is_end()
    }

    /// Reads the next chunk. A chunk whose declared length runs past the end of the buffer is an
    /// end-of-file error.
    pub(crate) fn next_chunk(&mut self) -> ByteResult<RawChunk<'a>> {
        let id = self.cursor.read_tag()?;
        let length = self.cursor.read_u32()?;
        let offset = self.cursor.position();
        let body = self.cursor.take_slice(length as usize)?;
        debug!(
            "read '{}' chunk of {} bytes at position {}",
            String::from_utf8_lossy(&id),
            length,
            offset
        );
        Ok(RawChunk { id, body, offset })
    }
}

/// RMID files wrap a Standard MIDI File in a RIFF container. If `bytes` is such a container the
/// contents of its `data` chunk are returned, otherwise `bytes` is returned unchanged.
pub(crate) fn unwrap_riff(bytes: &[u8]) -> Result<&[u8]> {
    let mut cursor = ByteCursor::new(bytes);
    if cursor.peek4() != Some(RIFF) {
        return Ok(bytes);
    }
    debug!("unwrapping RIFF container");
    let riff = read_riff_chunk(&mut cursor).map_err(|_| not_rmid("RIFF"))?;
    let mut cursor = ByteCursor::new(riff);
    let form = cursor.read_tag().map_err(|_| not_rmid("RIFF"))?;
    ensure!(
        form == RMID,
        crate::error::NotAMidiFileSnafu {
            site: site!(),
            found: String::from_utf8_lossy(&form),
        }
    );
    while cursor.peek4().is_some() {
        let id = cursor.peek4();
        let body = read_riff_chunk(&mut cursor).map_err(|_| not_rmid("RMID"))?;
        if id == Some(RIFF_DATA) {
            return Ok(body);
        }
        trace!("skipping RIFF sub-chunk of {} bytes", body.len());
    }
    Err(not_rmid("RMID"))
}

/// Reads one little-endian RIFF chunk, including the pad byte after odd-length bodies. A body
/// that claims more than the remaining bytes is cut short rather than rejected.
fn read_riff_chunk<'a>(cursor: &mut ByteCursor<'a>) -> ByteResult<&'a [u8]> {
    cursor.read_tag()?;
    let length = cursor.read_u32_le()? as usize;
    let body = cursor.take_slice(length.min(cursor.remaining()))?;
    if length % 2 == 1 && !cursor.is_end() {
        cursor.read_u8()?;
    }
    Ok(body)
}

fn not_rmid(found: &str) -> crate::error::ImportError {
    crate::error::ImportError::NotAMidiFile {
        site: site!(),
        found: found.into(),
    }
}

#[test]
fn chunks_in_file_order() {
    let bytes = b"MThd\x00\x00\x00\x02abXYZW\x00\x00\x00\x00MTrk\x00\x00\x00\x01z";
    let mut reader = ChunkReader::new(bytes);
    let first = reader.next_chunk().unwrap();
    assert!(first.is(MTHD));
    assert_eq!(2, first.len());
    assert_eq!(8, first.cursor().position());
    let second = reader.next_chunk().unwrap();
    assert_eq!("XYZW", second.id_str());
    assert_eq!(0, second.len());
    let third = reader.next_chunk().unwrap();
    assert!(third.is(MTRK));
    assert!(reader.is_end());
}

#[test]
fn chunk_longer_than_file_is_end() {
    use crate::byte_cursor::ByteError;
    let bytes = b"MTrk\x00\x00\x00\x09abc";
    let mut reader = ChunkReader::new(bytes);
    let err = reader.next_chunk().unwrap_err();
    assert!(matches!(err, ByteError::End { .. }));
}

#[test]
fn riff_is_unwrapped() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&24u32.to_le_bytes());
    bytes.extend_from_slice(b"RMID");
    bytes.extend_from_slice(b"INFO");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&[0x00, 0x00]);
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(b"Mx");
    assert_eq!(b"Mx", unwrap_riff(&bytes).unwrap());
}

#[test]
fn riff_without_rmid_is_not_midi() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    let err = unwrap_riff(&bytes).unwrap_err();
    assert!(matches!(err, crate::error::ImportError::NotAMidiFile { .. }));
}

#[test]
fn plain_smf_is_untouched() {
    let bytes = b"MThd\x00\x00\x00\x06";
    assert_eq!(&bytes[..], unwrap_riff(bytes).unwrap());
}
