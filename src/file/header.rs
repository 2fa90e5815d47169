use crate::error::{
    ExportResult, FormatTrackCountSnafu, NotAMidiFileSnafu, Result, UnexpectedFormatSnafu,
};
use crate::file::chunk::{RawChunk, MTHD};
use crate::file::Division;
use crate::scribe::Scribe;
use log::debug;
use snafu::{ensure, ResultExt};
use std::io::Write;

/// The body of an `MThd` chunk is always at least this long.
pub(crate) const HEADER_LENGTH: usize = 6;

/// 2.2 - Header Chunk: `<Header Chunk> = <chunk type><length><format><ntrks><division>`
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Header {
    format: Format,
    track_count: u16,
    division: Division,
}

impl Header {
    /// Create a new `Header` object.
    pub fn new(format: Format, track_count: u16, division: Division) -> Self {
        Self {
            format,
            track_count,
            division,
        }
    }

    /// A getter for the `format` field.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The number of track chunks the file declares.
    pub fn track_count(&self) -> u16 {
        self.track_count
    }

    /// A getter for the `division` field.
    pub fn division(&self) -> Division {
        self.division
    }

    /// Decodes an `MThd` chunk. Bytes beyond the first six are ignored here; the importer reports
    /// them.
    pub(crate) fn decode(chunk: &RawChunk<'_>) -> Result<Self> {
        ensure!(
            chunk.is(MTHD),
            NotAMidiFileSnafu {
                site: site!(),
                found: chunk.id_str(),
            }
        );
        let mut cursor = chunk.cursor();
        let format_word = cursor.read_u16().map_err(in_chunk!("MThd"))?;
        let track_count = cursor.read_u16().map_err(in_chunk!("MThd"))?;
        let division_word = cursor.read_u16().map_err(in_chunk!("MThd"))?;
        let format = Format::decode(format_word)?;
        ensure!(
            format != Format::Single || track_count == 1,
            FormatTrackCountSnafu {
                site: site!(),
                track_count
            }
        );
        let division = Division::decode(division_word)?;
        debug!(
            "header: format {:?}, {} tracks, division {:?}",
            format, track_count, division
        );
        Ok(Self {
            format,
            track_count,
            division,
        })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> ExportResult<()> {
        // write the header chunk identifier
        w.write_all(&MTHD).context(wr!())?;

        // write the header chunk length (always 6)
        w.write_all(&(HEADER_LENGTH as u32).to_be_bytes())
            .context(wr!())?;

        w.write_all(&(self.format as u16).to_be_bytes())
            .context(wr!())?;
        w.write_all(&self.track_count.to_be_bytes())
            .context(wr!())?;
        w.write_all(&self.division.to_u16().to_be_bytes())
            .context(wr!())?;
        Ok(())
    }
}

#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub enum Format {
    /// 0 the file contains a single multi-channel track
    Single = 0,
    /// 1 the file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    #[default]
    Multi = 1,
    /// 2 the file contains one or more sequentially independent single-track patterns
    Sequential = 2,
}

impl Format {
    pub(crate) fn decode(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Format::Single),
            1 => Ok(Format::Multi),
            2 => Ok(Format::Sequential),
            _ => UnexpectedFormatSnafu {
                site: site!(),
                format: value,
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::chunk::ChunkReader;
    use crate::ImportError;

    fn header_chunk(body: &[u8]) -> Vec<u8> {
        let mut bytes = b"MThd".to_vec();
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    fn decode(bytes: &[u8]) -> Result<Header> {
        let chunk = ChunkReader::new(bytes).next_chunk().unwrap();
        Header::decode(&chunk)
    }

    #[test]
    fn decode_multi() {
        let header = decode(&header_chunk(&[0x00, 0x01, 0x00, 0x03, 0x01, 0xe0])).unwrap();
        assert_eq!(Format::Multi, header.format());
        assert_eq!(3, header.track_count());
        assert_eq!(Some(480), header.division().ticks_per_quarter());
    }

    #[test]
    fn wrong_id() {
        let mut bytes = header_chunk(&[0x00, 0x01, 0x00, 0x01, 0x01, 0xe0]);
        bytes[0] = b'X';
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ImportError::NotAMidiFile { .. }));
    }

    #[test]
    fn unknown_format() {
        let err = decode(&header_chunk(&[0x00, 0x03, 0x00, 0x01, 0x01, 0xe0])).unwrap_err();
        assert!(matches!(err, ImportError::UnexpectedFormat { format: 3, .. }));
    }

    #[test]
    fn single_with_two_tracks() {
        let err = decode(&header_chunk(&[0x00, 0x00, 0x00, 0x02, 0x01, 0xe0])).unwrap_err();
        assert!(matches!(
            err,
            ImportError::FormatTrackCount { track_count: 2, .. }
        ));
    }

    #[test]
    fn short_header_body() {
        let err = decode(&header_chunk(&[0x00, 0x01, 0x00, 0x01])).unwrap_err();
        assert!(matches!(err, ImportError::ChunkLengthMismatch { .. }));
    }

    #[test]
    fn write_header() {
        use crate::scribe::WriteSettings;
        let header = Header::new(Format::Single, 1, Division::decode(96).unwrap());
        let mut bytes = Vec::new();
        header
            .write(&mut Scribe::new(&mut bytes, WriteSettings::default()))
            .unwrap();
        assert_eq!(header_chunk(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x60]), bytes);
    }
}
