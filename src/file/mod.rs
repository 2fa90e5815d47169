//! The `file` module is for types and concepts strictly related to MIDI *files*.
//! These are separated from types and concepts that are also used in realtime MIDI (`core`).

pub(crate) mod chunk;
mod composition;
mod division;
pub(crate) mod event;
mod header;
pub(crate) mod meta_event;
mod sysex;
mod tempo_map;
mod track;

pub use composition::Composition;
pub use division::{Division, FrameRate, QuarterNoteDivision, SmpteRate};
pub use event::Event;
pub use header::{Format, Header};
pub use meta_event::{
    KeyMode, KeySignatureValue, MetaEvent, MicrosecondsPerQuarter, SmpteOffsetValue, TextKind,
    TimeSignatureValue,
};
pub use sysex::{SysexEvent, SysexEventType};
pub use tempo_map::{TempoMap, TempoMapEntry, TimeSignatureEntry};
pub use track::{Track, TrackEvent};

pub(crate) use header::HEADER_LENGTH;

use crate::error::{DataTooLongSnafu, ExportResult};
use crate::scribe::Scribe;
use crate::vlq;
use snafu::{OptionExt, ResultExt};
use std::convert::TryFrom;
use std::io::Write;

/// Writes the variable-length quantity that precedes the data of meta and sysex events.
pub(crate) fn write_length<W: Write>(w: &mut Scribe<W>, length: usize) -> ExportResult<()> {
    let bytes = u32::try_from(length)
        .ok()
        .and_then(|value| vlq::encode_u32(value).ok())
        .context(DataTooLongSnafu {
            site: site!(),
            length,
        })?;
    w.write_all(&bytes).context(wr!())
}
