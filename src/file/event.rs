use crate::byte_cursor::{ByteCursor, ByteError};
use crate::core::status_type::{FILE_META_EVENT, FILE_SYSEX_F0, FILE_SYSEX_F7};
use crate::core::{Message, StatusType};
use crate::error::{
    ExportResult, ImportError, InvalidDataByteSnafu, Result, TruncatedChannelEventSnafu,
    TruncatedMetaEventSnafu, TruncatedSysexEventSnafu, UnexpectedStatusSnafu,
};
use crate::file::{MetaEvent, SysexEvent, SysexEventType};
use crate::scribe::Scribe;
use log::trace;
use snafu::OptionExt;
use std::io::Write;

/// <event> = <MIDI event> | <sysex event> | <meta-event>
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Event {
    /// <MIDI event> is any MIDI channel message. Running status is used.
    Midi(Message),
    /// <sysex event> is used to specify a MIDI system exclusive message.
    Sysex(SysexEvent),
    /// <meta-event> specifies non-MIDI information useful to this format or to sequencers.
    Meta(MetaEvent),
}

impl Default for Event {
    fn default() -> Self {
        Event::Midi(Message::default())
    }
}

impl Event {
    /// Returns true if the event is a [`MetaEvent::EndOfTrack`].
    pub fn is_end_of_track(&self) -> bool {
        matches!(self, Event::Meta(MetaEvent::EndOfTrack))
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> ExportResult<()> {
        match self {
            Event::Midi(md) => md.write(w),
            Event::Sysex(sx) => sx.write(w),
            Event::Meta(mt) => mt.write(w),
        }
    }
}

/// One framed event: the status that applies to it and the bytes that belong to it, still
/// borrowed from the track chunk. Framing only checks lengths, [`RawEvent::decode`] gives the
/// bytes their meaning.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RawEvent<'a> {
    pub(crate) delta_ticks: u32,
    pub(crate) status: u8,
    /// Only present for meta events.
    pub(crate) meta_type: Option<u8>,
    pub(crate) payload: &'a [u8],
    /// Absolute position of the first byte after the status.
    pub(crate) position: usize,
}

impl<'a> RawEvent<'a> {
    /// Reads the bytes belonging to an event whose status is already known. The cursor must be
    /// positioned just after the status byte, or at the first data byte when running status
    /// applies.
    pub(crate) fn frame(
        delta_ticks: u32,
        status: u8,
        cursor: &mut ByteCursor<'a>,
        track: usize,
    ) -> Result<Self> {
        let position = cursor.position();
        let mut meta_type = None;
        let payload = match status {
            FILE_META_EVENT => {
                let on_err = |e| {
                    truncated(
                        e,
                        TruncatedMetaEventSnafu {
                            site: site!(),
                            track,
                            position,
                        }
                        .build(),
                    )
                };
                meta_type = Some(cursor.read_u8().map_err(on_err)?);
                let length = cursor.read_vlq().map_err(on_err)?;
                cursor.take_slice(length as usize).map_err(on_err)?
            }
            FILE_SYSEX_F0 | FILE_SYSEX_F7 => {
                let on_err = |e| {
                    truncated(
                        e,
                        TruncatedSysexEventSnafu {
                            site: site!(),
                            track,
                            position,
                        }
                        .build(),
                    )
                };
                let length = cursor.read_vlq().map_err(on_err)?;
                cursor.take_slice(length as usize).map_err(on_err)?
            }
            _ => {
                let status_type = StatusType::from_status_byte(status).context(
                    UnexpectedStatusSnafu {
                        site: site!(),
                        track,
                        status,
                        position,
                    },
                )?;
                let data = cursor.take_slice(status_type.data_len()).map_err(|_| {
                    TruncatedChannelEventSnafu {
                        site: site!(),
                        track,
                        status,
                        position,
                    }
                    .build()
                })?;
                if let Some(offset) = data.iter().position(|b| b & 0x80 != 0) {
                    return InvalidDataByteSnafu {
                        site: site!(),
                        track,
                        byte: data[offset],
                        position: position + offset,
                    }
                    .fail();
                }
                data
            }
        };
        trace!(
            "framed event with status {:#04X}, {} payload bytes at {}",
            status,
            payload.len(),
            position
        );
        Ok(Self {
            delta_ticks,
            status,
            meta_type,
            payload,
            position,
        })
    }

    /// Interprets a framed event.
    pub(crate) fn decode(&self, track: usize) -> Result<Event> {
        if let (FILE_META_EVENT, Some(meta_type)) = (self.status, self.meta_type) {
            return Ok(Event::Meta(MetaEvent::decode(meta_type, self.payload, track)?));
        }
        if let Some(t) = SysexEventType::from_status(self.status) {
            return Ok(Event::Sysex(SysexEvent::new(t, self.payload.to_vec())));
        }
        let status_type = StatusType::from_status_byte(self.status).context(
            UnexpectedStatusSnafu {
                site: site!(),
                track,
                status: self.status,
                position: self.position,
            },
        )?;
        Ok(Event::Midi(Message::decode(
            status_type,
            self.status,
            self.payload,
        )))
    }
}

/// Running out of chunk while inside a length-prefixed event means the event claims more bytes
/// than its chunk holds.
fn truncated(e: ByteError, on_end: ImportError) -> ImportError {
    match e {
        ByteError::End { .. } => on_end,
        ByteError::VlqTooBig { position } => ImportError::MalformedVlq {
            site: site!(),
            position,
        },
    }
}
