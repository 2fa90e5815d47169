use crate::core::status_type::STATUS_CHANNEL_MASK;
use crate::core::{Channel, ControlValue, NoteNumber, PitchBendValue, Program, StatusType, Velocity};
use crate::error::ExportResult;
use crate::scribe::Scribe;
use snafu::ResultExt;
use std::io::Write;

/// Represents the data that is common, and required for [`Message::NoteOn`],
/// [`Message::NoteOff`] and [`Message::PolyPressure`] messages. For poly pressure the `velocity`
/// is the key pressure.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoteMessage {
    pub(crate) channel: Channel,
    pub(crate) note_number: NoteNumber,
    pub(crate) velocity: Velocity,
}

impl NoteMessage {
    pub fn new(channel: Channel, note_number: NoteNumber, velocity: Velocity) -> Self {
        Self {
            channel,
            note_number,
            velocity,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn note_number(&self) -> NoteNumber {
        self.note_number
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }
}

/// A control change. Channel mode messages (controllers 120 through 127) are kept here as well,
/// their meaning is left to the sequencer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ControlChangeValue {
    pub(crate) channel: Channel,
    pub(crate) controller: ControlValue,
    pub(crate) value: ControlValue,
}

impl ControlChangeValue {
    pub fn new(channel: Channel, controller: ControlValue, value: ControlValue) -> Self {
        Self {
            channel,
            controller,
            value,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn controller(&self) -> ControlValue {
        self.controller
    }

    pub fn value(&self) -> ControlValue {
        self.value
    }
}

/// Provides the ability to change an instrument (sound, patch, etc.) by specifying the affected
/// channel number and the new program value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProgramChangeValue {
    pub(crate) channel: Channel,
    pub(crate) program: Program,
}

impl ProgramChangeValue {
    pub fn new(channel: Channel, program: Program) -> Self {
        Self { channel, program }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn program(&self) -> Program {
        self.program
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ChannelPressureValue {
    pub(crate) channel: Channel,
    pub(crate) pressure: Velocity,
}

impl ChannelPressureValue {
    pub fn new(channel: Channel, pressure: Velocity) -> Self {
        Self { channel, pressure }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn pressure(&self) -> Velocity {
        self.pressure
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PitchBendMessage {
    pub(crate) channel: Channel,
    pub(crate) pitch_bend: PitchBendValue,
}

impl PitchBendMessage {
    pub fn new(channel: Channel, pitch_bend: PitchBendValue) -> Self {
        Self {
            channel,
            pitch_bend,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn pitch_bend(&self) -> PitchBendValue {
        self.pitch_bend
    }
}

/// A channel voice message as it appears in a track.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Message {
    NoteOff(NoteMessage),
    NoteOn(NoteMessage),
    PolyPressure(NoteMessage),
    Control(ControlChangeValue),
    ProgramChange(ProgramChangeValue),
    ChannelPressure(ChannelPressureValue),
    PitchBend(PitchBendMessage),
}

impl Default for Message {
    fn default() -> Self {
        Message::NoteOff(NoteMessage::default())
    }
}

impl Message {
    /// Builds a message from its status byte and the data bytes that followed it. The caller has
    /// already checked that `data` holds exactly `status_type.data_len()` 7-bit values.
    pub(crate) fn decode(status_type: StatusType, status: u8, data: &[u8]) -> Self {
        let channel = Channel::new(status & STATUS_CHANNEL_MASK);
        let first = data.first().copied().unwrap_or(0);
        let second = data.get(1).copied().unwrap_or(0);
        let note = || NoteMessage::new(channel, first.into(), second.into());
        match status_type {
            StatusType::NoteOff => Message::NoteOff(note()),
            StatusType::NoteOn => Message::NoteOn(note()),
            StatusType::PolyPressure => Message::PolyPressure(note()),
            StatusType::ControlChange => {
                Message::Control(ControlChangeValue::new(channel, first.into(), second.into()))
            }
            StatusType::Program => {
                Message::ProgramChange(ProgramChangeValue::new(channel, first.into()))
            }
            StatusType::ChannelPressure => {
                Message::ChannelPressure(ChannelPressureValue::new(channel, first.into()))
            }
            StatusType::PitchBend => Message::PitchBend(PitchBendMessage::new(
                channel,
                PitchBendValue::from_lsb_msb(first, second),
            )),
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Message::NoteOff(m) | Message::NoteOn(m) | Message::PolyPressure(m) => m.channel,
            Message::Control(m) => m.channel,
            Message::ProgramChange(m) => m.channel,
            Message::ChannelPressure(m) => m.channel,
            Message::PitchBend(m) => m.channel,
        }
    }

    pub fn status_type(&self) -> StatusType {
        match self {
            Message::NoteOff(_) => StatusType::NoteOff,
            Message::NoteOn(_) => StatusType::NoteOn,
            Message::PolyPressure(_) => StatusType::PolyPressure,
            Message::Control(_) => StatusType::ControlChange,
            Message::ProgramChange(_) => StatusType::Program,
            Message::ChannelPressure(_) => StatusType::ChannelPressure,
            Message::PitchBend(_) => StatusType::PitchBend,
        }
    }

    /// The status byte for this message, status type in the high nibble and channel in the low.
    pub fn status_byte(&self) -> u8 {
        ((self.status_type() as u8) << 4) | self.channel().get()
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> ExportResult<()> {
        w.write_status_byte(self.status_byte())?;
        match self {
            Message::NoteOff(m) | Message::NoteOn(m) | Message::PolyPressure(m) => {
                w.write_all(&[m.note_number.get(), m.velocity.get()])
                    .context(wr!())
            }
            Message::Control(m) => w
                .write_all(&[m.controller.get(), m.value.get()])
                .context(wr!()),
            Message::ProgramChange(m) => write_u8!(w, m.program.get()),
            Message::ChannelPressure(m) => write_u8!(w, m.pressure.get()),
            Message::PitchBend(m) => w.write_all(&m.pitch_bend.to_lsb_msb()).context(wr!()),
        }
    }
}

#[test]
fn decode_note_on() {
    let message = Message::decode(StatusType::NoteOn, 0x93, &[0x3c, 0x40]);
    assert_eq!(
        Message::NoteOn(NoteMessage::new(Channel::new(3), 60.into(), 64.into())),
        message
    );
    assert_eq!(0x93, message.status_byte());
}

#[test]
fn decode_pitch_bend_and_program() {
    let bend = Message::decode(StatusType::PitchBend, 0xe0, &[0x01, 0x40]);
    match bend {
        Message::PitchBend(p) => assert_eq!(8193, p.pitch_bend().get()),
        other => panic!("wrong variant {:?}", other),
    }
    let program = Message::decode(StatusType::Program, 0xcf, &[0x05]);
    assert_eq!(15, program.channel().get());
    assert_eq!(0xcf, program.status_byte());
}

#[test]
fn write_with_running_status() {
    use crate::scribe::WriteSettings;
    let mut bytes = Vec::new();
    let mut scribe = Scribe::new(
        &mut bytes,
        WriteSettings {
            running_status: true,
        },
    );
    let a = Message::decode(StatusType::NoteOn, 0x90, &[0x3c, 0x40]);
    let b = Message::decode(StatusType::NoteOn, 0x90, &[0x3c, 0x00]);
    a.write(&mut scribe).unwrap();
    b.write(&mut scribe).unwrap();
    assert_eq!(vec![0x90, 0x3c, 0x40, 0x3c, 0x00], bytes);
}
