/// To extract the channel number from a status byte. The right most four bits of a status byte
/// represent the channel number.
pub(crate) const STATUS_CHANNEL_MASK: u8 = 0b0000_1111;

/// `0xFF`: File Spec: All meta-events begin with FF, then have an event type byte (which is always
/// less than 128)
pub(crate) const FILE_META_EVENT: u8 = 0b1111_1111;

/// `0xF0`: File Spec: `F0 <length> <bytes to be transmitted after F0>`
pub(crate) const FILE_SYSEX_F0: u8 = 0b1111_0000;

/// `0xF7`: File Spec: `F7 <length> <all bytes to be transmitted>`
pub(crate) const FILE_SYSEX_F7: u8 = 0b1111_0111;

/// Represents the channel voice rows of Table I "Summary of Status Bytes" from the MIDI
/// standard, i.e. the left most four bits of a status byte from `0x8` to `0xE`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum StatusType {
    /// `0x8`: a `Note Off` message.
    NoteOff = 0x8,

    /// `0x9`: a `Note On (a velocity of 0 = Note Off)` message.
    NoteOn = 0x9,

    /// `0xA`: a `Polyphonic key pressure/Aftertouch` message.
    PolyPressure = 0xA,

    /// `0xB`: a `Control change` message or a `Channel Mode` message. Channel Mode messages are
    /// sent under the same Status Byte as the Control Change messages (BnH).
    ControlChange = 0xB,

    /// `0xC`: a `Program change` message.
    Program = 0xC,

    /// `0xD`: a `Channel pressure/After touch` message.
    ChannelPressure = 0xD,

    /// `0xE`: a `Pitch bend change` message.
    PitchBend = 0xE,
}

impl StatusType {
    /// Classifies a whole status byte. Returns `None` for data bytes and for system messages
    /// (`0xF0` and above).
    pub(crate) fn from_status_byte(status: u8) -> Option<Self> {
        match status >> 4 {
            0x8 => Some(StatusType::NoteOff),
            0x9 => Some(StatusType::NoteOn),
            0xA => Some(StatusType::PolyPressure),
            0xB => Some(StatusType::ControlChange),
            0xC => Some(StatusType::Program),
            0xD => Some(StatusType::ChannelPressure),
            0xE => Some(StatusType::PitchBend),
            _ => None,
        }
    }

    /// The number of data bytes that follow a status byte of this type.
    pub(crate) fn data_len(self) -> usize {
        match self {
            StatusType::Program | StatusType::ChannelPressure => 1,
            _ => 2,
        }
    }
}

#[test]
fn classify_status_bytes() {
    assert_eq!(Some(StatusType::NoteOff), StatusType::from_status_byte(0x80));
    assert_eq!(Some(StatusType::NoteOn), StatusType::from_status_byte(0x9f));
    assert_eq!(Some(StatusType::PitchBend), StatusType::from_status_byte(0xe3));
    assert_eq!(None, StatusType::from_status_byte(0x3c));
    assert_eq!(None, StatusType::from_status_byte(FILE_SYSEX_F0));
    assert_eq!(None, StatusType::from_status_byte(FILE_META_EVENT));
    assert_eq!(1, StatusType::Program.data_len());
    assert_eq!(2, StatusType::ControlChange.data_len());
}
