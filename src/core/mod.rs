/*!
The `core` module is for types and concepts that are *not* strictly related to MIDI *files*:
channel voice messages and the clamped values they carry.
!*/

mod message;
mod numbers;
pub(crate) mod status_type;

pub use message::{
    ChannelPressureValue, ControlChangeValue, Message, NoteMessage, PitchBendMessage,
    ProgramChangeValue,
};
pub use numbers::{
    Channel, ControlValue, NoteNumber, PitchBendValue, PortValue, Program, Velocity,
};
pub use status_type::StatusType;
