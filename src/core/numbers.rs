clamp!(
    /// Represents the MIDI channel. The minimum value is `0`, the maximum value is `15`. This type
    /// will clamp values to the valid range.
    Channel,
    u8,
    0,
    15,
    0,
    pub
);

clamp!(
    /// Represents the MIDI note number (`C4` is `60`, for example). The minimum value is `0`,
    /// the maximum value is `127` (i.e. `u7`). This type will clamp values to the valid range.
    NoteNumber,
    u8,
    0,
    127,
    60,
    pub
);

clamp!(
    /// Represents the MIDI velocity, or key pressure for polyphonic aftertouch. The minimum value
    /// is `0`, the maximum value is `127` (i.e. `u7`).
    Velocity,
    u8,
    0,
    127,
    72,
    pub
);

clamp!(
    /// Represents the MIDI program number. The minimum value is `0`, the maximum value is `127`
    /// (i.e. `u7`). This type will clamp values to the valid range.
    Program,
    u8,
    0,
    127,
    0,
    pub
);

clamp!(
    /// A controller number or controller value. The valid range is `0` to `127`.
    ControlValue,
    u8,
    0,
    127,
    0,
    pub
);

clamp!(
    /// The [port](http://midi.teragonaudio.com/tech/midifile/obsolete.htm) number. The minimum
    /// value is `0`, maximum value is `255`. The default value is `0`.
    PortValue,
    u8,
    0,
    u8::MAX,
    0,
    pub
);

clamp!(
    /// Represents the MIDI pitch bend value. The minimum value is `0`, the maximum value is `16383`
    /// (i.e. `u14`) and the center is `8192`. This type will clamp values to the valid range.
    PitchBendValue,
    u16,
    0,
    16383,
    8192,
    pub
);

impl PitchBendValue {
    /// Combines the two 7-bit data bytes of a pitch bend message, least significant first.
    pub(crate) fn from_lsb_msb(lsb: u8, msb: u8) -> Self {
        Self::new((u16::from(msb & 0x7f) << 7) | u16::from(lsb & 0x7f))
    }

    pub(crate) fn to_lsb_msb(self) -> [u8; 2] {
        [(self.0 & 0x7f) as u8, (self.0 >> 7) as u8]
    }
}

#[test]
fn pitch_bend_bytes() {
    let center = PitchBendValue::from_lsb_msb(0x00, 0x40);
    assert_eq!(8192, center.get());
    assert_eq!([0x00, 0x40], center.to_lsb_msb());
    let max = PitchBendValue::from_lsb_msb(0x7f, 0x7f);
    assert_eq!(16383, max.get());
}
