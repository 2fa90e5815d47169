use crate::error::{InvalidDivisionSnafu, Result};
use snafu::OptionExt;

clamp!(
    /// The allowable values for [`Division`] when using the quarter note method. It is a positive
    /// `u15` and thus has the range 1 to 32,767. The default value is 480.
    QuarterNoteDivision,
    u16,
    1,
    0x7fff,
    480,
    pub
);

/// Specifies the meaning of the delta-times. It has two formats, one for metrical time, and one for
/// time-code-based time:
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Division {
    /// If bit 15 of <division> is a zero, the bits 14 thru 0 represent the number of delta-time
    /// "ticks" which make up a quarter-note. For instance, if <division> is 96, then a time
    /// interval of an eighth-note between two events in the file would be 48.
    QuarterNote(QuarterNoteDivision),
    /// Frame rate and resolution within the frame.
    Smpte(SmpteRate),
}

impl Default for Division {
    fn default() -> Self {
        Division::QuarterNote(QuarterNoteDivision::default())
    }
}

const DIVISION_TYPE_BIT: u16 = 0b1000_0000_0000_0000;

impl Division {
    /// Decodes the header's division word. A zero tick count, an unknown frame rate or zero ticks
    /// per frame are rejected.
    pub(crate) fn decode(value: u16) -> Result<Self> {
        if value & DIVISION_TYPE_BIT == DIVISION_TYPE_BIT {
            let [upper, resolution] = value.to_be_bytes();
            let frame_rate = FrameRate::from_i8(upper as i8)
                .context(InvalidDivisionSnafu { site: site!(), value })?;
            if resolution == 0 {
                return InvalidDivisionSnafu { site: site!(), value }.fail();
            }
            Ok(Division::Smpte(SmpteRate {
                frame_rate,
                resolution,
            }))
        } else if value == 0 {
            InvalidDivisionSnafu { site: site!(), value }.fail()
        } else {
            Ok(Division::QuarterNote(QuarterNoteDivision::new(value)))
        }
    }

    pub(crate) fn to_u16(self) -> u16 {
        match self {
            Division::QuarterNote(q) => q.get(),
            Division::Smpte(s) => u16::from_be_bytes([s.frame_rate.as_i8() as u8, s.resolution]),
        }
    }

    /// Ticks per quarter note, if this is a metrical division.
    pub fn ticks_per_quarter(&self) -> Option<u16> {
        match self {
            Division::QuarterNote(q) => Some(q.get()),
            Division::Smpte(_) => None,
        }
    }
}

/// <division> Bits 14 thru 8 contain one of the four values -24, -25, -29, or -30, corresponding to
/// the four standard SMPTE and MIDI time code formats (-29 corresponds to 30 drop frame), and
/// represents the number of frames per second. These negative numbers are stored in two's
/// complement form.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub enum FrameRate {
    /// 24 frames per second
    #[default]
    N24,
    /// 25 frames per second
    N25,
    /// 30 drop
    N29,
    /// 30 frames per second
    N30,
}

impl FrameRate {
    pub(crate) fn from_i8(value: i8) -> Option<Self> {
        match value {
            -24 => Some(FrameRate::N24),
            -25 => Some(FrameRate::N25),
            -29 => Some(FrameRate::N29),
            -30 => Some(FrameRate::N30),
            _ => None,
        }
    }

    pub(crate) fn as_i8(self) -> i8 {
        -(self.frames_per_second() as i8)
    }

    /// The nominal frame count, `29` for drop-frame.
    pub fn frames_per_second(self) -> u8 {
        match self {
            FrameRate::N24 => 24,
            FrameRate::N25 => 25,
            FrameRate::N29 => 29,
            FrameRate::N30 => 30,
        }
    }

    /// The real frame rate. Drop-frame runs at 30000/1001 frames per second.
    pub fn frames_per_second_f64(self) -> f64 {
        match self {
            FrameRate::N29 => 30_000.0 / 1001.0,
            other => f64::from(other.frames_per_second()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SmpteRate {
    /// The number of frames per second.
    frame_rate: FrameRate,
    /// The <division> second byte (stored positive) is the resolution within a frame: typical
    /// values may be 4 (MIDI time code resolution), 8, 10, 80 (bit resolution), or 100.
    resolution: u8,
}

impl SmpteRate {
    /// Returns `None` if `resolution` is zero.
    pub fn new(frame_rate: FrameRate, resolution: u8) -> Option<Self> {
        if resolution == 0 {
            None
        } else {
            Some(Self {
                frame_rate,
                resolution,
            })
        }
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// Ticks per frame.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }
}

impl Default for SmpteRate {
    fn default() -> Self {
        // The 'millisecond-based tracks' example from the SMF 1.0 document.
        SmpteRate {
            frame_rate: FrameRate::N25,
            resolution: 40,
        }
    }
}

#[test]
fn quarter_note_division() {
    let division = Division::decode(480).unwrap();
    assert_eq!(Some(480), division.ticks_per_quarter());
    assert_eq!(480, division.to_u16());
}

#[test]
fn zero_ticks_per_quarter_is_invalid() {
    let err = Division::decode(0).unwrap_err();
    assert!(matches!(err, crate::ImportError::InvalidDivision { value: 0, .. }));
}

#[test]
fn smpte_division() {
    // E250: bit resolution of thirty-frame time code
    let division = Division::decode(0xe250).unwrap();
    let smpte = match division {
        Division::Smpte(s) => s,
        other => panic!("wrong variant {:?}", other),
    };
    assert_eq!(FrameRate::N30, smpte.frame_rate());
    assert_eq!(80, smpte.resolution());
    assert_eq!(0xe250, division.to_u16());
    assert_eq!(None, division.ticks_per_quarter());
}

#[test]
fn smpte_bad_frame_rate_or_resolution() {
    // -23 frames per second
    assert!(Division::decode(0xe928).is_err());
    // 25 fps with zero ticks per frame
    assert!(Division::decode(0xe700).is_err());
}
