mod utils;

use smf_import::core::{Message, StatusType};
use smf_import::file::{
    Division, Event, Format, FrameRate, KeyMode, MetaEvent, SysexEventType, TextKind,
};
use smf_import::{
    import, import_with, CancelFlag, Diagnostic, ImportError, ImportSettings, Text,
};
use utils::{
    chunk, enable_logging, two_track_file, SmfBuilder, BUSY_TRACK, CONDUCTOR_TRACK, END_OF_TRACK,
    NOTES_EXPLICIT, NOTES_RUNNING,
};

fn minimal_file() -> Vec<u8> {
    SmfBuilder::new(1, 96).track(&END_OF_TRACK).build()
}

fn import_bytes(bytes: &[u8]) -> smf_import::Result<smf_import::Composition> {
    import(bytes, &CancelFlag::new(), |_, _| {})
}

#[test]
fn minimal_format_one_file() {
    enable_logging();
    let composition = import_bytes(&minimal_file()).unwrap();
    assert_eq!(Format::Multi, composition.header().format());
    assert_eq!(Some(96), composition.header().division().ticks_per_quarter());
    assert_eq!(1, composition.tracks_len());
    let track = composition.track(0).unwrap();
    assert!(track.is_empty());
    assert_eq!(Some(0), track.end_tick());
    assert!(composition.tempo_map().tempos().is_empty());
    assert!(composition.diagnostics().is_empty());
}

#[test]
fn truncated_to_ten_bytes() {
    enable_logging();
    let bytes = minimal_file();
    let err = import_bytes(&bytes[..10]).unwrap_err();
    assert!(matches!(err, ImportError::Eof { .. }), "{}", err);
}

#[test]
fn not_a_midi_file() {
    enable_logging();
    let mut bytes = minimal_file();
    bytes[0] = b'X';
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::NotAMidiFile { .. }), "{}", err);
    assert!(err.to_string().contains("Not a MIDI file"));
}

#[test]
fn running_status_used_for_first_event() {
    enable_logging();
    let bytes = SmfBuilder::new(0, 96).track(&[0x00, 0x3c, 0x40]).build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(
        matches!(
            err,
            ImportError::RunningStatusBeforeFirstEvent { track: 0, .. }
        ),
        "{}",
        err
    );
    assert!(err
        .to_string()
        .contains("Running status used for first event in track"));
}

#[test]
fn tempo_at_tick_zero() {
    enable_logging();
    let bytes = SmfBuilder::new(0, 96)
        .track(&[0x00, 0xff, 0x51, 0x03, 0x07, 0xa1, 0x20, 0x00, 0xff, 0x2f, 0x00])
        .build();
    let composition = import_bytes(&bytes).unwrap();
    let tempos = composition.tempo_map().tempos();
    assert_eq!(1, tempos.len());
    assert_eq!(0, tempos[0].tick());
    assert_eq!(500_000, tempos[0].micros_per_quarter());
}

#[test]
fn two_tracks_in_detail() {
    enable_logging();
    let composition = import_bytes(&two_track_file()).unwrap();
    assert_eq!(2, composition.tracks_len());

    let conductor = composition.track(0).unwrap();
    assert_eq!(Some(&Text::new("Tempo")), conductor.name());
    let key = conductor
        .events()
        .find_map(|e| match e.event() {
            Event::Meta(MetaEvent::KeySignature(k)) => Some(*k),
            _ => None,
        })
        .unwrap();
    assert_eq!(-3, key.accidentals());
    assert_eq!(KeyMode::Major, key.mode());
    let marker = conductor.events().last().unwrap();
    assert_eq!(480, marker.tick());
    assert_eq!(
        &Event::Meta(MetaEvent::Text(TextKind::Marker, Text::new("verse"))),
        marker.event()
    );

    let busy = composition.track(1).unwrap();
    assert_eq!(10, busy.events_len());
    assert_eq!(Some(480), busy.end_tick());
    let statuses: Vec<StatusType> = busy
        .events()
        .filter_map(|e| match e.event() {
            Event::Midi(m) => Some(m.status_type()),
            _ => None,
        })
        .collect();
    assert_eq!(
        vec![
            StatusType::Program,
            StatusType::ControlChange,
            StatusType::NoteOn,
            StatusType::NoteOff,
            StatusType::PitchBend,
            StatusType::ChannelPressure,
            StatusType::PolyPressure,
        ],
        statuses
    );
    let sysex = busy
        .events()
        .find_map(|e| match e.event() {
            Event::Sysex(s) => Some(s.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(SysexEventType::F0, sysex.event_type());
    assert_eq!(&[0x7e, 0x7f, 0x09, 0x01, 0xf7], sysex.data());
    assert!(busy.events().any(|e| e.event()
        == &Event::Meta(MetaEvent::Other {
            meta_type: 0x60,
            data: vec![0x01, 0x02]
        })));
}

#[test]
fn tempo_map_across_tracks() {
    enable_logging();
    let composition = import_bytes(&two_track_file()).unwrap();
    let map = composition.tempo_map();
    let ticks: Vec<u64> = map.tempos().iter().map(|e| e.tick()).collect();
    assert_eq!(vec![0, 480], ticks);
    assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(1_000_000, map.tempo_at(481));
    assert_eq!(4, map.time_signature_at(1000).numerator());
    // one quarter at 120 bpm, then one at 60 bpm
    assert_eq!(1_500_000, composition.tick_to_micros(960));
}

#[test]
fn same_tick_tempos_last_track_wins() {
    enable_logging();
    let slow = [0x00, 0xff, 0x51, 0x03, 0x0f, 0x42, 0x40, 0x00, 0xff, 0x2f, 0x00];
    let fast = [0x00, 0xff, 0x51, 0x03, 0x03, 0xd0, 0x90, 0x00, 0xff, 0x2f, 0x00];
    let bytes = SmfBuilder::new(1, 96).track(&slow).track(&fast).build();
    let composition = import_bytes(&bytes).unwrap();
    let tempos = composition.tempo_map().tempos();
    assert_eq!(1, tempos.len());
    assert_eq!(250_000, tempos[0].micros_per_quarter());
}

#[test]
fn running_status_invariance() {
    enable_logging();
    let explicit = import_bytes(&SmfBuilder::new(0, 96).track(NOTES_EXPLICIT).build()).unwrap();
    let running = import_bytes(&SmfBuilder::new(0, 96).track(NOTES_RUNNING).build()).unwrap();
    assert_eq!(explicit, running);
    let track = running.track(0).unwrap();
    assert_eq!(4, track.events_len());
    let ticks: Vec<u64> = track.events().map(|e| e.tick()).collect();
    assert_eq!(vec![0, 96, 96, 192], ticks);
}

#[test]
fn running_status_ignores_meta_and_sysex() {
    enable_logging();
    let body = [
        0x00, 0x91, 0x3c, 0x40, // note on channel 1
        0x00, 0xff, 0x01, 0x01, b'x', // text
        0x00, 0xf0, 0x01, 0xf7, // sysex
        0x10, 0x3c, 0x00, // running status from before the meta and sysex
        0x00, 0xff, 0x2f, 0x00,
    ];
    let composition = import_bytes(&SmfBuilder::new(0, 96).track(&body).build()).unwrap();
    let last = composition.track(0).unwrap().events().last().unwrap();
    match last.event() {
        Event::Midi(Message::NoteOn(n)) => {
            assert_eq!(1, n.channel().get());
            assert_eq!(0, n.velocity().get());
        }
        other => panic!("wrong variant {:?}", other),
    }
}

#[test]
fn cancel_during_import_returns_nothing() {
    enable_logging();
    let bytes = SmfBuilder::new(1, 96)
        .track(&END_OF_TRACK)
        .track(&END_OF_TRACK)
        .track(&END_OF_TRACK)
        .build();
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    let mut progress = Vec::new();
    let result = import(&bytes, &cancel, |done, total| {
        progress.push((done, total));
        if done == 1 {
            flag.cancel();
        }
    });
    let err = result.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!("Cancelled by user", err.to_string());
    assert_eq!(vec![(1, 3)], progress);
}

#[test]
fn cancel_after_last_track_still_cancels() {
    enable_logging();
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    let result = import(&minimal_file(), &cancel, |_, _| flag.cancel());
    assert!(result.unwrap_err().is_cancelled());
}

#[test]
fn progress_counts_every_track() {
    enable_logging();
    let mut progress = Vec::new();
    import(&two_track_file(), &CancelFlag::new(), |done, total| {
        progress.push((done, total))
    })
    .unwrap();
    assert_eq!(vec![(1, 2), (2, 2)], progress);
}

#[test]
fn format_zero_with_two_tracks() {
    enable_logging();
    let bytes = SmfBuilder::new(0, 96)
        .track(&END_OF_TRACK)
        .track(&END_OF_TRACK)
        .build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::FormatTrackCount { track_count: 2, .. }));
}

#[test]
fn unexpected_format() {
    enable_logging();
    let bytes = SmfBuilder::new(7, 96).track(&END_OF_TRACK).build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::UnexpectedFormat { format: 7, .. }));
}

#[test]
fn zero_division() {
    enable_logging();
    let bytes = SmfBuilder::new(1, 0).track(&END_OF_TRACK).build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::InvalidDivision { value: 0, .. }));
}

#[test]
fn smpte_division() {
    enable_logging();
    // -25 frames per second, 40 ticks per frame
    let bytes = SmfBuilder::new(1, 0xe728).track(&END_OF_TRACK).build();
    let composition = import_bytes(&bytes).unwrap();
    match composition.header().division() {
        Division::Smpte(smpte) => {
            assert_eq!(FrameRate::N25, smpte.frame_rate());
            assert_eq!(40, smpte.resolution());
        }
        other => panic!("wrong variant {:?}", other),
    }
    assert_eq!(1_000_000, composition.tick_to_micros(1_000));
}

#[test]
fn header_body_too_short() {
    enable_logging();
    let mut bytes = chunk(b"MThd", &[0x00, 0x01, 0x00, 0x01]);
    bytes.extend_from_slice(&chunk(b"MTrk", &END_OF_TRACK));
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::ChunkLengthMismatch { .. }), "{}", err);
}

#[test]
fn track_body_shorter_than_its_events() {
    enable_logging();
    // the first track ends right after a delta-time, the second track follows
    let bytes = SmfBuilder::new(1, 96)
        .track(&[0x00])
        .track(&END_OF_TRACK)
        .build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::ChunkLengthMismatch { .. }), "{}", err);
    assert!(err.to_string().contains("Wrong length for 'MTrk' chunk"));
}

#[test]
fn delta_time_too_long() {
    enable_logging();
    let bytes = SmfBuilder::new(0, 96)
        .track(&[0xff, 0xff, 0xff, 0xff, 0x00, 0xff, 0x2f, 0x00])
        .build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::MalformedVlq { position: 22, .. }), "{}", err);
}

#[test]
fn channel_event_cut_short() {
    enable_logging();
    let bytes = SmfBuilder::new(0, 96).track(&[0x00, 0x90, 0x3c]).build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(
        matches!(
            err,
            ImportError::TruncatedChannelEvent {
                status: 0x90,
                track: 0,
                ..
            }
        ),
        "{}",
        err
    );
}

#[test]
fn meta_event_longer_than_track_names_the_track() {
    enable_logging();
    let bytes = SmfBuilder::new(1, 96)
        .track(&END_OF_TRACK)
        .track(&[0x00, 0xff, 0x03, 0x05, b'a'])
        .build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, ImportError::TruncatedMetaEvent { track: 1, .. }),
        "{}",
        err
    );
}

#[test]
fn tempo_with_wrong_length() {
    enable_logging();
    let bytes = SmfBuilder::new(0, 96)
        .track(&[0x00, 0xff, 0x51, 0x02, 0x07, 0xa1, 0x00, 0xff, 0x2f, 0x00])
        .build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        ImportError::InvalidMetaEvent {
            meta_type: 0x51,
            length: 2,
            ..
        }
    ));
}

#[test]
fn missing_end_of_track_is_a_diagnostic() {
    enable_logging();
    let bytes = SmfBuilder::new(0, 96).track(&[0x00, 0x90, 0x3c, 0x40]).build();
    let composition = import_bytes(&bytes).unwrap();
    assert_eq!(
        &[Diagnostic::MissingEndOfTrack { track: 0 }],
        composition.diagnostics()
    );
    assert_eq!(None, composition.track(0).unwrap().end_tick());

    let err = import_with(
        &bytes,
        ImportSettings { strict: true },
        &CancelFlag::new(),
        |_, _| {},
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ImportError::Strict {
            diagnostic: Diagnostic::MissingEndOfTrack { track: 0 },
            ..
        }
    ));
}

#[test]
fn unknown_chunks_are_skipped() {
    enable_logging();
    let bytes = SmfBuilder::new(1, 96)
        .raw_chunk(b"XFIH", &[1, 2, 3])
        .track(&END_OF_TRACK)
        .build();
    let composition = import_bytes(&bytes).unwrap();
    assert_eq!(1, composition.tracks_len());
    assert_eq!(
        &[Diagnostic::UnknownChunk {
            id: "XFIH".into(),
            length: 3
        }],
        composition.diagnostics()
    );
}

#[test]
fn oversized_header() {
    enable_logging();
    let mut bytes = chunk(b"MThd", &[0x00, 0x00, 0x00, 0x01, 0x00, 0x60, 0xaa, 0xbb]);
    bytes.extend_from_slice(&chunk(b"MTrk", &END_OF_TRACK));
    let composition = import_bytes(&bytes).unwrap();
    assert_eq!(Format::Single, composition.header().format());
    assert_eq!(
        &[Diagnostic::OversizedHeader { length: 8 }],
        composition.diagnostics()
    );
}

#[test]
fn rmid_container() {
    enable_logging();
    let smf = two_track_file();
    let mut form = b"RMID".to_vec();
    form.extend_from_slice(b"data");
    form.extend_from_slice(&(smf.len() as u32).to_le_bytes());
    form.extend_from_slice(&smf);
    if smf.len() % 2 == 1 {
        form.push(0);
    }
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&(form.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&form);
    let wrapped = import_bytes(&bytes).unwrap();
    let plain = import_bytes(&smf).unwrap();
    assert_eq!(plain, wrapped);
}

#[test]
fn status_byte_inside_channel_data() {
    enable_logging();
    let body = [0x00, 0x90, 0x3c, 0x80, 0x00, 0xff, 0x2f, 0x00];
    let bytes = SmfBuilder::new(0, 96).track(&body).build();
    let err = import_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ImportError::InvalidDataByte { byte: 0x80, .. }));
}

#[test]
fn conductor_and_busy_tracks_alone() {
    enable_logging();
    for body in &[CONDUCTOR_TRACK, BUSY_TRACK] {
        let bytes = SmfBuilder::new(0, 480).track(body).build();
        let composition = import_bytes(&bytes).unwrap();
        assert_eq!(Some(480), composition.track(0).unwrap().end_tick());
    }
}
