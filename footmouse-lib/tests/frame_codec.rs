//! Tests for the structured and legacy frame codecs

mod common;

use common::*;
use footmouse_lib::constants::{HEADER_SIZE, MAX_PAYLOAD_SIZE};

#[test]
fn test_structured_roundtrip_preserves_command_and_payload() {
    let codec = StructuredCodec::new();
    let payloads: Vec<Vec<u8>> = vec![
        vec![],
        vec![0x10, 0x11, 0x00, 0xFF], // legacy markers are plain data here
        b"hello world!\0".to_vec(),
        (0..=255u8).cycle().take(MAX_PAYLOAD_SIZE).collect(),
    ];

    for payload in payloads {
        for command in [4u32, 12, u32::MAX] {
            let frame = codec.encode(command, &payload).expect("Failed to encode frame");
            assert_eq!(frame.len(), HEADER_SIZE + payload.len());

            let decoded = codec.decode(&frame).expect("Failed to decode frame");
            assert_eq!(decoded.command, command);
            assert_eq!(
                decoded.payload.as_ref(),
                payload.as_slice(),
                "Round-trip should preserve payload. Frame: {}",
                hex::encode(&frame)
            );
        }
    }
}

#[test]
fn test_structured_oversize_rejected_for_every_command() {
    let codec = StructuredCodec::new();
    let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
    for code in [CommandCode::Identify, CommandCode::Echo, CommandCode::SetButtonFunctionEx] {
        match codec.encode(code.into(), &payload) {
            Err(FootMouseError::PayloadTooLarge { len: 513, max: 512 }) => {}
            other => panic!("{}: expected PayloadTooLarge, got {:?}", code, other),
        }
    }
}

#[test]
fn test_set_button_function_frame() {
    let command = Command::SetButtonFunction {
        button: 2,
        mode: ButtonMode::Double,
        inverted: false,
    };
    let frame = command.encode(&StructuredCodec::new()).unwrap();

    let decoded = StructuredCodec::new().decode(&frame).unwrap();
    assert_eq!(decoded.command, 5);
    assert_eq!(decoded.payload.as_ref(), &[0x02, 0x08, 0x00]);
    assert_eq!(&frame[4..8], &3u32.to_le_bytes(), "payload_length should be 3");
    assert_eq!(&frame[12..16], &5u32.to_le_bytes(), "command_code should be 5");
}

#[test]
fn test_type_saved_string_is_always_empty() {
    let codec = StructuredCodec::new();
    let before = Command::TypeSavedAsciiString.encode(&codec).unwrap();
    let _stored = Command::SetSavedAsciiString("secret".into()).encode(&codec).unwrap();
    let after = Command::TypeSavedAsciiString.encode(&codec).unwrap();

    assert_eq!(before, after);
    let decoded = codec.decode(&after).unwrap();
    assert_eq!(decoded.command, 11);
    assert!(decoded.payload.is_empty());
}

#[test]
fn test_text_commands_null_terminate() {
    let codec = StructuredCodec::new();
    for command in [
        Command::Echo("Hellow World!\n".into()),
        Command::TypeAsciiString("Hellow World!\n".into()),
        Command::SetSavedAsciiString("Hellow World!\n".into()),
    ] {
        let decoded = codec.decode(&command.encode(&codec).unwrap()).unwrap();
        assert_eq!(decoded.payload.as_ref(), b"Hellow World!\n\0");
    }
}

#[test]
fn test_non_ascii_text_rejected_before_framing() {
    let err = Command::TypeAsciiString("café".into())
        .encode(&StructuredCodec::new())
        .unwrap_err();
    assert!(matches!(err, FootMouseError::NonAsciiText { index: 3, ch: 'é' }));
}

#[test]
fn test_reset_payload() {
    let frame = Command::ResetButtonsToDefault.encode(&LegacyCodec).unwrap();
    assert_eq!(frame.as_ref(), &[16, 6, 0, 0, 0, 17]);
}

#[test]
fn test_legacy_roundtrip() {
    let command = Command::SetButtonFunction {
        button: 1,
        mode: ButtonMode::Right,
        inverted: true,
    };
    let frame = command.encode(&LegacyCodec).unwrap();
    assert_eq!(frame.as_ref(), &[16, 5, 1, 2, 1, 17]);

    let decoded = LegacyCodec.decode(&frame).unwrap();
    assert_eq!(decoded.command, 5);
    assert_eq!(decoded.payload.as_ref(), &[1, 2, 1]);
}

#[test]
fn test_legacy_marker_bytes_are_not_escaped() {
    // A payload byte equal to the stop marker goes out raw; firmware reading up
    // to the first 0x11 would cut this message short.
    let frame = LegacyCodec.encode(8, &[b'a', 17, b'b', 0]).unwrap();
    assert_eq!(frame.as_ref(), &[16, 8, b'a', 17, b'b', 0, 17]);
    let first_stop = frame.iter().position(|&b| b == 17).unwrap();
    assert!(first_stop < frame.len() - 1);
}

#[test]
fn test_keycombo_frame_too_large_at_max_keys() {
    // 3 header bytes + 255 keys * 2 = 513, one over the firmware limit
    let combo = KeyCombo::new(vec![Key::Char('x'); 255]).unwrap();
    let command = Command::SetButtonFunctionEx {
        button: 0,
        inverted: false,
        combo,
    };
    assert!(matches!(
        command.encode(&StructuredCodec::new()),
        Err(FootMouseError::PayloadTooLarge { len: 513, .. })
    ));

    let combo = KeyCombo::new(vec![Key::Char('x'); 254]).unwrap();
    let command = Command::SetButtonFunctionEx {
        button: 0,
        inverted: false,
        combo,
    };
    assert!(command.encode(&StructuredCodec::new()).is_ok());
}
