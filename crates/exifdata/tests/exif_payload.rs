//! EXIF model integration tests: bundled schema → TIFF directory bytes.

use exifdata::{AccessError, ByteOrder, EncodeError, Model};

#[test]
fn test_directory_layout_big_endian() {
    let mut exif = Model::exif().unwrap();
    exif.set("exif.make", "Canon").unwrap();
    exif.set("exif.orientation", 6i64).unwrap();
    exif.set("exif.xResolution", 72i64).unwrap();

    let payload = exif.encode().unwrap();

    // header, entry count, three entries, next-IFD offset
    let data_start = 8 + 2 + 3 * 12 + 4;
    let mut expected = vec![b'M', b'M', 0, 42, 0, 0, 0, 8, 0, 3];
    expected.extend_from_slice(&[0x01, 0x0f, 0, 2, 0, 0, 0, 6, 0, 0, 0, data_start as u8]);
    expected.extend_from_slice(&[0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, 6, 0, 0]);
    expected.extend_from_slice(&[0x01, 0x1a, 0, 5, 0, 0, 0, 1, 0, 0, 0, data_start as u8 + 6]);
    expected.extend_from_slice(&[0, 0, 0, 0]);
    expected.extend_from_slice(b"Canon\0");
    expected.extend_from_slice(&[0, 0, 0, 72, 0, 0, 0, 1]);
    assert_eq!(payload, expected);
}

#[test]
fn test_little_endian_and_alignment() {
    let mut exif = Model::exif().unwrap();
    exif.set_byte_order(ByteOrder::Lsb);
    exif.set("exif.model", "EOS R").unwrap();
    exif.set("exif.software", "exifdata").unwrap();

    let payload = exif.encode().unwrap();
    assert_eq!(&payload[..8], &[b'I', b'I', 42, 0, 8, 0, 0, 0]);

    // "EOS R\0" is six bytes, so the next value starts right after it.
    let data_start = 8 + 2 + 2 * 12 + 4;
    assert_eq!(&payload[data_start..data_start + 6], b"EOS R\0");
    let software_offset = u32::from_le_bytes([payload[30], payload[31], payload[32], payload[33]]);
    assert_eq!(software_offset as usize, data_start + 6);
    assert_eq!(&payload[data_start + 6..], b"exifdata\0\0");
}

#[test]
fn test_datetime_is_fixed_width() {
    let mut exif = Model::exif().unwrap();
    exif.set("exif.dateTime", "2025-03-21 10:11:12").unwrap();
    let payload = exif.encode().unwrap();
    assert!(payload.ends_with(b"2025:03:21 10:11:12\0"));
    assert_eq!(&payload[12..14], &[0, 2]);
    assert_eq!(&payload[14..18], &[0, 0, 0, 20]);
}

#[test]
fn test_field_aliases_and_readonly() {
    let mut exif = Model::exif().unwrap();
    exif.set("exif.description", "Sunrise").unwrap();
    assert_eq!(*exif.get("exif.imageDescription").unwrap().unwrap(), "Sunrise");
    assert!(matches!(
        exif.set("exif.exifOffset", 26i64),
        Err(AccessError::ReadOnly { .. })
    ));
}

#[test]
fn test_closed_options() {
    let mut exif = Model::exif().unwrap();
    assert!(matches!(
        exif.set("exif.orientation", 9i64),
        Err(AccessError::Value { .. })
    ));
    exif.set("exif.resolutionUnit", 2i64).unwrap();
}

#[test]
fn test_unwritable_model() {
    let mut exif = Model::exif().unwrap();
    exif.set("exif.make", "Canon").unwrap();
    exif.set_writable(false);
    assert!(matches!(exif.encode(), Err(EncodeError::NotWritable { .. })));
}

#[test]
fn test_exif_version_length() {
    let mut exif = Model::exif().unwrap();
    exif.set("exif.exifVersion", b"0232".to_vec()).unwrap();
    assert!(exif.encode().is_ok());

    exif.set("exif.exifVersion", b"023".to_vec()).unwrap();
    assert!(matches!(
        exif.encode(),
        Err(EncodeError::LengthBelowMinimum { min: 4, .. })
    ));
}

#[test]
fn test_exif_ifd_tags_share_ifd0() {
    let mut exif = Model::exif().unwrap();
    exif.set("exif.make", "Canon").unwrap();
    exif.set("exif.exifVersion", b"0232".to_vec()).unwrap();

    let payload = exif.encode().unwrap();
    assert_eq!(&payload[8..10], &[0, 2]);
    assert_eq!(&payload[10..12], &[0x01, 0x0f]);
    // ExifVersion is UNDEFINED, four bytes inline in the same directory
    assert_eq!(&payload[22..34], &[0x90, 0x00, 0, 7, 0, 0, 0, 4, b'0', b'2', b'3', b'2']);
    assert!(!payload.windows(2).any(|w| w == [0x87, 0x69]));
}
