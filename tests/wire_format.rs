use mqtt_wire::protocol::{Buffer, FixedHeader, length_bytes};
use mqtt_wire::{
    ConnectMessage, Error, Message, PacketType, PublishMessage, QoS, SubscribeMessage, decode,
    encode,
};
use proptest::prelude::*;

#[test]
fn subscribe_body_matches_reference_bytes() {
    let mut message: Message = SubscribeMessage::single(1, "sensors/temp", QoS::AtLeastOnce).into();
    let bytes = encode(&mut message).unwrap();

    let header_len = message.fixed_header().encoded_len();
    // Skip the packet identifier that follows the fixed header
    let payload = &bytes[header_len + 2..];
    let mut expected = vec![0x00, 12];
    expected.extend_from_slice(b"sensors/temp");
    expected.push(1);
    assert_eq!(payload, expected.as_slice());
}

#[test]
fn connect_reference_bytes() {
    let mut message: Message = ConnectMessage::new("c1").with_keep_alive(60).into();
    let bytes = encode(&mut message).unwrap();
    assert_eq!(
        bytes.as_ref(),
        &[
            0x10, 14, // fixed header
            0x00, 0x04, b'M', b'Q', b'T', b'T', // protocol name
            0x04, // level
            0x02, // clean session
            0x00, 0x3C, // keep alive
            0x00, 0x02, b'c', b'1', // client id
        ]
    );
}

#[test]
fn connack_path_ignores_body_content() {
    for body in [[0x00u8, 0x00], [0x01, 0x05], [0x00, 0x03]] {
        let decoded = decode(vec![0x20, 0x02, body[0], body[1]]).unwrap();
        assert_eq!(decoded.packet_type(), PacketType::ConnectAck);
    }
}

#[test]
fn large_publish_uses_multi_byte_length() {
    let payload = vec![0xABu8; 20_000];
    let mut message: Message = PublishMessage::new("bulk", payload, QoS::AtMostOnce, None).into();
    let bytes = encode(&mut message).unwrap();
    let header = message.fixed_header();
    assert_eq!(header.encoded_len(), 4);
    assert_eq!(header.remaining_length() as usize, 2 + 4 + 20_000);
    assert_eq!(decode(bytes).unwrap(), message);
}

proptest! {
    /// Property: any encodable length round-trips through the byte count its range requires
    #[test]
    fn prop_remaining_length_roundtrip(length in 0u32..=268_435_455) {
        let mut buf = Buffer::new();
        let header = FixedHeader::new(PacketType::Publish, length).with_flags(false, QoS::AtLeastOnce, false);
        header.generate(&mut buf).unwrap();
        prop_assert_eq!(buf.length(), 1 + length_bytes(length as usize).unwrap());

        let decoded = FixedHeader::parse(&mut buf).unwrap();
        prop_assert_eq!(decoded, header);
    }

    /// Property: lengths beyond four groups never encode
    #[test]
    fn prop_overflow_rejected(length in 268_435_456u32..) {
        let mut buf = Buffer::new();
        let result = FixedHeader::new(PacketType::Publish, length).generate(&mut buf);
        let overflowed = matches!(result, Err(Error::LengthOverflow { .. }));
        prop_assert!(overflowed, "length {} encoded", length);
        prop_assert!(buf.is_empty());
    }
}
