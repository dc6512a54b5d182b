//! Producer-side SOME/IP-TP segmenter (C7, outbound half).
//!
//! [`TpBuf`]/[`TpPool`] reassemble inbound TP streams; this module is their
//! mirror image on the sending side. §2's outbound data flow is "Runtime
//! creates Message -> Serializer -> if length > max, segmented by the TP
//! layer and handed to the Async sender" -- [`tp_segment`] is that TP layer
//! step, producing the wire-ready, `TP_HEADER`-prefixed packets
//! [`AsyncSegmentSender::schedule`] expects in its `packets` batch.

use crate::*;

/// Splits `msg` into one or more wire-ready packets no bigger than
/// `max_segment_len` bytes of payload each.
///
/// If the payload already fits within a single `max_segment_len` chunk, a
/// single non-TP packet is returned (no TP header, TP flag unset) -- the
/// message did not actually need segmenting. Otherwise every packet but the
/// last carries a payload whose length is a multiple of 16 (mirroring the
/// alignment rule [`TpBuf::consume_tp`] enforces on the receiving side) and
/// sets the TP flag with an offset relative to the start of the
/// reassembled payload.
///
/// `max_segment_len` must be non-zero and a multiple of 16.
pub fn tp_segment(
    msg: &SomeipMessage,
    max_segment_len: u32,
) -> Result<Vec<Vec<u8>>, err::TpSegmentError> {
    use err::TpSegmentError::*;

    if max_segment_len == 0 || 0 != max_segment_len % 16 {
        return Err(InvalidMaxSegmentLen(max_segment_len));
    }

    let payload = msg.payload();
    let chunk_len = max_segment_len as usize;

    // fits in a single, non-TP packet: nothing to segment.
    if payload.len() <= chunk_len {
        let mut header = msg.header.clone();
        header.tp_header = None;
        header.length = SOMEIP_LEN_OFFSET_TO_PAYLOAD + payload.len() as u32;

        let mut packet = Vec::with_capacity(SOMEIP_HEADER_LENGTH + payload.len());
        packet.extend_from_slice(&header.base_to_bytes());
        packet.extend_from_slice(payload);
        return Ok(vec![packet]);
    }

    let segment_count = (payload.len() + chunk_len - 1) / chunk_len;
    let mut packets = Vec::with_capacity(segment_count);
    let mut offset = 0usize;
    while offset < payload.len() {
        let end = core::cmp::min(offset + chunk_len, payload.len());
        let chunk = &payload[offset..end];
        let more_segment = end < payload.len();

        if more_segment && 0 != chunk.len() % 16 {
            return Err(UnalignedSegment {
                offset: offset as u32,
                payload_len: chunk.len(),
            });
        }

        let mut tp_header = TpHeader::new(more_segment);
        tp_header.set_offset(offset as u32).map_err(|_| UnalignedSegment {
            offset: offset as u32,
            payload_len: chunk.len(),
        })?;

        let mut header = msg.header.clone();
        header.tp_header = Some(tp_header.clone());
        header.length =
            SOMEIP_LEN_OFFSET_TO_PAYLOAD + TP_HEADER_LENGTH as u32 + chunk.len() as u32;

        let mut packet = Vec::with_capacity(SOMEIP_HEADER_LENGTH + TP_HEADER_LENGTH + chunk.len());
        packet.extend_from_slice(&header.base_to_bytes());
        packet.extend_from_slice(&tp_header.to_bytes());
        packet.extend_from_slice(chunk);
        packets.push(packet);

        offset = end;
    }

    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> SomeipHeader {
        SomeipHeader {
            message_id: 1234,
            length: SOMEIP_LEN_OFFSET_TO_PAYLOAD,
            request_id: 23,
            interface_version: 1,
            message_type: MessageType::Notification,
            return_code: 0,
            tp_header: None,
        }
    }

    fn sequence(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i & 0xff) as u8).collect()
    }

    #[test]
    fn small_payload_is_not_segmented() {
        let msg = SomeipMessage::new(header(), sequence(16));
        let packets = tp_segment(&msg, 32).unwrap();
        assert_eq!(packets.len(), 1);
        let slice = SomeipMsgSlice::from_slice(&packets[0]).unwrap();
        assert!(!slice.is_tp());
        assert_eq!(slice.payload(), &sequence(16)[..]);
    }

    #[test]
    fn oversized_payload_is_split_and_reassembles() {
        let msg = SomeipMessage::new(header(), sequence(16 * 4 + 5));
        let packets = tp_segment(&msg, 32).unwrap();
        // 32, 32, 21 -> 3 segments
        assert_eq!(packets.len(), 3);

        let mut buf = TpBuf::new(Default::default());
        for p in &packets {
            let slice = SomeipMsgSlice::from_slice(p).unwrap();
            assert!(slice.is_tp());
            buf.consume_tp(slice).unwrap();
        }
        let reassembled = buf.try_finalize().unwrap();
        assert_eq!(reassembled.payload(), &sequence(16 * 4 + 5)[..]);
    }

    #[test]
    fn every_non_final_segment_is_16_aligned() {
        let msg = SomeipMessage::new(header(), sequence(16 * 3));
        let packets = tp_segment(&msg, 16).unwrap();
        assert_eq!(packets.len(), 3);
        for p in &packets[..packets.len() - 1] {
            let slice = SomeipMsgSlice::from_slice(p).unwrap();
            assert_eq!(slice.payload().len() % 16, 0);
            assert!(slice.tp_header().unwrap().more_segment);
        }
        let last = SomeipMsgSlice::from_slice(&packets[packets.len() - 1]).unwrap();
        assert!(!last.tp_header().unwrap().more_segment);
    }

    #[test]
    fn rejects_unaligned_max_segment_len() {
        let msg = SomeipMessage::new(header(), sequence(64));
        assert_eq!(
            tp_segment(&msg, 17).unwrap_err(),
            err::TpSegmentError::InvalidMaxSegmentLen(17)
        );
        assert_eq!(
            tp_segment(&msg, 0).unwrap_err(),
            err::TpSegmentError::InvalidMaxSegmentLen(0)
        );
    }

    #[test]
    fn empty_payload_yields_single_non_tp_packet() {
        let msg = SomeipMessage::new(header(), Vec::new());
        let packets = tp_segment(&msg, 16).unwrap();
        assert_eq!(packets.len(), 1);
        let slice = SomeipMsgSlice::from_slice(&packets[0]).unwrap();
        assert!(!slice.is_tp());
        assert!(slice.payload().is_empty());
    }
}
