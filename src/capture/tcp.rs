//! Ethernet/IPv4/TCP decode and payload selection.
//!
//! Mirrors the upstream BPF filter `tcp portrange 54992-54994 or tcp
//! portrange 55006-55007 or tcp portrange 55021-55040 or tcp portrange
//! 55296-55551` as an in-process test: a frame is selected when it carries
//! a non-empty TCP payload with the PSH flag set and either port inside the
//! filtered ranges.

use bytes::Bytes;
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::{TcpFlags, TcpPacket};
use pnet::packet::Packet as _;

use crate::protocol::{Endpoint, FRAME_HEADER_SIZE, SEG_HEADER_SIZE};

/// Inclusive port ranges the protocol is known to use.
pub const PORT_RANGES: &[(u16, u16)] = &[
    (54992, 54994),
    (55006, 55007),
    (55021, 55040),
    (55296, 55551),
];

/// Minimum frame size worth decoding: Ethernet + IPv4 + TCP headers plus
/// one frame header and one segment header.
pub const MIN_CAPTURE_BYTES: usize = 14 + 20 + 20 + FRAME_HEADER_SIZE + SEG_HEADER_SIZE;

/// Whether a port falls inside the filtered ranges.
pub fn in_port_range(port: u16) -> bool {
    PORT_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&port))
}

/// A selected TCP payload with its flow addressing.
#[derive(Debug, Clone)]
pub struct TcpPayload {
    pub source: Endpoint,
    pub destination: Endpoint,
    pub payload: Bytes,
}

/// Decode one link-layer frame and select its payload if it belongs to a
/// monitored flow.
///
/// Returns `None` for anything that is not IPv4 TCP, carries no payload,
/// lacks the PSH flag, or touches no filtered port.
pub fn extract(frame: &[u8]) -> Option<TcpPayload> {
    let ethernet = EthernetPacket::new(frame)?;
    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
        return None;
    }
    let ip = Ipv4Packet::new(ethernet.payload())?;
    if ip.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
        return None;
    }
    let tcp = TcpPacket::new(ip.payload())?;

    let src_port = tcp.get_source();
    let dst_port = tcp.get_destination();
    if !in_port_range(src_port) && !in_port_range(dst_port) {
        return None;
    }
    if tcp.get_flags() & TcpFlags::PSH == 0 {
        return None;
    }

    // Ethernet frames may be padded past the IP datagram; trim the payload
    // to the length the IP header declares.
    let header_bytes =
        usize::from(ip.get_header_length()) * 4 + usize::from(tcp.get_data_offset()) * 4;
    let declared = usize::from(ip.get_total_length()).checked_sub(header_bytes)?;
    let payload = tcp.payload();
    let payload = &payload[..declared.min(payload.len())];
    if payload.is_empty() {
        return None;
    }

    Some(TcpPayload {
        source: Endpoint::new(ip.get_source(), src_port),
        destination: Endpoint::new(ip.get_destination(), dst_port),
        payload: Bytes::copy_from_slice(payload),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    /// Hand-build an Ethernet/IPv4/TCP frame around `payload`.
    fn build_frame(
        src: (Ipv4Addr, u16),
        dst: (Ipv4Addr, u16),
        flags: u8,
        payload: &[u8],
        pad: usize,
    ) -> Vec<u8> {
        let mut frame = Vec::new();
        // Ethernet: dst MAC, src MAC, ethertype 0x0800.
        frame.extend_from_slice(&[0u8; 12]);
        frame.extend_from_slice(&[0x08, 0x00]);

        // IPv4 header, 20 bytes, no options.
        let total_length = (20 + 20 + payload.len()) as u16;
        frame.push(0x45);
        frame.push(0);
        frame.extend_from_slice(&total_length.to_be_bytes());
        frame.extend_from_slice(&[0u8; 5]); // id, flags, fragment offset, ttl
        frame[22] = 64; // ttl
        frame.push(6); // protocol: TCP
        frame.extend_from_slice(&[0u8; 2]); // checksum
        frame.extend_from_slice(&src.0.octets());
        frame.extend_from_slice(&dst.0.octets());

        // TCP header, 20 bytes, no options.
        frame.extend_from_slice(&src.1.to_be_bytes());
        frame.extend_from_slice(&dst.1.to_be_bytes());
        frame.extend_from_slice(&[0u8; 8]); // seq, ack
        frame.push(5 << 4); // data offset
        frame.push(flags);
        frame.extend_from_slice(&[0u8; 6]); // window, checksum, urgent

        frame.extend_from_slice(payload);
        frame.extend_from_slice(&vec![0u8; pad]);
        frame
    }

    const CLIENT: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 168, 1, 10), 49152);
    const SERVER: (Ipv4Addr, u16) = (Ipv4Addr::new(204, 2, 229, 9), 55021);

    #[test]
    fn test_port_ranges() {
        assert!(in_port_range(54992));
        assert!(in_port_range(54994));
        assert!(in_port_range(55021));
        assert!(in_port_range(55040));
        assert!(in_port_range(55296));
        assert!(in_port_range(55551));
        assert!(!in_port_range(54995));
        assert!(!in_port_range(55041));
        assert!(!in_port_range(80));
    }

    #[test]
    fn test_extract_psh_payload() {
        let frame = build_frame(CLIENT, SERVER, TcpFlags::PSH | TcpFlags::ACK, b"hello", 0);
        let tp = extract(&frame).unwrap();
        assert_eq!(tp.source.addr, CLIENT.0);
        assert_eq!(tp.source.port, CLIENT.1);
        assert_eq!(tp.destination.port, SERVER.1);
        assert_eq!(&tp.payload[..], b"hello");
    }

    #[test]
    fn test_extract_matches_either_direction() {
        // Server to client: only the source port is in range.
        let frame = build_frame(SERVER, CLIENT, TcpFlags::PSH, b"data", 0);
        assert!(extract(&frame).is_some());
    }

    #[test]
    fn test_extract_skips_non_psh() {
        let frame = build_frame(CLIENT, SERVER, TcpFlags::ACK, b"data", 0);
        assert!(extract(&frame).is_none());
    }

    #[test]
    fn test_extract_skips_unmonitored_ports() {
        let frame = build_frame(
            CLIENT,
            (SERVER.0, 443),
            TcpFlags::PSH,
            b"data",
            0,
        );
        assert!(extract(&frame).is_none());
    }

    #[test]
    fn test_extract_skips_empty_payload() {
        let frame = build_frame(CLIENT, SERVER, TcpFlags::PSH, b"", 0);
        assert!(extract(&frame).is_none());
    }

    #[test]
    fn test_extract_trims_ethernet_padding() {
        let frame = build_frame(CLIENT, SERVER, TcpFlags::PSH, b"exact", 10);
        let tp = extract(&frame).unwrap();
        assert_eq!(&tp.payload[..], b"exact");
    }

    #[test]
    fn test_extract_skips_non_ipv4() {
        let mut frame = build_frame(CLIENT, SERVER, TcpFlags::PSH, b"data", 0);
        frame[12] = 0x86; // ethertype: IPv6
        frame[13] = 0xDD;
        assert!(extract(&frame).is_none());
    }
}
