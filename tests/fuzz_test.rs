use rand::Rng;
use std::io::Read;

use feed_client::reader::read_frames;
use feed_client::wire::{Frame, FRAME_LEN};
use feed_client::{merge_packets, missing_sequences, Packet, Side};

/// ------------------------------------------------------------
/// Helpers
/// ------------------------------------------------------------

fn random_packet<R: Rng>(rng: &mut R) -> Packet {
    let symbol: String = (0..4)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect();
    let side = match rng.random_range(0..3) {
        0 => Side::Buy,
        1 => Side::Sell,
        _ => Side::Other(rng.random()),
    };
    Packet {
        symbol,
        side: Side::from_u8(side.to_u8()),
        quantity: rng.random(),
        price: rng.random(),
        sequence: rng.random(),
    }
}

/// Reader that returns a random number of bytes per call.
struct RandomChunks<R: Rng> {
    data: Vec<u8>,
    pos: usize,
    rng: R,
}

impl<R: Rng> Read for RandomChunks<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let n = self.rng.random_range(1..=remaining.min(buf.len()));
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// ------------------------------------------------------------
/// Tests
/// ------------------------------------------------------------

#[test]
fn random_packets_survive_encode_decode() {
    let mut rng = rand::rng();
    for _ in 0..1_000 {
        let pkt = random_packet(&mut rng);
        let frame: Frame = pkt.encode();
        assert_eq!(Packet::decode(&frame), pkt);
    }
}

#[test]
fn random_numerics_read_back_big_endian() {
    let mut rng = rand::rng();
    for _ in 0..1_000 {
        let value: i32 = rng.random();
        let mut frame = [0u8; FRAME_LEN];
        frame[13..17].copy_from_slice(&value.to_be_bytes());
        frame[5..9].copy_from_slice(&value.to_be_bytes());
        let pkt = Packet::decode(&frame);
        assert_eq!(pkt.sequence, value);
        assert_eq!(pkt.quantity, value);
    }
}

#[test]
fn random_bytes_never_panic_decode() {
    let mut rng = rand::rng();
    for _ in 0..1_000 {
        let mut frame = [0u8; FRAME_LEN];
        rng.fill(&mut frame[..]);
        let pkt = Packet::decode(&frame);
        assert_eq!(pkt.side.to_u8(), frame[4]);
    }
}

#[test]
fn random_chunking_reassembles_frames() {
    let mut rng = rand::rng();
    for _ in 0..50 {
        let count = rng.random_range(0..40);
        let packets: Vec<Packet> = (0..count).map(|_| random_packet(&mut rng)).collect();
        let data: Vec<u8> = packets.iter().flat_map(|p| p.encode()).collect();
        let mut reader = RandomChunks {
            data,
            pos: 0,
            rng: rand::rng(),
        };

        let frames = read_frames(&mut reader).expect("in-memory read");
        let decoded: Vec<Packet> = frames.iter().map(Packet::decode).collect();
        assert_eq!(decoded, packets);
    }
}

#[test]
fn random_gaps_are_exactly_the_complement() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let high = rng.random_range(1..=300);
        let mut observed: Vec<i32> = (1..high).filter(|_| rng.random_bool(0.7)).collect();
        observed.push(high);

        let gaps = missing_sequences(&observed);
        let missing = &gaps.requestable;
        assert!(missing.iter().all(|s| *s >= 1 && *s < high && *s <= 255));
        assert!(missing.iter().all(|s| !observed.contains(s)));
        assert_eq!(
            missing.len() + gaps.unaddressable as usize + observed.len(),
            high as usize
        );
    }
}

#[test]
fn merge_output_is_strictly_increasing() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let streamed: Vec<Packet> = (0..rng.random_range(0..30))
            .map(|_| {
                let mut p = random_packet(&mut rng);
                p.sequence = rng.random_range(1..50);
                p
            })
            .collect();
        let backfilled: Vec<Packet> = (0..rng.random_range(0..10))
            .map(|_| {
                let mut p = random_packet(&mut rng);
                p.sequence = rng.random_range(1..50);
                p
            })
            .collect();

        let merged = merge_packets(streamed, backfilled);
        assert!(merged.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }
}
