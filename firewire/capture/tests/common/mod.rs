#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use firewire_capture::{
    CaptureOptions, CaptureSession, CapturedUnit, Clock, SinkError, StatsSnapshot,
};
use firewire_device::MemoryDevice;
use firewire_types::{
    CIP_HEADER_LEN, CipHeader, DATA_GROUP_LEN, DifBlock, IsoHeader, SOURCE_PACKET_LEN,
    SourcePacketHeader, TS_PACKET_LEN, VideoSystem,
};

pub const HEADER: u8 = 0;
pub const VIDEO: u8 = 4;

pub fn packet(cip: CipHeader, payload: &[u8]) -> Vec<u8> {
    let len = (CIP_HEADER_LEN + payload.len()) as u16;
    let mut p = IsoHeader::new(len, 63, 1).to_bytes().to_vec();
    p.extend_from_slice(&cip.to_bytes());
    p.extend_from_slice(payload);
    p
}

pub fn group(section: u8, sequence: u8, fill: u8) -> Vec<u8> {
    let mut g = vec![fill; DATA_GROUP_LEN];
    let id = DifBlock::encode_id(section, sequence, 0);
    g[..3].copy_from_slice(&id[..3]);
    g
}

pub fn dv_packet(system: VideoSystem, section: u8, fill: u8) -> Vec<u8> {
    packet(CipHeader::dv(0, system), &group(section, 0, fill))
}

/**
    Packets of one DV frame: a header group followed by `groups - 1` video
    groups, all filled with `fill`.
*/
pub fn dv_frame(system: VideoSystem, groups: usize, fill: u8) -> Vec<Vec<u8>> {
    let mut packets = vec![dv_packet(system, HEADER, fill)];
    packets.extend((1..groups).map(|_| dv_packet(system, VIDEO, fill)));
    packets
}

pub fn ts_packet(fraction_number: u8, dbc: u8, units: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(units.len() * SOURCE_PACKET_LEN);
    for (i, fill) in units.iter().enumerate() {
        payload.extend_from_slice(&SourcePacketHeader::new(i as u16, 0x123).to_bytes());
        let mut ts = [*fill; TS_PACKET_LEN];
        ts[0] = 0x47;
        payload.extend_from_slice(&ts);
    }
    packet(CipHeader::mpeg_ts(fraction_number, dbc), &payload)
}

/**
    Concatenate packets into raw reads of at most `per_read` packets.
*/
pub fn reads(packets: &[Vec<u8>], per_read: usize) -> Vec<Vec<u8>> {
    packets.chunks(per_read).map(|c| c.concat()).collect()
}

/// What a test sink saw of one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seen {
    pub sequence: u64,
    pub system: Option<VideoSystem>,
    pub timestamp: Duration,
    pub data: Vec<u8>,
}

/**
    A sink that copies every unit and lets the buffer go straight back.
*/
pub fn collector() -> (
    impl FnMut(CapturedUnit) -> Result<(), SinkError> + Send + 'static,
    Arc<Mutex<Vec<Seen>>>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let sink = move |unit: CapturedUnit| -> Result<(), SinkError> {
        sink_seen.lock().push(Seen {
            sequence: unit.sequence,
            system: unit.system,
            timestamp: unit.timestamp,
            data: unit.data().to_vec(),
        });
        Ok(())
    };
    (sink, seen)
}

pub struct FixedClock(pub Duration);

impl Clock for FixedClock {
    fn elapsed(&self) -> Duration {
        self.0
    }
}

/**
    Wait for the capture thread to run out of scripted reads.
*/
pub fn wait_finished(session: &CaptureSession<MemoryDevice>) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !session.is_finished() {
        assert!(Instant::now() < deadline, "capture thread did not finish");
        std::thread::sleep(Duration::from_millis(1));
    }
}

/**
    Run a whole session over `probe` followed by `capture` reads.
*/
pub fn run_session(
    probe: Vec<u8>,
    capture: Vec<Vec<u8>>,
    options: CaptureOptions,
) -> (Vec<Seen>, StatsSnapshot) {
    let (device, handle) = MemoryDevice::with_reads(std::iter::once(probe).chain(capture));
    let mut session = CaptureSession::new(device, options)
        .with_clock(Arc::new(FixedClock(Duration::from_millis(40))));
    session.configure().unwrap();
    session.detect_format().unwrap();

    let (sink, seen) = collector();
    session.start(sink).unwrap();
    wait_finished(&session);
    let stats = session.stop();
    assert_eq!(handle.pending(), 0);

    let seen = seen.lock().clone();
    (seen, stats)
}
