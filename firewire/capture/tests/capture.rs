mod common;

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use firewire_capture::{
    CaptureOptions, CaptureSession, CapturedUnit, Error, LoopExit, SessionState, SinkError,
    StreamFormat, VideoSystem,
};
use firewire_device::{IsoDevice, MemoryDevice};
use firewire_types::{
    BufferGeometry, ChannelGeometry, ChannelSelect, DATA_GROUP_LEN, DSF_FLAG, TS_PACKET_LEN,
};

use common::*;

fn dv_probe() -> Vec<u8> {
    dv_packet(VideoSystem::Ntsc, HEADER, 0)
}

fn ts_probe() -> Vec<u8> {
    ts_packet(3, 0, &[])
}

/// The bytes a frame's packets contribute to the output.
fn payloads(packets: &[Vec<u8>]) -> Vec<u8> {
    packets.iter().flat_map(|p| p[12..].to_vec()).collect()
}

#[test]
fn dv_capture_hands_off_whole_frames() {
    let system = VideoSystem::Ntsc;
    let lead_in: Vec<_> = (0..5).map(|_| dv_packet(system, VIDEO, 0xee)).collect();
    let frame_a = dv_frame(system, 250, 0x11);
    let frame_b = dv_frame(system, 250, 0x22);
    let frame_c = dv_frame(system, 1, 0x33);

    let packets = [lead_in, frame_a.clone(), frame_b.clone(), frame_c].concat();
    let (seen, stats) = run_session(dv_probe(), reads(&packets, 200), CaptureOptions::default());

    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].data, payloads(&frame_a));
    assert_eq!(seen[1].data, payloads(&frame_b));
    for (i, unit) in seen.iter().enumerate() {
        assert_eq!(unit.data.len(), 250 * DATA_GROUP_LEN);
        assert_eq!(unit.sequence, i as u64);
        assert_eq!(unit.system, Some(VideoSystem::Ntsc));
        assert_eq!(unit.timestamp, Duration::from_millis(40));
    }

    assert_eq!(stats.units_delivered, 2);
    assert_eq!(stats.bytes_delivered, 2 * 120_000);
    // The third frame start waits in the demuxer for a fresh destination
    assert_eq!(stats.dv_frames, 2);
    assert_eq!(stats.padded_strides, 0);
    assert_eq!(stats.reads, 3);
    assert_eq!(stats.media_time_us, 2 * 33_366);
}

#[test]
fn dv_capture_pads_short_frames() {
    let system = VideoSystem::Ntsc;
    let short = dv_frame(system, 4, 0x11);
    let full = dv_frame(system, 250, 0x22);
    let next = dv_frame(system, 1, 0x33);

    let packets = [short.clone(), full.clone(), next].concat();
    let (seen, stats) = run_session(dv_probe(), reads(&packets, 100), CaptureOptions::default());

    assert_eq!(seen.len(), 2);
    let first = &seen[0].data;
    assert_eq!(first.len(), 250 * DATA_GROUP_LEN);
    assert_eq!(&first[..4 * DATA_GROUP_LEN], &payloads(&short)[..]);
    assert!(first[4 * DATA_GROUP_LEN..].iter().all(|&b| b == 0xff));
    assert_eq!(seen[1].data, payloads(&full));
    assert_eq!(stats.padded_strides, 246);
}

#[test]
fn pal_capture_latches_system_and_marks_header() {
    let system = VideoSystem::Pal;
    let frame = dv_frame(system, 300, 0x00);
    let packets = [frame, dv_frame(system, 1, 0x00)].concat();
    let (seen, _) = run_session(
        dv_packet(system, HEADER, 0),
        reads(&packets, 200),
        CaptureOptions::default(),
    );

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].system, Some(VideoSystem::Pal));
    assert_eq!(seen[0].data.len(), BufferGeometry::DV.size);
    assert_ne!(seen[0].data[3] & DSF_FLAG, 0);
    // Only the header group of the frame is touched
    assert_eq!(seen[0].data[DATA_GROUP_LEN + 3], 0);
}

#[test]
fn mpeg_capture_emits_aligned_transport_packets() {
    let first = [ts_packet(3, 5, &[0x09]), ts_packet(3, 0, &[0x01, 0x02])].concat();
    let second = ts_packet(3, 8, &[0x03]);
    let (seen, stats) = run_session(ts_probe(), vec![first, second], CaptureOptions::default());

    assert_eq!(seen.len(), 2);
    let a = &seen[0].data;
    assert_eq!(a.len(), 2 * TS_PACKET_LEN);
    assert_eq!((a[0], a[1]), (0x47, 0x01));
    assert_eq!((a[188], a[189]), (0x47, 0x02));
    assert!(!a.contains(&0x09));

    let b = &seen[1].data;
    assert_eq!(b.len(), TS_PACKET_LEN);
    assert_eq!((b[0], b[1]), (0x47, 0x03));
    assert_eq!(seen[1].system, None);
    assert_eq!(stats.transport_packets, 3);
    assert_eq!(stats.media_time_us, 0);
}

#[test]
fn identical_input_gives_identical_output() {
    let system = VideoSystem::Ntsc;
    let packets = [
        dv_frame(system, 120, 0x10),
        dv_frame(system, 250, 0x20),
        dv_frame(system, 7, 0x30),
        dv_frame(system, 1, 0x40),
    ]
    .concat();
    let raw = reads(&packets, 150);

    let (a, stats_a) = run_session(dv_probe(), raw.clone(), CaptureOptions::default());
    let (b, stats_b) = run_session(dv_probe(), raw, CaptureOptions::default());
    assert_eq!(a.len(), 3);
    assert_eq!(a, b);
    assert_eq!(stats_a, stats_b);
}

#[test]
fn unsupported_format_never_captures() {
    let mut probe = dv_probe();
    probe[8] = 0x90; // fmt 0x10
    let (device, handle) = MemoryDevice::with_reads([probe]);
    let mut session = CaptureSession::new(device, CaptureOptions::default());
    session.configure().unwrap();

    let err = session.detect_format().unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert_eq!(session.state(), SessionState::Configured);
    assert_eq!(session.buffer_geometry(), None);
    assert!(session.start(collector().0).is_err());
    assert_eq!(handle.configurations(), vec![ChannelGeometry::PROBE]);
}

#[test]
fn detection_reprograms_full_geometry() {
    let (device, handle) = MemoryDevice::with_reads([ts_probe()]);
    let options = CaptureOptions {
        select: ChannelSelect::new(5, 1),
        pool_count: Some(3),
        ..Default::default()
    };
    let mut session = CaptureSession::new(device, options);
    session.configure().unwrap();
    assert_eq!(session.detect_format().unwrap(), StreamFormat::MpegTs);

    assert_eq!(session.state(), SessionState::FormatDetected(StreamFormat::MpegTs));
    assert_eq!(
        handle.configurations(),
        vec![ChannelGeometry::PROBE, ChannelGeometry::MPEG_TS]
    );
    assert_eq!(handle.select(), Some(ChannelSelect::new(5, 1)));
    assert_eq!(
        session.buffer_geometry(),
        Some(BufferGeometry::MPEG_TS.with_count(3))
    );
}

#[test]
fn not_ready_probe_can_be_retried() {
    let (device, handle) = MemoryDevice::new();
    handle.push_error(io::ErrorKind::WouldBlock);
    handle.push_read(dv_probe());

    let mut session = CaptureSession::new(device, CaptureOptions::default());
    session.configure().unwrap();
    let err = session.detect_format().unwrap_err();
    assert!(err.is_transient());
    assert_eq!(session.state(), SessionState::Configured);
    assert_eq!(session.detect_format().unwrap(), StreamFormat::Dv);
}

#[test]
fn not_ready_reads_are_skipped() {
    let (device, handle) = MemoryDevice::new();
    handle.push_read(ts_probe());
    handle.push_error(io::ErrorKind::WouldBlock);
    handle.push_read(ts_packet(3, 0, &[0x01]));

    let mut session = CaptureSession::new(device, CaptureOptions::default());
    session.configure().unwrap();
    session.detect_format().unwrap();
    let (sink, seen) = collector();
    session.start(sink).unwrap();
    wait_finished(&session);
    let stats = session.stop();

    assert_eq!(stats.not_ready, 1);
    assert_eq!(stats.read_errors, 0);
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(session.exit_reason(), Some(LoopExit::EndOfStream));
}

#[test]
fn repeated_read_errors_end_capture() {
    let (device, handle) = MemoryDevice::new();
    handle.push_read(ts_probe());
    handle.push_error(io::ErrorKind::Other);
    handle.push_read(ts_packet(3, 0, &[0x01]));
    handle.push_error(io::ErrorKind::Other);
    handle.push_error(io::ErrorKind::Other);
    handle.push_read(ts_packet(3, 8, &[0x02]));

    let options = CaptureOptions {
        max_read_errors: 2,
        ..Default::default()
    };
    let mut session = CaptureSession::new(device, options);
    session.configure().unwrap();
    session.detect_format().unwrap();
    let (sink, seen) = collector();
    session.start(sink).unwrap();
    wait_finished(&session);
    let stats = session.stop();

    // A good read in between resets the count
    assert_eq!(stats.read_errors, 3);
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(session.exit_reason(), Some(LoopExit::ReadErrors));
    assert_eq!(handle.pending(), 1);
}

#[test]
fn exhausted_pool_drops_chunks() {
    let (device, handle) = MemoryDevice::with_reads([
        ts_probe(),
        ts_packet(3, 0, &[0x01]),
        ts_packet(3, 8, &[0x02]),
    ]);
    let options = CaptureOptions {
        pool_count: Some(1),
        buffer_timeout: Duration::from_millis(5),
        ..Default::default()
    };
    let mut session = CaptureSession::new(device, options);
    session.configure().unwrap();
    session.detect_format().unwrap();

    // Hold on to every unit so its buffer never comes back
    let held = Arc::new(Mutex::new(Vec::<CapturedUnit>::new()));
    let sink_held = Arc::clone(&held);
    session
        .start(move |unit: CapturedUnit| -> Result<(), SinkError> {
            sink_held.lock().push(unit);
            Ok(())
        })
        .unwrap();
    wait_finished(&session);
    let stats = session.stop();

    assert_eq!(stats.units_delivered, 1);
    assert_eq!(stats.buffer_timeouts, 1);
    assert_eq!(held.lock()[0].data()[1], 0x01);
    assert_eq!(handle.pending(), 0);
}

#[test]
fn refused_units_are_recycled() {
    let (device, _handle) = MemoryDevice::with_reads([
        ts_probe(),
        ts_packet(3, 0, &[0x01]),
        ts_packet(3, 8, &[0x02]),
        ts_packet(3, 16, &[0x03]),
    ]);
    let options = CaptureOptions {
        pool_count: Some(1),
        buffer_timeout: Duration::from_millis(5),
        ..Default::default()
    };
    let mut session = CaptureSession::new(device, options);
    session.configure().unwrap();
    session.detect_format().unwrap();
    session
        .start(|_unit: CapturedUnit| -> Result<(), SinkError> { Err(SinkError::Full) })
        .unwrap();
    wait_finished(&session);
    let stats = session.stop();

    assert_eq!(stats.handoff_failures, 3);
    assert_eq!(stats.units_delivered, 0);
    assert_eq!(stats.buffer_timeouts, 0);
}

#[test]
fn demux_errors_drop_the_chunk_and_continue() {
    let bad = [dv_packet(VideoSystem::Ntsc, HEADER, 0), ts_packet(3, 0, &[0x05])].concat();
    let good = ts_packet(3, 0, &[0x06]);
    let (seen, stats) = run_session(ts_probe(), vec![bad, good], CaptureOptions::default());

    assert_eq!(stats.demux_errors, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].data[1], 0x06);
}

#[test]
fn dv_demux_error_resyncs_on_next_frame() {
    let system = VideoSystem::Ntsc;
    let broken = dv_frame(system, 11, 0x11);
    let tail: Vec<_> = (0..4).map(|_| dv_packet(system, VIDEO, 0xaa)).collect();
    let whole = dv_frame(system, 250, 0x22);

    let first = [
        broken.concat(),
        ts_packet(3, 0, &[0x05]),
        tail.concat(),
    ]
    .concat();
    let second = [tail.concat(), whole.concat(), dv_packet(system, HEADER, 0x33)].concat();
    let (seen, stats) = run_session(dv_probe(), vec![first, second], CaptureOptions::default());

    assert_eq!(stats.demux_errors, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].data.len(), 250 * DATA_GROUP_LEN);
    assert_eq!(seen[0].data, payloads(&whole));
    assert_eq!(seen[0].sequence, 0);
    assert_eq!(stats.padded_strides, 0);
    assert_eq!(stats.media_time_us, 33_366);
}

#[test]
fn unsupported_fraction_number_writes_nothing() {
    let (seen, stats) = run_session(
        ts_probe(),
        vec![ts_packet(2, 0, &[0x01]), ts_packet(3, 0, &[0x02])],
        CaptureOptions::default(),
    );
    assert_eq!(stats.demux_errors, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].data.len(), TS_PACKET_LEN);
    assert_eq!(seen[0].data[1], 0x02);
}

/// Serves one probe packet, then is never ready again.
struct IdleDevice {
    probe: Option<Vec<u8>>,
}

impl IsoDevice for IdleDevice {
    fn configure(
        &mut self,
        _geometry: &ChannelGeometry,
        _select: ChannelSelect,
    ) -> firewire_capture::Result<()> {
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> firewire_capture::Result<usize> {
        if let Some(probe) = self.probe.take() {
            buf[..probe.len()].copy_from_slice(&probe);
            return Ok(probe.len());
        }
        thread::sleep(Duration::from_millis(1));
        Err(io::Error::from(io::ErrorKind::WouldBlock).into())
    }
}

#[test]
fn stop_is_cooperative() {
    let device = IdleDevice {
        probe: Some(dv_probe()),
    };
    let mut session = CaptureSession::new(device, CaptureOptions::default());
    session.configure().unwrap();
    session.detect_format().unwrap();
    session.start(collector().0).unwrap();
    assert_eq!(session.state(), SessionState::Capturing(StreamFormat::Dv));

    thread::sleep(Duration::from_millis(20));
    assert!(!session.is_finished());

    let stats = session.stop();
    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.exit_reason(), Some(LoopExit::Stopped));
    assert!(stats.not_ready > 0);
    assert!(session.into_device().is_some());
}
