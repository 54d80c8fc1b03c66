use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crossbeam_channel::Receiver;

use firewire_capture::CapturedUnit;

/**
    Write every unit received on `units` to `path`, in order.

    Returns once all senders are gone. Each unit's buffer goes back to
    its pool as soon as it has been written.
*/
pub fn write_units(path: &Path, units: Receiver<CapturedUnit>) -> io::Result<u64> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut written = 0u64;
    for unit in units {
        writer.write_all(unit.data())?;
        written += unit.len() as u64;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use firewire_capture::{BufferGeometry, BufferPool, ChannelSink, FrameSink, StreamFormat};

    #[test]
    fn units_are_concatenated() {
        let pool = BufferPool::new(BufferGeometry { size: 8, count: 2 });
        let (mut sink, rx) = ChannelSink::bounded(4);
        for (sequence, bytes) in [&b"abc"[..], &b"defg"[..]].into_iter().enumerate() {
            let mut buffer = pool.acquire(Duration::ZERO).unwrap();
            buffer.append(bytes).unwrap();
            buffer.mark_complete();
            sink.deliver(CapturedUnit {
                buffer,
                format: StreamFormat::MpegTs,
                system: None,
                sequence: sequence as u64,
                timestamp: Duration::ZERO,
            })
            .unwrap();
        }
        drop(sink);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ts");
        assert_eq!(write_units(&path, rx).unwrap(), 7);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcdefg");
        assert_eq!(pool.available(), 2);
    }
}
