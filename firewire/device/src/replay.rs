use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use firewire_types::{
    CIP_HEADER_LEN, ChannelGeometry, ChannelSelect, Error, ISO_HEADER_LEN, IsoHeader, Result,
};

use crate::IsoDevice;

/**
    A device that plays back a raw packet dump.

    The dump is the byte stream a receive context produces: packets back
    to back, each a link header followed by `data_length` bytes. Reads
    return whole packets only, never more than one configured chunk, and
    skip packets addressed to other channels. Packets shorter than a CIP
    header are zero-filled to one, matching the stride a receive buffer
    gives them.
*/
pub struct ReplayDevice {
    path: PathBuf,
    reader: BufReader<File>,
    geometry: Option<ChannelGeometry>,
    select: ChannelSelect,
    carry: Vec<u8>,
    eof: bool,
}

impl ReplayDevice {
    /**
        Open a dump file for playback.
    */
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path,
            reader: BufReader::new(file),
            geometry: None,
            select: ChannelSelect::default(),
            carry: Vec::new(),
            eof: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /**
        Read the next packet from the file into `self.carry`.

        Returns false at the end of the file.
    */
    fn next_packet(&mut self) -> Result<bool> {
        loop {
            let mut header = [0u8; ISO_HEADER_LEN];
            match self.reader.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(false),
                Err(e) => return Err(e.into()),
            }
            let iso = IsoHeader::parse(&header)?;

            self.carry.clear();
            self.carry.extend_from_slice(&header);
            self.carry.resize(ISO_HEADER_LEN + iso.data_length(), 0);
            match self.reader.read_exact(&mut self.carry[ISO_HEADER_LEN..]) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    tracing::warn!(path = %self.path.display(), "dump ends inside a packet");
                    self.carry.clear();
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            }
            if iso.data_length() < CIP_HEADER_LEN {
                self.carry.resize(ISO_HEADER_LEN + CIP_HEADER_LEN, 0);
            }

            if iso.channel() == self.select.channel {
                return Ok(true);
            }
            tracing::trace!(channel = iso.channel(), "skipping packet for another channel");
        }
    }
}

impl IsoDevice for ReplayDevice {
    fn configure(&mut self, geometry: &ChannelGeometry, select: ChannelSelect) -> Result<()> {
        geometry.validate()?;
        select.validate()?;
        self.geometry = Some(*geometry);
        self.select = select;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let geometry = self
            .geometry
            .ok_or_else(|| Error::invalid_state("read before the receive buffer was configured"))?;
        let limit = buf.len().min(geometry.read_len());

        let mut filled = 0;
        loop {
            if self.carry.is_empty() {
                if self.eof || !self.next_packet()? {
                    self.eof = true;
                    break;
                }
            }
            let len = self.carry.len();
            if filled + len > limit {
                if filled == 0 {
                    tracing::warn!(len, limit, "dropping packet larger than one read");
                    self.carry.clear();
                    continue;
                }
                break;
            }
            buf[filled..filled + len].copy_from_slice(&self.carry);
            filled += len;
            self.carry.clear();
        }
        Ok(filled)
    }
}
