use firewire_types::{ChannelGeometry, ChannelSelect, Result};

use crate::IsoDevice;

/**
    Programs receive geometry and channel selection on a device.

    Remembers what was last applied so callers can query the current
    read size, and so that applying the same geometry twice is a no-op.
*/
#[derive(Clone, Debug)]
pub struct ChannelConfigurator {
    select: ChannelSelect,
    applied: Option<ChannelGeometry>,
}

impl ChannelConfigurator {
    pub fn new(select: ChannelSelect) -> Self {
        Self {
            select,
            applied: None,
        }
    }

    /**
        Program `geometry` on the device.

        Validates both geometry and selectors first; nothing is sent to
        the device if either is out of range.
    */
    pub fn apply<D: IsoDevice + ?Sized>(
        &mut self,
        device: &mut D,
        geometry: ChannelGeometry,
    ) -> Result<()> {
        if self.applied == Some(geometry) {
            return Ok(());
        }
        geometry.validate()?;
        self.select.validate()?;

        device.configure(&geometry, self.select)?;
        tracing::debug!(
            channel = self.select.channel,
            tag = self.select.tag,
            chunks = geometry.chunks,
            packets = geometry.packets,
            packet_size = geometry.packet_size,
            "receive buffer configured"
        );
        self.applied = Some(geometry);
        Ok(())
    }

    /**
        The geometry currently programmed, if any.
    */
    pub fn geometry(&self) -> Option<ChannelGeometry> {
        self.applied
    }

    pub fn select(&self) -> ChannelSelect {
        self.select
    }

    /**
        Bytes returned by one full read with the current geometry.
    */
    pub fn read_len(&self) -> Option<usize> {
        self.applied.map(|g| g.read_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDevice;
    use firewire_types::Error;

    #[test]
    fn apply_programs_device() {
        let (mut device, handle) = MemoryDevice::new();
        let mut cfg = ChannelConfigurator::new(ChannelSelect::default());
        cfg.apply(&mut device, ChannelGeometry::DV).unwrap();

        assert_eq!(cfg.geometry(), Some(ChannelGeometry::DV));
        assert_eq!(cfg.read_len(), Some(131_072));
        assert_eq!(handle.configurations(), vec![ChannelGeometry::DV]);
    }

    #[test]
    fn same_geometry_is_applied_once() {
        let (mut device, handle) = MemoryDevice::new();
        let mut cfg = ChannelConfigurator::new(ChannelSelect::default());
        cfg.apply(&mut device, ChannelGeometry::PROBE).unwrap();
        cfg.apply(&mut device, ChannelGeometry::PROBE).unwrap();
        cfg.apply(&mut device, ChannelGeometry::MPEG_TS).unwrap();

        assert_eq!(
            handle.configurations(),
            vec![ChannelGeometry::PROBE, ChannelGeometry::MPEG_TS]
        );
    }

    #[test]
    fn bad_selector_never_reaches_device() {
        let (mut device, handle) = MemoryDevice::new();
        let mut cfg = ChannelConfigurator::new(ChannelSelect::new(99, 1));
        let err = cfg.apply(&mut device, ChannelGeometry::DV).unwrap_err();

        assert!(matches!(err, Error::ConfigurationFailed { .. }));
        assert!(handle.configurations().is_empty());
        assert_eq!(cfg.geometry(), None);
    }

    #[test]
    fn device_failure_is_reported() {
        let (mut device, handle) = MemoryDevice::new();
        handle.fail_configuration(true);
        let mut cfg = ChannelConfigurator::new(ChannelSelect::default());

        assert!(cfg.apply(&mut device, ChannelGeometry::DV).is_err());
        assert_eq!(cfg.geometry(), None);
    }
}
