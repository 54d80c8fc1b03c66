use firewire_types::{ChannelGeometry, ChannelSelect, Result};

/**
    A handle to an isochronous receive context.

    Reads are blocking. A read that finds no data ready fails with an
    I/O error of kind `WouldBlock`; see [`Error::is_transient`]. A read of
    zero bytes means the device has no more data and never will.

    [`Error::is_transient`]: firewire_types::Error::is_transient
*/
pub trait IsoDevice: Send {
    /**
        Program the receive buffer geometry and channel selection.

        Must be callable again with a different geometry.
    */
    fn configure(&mut self, geometry: &ChannelGeometry, select: ChannelSelect) -> Result<()>;

    /**
        Read whole packets into `buf`, returning the number of bytes filled.
    */
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<D: IsoDevice + ?Sized> IsoDevice for Box<D> {
    fn configure(&mut self, geometry: &ChannelGeometry, select: ChannelSelect) -> Result<()> {
        (**self).configure(geometry, select)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }
}
