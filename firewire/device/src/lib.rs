/*!
    Isochronous receive devices and channel configuration.

    The capture engine talks to hardware through the [`IsoDevice`] trait:
    program a receive buffer and channel, then read raw packet runs. This
    crate provides that boundary plus two implementations that need no
    hardware:

    - [`ReplayDevice`] - Plays back a raw packet dump recorded from a bus
    - [`MemoryDevice`] - Returns scripted reads, for tests and tools

    [`ChannelConfigurator`] owns the channel selection and re-programs the
    device whenever the geometry changes between the exploratory read and
    the full capture.
*/

mod channel;
mod device;
mod memory;
mod replay;

pub use channel::ChannelConfigurator;
pub use device::IsoDevice;
pub use memory::{MemoryDevice, MemoryDeviceHandle, ScriptedRead};
pub use replay::ReplayDevice;

pub use firewire_types::{ChannelGeometry, ChannelSelect, Error, Result};
