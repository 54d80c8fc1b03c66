/*!
    Format detection from an exploratory read.
*/

use firewire_device::{ChannelConfigurator, IsoDevice};
use firewire_types::{
    CipHeader, ChannelGeometry, Error, ISO_HEADER_LEN, IsoHeader, Result, StreamFormat,
};

/// Bytes taken by the single exploratory read.
pub const PROBE_READ_LEN: usize = 16 * 1024;

/**
    Classify a raw buffer by the CIP format id of its first packet.
*/
pub fn classify(raw: &[u8]) -> Result<StreamFormat> {
    let iso = IsoHeader::parse(raw)?;
    let cip = CipHeader::parse(&raw[ISO_HEADER_LEN..])?;

    match cip.format() {
        Some(format) => {
            tracing::info!(
                %format,
                channel = iso.channel(),
                fraction_number = cip.fraction_number(),
                "stream format detected"
            );
            Ok(format)
        }
        None => {
            tracing::warn!(
                format_id = cip.format_id(),
                "unrecognized stream format"
            );
            Err(Error::unsupported_format(format!(
                "CIP format id {:#04x}",
                cip.format_id()
            )))
        }
    }
}

/**
    Program the probe geometry and classify one read.

    Leaves the probe geometry applied; the caller reconfigures for the
    detected format.
*/
pub fn probe<D: IsoDevice + ?Sized>(
    device: &mut D,
    configurator: &mut ChannelConfigurator,
) -> Result<StreamFormat> {
    configurator.apply(device, ChannelGeometry::PROBE)?;

    let mut buf = vec![0u8; PROBE_READ_LEN];
    let len = device.read(&mut buf)?;
    if len == 0 {
        return Err(Error::invalid_data("no data received while probing"));
    }
    classify(&buf[..len])
}
