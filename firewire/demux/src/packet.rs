use firewire_types::{CIP_HEADER_LEN, CipHeader, ISO_HEADER_LEN, IsoHeader};

use crate::DemuxError;

const HEADERS_LEN: usize = ISO_HEADER_LEN + CIP_HEADER_LEN;

/**
    One packet at the start of a raw buffer.
*/
#[derive(Clone, Copy, Debug)]
pub struct RawPacket<'a> {
    pub iso: IsoHeader,
    pub cip: CipHeader,
    /// Bytes after the CIP header, empty if the packet has none.
    pub payload: &'a [u8],
}

impl<'a> RawPacket<'a> {
    /**
        Parse the packet at the start of `raw`.

        The declared payload must be present in full; a packet cut off by
        the end of the buffer is reported as truncated.
    */
    pub fn parse(raw: &'a [u8]) -> Result<Self, DemuxError> {
        if raw.len() < HEADERS_LEN {
            return Err(DemuxError::Truncated {
                needed: HEADERS_LEN,
                have: raw.len(),
            });
        }
        let truncated = |_| DemuxError::Truncated {
            needed: HEADERS_LEN,
            have: raw.len(),
        };
        let iso = IsoHeader::parse(raw).map_err(truncated)?;
        let cip = CipHeader::parse(&raw[ISO_HEADER_LEN..]).map_err(truncated)?;

        let payload = if iso.data_length() > CIP_HEADER_LEN {
            let end = ISO_HEADER_LEN + iso.data_length();
            raw.get(HEADERS_LEN..end)
                .ok_or(DemuxError::Truncated {
                    needed: end,
                    have: raw.len(),
                })?
        } else {
            &[]
        };
        Ok(Self { iso, cip, payload })
    }

    /**
        Whether the packet carries anything past its CIP header.
    */
    #[inline]
    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }

    /**
        Bytes this packet occupies in the raw buffer.
    */
    #[inline]
    pub fn wire_len(&self) -> usize {
        ISO_HEADER_LEN + self.iso.data_length().max(CIP_HEADER_LEN)
    }
}
