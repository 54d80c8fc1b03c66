/*!
    DV DIF block accessors.

    A DV payload is a sequence of 80-byte DIF blocks. Six blocks form the
    480-byte data group carried by one isochronous packet. The three ID
    bytes at the start of each block are laid out as:

    ```text
    byte 0:  sct:3 rsv:1 arb:4
    byte 1:  dseq:4 fsc:1 rsv:3
    byte 2:  dbn:8
    ```
*/

/// Size of one DIF block.
pub const DIF_BLOCK_LEN: usize = 80;

/// DIF blocks in one data group.
pub const DIF_BLOCKS_PER_GROUP: usize = 6;

/// Size of one data group, the unit copied into frames.
pub const DATA_GROUP_LEN: usize = DIF_BLOCK_LEN * DIF_BLOCKS_PER_GROUP;

/// DSF flag in the first payload byte of a header block (set for 625/50).
pub const DSF_FLAG: u8 = 0x80;

/// Offset of the first payload byte inside a DIF block.
const PAYLOAD_OFFSET: usize = 3;

/**
    DIF block section type.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionType {
    Header,
    Subcode,
    Vaux,
    Audio,
    Video,
    Reserved(u8),
}

impl SectionType {
    /**
        Decode the three-bit section type value.
    */
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x7 {
            0 => Self::Header,
            1 => Self::Subcode,
            2 => Self::Vaux,
            3 => Self::Audio,
            4 => Self::Video,
            other => Self::Reserved(other),
        }
    }
}

/**
    A read-only view of the ID bytes of a DIF block.

    Only the first block of a data group is inspected when framing, so
    the view borrows whatever slice the caller has and reads the fixed
    offsets from its start.
*/
#[derive(Clone, Copy, Debug)]
pub struct DifBlock<'a> {
    bytes: &'a [u8],
}

impl<'a> DifBlock<'a> {
    /**
        Wrap the start of a data group. Returns `None` if the slice is
        shorter than one block.
    */
    pub fn new(bytes: &'a [u8]) -> Option<Self> {
        (bytes.len() >= DIF_BLOCK_LEN).then_some(Self { bytes })
    }

    /// Section type, top three bits of byte 0.
    #[inline]
    pub fn section_type(&self) -> SectionType {
        SectionType::from_bits(self.bytes[0] >> 5)
    }

    /// Arbitrary bits, low nibble of byte 0.
    #[inline]
    pub fn arbitrary(&self) -> u8 {
        self.bytes[0] & 0x0f
    }

    /// DIF sequence number, top nibble of byte 1.
    #[inline]
    pub fn sequence(&self) -> u8 {
        self.bytes[1] >> 4
    }

    /// FSC bit, bit 3 of byte 1.
    #[inline]
    pub fn fsc(&self) -> bool {
        self.bytes[1] & 0x08 != 0
    }

    /// DIF block number.
    #[inline]
    pub fn block_number(&self) -> u8 {
        self.bytes[2]
    }

    /// First payload byte (the DSF byte in header blocks).
    #[inline]
    pub fn payload_first(&self) -> u8 {
        self.bytes[PAYLOAD_OFFSET]
    }

    /**
        True for the header block of DIF sequence 0, which starts a frame.
    */
    #[inline]
    pub fn is_frame_start(&self) -> bool {
        self.section_type() == SectionType::Header && self.sequence() == 0
    }

    /**
        True if the DSF flag is set in the first payload byte.
    */
    #[inline]
    pub fn has_dsf(&self) -> bool {
        self.payload_first() & DSF_FLAG != 0
    }

    /**
        Set the DSF flag on a copied block in place.

        Returns true if the byte was changed.
    */
    pub fn force_dsf(block: &mut [u8]) -> bool {
        match block.get_mut(PAYLOAD_OFFSET) {
            Some(b) if *b & DSF_FLAG == 0 => {
                *b |= DSF_FLAG;
                true
            }
            _ => false,
        }
    }

    /**
        Build the ID bytes for a block. Remaining bytes are left zero.
    */
    pub fn encode_id(section: u8, sequence: u8, block_number: u8) -> [u8; DIF_BLOCK_LEN] {
        let mut block = [0u8; DIF_BLOCK_LEN];
        block[0] = ((section & 0x7) << 5) | 0x0f;
        block[1] = ((sequence & 0xf) << 4) | 0x07;
        block[2] = block_number;
        block
    }
}
