//! Bit partitioning of a 64-bit Snowflake ID.
//!
//! The ID is packed from **MSB to LSB**. The sign bit is always zero and the
//! timestamp takes whatever the other three fields leave of the remaining 63
//! bits:
//!
//! ```text
//!  Bit Index:  63     62                                                   0
//!              +------+-----------+----------------+------------+----------+
//!  Field:      | sign | timestamp | datacenter (D) | worker (W) | sequence |
//!              +------+-----------+----------------+------------+----------+
//!              |<------------- MSB ------- 64 bits ------- LSB ----------->|
//! ```
//!
//! The default layout is 41/5/5/12.

use crate::{ConfigField, Error, Result};

/// Number of bits available to the four fields. The sign bit is never set.
pub const USABLE_BITS: u32 = 63;

/// Widths of the datacenter, worker and sequence fields, plus the shifts and
/// masks derived from them.
///
/// # Example
///
/// ```
/// use flakeid::BitLayout;
///
/// let layout = BitLayout::default();
/// assert_eq!(layout.timestamp_bits(), 41);
/// assert_eq!(layout.timestamp_shift(), 22);
///
/// let id = layout.encode(1_000, 3, 7, 42);
/// let parts = layout.decode(id);
/// assert_eq!((parts.datacenter_id, parts.worker_id, parts.sequence), (3, 7, 42));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBitLayout"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    worker_bits: u32,
    datacenter_bits: u32,
    sequence_bits: u32,
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitLayout {
    /// 5 worker bits, 5 datacenter bits, 12 sequence bits.
    pub const DEFAULT: Self = Self {
        worker_bits: 5,
        datacenter_bits: 5,
        sequence_bits: 12,
    };

    /// Creates a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for [`ConfigField::Layout`] if the widths
    /// sum to more than [`USABLE_BITS`].
    pub fn new(worker_bits: u32, datacenter_bits: u32, sequence_bits: u32) -> Result<Self> {
        let total = u64::from(worker_bits) + u64::from(datacenter_bits) + u64::from(sequence_bits);
        if total > u64::from(USABLE_BITS) {
            return Err(Error::config(
                ConfigField::Layout,
                format!(
                    "worker ({worker_bits}) + datacenter ({datacenter_bits}) + sequence \
                     ({sequence_bits}) bits exceed {USABLE_BITS}"
                ),
            ));
        }
        Ok(Self {
            worker_bits,
            datacenter_bits,
            sequence_bits,
        })
    }

    /// Width of the worker field.
    pub const fn worker_bits(&self) -> u32 {
        self.worker_bits
    }

    /// Width of the datacenter field.
    pub const fn datacenter_bits(&self) -> u32 {
        self.datacenter_bits
    }

    /// Width of the per-millisecond sequence.
    pub const fn sequence_bits(&self) -> u32 {
        self.sequence_bits
    }

    /// Bits left over for the relative timestamp.
    pub const fn timestamp_bits(&self) -> u32 {
        USABLE_BITS - self.timestamp_shift()
    }

    /// Left shift applied to the worker ID (`S`).
    pub const fn worker_shift(&self) -> u32 {
        self.sequence_bits
    }

    /// Left shift applied to the datacenter ID (`S + W`).
    pub const fn datacenter_shift(&self) -> u32 {
        self.sequence_bits + self.worker_bits
    }

    /// Left shift applied to the relative timestamp (`S + W + D`).
    pub const fn timestamp_shift(&self) -> u32 {
        self.sequence_bits + self.worker_bits + self.datacenter_bits
    }

    /// Largest worker ID the layout can hold (`2^W - 1`).
    pub const fn max_worker_id(&self) -> u64 {
        mask(self.worker_bits)
    }

    /// Largest datacenter ID the layout can hold (`2^D - 1`).
    pub const fn max_datacenter_id(&self) -> u64 {
        mask(self.datacenter_bits)
    }

    /// Largest sequence value, also the mask applied on increment.
    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Largest relative timestamp (milliseconds past the epoch) that fits.
    pub const fn max_timestamp(&self) -> u64 {
        mask(self.timestamp_bits())
    }

    /// Packs the four fields into an ID. Each value is truncated to its
    /// field width.
    pub const fn encode(
        &self,
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> u64 {
        let timestamp = (timestamp & self.max_timestamp()) << self.timestamp_shift();
        let datacenter_id = (datacenter_id & self.max_datacenter_id()) << self.datacenter_shift();
        let worker_id = (worker_id & self.max_worker_id()) << self.worker_shift();
        let sequence = sequence & self.max_sequence();
        timestamp | datacenter_id | worker_id | sequence
    }

    /// Splits an ID into its fields. The timestamp is relative to whatever
    /// epoch the ID was minted against.
    pub const fn decode(&self, id: u64) -> IdParts {
        IdParts {
            timestamp: (id >> self.timestamp_shift()) & self.max_timestamp(),
            datacenter_id: (id >> self.datacenter_shift()) & self.max_datacenter_id(),
            worker_id: (id >> self.worker_shift()) & self.max_worker_id(),
            sequence: id & self.max_sequence(),
        }
    }
}

const fn mask(bits: u32) -> u64 {
    if bits == 0 { 0 } else { u64::MAX >> (64 - bits) }
}

/// The fields of a decoded ID.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdParts {
    /// Milliseconds, either relative to the epoch ([`BitLayout::decode`]) or
    /// since the Unix epoch ([`crate::IdGenerator::decode`]).
    pub timestamp: u64,
    /// Datacenter field.
    pub datacenter_id: u64,
    /// Worker field.
    pub worker_id: u64,
    /// Position within the millisecond.
    pub sequence: u64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawBitLayout {
    worker_bits: u32,
    datacenter_bits: u32,
    sequence_bits: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBitLayout> for BitLayout {
    type Error = Error;

    fn try_from(raw: RawBitLayout) -> Result<Self> {
        Self::new(raw.worker_bits, raw.datacenter_bits, raw.sequence_bits)
    }
}
