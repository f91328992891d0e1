//! Time-ordered 64-bit Snowflake IDs.
//!
//! An [`IdGenerator`] mints IDs that pack a millisecond timestamp, a
//! datacenter ID, a worker ID and a per-millisecond sequence into one `u64`
//! (sign bit always zero). IDs from one generator are unique and strictly
//! increasing. Independent generators stay unique as long as no two share a
//! `(datacenter_id, worker_id)` pair.
//!
//! ```
//! use flakeid::IdGenerator;
//!
//! let generator = IdGenerator::new(3, 1).unwrap();
//! let id = generator.next_id().unwrap();
//!
//! let parts = generator.decode(id);
//! assert_eq!(parts.worker_id, 3);
//! assert_eq!(parts.datacenter_id, 1);
//! ```
//!
//! ## Features
//!
//! - `parking-lot`: use `parking_lot::Mutex`, which cannot poison.
//! - `cache-padded`: pad the generator state to a cache line.
//! - `serde`: `Serialize`/`Deserialize` for [`BitLayout`] and [`IdParts`].
//! - `tracing`: trace spans and clock-regression warnings.

mod error;
mod generator;
mod layout;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::time::*;
