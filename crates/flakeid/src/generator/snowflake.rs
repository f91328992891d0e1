use core::{cmp::Ordering, time::Duration};

use portable_atomic::AtomicU64;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, ConfigField, DEFAULT_EPOCH, Error, IdParts, Result, SystemClock, TimeSource,
    generator::{Mutex, MutexGuard, Poll},
};

/// Mutable generation state. Only ever touched while holding the lock.
#[derive(Debug, Default)]
pub(crate) struct State {
    /// Timestamp of the most recent ID in milliseconds since the Unix epoch,
    /// or `None` before the first ID.
    last_timestamp: Option<u64>,
    sequence: u64,
}

/// A thread-safe Snowflake ID generator for one worker in one datacenter.
///
/// Each ID packs the milliseconds elapsed since the generator epoch, the
/// datacenter ID, the worker ID and a per-millisecond sequence according to
/// a [`BitLayout`]. The clock read and the state update happen together
/// under one lock, so concurrent callers sharing an instance never observe
/// the same `(timestamp, sequence)` pair.
///
/// Clock behaviour:
/// - Same millisecond as the last ID: the sequence advances. Once it is
///   exhausted, [`Self::next_id`] waits for the clock to tick over.
/// - Later millisecond: the sequence restarts at zero.
/// - Earlier millisecond: generation fails with
///   [`Error::ClockMovedBackwards`]. There is no tolerance window.
///
/// # Example
///
/// ```
/// use flakeid::IdGenerator;
///
/// let generator = IdGenerator::new(1, 2).unwrap();
/// let first = generator.next_id().unwrap();
/// let second = generator.next_id().unwrap();
///
/// assert!(second > first);
/// assert_eq!(generator.decode(first).worker_id, 1);
/// assert_eq!(generator.decode(first).datacenter_id, 2);
/// assert_eq!(generator.ids_generated(), 2);
/// ```
#[derive(Debug)]
pub struct IdGenerator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    ids_generated: AtomicU64,
    worker_id: u64,
    datacenter_id: u64,
    layout: BitLayout,
    epoch: u64,
    time: T,
}

impl IdGenerator<SystemClock> {
    /// Creates a generator with the default 5/5/12 layout, the
    /// [`DEFAULT_EPOCH`] and the system wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `worker_id` or `datacenter_id` is larger
    /// than 31.
    pub fn new(worker_id: u64, datacenter_id: u64) -> Result<Self> {
        Self::with_layout(worker_id, datacenter_id, BitLayout::DEFAULT, SystemClock)
    }
}

impl<T> IdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator with a custom layout and time source, using the
    /// [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either identifier does not fit its field
    /// in `layout`.
    pub fn with_layout(
        worker_id: u64,
        datacenter_id: u64,
        layout: BitLayout,
        time: T,
    ) -> Result<Self> {
        Self::from_components(worker_id, datacenter_id, layout, DEFAULT_EPOCH, time)
    }

    /// Creates a generator with every parameter explicit.
    ///
    /// # Parameters
    ///
    /// - `worker_id`: must be at most [`BitLayout::max_worker_id`].
    /// - `datacenter_id`: must be at most [`BitLayout::max_datacenter_id`].
    /// - `layout`: field widths for every ID this generator mints.
    /// - `epoch`: origin of the encoded timestamp, as a [`Duration`] since
    ///   1970-01-01 UTC. Fixed for the life of the generator.
    /// - `time`: the [`TimeSource`] read on every generation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending field if an identifier
    /// does not fit the layout or the epoch does not fit in a `u64` of
    /// milliseconds. No generator is created in that case.
    pub fn from_components(
        worker_id: u64,
        datacenter_id: u64,
        layout: BitLayout,
        epoch: Duration,
        time: T,
    ) -> Result<Self> {
        if worker_id > layout.max_worker_id() {
            return Err(Error::config(
                ConfigField::WorkerId,
                format!(
                    "worker id can't be greater than {} or less than 0, got {worker_id}",
                    layout.max_worker_id()
                ),
            ));
        }
        if datacenter_id > layout.max_datacenter_id() {
            return Err(Error::config(
                ConfigField::DatacenterId,
                format!(
                    "datacenter id can't be greater than {} or less than 0, got {datacenter_id}",
                    layout.max_datacenter_id()
                ),
            ));
        }
        let epoch = u64::try_from(epoch.as_millis()).map_err(|_| {
            Error::config(ConfigField::Epoch, "epoch milliseconds overflow a u64")
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            worker_id,
            datacenter_id,
            epoch,
            timestamp_bits = layout.timestamp_bits(),
            sequence_bits = layout.sequence_bits(),
            "id generator created"
        );

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(State::default())),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(State::default()),
            ids_generated: AtomicU64::new(0),
            worker_id,
            datacenter_id,
            layout,
            epoch,
            time,
        })
    }

    /// Generates the next ID, blocking while the sequence for the current
    /// millisecond is exhausted.
    ///
    /// The thread yields between attempts. Use [`Self::next_id_with`] to
    /// choose a different wait, or [`Self::poll_id`] to never block.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackwards`] if the clock reads earlier than the
    ///   last ID's timestamp, including while waiting out an exhausted
    ///   sequence.
    /// - [`Error::TimestampOutOfRange`] if the clock cannot be encoded
    ///   relative to the epoch.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only).
    ///
    /// No ID is consumed and no state changes when an error is returned.
    pub fn next_id(&self) -> Result<u64> {
        self.next_id_with(|_| std::thread::yield_now())
    }

    /// Generates the next ID, calling `wait` with the millisecond to resume
    /// at each time the sequence is exhausted.
    ///
    /// There is no timeout: the call returns only once an ID is minted or an
    /// error occurs.
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::IdGenerator;
    ///
    /// let generator = IdGenerator::new(0, 0).unwrap();
    /// let id = generator
    ///     .next_id_with(|_| std::thread::sleep(std::time::Duration::from_micros(100)))
    ///     .unwrap();
    /// assert_eq!(generator.decode(id).worker_id, 0);
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    pub fn next_id_with(&self, mut wait: impl FnMut(u64)) -> Result<u64> {
        loop {
            match self.poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_until } => wait(yield_until),
            }
        }
    }

    /// Attempts a single generation without blocking.
    ///
    /// Reads the clock and updates the state as one atomic step under the
    /// lock.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: a new ID was minted
    /// - `Ok(Poll::Pending { yield_until })`: the sequence is exhausted for
    ///   this millisecond; nothing changed
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<Poll> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();

        let sequence = match state.last_timestamp {
            None => 0,
            Some(last) => match now.cmp(&last) {
                Ordering::Equal => {
                    if state.sequence < self.layout.max_sequence() {
                        state.sequence + 1
                    } else {
                        return Ok(Self::cold_sequence_exhausted(last));
                    }
                }
                Ordering::Greater => 0,
                Ordering::Less => return Err(Self::cold_clock_behind(last, now)),
            },
        };
        let timestamp = self.relative_timestamp(now)?;

        state.last_timestamp = Some(now);
        state.sequence = sequence;
        self.ids_generated.fetch_add(1, portable_atomic::Ordering::Relaxed);

        Ok(Poll::Ready {
            id: self
                .layout
                .encode(timestamp, self.datacenter_id, self.worker_id, sequence),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    fn relative_timestamp(&self, now: u64) -> Result<u64> {
        now.checked_sub(self.epoch)
            .filter(|ts| *ts <= self.layout.max_timestamp())
            .ok_or(Error::TimestampOutOfRange {
                timestamp: now,
                epoch: self.epoch,
            })
    }

    #[cold]
    #[inline(never)]
    fn cold_sequence_exhausted(last: u64) -> Poll {
        #[cfg(feature = "tracing")]
        tracing::trace!(last_timestamp = last, "sequence exhausted");
        Poll::Pending {
            yield_until: last.saturating_add(1),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last: u64, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            last_timestamp = last,
            now,
            drift = last - now,
            "clock moved backwards"
        );
        Error::ClockMovedBackwards {
            last_timestamp: last,
            now,
        }
    }

    /// Worker identifier encoded into every ID.
    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Datacenter identifier encoded into every ID.
    pub fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// Current clock reading in milliseconds since the Unix epoch. This is
    /// not the timestamp of the last ID.
    pub fn timestamp(&self) -> u64 {
        self.time.current_millis()
    }

    /// Number of IDs minted so far.
    pub fn ids_generated(&self) -> u64 {
        self.ids_generated.load(portable_atomic::Ordering::Relaxed)
    }

    /// Field widths used to pack every ID.
    pub fn layout(&self) -> BitLayout {
        self.layout
    }

    /// Origin of the encoded timestamp, as a [`Duration`] since 1970-01-01
    /// UTC.
    pub fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch)
    }

    /// Splits an ID minted under this generator's layout and epoch. The
    /// returned timestamp is in milliseconds since the Unix epoch.
    pub fn decode(&self, id: u64) -> IdParts {
        let mut parts = self.layout.decode(id);
        parts.timestamp = parts.timestamp.saturating_add(self.epoch);
        parts
    }
}
