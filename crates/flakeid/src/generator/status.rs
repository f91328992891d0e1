/// The outcome of a single, non-blocking generation attempt.
///
/// - [`Poll::Ready`] carries a freshly minted ID.
/// - [`Poll::Pending`] means every sequence value for the current millisecond
///   has been used. Nothing was minted and the generator state is unchanged;
///   retry once the clock reads `yield_until` or later.
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, IdGenerator, Poll, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_600_000_000_000
///     }
/// }
///
/// // A single sequence value per millisecond.
/// let layout = BitLayout::new(5, 5, 0).unwrap();
/// let generator = IdGenerator::with_layout(1, 1, layout, FixedTime).unwrap();
///
/// assert!(matches!(generator.poll_id(), Ok(Poll::Ready { .. })));
/// match generator.poll_id() {
///     Ok(Poll::Pending { yield_until }) => assert_eq!(yield_until, 1_600_000_000_001),
///     other => panic!("expected pending, got {other:?}"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: u64,
    },
    /// The sequence for the current millisecond is exhausted.
    Pending {
        /// The first clock reading, in milliseconds since the Unix epoch, at
        /// which generation can resume.
        yield_until: u64,
    },
}
