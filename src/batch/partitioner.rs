use super::event::{Batch, SerializedEvent};
use super::types::BatchError;

/// Greedy, order-preserving partitioner of serialized events into
/// size-bounded batches.
///
/// One pass, O(1) extra memory beyond the open batch. A batch closes as soon
/// as the next event would overflow it; the overflowing event opens the next
/// batch. Feed events with [`push`](Self::push) and collect the trailing
/// partial batch with [`finish`](Self::finish).
pub struct BatchPartitioner {
    capacity: usize,
    partition_key: Option<String>,
    current: Batch,
}

impl BatchPartitioner {
    pub fn new(capacity: usize, partition_key: Option<String>) -> Self {
        BatchPartitioner {
            current: Batch::new(capacity, partition_key.clone()),
            capacity,
            partition_key,
        }
    }

    /// Adds `event`, returning the closed batch when the event did not fit
    /// into the open one.
    ///
    /// An event whose size alone exceeds the capacity is an error; it is
    /// never packed and never dropped silently.
    pub fn push(&mut self, event: SerializedEvent) -> Result<Option<Batch>, BatchError> {
        if event.size() > self.capacity {
            return Err(BatchError::EventTooLarge {
                size: event.size(),
                capacity: self.capacity,
            });
        }

        if self.current.fits(&event) {
            self.current.push(event);
            return Ok(None);
        }

        let full = std::mem::replace(
            &mut self.current,
            Batch::new(self.capacity, self.partition_key.clone()),
        );
        self.current.push(event);
        Ok(Some(full))
    }

    /// Closes the partitioner, yielding the final partial batch.
    ///
    /// An empty trailing batch is never yielded.
    pub fn finish(self) -> Option<Batch> {
        if self.current.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }
}

/// Lazily partitions `events` into batches of at most `capacity` bytes.
///
/// The returned iterator yields batches in input order; concatenating their
/// events reproduces the input sequence exactly. It fuses after yielding an
/// [`BatchError::EventTooLarge`] error.
pub fn partition<I>(
    events: I,
    capacity: usize,
    partition_key: Option<String>,
) -> Partition<I::IntoIter>
where
    I: IntoIterator<Item = SerializedEvent>,
{
    Partition {
        events: events.into_iter(),
        partitioner: Some(BatchPartitioner::new(capacity, partition_key)),
    }
}

/// Iterator returned by [`partition`].
pub struct Partition<I> {
    events: I,
    partitioner: Option<BatchPartitioner>,
}

impl<I> Iterator for Partition<I>
where
    I: Iterator<Item = SerializedEvent>,
{
    type Item = Result<Batch, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.partitioner.as_ref()?;
            match self.events.next() {
                Some(event) => match self.partitioner.as_mut()?.push(event) {
                    Ok(Some(batch)) => return Some(Ok(batch)),
                    Ok(None) => {}
                    Err(e) => {
                        self.partitioner = None;
                        return Some(Err(e));
                    }
                },
                None => return self.partitioner.take()?.finish().map(Ok),
            }
        }
    }
}
