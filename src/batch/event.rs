/// A serialized record ready for transport.
///
/// Immutable once produced. The event's size is the payload length; the
/// partition key never counts toward batch accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedEvent {
    payload: Vec<u8>,
    partition_key: Option<String>,
}

impl SerializedEvent {
    pub fn new(payload: Vec<u8>) -> Self {
        SerializedEvent {
            payload,
            partition_key: None,
        }
    }

    pub fn with_partition_key(payload: Vec<u8>, partition_key: impl Into<String>) -> Self {
        SerializedEvent {
            payload,
            partition_key: Some(partition_key.into()),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }
}

/// An ordered, size-bounded group of events sent as one transport unit.
///
/// Append-only while the partitioner holds it open, immutable once yielded.
/// Invariant: `size <= capacity`.
#[derive(Debug, Clone)]
pub struct Batch {
    events: Vec<SerializedEvent>,
    size: usize,
    capacity: usize,
    partition_key: Option<String>,
}

impl Batch {
    pub(crate) fn new(capacity: usize, partition_key: Option<String>) -> Self {
        Batch {
            events: Vec::new(),
            size: 0,
            capacity,
            partition_key,
        }
    }

    /// Whether `event` can be added without exceeding the capacity.
    pub(crate) fn fits(&self, event: &SerializedEvent) -> bool {
        self.size + event.size() <= self.capacity
    }

    pub(crate) fn push(&mut self, event: SerializedEvent) {
        self.size += event.size();
        self.events.push(event);
    }

    /// Aggregate payload size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[SerializedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SerializedEvent> {
        self.events
    }

    /// Key shared by every event in the batch, if the batch was keyed.
    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }
}
