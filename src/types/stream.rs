use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Bound;

use crate::error::{EngineError, EngineResult};

/// A stream entry ID: millisecond timestamp plus a same-millisecond
/// sequence number. Ordering is (ms, seq); IDs are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub const MIN: StreamId = StreamId { ms: 0, seq: 0 };
    pub const MAX: StreamId = StreamId {
        ms: u64::MAX,
        seq: u64::MAX,
    };

    pub fn new(ms: u64, seq: u64) -> Self {
        StreamId { ms, seq }
    }

    /// Parse "ms-seq" or a bare "ms" (seq defaults to 0).
    pub fn parse(s: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidStreamId(s.to_string());
        if let Some((ms_str, seq_str)) = s.split_once('-') {
            let ms = ms_str.parse::<u64>().map_err(|_| invalid())?;
            let seq = seq_str.parse::<u64>().map_err(|_| invalid())?;
            Ok(StreamId { ms, seq })
        } else {
            let ms = s.parse::<u64>().map_err(|_| invalid())?;
            Ok(StreamId { ms, seq: 0 })
        }
    }

    /// Parse a range start bound: `-` is the minimum, a bare ms means seq 0.
    pub fn parse_range_start(s: &str) -> EngineResult<Self> {
        if s == "-" {
            Ok(StreamId::MIN)
        } else {
            StreamId::parse(s)
        }
    }

    /// Parse a range end bound: `+` is the maximum, a bare ms covers the
    /// whole millisecond (seq saturates).
    pub fn parse_range_end(s: &str) -> EngineResult<Self> {
        if s == "+" {
            Ok(StreamId::MAX)
        } else if s.contains('-') {
            StreamId::parse(s)
        } else {
            let ms = s
                .parse::<u64>()
                .map_err(|_| EngineError::InvalidStreamId(s.to_string()))?;
            Ok(StreamId { ms, seq: u64::MAX })
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

/// Field/value pairs of one stream entry, in insertion order.
pub type EntryFields = Vec<(Vec<u8>, Vec<u8>)>;

/// A delivered-but-unacknowledged entry in a group's PEL.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub consumer: String,
    pub delivery_time: u64,
    pub delivery_count: u64,
}

/// A named consumer within a group, with its view of the PEL.
#[derive(Debug, Clone, Default)]
pub struct Consumer {
    pub pending: BTreeMap<StreamId, PendingEntry>,
}

/// A consumer group: a delivery cursor plus the pending-entries list.
#[derive(Debug, Clone)]
pub struct Group {
    pub last_delivered_id: StreamId,
    pub pel: BTreeMap<StreamId, PendingEntry>,
    pub consumers: HashMap<String, Consumer>,
}

impl Group {
    fn new(last_delivered_id: StreamId) -> Self {
        Group {
            last_delivered_id,
            pel: BTreeMap::new(),
            consumers: HashMap::new(),
        }
    }

    /// Register a consumer by name. Returns true if newly created.
    pub fn create_consumer(&mut self, name: &str) -> bool {
        if self.consumers.contains_key(name) {
            return false;
        }
        self.consumers.insert(name.to_string(), Consumer::default());
        true
    }

    /// Remove a consumer and its pending entries from the group PEL.
    /// Returns the number of entries that were pending for it.
    pub fn delete_consumer(&mut self, name: &str) -> Option<usize> {
        let consumer = self.consumers.remove(name)?;
        for id in consumer.pending.keys() {
            self.pel.remove(id);
        }
        Some(consumer.pending.len())
    }
}

/// Append-only stream log with consumer groups.
#[derive(Debug, Clone, Default)]
pub struct Stream {
    entries: BTreeMap<StreamId, EntryFields>,
    last_id: StreamId,
    groups: HashMap<String, Group>,
}

impl Stream {
    pub fn new() -> Self {
        Stream::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_id(&self) -> StreamId {
        self.last_id
    }

    /// Append with an auto-assigned ID. `now_ms` comes from the engine's
    /// configured clock; a clock reading at or before the last entry's
    /// millisecond falls back to bumping the sequence, so the assigned ID
    /// is strictly greater than every prior one.
    pub fn add_auto(&mut self, now_ms: u64, fields: EntryFields) -> StreamId {
        let id = if now_ms > self.last_id.ms {
            StreamId::new(now_ms, 0)
        } else {
            StreamId::new(self.last_id.ms, self.last_id.seq + 1)
        };
        self.last_id = id;
        self.entries.insert(id, fields);
        id
    }

    /// Append with an explicit ID, which must exceed the last entry's ID.
    pub fn add_explicit(&mut self, id: StreamId, fields: EntryFields) -> EngineResult<StreamId> {
        if id <= self.last_id {
            return Err(EngineError::StreamIdTooSmall);
        }
        self.last_id = id;
        self.entries.insert(id, fields);
        Ok(id)
    }

    /// Entries in [start, end], ascending by ID.
    pub fn range(&self, start: StreamId, end: StreamId) -> Vec<(StreamId, &EntryFields)> {
        self.entries
            .range(start..=end)
            .map(|(id, fields)| (*id, fields))
            .collect()
    }

    pub fn create_group(&mut self, name: &str, start: StreamId) -> EngineResult<()> {
        if self.groups.contains_key(name) {
            return Err(EngineError::GroupExists(name.to_string()));
        }
        self.groups.insert(name.to_string(), Group::new(start));
        Ok(())
    }

    pub fn destroy_group(&mut self, name: &str) -> bool {
        self.groups.remove(name).is_some()
    }

    pub fn group_mut(&mut self, name: &str) -> EngineResult<&mut Group> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| EngineError::GroupNotFound(name.to_string()))
    }

    /// Deliver up to `count` entries above the group's cursor to
    /// `consumer`, advancing the cursor and recording each delivery in
    /// the group PEL and the consumer's pending view.
    pub fn read_new(
        &mut self,
        group_name: &str,
        consumer_name: &str,
        count: Option<usize>,
        now_ms: u64,
    ) -> EngineResult<Vec<(StreamId, EntryFields)>> {
        let group = self
            .groups
            .get_mut(group_name)
            .ok_or_else(|| EngineError::GroupNotFound(group_name.to_string()))?;

        let delivered: Vec<(StreamId, EntryFields)> = self
            .entries
            .range((Bound::Excluded(group.last_delivered_id), Bound::Unbounded))
            .take(count.unwrap_or(usize::MAX))
            .map(|(id, fields)| (*id, fields.clone()))
            .collect();

        group.consumers.entry(consumer_name.to_string()).or_default();
        for (id, _) in &delivered {
            group.last_delivered_id = *id;
            let pe = PendingEntry {
                consumer: consumer_name.to_string(),
                delivery_time: now_ms,
                delivery_count: 1,
            };
            group.pel.insert(*id, pe.clone());
            group
                .consumers
                .get_mut(consumer_name)
                .expect("consumer just ensured")
                .pending
                .insert(*id, pe);
        }

        Ok(delivered)
    }

    /// Re-read a consumer's pending entries starting from `from`, without
    /// moving the group cursor. Entries trimmed from the log since
    /// delivery come back with empty fields.
    pub fn read_pending(
        &mut self,
        group_name: &str,
        consumer_name: &str,
        from: StreamId,
        count: Option<usize>,
    ) -> EngineResult<Vec<(StreamId, EntryFields)>> {
        let group = self
            .groups
            .get_mut(group_name)
            .ok_or_else(|| EngineError::GroupNotFound(group_name.to_string()))?;
        group.consumers.entry(consumer_name.to_string()).or_default();

        let ids: Vec<StreamId> = group.consumers[consumer_name]
            .pending
            .range(from..)
            .take(count.unwrap_or(usize::MAX))
            .map(|(id, _)| *id)
            .collect();

        Ok(ids
            .into_iter()
            .map(|id| (id, self.entries.get(&id).cloned().unwrap_or_default()))
            .collect())
    }

    /// Acknowledge delivered entries, removing them from the group PEL
    /// and the owning consumer's pending view. Returns the number that
    /// were actually pending.
    pub fn ack(&mut self, group_name: &str, ids: &[StreamId]) -> EngineResult<usize> {
        let group = self
            .groups
            .get_mut(group_name)
            .ok_or_else(|| EngineError::GroupNotFound(group_name.to_string()))?;

        let mut count = 0;
        for id in ids {
            if let Some(pe) = group.pel.remove(id) {
                count += 1;
                if let Some(consumer) = group.consumers.get_mut(&pe.consumer) {
                    consumer.pending.remove(id);
                }
            }
        }
        Ok(count)
    }
}
