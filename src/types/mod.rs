pub mod geo;
pub mod hyperloglog;
pub mod list;
pub mod set;
pub mod sorted_set;
pub mod stream;

use std::collections::HashMap;

/// The core value type stored in the keyspace.
///
/// One key holds exactly one variant; operations pattern-match on the
/// active variant and fail with a type mismatch otherwise. Strings are
/// raw bytes and hashes are plain field/value maps — neither needs
/// behavior beyond the std containers.
#[derive(Debug, Clone)]
pub enum Value {
    String(Vec<u8>),
    List(list::List),
    Set(set::Set),
    SortedSet(sorted_set::SortedSet),
    Hash(HashMap<Vec<u8>, Vec<u8>>),
    Stream(stream::Stream),
    HyperLogLog(hyperloglog::HyperLogLog),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::SortedSet(_) => "zset",
            Value::Hash(_) => "hash",
            Value::Stream(_) => "stream",
            Value::HyperLogLog(_) => "hyperloglog",
        }
    }

    pub fn as_string(&self) -> Option<&Vec<u8>> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&list::List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut list::List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&set::Set> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut set::Set> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sorted_set(&self) -> Option<&sorted_set::SortedSet> {
        match self {
            Value::SortedSet(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_sorted_set_mut(&mut self) -> Option<&mut sorted_set::SortedSet> {
        match self {
            Value::SortedSet(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashMap<Vec<u8>, Vec<u8>>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_hash_mut(&mut self) -> Option<&mut HashMap<Vec<u8>, Vec<u8>>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&stream::Stream> {
        match self {
            Value::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_stream_mut(&mut self) -> Option<&mut stream::Stream> {
        match self {
            Value::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_hll(&self) -> Option<&hyperloglog::HyperLogLog> {
        match self {
            Value::HyperLogLog(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_hll_mut(&mut self) -> Option<&mut hyperloglog::HyperLogLog> {
        match self {
            Value::HyperLogLog(h) => Some(h),
            _ => None,
        }
    }
}
