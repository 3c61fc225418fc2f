/// The typed result of a command.
///
/// Every operation the engine supports resolves to one of these shapes;
/// nothing here is tied to any wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Absent value, or a blocking read that timed out.
    Nil,
    /// Generic success acknowledgement.
    Ok,
    /// Fixed status string (e.g. PONG, a type name).
    Simple(String),
    Integer(i64),
    Double(f64),
    Bulk(Vec<u8>),
    Array(Vec<Reply>),
    /// Field/value pairs, e.g. HGETALL or a stream entry's fields.
    Map(Vec<(Vec<u8>, Vec<u8>)>),
}

impl Reply {
    pub fn bulk(data: impl Into<Vec<u8>>) -> Reply {
        Reply::Bulk(data.into())
    }

    pub fn simple(s: impl Into<String>) -> Reply {
        Reply::Simple(s.into())
    }

    /// Array of bulk strings, in order.
    pub fn bulk_array<I, T>(items: I) -> Reply
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        Reply::Array(items.into_iter().map(Reply::bulk).collect())
    }

    /// A stream entry: [id, fields].
    pub fn stream_entry(id: String, fields: Vec<(Vec<u8>, Vec<u8>)>) -> Reply {
        Reply::Array(vec![Reply::bulk(id.into_bytes()), Reply::Map(fields)])
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Reply::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bulk(&self) -> Option<&[u8]> {
        match self {
            Reply::Bulk(b) => Some(b),
            _ => None,
        }
    }

    /// Bulk payload as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bulk().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Vec<u8>, Vec<u8>)]> {
        match self {
            Reply::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Array elements as UTF-8 strings; None if this is not an array of
    /// valid UTF-8 bulks.
    pub fn as_str_vec(&self) -> Option<Vec<&str>> {
        self.as_array()?.iter().map(|r| r.as_str()).collect()
    }
}
