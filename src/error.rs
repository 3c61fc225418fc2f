#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("WRONGTYPE operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{0}' command")]
    WrongArgCount(String),

    #[error("value is not an integer or out of range")]
    NotInteger,

    #[error("value is not a valid float")]
    NotFloat,

    #[error("syntax error")]
    Syntax,

    #[error("invalid stream ID '{0}'")]
    InvalidStreamId(String),

    #[error("stream ID must be greater than the last entry's ID")]
    StreamIdTooSmall,

    #[error("consumer group '{0}' already exists")]
    GroupExists(String),

    #[error("no such consumer group '{0}'")]
    GroupNotFound(String),

    #[error("no such consumer '{0}'")]
    ConsumerNotFound(String),

    #[error("invalid longitude/latitude pair")]
    InvalidCoordinates,

    #[error("unsupported distance unit '{0}'")]
    InvalidUnit(String),

    #[error("HyperLogLog precision must be between 4 and 18")]
    InvalidPrecision,
}

pub type EngineResult<T> = Result<T, EngineError>;
