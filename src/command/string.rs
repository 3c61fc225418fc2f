use crate::command::{Command, utf8_arg, uint_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::store::entry::{Entry, now_millis};
use crate::types::Value;

pub(crate) fn parse_set(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 2 {
        return Err(wrong_args("set"));
    }
    Ok(Command::Set {
        key: utf8_arg(&args[0])?,
        value: args[1].clone(),
    })
}

pub(crate) fn parse_setex(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 3 {
        return Err(wrong_args("setex"));
    }
    let seconds = uint_arg(&args[1])?;
    if seconds == 0 {
        return Err(EngineError::NotInteger);
    }
    Ok(Command::SetEx {
        key: utf8_arg(&args[0])?,
        seconds,
        value: args[2].clone(),
    })
}

pub(crate) fn parse_get(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args("get"));
    }
    Ok(Command::Get {
        key: utf8_arg(&args[0])?,
    })
}

/// Replacing a value of another type requires an explicit DEL first.
fn check_writable(ks: &mut Keyspace, key: &str) -> EngineResult<()> {
    match ks.get(key) {
        Some(entry) if entry.value.as_string().is_none() => Err(EngineError::WrongType),
        _ => Ok(()),
    }
}

pub(crate) fn set(ks: &mut Keyspace, key: String, value: Vec<u8>) -> EngineResult<Reply> {
    check_writable(ks, &key)?;
    // A plain SET discards any previous expiry.
    ks.set(key, Entry::new(Value::String(value)));
    Ok(Reply::Ok)
}

pub(crate) fn setex(
    ks: &mut Keyspace,
    key: String,
    seconds: u64,
    value: Vec<u8>,
) -> EngineResult<Reply> {
    check_writable(ks, &key)?;
    let deadline = now_millis().saturating_add(seconds.saturating_mul(1000));
    ks.set(key, Entry::with_expiry(Value::String(value), deadline));
    Ok(Reply::Ok)
}

pub(crate) fn get(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => match entry.value.as_string() {
            Some(bytes) => Ok(Reply::Bulk(bytes.clone())),
            None => Err(EngineError::WrongType),
        },
        None => Ok(Reply::Nil),
    }
}
