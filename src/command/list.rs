use crate::command::{Command, int_arg, utf8_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::types::Value;
use crate::types::list::List;

pub(crate) fn parse_push(args: &[Vec<u8>], front: bool) -> EngineResult<Command> {
    if args.len() < 2 {
        return Err(wrong_args(if front { "lpush" } else { "rpush" }));
    }
    let key = utf8_arg(&args[0])?;
    let values = args[1..].to_vec();
    Ok(if front {
        Command::LPush { key, values }
    } else {
        Command::RPush { key, values }
    })
}

pub(crate) fn parse_pop(args: &[Vec<u8>], front: bool) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args(if front { "lpop" } else { "rpop" }));
    }
    let key = utf8_arg(&args[0])?;
    Ok(if front {
        Command::LPop { key }
    } else {
        Command::RPop { key }
    })
}

pub(crate) fn parse_llen(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args("llen"));
    }
    Ok(Command::LLen {
        key: utf8_arg(&args[0])?,
    })
}

pub(crate) fn parse_lrange(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 3 {
        return Err(wrong_args("lrange"));
    }
    Ok(Command::LRange {
        key: utf8_arg(&args[0])?,
        start: int_arg(&args[1])?,
        stop: int_arg(&args[2])?,
    })
}

/// Get or create the list at `key`; wrong-typed keys fail.
fn list_mut<'a>(ks: &'a mut Keyspace, key: &str) -> EngineResult<&'a mut List> {
    let entry = ks.get_or_create_with(key, || Value::List(List::new()));
    entry.value.as_list_mut().ok_or(EngineError::WrongType)
}

pub(crate) fn push(
    ks: &mut Keyspace,
    key: &str,
    values: Vec<Vec<u8>>,
    front: bool,
) -> EngineResult<Reply> {
    let list = list_mut(ks, key)?;
    for value in values {
        if front {
            list.push_front(value);
        } else {
            list.push_back(value);
        }
    }
    Ok(Reply::Integer(list.len() as i64))
}

pub(crate) fn pop(ks: &mut Keyspace, key: &str, front: bool) -> EngineResult<Reply> {
    let Some(entry) = ks.get_mut(key) else {
        return Ok(Reply::Nil);
    };
    let list = entry.value.as_list_mut().ok_or(EngineError::WrongType)?;
    let popped = if front {
        list.pop_front()
    } else {
        list.pop_back()
    };
    let drained = list.is_empty();
    if drained {
        // An emptied list ceases to exist as a key.
        ks.remove(key);
    }
    Ok(match popped {
        Some(value) => Reply::Bulk(value),
        None => Reply::Nil,
    })
}

pub(crate) fn llen(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let list = entry.value.as_list().ok_or(EngineError::WrongType)?;
            Ok(Reply::Integer(list.len() as i64))
        }
        None => Ok(Reply::Integer(0)),
    }
}

pub(crate) fn lrange(ks: &mut Keyspace, key: &str, start: i64, stop: i64) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let list = entry.value.as_list().ok_or(EngineError::WrongType)?;
            Ok(Reply::bulk_array(
                list.range(start, stop).into_iter().cloned(),
            ))
        }
        None => Ok(Reply::Array(vec![])),
    }
}
