use crate::command::{Command, float_arg, int_arg, utf8_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::types::Value;
use crate::types::sorted_set::SortedSet;

pub(crate) fn parse_zadd(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 3 || (args.len() - 1) % 2 != 0 {
        return Err(wrong_args("zadd"));
    }
    let key = utf8_arg(&args[0])?;
    let entries = args[1..]
        .chunks_exact(2)
        .map(|pair| Ok((float_arg(&pair[0])?, pair[1].clone())))
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(Command::ZAdd { key, entries })
}

pub(crate) fn parse_zrem(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 2 {
        return Err(wrong_args("zrem"));
    }
    Ok(Command::ZRem {
        key: utf8_arg(&args[0])?,
        members: args[1..].to_vec(),
    })
}

pub(crate) fn parse_zscore(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 2 {
        return Err(wrong_args("zscore"));
    }
    Ok(Command::ZScore {
        key: utf8_arg(&args[0])?,
        member: args[1].clone(),
    })
}

pub(crate) fn parse_zcard(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args("zcard"));
    }
    Ok(Command::ZCard {
        key: utf8_arg(&args[0])?,
    })
}

pub(crate) fn parse_zrange(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 3 {
        return Err(wrong_args("zrange"));
    }
    Ok(Command::ZRange {
        key: utf8_arg(&args[0])?,
        start: int_arg(&args[1])?,
        stop: int_arg(&args[2])?,
    })
}

pub(crate) fn zadd(
    ks: &mut Keyspace,
    key: &str,
    entries: Vec<(f64, Vec<u8>)>,
) -> EngineResult<Reply> {
    let entry = ks.get_or_create_with(key, || Value::SortedSet(SortedSet::new()));
    let zset = entry
        .value
        .as_sorted_set_mut()
        .ok_or(EngineError::WrongType)?;
    let mut added = 0;
    for (score, member) in entries {
        if zset.add(member, score) {
            added += 1;
        }
    }
    Ok(Reply::Integer(added))
}

pub(crate) fn zrem(ks: &mut Keyspace, key: &str, members: &[Vec<u8>]) -> EngineResult<Reply> {
    let Some(entry) = ks.get_mut(key) else {
        return Ok(Reply::Integer(0));
    };
    let zset = entry
        .value
        .as_sorted_set_mut()
        .ok_or(EngineError::WrongType)?;
    let removed = members.iter().filter(|m| zset.remove(m)).count();
    if zset.is_empty() {
        ks.remove(key);
    }
    Ok(Reply::Integer(removed as i64))
}

pub(crate) fn zscore(ks: &mut Keyspace, key: &str, member: &[u8]) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let zset = entry.value.as_sorted_set().ok_or(EngineError::WrongType)?;
            Ok(match zset.score(member) {
                Some(score) => Reply::Double(score),
                None => Reply::Nil,
            })
        }
        None => Ok(Reply::Nil),
    }
}

pub(crate) fn zcard(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let zset = entry.value.as_sorted_set().ok_or(EngineError::WrongType)?;
            Ok(Reply::Integer(zset.len() as i64))
        }
        None => Ok(Reply::Integer(0)),
    }
}

pub(crate) fn zrange(ks: &mut Keyspace, key: &str, start: i64, stop: i64) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let zset = entry.value.as_sorted_set().ok_or(EngineError::WrongType)?;
            Ok(Reply::bulk_array(
                zset.range(start, stop)
                    .into_iter()
                    .map(|(member, _)| member.to_vec()),
            ))
        }
        None => Ok(Reply::Array(vec![])),
    }
}
