use crate::command::{Command, utf8_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::types::Value;
use crate::types::set::Set;

fn parse_key_members(args: &[Vec<u8>], cmd: &str) -> EngineResult<(String, Vec<Vec<u8>>)> {
    if args.len() < 2 {
        return Err(wrong_args(cmd));
    }
    Ok((utf8_arg(&args[0])?, args[1..].to_vec()))
}

pub(crate) fn parse_sadd(args: &[Vec<u8>]) -> EngineResult<Command> {
    let (key, members) = parse_key_members(args, "sadd")?;
    Ok(Command::SAdd { key, members })
}

pub(crate) fn parse_srem(args: &[Vec<u8>]) -> EngineResult<Command> {
    let (key, members) = parse_key_members(args, "srem")?;
    Ok(Command::SRem { key, members })
}

pub(crate) fn parse_scard(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args("scard"));
    }
    Ok(Command::SCard {
        key: utf8_arg(&args[0])?,
    })
}

pub(crate) fn parse_smembers(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args("smembers"));
    }
    Ok(Command::SMembers {
        key: utf8_arg(&args[0])?,
    })
}

pub(crate) fn sadd(ks: &mut Keyspace, key: &str, members: Vec<Vec<u8>>) -> EngineResult<Reply> {
    let entry = ks.get_or_create_with(key, || Value::Set(Set::new()));
    let set = entry.value.as_set_mut().ok_or(EngineError::WrongType)?;
    let added = members.into_iter().filter(|m| set.add(m.clone())).count();
    Ok(Reply::Integer(added as i64))
}

pub(crate) fn srem(ks: &mut Keyspace, key: &str, members: Vec<Vec<u8>>) -> EngineResult<Reply> {
    let Some(entry) = ks.get_mut(key) else {
        return Ok(Reply::Integer(0));
    };
    let set = entry.value.as_set_mut().ok_or(EngineError::WrongType)?;
    let removed = members.iter().filter(|m| set.remove(m)).count();
    if set.is_empty() {
        ks.remove(key);
    }
    Ok(Reply::Integer(removed as i64))
}

pub(crate) fn scard(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let set = entry.value.as_set().ok_or(EngineError::WrongType)?;
            Ok(Reply::Integer(set.len() as i64))
        }
        None => Ok(Reply::Integer(0)),
    }
}

pub(crate) fn smembers(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let set = entry.value.as_set().ok_or(EngineError::WrongType)?;
            Ok(Reply::bulk_array(set.members().cloned()))
        }
        None => Ok(Reply::Array(vec![])),
    }
}
