use crate::command::{Command, utf8_arg, uint_arg, wrong_args};
use crate::error::EngineResult;
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::store::entry::now_millis;

fn parse_keys(args: &[Vec<u8>], cmd: &str) -> EngineResult<Vec<String>> {
    if args.is_empty() {
        return Err(wrong_args(cmd));
    }
    args.iter().map(|a| utf8_arg(a)).collect()
}

fn parse_single_key(args: &[Vec<u8>], cmd: &str) -> EngineResult<String> {
    if args.len() != 1 {
        return Err(wrong_args(cmd));
    }
    utf8_arg(&args[0])
}

pub(crate) fn parse_del(args: &[Vec<u8>]) -> EngineResult<Command> {
    Ok(Command::Del {
        keys: parse_keys(args, "del")?,
    })
}

pub(crate) fn parse_exists(args: &[Vec<u8>]) -> EngineResult<Command> {
    Ok(Command::Exists {
        keys: parse_keys(args, "exists")?,
    })
}

pub(crate) fn parse_expire(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 2 {
        return Err(wrong_args("expire"));
    }
    Ok(Command::Expire {
        key: utf8_arg(&args[0])?,
        seconds: uint_arg(&args[1])?,
    })
}

pub(crate) fn parse_ttl(args: &[Vec<u8>]) -> EngineResult<Command> {
    Ok(Command::Ttl {
        key: parse_single_key(args, "ttl")?,
    })
}

pub(crate) fn parse_type(args: &[Vec<u8>]) -> EngineResult<Command> {
    Ok(Command::Type {
        key: parse_single_key(args, "type")?,
    })
}

pub(crate) fn del(ks: &mut Keyspace, keys: &[String]) -> EngineResult<Reply> {
    let removed = keys.iter().filter(|k| ks.remove(k)).count();
    Ok(Reply::Integer(removed as i64))
}

pub(crate) fn exists(ks: &mut Keyspace, keys: &[String]) -> EngineResult<Reply> {
    let present = keys.iter().filter(|k| ks.contains(k)).count();
    Ok(Reply::Integer(present as i64))
}

pub(crate) fn expire(ks: &mut Keyspace, key: &str, seconds: u64) -> EngineResult<Reply> {
    let deadline = now_millis().saturating_add(seconds.saturating_mul(1000));
    let updated = ks.set_expiry(key, deadline);
    Ok(Reply::Integer(if updated { 1 } else { 0 }))
}

pub(crate) fn ttl(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    Ok(Reply::Integer(ks.ttl_seconds(key)))
}

pub(crate) fn type_name(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    Ok(Reply::simple(ks.type_name(key).unwrap_or("none")))
}
