use std::collections::HashMap;

use crate::command::{Command, utf8_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::types::Value;

pub(crate) fn parse_hset(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 3 || (args.len() - 1) % 2 != 0 {
        return Err(wrong_args("hset"));
    }
    let key = utf8_arg(&args[0])?;
    let fields = args[1..]
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    Ok(Command::HSet { key, fields })
}

pub(crate) fn parse_hget(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 2 {
        return Err(wrong_args("hget"));
    }
    Ok(Command::HGet {
        key: utf8_arg(&args[0])?,
        field: args[1].clone(),
    })
}

pub(crate) fn parse_hdel(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 2 {
        return Err(wrong_args("hdel"));
    }
    Ok(Command::HDel {
        key: utf8_arg(&args[0])?,
        fields: args[1..].to_vec(),
    })
}

pub(crate) fn parse_hgetall(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args("hgetall"));
    }
    Ok(Command::HGetAll {
        key: utf8_arg(&args[0])?,
    })
}

pub(crate) fn hset(
    ks: &mut Keyspace,
    key: &str,
    fields: Vec<(Vec<u8>, Vec<u8>)>,
) -> EngineResult<Reply> {
    let entry = ks.get_or_create_with(key, || Value::Hash(HashMap::new()));
    let hash = entry.value.as_hash_mut().ok_or(EngineError::WrongType)?;
    let mut created = 0;
    for (field, value) in fields {
        if hash.insert(field, value).is_none() {
            created += 1;
        }
    }
    Ok(Reply::Integer(created))
}

pub(crate) fn hget(ks: &mut Keyspace, key: &str, field: &[u8]) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let hash = entry.value.as_hash().ok_or(EngineError::WrongType)?;
            Ok(match hash.get(field) {
                Some(value) => Reply::Bulk(value.clone()),
                None => Reply::Nil,
            })
        }
        None => Ok(Reply::Nil),
    }
}

pub(crate) fn hdel(ks: &mut Keyspace, key: &str, fields: &[Vec<u8>]) -> EngineResult<Reply> {
    let Some(entry) = ks.get_mut(key) else {
        return Ok(Reply::Integer(0));
    };
    let hash = entry.value.as_hash_mut().ok_or(EngineError::WrongType)?;
    let removed = fields.iter().filter(|f| hash.remove(*f).is_some()).count();
    if hash.is_empty() {
        ks.remove(key);
    }
    Ok(Reply::Integer(removed as i64))
}

pub(crate) fn hgetall(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let hash = entry.value.as_hash().ok_or(EngineError::WrongType)?;
            let mut pairs: Vec<(Vec<u8>, Vec<u8>)> =
                hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect();
            // Field order carries no meaning; sort for a stable reply.
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(Reply::Map(pairs))
        }
        None => Ok(Reply::Map(vec![])),
    }
}
