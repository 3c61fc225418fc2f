use std::time::Duration;

use crate::command::{AddId, Command, GroupStart, ReadFrom, uint_arg, utf8_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::types::Value;
use crate::types::stream::{EntryFields, Stream, StreamId};

pub(crate) fn parse_xadd(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 4 || args.len() % 2 != 0 {
        return Err(wrong_args("xadd"));
    }
    let key = utf8_arg(&args[0])?;
    let id_raw = utf8_arg(&args[1])?;
    let id = if id_raw == "*" {
        AddId::Auto
    } else {
        AddId::Explicit(StreamId::parse(&id_raw)?)
    };
    let fields: EntryFields = args[2..]
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    Ok(Command::XAdd { key, id, fields })
}

pub(crate) fn parse_xlen(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 1 {
        return Err(wrong_args("xlen"));
    }
    Ok(Command::XLen {
        key: utf8_arg(&args[0])?,
    })
}

pub(crate) fn parse_xrange(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() != 3 {
        return Err(wrong_args("xrange"));
    }
    Ok(Command::XRange {
        key: utf8_arg(&args[0])?,
        start: StreamId::parse_range_start(&utf8_arg(&args[1])?)?,
        end: StreamId::parse_range_end(&utf8_arg(&args[2])?)?,
    })
}

pub(crate) fn parse_xack(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 3 {
        return Err(wrong_args("xack"));
    }
    let ids = args[2..]
        .iter()
        .map(|a| StreamId::parse(&utf8_arg(a)?))
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(Command::XAck {
        key: utf8_arg(&args[0])?,
        group: utf8_arg(&args[1])?,
        ids,
    })
}

pub(crate) fn parse_xgroup(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 3 {
        return Err(wrong_args("xgroup"));
    }
    let sub = utf8_arg(&args[0])?.to_ascii_uppercase();
    let key = utf8_arg(&args[1])?;
    let group = utf8_arg(&args[2])?;
    match sub.as_str() {
        "CREATE" => {
            if args.len() != 4 {
                return Err(wrong_args("xgroup"));
            }
            let raw = utf8_arg(&args[3])?;
            let start = if raw == "$" {
                GroupStart::LastEntry
            } else {
                GroupStart::Id(StreamId::parse(&raw)?)
            };
            Ok(Command::XGroupCreate { key, group, start })
        }
        "DESTROY" => {
            if args.len() != 3 {
                return Err(wrong_args("xgroup"));
            }
            Ok(Command::XGroupDestroy { key, group })
        }
        "CREATECONSUMER" => {
            if args.len() != 4 {
                return Err(wrong_args("xgroup"));
            }
            Ok(Command::XGroupCreateConsumer {
                key,
                group,
                consumer: utf8_arg(&args[3])?,
            })
        }
        "DELCONSUMER" => {
            if args.len() != 4 {
                return Err(wrong_args("xgroup"));
            }
            Ok(Command::XGroupDelConsumer {
                key,
                group,
                consumer: utf8_arg(&args[3])?,
            })
        }
        other => Err(EngineError::UnknownCommand(format!("XGROUP {other}"))),
    }
}

pub(crate) fn parse_xreadgroup(args: &[Vec<u8>]) -> EngineResult<Command> {
    // XREADGROUP GROUP <group> <consumer> [COUNT n] [BLOCK ms] STREAMS <key> <id>
    if args.len() < 6 {
        return Err(wrong_args("xreadgroup"));
    }
    if !args[0].eq_ignore_ascii_case(b"GROUP") {
        return Err(EngineError::Syntax);
    }
    let group = utf8_arg(&args[1])?;
    let consumer = utf8_arg(&args[2])?;

    let mut count = None;
    let mut block = None;
    let mut i = 3;
    loop {
        let Some(token) = args.get(i) else {
            return Err(wrong_args("xreadgroup"));
        };
        if token.eq_ignore_ascii_case(b"COUNT") {
            let raw = args.get(i + 1).ok_or_else(|| wrong_args("xreadgroup"))?;
            count = Some(uint_arg(raw)? as usize);
            i += 2;
        } else if token.eq_ignore_ascii_case(b"BLOCK") {
            let raw = args.get(i + 1).ok_or_else(|| wrong_args("xreadgroup"))?;
            // BLOCK 0 is an explicit request to wait without a deadline.
            block = Some(Duration::from_millis(uint_arg(raw)?));
            i += 2;
        } else if token.eq_ignore_ascii_case(b"STREAMS") {
            if args.len() != i + 3 {
                return Err(wrong_args("xreadgroup"));
            }
            let key = utf8_arg(&args[i + 1])?;
            let id_raw = utf8_arg(&args[i + 2])?;
            let from = if id_raw == ">" {
                ReadFrom::NewEntries
            } else {
                ReadFrom::Pending(StreamId::parse(&id_raw)?)
            };
            return Ok(Command::XReadGroup {
                group,
                consumer,
                key,
                from,
                count,
                block,
            });
        } else {
            return Err(EngineError::Syntax);
        }
    }
}

fn entries_reply(entries: Vec<(StreamId, EntryFields)>) -> Reply {
    Reply::Array(
        entries
            .into_iter()
            .map(|(id, fields)| Reply::stream_entry(id.to_string(), fields))
            .collect(),
    )
}

pub(crate) fn xadd(
    ks: &mut Keyspace,
    key: &str,
    id: AddId,
    fields: EntryFields,
) -> EngineResult<Reply> {
    let now = ks.clock.now();
    let entry = ks.get_or_create_with(key, || Value::Stream(Stream::new()));
    let stream = entry.value.as_stream_mut().ok_or(EngineError::WrongType)?;
    let assigned = match id {
        AddId::Auto => stream.add_auto(now, fields),
        AddId::Explicit(id) => stream.add_explicit(id, fields)?,
    };
    Ok(Reply::bulk(assigned.to_string().into_bytes()))
}

pub(crate) fn xlen(ks: &mut Keyspace, key: &str) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let stream = entry.value.as_stream().ok_or(EngineError::WrongType)?;
            Ok(Reply::Integer(stream.len() as i64))
        }
        None => Ok(Reply::Integer(0)),
    }
}

pub(crate) fn xrange(
    ks: &mut Keyspace,
    key: &str,
    start: StreamId,
    end: StreamId,
) -> EngineResult<Reply> {
    match ks.get(key) {
        Some(entry) => {
            let stream = entry.value.as_stream().ok_or(EngineError::WrongType)?;
            Ok(entries_reply(
                stream
                    .range(start, end)
                    .into_iter()
                    .map(|(id, fields)| (id, fields.clone()))
                    .collect(),
            ))
        }
        None => Ok(Reply::Array(vec![])),
    }
}

fn stream_mut<'a>(ks: &'a mut Keyspace, key: &str, group: &str) -> EngineResult<&'a mut Stream> {
    let entry = ks
        .get_mut(key)
        .ok_or_else(|| EngineError::GroupNotFound(group.to_string()))?;
    entry.value.as_stream_mut().ok_or(EngineError::WrongType)
}

pub(crate) fn xack(
    ks: &mut Keyspace,
    key: &str,
    group: &str,
    ids: &[StreamId],
) -> EngineResult<Reply> {
    let stream = stream_mut(ks, key, group)?;
    let acked = stream.ack(group, ids)?;
    Ok(Reply::Integer(acked as i64))
}

pub(crate) fn xgroup_create(
    ks: &mut Keyspace,
    key: &str,
    group: &str,
    start: GroupStart,
) -> EngineResult<Reply> {
    // Creating a group on a missing key creates an empty stream; groups
    // live independently of the entries.
    let entry = ks.get_or_create_with(key, || Value::Stream(Stream::new()));
    let stream = entry.value.as_stream_mut().ok_or(EngineError::WrongType)?;
    let cursor = match start {
        GroupStart::Id(id) => id,
        GroupStart::LastEntry => stream.last_id(),
    };
    stream.create_group(group, cursor)?;
    tracing::debug!(key, group, %cursor, "consumer group created");
    Ok(Reply::Ok)
}

pub(crate) fn xgroup_destroy(ks: &mut Keyspace, key: &str, group: &str) -> EngineResult<Reply> {
    let stream = stream_mut(ks, key, group)?;
    let existed = stream.destroy_group(group);
    Ok(Reply::Integer(if existed { 1 } else { 0 }))
}

pub(crate) fn xgroup_create_consumer(
    ks: &mut Keyspace,
    key: &str,
    group: &str,
    consumer: &str,
) -> EngineResult<Reply> {
    let stream = stream_mut(ks, key, group)?;
    let created = stream.group_mut(group)?.create_consumer(consumer);
    tracing::debug!(key, group, consumer, created, "consumer registered");
    Ok(Reply::Integer(if created { 1 } else { 0 }))
}

pub(crate) fn xgroup_del_consumer(
    ks: &mut Keyspace,
    key: &str,
    group: &str,
    consumer: &str,
) -> EngineResult<Reply> {
    let stream = stream_mut(ks, key, group)?;
    match stream.group_mut(group)?.delete_consumer(consumer) {
        Some(pending) => Ok(Reply::Integer(pending as i64)),
        None => Err(EngineError::ConsumerNotFound(consumer.to_string())),
    }
}

/// One non-blocking read pass. New-entry reads with nothing to deliver
/// reply Nil so the engine's blocking loop can tell "empty" from "some";
/// PEL replays reply with the (possibly empty) entry list.
pub(crate) fn read_group(
    ks: &mut Keyspace,
    group: &str,
    consumer: &str,
    key: &str,
    from: ReadFrom,
    count: Option<usize>,
) -> EngineResult<Reply> {
    let now = ks.clock.now();
    let stream = stream_mut(ks, key, group)?;
    match from {
        ReadFrom::NewEntries => {
            let delivered = stream.read_new(group, consumer, count, now)?;
            if delivered.is_empty() {
                Ok(Reply::Nil)
            } else {
                Ok(entries_reply(delivered))
            }
        }
        ReadFrom::Pending(start) => {
            let replay = stream.read_pending(group, consumer, start, count)?;
            Ok(entries_reply(replay))
        }
    }
}
