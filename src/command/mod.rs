pub mod geo;
pub mod hash;
pub mod hyperloglog;
pub mod key;
pub mod list;
pub mod set;
pub mod sorted_set;
pub mod stream;
pub mod string;

use std::time::Duration;

use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::types::geo::DistanceUnit;
use crate::types::stream::StreamId;

/// The closed set of operations the engine supports, one variant per
/// command with its arguments already parsed and checked. Built once per
/// dispatch by [`parse`]; nothing mutates state until a command parses
/// cleanly.
#[derive(Debug, Clone)]
pub enum Command {
    Ping,
    // Strings
    Set { key: String, value: Vec<u8> },
    SetEx { key: String, seconds: u64, value: Vec<u8> },
    Get { key: String },
    // Keys
    Del { keys: Vec<String> },
    Exists { keys: Vec<String> },
    Expire { key: String, seconds: u64 },
    Ttl { key: String },
    Type { key: String },
    // Lists
    LPush { key: String, values: Vec<Vec<u8>> },
    RPush { key: String, values: Vec<Vec<u8>> },
    LPop { key: String },
    RPop { key: String },
    LLen { key: String },
    LRange { key: String, start: i64, stop: i64 },
    // Sets
    SAdd { key: String, members: Vec<Vec<u8>> },
    SRem { key: String, members: Vec<Vec<u8>> },
    SCard { key: String },
    SMembers { key: String },
    // Hashes
    HSet { key: String, fields: Vec<(Vec<u8>, Vec<u8>)> },
    HGet { key: String, field: Vec<u8> },
    HDel { key: String, fields: Vec<Vec<u8>> },
    HGetAll { key: String },
    // Sorted sets
    ZAdd { key: String, entries: Vec<(f64, Vec<u8>)> },
    ZRem { key: String, members: Vec<Vec<u8>> },
    ZScore { key: String, member: Vec<u8> },
    ZCard { key: String },
    ZRange { key: String, start: i64, stop: i64 },
    // Geo (over sorted sets)
    GeoAdd { key: String, points: Vec<(f64, f64, Vec<u8>)> },
    GeoDist { key: String, from: Vec<u8>, to: Vec<u8>, unit: DistanceUnit },
    GeoPos { key: String, members: Vec<Vec<u8>> },
    GeoSearch { key: String, longitude: f64, latitude: f64, radius: f64, unit: DistanceUnit },
    // HyperLogLog
    PfAdd { key: String, elements: Vec<Vec<u8>> },
    PfCount { keys: Vec<String> },
    PfMerge { dest: String, sources: Vec<String> },
    // Streams
    XAdd { key: String, id: AddId, fields: Vec<(Vec<u8>, Vec<u8>)> },
    XLen { key: String },
    XRange { key: String, start: StreamId, end: StreamId },
    XAck { key: String, group: String, ids: Vec<StreamId> },
    XGroupCreate { key: String, group: String, start: GroupStart },
    XGroupDestroy { key: String, group: String },
    XGroupCreateConsumer { key: String, group: String, consumer: String },
    XGroupDelConsumer { key: String, group: String, consumer: String },
    XReadGroup {
        group: String,
        consumer: String,
        key: String,
        from: ReadFrom,
        count: Option<usize>,
        block: Option<Duration>,
    },
    // Pub/Sub
    Publish { channel: String, message: Vec<u8> },
}

/// XADD target ID: `*` or an explicit ms-seq.
#[derive(Debug, Clone, Copy)]
pub enum AddId {
    Auto,
    Explicit(StreamId),
}

/// Where a new consumer group's cursor starts.
#[derive(Debug, Clone, Copy)]
pub enum GroupStart {
    Id(StreamId),
    /// `$` — the stream's current last entry.
    LastEntry,
}

/// What an XREADGROUP call asks for: new entries past the group cursor
/// (`>`) or a replay of the consumer's pending entries from an ID.
#[derive(Debug, Clone, Copy)]
pub enum ReadFrom {
    NewEntries,
    Pending(StreamId),
}

/// Resolve a command name and argument list into a [`Command`].
///
/// Names are case-insensitive. Arity and argument types are enforced
/// here, before any state is touched.
pub fn parse(name: &str, args: &[Vec<u8>]) -> EngineResult<Command> {
    match name.to_ascii_uppercase().as_str() {
        "PING" => {
            if !args.is_empty() {
                return Err(wrong_args("ping"));
            }
            Ok(Command::Ping)
        }

        "SET" => string::parse_set(args),
        "SETEX" => string::parse_setex(args),
        "GET" => string::parse_get(args),

        "DEL" => key::parse_del(args),
        "EXISTS" => key::parse_exists(args),
        "EXPIRE" => key::parse_expire(args),
        "TTL" => key::parse_ttl(args),
        "TYPE" => key::parse_type(args),

        "LPUSH" => list::parse_push(args, true),
        "RPUSH" => list::parse_push(args, false),
        "LPOP" => list::parse_pop(args, true),
        "RPOP" => list::parse_pop(args, false),
        "LLEN" => list::parse_llen(args),
        "LRANGE" => list::parse_lrange(args),

        "SADD" => set::parse_sadd(args),
        "SREM" => set::parse_srem(args),
        "SCARD" => set::parse_scard(args),
        "SMEMBERS" => set::parse_smembers(args),

        "HSET" => hash::parse_hset(args),
        "HGET" => hash::parse_hget(args),
        "HDEL" => hash::parse_hdel(args),
        "HGETALL" => hash::parse_hgetall(args),

        "ZADD" => sorted_set::parse_zadd(args),
        "ZREM" => sorted_set::parse_zrem(args),
        "ZSCORE" => sorted_set::parse_zscore(args),
        "ZCARD" => sorted_set::parse_zcard(args),
        "ZRANGE" => sorted_set::parse_zrange(args),

        "GEOADD" => geo::parse_geoadd(args),
        "GEODIST" => geo::parse_geodist(args),
        "GEOPOS" => geo::parse_geopos(args),
        "GEOSEARCH" => geo::parse_geosearch(args),

        "PFADD" => hyperloglog::parse_pfadd(args),
        "PFCOUNT" => hyperloglog::parse_pfcount(args),
        "PFMERGE" => hyperloglog::parse_pfmerge(args),

        "XADD" => stream::parse_xadd(args),
        "XLEN" => stream::parse_xlen(args),
        "XRANGE" => stream::parse_xrange(args),
        "XACK" => stream::parse_xack(args),
        "XGROUP" => stream::parse_xgroup(args),
        "XREADGROUP" => stream::parse_xreadgroup(args),

        "PUBLISH" => {
            if args.len() != 2 {
                return Err(wrong_args("publish"));
            }
            Ok(Command::Publish {
                channel: utf8_arg(&args[0])?,
                message: args[1].clone(),
            })
        }

        _ => Err(EngineError::UnknownCommand(name.to_string())),
    }
}

/// Run a parsed command against the keyspace.
///
/// PUBLISH never reaches this path (the engine routes it to the broker),
/// and a blocking XREADGROUP arrives here only for its non-blocking poll
/// — the wait itself lives in the engine, outside the store lock.
pub fn apply(ks: &mut Keyspace, cmd: Command) -> EngineResult<Reply> {
    match cmd {
        Command::Ping => Ok(Reply::simple("PONG")),

        Command::Set { key, value } => string::set(ks, key, value),
        Command::SetEx { key, seconds, value } => string::setex(ks, key, seconds, value),
        Command::Get { key } => string::get(ks, &key),

        Command::Del { keys } => key::del(ks, &keys),
        Command::Exists { keys } => key::exists(ks, &keys),
        Command::Expire { key, seconds } => key::expire(ks, &key, seconds),
        Command::Ttl { key } => key::ttl(ks, &key),
        Command::Type { key } => key::type_name(ks, &key),

        Command::LPush { key, values } => list::push(ks, &key, values, true),
        Command::RPush { key, values } => list::push(ks, &key, values, false),
        Command::LPop { key } => list::pop(ks, &key, true),
        Command::RPop { key } => list::pop(ks, &key, false),
        Command::LLen { key } => list::llen(ks, &key),
        Command::LRange { key, start, stop } => list::lrange(ks, &key, start, stop),

        Command::SAdd { key, members } => set::sadd(ks, &key, members),
        Command::SRem { key, members } => set::srem(ks, &key, members),
        Command::SCard { key } => set::scard(ks, &key),
        Command::SMembers { key } => set::smembers(ks, &key),

        Command::HSet { key, fields } => hash::hset(ks, &key, fields),
        Command::HGet { key, field } => hash::hget(ks, &key, &field),
        Command::HDel { key, fields } => hash::hdel(ks, &key, &fields),
        Command::HGetAll { key } => hash::hgetall(ks, &key),

        Command::ZAdd { key, entries } => sorted_set::zadd(ks, &key, entries),
        Command::ZRem { key, members } => sorted_set::zrem(ks, &key, &members),
        Command::ZScore { key, member } => sorted_set::zscore(ks, &key, &member),
        Command::ZCard { key } => sorted_set::zcard(ks, &key),
        Command::ZRange { key, start, stop } => sorted_set::zrange(ks, &key, start, stop),

        Command::GeoAdd { key, points } => geo::geoadd(ks, &key, points),
        Command::GeoDist { key, from, to, unit } => geo::geodist(ks, &key, &from, &to, unit),
        Command::GeoPos { key, members } => geo::geopos(ks, &key, &members),
        Command::GeoSearch { key, longitude, latitude, radius, unit } => {
            geo::geosearch(ks, &key, longitude, latitude, radius, unit)
        }

        Command::PfAdd { key, elements } => hyperloglog::pfadd(ks, &key, &elements),
        Command::PfCount { keys } => hyperloglog::pfcount(ks, &keys),
        Command::PfMerge { dest, sources } => hyperloglog::pfmerge(ks, dest, &sources),

        Command::XAdd { key, id, fields } => stream::xadd(ks, &key, id, fields),
        Command::XLen { key } => stream::xlen(ks, &key),
        Command::XRange { key, start, end } => stream::xrange(ks, &key, start, end),
        Command::XAck { key, group, ids } => stream::xack(ks, &key, &group, &ids),
        Command::XGroupCreate { key, group, start } => {
            stream::xgroup_create(ks, &key, &group, start)
        }
        Command::XGroupDestroy { key, group } => stream::xgroup_destroy(ks, &key, &group),
        Command::XGroupCreateConsumer { key, group, consumer } => {
            stream::xgroup_create_consumer(ks, &key, &group, &consumer)
        }
        Command::XGroupDelConsumer { key, group, consumer } => {
            stream::xgroup_del_consumer(ks, &key, &group, &consumer)
        }
        Command::XReadGroup { group, consumer, key, from, count, .. } => {
            stream::read_group(ks, &group, &consumer, &key, from, count)
        }

        Command::Publish { .. } => unreachable!("PUBLISH is routed to the broker"),
    }
}

pub(crate) fn wrong_args(cmd: &str) -> EngineError {
    EngineError::WrongArgCount(cmd.to_string())
}

/// Keys, group names, and other identifiers must be UTF-8.
pub(crate) fn utf8_arg(arg: &[u8]) -> EngineResult<String> {
    String::from_utf8(arg.to_vec()).map_err(|_| EngineError::Syntax)
}

pub(crate) fn int_arg(arg: &[u8]) -> EngineResult<i64> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(EngineError::NotInteger)
}

pub(crate) fn uint_arg(arg: &[u8]) -> EngineResult<u64> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(EngineError::NotInteger)
}

pub(crate) fn float_arg(arg: &[u8]) -> EngineResult<f64> {
    let parsed: Option<f64> = std::str::from_utf8(arg).ok().and_then(|s| s.parse().ok());
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(EngineError::NotFloat),
    }
}
