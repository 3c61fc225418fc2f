use crate::command::{Command, utf8_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::store::entry::Entry;
use crate::types::Value;
use crate::types::hyperloglog::HyperLogLog;

pub(crate) fn parse_pfadd(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.is_empty() {
        return Err(wrong_args("pfadd"));
    }
    Ok(Command::PfAdd {
        key: utf8_arg(&args[0])?,
        elements: args[1..].to_vec(),
    })
}

pub(crate) fn parse_pfcount(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.is_empty() {
        return Err(wrong_args("pfcount"));
    }
    Ok(Command::PfCount {
        keys: args.iter().map(|a| utf8_arg(a)).collect::<EngineResult<_>>()?,
    })
}

pub(crate) fn parse_pfmerge(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 2 {
        return Err(wrong_args("pfmerge"));
    }
    Ok(Command::PfMerge {
        dest: utf8_arg(&args[0])?,
        sources: args[1..]
            .iter()
            .map(|a| utf8_arg(a))
            .collect::<EngineResult<_>>()?,
    })
}

pub(crate) fn pfadd(ks: &mut Keyspace, key: &str, elements: &[Vec<u8>]) -> EngineResult<Reply> {
    let precision = ks.hll_precision;
    if !ks.contains(key) {
        ks.set(
            key.to_string(),
            Entry::new(Value::HyperLogLog(HyperLogLog::new(precision)?)),
        );
    }
    let entry = ks.get_mut(key).expect("sketch just ensured");
    let hll = entry.value.as_hll_mut().ok_or(EngineError::WrongType)?;

    let mut changed = false;
    for element in elements {
        if hll.add(element) {
            changed = true;
        }
    }
    Ok(Reply::Integer(if changed { 1 } else { 0 }))
}

pub(crate) fn pfcount(ks: &mut Keyspace, keys: &[String]) -> EngineResult<Reply> {
    if let [key] = keys {
        return match ks.get(key) {
            Some(entry) => {
                let hll = entry.value.as_hll().ok_or(EngineError::WrongType)?;
                Ok(Reply::Integer(hll.count() as i64))
            }
            None => Ok(Reply::Integer(0)),
        };
    }

    // Several keys: estimate the union on a scratch sketch; the stored
    // sketches stay untouched.
    let mut merged = HyperLogLog::new(ks.hll_precision)?;
    for key in keys {
        if let Some(entry) = ks.get(key) {
            let hll = entry.value.as_hll().ok_or(EngineError::WrongType)?;
            merged.merge(hll);
        }
    }
    Ok(Reply::Integer(merged.count() as i64))
}

pub(crate) fn pfmerge(ks: &mut Keyspace, dest: String, sources: &[String]) -> EngineResult<Reply> {
    let mut merged = HyperLogLog::new(ks.hll_precision)?;
    if let Some(entry) = ks.get(&dest) {
        let hll = entry.value.as_hll().ok_or(EngineError::WrongType)?;
        merged.merge(hll);
    }
    for key in sources {
        if let Some(entry) = ks.get(key) {
            let hll = entry.value.as_hll().ok_or(EngineError::WrongType)?;
            merged.merge(hll);
        }
    }
    ks.set(dest, Entry::new(Value::HyperLogLog(merged)));
    Ok(Reply::Ok)
}
