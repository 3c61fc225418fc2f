use crate::command::{Command, float_arg, utf8_arg, wrong_args};
use crate::error::{EngineError, EngineResult};
use crate::reply::Reply;
use crate::store::Keyspace;
use crate::types::Value;
use crate::types::geo::{self, DistanceUnit};
use crate::types::sorted_set::SortedSet;

pub(crate) fn parse_geoadd(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 4 || (args.len() - 1) % 3 != 0 {
        return Err(wrong_args("geoadd"));
    }
    let key = utf8_arg(&args[0])?;
    let points = args[1..]
        .chunks_exact(3)
        .map(|triple| {
            Ok((
                float_arg(&triple[0])?,
                float_arg(&triple[1])?,
                triple[2].clone(),
            ))
        })
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(Command::GeoAdd { key, points })
}

pub(crate) fn parse_geodist(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 3 || args.len() > 4 {
        return Err(wrong_args("geodist"));
    }
    let unit = match args.get(3) {
        Some(raw) => DistanceUnit::parse(&utf8_arg(raw)?)?,
        None => DistanceUnit::Meters,
    };
    Ok(Command::GeoDist {
        key: utf8_arg(&args[0])?,
        from: args[1].clone(),
        to: args[2].clone(),
        unit,
    })
}

pub(crate) fn parse_geopos(args: &[Vec<u8>]) -> EngineResult<Command> {
    if args.len() < 2 {
        return Err(wrong_args("geopos"));
    }
    Ok(Command::GeoPos {
        key: utf8_arg(&args[0])?,
        members: args[1..].to_vec(),
    })
}

pub(crate) fn parse_geosearch(args: &[Vec<u8>]) -> EngineResult<Command> {
    // GEOSEARCH key FROMLONLAT lon lat BYRADIUS radius unit [ASC]
    if args.len() < 7 || args.len() > 8 {
        return Err(wrong_args("geosearch"));
    }
    if !args[1].eq_ignore_ascii_case(b"FROMLONLAT") || !args[4].eq_ignore_ascii_case(b"BYRADIUS") {
        return Err(EngineError::Syntax);
    }
    if let Some(order) = args.get(7) {
        // Results are always distance-ascending; only the explicit ASC
        // token is accepted.
        if !order.eq_ignore_ascii_case(b"ASC") {
            return Err(EngineError::Syntax);
        }
    }
    let radius = float_arg(&args[5])?;
    if radius < 0.0 {
        return Err(EngineError::NotFloat);
    }
    Ok(Command::GeoSearch {
        key: utf8_arg(&args[0])?,
        longitude: float_arg(&args[2])?,
        latitude: float_arg(&args[3])?,
        radius,
        unit: DistanceUnit::parse(&utf8_arg(&args[6])?)?,
    })
}

pub(crate) fn geoadd(
    ks: &mut Keyspace,
    key: &str,
    points: Vec<(f64, f64, Vec<u8>)>,
) -> EngineResult<Reply> {
    // Encode every pair up front so a bad coordinate mutates nothing.
    let scored = points
        .into_iter()
        .map(|(lon, lat, member)| Ok((member, geo::encode(lon, lat)? as f64)))
        .collect::<EngineResult<Vec<_>>>()?;

    let entry = ks.get_or_create_with(key, || Value::SortedSet(SortedSet::new()));
    let zset = entry
        .value
        .as_sorted_set_mut()
        .ok_or(EngineError::WrongType)?;
    let mut added = 0;
    for (member, score) in scored {
        if zset.add(member, score) {
            added += 1;
        }
    }
    Ok(Reply::Integer(added))
}

pub(crate) fn geodist(
    ks: &mut Keyspace,
    key: &str,
    from: &[u8],
    to: &[u8],
    unit: DistanceUnit,
) -> EngineResult<Reply> {
    let Some(entry) = ks.get(key) else {
        return Ok(Reply::Nil);
    };
    let zset = entry.value.as_sorted_set().ok_or(EngineError::WrongType)?;
    let (Some(a), Some(b)) = (zset.score(from), zset.score(to)) else {
        return Ok(Reply::Nil);
    };
    let (lon1, lat1) = geo::decode(a as u64);
    let (lon2, lat2) = geo::decode(b as u64);
    let meters = geo::haversine_distance(lon1, lat1, lon2, lat2);
    Ok(Reply::Double(unit.from_meters(meters)))
}

pub(crate) fn geopos(ks: &mut Keyspace, key: &str, members: &[Vec<u8>]) -> EngineResult<Reply> {
    let positions: Vec<Option<(f64, f64)>> = match ks.get(key) {
        Some(entry) => {
            let zset = entry.value.as_sorted_set().ok_or(EngineError::WrongType)?;
            members
                .iter()
                .map(|m| zset.score(m).map(|score| geo::decode(score as u64)))
                .collect()
        }
        None => vec![None; members.len()],
    };
    Ok(Reply::Array(
        positions
            .into_iter()
            .map(|pos| match pos {
                Some((lon, lat)) => Reply::Array(vec![Reply::Double(lon), Reply::Double(lat)]),
                None => Reply::Nil,
            })
            .collect(),
    ))
}

pub(crate) fn geosearch(
    ks: &mut Keyspace,
    key: &str,
    longitude: f64,
    latitude: f64,
    radius: f64,
    unit: DistanceUnit,
) -> EngineResult<Reply> {
    let Some(entry) = ks.get(key) else {
        return Ok(Reply::Array(vec![]));
    };
    let zset = entry.value.as_sorted_set().ok_or(EngineError::WrongType)?;

    let radius_m = unit.to_meters(radius);
    let mut hits: Vec<(Vec<u8>, f64)> = zset
        .iter()
        .filter_map(|(member, score)| {
            let (lon, lat) = geo::decode(score as u64);
            let d = geo::haversine_distance(longitude, latitude, lon, lat);
            (d <= radius_m).then(|| (member.to_vec(), d))
        })
        .collect();
    hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(Reply::bulk_array(hits.into_iter().map(|(member, _)| member)))
}
