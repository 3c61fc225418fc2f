use std::sync::Arc;
use std::time::Duration;

use cinder::config::{EngineConfig, StreamClock};
use cinder::engine::Engine;
use cinder::error::EngineError;
use cinder::reply::Reply;

fn engine() -> Engine {
    Engine::new(EngineConfig::default())
}

fn entry_ids(reply: &Reply) -> Vec<String> {
    reply
        .as_array()
        .expect("entry list")
        .iter()
        .map(|entry| {
            entry.as_array().expect("entry")[0]
                .as_str()
                .expect("id")
                .to_string()
        })
        .collect()
}

#[tokio::test]
async fn ping() {
    let engine = engine();
    let reply = engine.execute::<&str>("ping", &[]).await.unwrap();
    assert_eq!(reply, Reply::simple("PONG"));
}

#[tokio::test]
async fn string_value_disappears_after_ttl() {
    let engine = engine();
    engine
        .execute("SETEX", &["name", "1", "Eko"])
        .await
        .unwrap();
    let reply = engine.execute("GET", &["name"]).await.unwrap();
    assert_eq!(reply.as_str(), Some("Eko"));

    tokio::time::sleep(Duration::from_millis(1_200)).await;

    let reply = engine.execute("GET", &["name"]).await.unwrap();
    assert!(reply.is_nil());
}

#[tokio::test]
async fn key_lifecycle() {
    let engine = engine();
    engine.execute("SET", &["k", "v"]).await.unwrap();
    assert_eq!(
        engine.execute("TTL", &["k"]).await.unwrap().as_integer(),
        Some(-1)
    );
    assert_eq!(
        engine.execute("TYPE", &["k"]).await.unwrap(),
        Reply::simple("string")
    );

    assert_eq!(
        engine
            .execute("EXPIRE", &["k", "100"])
            .await
            .unwrap()
            .as_integer(),
        Some(1)
    );
    let ttl = engine.execute("TTL", &["k"]).await.unwrap().as_integer().unwrap();
    assert!(ttl > 0 && ttl <= 100);

    assert_eq!(
        engine.execute("DEL", &["k"]).await.unwrap().as_integer(),
        Some(1)
    );
    assert_eq!(
        engine.execute("EXISTS", &["k"]).await.unwrap().as_integer(),
        Some(0)
    );
    assert_eq!(
        engine.execute("TTL", &["k"]).await.unwrap().as_integer(),
        Some(-2)
    );
    assert!(engine.execute("GET", &["k"]).await.unwrap().is_nil());
}

#[tokio::test]
async fn list_push_range_pop_scenario() {
    let engine = engine();
    engine.execute("DEL", &["names"]).await.unwrap();
    for name in ["Syauqi", "Kurniawan", "Khannedy"] {
        engine.execute("RPUSH", &["names", name]).await.unwrap();
    }

    let all = engine.execute("LRANGE", &["names", "0", "-1"]).await.unwrap();
    assert_eq!(
        all.as_str_vec().unwrap(),
        vec!["Syauqi", "Kurniawan", "Khannedy"]
    );

    for expected in ["Syauqi", "Kurniawan", "Khannedy"] {
        let popped = engine.execute("LPOP", &["names"]).await.unwrap();
        assert_eq!(popped.as_str(), Some(expected));
    }
    assert!(engine.execute("LPOP", &["names"]).await.unwrap().is_nil());
    assert_eq!(
        engine.execute("LLEN", &["names"]).await.unwrap().as_integer(),
        Some(0)
    );
}

#[tokio::test]
async fn list_negative_indices_and_both_ends() {
    let engine = engine();
    assert_eq!(
        engine
            .execute("RPUSH", &["l", "a", "b", "c", "d"])
            .await
            .unwrap()
            .as_integer(),
        Some(4)
    );
    engine.execute("LPUSH", &["l", "z"]).await.unwrap();

    let tail = engine.execute("LRANGE", &["l", "-2", "-1"]).await.unwrap();
    assert_eq!(tail.as_str_vec().unwrap(), vec!["c", "d"]);

    assert_eq!(
        engine.execute("RPOP", &["l"]).await.unwrap().as_str(),
        Some("d")
    );
    assert_eq!(
        engine.execute("LPOP", &["l"]).await.unwrap().as_str(),
        Some("z")
    );
}

#[tokio::test]
async fn set_adds_are_idempotent_and_ordered() {
    let engine = engine();
    for member in ["Kunio", "Kunio", "Miyauchi", "Miyauchi", "Fuyuki", "Fuyuki"] {
        engine.execute("SADD", &["names", member]).await.unwrap();
    }

    assert_eq!(
        engine.execute("SCARD", &["names"]).await.unwrap().as_integer(),
        Some(3)
    );
    let members = engine.execute("SMEMBERS", &["names"]).await.unwrap();
    assert_eq!(
        members.as_str_vec().unwrap(),
        vec!["Kunio", "Miyauchi", "Fuyuki"]
    );

    assert_eq!(
        engine
            .execute("SREM", &["names", "Miyauchi"])
            .await
            .unwrap()
            .as_integer(),
        Some(1)
    );
    let members = engine.execute("SMEMBERS", &["names"]).await.unwrap();
    assert_eq!(members.as_str_vec().unwrap(), vec!["Kunio", "Fuyuki"]);
}

#[tokio::test]
async fn sorted_set_orders_by_score() {
    let engine = engine();
    engine.execute("ZADD", &["names", "100", "Toru"]).await.unwrap();
    engine.execute("ZADD", &["names", "90", "Fuyuki"]).await.unwrap();
    engine.execute("ZADD", &["names", "92", "Tetsuo"]).await.unwrap();

    let ordered = engine.execute("ZRANGE", &["names", "0", "-1"]).await.unwrap();
    assert_eq!(
        ordered.as_str_vec().unwrap(),
        vec!["Fuyuki", "Tetsuo", "Toru"]
    );

    // Re-adding repositions without duplicating.
    engine.execute("ZADD", &["names", "95", "Fuyuki"]).await.unwrap();
    assert_eq!(
        engine.execute("ZCARD", &["names"]).await.unwrap().as_integer(),
        Some(3)
    );
    let ordered = engine.execute("ZRANGE", &["names", "0", "-1"]).await.unwrap();
    assert_eq!(
        ordered.as_str_vec().unwrap(),
        vec!["Tetsuo", "Fuyuki", "Toru"]
    );
    assert_eq!(
        engine
            .execute("ZSCORE", &["names", "Fuyuki"])
            .await
            .unwrap()
            .as_double(),
        Some(95.0)
    );
}

#[tokio::test]
async fn hash_keeps_last_value_per_field() {
    let engine = engine();
    engine
        .execute("HSET", &["user:1", "name", "Tetsuo"])
        .await
        .unwrap();
    engine
        .execute("HSET", &["user:1", "email", "tetsuo@gmail.com"])
        .await
        .unwrap();
    engine.execute("HSET", &["user:1", "age", "29"]).await.unwrap();
    engine
        .execute("HSET", &["user:1", "email", "tetsuo@aol.com"])
        .await
        .unwrap();

    let reply = engine.execute("HGETALL", &["user:1"]).await.unwrap();
    let pairs = reply.as_map().unwrap();
    let lookup = |field: &str| {
        pairs
            .iter()
            .find(|(f, _)| f == field.as_bytes())
            .map(|(_, v)| std::str::from_utf8(v).unwrap())
    };
    assert_eq!(pairs.len(), 3);
    assert_eq!(lookup("name"), Some("Tetsuo"));
    assert_eq!(lookup("email"), Some("tetsuo@aol.com"));
    assert_eq!(lookup("age"), Some("29"));

    assert_eq!(
        engine
            .execute("HGET", &["user:1", "age"])
            .await
            .unwrap()
            .as_str(),
        Some("29")
    );
    assert_eq!(
        engine
            .execute("HDEL", &["user:1", "email"])
            .await
            .unwrap()
            .as_integer(),
        Some(1)
    );
}

#[tokio::test]
async fn type_mismatched_operations_fail_fast() {
    let engine = engine();
    engine.execute("SET", &["k", "v"]).await.unwrap();

    assert_eq!(
        engine.execute("RPUSH", &["k", "x"]).await.unwrap_err(),
        EngineError::WrongType
    );
    assert_eq!(
        engine.execute("SADD", &["k", "x"]).await.unwrap_err(),
        EngineError::WrongType
    );
    assert_eq!(
        engine.execute("ZADD", &["k", "1", "x"]).await.unwrap_err(),
        EngineError::WrongType
    );
    // The failed commands left the value untouched.
    assert_eq!(
        engine.execute("GET", &["k"]).await.unwrap().as_str(),
        Some("v")
    );

    // Delete-then-create is the sanctioned way to change type.
    engine.execute("DEL", &["k"]).await.unwrap();
    engine.execute("RPUSH", &["k", "x"]).await.unwrap();
    assert_eq!(
        engine.execute("TYPE", &["k"]).await.unwrap(),
        Reply::simple("list")
    );
}

#[tokio::test]
async fn dispatch_rejects_bad_input_before_mutating() {
    let engine = engine();
    assert!(matches!(
        engine.execute("FROB", &["x"]).await.unwrap_err(),
        EngineError::UnknownCommand(name) if name == "FROB"
    ));
    assert_eq!(
        engine.execute("GET", &["a", "b"]).await.unwrap_err(),
        EngineError::WrongArgCount("get".to_string())
    );
    assert_eq!(
        engine
            .execute("LRANGE", &["l", "zero", "-1"])
            .await
            .unwrap_err(),
        EngineError::NotInteger
    );
    // A ZADD with one bad score in the pair list writes nothing.
    assert_eq!(
        engine
            .execute("ZADD", &["z", "1", "a", "wat", "b"])
            .await
            .unwrap_err(),
        EngineError::NotFloat
    );
    assert_eq!(
        engine.execute("EXISTS", &["z"]).await.unwrap().as_integer(),
        Some(0)
    );
}

#[tokio::test]
async fn geo_distance_and_radius_search() {
    let engine = engine();
    engine
        .execute("GEOADD", &["sellers", "106.822702", "-6.177590", "Store A"])
        .await
        .unwrap();
    engine
        .execute("GEOADD", &["sellers", "106.820889", "-6.174964", "Store B"])
        .await
        .unwrap();

    // Haversine reference distance is ~354.3 m; geocode decoding may be
    // off by the ~0.6 m cell quantization per endpoint.
    let meters = engine
        .execute("GEODIST", &["sellers", "Store A", "Store B", "m"])
        .await
        .unwrap()
        .as_double()
        .unwrap();
    assert!((meters - 354.3).abs() < 3.0, "got {meters}");

    let km = engine
        .execute("GEODIST", &["sellers", "Store A", "Store B", "km"])
        .await
        .unwrap()
        .as_double()
        .unwrap();
    assert!((km - 0.3543).abs() < 0.003, "got {km}");

    // Unknown member: nil, not an error.
    assert!(
        engine
            .execute("GEODIST", &["sellers", "Store A", "Store Z"])
            .await
            .unwrap()
            .is_nil()
    );

    // A point between the two stores sees both, nearest first.
    let both = engine
        .execute(
            "GEOSEARCH",
            &["sellers", "FROMLONLAT", "106.821825", "-6.175105", "BYRADIUS", "500", "m"],
        )
        .await
        .unwrap();
    assert_eq!(both.as_str_vec().unwrap(), vec!["Store B", "Store A"]);

    // A tight radius around Store A excludes Store B.
    let near_a = engine
        .execute(
            "GEOSEARCH",
            &["sellers", "FROMLONLAT", "106.822702", "-6.177590", "BYRADIUS", "10", "m"],
        )
        .await
        .unwrap();
    assert_eq!(near_a.as_str_vec().unwrap(), vec!["Store A"]);

    // Decoded positions land within a geocode cell of the input.
    let pos = engine
        .execute("GEOPOS", &["sellers", "Store A"])
        .await
        .unwrap();
    let coords = pos.as_array().unwrap()[0].as_array().unwrap();
    assert!((coords[0].as_double().unwrap() - 106.822702).abs() < 1e-4);
    assert!((coords[1].as_double().unwrap() - (-6.177590)).abs() < 1e-4);
}

#[tokio::test]
async fn hyperloglog_counts_distinct_elements() {
    let engine = engine();
    engine
        .execute("PFADD", &["visitors", "anri", "minami"])
        .await
        .unwrap();
    engine
        .execute("PFADD", &["visitors", "anri", "minami", "konomi"])
        .await
        .unwrap();
    engine
        .execute("PFADD", &["visitors", "teruaki", "nagura", "konomi"])
        .await
        .unwrap();

    // 5 distinct elements; linear counting is near-exact at this size.
    let count = engine
        .execute("PFCOUNT", &["visitors"])
        .await
        .unwrap()
        .as_integer()
        .unwrap();
    assert!((4..=6).contains(&count), "got {count}");

    // Re-adding the same elements must not grow the estimate.
    engine
        .execute("PFADD", &["visitors", "anri", "minami", "konomi"])
        .await
        .unwrap();
    let again = engine
        .execute("PFCOUNT", &["visitors"])
        .await
        .unwrap()
        .as_integer()
        .unwrap();
    assert_eq!(again, count);

    // Union estimates dominate every individual sketch.
    engine
        .execute("PFADD", &["mobile", "anri", "hatsune", "sakura"])
        .await
        .unwrap();
    let mobile = engine
        .execute("PFCOUNT", &["mobile"])
        .await
        .unwrap()
        .as_integer()
        .unwrap();
    let union = engine
        .execute("PFCOUNT", &["visitors", "mobile"])
        .await
        .unwrap()
        .as_integer()
        .unwrap();
    assert!(union >= count && union >= mobile);

    engine
        .execute("PFMERGE", &["all", "visitors", "mobile"])
        .await
        .unwrap();
    let merged = engine
        .execute("PFCOUNT", &["all"])
        .await
        .unwrap()
        .as_integer()
        .unwrap();
    assert_eq!(merged, union);
}

#[tokio::test]
async fn pipeline_collects_results_in_order() {
    let engine = engine();
    let results = engine
        .pipeline(&[
            ("SETEX", vec!["name", "3", "Syauqi"]),
            ("SETEX", vec!["address", "2", "Indonesia"]),
            ("GET", vec!["name"]),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Ok(Reply::Ok));
    assert_eq!(results[1], Ok(Reply::Ok));
    assert_eq!(results[2].as_ref().unwrap().as_str(), Some("Syauqi"));

    assert_eq!(
        engine.execute("GET", &["address"]).await.unwrap().as_str(),
        Some("Indonesia")
    );
}

#[tokio::test]
async fn transaction_applies_all_commands() {
    let engine = engine();
    let results = engine
        .transaction(&[
            ("SETEX", vec!["name", "3", "Syauqi"]),
            ("SETEX", vec!["address", "2", "Indonesia"]),
        ])
        .await;
    assert!(results.iter().all(|r| r == &Ok(Reply::Ok)));

    assert_eq!(
        engine.execute("GET", &["name"]).await.unwrap().as_str(),
        Some("Syauqi")
    );
    assert_eq!(
        engine.execute("GET", &["address"]).await.unwrap().as_str(),
        Some("Indonesia")
    );
}

#[tokio::test]
async fn transaction_failure_does_not_abort_the_batch() {
    let engine = engine();
    let results = engine
        .transaction(&[
            ("SET", vec!["k", "v"]),
            ("RPUSH", vec!["k", "x"]),
            ("GET", vec!["k"]),
        ])
        .await;

    assert_eq!(results[0], Ok(Reply::Ok));
    assert_eq!(results[1], Err(EngineError::WrongType));
    assert_eq!(results[2].as_ref().unwrap().as_str(), Some("v"));
}

#[tokio::test]
async fn concurrent_transactions_never_interleave() {
    let engine = Arc::new(engine());

    let a = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .transaction(&[
                    ("RPUSH", vec!["seq", "a1"]),
                    ("RPUSH", vec!["seq", "a2"]),
                ])
                .await
        })
    };
    let b = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .transaction(&[
                    ("RPUSH", vec!["seq", "b1"]),
                    ("RPUSH", vec!["seq", "b2"]),
                ])
                .await
        })
    };
    a.await.unwrap();
    b.await.unwrap();

    let seq = engine.execute("LRANGE", &["seq", "0", "-1"]).await.unwrap();
    let seq = seq.as_str_vec().unwrap();
    assert!(
        seq == vec!["a1", "a2", "b1", "b2"] || seq == vec!["b1", "b2", "a1", "a2"],
        "transactions interleaved: {seq:?}"
    );
}

#[tokio::test]
async fn concurrent_transactions_on_disjoint_keys_complete() {
    let engine = Arc::new(engine());
    let mut tasks = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            let key = format!("k{i}");
            engine
                .transaction(&[
                    ("RPUSH", vec![key.as_str(), "x"]),
                    ("RPUSH", vec![key.as_str(), "y"]),
                ])
                .await
        }));
    }
    for task in tasks {
        let results = task.await.unwrap();
        assert!(results.iter().all(|r| r.is_ok()));
    }
}

#[tokio::test]
async fn publish_fans_out_to_every_subscriber() {
    let engine = engine();

    // No subscribers yet: messages are dropped, not buffered.
    assert_eq!(
        engine
            .execute("PUBLISH", &["channel-1", "early"])
            .await
            .unwrap()
            .as_integer(),
        Some(0)
    );

    let mut first = engine.subscribe("channel-1").await;
    let mut second = engine.subscribe("channel-1").await;
    let mut other = engine.subscribe("channel-2").await;

    for i in 0..10 {
        let hello = format!("Hello World {i}");
        let bye = format!("Good Bye {i}");
        assert_eq!(
            engine
                .execute("PUBLISH", &["channel-1", hello.as_str()])
                .await
                .unwrap()
                .as_integer(),
            Some(2)
        );
        assert_eq!(
            engine
                .execute("PUBLISH", &["channel-2", bye.as_str()])
                .await
                .unwrap()
                .as_integer(),
            Some(1)
        );
    }

    for i in 0..10 {
        let expected = format!("Hello World {i}");
        assert_eq!(first.recv().await.unwrap().payload, expected.as_bytes());
        assert_eq!(second.recv().await.unwrap().payload, expected.as_bytes());
        let expected = format!("Good Bye {i}");
        assert_eq!(other.recv().await.unwrap().payload, expected.as_bytes());
    }

    engine.unsubscribe(second).await;
    assert_eq!(
        engine
            .execute("PUBLISH", &["channel-1", "after"])
            .await
            .unwrap()
            .as_integer(),
        Some(1)
    );
    assert_eq!(first.recv().await.unwrap().payload, b"after");
}

#[tokio::test]
async fn stream_ids_increase_within_one_millisecond() {
    let config = EngineConfig {
        stream_clock: StreamClock::fixed(1_000),
        ..Default::default()
    };
    let engine = Engine::new(config);

    let first = engine
        .execute("XADD", &["members", "*", "name", "Eko 0"])
        .await
        .unwrap();
    let second = engine
        .execute("XADD", &["members", "*", "name", "Eko 1"])
        .await
        .unwrap();
    assert_eq!(first.as_str(), Some("1000-0"));
    assert_eq!(second.as_str(), Some("1000-1"));

    // An explicit ID at or below the last one is rejected.
    assert_eq!(
        engine
            .execute("XADD", &["members", "1000-1", "name", "dup"])
            .await
            .unwrap_err(),
        EngineError::StreamIdTooSmall
    );
    assert_eq!(
        engine.execute("XLEN", &["members"]).await.unwrap().as_integer(),
        Some(2)
    );
}

#[tokio::test]
async fn stream_append_and_range() {
    let engine = engine();
    for i in 0..10 {
        let name = format!("Eko {i}");
        engine
            .execute(
                "XADD",
                &["members", "*", "name", name.as_str(), "address", "Indonesia"],
            )
            .await
            .unwrap();
    }
    assert_eq!(
        engine.execute("XLEN", &["members"]).await.unwrap().as_integer(),
        Some(10)
    );

    let all = engine.execute("XRANGE", &["members", "-", "+"]).await.unwrap();
    let ids = entry_ids(&all);
    assert_eq!(ids.len(), 10);
    let mut sorted = ids.clone();
    sorted.sort();
    // IDs come back in append order, strictly increasing.
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn consumer_group_delivery_and_acknowledgement() {
    let engine = engine();
    for i in 0..10 {
        let name = format!("Eko {i}");
        engine
            .execute("XADD", &["members", "*", "name", name.as_str()])
            .await
            .unwrap();
    }

    engine
        .execute("XGROUP", &["CREATE", "members", "group1", "0"])
        .await
        .unwrap();
    assert_eq!(
        engine
            .execute("XGROUP", &["CREATECONSUMER", "members", "group1", "consumer-1"])
            .await
            .unwrap()
            .as_integer(),
        Some(1)
    );
    assert_eq!(
        engine
            .execute("XGROUP", &["CREATECONSUMER", "members", "group1", "consumer-1"])
            .await
            .unwrap()
            .as_integer(),
        Some(0)
    );

    // Creating the same group twice is an error.
    assert_eq!(
        engine
            .execute("XGROUP", &["CREATE", "members", "group1", "0"])
            .await
            .unwrap_err(),
        EngineError::GroupExists("group1".to_string())
    );

    let first = engine
        .execute(
            "XREADGROUP",
            &["GROUP", "group1", "consumer-1", "COUNT", "3", "STREAMS", "members", ">"],
        )
        .await
        .unwrap();
    let first_ids = entry_ids(&first);
    assert_eq!(first_ids.len(), 3);

    // The cursor advanced: the next read never redelivers.
    let second = engine
        .execute(
            "XREADGROUP",
            &["GROUP", "group1", "consumer-2", "COUNT", "3", "STREAMS", "members", ">"],
        )
        .await
        .unwrap();
    let second_ids = entry_ids(&second);
    assert_eq!(second_ids.len(), 3);
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

    // Unacknowledged deliveries sit in the consumer's pending view.
    let replay = engine
        .execute(
            "XREADGROUP",
            &["GROUP", "group1", "consumer-1", "STREAMS", "members", "0"],
        )
        .await
        .unwrap();
    assert_eq!(entry_ids(&replay), first_ids);

    // Acknowledged entries leave the PEL.
    let acked = engine
        .execute("XACK", &["members", "group1", first_ids[0].as_str()])
        .await
        .unwrap();
    assert_eq!(acked.as_integer(), Some(1));
    let replay = engine
        .execute(
            "XREADGROUP",
            &["GROUP", "group1", "consumer-1", "STREAMS", "members", "0"],
        )
        .await
        .unwrap();
    assert_eq!(entry_ids(&replay), first_ids[1..].to_vec());

    // Removing a consumer reports its pending count; an unknown one errors.
    assert_eq!(
        engine
            .execute("XGROUP", &["DELCONSUMER", "members", "group1", "consumer-1"])
            .await
            .unwrap()
            .as_integer(),
        Some(2)
    );
    assert_eq!(
        engine
            .execute("XGROUP", &["DELCONSUMER", "members", "group1", "ghost"])
            .await
            .unwrap_err(),
        EngineError::ConsumerNotFound("ghost".to_string())
    );
}

#[tokio::test]
async fn read_group_on_missing_group_errors() {
    let engine = engine();
    engine
        .execute("XADD", &["members", "*", "name", "Eko"])
        .await
        .unwrap();
    assert_eq!(
        engine
            .execute(
                "XREADGROUP",
                &["GROUP", "nope", "c", "STREAMS", "members", ">"],
            )
            .await
            .unwrap_err(),
        EngineError::GroupNotFound("nope".to_string())
    );
}

#[tokio::test]
async fn blocked_read_times_out_to_nil() {
    let engine = engine();
    engine
        .execute("XGROUP", &["CREATE", "members", "group1", "0"])
        .await
        .unwrap();

    let started = std::time::Instant::now();
    let reply = engine
        .execute(
            "XREADGROUP",
            &["GROUP", "group1", "consumer-1", "COUNT", "3", "BLOCK", "150", "STREAMS", "members", ">"],
        )
        .await
        .unwrap();
    assert!(reply.is_nil());
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn blocked_read_wakes_on_append() {
    let engine = Arc::new(engine());
    engine
        .execute("XGROUP", &["CREATE", "members", "group1", "0"])
        .await
        .unwrap();

    let producer = {
        let engine = engine.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            engine
                .execute("XADD", &["members", "*", "name", "Eko"])
                .await
                .unwrap();
        })
    };

    let reply = engine
        .execute(
            "XREADGROUP",
            &["GROUP", "group1", "consumer-1", "BLOCK", "3000", "STREAMS", "members", ">"],
        )
        .await
        .unwrap();
    producer.await.unwrap();

    let ids = entry_ids(&reply);
    assert_eq!(ids.len(), 1);
}
