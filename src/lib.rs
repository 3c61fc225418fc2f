//! # Cinder
//!
//! An embeddable, in-memory, multi-model data engine.
//!
//! Cinder implements the core data structures of a modern key-value store
//! (strings with expiry, lists, sets, sorted sets, hashes, geospatial
//! indexes, HyperLogLog, streams with consumer groups) behind a single
//! typed command interface, along with pub/sub messaging and batched or
//! atomic command execution — without any network or persistence layer.
//!
//! Callers construct an [`engine::Engine`] and drive it through
//! [`engine::Engine::execute`]:
//!
//! ```no_run
//! # async fn demo() -> Result<(), cinder::error::EngineError> {
//! use cinder::engine::Engine;
//!
//! let engine = Engine::new(Default::default());
//! engine.execute("RPUSH", &["names", "Syauqi"]).await?;
//! let reply = engine.execute("LRANGE", &["names", "0", "-1"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod pubsub;
pub mod reply;
pub mod store;
pub mod types;
pub mod waiters;
