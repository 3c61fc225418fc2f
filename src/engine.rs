use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{self, Command, ReadFrom};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::pubsub::{Broker, SharedBroker, Subscription};
use crate::reply::Reply;
use crate::store::{Keyspace, SharedStore};
use crate::types::hyperloglog::{MAX_PRECISION, MIN_PRECISION};
use crate::waiters::StreamWaiters;

/// Handle to one store instance.
///
/// The engine owns the keyspace, the pub/sub broker, and the background
/// expiry sweeper. Callers share it behind an `Arc`; every command goes
/// through [`Engine::execute`] (or a [`Engine::pipeline`] /
/// [`Engine::transaction`] batch). Construct it inside a tokio runtime —
/// the sweeper task is spawned at creation.
#[derive(Debug)]
pub struct Engine {
    store: SharedStore,
    broker: SharedBroker,
    waiters: Arc<StreamWaiters>,
    config: EngineConfig,
    shutdown: CancellationToken,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut config = config;
        let clamped = config.hll_precision.clamp(MIN_PRECISION, MAX_PRECISION);
        if clamped != config.hll_precision {
            warn!(
                requested = config.hll_precision,
                clamped, "HyperLogLog precision out of range"
            );
            config.hll_precision = clamped;
        }

        let store: SharedStore = Arc::new(RwLock::new(Keyspace::new(
            config.stream_clock.clone(),
            config.hll_precision,
        )));
        let shutdown = CancellationToken::new();
        spawn_sweeper(
            store.clone(),
            config.sweep_interval,
            config.sweep_sample,
            shutdown.clone(),
        );
        info!(
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            hll_precision = config.hll_precision,
            "engine started"
        );

        Engine {
            store,
            broker: Arc::new(RwLock::new(Broker::new())),
            waiters: Arc::new(StreamWaiters::new()),
            config,
            shutdown,
        }
    }

    /// Stop the background sweeper. Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Execute a single command by name.
    ///
    /// Arity and argument types are checked before any state changes;
    /// every error comes back as a typed `EngineError`, never a panic.
    pub async fn execute<A: AsRef<[u8]>>(&self, name: &str, args: &[A]) -> EngineResult<Reply> {
        let args: Vec<Vec<u8>> = args.iter().map(|a| a.as_ref().to_vec()).collect();
        let cmd = command::parse(name, &args)?;
        self.run(cmd).await
    }

    /// Run a batch without isolation: each command locks independently,
    /// so other callers may interleave between them. Results come back in
    /// submission order.
    pub async fn pipeline<A: AsRef<[u8]>>(
        &self,
        commands: &[(&str, Vec<A>)],
    ) -> Vec<EngineResult<Reply>> {
        self.run_batch(commands, false).await
    }

    /// Run a batch atomically: the store's write lock is held from the
    /// first command to the last, so no other caller's command can
    /// interleave. An individual command may still fail without aborting
    /// the rest. A blocking stream read inside the batch degrades to an
    /// immediate poll — nothing may suspend while the lock is held.
    pub async fn transaction<A: AsRef<[u8]>>(
        &self,
        commands: &[(&str, Vec<A>)],
    ) -> Vec<EngineResult<Reply>> {
        self.run_batch(commands, true).await
    }

    /// Subscribe to a channel. Messages published from now on are queued
    /// to the returned feed, up to the configured buffer bound.
    pub async fn subscribe(&self, channel: &str) -> Subscription {
        self.broker
            .write()
            .await
            .subscribe(channel, self.config.subscriber_buffer)
    }

    /// End a subscription explicitly. (Dropping the `Subscription` works
    /// too; the broker then prunes it on the next publish.)
    pub async fn unsubscribe(&self, sub: Subscription) {
        self.broker.write().await.unsubscribe(&sub.channel, sub.id);
    }

    /// Publish a message, returning how many subscribers it was queued to.
    pub async fn publish(&self, channel: &str, payload: &[u8]) -> usize {
        self.broker.write().await.publish(channel, payload)
    }

    async fn run(&self, cmd: Command) -> EngineResult<Reply> {
        match cmd {
            // The one operation allowed to suspend the caller: a group
            // read for new entries with a BLOCK bound.
            Command::XReadGroup {
                group,
                consumer,
                key,
                from: ReadFrom::NewEntries,
                count,
                block: Some(wait),
            } => {
                self.read_group_blocking(group, consumer, key, count, wait)
                    .await
            }
            cmd => {
                let mut ks = self.store.write().await;
                self.apply(&mut ks, cmd).await
            }
        }
    }

    async fn run_batch<A: AsRef<[u8]>>(
        &self,
        commands: &[(&str, Vec<A>)],
        atomic: bool,
    ) -> Vec<EngineResult<Reply>> {
        let mut results = Vec::with_capacity(commands.len());
        if atomic {
            let mut ks = self.store.write().await;
            for (name, args) in commands {
                let args: Vec<Vec<u8>> = args.iter().map(|a| a.as_ref().to_vec()).collect();
                let outcome = match command::parse(name, &args) {
                    Ok(cmd) => self.apply(&mut ks, cmd).await,
                    Err(e) => Err(e),
                };
                results.push(outcome);
            }
        } else {
            for (name, args) in commands {
                let args: Vec<Vec<u8>> = args.iter().map(|a| a.as_ref().to_vec()).collect();
                let outcome = match command::parse(name, &args) {
                    Ok(cmd) => self.run(cmd).await,
                    Err(e) => Err(e),
                };
                results.push(outcome);
            }
        }
        results
    }

    /// Apply one parsed command under an already-held store guard,
    /// routing PUBLISH to the broker and waking stream waiters after a
    /// successful XADD (while the guard is still held, so a wakeup can
    /// never race past a parked reader's registration).
    async fn apply(&self, ks: &mut Keyspace, cmd: Command) -> EngineResult<Reply> {
        match cmd {
            Command::Publish { channel, message } => {
                let delivered = self.broker.write().await.publish(&channel, &message);
                Ok(Reply::Integer(delivered as i64))
            }
            cmd => {
                let stream_key = match &cmd {
                    Command::XAdd { key, .. } => Some(key.clone()),
                    _ => None,
                };
                let result = command::apply(ks, cmd);
                if result.is_ok() {
                    if let Some(key) = stream_key {
                        self.waiters.notify(&key);
                    }
                }
                result
            }
        }
    }

    async fn read_group_blocking(
        &self,
        group: String,
        consumer: String,
        key: String,
        count: Option<usize>,
        wait: Duration,
    ) -> EngineResult<Reply> {
        // BLOCK 0 means wait with no deadline, by explicit request.
        let deadline = if wait.is_zero() {
            None
        } else {
            Some(tokio::time::Instant::now() + wait)
        };

        loop {
            let notify = {
                let mut ks = self.store.write().await;
                let reply = command::stream::read_group(
                    &mut ks,
                    &group,
                    &consumer,
                    &key,
                    ReadFrom::NewEntries,
                    count,
                )?;
                if !reply.is_nil() {
                    return Ok(reply);
                }
                // Nothing new: register the waiter before the store lock
                // drops, so an XADD in the gap still wakes us.
                self.waiters.register(&key)
            };

            let woken = match deadline {
                Some(at) => tokio::time::timeout_at(at, notify.notified()).await.is_ok(),
                None => {
                    notify.notified().await;
                    true
                }
            };
            if !woken {
                // Timed out: a distinguished empty result, not an error.
                // Drop our registration so nothing dangles on the key.
                self.waiters.unregister(&key, &notify);
                return Ok(Reply::Nil);
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn spawn_sweeper(
    store: SharedStore,
    interval: Duration,
    sample: usize,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = store.write().await.active_expire(sample);
                    if removed > 0 {
                        debug!(removed, "expiry sweep");
                    }
                }
            }
        }
        debug!("expiry sweeper stopped");
    });
}
