//! # Store Actor
//!
//! One task owns a store's state. Everything that changes it arrives as a
//! message, so there is never more than one writer.
//!
//! ## Message Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  StoreHandle::run(fallback, call, settle)                               │
//! │       │                                                                 │
//! │       │ Command::Run ────────────────┐                                  │
//! │       ▼                              ▼                                  │
//! │  ┌──────────────────────────────────────────┐                           │
//! │  │ StoreActor                               │                           │
//! │  │   1. lifecycle.begin()   (pending)       │──► watch: snapshot        │
//! │  │   2. spawn(call)  ─────────────┐         │                           │
//! │  │                                │ awaits  │                           │
//! │  │                                ▼ source  │                           │
//! │  │   3. settled_rx ◄── Reduce ── task       │                           │
//! │  │   4. settle(&mut state, outcome)         │──► watch: snapshot        │
//! │  └──────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       └──► oneshot: settle's return value back to the caller           │
//! │                                                                         │
//! │  StoreHandle::apply(f)  ─► Command::Apply ─► f(&mut state) ─► snapshot │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overlap
//! Calls run concurrently in their own tasks. Settlements are applied in the
//! order they arrive, each overwriting the shared lifecycle flags: the last
//! settlement wins. Nothing is cancelled and nothing is retried.
//!
//! ## Panics
//! A call that panics is caught in its task and settles as
//! `Rejected(fallback)`, so the lifecycle always leaves pending.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};

use crm_core::{RequestLifecycle, Settlement};

use crate::error::{StoreError, StoreResult};

/// Capacity of the command and settlement queues.
const QUEUE_CAPACITY: usize = 64;

// =============================================================================
// Store State
// =============================================================================

/// State owned by a [`StoreActor`].
///
/// Every store composes one [`RequestLifecycle`]; the actor moves it to
/// pending when a call starts.
pub trait StoreState: Clone + Send + Sync + 'static {
    fn lifecycle_mut(&mut self) -> &mut RequestLifecycle;
}

/// A state transition queued for the actor.
type Reduce<S> = Box<dyn FnOnce(&mut S) + Send>;

enum Command<S> {
    /// Synchronous reducer.
    Apply(Reduce<S>),
    /// Data-source call; resolves to the reducer that settles it.
    Run(BoxFuture<'static, Reduce<S>>),
}

// =============================================================================
// Store Handle
// =============================================================================

/// Cloneable handle to a running store actor.
pub struct StoreHandle<S> {
    name: &'static str,
    commands: mpsc::Sender<Command<S>>,
    snapshots: watch::Receiver<S>,
    shutdown_tx: mpsc::Sender<()>,
}

impl<S> Clone for StoreHandle<S> {
    fn clone(&self) -> Self {
        StoreHandle {
            name: self.name,
            commands: self.commands.clone(),
            snapshots: self.snapshots.clone(),
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }
}

impl<S> std::fmt::Debug for StoreHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle").field("name", &self.name).finish()
    }
}

impl<S: StoreState> StoreHandle<S> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Applies `reduce` on the actor and returns its result.
    pub async fn apply<R, F>(&self, reduce: F) -> StoreResult<R>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let reduce: Reduce<S> = Box::new(move |state| {
            let _ = reply_tx.send(reduce(state));
        });
        self.send(Command::Apply(reduce)).await?;
        reply_rx.await.map_err(|_| StoreError::ShuttingDown(self.name))
    }

    /// Starts `call`, then applies `settle` to its settlement once it resolves.
    ///
    /// The lifecycle goes pending before `call` is polled. The returned
    /// future completes after the settlement has been applied and published.
    /// If `call` panics, `settle` receives `Rejected(fallback)`.
    pub async fn run<T, R, C, F>(&self, fallback: &'static str, call: C, settle: F) -> StoreResult<R>
    where
        C: Future<Output = Settlement<T>> + Send + 'static,
        T: Send + 'static,
        F: FnOnce(&mut S, Settlement<T>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let name = self.name;
        let work = async move {
            let outcome = match AssertUnwindSafe(call).catch_unwind().await {
                Ok(settlement) => settlement,
                Err(panic) => {
                    error!(store = name, panic = panic_message(&*panic), "{}", fallback);
                    Settlement::Rejected(fallback.to_string())
                }
            };
            let reduce: Reduce<S> = Box::new(move |state| {
                let _ = reply_tx.send(settle(state, outcome));
            });
            reduce
        }
        .boxed();
        self.send(Command::Run(work)).await?;
        reply_rx.await.map_err(|_| StoreError::ShuttingDown(self.name))
    }

    /// The latest published state.
    pub fn snapshot(&self) -> S {
        self.snapshots.borrow().clone()
    }

    /// A receiver that sees every published state.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.snapshots.clone()
    }

    /// Stops the actor. Calls still in flight never settle.
    pub async fn shutdown(&self) -> StoreResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| StoreError::channel(self.name, "Failed to send shutdown signal"))
    }

    /// Returns true once the actor task has exited.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Completes when the actor task has exited.
    pub async fn closed(&self) {
        self.commands.closed().await
    }

    async fn send(&self, command: Command<S>) -> StoreResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| StoreError::channel(self.name, "Failed to send command"))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

// =============================================================================
// Store Actor
// =============================================================================

/// The task that owns one store's state.
pub struct StoreActor<S> {
    name: &'static str,
    state: S,
    commands: mpsc::Receiver<Command<S>>,
    settled_tx: mpsc::Sender<Reduce<S>>,
    settled_rx: mpsc::Receiver<Reduce<S>>,
    shutdown_rx: mpsc::Receiver<()>,
    snapshots: watch::Sender<S>,
}

impl<S: StoreState> StoreActor<S> {
    /// Spawns the actor task with `initial` state and returns its handle.
    pub fn spawn(name: &'static str, initial: S) -> StoreHandle<S> {
        let (commands_tx, commands) = mpsc::channel(QUEUE_CAPACITY);
        let (settled_tx, settled_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (snapshots, snapshots_rx) = watch::channel(initial.clone());

        let actor = StoreActor {
            name,
            state: initial,
            commands,
            settled_tx,
            settled_rx,
            shutdown_rx,
            snapshots,
        };
        tokio::spawn(actor.run());

        StoreHandle {
            name,
            commands: commands_tx,
            snapshots: snapshots_rx,
            shutdown_tx,
        }
    }

    async fn run(mut self) {
        info!(store = self.name, "Store starting");

        loop {
            tokio::select! {
                Some(command) = self.commands.recv() => {
                    self.handle(command);
                }
                Some(reduce) = self.settled_rx.recv() => {
                    reduce(&mut self.state);
                    self.publish();
                }
                // Also fires when every handle has been dropped
                _ = self.shutdown_rx.recv() => {
                    info!(store = self.name, "Store received shutdown signal");
                    break;
                }
            }
        }

        info!(store = self.name, "Store stopped");
    }

    fn handle(&mut self, command: Command<S>) {
        match command {
            Command::Apply(reduce) => {
                reduce(&mut self.state);
                self.publish();
            }
            Command::Run(work) => {
                self.state.lifecycle_mut().begin();
                self.publish();

                let settled_tx = self.settled_tx.clone();
                let name = self.name;
                tokio::spawn(async move {
                    let reduce = work.await;
                    if settled_tx.send(reduce).await.is_err() {
                        debug!(store = name, "Store stopped before the call settled");
                    }
                });
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[derive(Debug, Clone, Default)]
    struct Counter {
        value: i32,
        lifecycle: RequestLifecycle,
    }

    impl StoreState for Counter {
        fn lifecycle_mut(&mut self) -> &mut RequestLifecycle {
            &mut self.lifecycle
        }
    }

    #[tokio::test]
    async fn test_apply_returns_reducer_result() {
        let handle = StoreActor::spawn("counter", Counter::default());
        let value = handle
            .apply(|s: &mut Counter| {
                s.value += 2;
                s.value
            })
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(handle.snapshot().value, 2);
    }

    #[tokio::test]
    async fn test_run_goes_pending_then_settles() {
        let handle = StoreActor::spawn("counter", Counter::default());
        let mut snapshots = handle.subscribe();
        let (gate_tx, gate_rx) = oneshot::channel::<()>();

        let runner = handle.clone();
        let call = tokio::spawn(async move {
            let work = async move {
                let _ = gate_rx.await;
                Settlement::Fulfilled(5)
            };
            runner
                .run("Failed to count", work, |s: &mut Counter, outcome| {
                    if let Some(v) = s.lifecycle.settle(outcome) {
                        s.value = v;
                    }
                    s.value
                })
                .await
        });

        snapshots.changed().await.unwrap();
        assert!(snapshots.borrow_and_update().lifecycle.is_loading());

        gate_tx.send(()).unwrap();
        assert_eq!(call.await.unwrap().unwrap(), 5);
        let state = handle.snapshot();
        assert!(!state.lifecycle.is_loading());
        assert_eq!(state.value, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_settlement_wins() {
        let handle = StoreActor::spawn("counter", Counter::default());

        let slow = handle.run(
            "Failed to count",
            async {
                sleep(Duration::from_millis(800)).await;
                Settlement::<i32>::Rejected("slow failed".into())
            },
            |s: &mut Counter, outcome| {
                s.lifecycle.settle(outcome);
            },
        );
        let fast = handle.run(
            "Failed to count",
            async {
                sleep(Duration::from_millis(300)).await;
                Settlement::Fulfilled(1)
            },
            |s: &mut Counter, outcome| {
                if let Some(v) = s.lifecycle.settle(outcome) {
                    s.value = v;
                }
            },
        );
        let (slow, fast) = tokio::join!(slow, fast);
        slow.unwrap();
        fast.unwrap();

        // The fast call's value stays, the slow call's failure owns the flags
        let state = handle.snapshot();
        assert_eq!(state.value, 1);
        assert!(!state.lifecycle.is_loading());
        assert_eq!(state.lifecycle.error(), Some("slow failed"));
    }

    #[tokio::test]
    async fn test_panicking_call_settles_with_fallback() {
        let handle = StoreActor::spawn("counter", Counter::default());

        let name = handle.name();
        let call = async move {
            if name == "counter" {
                panic!("attempt to add with overflow");
            }
            Settlement::Fulfilled(1)
        };
        let settled = handle
            .run("Failed to count", call, |s: &mut Counter, outcome| {
                s.lifecycle.settle(outcome.clone());
                outcome
            })
            .await
            .unwrap();
        assert_eq!(settled, Settlement::Rejected("Failed to count".into()));

        let state = handle.snapshot();
        assert!(!state.lifecycle.is_loading());
        assert_eq!(state.lifecycle.error(), Some("Failed to count"));

        // The actor is still serving
        handle
            .apply(|s: &mut Counter| s.lifecycle.clear_error())
            .await
            .unwrap();
        assert_eq!(handle.snapshot().lifecycle.error(), None);
    }

    #[tokio::test]
    async fn test_shutdown_closes_the_store() {
        let handle = StoreActor::spawn("counter", Counter::default());
        handle.shutdown().await.unwrap();

        for _ in 0..100 {
            if handle.is_closed() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(handle.is_closed());
        assert!(matches!(
            handle.apply(|s: &mut Counter| s.value).await,
            Err(StoreError::ChannelError { .. })
        ));
    }
}
