use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::transport::BoxFuture;

type Action<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>;

struct State<A> {
    pending: Option<A>,
    timer: Option<JoinHandle<()>>,
    // bumped on every schedule/flush/cancel; a timer only fires for its own generation
    generation: u64,
}

/// Trailing-edge debouncer: of all `schedule` calls inside a quiet window,
/// only the last one runs, with its arguments.
///
/// A fired invocation is detached from the timer, so `cancel` and a later
/// `schedule` never interrupt work that already started.
pub struct Debouncer<A> {
    state: Arc<Mutex<State<A>>>,
    action: Action<A>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(State { pending: None, timer: None, generation: 0 })),
            action: Arc::new(move |args: A| -> BoxFuture<'static, ()> { Box::pin(action(args)) }),
        }
    }

    /// Replace any pending invocation with `args`, firing after `delay`.
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, args: A, delay: Duration) {
        let mut state = lock(&self.state);
        state.generation += 1;
        let generation = state.generation;
        state.pending = Some(args);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let shared = Arc::clone(&self.state);
        let action = Arc::clone(&self.action);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let args = {
                let mut state = lock(&shared);
                if state.generation != generation {
                    return;
                }
                // detach: from here on nothing may abort this task
                state.timer = None;
                state.pending.take()
            };
            if let Some(args) = args {
                action(args).await;
            }
        }));
    }

    /// Run the pending invocation now. Returns its task handle, or `None`
    /// when nothing was pending.
    pub fn flush(&self) -> Option<JoinHandle<()>> {
        let args = {
            let mut state = lock(&self.state);
            state.generation += 1;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.pending.take()
        }?;
        // the action runs synchronously in flush order; only its future is spawned
        let fut = (self.action)(args);
        Some(tokio::spawn(fut))
    }

    /// Drop the pending invocation. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut state = lock(&self.state);
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.state).timer.take() {
            timer.abort();
        }
    }
}

fn lock<A>(state: &Mutex<State<A>>) -> MutexGuard<'_, State<A>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
