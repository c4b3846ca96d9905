use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A recyclable view position that shows at most one image at a time.
///
/// Binding new work cancels whatever the slot was doing before, and the
/// cancelled work never reaches its `deliver` callback. Dropping the slot
/// cancels too.
#[derive(Debug, Default)]
pub struct BindingSlot {
    parent: Option<CancellationToken>,
    active: Option<ActiveBinding>,
}

#[derive(Debug)]
struct ActiveBinding {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl BindingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot whose bindings are also cancelled when `parent` is, e.g. when
    /// the whole screen goes away.
    pub fn with_parent(parent: &CancellationToken) -> Self {
        Self {
            parent: Some(parent.clone()),
            active: None,
        }
    }

    /// Cancel the current binding and start `make` under a fresh token.
    ///
    /// `deliver` runs with the result only if the binding is still live
    /// when the work completes. Must be called within a Tokio runtime.
    pub fn bind<F, Fut, T, D>(&mut self, make: F, deliver: D) -> CancellationToken
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        D: FnOnce(T) + Send + 'static,
    {
        self.unbind();

        let token = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let work = make(token.clone());
        let guard = token.clone();
        let task = tokio::spawn(async move {
            let value = tokio::select! {
                biased;
                _ = guard.cancelled() => return,
                value = work => value,
            };
            if !guard.is_cancelled() {
                deliver(value);
            }
        });

        self.active = Some(ActiveBinding {
            token: token.clone(),
            task,
        });
        token
    }

    pub fn unbind(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
        }
    }

    /// True while bound work has neither finished nor been cancelled.
    pub fn is_bound(&self) -> bool {
        self.active.as_ref().is_some_and(|active| {
            !active.token.is_cancelled() && !active.task.is_finished()
        })
    }
}

impl Drop for BindingSlot {
    fn drop(&mut self) {
        self.unbind();
    }
}
