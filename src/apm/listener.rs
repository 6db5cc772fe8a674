use std::ops::DerefMut;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::apm::event::{BulkStarted, BulkCompleted};
use crate::error::Result;

pub type StartHook = fn(&BulkStarted);
pub type CompletionHook = fn(&BulkCompleted);

/// Registry of monitoring hooks for bulk operations.
pub struct Listener {
    no_start_hooks: AtomicBool,
    no_completion_hooks: AtomicBool,
    start_hooks: RwLock<Vec<StartHook>>,
    completion_hooks: RwLock<Vec<CompletionHook>>,
}

impl Listener {
    pub fn new() -> Listener {
        Listener {
            no_start_hooks: AtomicBool::new(true),
            no_completion_hooks: AtomicBool::new(true),
            start_hooks: RwLock::new(Vec::new()),
            completion_hooks: RwLock::new(Vec::new()),
        }
    }

    pub fn add_start_hook(&self, hook: StartHook) -> Result<()> {
        let mut guard = self.start_hooks.write()?;
        self.no_start_hooks.store(false, Ordering::SeqCst);
        guard.deref_mut().push(hook);
        Ok(())
    }

    pub fn add_completion_hook(&self, hook: CompletionHook) -> Result<()> {
        let mut guard = self.completion_hooks.write()?;
        self.no_completion_hooks.store(false, Ordering::SeqCst);
        guard.deref_mut().push(hook);
        Ok(())
    }

    pub fn run_start_hooks(&self, started: &BulkStarted) -> Result<()> {
        if self.no_start_hooks.load(Ordering::SeqCst) {
            return Ok(());
        }

        // Hooks may register further hooks, so none run under the lock.
        let hooks = self.start_hooks.read()?.clone();

        for hook in hooks {
            hook(started);
        }

        Ok(())
    }

    pub fn run_completion_hooks(&self, completed: &BulkCompleted) -> Result<()> {
        if self.no_completion_hooks.load(Ordering::SeqCst) {
            return Ok(());
        }

        // Hooks may register further hooks, so none run under the lock.
        let hooks = self.completion_hooks.read()?.clone();

        for hook in hooks {
            hook(completed);
        }

        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener::new()
    }
}
