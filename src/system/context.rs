//! Process-wide context
//!
//! Holds the state every component may need but none of them owns: the
//! global reader-writer lock and the handler invoked on unrecoverable errors.
//! The global instance is created on first use and lives until process exit.
//! Components that want isolated state can build their own [`Context`].

use crate::error::{MemcabError, Result};
use once_cell::sync::Lazy;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Callback receiving the message of a fatal error before the process exits
pub type FatalHandler = Box<dyn Fn(&str) + Send + Sync>;

static GLOBAL_CONTEXT: Lazy<Context> = Lazy::new(|| {
    log::debug!("Initializing global memcab context");
    Context::new()
});

/// Shared process state with an explicit lifecycle
pub struct Context {
    global_lock: RwLock<()>,
    fatal_handler: RwLock<Option<FatalHandler>>,
}

impl Context {
    /// Create a context with no fatal handler installed
    pub fn new() -> Self {
        Self {
            global_lock: RwLock::new(()),
            fatal_handler: RwLock::new(None),
        }
    }

    /// The process-wide context
    pub fn global() -> &'static Context {
        &GLOBAL_CONTEXT
    }

    /// Take the global lock exclusively
    pub fn lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.global_lock.write()
    }

    /// Take the global lock in shared mode
    pub fn lock_shared(&self) -> RwLockReadGuard<'_, ()> {
        self.global_lock.read()
    }

    /// Take the global lock exclusively without blocking
    pub fn try_lock(&self) -> Result<RwLockWriteGuard<'_, ()>> {
        self.global_lock
            .try_write()
            .ok_or_else(|| MemcabError::resource_busy("global context lock"))
    }

    /// Install the handler called by [`Context::fatal`], replacing any previous one
    pub fn set_fatal_handler<F>(&self, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.fatal_handler.write() = Some(Box::new(handler));
    }

    /// Remove the installed fatal handler
    pub fn clear_fatal_handler(&self) {
        *self.fatal_handler.write() = None;
    }

    /// Whether a fatal handler is installed
    pub fn has_fatal_handler(&self) -> bool {
        self.fatal_handler.read().is_some()
    }

    /// Deliver a fatal message without terminating
    ///
    /// Calls the installed handler, or writes the message to standard error
    /// when none is installed.
    pub fn report_fatal(&self, message: &str) {
        log::error!("fatal error: {}", message);
        match self.fatal_handler.read().as_ref() {
            Some(handler) => handler(message),
            None => eprintln!("fatal error: {}", message),
        }
    }

    /// Report an unrecoverable error and exit the process with status 1
    pub fn fatal(&self, message: &str) -> ! {
        self.report_fatal(message);
        std::process::exit(1)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("has_fatal_handler", &self.has_fatal_handler())
            .finish()
    }
}

/// Reserve room for `additional` more elements or die through the global context
///
/// Allocation failure is never recoverable for the containers in this crate.
pub(crate) fn reserve_or_die<T>(vec: &mut Vec<T>, additional: usize) {
    if let Err(e) = vec.try_reserve_exact(additional) {
        Context::global().fatal(&format!("out of memory: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_fatal_handler_receives_message() {
        let ctx = Context::new();
        let seen = Arc::new(parking_lot::Mutex::new(String::new()));
        let sink = seen.clone();
        ctx.set_fatal_handler(move |msg| sink.lock().push_str(msg));
        assert!(ctx.has_fatal_handler());

        ctx.report_fatal("allocation failed");
        assert_eq!(seen.lock().as_str(), "allocation failed");

        ctx.clear_fatal_handler();
        assert!(!ctx.has_fatal_handler());
    }

    #[test]
    fn test_handler_replacement() {
        let ctx = Context::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = calls.clone();
        ctx.set_fatal_handler(move |_| {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = calls.clone();
        ctx.set_fatal_handler(move |_| {
            second.fetch_add(10, Ordering::SeqCst);
        });
        ctx.report_fatal("boom");
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_global_lock_modes() {
        let ctx = Context::new();
        {
            let _a = ctx.lock_shared();
            let _b = ctx.lock_shared();
            assert!(ctx.try_lock().is_err());
        }
        let guard = ctx.try_lock();
        assert!(guard.is_ok());
    }

    #[test]
    fn test_global_instance_is_shared() {
        let a = Context::global() as *const Context;
        let b = Context::global() as *const Context;
        assert_eq!(a, b);
    }

    #[test]
    fn test_reserve_or_die_grows() {
        let mut v: Vec<u8> = Vec::new();
        reserve_or_die(&mut v, 128);
        assert!(v.capacity() >= 128);
    }
}
