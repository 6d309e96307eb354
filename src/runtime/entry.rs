//! Scoped runtime entry
//!
//! A thread may only touch a runtime while it holds that runtime's entry
//! permission. Permission is a reentrant lock (one thread at a time, the
//! same thread may nest) plus a thread-local record of the entered runtime
//! ids, consulted by every runtime operation.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use smallvec::SmallVec;
use std::cell::RefCell;

thread_local! {
    /// Runtimes the current thread is inside, innermost last
    static ENTERED: RefCell<SmallVec<[u64; 4]>> = RefCell::new(SmallVec::new());
}

/// Whether the current thread holds the permission of runtime `id`
pub(crate) fn is_entered(id: u64) -> bool {
    ENTERED.with(|entered| entered.borrow().contains(&id))
}

/// Nesting depth of the current thread inside runtime `id`
pub(crate) fn depth(id: u64) -> usize {
    ENTERED.with(|entered| entered.borrow().iter().filter(|&&e| e == id).count())
}

/// RAII guard for one level of entry
///
/// Releases the lock and pops the thread-local record on drop, including
/// during unwinding.
pub(crate) struct EntryGuard<'a> {
    id: u64,
    _lock: ReentrantMutexGuard<'a, ()>,
}

impl<'a> EntryGuard<'a> {
    pub(crate) fn acquire(id: u64, lock: &'a ReentrantMutex<()>) -> Self {
        let guard = lock.lock();
        ENTERED.with(|entered| entered.borrow_mut().push(id));
        Self { id, _lock: guard }
    }
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        ENTERED.with(|entered| {
            let mut entered = entered.borrow_mut();
            if let Some(pos) = entered.iter().rposition(|&e| e == self.id) {
                entered.remove(pos);
            }
        });
    }
}
