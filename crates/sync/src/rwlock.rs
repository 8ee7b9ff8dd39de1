use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read-only handle onto a component's state.
///
/// Every engine component (§5 of the design) owns exactly one piece of
/// shared-mutable state behind its own lock; `Reader`/`Writer` split the
/// single `Arc<RwLock<T>>` into a cloneable read side and a single write
/// side so call sites can't accidentally acquire the write lock from a
/// read-only collaborator.
#[derive(Clone)]
pub struct Reader<T>(Arc<RwLock<T>>);

pub struct Writer<T>(Arc<RwLock<T>>);

impl<T> Writer<T> {
    pub fn new(value: T) -> (Self, Reader<T>) {
        let arc = Arc::new(RwLock::new(value));
        (Self(arc.clone()), Reader(arc))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    pub fn reader(&self) -> Reader<T> {
        Reader(self.0.clone())
    }
}

impl<T> Reader<T> {
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }
}
