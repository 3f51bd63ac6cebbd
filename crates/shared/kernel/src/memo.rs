use crate::error::ModelError;
use crate::settings::Settings;
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::{Condvar, Mutex};
use settle_domain::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::trace;

type ComputeFn = dyn Fn(&Settings) -> Result<Value, ModelError> + Send + Sync;

/// A lazily computed attribute declared on a model.
#[derive(Clone)]
pub struct MemoDef {
    name: Cow<'static, str>,
    compute: Arc<ComputeFn>,
}

impl MemoDef {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, compute: F) -> Self
    where
        F: Fn(&Settings) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        Self { name: name.into(), compute: Arc::new(compute) }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for MemoDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoDef").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Computing(ThreadId),
    Ready(Value),
}

#[derive(Debug)]
struct Table {
    slots: Vec<Slot>,
    /// Slot each blocked thread waits on.
    waiting: FxHashMap<ThreadId, usize>,
    /// Blocked threads whose wait closes a cycle; they give up on wake-up.
    broken: FxHashSet<ThreadId>,
}

/// Write-once cache of every memo on a single instance.
///
/// No lock is held while a memo computes. Readers of a slot that another thread is
/// computing wait for it, unless following the chain of waits leads back to the reader;
/// then the reader and every thread on that chain fail with [`ModelError::MemoCycle`].
#[derive(Debug)]
pub(crate) struct MemoTable {
    table: Mutex<Table>,
    settled: Condvar,
}

impl MemoTable {
    pub(crate) fn new(len: usize) -> Self {
        let table = Table {
            slots: std::iter::repeat_with(Slot::default).take(len).collect(),
            waiting: FxHashMap::default(),
            broken: FxHashSet::default(),
        };
        Self { table: Mutex::new(table), settled: Condvar::new() }
    }

    pub(crate) fn get_or_compute(
        &self,
        index: usize,
        def: &MemoDef,
        settings: &Settings,
    ) -> Result<Value, ModelError> {
        let me = thread::current().id();
        let mut table = self.table.lock();

        loop {
            let owner = match &table.slots[index] {
                Slot::Ready(value) => return Ok(value.clone()),
                Slot::Computing(owner) => *owner,
                Slot::Empty => break,
            };
            if owner == me {
                return Err(cycle(def));
            }

            if let Some(chain) = table.chain_to(owner, me) {
                trace!(memo = %def.name, threads = chain.len(), "memo cycle across threads");
                table.broken.extend(chain);
                self.settled.notify_all();
                return Err(cycle(def));
            }

            table.waiting.insert(me, index);
            self.settled.wait(&mut table);
            table.waiting.remove(&me);
            if table.broken.remove(&me) {
                return Err(cycle(def));
            }
        }
        table.slots[index] = Slot::Computing(me);
        drop(table);

        trace!(memo = %def.name, "computing memo");
        let result = (def.compute)(settings);

        let mut table = self.table.lock();
        table.slots[index] = match &result {
            Ok(value) => Slot::Ready(value.clone()),
            Err(_) => Slot::Empty,
        };
        self.settled.notify_all();
        result
    }

    pub(crate) fn is_ready(&self, index: usize) -> bool {
        matches!(self.table.lock().slots.get(index), Some(Slot::Ready(_)))
    }
}

impl Table {
    /// Threads blocked on the way from `owner` back to `me`, if that way exists.
    fn chain_to(&self, owner: ThreadId, me: ThreadId) -> Option<Vec<ThreadId>> {
        let mut chain = Vec::new();
        let mut current = owner;
        // Every hop passes a distinct blocked thread.
        for _ in 0..=self.waiting.len() {
            let index = *self.waiting.get(&current)?;
            chain.push(current);
            match &self.slots[index] {
                Slot::Computing(next) if *next == me => return Some(chain),
                Slot::Computing(next) => current = *next,
                _ => return None,
            }
        }
        None
    }
}

fn cycle(def: &MemoDef) -> ModelError {
    ModelError::MemoCycle { name: def.name.to_string().into(), context: None }
}
