//! Connections as generated repositories consume them, and the per-instance
//! prepared-statement slots.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde_json::{Map, Value};

use crate::{RuntimeError, codegen::class::ClassSpec};

/// Parameters bound by name, in marker order.
pub type Params = [(String, Value)];

/// A prepared statement.
pub trait Statement: Send + Sync {
    /// Executes with `params` and returns the first row, if any.
    fn fetch_one(&self, params: &Params) -> Result<Option<Map<String, Value>>, RuntimeError>;
    /// Executes with `params` and returns the affected row count.
    fn execute(&self, params: &Params) -> Result<u64, RuntimeError>;
}

pub trait Connection: Send + Sync {
    /// `fetch_class` names the model rows are fetched as, when there is one.
    /// Fetched rows still come back as plain mappings; turning one into a
    /// model is [`RuntimeContext::hydrate`](super::RuntimeContext::hydrate).
    fn prepare(
        &self,
        sql: &str,
        fetch_class: Option<&str>,
    ) -> Result<Arc<dyn Statement>, RuntimeError>;
}

/// Turns source ids into live connections.
pub trait ConnectionResolver: Send + Sync {
    fn resolve(&self, source_id: &str) -> Result<Arc<dyn Connection>, RuntimeError>;
}

type Slot = Mutex<Option<Arc<dyn Statement>>>;

/// The statement slots of one repository instance.
///
/// A slot goes from unprepared to prepared once and stays prepared. Clones
/// share the slots.
#[derive(Clone, Default)]
pub struct StatementSlots {
    slots: Arc<HashMap<String, Slot>>,
}

impl StatementSlots {
    pub fn for_class(class: &ClassSpec) -> Self {
        Self {
            slots: Arc::new(
                class
                    .slots()
                    .map(|slot| (slot.name.clone(), Mutex::new(None)))
                    .collect(),
            ),
        }
    }

    fn lock(&self, slot: &str) -> Result<MutexGuard<'_, Option<Arc<dyn Statement>>>, RuntimeError> {
        let cell = self
            .slots
            .get(slot)
            .ok_or_else(|| RuntimeError::UnknownSlot(slot.to_owned()))?;
        Ok(cell.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self, slot: &str) -> Result<Arc<dyn Statement>, RuntimeError> {
        self.lock(slot)?
            .clone()
            .ok_or_else(|| RuntimeError::UnpreparedSlot(slot.to_owned()))
    }

    pub fn is_prepared(&self, slot: &str) -> bool {
        self.lock(slot).is_ok_and(|statement| statement.is_some())
    }

    /// Prepares the slot on first use. The slot stays locked while preparing,
    /// so concurrent first uses share one statement.
    pub fn get_or_prepare(
        &self,
        slot: &str,
        prepare: impl FnOnce() -> Result<Arc<dyn Statement>, RuntimeError>,
    ) -> Result<Arc<dyn Statement>, RuntimeError> {
        let mut statement = self.lock(slot)?;
        if let Some(statement) = statement.as_ref() {
            return Ok(statement.clone());
        }
        let prepared = prepare()?;
        *statement = Some(prepared.clone());
        Ok(prepared)
    }
}
