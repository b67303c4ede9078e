#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use lazyrow::{
    RuntimeError,
    runtime::{Connection, ConnectionResolver, Params, Statement},
};
use serde_json::{Map, Value};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default)]
pub struct Journal {
    pub prepared: Vec<String>,
    pub fetched: Vec<(String, Vec<(String, Value)>)>,
    pub executed: Vec<(String, Vec<(String, Value)>)>,
}

/// An in-memory connection over a fixed set of rows that records every
/// statement it prepares and runs.
#[derive(Debug, Clone, Default)]
pub struct MockConnection {
    journal: Arc<Mutex<Journal>>,
    rows: Arc<Vec<Map<String, Value>>>,
}

impl MockConnection {
    pub fn with_rows(rows: impl IntoIterator<Item = Value>) -> Self {
        Self {
            journal: Arc::default(),
            rows: Arc::new(
                rows.into_iter()
                    .filter_map(|row| match row {
                        Value::Object(row) => Some(row),
                        _ => None,
                    })
                    .collect(),
            ),
        }
    }
    pub fn prepared(&self) -> Vec<String> {
        self.journal.lock().unwrap().prepared.clone()
    }
    pub fn fetched(&self) -> Vec<(String, Vec<(String, Value)>)> {
        self.journal.lock().unwrap().fetched.clone()
    }
    pub fn executed(&self) -> Vec<(String, Vec<(String, Value)>)> {
        self.journal.lock().unwrap().executed.clone()
    }
    fn matching(&self, params: &Params) -> impl Iterator<Item = &Map<String, Value>> {
        self.rows.iter().filter(move |row| {
            params
                .iter()
                .all(|(name, value)| row.get(name) == Some(value))
        })
    }
}

struct MockStatement {
    sql: String,
    connection: MockConnection,
}

impl Statement for MockStatement {
    fn fetch_one(&self, params: &Params) -> Result<Option<Map<String, Value>>, RuntimeError> {
        self.connection
            .journal
            .lock()
            .unwrap()
            .fetched
            .push((self.sql.clone(), params.to_vec()));
        Ok(self.connection.matching(params).next().cloned())
    }
    fn execute(&self, params: &Params) -> Result<u64, RuntimeError> {
        self.connection
            .journal
            .lock()
            .unwrap()
            .executed
            .push((self.sql.clone(), params.to_vec()));
        Ok(self.connection.matching(params).count() as u64)
    }
}

impl Connection for MockConnection {
    fn prepare(
        &self,
        sql: &str,
        _fetch_class: Option<&str>,
    ) -> Result<Arc<dyn Statement>, RuntimeError> {
        self.journal.lock().unwrap().prepared.push(sql.to_owned());
        Ok(Arc::new(MockStatement {
            sql: sql.to_owned(),
            connection: self.clone(),
        }))
    }
}

#[derive(Debug, Default)]
pub struct MockResolver {
    connections: HashMap<String, MockConnection>,
}

impl MockResolver {
    pub fn with(mut self, source_id: &str, connection: MockConnection) -> Self {
        self.connections.insert(source_id.to_owned(), connection);
        self
    }
}

impl ConnectionResolver for MockResolver {
    fn resolve(&self, source_id: &str) -> Result<Arc<dyn Connection>, RuntimeError> {
        match self.connections.get(source_id) {
            Some(connection) => Ok(Arc::new(connection.clone())),
            None => Err(RuntimeError::Statement(format!(
                "no connection for `{source_id}`"
            ))),
        }
    }
}
