//! In-memory gateway for unit tests.
//!
//! Rows are kept as JSON values per table and sorted on read the way the
//! remote store would. Every call is recorded so tests can assert on the
//! exact sequence of remote operations.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{GatewayError, Order, RemoteGateway};
use crate::image::ImageFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Select(String),
    Insert(String),
    Delete(String, i64),
    Upload(String),
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<String, Vec<u8>>,
    calls: Vec<Call>,
    next_id: i64,
    fail_select: bool,
    fail_upload: Option<String>,
    hang_upload: bool,
    fail_insert: Option<String>,
    fail_delete: bool,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

fn remote(message: &str) -> GatewayError {
    GatewayError::Remote {
        status: 400,
        message: message.to_owned(),
    }
}

fn compare(a: &Value, b: &Value, column: &str) -> Ordering {
    match (&a[column], &b[column]) {
        (Value::Number(x), Value::Number(y)) => x
            .as_i64()
            .unwrap_or_default()
            .cmp(&y.as_i64().unwrap_or_default()),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        // Postgres sorts nulls above every value.
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[allow(clippy::unwrap_used)]
impl FakeGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
        }
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(table.to_owned(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().objects.get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    pub fn fail_select(&self, fail: bool) {
        self.state.lock().unwrap().fail_select = fail;
    }

    pub fn fail_upload(&self, message: &str) {
        self.state.lock().unwrap().fail_upload = Some(message.to_owned());
    }

    /// Make every upload wait forever.
    pub fn hang_upload(&self) {
        self.state.lock().unwrap().hang_upload = true;
    }

    pub fn fail_insert(&self, message: &str) {
        self.state.lock().unwrap().fail_insert = Some(message.to_owned());
    }

    pub fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }
}

#[allow(clippy::unwrap_used)]
impl RemoteGateway for FakeGateway {
    async fn select<T>(&self, table: &str, order: Order) -> Result<Vec<T>, GatewayError>
    where
        T: DeserializeOwned + Send,
    {
        let rows = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Select(table.to_owned()));
            if state.fail_select {
                return Err(remote("select failed"));
            }
            let mut rows = state.tables.get(table).cloned().unwrap_or_default();
            rows.sort_by(|a, b| {
                let ord = compare(a, b, order.column);
                if order.ascending { ord } else { ord.reverse() }
            });
            rows
        };

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| GatewayError::Unexpected(e.to_string()))
            })
            .collect()
    }

    async fn insert<R>(&self, table: &str, record: &R) -> Result<i64, GatewayError>
    where
        R: Serialize + Sync,
    {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Insert(table.to_owned()));
        if let Some(message) = &state.fail_insert {
            return Err(remote(message));
        }

        let mut row =
            serde_json::to_value(record).map_err(|e| GatewayError::Unexpected(e.to_string()))?;
        state.next_id += 1;
        let id = state.next_id;
        row["id"] = Value::from(id);
        state.tables.entry(table.to_owned()).or_default().push(row);
        Ok(id)
    }

    async fn delete(&self, table: &str, id: i64) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(table.to_owned(), id));
        if state.fail_delete {
            return Err(remote("permission denied for table"));
        }
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|row| row["id"].as_i64() != Some(id));
        }
        Ok(())
    }

    async fn upload(&self, key: &str, image: &ImageFile) -> Result<(), GatewayError> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Upload(key.to_owned()));
            state.hang_upload
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.fail_upload {
            return Err(remote(message));
        }
        state.objects.insert(key.to_owned(), image.bytes().to_vec());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://fake.local/storage/v1/object/public/images/{key}")
    }
}
