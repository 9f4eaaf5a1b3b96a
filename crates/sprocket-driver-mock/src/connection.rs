//! Mock connection and call scripts

use async_trait::async_trait;
use parking_lot::Mutex;
use sprocket_core::{
    ArrayElement, CallableStatement, Connection, Error, ParameterSlot, Result, Row, SqlArray,
    SqlType, Value,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::array::{ArrayData, MockArray};
use crate::statement::MockStatement;

/// Owned form of [`ParameterSlot`], used in scripts and records
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnedSlot {
    Index(usize),
    Name(String),
}

impl OwnedSlot {
    pub fn name(name: impl Into<String>) -> Self {
        OwnedSlot::Name(name.into())
    }
}

impl From<ParameterSlot<'_>> for OwnedSlot {
    fn from(slot: ParameterSlot<'_>) -> Self {
        match slot {
            ParameterSlot::Index(index) => OwnedSlot::Index(index),
            ParameterSlot::Name(name) => OwnedSlot::Name(name.to_string()),
        }
    }
}

/// How a parameter was bound
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Value),
    Typed(Value, SqlType),
    Null(SqlType),
    Array { type_name: String },
}

impl Binding {
    fn value(&self) -> Option<&Value> {
        match self {
            Binding::Value(v) | Binding::Typed(v, _) => Some(v),
            Binding::Null(_) => Some(&Value::Null),
            Binding::Array { .. } => None,
        }
    }
}

/// Everything that happened to one prepared call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallRecord {
    pub call: String,
    pub bindings: Vec<(OwnedSlot, Binding)>,
    pub registered: Vec<(OwnedSlot, SqlType)>,
    pub fetch_size: Option<u32>,
    pub executed: bool,
    pub closed: bool,
}

impl CallRecord {
    /// The binding recorded for positional slot `index`, if any
    pub fn binding(&self, index: usize) -> Option<&Binding> {
        self.find_binding(&OwnedSlot::Index(index))
    }

    /// The binding recorded for named slot `name`, if any
    pub fn named_binding(&self, name: &str) -> Option<&Binding> {
        self.find_binding(&OwnedSlot::name(name))
    }

    pub(crate) fn find_binding(&self, slot: &OwnedSlot) -> Option<&Binding> {
        self.bindings
            .iter()
            .rev()
            .find(|(s, _)| s == slot)
            .map(|(_, b)| b)
    }

    /// Bound slots in bind order
    pub fn bound_slots(&self) -> Vec<OwnedSlot> {
        self.bindings.iter().map(|(s, _)| s.clone()).collect()
    }
}

/// A backend array known to the connection
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRecord {
    pub data: ArrayData,
    pub free_count: usize,
    /// `true` for arrays created through [`Connection::create_array`],
    /// `false` for arrays handed out as call results
    pub created_by_client: bool,
}

/// What the database does when a call string is executed
#[derive(Debug, Clone, Default)]
pub struct CallScript {
    pub(crate) rows: Option<Vec<Row>>,
    pub(crate) result_arrays: Vec<ArrayData>,
    pub(crate) out_values: HashMap<OwnedSlot, Value>,
    pub(crate) out_rows: Option<Vec<Row>>,
    pub(crate) out_array: Option<ArrayData>,
    pub(crate) error: Option<Error>,
    pub(crate) prepare_error: Option<Error>,
    pub(crate) close_error: Option<Error>,
}

impl CallScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// The call produces a row set
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// The call produces a single-column row set
    pub fn with_column(self, values: Vec<Value>) -> Self {
        let rows = values.into_iter().map(|v| Row::from_values(vec![v])).collect();
        self.with_rows(rows)
    }

    /// The call produces a row set whose rows carry one array each
    pub fn with_result_arrays(mut self, arrays: Vec<ArrayData>) -> Self {
        self.result_arrays = arrays;
        self
    }

    /// The database writes `value` into positional output slot `index`
    pub fn with_out_value(mut self, index: usize, value: Value) -> Self {
        self.out_values.insert(OwnedSlot::Index(index), value);
        self
    }

    /// The database writes `value` into named output slot `name`
    pub fn with_named_out_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.out_values.insert(OwnedSlot::Name(name.into()), value);
        self
    }

    /// Cursor output parameters read back as these rows
    pub fn with_out_rows(mut self, rows: Vec<Row>) -> Self {
        self.out_rows = Some(rows);
        self
    }

    /// Array output parameters read back as this array
    pub fn with_out_array(mut self, array: ArrayData) -> Self {
        self.out_array = Some(array);
        self
    }

    /// Execution fails with `error`
    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Preparing the call fails with `error`
    pub fn with_prepare_error(mut self, error: Error) -> Self {
        self.prepare_error = Some(error);
        self
    }

    /// Closing the statement fails with `error`
    pub fn with_close_error(mut self, error: Error) -> Self {
        self.close_error = Some(error);
        self
    }
}

#[derive(Default)]
pub(crate) struct MockState {
    pub(crate) scripts: HashMap<String, CallScript>,
    pub(crate) calls: Vec<CallRecord>,
    pub(crate) arrays: Vec<ArrayRecord>,
    pub(crate) free_failures: HashMap<usize, String>,
    pub(crate) array_creation_failure: Option<(usize, String)>,
    pub(crate) client_arrays_created: usize,
    pub(crate) untyped_out_values: bool,
}

impl MockState {
    pub(crate) fn track_array(
        state: &Arc<Mutex<MockState>>,
        data: ArrayData,
        created_by_client: bool,
    ) -> MockArray {
        let id = {
            let mut guard = state.lock();
            guard.arrays.push(ArrayRecord {
                data: data.clone(),
                free_count: 0,
                created_by_client,
            });
            guard.arrays.len() - 1
        };
        MockArray::new(id, data, state.clone())
    }

    pub(crate) fn echo_value(&self, call_index: usize, slot: &OwnedSlot) -> Option<Value> {
        self.calls
            .get(call_index)
            .and_then(|call| call.find_binding(slot))
            .and_then(|b| b.value().cloned())
    }
}

/// Scripted connection
///
/// Cloning shares the recorded state, so a test can keep one handle for
/// assertions while the code under test owns another.
///
/// # Examples
///
/// ```
/// use sprocket_core::{Connection, Value};
/// use sprocket_driver_mock::{CallScript, MockConnection};
///
/// # tokio_test_block(async {
/// let conn = MockConnection::new()
///     .with_script("{call next_id()}", CallScript::new().with_column(vec![Value::Int64(7)]));
///
/// let mut call = conn.prepare_call("{call next_id()}").await.unwrap();
/// assert!(call.execute().await.unwrap());
/// assert_eq!(conn.prepared_calls(), vec!["{call next_id()}".to_string()]);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behaviour of `call`
    pub fn with_script(self, call: impl Into<String>, script: CallScript) -> Self {
        self.state.lock().scripts.insert(call.into(), script);
        self
    }

    /// Freeing the array with creation-order id `array_id` fails with `message`
    pub fn with_free_failure(self, array_id: usize, message: impl Into<String>) -> Self {
        self.state
            .lock()
            .free_failures
            .insert(array_id, message.into());
        self
    }

    /// The `nth` (0-based) client array creation fails with `message`
    pub fn with_array_creation_failure(self, nth: usize, message: impl Into<String>) -> Self {
        self.state.lock().array_creation_failure = Some((nth, message.into()));
        self
    }

    /// Behave like a driver that cannot convert output values on read
    pub fn with_untyped_out_values(self) -> Self {
        self.state.lock().untyped_out_values = true;
        self
    }

    /// Every prepared call record, in prepare order
    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.lock().calls.clone()
    }

    /// The most recent prepared call
    pub fn last_call(&self) -> Option<CallRecord> {
        self.state.lock().calls.last().cloned()
    }

    /// Call strings in prepare order
    pub fn prepared_calls(&self) -> Vec<String> {
        self.state.lock().calls.iter().map(|c| c.call.clone()).collect()
    }

    /// Every array the connection knows about, in creation order
    pub fn arrays(&self) -> Vec<ArrayRecord> {
        self.state.lock().arrays.clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn prepare_call(&self, call: &str) -> Result<Box<dyn CallableStatement>> {
        let (script, call_index) = {
            let mut state = self.state.lock();
            let script = state.scripts.get(call).cloned().unwrap_or_default();
            if let Some(error) = &script.prepare_error {
                return Err(error.clone());
            }
            state.calls.push(CallRecord {
                call: call.to_string(),
                ..Default::default()
            });
            (script, state.calls.len() - 1)
        };
        tracing::debug!(call = %call, "prepared mock call");
        Ok(Box::new(MockStatement::new(
            call_index,
            script,
            self.state.clone(),
        )))
    }

    async fn create_array(&self, type_name: &str, elements: &[Value]) -> Result<Box<dyn SqlArray>> {
        {
            let mut state = self.state.lock();
            let nth = state.client_arrays_created;
            state.client_arrays_created += 1;
            if let Some((fail_at, message)) = &state.array_creation_failure
                && *fail_at == nth
            {
                return Err(Error::other(message.clone()));
            }
        }
        let kind = elements
            .iter()
            .find_map(Value::kind)
            .unwrap_or(sprocket_core::ScalarKind::Text);
        let data = ArrayData::new(type_name, ArrayElement::nullable(kind), elements.to_vec());
        Ok(Box::new(MockState::track_array(&self.state, data, true)))
    }
}
