//! Mock prepared calls and result sets

use async_trait::async_trait;
use parking_lot::Mutex;
use sprocket_core::{
    CallableStatement, Error, ParameterSlot, Result, ResultSet, Row, SqlArray, SqlType, Value,
};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::array::ArrayData;
use crate::connection::{Binding, CallScript, MockState, OwnedSlot};

/// A prepared call against a [`crate::MockConnection`]
pub struct MockStatement {
    call_index: usize,
    script: CallScript,
    state: Arc<Mutex<MockState>>,
    result_taken: bool,
}

impl MockStatement {
    pub(crate) fn new(call_index: usize, script: CallScript, state: Arc<Mutex<MockState>>) -> Self {
        Self {
            call_index,
            script,
            state,
            result_taken: false,
        }
    }

    fn record_binding(&self, slot: ParameterSlot<'_>, binding: Binding) -> Result<()> {
        if let ParameterSlot::Index(0) = slot {
            return Err(Error::Query("parameter index 0 is out of range".to_string()));
        }
        let mut state = self.state.lock();
        if let Some(call) = state.calls.get_mut(self.call_index) {
            call.bindings.push((slot.into(), binding));
        }
        Ok(())
    }

    fn ensure_registered(&self, slot: &OwnedSlot) -> Result<()> {
        let state = self.state.lock();
        let registered = state
            .calls
            .get(self.call_index)
            .is_some_and(|call| call.registered.iter().any(|(s, _)| s == slot));
        if registered {
            Ok(())
        } else {
            Err(Error::Query(format!(
                "output parameter {:?} was not registered",
                slot
            )))
        }
    }

    fn read_out(&self, slot: ParameterSlot<'_>) -> Result<Value> {
        let slot = OwnedSlot::from(slot);
        self.ensure_registered(&slot)?;
        if let Some(value) = self.script.out_values.get(&slot) {
            return Ok(value.clone());
        }
        let echoed = self.state.lock().echo_value(self.call_index, &slot);
        Ok(echoed.unwrap_or(Value::Null))
    }

    fn has_rows(&self) -> bool {
        self.script.rows.is_some() || !self.script.result_arrays.is_empty()
    }
}

#[async_trait]
impl CallableStatement for MockStatement {
    fn set_value(&mut self, slot: ParameterSlot<'_>, value: &Value) -> Result<()> {
        self.record_binding(slot, Binding::Value(value.clone()))
    }

    fn set_typed_value(
        &mut self,
        slot: ParameterSlot<'_>,
        value: &Value,
        sql_type: SqlType,
    ) -> Result<()> {
        self.record_binding(slot, Binding::Typed(value.clone(), sql_type))
    }

    fn set_null(&mut self, slot: ParameterSlot<'_>, sql_type: SqlType) -> Result<()> {
        self.record_binding(slot, Binding::Null(sql_type))
    }

    fn set_array(&mut self, slot: ParameterSlot<'_>, array: &dyn SqlArray) -> Result<()> {
        self.record_binding(
            slot,
            Binding::Array {
                type_name: array.base_type_name().to_string(),
            },
        )
    }

    fn register_out_parameter(&mut self, slot: ParameterSlot<'_>, sql_type: SqlType) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(call) = state.calls.get_mut(self.call_index) {
            call.registered.push((slot.into(), sql_type));
        }
        Ok(())
    }

    fn set_fetch_size(&mut self, rows: u32) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(call) = state.calls.get_mut(self.call_index) {
            call.fetch_size = Some(rows);
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<bool> {
        {
            let mut state = self.state.lock();
            if let Some(call) = state.calls.get_mut(self.call_index) {
                call.executed = true;
            }
        }
        if let Some(error) = &self.script.error {
            return Err(error.clone());
        }
        Ok(self.has_rows())
    }

    async fn result_set(&mut self) -> Result<Option<Box<dyn ResultSet>>> {
        if self.result_taken || !self.has_rows() {
            return Ok(None);
        }
        self.result_taken = true;
        let rows = self.script.rows.clone().unwrap_or_default();
        let arrays = self.script.result_arrays.clone();
        Ok(Some(Box::new(MockResultSet::new(
            rows,
            arrays,
            self.state.clone(),
        ))))
    }

    fn supports_typed_out_values(&self) -> bool {
        !self.state.lock().untyped_out_values
    }

    fn out_value(&self, slot: ParameterSlot<'_>, _sql_type: SqlType) -> Result<Value> {
        if !self.supports_typed_out_values() {
            return Err(Error::NotSupported(
                "typed output retrieval".to_string(),
            ));
        }
        self.read_out(slot)
    }

    fn out_value_untyped(&self, slot: ParameterSlot<'_>) -> Result<Value> {
        self.read_out(slot)
    }

    async fn out_result_set(&mut self, slot: ParameterSlot<'_>) -> Result<Box<dyn ResultSet>> {
        self.ensure_registered(&slot.into())?;
        let rows = self.script.out_rows.clone().unwrap_or_default();
        Ok(Box::new(MockResultSet::new(
            rows,
            Vec::new(),
            self.state.clone(),
        )))
    }

    async fn out_array(&mut self, slot: ParameterSlot<'_>) -> Result<Option<Box<dyn SqlArray>>> {
        self.ensure_registered(&slot.into())?;
        Ok(self.script.out_array.clone().map(|data| {
            Box::new(MockState::track_array(&self.state, data, false)) as Box<dyn SqlArray>
        }))
    }

    async fn close(&mut self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if let Some(call) = state.calls.get_mut(self.call_index) {
                call.closed = true;
            }
        }
        match &self.script.close_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Rows (and optionally one array per row) handed out by a mock call
pub struct MockResultSet {
    rows: VecDeque<Row>,
    arrays: VecDeque<ArrayData>,
    state: Arc<Mutex<MockState>>,
    fetch_size: Option<u32>,
}

impl MockResultSet {
    pub(crate) fn new(rows: Vec<Row>, arrays: Vec<ArrayData>, state: Arc<Mutex<MockState>>) -> Self {
        Self {
            rows: rows.into(),
            arrays: arrays.into(),
            state,
            fetch_size: None,
        }
    }

    pub fn fetch_size(&self) -> Option<u32> {
        self.fetch_size
    }
}

#[async_trait]
impl ResultSet for MockResultSet {
    fn set_fetch_size(&mut self, rows: u32) {
        self.fetch_size = Some(rows);
    }

    async fn next(&mut self) -> Result<Option<Row>> {
        if let Some(row) = self.rows.pop_front() {
            return Ok(Some(row));
        }
        // rows backed by arrays surface as a single array-typed column
        Ok(self
            .arrays
            .pop_front()
            .map(|data| Row::from_values(vec![Value::Array(data.elements)])))
    }

    async fn next_array(&mut self) -> Result<Option<Box<dyn SqlArray>>> {
        Ok(self.arrays.pop_front().map(|data| {
            Box::new(MockState::track_array(&self.state, data, false)) as Box<dyn SqlArray>
        }))
    }
}
