//! Mock array handles

use async_trait::async_trait;
use parking_lot::Mutex;
use sprocket_core::{ArrayElement, Error, Result, SqlArray, Value};
use std::sync::Arc;

use crate::connection::MockState;

/// Contents of a scripted array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    pub type_name: String,
    pub element: ArrayElement,
    pub elements: Vec<Value>,
}

impl ArrayData {
    pub fn new(type_name: impl Into<String>, element: ArrayElement, elements: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            element,
            elements,
        }
    }
}

/// Array handle whose frees are recorded in the owning connection
pub struct MockArray {
    id: usize,
    data: ArrayData,
    state: Arc<Mutex<MockState>>,
}

impl MockArray {
    pub(crate) fn new(id: usize, data: ArrayData, state: Arc<Mutex<MockState>>) -> Self {
        Self { id, data, state }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }
}

#[async_trait]
impl SqlArray for MockArray {
    fn base_type_name(&self) -> &str {
        &self.data.type_name
    }

    fn element(&self) -> ArrayElement {
        self.data.element
    }

    async fn elements(&self) -> Result<Vec<Value>> {
        Ok(self.data.elements.clone())
    }

    async fn free(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        let record = state
            .arrays
            .get_mut(self.id)
            .ok_or_else(|| Error::NotFound(format!("array {}", self.id)))?;
        record.free_count += 1;
        tracing::trace!(array = self.id, "freed mock array");
        match state.free_failures.get(&self.id) {
            Some(message) => Err(Error::other(message.clone())),
            None => Ok(()),
        }
    }
}
