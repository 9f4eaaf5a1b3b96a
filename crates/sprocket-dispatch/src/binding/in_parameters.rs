use sprocket_core::{CallableStatement, ParameterSlot, SqlArray, SqlType, Value};

use crate::resource::CallResource;
use crate::{Argument, DispatchError, DispatchResult};

/// Position marking an argument that is not bound (row mappers)
pub const NOT_BOUND: u8 = 0;

/// Binds invocation arguments to a prepared call
///
/// Positions are 1-based and stored as `u8`, so at most 254 inputs can be
/// bound. Slot vectors are indexed by argument index, including row mapper
/// arguments, which carry [`NOT_BOUND`] or no name.
#[derive(Debug, Clone, PartialEq)]
pub enum InParameterBinder {
    /// The method takes no bindable arguments
    NoParameters,
    ByIndex {
        positions: Vec<u8>,
    },
    ByIndexAndType {
        positions: Vec<u8>,
        types: Vec<SqlType>,
    },
    ByName {
        names: Vec<Option<String>>,
    },
    ByNameAndType {
        names: Vec<Option<String>>,
        types: Vec<SqlType>,
    },
    /// Binds arguments with a backend array handle from the invocation's
    /// resources and delegates everything else
    ResourceBacked(Box<InParameterBinder>),
}

impl InParameterBinder {
    /// Bind `arguments` in declaration order
    pub fn bind(
        &self,
        call: &mut dyn CallableStatement,
        arguments: &[Argument],
        resources: &CallResource,
    ) -> DispatchResult<()> {
        match self {
            InParameterBinder::NoParameters => Ok(()),
            InParameterBinder::ResourceBacked(inner) => {
                for (index, argument) in arguments.iter().enumerate() {
                    match resources.array_for(index) {
                        Some(array) => inner.bind_array(call, index, array)?,
                        None => inner.bind_argument(call, index, argument)?,
                    }
                }
                Ok(())
            }
            _ => {
                for (index, argument) in arguments.iter().enumerate() {
                    self.bind_argument(call, index, argument)?;
                }
                Ok(())
            }
        }
    }

    /// The slot argument `index` binds to, `None` when it is not bound
    pub fn slot(&self, index: usize) -> Option<ParameterSlot<'_>> {
        match self {
            InParameterBinder::NoParameters => None,
            InParameterBinder::ByIndex { positions }
            | InParameterBinder::ByIndexAndType { positions, .. } => positions
                .get(index)
                .copied()
                .filter(|p| *p != NOT_BOUND)
                .map(|p| ParameterSlot::Index(p as usize)),
            InParameterBinder::ByName { names } | InParameterBinder::ByNameAndType { names, .. } => {
                names
                    .get(index)
                    .and_then(|name| name.as_deref())
                    .map(ParameterSlot::Name)
            }
            InParameterBinder::ResourceBacked(inner) => inner.slot(index),
        }
    }

    fn sql_type(&self, index: usize) -> Option<SqlType> {
        match self {
            InParameterBinder::ByIndexAndType { types, .. }
            | InParameterBinder::ByNameAndType { types, .. } => types.get(index).copied(),
            InParameterBinder::ResourceBacked(inner) => inner.sql_type(index),
            _ => None,
        }
    }

    fn bind_argument(
        &self,
        call: &mut dyn CallableStatement,
        index: usize,
        argument: &Argument,
    ) -> DispatchResult<()> {
        let Some(slot) = self.slot(index) else {
            return Ok(());
        };
        let value = argument.as_value().ok_or(DispatchError::ArgumentShape {
            index,
            expected: "value",
        })?;
        self.bind_value(call, slot, index, value)
    }

    fn bind_value(
        &self,
        call: &mut dyn CallableStatement,
        slot: ParameterSlot<'_>,
        index: usize,
        value: &Value,
    ) -> DispatchResult<()> {
        match self.sql_type(index) {
            Some(sql_type) if value.is_null() => call.set_null(slot, sql_type)?,
            Some(sql_type) => call.set_typed_value(slot, value, sql_type)?,
            None => call.set_value(slot, value)?,
        }
        Ok(())
    }

    fn bind_array(
        &self,
        call: &mut dyn CallableStatement,
        index: usize,
        array: &dyn SqlArray,
    ) -> DispatchResult<()> {
        if let Some(slot) = self.slot(index) {
            call.set_array(slot, array)?;
        }
        Ok(())
    }
}
