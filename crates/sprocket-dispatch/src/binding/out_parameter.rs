use sprocket_core::{CallableStatement, ParameterSlot, ResultSet, ScalarKind, SqlArray, SqlType, Value};

use crate::{DispatchError, DispatchResult};

/// Registers the output slot a result is read from
#[derive(Debug, Clone, PartialEq)]
pub enum OutParameterRegistrar {
    /// The result comes from a row set, nothing to register
    None,
    ByIndexAndType { index: u8, sql_type: SqlType },
    ByNameAndType { name: String, sql_type: SqlType },
}

impl OutParameterRegistrar {
    pub fn slot(&self) -> Option<ParameterSlot<'_>> {
        match self {
            OutParameterRegistrar::None => None,
            OutParameterRegistrar::ByIndexAndType { index, .. } => {
                Some(ParameterSlot::Index(*index as usize))
            }
            OutParameterRegistrar::ByNameAndType { name, .. } => Some(ParameterSlot::Name(name)),
        }
    }

    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            OutParameterRegistrar::None => None,
            OutParameterRegistrar::ByIndexAndType { sql_type, .. }
            | OutParameterRegistrar::ByNameAndType { sql_type, .. } => Some(*sql_type),
        }
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, OutParameterRegistrar::None)
    }

    /// Register the slot on `call` before execution
    pub fn register(&self, call: &mut dyn CallableStatement) -> DispatchResult<()> {
        if let (Some(slot), Some(sql_type)) = (self.slot(), self.sql_type()) {
            call.register_out_parameter(slot, sql_type)?;
        }
        Ok(())
    }

    /// Read the registered slot as `kind`
    ///
    /// Drivers that cannot convert on read return the raw value, which is then
    /// converted here.
    pub fn read_scalar(&self, call: &dyn CallableStatement, kind: ScalarKind) -> DispatchResult<Value> {
        let (slot, sql_type) = self.require()?;
        let raw = if call.supports_typed_out_values() {
            call.out_value(slot, sql_type)?
        } else {
            call.out_value_untyped(slot)?
        };
        raw.coerce_to(kind)
            .ok_or_else(|| DispatchError::type_mismatch(kind, raw.type_name()))
    }

    /// Read the registered slot as a cursor
    pub async fn read_rows(&self, call: &mut dyn CallableStatement) -> DispatchResult<Box<dyn ResultSet>> {
        let (slot, _) = self.require()?;
        Ok(call.out_result_set(slot).await?)
    }

    /// Read the registered slot as an array handle, `None` for a NULL array
    pub async fn read_array(
        &self,
        call: &mut dyn CallableStatement,
    ) -> DispatchResult<Option<Box<dyn SqlArray>>> {
        let (slot, _) = self.require()?;
        Ok(call.out_array(slot).await?)
    }

    fn require(&self) -> DispatchResult<(ParameterSlot<'_>, SqlType)> {
        self.slot()
            .zip(self.sql_type())
            .ok_or(DispatchError::NoOutParameter)
    }
}
