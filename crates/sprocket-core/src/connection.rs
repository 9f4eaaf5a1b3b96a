//! Connection, prepared call and array handle traits

use crate::{ArrayElement, Error, Result, Row, SqlType, Value};
use async_trait::async_trait;

/// Addresses one parameter of a prepared call, by 1-based index or by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSlot<'a> {
    Index(usize),
    Name(&'a str),
}

impl std::fmt::Display for ParameterSlot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterSlot::Index(index) => write!(f, "#{}", index),
            ParameterSlot::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A database connection able to prepare stored procedure calls
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "oracle", "postgresql", "mock")
    fn driver_name(&self) -> &str;

    /// Prepare a call in escape syntax, e.g. `{call app.plus(?,?)}`
    async fn prepare_call(&self, call: &str) -> Result<Box<dyn CallableStatement>>;

    /// Create a backend array of `type_name` elements
    ///
    /// The returned handle must be freed by the caller once the call using it
    /// has completed.
    async fn create_array(&self, type_name: &str, elements: &[Value]) -> Result<Box<dyn SqlArray>>;
}

/// A prepared stored procedure or function call
///
/// Setters and registration only stage state; nothing reaches the database
/// before [`CallableStatement::execute`].
#[async_trait]
pub trait CallableStatement: Send {
    /// Bind a value letting the driver infer its type
    fn set_value(&mut self, slot: ParameterSlot<'_>, value: &Value) -> Result<()>;

    /// Bind a value with an explicit type code
    fn set_typed_value(&mut self, slot: ParameterSlot<'_>, value: &Value, sql_type: SqlType)
    -> Result<()>;

    /// Bind a typed NULL
    fn set_null(&mut self, slot: ParameterSlot<'_>, sql_type: SqlType) -> Result<()>;

    /// Bind a backend array handle
    fn set_array(&mut self, slot: ParameterSlot<'_>, array: &dyn SqlArray) -> Result<()>;

    /// Register an output slot before execution
    fn register_out_parameter(&mut self, slot: ParameterSlot<'_>, sql_type: SqlType) -> Result<()>;

    /// Hint how many rows to fetch per round trip
    fn set_fetch_size(&mut self, _rows: u32) -> Result<()> {
        Ok(())
    }

    /// Execute the call. Returns `true` when the call produced a row set.
    async fn execute(&mut self) -> Result<bool>;

    /// Take the row set produced by the last execution, if any
    async fn result_set(&mut self) -> Result<Option<Box<dyn ResultSet>>>;

    /// Whether [`CallableStatement::out_value`] honours the requested type.
    ///
    /// Drivers that return `false` are read with
    /// [`CallableStatement::out_value_untyped`] and the caller converts.
    fn supports_typed_out_values(&self) -> bool {
        true
    }

    /// Read an output value converted to `sql_type`
    fn out_value(&self, slot: ParameterSlot<'_>, sql_type: SqlType) -> Result<Value>;

    /// Read an output value as the driver delivers it
    fn out_value_untyped(&self, slot: ParameterSlot<'_>) -> Result<Value>;

    /// Read a cursor output parameter as a row set
    async fn out_result_set(&mut self, slot: ParameterSlot<'_>) -> Result<Box<dyn ResultSet>> {
        Err(Error::NotSupported(format!(
            "cursor output parameter {} not supported by this driver",
            slot
        )))
    }

    /// Read an array output parameter. `None` when the database wrote NULL.
    async fn out_array(&mut self, slot: ParameterSlot<'_>) -> Result<Option<Box<dyn SqlArray>>>;

    /// Release the statement
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Rows produced by an executed call, read front to back
#[async_trait]
pub trait ResultSet: Send {
    /// Hint how many rows to fetch per round trip
    fn set_fetch_size(&mut self, _rows: u32) {}

    /// Advance to the next row
    async fn next(&mut self) -> Result<Option<Row>>;

    /// Advance to the next row and read its first column as an array handle
    async fn next_array(&mut self) -> Result<Option<Box<dyn SqlArray>>> {
        Err(Error::NotSupported(
            "array columns not supported by this result set".to_string(),
        ))
    }
}

/// A backend array handle
///
/// Handles are only valid for the invocation that created or read them and
/// must be freed exactly once.
#[async_trait]
pub trait SqlArray: Send + Sync {
    /// SQL type name of the elements, e.g. `VARCHAR`
    fn base_type_name(&self) -> &str;

    /// Element kind the backend materializes
    fn element(&self) -> ArrayElement;

    /// Materialize the elements
    async fn elements(&self) -> Result<Vec<Value>>;

    /// Release backend resources held by the handle
    async fn free(&mut self) -> Result<()>;
}
