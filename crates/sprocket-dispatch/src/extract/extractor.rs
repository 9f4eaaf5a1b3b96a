use sprocket_core::{ArrayElement, CallableStatement, ResultSet, ScalarKind, SqlArray, Value};

use crate::binding::OutParameterRegistrar;
use crate::error::merge_cleanup;
use crate::{Argument, DispatchError, DispatchResult, VoidResultPolicy};

/// Executes a call and produces its result
#[derive(Debug, Clone, PartialEq)]
pub enum ResultExtractor {
    /// Nothing is returned; stray rows are handled by `policy`
    Void { policy: VoidResultPolicy },
    /// Exactly one value, from the single row of a row set or from the
    /// output slot
    Scalar { kind: ScalarKind },
    /// The first column of every row
    ScalarList {
        kind: ScalarKind,
        fetch_size: Option<u32>,
    },
    /// Every row passed through the row mapper argument at `mapper`
    MappedList {
        mapper: usize,
        fetch_size: Option<u32>,
    },
    /// A backend array, materialized and freed
    Array { element: ArrayElement },
}

impl ResultExtractor {
    /// Execute `call` and read the result
    pub async fn extract(
        &self,
        call: &mut dyn CallableStatement,
        out: &OutParameterRegistrar,
        arguments: &[Argument],
    ) -> DispatchResult<Value> {
        if let Some(rows) = self.fetch_size() {
            call.set_fetch_size(rows)?;
        }
        let has_rows = call.execute().await?;
        let result_set = if has_rows {
            call.result_set().await?
        } else {
            None
        };

        match self {
            ResultExtractor::Void { policy } => {
                if let Some(rows) = result_set {
                    discard(rows, *policy).await?;
                }
                Ok(Value::Null)
            }
            ResultExtractor::Scalar { kind } => match result_set {
                Some(rows) => single_value(rows, *kind).await,
                None => out.read_scalar(call, *kind),
            },
            ResultExtractor::ScalarList { kind, fetch_size } => {
                let rows = match result_set {
                    Some(rows) => rows,
                    None => out.read_rows(call).await?,
                };
                collect(rows, *fetch_size, |row, _| {
                    let value = row.get(0).cloned().unwrap_or(Value::Null);
                    value
                        .coerce_to(*kind)
                        .ok_or_else(|| DispatchError::type_mismatch(kind, value.type_name()))
                })
                .await
            }
            ResultExtractor::MappedList { mapper, fetch_size } => {
                let mapper = arguments
                    .get(*mapper)
                    .and_then(Argument::as_mapper)
                    .ok_or(DispatchError::ArgumentShape {
                        index: *mapper,
                        expected: "row mapper",
                    })?;
                let rows = match result_set {
                    Some(rows) => rows,
                    None => out.read_rows(call).await?,
                };
                collect(rows, *fetch_size, |row, index| Ok(mapper.map(row, index)?)).await
            }
            ResultExtractor::Array { element } => {
                let array = match result_set {
                    Some(rows) => single_array(rows).await?,
                    None => match out.read_array(call).await? {
                        Some(array) => array,
                        None => return Ok(Value::Null),
                    },
                };
                materialize(array, *element).await
            }
        }
    }

    fn fetch_size(&self) -> Option<u32> {
        match self {
            ResultExtractor::ScalarList { fetch_size, .. }
            | ResultExtractor::MappedList { fetch_size, .. } => *fetch_size,
            _ => None,
        }
    }
}

async fn discard(mut rows: Box<dyn ResultSet>, policy: VoidResultPolicy) -> DispatchResult<()> {
    let mut count = 0;
    while rows.next().await?.is_some() {
        count += 1;
    }
    if count == 0 {
        return Ok(());
    }
    match policy {
        VoidResultPolicy::AcceptAndIgnore => {
            tracing::debug!(rows = count, "discarded rows returned to a void method");
            Ok(())
        }
        VoidResultPolicy::Reject => Err(DispatchError::IncorrectResultSize {
            expected: 0,
            actual: count,
        }),
    }
}

async fn single_value(mut rows: Box<dyn ResultSet>, kind: ScalarKind) -> DispatchResult<Value> {
    let mut first = None;
    let mut count = 0;
    while let Some(row) = rows.next().await? {
        if first.is_none() {
            first = Some(row);
        }
        count += 1;
    }

    match first {
        Some(row) if count == 1 => {
            let value = row.get(0).cloned().unwrap_or(Value::Null);
            value
                .coerce_to(kind)
                .ok_or_else(|| DispatchError::type_mismatch(kind, value.type_name()))
        }
        _ => Err(DispatchError::IncorrectResultSize {
            expected: 1,
            actual: count,
        }),
    }
}

async fn collect<F>(
    mut rows: Box<dyn ResultSet>,
    fetch_size: Option<u32>,
    map: F,
) -> DispatchResult<Value>
where
    F: Fn(&sprocket_core::Row, usize) -> DispatchResult<Value>,
{
    if let Some(size) = fetch_size {
        rows.set_fetch_size(size);
    }
    let mut values = Vec::new();
    while let Some(row) = rows.next().await? {
        values.push(map(&row, values.len())?);
    }
    tracing::trace!(rows = values.len(), "collected list result");
    Ok(Value::Array(values))
}

/// The array in the first column of the only row
async fn single_array(mut rows: Box<dyn ResultSet>) -> DispatchResult<Box<dyn SqlArray>> {
    let Some(mut array) = rows.next_array().await? else {
        return Err(DispatchError::IncorrectResultSize {
            expected: 1,
            actual: 0,
        });
    };

    let mut extra = 0;
    let drained = async {
        while rows.next().await?.is_some() {
            extra += 1;
        }
        Ok::<_, DispatchError>(())
    }
    .await;

    let outcome = match drained {
        Ok(()) if extra == 0 => return Ok(array),
        Ok(()) => Err(DispatchError::IncorrectResultSize {
            expected: 1,
            actual: 1 + extra,
        }),
        Err(error) => Err(error),
    };
    merge_cleanup(outcome, array.free().await.map_err(DispatchError::from))
}

/// Copy the elements out of `array` and free it
async fn materialize(mut array: Box<dyn SqlArray>, declared: ArrayElement) -> DispatchResult<Value> {
    let converted = convert_elements(array.as_ref(), declared).await;
    let freed = array.free().await.map_err(DispatchError::from);
    merge_cleanup(converted, freed)
}

async fn convert_elements(array: &dyn SqlArray, declared: ArrayElement) -> DispatchResult<Value> {
    let actual = array.element();
    if actual.kind != declared.kind {
        return Err(DispatchError::type_mismatch(declared, actual));
    }

    let elements = array.elements().await?;
    if actual.nullable == declared.nullable || declared.nullable {
        return Ok(Value::Array(elements));
    }
    // nullable backend elements into a primitive array
    if let Some(index) = elements.iter().position(Value::is_null) {
        return Err(DispatchError::NullElement { index });
    }
    Ok(Value::Array(elements))
}
