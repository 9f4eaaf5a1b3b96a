use sprocket_core::{Connection, SqlArray, Value};

use crate::{Argument, DispatchError, DispatchResult};

/// An argument that is bound through a backend array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySlot {
    /// Argument index
    pub argument: usize,
    /// Element type name passed to [`Connection::create_array`]
    pub type_name: String,
}

/// Creates the resources one invocation needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CallResourceFactory {
    #[default]
    NoResources,
    Arrays(Vec<ArraySlot>),
}

impl CallResourceFactory {
    pub fn needs_resources(&self) -> bool {
        matches!(self, CallResourceFactory::Arrays(slots) if !slots.is_empty())
    }

    /// Create array handles for the array arguments
    ///
    /// NULL arguments get no handle. When a creation fails, handles created so
    /// far are freed before the error is returned, with their free failures
    /// attached as suppressed.
    pub async fn create(
        &self,
        connection: &dyn Connection,
        arguments: &[Argument],
    ) -> DispatchResult<CallResource> {
        let CallResourceFactory::Arrays(slots) = self else {
            return Ok(CallResource::NoResource);
        };

        let mut created = Vec::with_capacity(slots.len());
        for slot in slots {
            let elements = match arguments.get(slot.argument) {
                Some(Argument::Value(Value::Array(elements))) => elements.as_slice(),
                Some(Argument::Value(Value::Null)) | None => continue,
                Some(_) => {
                    let error = DispatchError::ArgumentShape {
                        index: slot.argument,
                        expected: "array",
                    };
                    return Err(abandon(created, error).await);
                }
            };

            match connection.create_array(&slot.type_name, elements).await {
                Ok(array) => {
                    tracing::trace!(
                        argument = slot.argument,
                        type_name = %slot.type_name,
                        elements = elements.len(),
                        "created array argument"
                    );
                    created.push(ArrayResource {
                        argument: slot.argument,
                        array,
                    });
                }
                Err(error) => return Err(abandon(created, error.into()).await),
            }
        }

        Ok(CallResource::from_arrays(created))
    }
}

async fn abandon(created: Vec<ArrayResource>, error: DispatchError) -> DispatchError {
    match CallResource::from_arrays(created).close().await {
        Ok(()) => error,
        Err(release) => error.with_suppressed(flatten(release)),
    }
}

fn flatten(error: DispatchError) -> Vec<DispatchError> {
    match error {
        DispatchError::Suppressed {
            primary,
            mut suppressed,
        } => {
            suppressed.insert(0, *primary);
            suppressed
        }
        other => vec![other],
    }
}

/// One array handle bound to an argument
pub struct ArrayResource {
    argument: usize,
    array: Box<dyn SqlArray>,
}

impl ArrayResource {
    pub fn new(argument: usize, array: Box<dyn SqlArray>) -> Self {
        Self { argument, array }
    }

    pub fn argument(&self) -> usize {
        self.argument
    }

    pub fn array(&self) -> &dyn SqlArray {
        self.array.as_ref()
    }
}

impl std::fmt::Debug for ArrayResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayResource")
            .field("argument", &self.argument)
            .field("type_name", &self.array.base_type_name())
            .finish()
    }
}

/// Resources held for the duration of one invocation
#[derive(Debug, Default)]
pub enum CallResource {
    #[default]
    NoResource,
    Single(ArrayResource),
    Composite(Vec<ArrayResource>),
}

impl CallResource {
    pub fn from_arrays(mut arrays: Vec<ArrayResource>) -> Self {
        match arrays.len() {
            0 => CallResource::NoResource,
            1 => arrays
                .pop()
                .map(CallResource::Single)
                .unwrap_or(CallResource::NoResource),
            _ => CallResource::Composite(arrays),
        }
    }

    /// The array handle created for argument `argument`
    pub fn array_for(&self, argument: usize) -> Option<&dyn SqlArray> {
        match self {
            CallResource::NoResource => None,
            CallResource::Single(resource) => {
                (resource.argument == argument).then(|| resource.array())
            }
            CallResource::Composite(resources) => resources
                .iter()
                .find(|r| r.argument == argument)
                .map(ArrayResource::array),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CallResource::NoResource => 0,
            CallResource::Single(_) => 1,
            CallResource::Composite(resources) => resources.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free every handle exactly once
    ///
    /// All handles are freed even when some fail. The first failure is
    /// returned with the later ones attached as suppressed.
    pub async fn close(self) -> DispatchResult<()> {
        let resources = match self {
            CallResource::NoResource => return Ok(()),
            CallResource::Single(resource) => vec![resource],
            CallResource::Composite(resources) => resources,
        };

        let mut failures: Vec<DispatchError> = Vec::new();
        for mut resource in resources {
            if let Err(error) = resource.array.free().await {
                tracing::debug!(argument = resource.argument, error = %error, "failed to free array");
                failures.push(error.into());
            }
        }

        if failures.is_empty() {
            return Ok(());
        }
        let primary = failures.remove(0);
        Err(primary.with_suppressed(failures))
    }
}
