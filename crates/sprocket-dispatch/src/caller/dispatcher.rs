use parking_lot::RwLock;
use sprocket_core::{CallableStatement, Connection, Value};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::descriptor::{CallDescriptor, DescriptorBuilder};
use crate::error::merge_cleanup;
use crate::resource::CallResource;
use crate::{
    Argument, CallerConfig, ConfigError, DispatchError, DispatchResult, FromValue,
    ProcedureInterface,
};

/// Invokes the methods of a [`ProcedureInterface`] against a connection
///
/// Descriptors are built on first use and cached by method name. Building
/// happens outside the cache lock; when two tasks race on the same method
/// the first descriptor stored wins and both use it. Failed builds are not
/// cached.
///
/// Cloning is cheap and shares the cache. Equality and hashing follow that
/// identity: clones are equal, independently constructed callers are not.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sprocket_core::Value;
/// use sprocket_dispatch::{
///     CallerConfig, MethodSignature, ParameterShape, ProcedureCaller, ProcedureInterface,
///     ReturnType, ScalarKind, args,
/// };
/// use sprocket_driver_mock::{CallScript, MockConnection};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let conn = MockConnection::new().with_script(
///     "{call app.plus(?,?,?)}",
///     CallScript::new().with_out_value(3, Value::Int32(5)),
/// );
/// let interface = ProcedureInterface::new("math").schema("app").method(
///     MethodSignature::new("plus")
///         .param(ParameterShape::scalar("a", ScalarKind::Int32))
///         .param(ParameterShape::scalar("b", ScalarKind::Int32))
///         .returns(ReturnType::Scalar(ScalarKind::Int32))
///         .out_parameter_default(),
/// );
///
/// let caller = ProcedureCaller::new(Arc::new(conn), interface, CallerConfig::default());
/// let sum: i32 = caller.invoke_as("plus", &args![2_i32, 3_i32]).await.unwrap();
/// assert_eq!(sum, 5);
/// # });
/// ```
#[derive(Clone)]
pub struct ProcedureCaller {
    inner: Arc<CallerInner>,
}

struct CallerInner {
    connection: Arc<dyn Connection>,
    interface: ProcedureInterface,
    config: CallerConfig,
    descriptors: RwLock<HashMap<String, Arc<CallDescriptor>>>,
}

impl ProcedureCaller {
    pub fn new(
        connection: Arc<dyn Connection>,
        interface: ProcedureInterface,
        config: CallerConfig,
    ) -> Self {
        tracing::debug!(
            interface = %interface.name,
            driver = %connection.driver_name(),
            methods = interface.methods.len(),
            "created procedure caller"
        );
        Self {
            inner: Arc::new(CallerInner {
                connection,
                interface,
                config,
                descriptors: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn interface(&self) -> &ProcedureInterface {
        &self.inner.interface
    }

    pub fn config(&self) -> &CallerConfig {
        &self.inner.config
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.inner.connection
    }

    /// Number of descriptors built so far
    pub fn cached_descriptors(&self) -> usize {
        self.inner.descriptors.read().len()
    }

    /// The descriptor for `method`, building and caching it on first use
    pub fn descriptor(&self, method: &str) -> Result<Arc<CallDescriptor>, ConfigError> {
        if let Some(descriptor) = self.inner.descriptors.read().get(method) {
            tracing::trace!(method = %method, "descriptor cache hit");
            return Ok(descriptor.clone());
        }
        tracing::trace!(method = %method, "descriptor cache miss");

        let signature = self
            .inner
            .interface
            .find(method)
            .ok_or_else(|| ConfigError::UnknownMethod(method.to_string()))?;
        let built = DescriptorBuilder::new(&self.inner.interface.metadata, &self.inner.config)
            .build(signature)
            .inspect_err(|e| {
                tracing::warn!(method = %method, error = %e, "cannot build call descriptor")
            })?;

        let mut descriptors = self.inner.descriptors.write();
        let descriptor = descriptors
            .entry(method.to_string())
            .or_insert_with(|| Arc::new(built));
        Ok(descriptor.clone())
    }

    /// Invoke `method` with `arguments`
    ///
    /// Arguments match the declared parameters positionally, row mappers
    /// included. The statement is closed and array resources are freed on
    /// every path; failures while doing so are attached to an earlier error
    /// as suppressed, or returned when the call itself succeeded.
    pub async fn invoke(&self, method: &str, arguments: &[Argument]) -> DispatchResult<Value> {
        let descriptor = self.descriptor(method)?;
        if arguments.len() != descriptor.parameter_count() {
            return Err(DispatchError::ArgumentCount {
                method: method.to_string(),
                expected: descriptor.parameter_count(),
                actual: arguments.len(),
            });
        }

        tracing::debug!(
            method = %method,
            call = %descriptor.call_string(),
            arguments = arguments.len(),
            "invoking stored procedure"
        );

        let connection = self.inner.connection.as_ref();
        let outcome = match descriptor.resources().create(connection, arguments).await {
            Ok(resources) => {
                let result = execute(connection, &descriptor, arguments, &resources).await;
                merge_cleanup(result, resources.close().await)
            }
            Err(error) => Err(error),
        };

        outcome.map_err(|error| {
            let error = descriptor.translate(error);
            tracing::debug!(method = %method, error = %error, "stored procedure call failed");
            error
        })
    }

    /// Invoke `method` and convert the result
    pub async fn invoke_as<T: FromValue>(
        &self,
        method: &str,
        arguments: &[Argument],
    ) -> DispatchResult<T> {
        T::from_value(self.invoke(method, arguments).await?)
    }
}

/// Prepare the call and run it, closing the statement afterwards
async fn execute(
    connection: &dyn Connection,
    descriptor: &CallDescriptor,
    arguments: &[Argument],
    resources: &CallResource,
) -> DispatchResult<Value> {
    let mut call = connection.prepare_call(descriptor.call_string()).await?;
    let result = run(call.as_mut(), descriptor, arguments, resources).await;
    let closed = call.close().await.map_err(DispatchError::from);
    merge_cleanup(result, closed)
}

async fn run(
    call: &mut dyn CallableStatement,
    descriptor: &CallDescriptor,
    arguments: &[Argument],
    resources: &CallResource,
) -> DispatchResult<Value> {
    descriptor.in_parameters().bind(call, arguments, resources)?;
    descriptor.out_parameter().register(call)?;
    descriptor
        .extractor()
        .extract(call, descriptor.out_parameter(), arguments)
        .await
}

impl PartialEq for ProcedureCaller {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ProcedureCaller {}

impl Hash for ProcedureCaller {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Display for ProcedureCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcedureCaller({} via {})",
            self.inner.interface.name,
            self.inner.connection.driver_name()
        )
    }
}

impl fmt::Debug for ProcedureCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureCaller")
            .field("interface", &self.inner.interface.name)
            .field("driver", &self.inner.connection.driver_name())
            .field("cached_descriptors", &self.cached_descriptors())
            .finish()
    }
}
