use sprocket_core::SqlType;

use crate::binding::{InParameterBinder, NOT_BOUND, OutParameterRegistrar};
use crate::extract::ResultExtractor;
use crate::resource::{ArraySlot, CallResourceFactory};
use crate::{
    CallerConfig, ConfigError, DispatchError, InterfaceMetadata, MethodSignature, ParameterShape,
    ReturnType, build_call_string,
};

/// Highest usable 1-based placeholder position, 0 is [`NOT_BOUND`]
const MAX_POSITION: usize = u8::MAX as usize - 1;

/// Narrow a placeholder position checked against [`MAX_POSITION`]
fn slot_position(method: &MethodSignature, position: usize) -> Result<u8, ConfigError> {
    u8::try_from(position)
        .ok()
        .filter(|_| position <= MAX_POSITION)
        .ok_or_else(|| ConfigError::TooManyParameters {
            method: method.name.clone(),
            count: position,
        })
}

/// 1-based placeholder positions of `arity` inputs around an output slot
///
/// Inputs fill the placeholders in order, skipping `out_index` when there is
/// one.
///
/// # Examples
///
/// ```
/// use sprocket_dispatch::input_positions;
///
/// assert_eq!(input_positions(3, Some(2)), vec![1, 3, 4]);
/// assert_eq!(input_positions(3, Some(3)), vec![1, 2, 4]);
/// assert_eq!(input_positions(2, None), vec![1, 2]);
/// ```
pub fn input_positions(arity: usize, out_index: Option<usize>) -> Vec<usize> {
    (1..=arity)
        .map(|position| match out_index {
            Some(out) if position >= out => position + 1,
            _ => position,
        })
        .collect()
}

/// Everything needed to invoke one method
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    method: String,
    procedure_name: String,
    call_string: String,
    parameter_count: usize,
    translate_errors: bool,
    in_parameters: InParameterBinder,
    out_parameter: OutParameterRegistrar,
    extractor: ResultExtractor,
    resources: CallResourceFactory,
}

impl CallDescriptor {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Backend procedure name, without qualifiers
    pub fn procedure_name(&self) -> &str {
        &self.procedure_name
    }

    pub fn call_string(&self) -> &str {
        &self.call_string
    }

    /// Number of arguments an invocation must supply, row mappers included
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn translates_errors(&self) -> bool {
        self.translate_errors
    }

    pub fn in_parameters(&self) -> &InParameterBinder {
        &self.in_parameters
    }

    pub fn out_parameter(&self) -> &OutParameterRegistrar {
        &self.out_parameter
    }

    pub fn extractor(&self) -> &ResultExtractor {
        &self.extractor
    }

    pub fn resources(&self) -> &CallResourceFactory {
        &self.resources
    }

    /// Wrap backend errors with the procedure and call string
    pub fn translate(&self, error: DispatchError) -> DispatchError {
        if !self.translate_errors {
            return error;
        }
        match error {
            DispatchError::Backend(source) => DispatchError::CallFailed {
                procedure: self.procedure_name.clone(),
                call: self.call_string.clone(),
                source,
            },
            DispatchError::Suppressed {
                primary,
                suppressed,
            } => DispatchError::Suppressed {
                primary: Box::new(self.translate(*primary)),
                suppressed,
            },
            other => other,
        }
    }
}

/// Derives [`CallDescriptor`]s for the methods of one interface
pub struct DescriptorBuilder<'a> {
    interface: &'a InterfaceMetadata,
    config: &'a CallerConfig,
}

/// Where the result slot sits, if any
#[derive(Clone, Copy)]
enum OutputSlot<'m> {
    None,
    ReturnValue(&'m crate::ReturnValueSpec),
    OutParameter(&'m crate::OutParameterSpec, usize),
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(interface: &'a InterfaceMetadata, config: &'a CallerConfig) -> Self {
        Self { interface, config }
    }

    pub fn build(&self, method: &MethodSignature) -> Result<CallDescriptor, ConfigError> {
        let meta = &method.metadata;
        let arity = method.value_parameters().count();

        let output = match (&meta.out_parameter, &meta.return_value) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::AmbiguousOutput {
                    method: method.name.clone(),
                });
            }
            (Some(spec), None) => {
                let index = spec.index.unwrap_or(arity + 1);
                if index == 0 || index > arity + 1 {
                    return Err(ConfigError::InvalidOutIndex {
                        method: method.name.clone(),
                        index,
                        max: arity + 1,
                    });
                }
                OutputSlot::OutParameter(spec, index)
            }
            (None, Some(spec)) => OutputSlot::ReturnValue(spec),
            (None, None) => OutputSlot::None,
        };
        if !matches!(output, OutputSlot::None) && method.returns == ReturnType::Unit {
            return Err(ConfigError::MissingReturnType {
                method: method.name.clone(),
            });
        }

        // The return slot of a function is placeholder 1
        let (out_index, placeholders, function) = match output {
            OutputSlot::None => (None, arity, false),
            OutputSlot::ReturnValue(_) => (Some(1), arity, true),
            OutputSlot::OutParameter(_, index) => (Some(index), arity + 1, false),
        };
        let positions = placeholders + usize::from(function);
        if positions > MAX_POSITION {
            return Err(ConfigError::TooManyParameters {
                method: method.name.clone(),
                count: positions,
            });
        }

        let in_parameters = self.in_parameters(method, arity, out_index)?;
        let out_parameter = self.out_parameter(method, &output)?;
        let extractor = self.extractor(method)?;
        let resources = self.resources(method)?;
        let in_parameters = if resources.needs_resources() {
            InParameterBinder::ResourceBacked(Box::new(in_parameters))
        } else {
            in_parameters
        };

        let procedure_name = meta
            .procedure_name
            .clone()
            .unwrap_or_else(|| self.config.procedure_naming.apply(&method.name));
        let namespace = meta
            .namespace
            .as_deref()
            .or(self.interface.namespace.as_deref())
            .or(self.config.namespace.as_deref());
        let schema = meta
            .schema
            .as_deref()
            .or(self.interface.schema.as_deref())
            .or(self.config.schema.as_deref());
        let call_string =
            build_call_string(namespace, schema, &procedure_name, placeholders, function);

        tracing::debug!(
            method = %method.name,
            call = %call_string,
            inputs = arity,
            "built call descriptor"
        );

        Ok(CallDescriptor {
            method: method.name.clone(),
            procedure_name,
            call_string,
            parameter_count: method.parameters.len(),
            translate_errors: !method.raw_backend_errors,
            in_parameters,
            out_parameter,
            extractor,
            resources,
        })
    }

    fn fetch_size(&self, method: &MethodSignature) -> Option<u32> {
        method
            .metadata
            .fetch_size
            .or(self.interface.fetch_size)
            .or(self.config.fetch_size)
    }

    fn in_parameters(
        &self,
        method: &MethodSignature,
        arity: usize,
        out_index: Option<usize>,
    ) -> Result<InParameterBinder, ConfigError> {
        if arity == 0 {
            return Ok(InParameterBinder::NoParameters);
        }
        let binding = self.config.binding;

        let types = if binding.typed() {
            let mut types = Vec::with_capacity(method.parameters.len());
            for parameter in &method.parameters {
                types.push(self.parameter_type(parameter)?);
            }
            Some(types)
        } else {
            None
        };

        let binder = if binding.by_name() {
            let mut names = vec![None; method.parameters.len()];
            for (index, parameter) in method.value_parameters() {
                names[index] = Some(self.parameter_name(method, index, parameter)?);
            }
            match types {
                Some(types) => InParameterBinder::ByNameAndType { names, types },
                None => InParameterBinder::ByName { names },
            }
        } else {
            let mut positions = vec![NOT_BOUND; method.parameters.len()];
            let bound = method.value_parameters().map(|(index, _)| index);
            for (index, position) in bound.zip(input_positions(arity, out_index)) {
                positions[index] = slot_position(method, position)?;
            }
            match types {
                Some(types) => InParameterBinder::ByIndexAndType { positions, types },
                None => InParameterBinder::ByIndex { positions },
            }
        };
        Ok(binder)
    }

    fn parameter_type(&self, parameter: &ParameterShape) -> Result<SqlType, ConfigError> {
        if let Some(sql_type) = parameter.metadata.sql_type {
            return Ok(sql_type);
        }
        if parameter.ty.is_row_mapper() {
            // never bound, the slot only keeps indexes aligned
            return Ok(SqlType::Null);
        }
        self.config.type_mapper().map_type(&parameter.ty)
    }

    fn parameter_name(
        &self,
        method: &MethodSignature,
        index: usize,
        parameter: &ParameterShape,
    ) -> Result<String, ConfigError> {
        if let Some(name) = &parameter.metadata.name {
            return Ok(name.clone());
        }
        parameter
            .name
            .as_deref()
            .map(|name| self.config.parameter_naming.apply(name))
            .ok_or_else(|| ConfigError::UnresolvedParameterName {
                method: method.name.clone(),
                index,
            })
    }

    fn return_type(&self, method: &MethodSignature) -> Result<SqlType, ConfigError> {
        match method.returns {
            ReturnType::Unit => Err(ConfigError::MissingReturnType {
                method: method.name.clone(),
            }),
            ReturnType::Scalar(kind) => self.config.type_mapper().map_kind(kind),
            ReturnType::List(_) => Ok(SqlType::RefCursor),
            ReturnType::Array(_) => Ok(SqlType::Array),
        }
    }

    fn out_parameter(
        &self,
        method: &MethodSignature,
        output: &OutputSlot<'_>,
    ) -> Result<OutParameterRegistrar, ConfigError> {
        let (name, sql_type, index) = match output {
            OutputSlot::None => return Ok(OutParameterRegistrar::None),
            OutputSlot::ReturnValue(spec) => (&spec.name, spec.sql_type, 1),
            OutputSlot::OutParameter(spec, index) => {
                if spec.name.is_none() && self.config.binding.by_name() {
                    return Err(ConfigError::UnresolvedOutParameterName {
                        method: method.name.clone(),
                    });
                }
                (&spec.name, spec.sql_type, *index)
            }
        };

        let sql_type = match sql_type {
            Some(sql_type) => sql_type,
            None => self.return_type(method)?,
        };
        let registrar = match name {
            Some(name) => OutParameterRegistrar::ByNameAndType {
                name: name.clone(),
                sql_type,
            },
            None => OutParameterRegistrar::ByIndexAndType {
                index: slot_position(method, index)?,
                sql_type,
            },
        };
        Ok(registrar)
    }

    fn extractor(&self, method: &MethodSignature) -> Result<ResultExtractor, ConfigError> {
        let mapper = method
            .parameters
            .iter()
            .position(|parameter| parameter.ty.is_row_mapper());

        let extractor = match method.returns {
            ReturnType::Unit => ResultExtractor::Void {
                policy: self.config.void_results,
            },
            ReturnType::Scalar(kind) => ResultExtractor::Scalar { kind },
            ReturnType::Array(element) => ResultExtractor::Array { element },
            ReturnType::List(element) => match (mapper, element) {
                (Some(mapper), _) => ResultExtractor::MappedList {
                    mapper,
                    fetch_size: self.fetch_size(method),
                },
                (None, Some(kind)) => ResultExtractor::ScalarList {
                    kind,
                    fetch_size: self.fetch_size(method),
                },
                (None, None) => {
                    return Err(ConfigError::UnresolvedElementType {
                        method: method.name.clone(),
                        index: None,
                    });
                }
            },
        };
        Ok(extractor)
    }

    fn resources(&self, method: &MethodSignature) -> Result<CallResourceFactory, ConfigError> {
        let mut slots = Vec::new();
        for (index, parameter) in method.value_parameters() {
            if !parameter.ty.is_array() {
                continue;
            }
            slots.push(ArraySlot {
                argument: index,
                type_name: self.element_type_name(method, index, parameter)?,
            });
        }

        if slots.is_empty() {
            Ok(CallResourceFactory::NoResources)
        } else {
            Ok(CallResourceFactory::Arrays(slots))
        }
    }

    /// Metadata first, then the declared element kind, then the resolver
    fn element_type_name(
        &self,
        method: &MethodSignature,
        index: usize,
        parameter: &ParameterShape,
    ) -> Result<String, ConfigError> {
        if let Some(type_name) = &parameter.metadata.type_name {
            return Ok(type_name.clone());
        }
        if let Some(kind) = parameter.ty.element_kind() {
            return Ok(self.config.type_mapper().map_kind(kind)?.name().to_string());
        }
        self.config
            .array_type_names()
            .and_then(|resolver| resolver.resolve(&method.name, index, parameter))
            .ok_or_else(|| ConfigError::UnresolvedElementType {
                method: method.name.clone(),
                index: Some(index),
            })
    }
}
