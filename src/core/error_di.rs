use std::any::Any;
use std::error::Error;
use thiserror::Error;

pub trait AnyError: Error + Send + Sync + 'static {}
impl<T> AnyError for T where T: Error + Any + Send + Sync + 'static {}

#[derive(Debug, Error)]
pub enum DiError {
    #[error("DiError: No binding for {service} with name: {name:?}")]
    BindingNotFound { service: &'static str, name: String },

    #[error("DiError: Service {service} already registered with name: {name:?}")]
    ServiceAlreadyRegistered { service: &'static str, name: String },

    #[error("DiError: A Mutex or RwLock was poisoned")]
    LockPoisoned,

    #[error("DiError: Service construction error: {0}")]
    ConstructionError(Box<dyn Error + Send + Sync + 'static>),

    #[error("DiError: Missing constructor argument `{argument}` for {service}")]
    MissingArgument {
        service: &'static str,
        argument: String,
    },

    #[error("DiError: Constructor argument `{argument}` is {actual}, expected {expected}")]
    ArgumentTypeMismatch {
        argument: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("DiError: Circular dependency detected for: {0}")]
    CircularDependency(&'static str),

    #[error("DiError: Type mismatch: could not downcast to {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("DiError: {interface} cannot be implemented as a factory: {reason}")]
    InvalidFactoryType {
        interface: &'static str,
        reason: String,
    },

    #[error("DiError: The kernel was dropped before {0} could be resolved")]
    KernelDropped(&'static str),

    #[error("DiError: External error during service creation: {0}")]
    External(Box<dyn AnyError>),
}

impl DiError {
    pub fn construction<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        DiError::ConstructionError(error.into())
    }

    /// Wraps an error raised by user code while building a service.
    pub fn external<E: AnyError>(error: E) -> Self {
        DiError::External(Box::new(error))
    }
}
