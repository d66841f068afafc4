use crate::Kernel;
use crate::core::arguments::ConstructorArguments;
use crate::core::contracts::{ResolverGateway, ServiceRequest, ServiceType};
use crate::core::error_di::DiError;
use std::any::Any;
use std::sync::Arc;

/// Context handed to a binding's provider while it builds one instance.
pub struct Activation<'a> {
    kernel: &'a Kernel,
    request: &'a ServiceRequest,
    arguments: ConstructorArguments,
}

impl<'a> Activation<'a> {
    pub(crate) fn new(
        kernel: &'a Kernel,
        request: &'a ServiceRequest,
        arguments: ConstructorArguments,
    ) -> Self {
        Activation {
            kernel,
            request,
            arguments,
        }
    }

    pub fn kernel(&self) -> &Kernel {
        self.kernel
    }

    pub fn service(&self) -> ServiceType {
        self.request.service
    }

    pub fn name(&self) -> Option<&str> {
        self.request.name()
    }

    /// A gateway that does not keep the kernel alive.
    pub fn gateway(&self) -> Arc<dyn ResolverGateway> {
        Arc::new(self.kernel.downgrade())
    }

    pub fn get<S>(&self) -> Result<Arc<S>, DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.kernel.get::<S>()
    }

    pub fn get_by_name<S>(&self, name: &str) -> Result<Arc<S>, DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.kernel.get_by_name::<S>(name)
    }

    pub fn arguments(&self) -> &ConstructorArguments {
        &self.arguments
    }

    pub fn argument<T: Any>(&mut self, name: &str) -> Result<T, DiError> {
        self.optional_argument::<T>(name)?
            .ok_or_else(|| DiError::MissingArgument {
                service: self.request.service.name(),
                argument: name.to_string(),
            })
    }

    pub fn optional_argument<T: Any>(&mut self, name: &str) -> Result<Option<T>, DiError> {
        self.arguments.take::<T>(name)
    }
}
