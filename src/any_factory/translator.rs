use crate::core::arguments::ConstructorArguments;
use crate::core::contracts::{Instance, ResolverGateway, ServiceType};
use crate::core::error_di::DiError;
use std::fmt;
use std::sync::Arc;

/// One factory method call, ready to be resolved.
#[derive(Debug)]
pub struct CreationRequest {
    pub target: ServiceType,
    pub key: Option<String>,
    pub arguments: ConstructorArguments,
}

/// Routes factory method calls to the kernel. Owned by a single proxy.
pub struct InvocationTranslator {
    gateway: Arc<dyn ResolverGateway>,
}

impl InvocationTranslator {
    pub fn new(gateway: Arc<dyn ResolverGateway>) -> Self {
        InvocationTranslator { gateway }
    }

    pub fn dispatch(&self, request: CreationRequest) -> Result<Instance, DiError> {
        self.gateway
            .resolve(request.target, request.key.as_deref(), request.arguments)
    }
}

impl fmt::Debug for InvocationTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationTranslator").finish_non_exhaustive()
    }
}
