pub mod catalog;
pub mod convention;
pub mod descriptor;
pub mod hook;
pub mod synthesizer;
pub mod translator;

#[cfg(test)]
mod tests;

pub use crate::core::arguments::ArgumentValue;
pub use convention::{FactoryConvention, Ineligible, derive_key};
pub use descriptor::{
    Activator, FactoryInterface, InterfaceDescriptor, MemberKind, MethodDescriptor, TypeKind,
};
pub use hook::AnyFactoryResolver;
pub use synthesizer::{FactoryProxy, ProxyType, ProxyTypeSynthesizer};
pub use translator::{CreationRequest, InvocationTranslator};

use crate::Kernel;
use crate::core::contracts::KernelModule;
use crate::core::error_di::DiError;

/// Lets `kernel` build implementations of factory interfaces on demand.
#[derive(Debug, Clone, Default)]
pub struct AnyFactoryModule {
    pub convention: FactoryConvention,
}

impl AnyFactoryModule {
    pub fn new(convention: FactoryConvention) -> Self {
        AnyFactoryModule { convention }
    }
}

impl KernelModule for AnyFactoryModule {
    fn load(&self, kernel: &Kernel) -> Result<(), DiError> {
        let synthesizer = ProxyTypeSynthesizer::new(self.convention.clone());
        kernel.add_missing_binding_resolver(AnyFactoryResolver::new(synthesizer));
        Ok(())
    }
}
