use crate::any_factory::catalog;
use crate::any_factory::synthesizer::ProxyTypeSynthesizer;
use crate::any_factory::translator::InvocationTranslator;
use crate::core::contracts::{Binding, MissingBindingResolver, ServiceRequest};
use tracing::trace;

/// Supplies a proxy-backed binding for unbound factory interfaces.
#[derive(Debug, Clone, Default)]
pub struct AnyFactoryResolver {
    synthesizer: ProxyTypeSynthesizer,
}

impl AnyFactoryResolver {
    pub fn new(synthesizer: ProxyTypeSynthesizer) -> Self {
        AnyFactoryResolver { synthesizer }
    }
}

impl MissingBindingResolver for AnyFactoryResolver {
    fn resolve(&self, request: &ServiceRequest) -> Option<Binding> {
        let descriptor = catalog::describe(request.service)?;
        if let Err(reason) = self.synthesizer.convention().check(&descriptor) {
            trace!(service = %request.service, %reason, "not an implicit factory");
            return None;
        }

        let synthesizer = self.synthesizer.clone();
        let service = request.service;
        Some(Binding::transient(service, request.name(), move |activation| {
            let proxy_type = synthesizer.get_or_build(service)?;
            let translator = InvocationTranslator::new(activation.gateway());
            Ok(proxy_type.instantiate(translator, synthesizer.convention().clone()))
        }))
    }
}
