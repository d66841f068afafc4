use crate::Kernel;
use crate::core::activation::Activation;
use crate::core::contracts::{Binding, Lifetime, ServiceType, into_instance};
use crate::core::di_inventory::DiConstructor;
use crate::core::error_di::DiError;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

pub(crate) fn register_factory<S, F>(
    kernel: &Kernel,
    name: &str,
    lifetime: Lifetime,
    factory: F,
) -> Result<(), DiError>
where
    S: ?Sized + Send + Sync + 'static,
    F: Fn(&mut Activation<'_>) -> Result<Arc<S>, DiError> + Send + Sync + 'static,
{
    let binding = Binding::new(
        ServiceType::of::<S>(),
        Some(name),
        lifetime,
        move |activation| factory(activation).map(into_instance),
    );
    kernel.bind(binding)
}

impl Kernel {
    pub fn bind(&self, binding: Binding) -> Result<(), DiError> {
        match self.inner.bindings.entry(binding.key()) {
            Entry::Occupied(_) => Err(DiError::ServiceAlreadyRegistered {
                service: binding.service.name(),
                name: binding.name,
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(binding));
                Ok(())
            }
        }
    }

    pub fn bind_transient<S, F>(&self, factory: F) -> Result<(), DiError>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Activation<'_>) -> Result<Arc<S>, DiError> + Send + Sync + 'static,
    {
        register_factory::<S, F>(self, "", Lifetime::Transient, factory)
    }

    pub fn bind_transient_name<S, F>(&self, name: &str, factory: F) -> Result<(), DiError>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Activation<'_>) -> Result<Arc<S>, DiError> + Send + Sync + 'static,
    {
        register_factory::<S, F>(self, name, Lifetime::Transient, factory)
    }

    pub fn bind_singleton<S, F>(&self, factory: F) -> Result<(), DiError>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Activation<'_>) -> Result<Arc<S>, DiError> + Send + Sync + 'static,
    {
        register_factory::<S, F>(self, "", Lifetime::Singleton, factory)
    }

    pub fn bind_singleton_name<S, F>(&self, name: &str, factory: F) -> Result<(), DiError>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Activation<'_>) -> Result<Arc<S>, DiError> + Send + Sync + 'static,
    {
        register_factory::<S, F>(self, name, Lifetime::Singleton, factory)
    }

    pub fn bind_constant<S>(&self, service: Arc<S>) -> Result<(), DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.bind_constant_name("", service)
    }

    pub fn bind_constant_name<S>(&self, name: &str, service: Arc<S>) -> Result<(), DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        register_factory::<S, _>(self, name, Lifetime::Singleton, move |_| {
            Ok(service.clone())
        })
    }

    pub fn has_binding(&self, service: ServiceType, name: Option<&str>) -> bool {
        self.inner
            .bindings
            .contains_key(&(service.id(), name.unwrap_or_default().to_string()))
    }

    /// Applies every `#[registry(...)]` registration linked into the binary.
    pub fn load_registered(&self) -> Result<(), DiError> {
        for constructor in inventory::iter::<DiConstructor> {
            (constructor.register)(self)?;
        }
        Ok(())
    }
}
