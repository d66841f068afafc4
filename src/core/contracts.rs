use crate::Kernel;
use crate::core::activation::Activation;
use crate::core::arguments::ConstructorArguments;
use crate::core::error_di::DiError;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A resolved service. The boxed value is always the `Arc<S>` handle of the
/// service type `S` it was bound for.
pub type Instance = Arc<dyn Any + Send + Sync + 'static>;

pub(crate) type ServiceKey = (TypeId, String);
pub(crate) type ServiceFactory = Arc<
    dyn Fn(&mut Activation<'_>) -> Result<Instance, DiError> + Send + Sync + 'static,
>;

/// Runtime identity of a (possibly unsized) Rust type.
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        ServiceType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What the kernel was asked for: a service type and an optional binding name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub service: ServiceType,
    pub name: Option<String>,
}

impl ServiceRequest {
    pub fn new(service: ServiceType, name: Option<&str>) -> Self {
        ServiceRequest {
            service,
            name: name.map(str::to_string),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn key(&self) -> ServiceKey {
        (
            self.service.id(),
            self.name.clone().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    Transient,
    Singleton,
}

pub struct Binding {
    pub(crate) service: ServiceType,
    pub(crate) name: String,
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: ServiceFactory,
}

impl Binding {
    pub fn new<F>(service: ServiceType, name: Option<&str>, lifetime: Lifetime, factory: F) -> Self
    where
        F: Fn(&mut Activation<'_>) -> Result<Instance, DiError> + Send + Sync + 'static,
    {
        Binding {
            service,
            name: name.unwrap_or_default().to_string(),
            lifetime,
            factory: Arc::new(factory),
        }
    }

    pub fn transient<F>(service: ServiceType, name: Option<&str>, factory: F) -> Self
    where
        F: Fn(&mut Activation<'_>) -> Result<Instance, DiError> + Send + Sync + 'static,
    {
        Self::new(service, name, Lifetime::Transient, factory)
    }

    pub fn service(&self) -> ServiceType {
        self.service
    }

    pub fn name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn key(&self) -> ServiceKey {
        (self.service.id(), self.name.clone())
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("service", &self.service)
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// The kernel's object-resolution capability.
pub trait ResolverGateway: Send + Sync {
    fn resolve(
        &self,
        service: ServiceType,
        key: Option<&str>,
        arguments: ConstructorArguments,
    ) -> Result<Instance, DiError>;
}

/// Consulted only after ordinary binding lookup found nothing for `request`.
/// `None` means "no opinion".
pub trait MissingBindingResolver: Send + Sync {
    fn resolve(&self, request: &ServiceRequest) -> Option<Binding>;
}

pub trait KernelModule {
    fn load(&self, kernel: &Kernel) -> Result<(), DiError>;
}

pub fn into_instance<S>(service: Arc<S>) -> Instance
where
    S: ?Sized + Send + Sync + 'static,
{
    Arc::new(service)
}

pub fn downcast_service<S>(instance: &Instance) -> Result<Arc<S>, DiError>
where
    S: ?Sized + Send + Sync + 'static,
{
    instance
        .downcast_ref::<Arc<S>>()
        .cloned()
        .ok_or(DiError::TypeMismatch {
            expected: std::any::type_name::<S>(),
        })
}
