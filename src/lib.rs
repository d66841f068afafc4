#![doc = "Dependency Injection for Rust with auto-implemented factory interfaces"]
//!
//! A [`Kernel`] resolves services bound by type and optional name. Traits
//! marked with [`factory`] whose methods all follow the `create*` naming
//! convention need no implementation: once [`AnyFactoryModule`] is loaded,
//! requesting `dyn MyFactory` yields a synthesized proxy whose methods resolve
//! their return type from the kernel, keyed by the method name suffix and
//! passing the call arguments as named constructor arguments.
//!
//! ```ignore
//! #[rust_di_factory::factory]
//! pub trait WidgetFactory {
//!     fn create(&self) -> Result<Arc<dyn Widget>, DiError>;
//!     fn create_large(&self) -> Result<Arc<dyn Widget>, DiError>;
//!     #[factory(rename = "Create")]
//!     fn create_labelled(&self, label: String) -> Result<Arc<dyn Widget>, DiError>;
//! }
//!
//! let kernel = Kernel::new();
//! kernel.load(AnyFactoryModule::default())?;
//! let widgets = kernel.get::<dyn WidgetFactory>()?;
//! let large = widgets.create_large()?; // resolves `dyn Widget` named "Large"
//! ```
extern crate self as rust_di_factory;

pub mod any_factory;
pub mod core;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use inventory;

pub use crate::any_factory::{AnyFactoryModule, FactoryConvention};
pub use crate::core::activation::Activation;
pub use crate::core::arguments::ConstructorArguments;
pub use crate::core::contracts::{
    Binding, Instance, KernelModule, Lifetime, MissingBindingResolver, ResolverGateway,
    ServiceRequest, ServiceType,
};
pub use crate::core::error_di::DiError;
pub use crate::core::factory::DiFactory;

/// Attribute macro turning a trait into an auto-implemented factory interface.
pub use di_macros::factory;
/// Attribute macro for registering services.
///
/// # Usage
///
/// ```ignore
/// #[rust_di_factory::registry(
///     Singleton,
///     Singleton(factory),
///     Singleton(name = "custom"),
///     Singleton(factory = MyFactory, name = "custom"),
///
///     Transient,
///     Transient(factory),
///     Transient(name = "custom"),
///     Transient(factory = MyFactory, name = "custom"),
/// )]
/// impl MyService {}
/// ```
pub use di_macros::registry;

use crate::core::contracts::{ServiceKey, downcast_service};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

thread_local! {
    static RESOLVING_STACK: RefCell<Vec<ServiceKey>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone)]
pub struct Kernel {
    pub(crate) inner: Arc<KernelInner>,
}

pub(crate) struct KernelInner {
    pub(crate) bindings: DashMap<ServiceKey, Arc<Binding>>,
    singletons: DashMap<ServiceKey, Instance>,
    missing_binding_resolvers: ArcSwap<Vec<Arc<dyn MissingBindingResolver>>>,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("bindings_count", &self.inner.bindings.len())
            .field("singletons_count", &self.inner.singletons.len())
            .field(
                "missing_binding_resolvers",
                &self.inner.missing_binding_resolvers.load().len(),
            )
            .finish()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Kernel {
            inner: Arc::new(KernelInner {
                bindings: DashMap::new(),
                singletons: DashMap::new(),
                missing_binding_resolvers: ArcSwap::from_pointee(Vec::new()),
            }),
        }
    }

    /// A handle that resolves through this kernel while it is alive.
    pub fn downgrade(&self) -> WeakKernel {
        WeakKernel {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn load<M: KernelModule>(&self, module: M) -> Result<(), DiError> {
        module.load(self)
    }

    pub fn add_missing_binding_resolver<R>(&self, resolver: R)
    where
        R: MissingBindingResolver + 'static,
    {
        let resolver: Arc<dyn MissingBindingResolver> = Arc::new(resolver);
        self.inner.missing_binding_resolvers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(resolver.clone());
            next
        });
    }

    pub fn get<S>(&self) -> Result<Arc<S>, DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.get_with::<S>(None, ConstructorArguments::new())
    }

    pub fn get_by_name<S>(&self, name: &str) -> Result<Arc<S>, DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.get_with::<S>(Some(name), ConstructorArguments::new())
    }

    pub fn get_with<S>(&self, name: Option<&str>, arguments: ConstructorArguments) -> Result<Arc<S>, DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve(ServiceType::of::<S>(), name, arguments)?;
        downcast_service::<S>(&instance)
    }

    pub fn resolve(
        &self,
        service: ServiceType,
        name: Option<&str>,
        arguments: ConstructorArguments,
    ) -> Result<Instance, DiError> {
        let request = ServiceRequest::new(service, name);
        let key = request.key();
        let _guard = ResolvingGuard::enter(&key, service)?;
        trace!(service = %service, name = ?name, arguments = arguments.len(), "resolving");

        let existing = self.inner.bindings.get(&key).map(|entry| entry.value().clone());
        let binding = match existing {
            Some(binding) => binding,
            None => self
                .missing_binding(&request)
                .ok_or_else(|| DiError::BindingNotFound {
                    service: service.name(),
                    name: key.1.clone(),
                })?,
        };

        self.activate(&binding, &request, arguments)
    }

    fn missing_binding(&self, request: &ServiceRequest) -> Option<Arc<Binding>> {
        let resolvers = self.inner.missing_binding_resolvers.load();
        let binding = resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(request))?;

        debug!(service = %request.service, name = ?request.name(), "installing binding from missing-binding resolver");
        let installed = self
            .inner
            .bindings
            .entry(request.key())
            .or_insert_with(|| Arc::new(binding))
            .value()
            .clone();
        Some(installed)
    }

    fn activate(
        &self,
        binding: &Binding,
        request: &ServiceRequest,
        arguments: ConstructorArguments,
    ) -> Result<Instance, DiError> {
        match binding.lifetime {
            Lifetime::Transient => {
                (binding.factory)(&mut Activation::new(self, request, arguments))
            }
            Lifetime::Singleton => {
                let key = request.key();
                let cached = self.inner.singletons.get(&key).map(|entry| entry.value().clone());
                if let Some(instance) = cached {
                    return Ok(instance);
                }
                let instance = (binding.factory)(&mut Activation::new(self, request, arguments))?;
                Ok(self
                    .inner
                    .singletons
                    .entry(key)
                    .or_insert(instance)
                    .value()
                    .clone())
            }
        }
    }
}

/// Non-owning kernel handle held by generated factories.
#[derive(Clone)]
pub struct WeakKernel {
    inner: Weak<KernelInner>,
}

impl WeakKernel {
    pub fn upgrade(&self) -> Option<Kernel> {
        self.inner.upgrade().map(|inner| Kernel { inner })
    }
}

impl fmt::Debug for WeakKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakKernel")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl ResolverGateway for WeakKernel {
    fn resolve(
        &self,
        service: ServiceType,
        key: Option<&str>,
        arguments: ConstructorArguments,
    ) -> Result<Instance, DiError> {
        let kernel = self
            .upgrade()
            .ok_or(DiError::KernelDropped(service.name()))?;
        kernel.resolve(service, key, arguments)
    }
}

impl ResolverGateway for Kernel {
    fn resolve(
        &self,
        service: ServiceType,
        key: Option<&str>,
        arguments: ConstructorArguments,
    ) -> Result<Instance, DiError> {
        Kernel::resolve(self, service, key, arguments)
    }
}

/// Keeps the per-thread resolution chain; popped on drop.
struct ResolvingGuard;

impl ResolvingGuard {
    fn enter(key: &ServiceKey, service: ServiceType) -> Result<Self, DiError> {
        RESOLVING_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(key) {
                return Err(DiError::CircularDependency(service.name()));
            }
            stack.push(key.clone());
            Ok(ResolvingGuard)
        })
    }
}

impl Drop for ResolvingGuard {
    fn drop(&mut self) {
        RESOLVING_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
