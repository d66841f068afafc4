use crate::any_factory::catalog;
use crate::any_factory::convention::FactoryConvention;
use crate::any_factory::descriptor::{Activator, InterfaceDescriptor};
use crate::any_factory::translator::{CreationRequest, InvocationTranslator};
use crate::core::arguments::{ArgumentValue, ConstructorArguments};
use crate::core::contracts::{Instance, ServiceType, downcast_service};
use crate::core::error_di::DiError;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

static PROXY_TYPES: Lazy<DashMap<TypeId, Arc<ProxyType>>> = Lazy::new(DashMap::new);
static SYNTHESIS: Mutex<()> = Mutex::new(());
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Builds and caches one [`ProxyType`] per factory interface.
#[derive(Debug, Clone, Default)]
pub struct ProxyTypeSynthesizer {
    convention: FactoryConvention,
}

impl ProxyTypeSynthesizer {
    pub fn new(convention: FactoryConvention) -> Self {
        ProxyTypeSynthesizer { convention }
    }

    pub fn convention(&self) -> &FactoryConvention {
        &self.convention
    }

    pub fn get_or_build(&self, service: ServiceType) -> Result<Arc<ProxyType>, DiError> {
        let descriptor = catalog::describe(service).ok_or_else(|| DiError::InvalidFactoryType {
            interface: service.name(),
            reason: "no interface description registered".to_string(),
        })?;
        self.get_or_build_from(&descriptor)
    }

    pub fn get_or_build_from(
        &self,
        descriptor: &InterfaceDescriptor,
    ) -> Result<Arc<ProxyType>, DiError> {
        let service = descriptor.service();
        self.convention
            .check(descriptor)
            .map_err(|reason| DiError::InvalidFactoryType {
                interface: service.name(),
                reason: reason.to_string(),
            })?;

        if let Some(proxy_type) = cached(service) {
            return Ok(proxy_type);
        }

        let _guard = SYNTHESIS.lock().map_err(|_| DiError::LockPoisoned)?;
        if let Some(proxy_type) = cached(service) {
            return Ok(proxy_type);
        }

        let proxy_type = Arc::new(self.build(descriptor)?);
        PROXY_TYPES.insert(service.id(), proxy_type.clone());
        debug!(
            interface = %service,
            methods = proxy_type.methods.len(),
            serial = proxy_type.serial,
            "synthesized factory proxy type"
        );
        Ok(proxy_type)
    }

    fn build(&self, descriptor: &InterfaceDescriptor) -> Result<ProxyType, DiError> {
        let service = descriptor.service();
        let activator = descriptor
            .activator_fn()
            .ok_or_else(|| DiError::InvalidFactoryType {
                interface: service.name(),
                reason: "interface has no proxy activator".to_string(),
            })?;

        let methods = descriptor
            .methods()
            .iter()
            .map(|method| {
                let target = method.return_type().ok_or_else(|| DiError::InvalidFactoryType {
                    interface: service.name(),
                    reason: format!("method `{}` returns nothing", method.name()),
                })?;
                Ok(MethodPlan {
                    name: method.name(),
                    target,
                    parameters: method.parameters().iter().map(|p| p.name).collect(),
                })
            })
            .collect::<Result<Vec<_>, DiError>>()?;

        Ok(ProxyType {
            interface: service,
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            methods,
            activator,
        })
    }
}

/// The cached proxy type for `service`, if it was synthesized already.
pub fn cached(service: ServiceType) -> Option<Arc<ProxyType>> {
    PROXY_TYPES
        .get(&service.id())
        .map(|entry| entry.value().clone())
}

#[derive(Debug)]
struct MethodPlan {
    name: &'static str,
    target: ServiceType,
    parameters: Vec<&'static str>,
}

impl MethodPlan {
    /// The key comes from the convention of the proxy making the call, not
    /// the one that synthesized the type.
    fn request(
        &self,
        convention: &FactoryConvention,
        values: Vec<ArgumentValue>,
    ) -> CreationRequest {
        let mut arguments = ConstructorArguments::with_capacity(values.len());
        for (name, value) in self.parameters.iter().zip(values) {
            arguments.push(*name, value);
        }
        CreationRequest {
            target: self.target,
            key: convention.key_for(self.name).map(str::to_string),
            arguments,
        }
    }
}

/// A synthesized implementation of one factory interface.
pub struct ProxyType {
    interface: ServiceType,
    serial: u64,
    methods: Vec<MethodPlan>,
    activator: Activator,
}

impl ProxyType {
    pub fn interface(&self) -> ServiceType {
        self.interface
    }

    /// Distinct for every synthesized proxy type in the process.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// The only way to create a proxy: returns the instance as the interface's
    /// trait object. `convention` derives the binding keys of its calls.
    pub fn instantiate(
        self: &Arc<Self>,
        translator: InvocationTranslator,
        convention: FactoryConvention,
    ) -> Instance {
        (self.activator)(FactoryProxy {
            proxy_type: self.clone(),
            translator,
            convention,
        })
    }
}

impl fmt::Debug for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyType")
            .field("interface", &self.interface)
            .field("serial", &self.serial)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Instance of a synthesized proxy type. Callers only ever see it through the
/// factory trait it implements.
pub struct FactoryProxy {
    proxy_type: Arc<ProxyType>,
    translator: InvocationTranslator,
    convention: FactoryConvention,
}

impl FactoryProxy {
    /// Body of every generated factory method: `method` indexes the
    /// interface's methods in declaration order.
    #[doc(hidden)]
    pub fn invoke<S>(&self, method: usize, values: Vec<ArgumentValue>) -> Result<Arc<S>, DiError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let interface = self.proxy_type.interface;
        let plan = self
            .proxy_type
            .methods
            .get(method)
            .ok_or_else(|| DiError::InvalidFactoryType {
                interface: interface.name(),
                reason: format!("no method at position {method}"),
            })?;
        if plan.parameters.len() != values.len() {
            return Err(DiError::InvalidFactoryType {
                interface: interface.name(),
                reason: format!(
                    "method `{}` takes {} arguments, got {}",
                    plan.name,
                    plan.parameters.len(),
                    values.len()
                ),
            });
        }

        let instance = self.translator
            .dispatch(plan.request(&self.convention, values))?;
        downcast_service::<S>(&instance)
    }
}

impl fmt::Debug for FactoryProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryProxy")
            .field("interface", &self.proxy_type.interface)
            .finish_non_exhaustive()
    }
}
