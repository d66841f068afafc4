//! Runtime descriptions of factory interfaces.
//!
//! Rust has no reflection, so every trait that may be auto-implemented carries
//! an [`InterfaceDescriptor`]: its ordered methods with their convention names,
//! return service types and named parameters. `#[factory]` generates one;
//! hand-written descriptors work the same way.

use crate::any_factory::synthesizer::FactoryProxy;
use crate::core::contracts::{Instance, ServiceType};

/// Turns a proxy into the boxed trait object it implements.
pub type Activator = fn(FactoryProxy) -> Instance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Interface,
    Class,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Field,
    Event,
    Constant,
    AssociatedType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: &'static str,
    pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub ty: ServiceType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: &'static str,
    returns: Option<ServiceType>,
    parameters: Vec<ParameterDescriptor>,
}

impl MethodDescriptor {
    pub fn new(name: &'static str) -> Self {
        MethodDescriptor {
            name,
            returns: None,
            parameters: Vec::new(),
        }
    }

    pub fn returns<T>(mut self) -> Self
    where
        T: ?Sized + 'static,
    {
        self.returns = Some(ServiceType::of::<T>());
        self
    }

    pub fn param<T>(mut self, name: &'static str) -> Self
    where
        T: 'static,
    {
        self.parameters.push(ParameterDescriptor {
            name,
            ty: ServiceType::of::<T>(),
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `None` for a method returning nothing.
    pub fn return_type(&self) -> Option<ServiceType> {
        self.returns
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }
}

#[derive(Clone)]
pub struct InterfaceDescriptor {
    service: ServiceType,
    kind: TypeKind,
    methods: Vec<MethodDescriptor>,
    members: Vec<MemberDescriptor>,
    activator: Option<Activator>,
}

impl InterfaceDescriptor {
    pub fn new(service: ServiceType, kind: TypeKind) -> Self {
        InterfaceDescriptor {
            service,
            kind,
            methods: Vec::new(),
            members: Vec::new(),
            activator: None,
        }
    }

    pub fn interface<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self::new(ServiceType::of::<T>(), TypeKind::Interface)
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn member(mut self, name: &'static str, kind: MemberKind) -> Self {
        self.members.push(MemberDescriptor { name, kind });
        self
    }

    pub fn activator(mut self, activator: Activator) -> Self {
        self.activator = Some(activator);
        self
    }

    pub fn service(&self) -> ServiceType {
        self.service
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Everything declared that is not a method.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub(crate) fn activator_fn(&self) -> Option<Activator> {
        self.activator
    }
}

impl std::fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceDescriptor")
            .field("service", &self.service)
            .field("kind", &self.kind)
            .field("methods", &self.methods)
            .field("members", &self.members)
            .field("has_activator", &self.activator.is_some())
            .finish()
    }
}

/// Implemented by `#[factory]` for `dyn Trait`.
pub trait FactoryInterface: 'static {
    fn describe() -> InterfaceDescriptor;
}
