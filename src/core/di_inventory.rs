use crate::Kernel;
use crate::any_factory::descriptor::InterfaceDescriptor;
use crate::core::error_di::DiError;

/// Submitted by `#[registry(...)]`; applied by `Kernel::load_registered`.
#[derive(Debug)]
pub struct DiConstructor {
    pub register: fn(&Kernel) -> Result<(), DiError>,
}

inventory::collect!(DiConstructor);

/// Submitted by `#[factory]`; seeds the interface catalog.
#[derive(Debug)]
pub struct InterfaceRegistration {
    pub describe: fn() -> InterfaceDescriptor,
}

impl InterfaceRegistration {
    pub const fn new(describe: fn() -> InterfaceDescriptor) -> Self {
        InterfaceRegistration { describe }
    }
}

inventory::collect!(InterfaceRegistration);
