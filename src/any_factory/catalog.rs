use crate::any_factory::descriptor::{FactoryInterface, InterfaceDescriptor};
use crate::core::contracts::ServiceType;
use crate::core::di_inventory::InterfaceRegistration;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

static CATALOG: Lazy<DashMap<TypeId, Arc<InterfaceDescriptor>>> = Lazy::new(|| {
    let catalog = DashMap::new();
    for registration in inventory::iter::<InterfaceRegistration> {
        let descriptor = (registration.describe)();
        catalog
            .entry(descriptor.service().id())
            .or_insert_with(|| Arc::new(descriptor));
    }
    debug!(interfaces = catalog.len(), "interface catalog initialized");
    catalog
});

/// Looks up the description of `service`, if one was registered.
pub fn describe(service: ServiceType) -> Option<Arc<InterfaceDescriptor>> {
    CATALOG
        .get(&service.id())
        .map(|entry| entry.value().clone())
}

/// Adds a hand-written description. The first description registered for a
/// type wins and is returned.
pub fn register(descriptor: InterfaceDescriptor) -> Arc<InterfaceDescriptor> {
    CATALOG
        .entry(descriptor.service().id())
        .or_insert_with(|| {
            debug!(interface = %descriptor.service(), "interface registered");
            Arc::new(descriptor)
        })
        .value()
        .clone()
}

pub fn register_interface<T>() -> Arc<InterfaceDescriptor>
where
    T: ?Sized + FactoryInterface,
{
    register(T::describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any_factory::descriptor::{MethodDescriptor, TypeKind};

    trait Untracked {}
    trait HandWritten {}

    #[test]
    fn test_unknown_service_has_no_description() {
        assert!(describe(ServiceType::of::<dyn Untracked>()).is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let first = register(
            InterfaceDescriptor::interface::<dyn HandWritten>()
                .method(MethodDescriptor::new("Create").returns::<String>()),
        );
        let second = register(InterfaceDescriptor::new(
            ServiceType::of::<dyn HandWritten>(),
            TypeKind::Class,
        ));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.kind(), TypeKind::Interface);
        let found = describe(ServiceType::of::<dyn HandWritten>()).unwrap();
        assert!(Arc::ptr_eq(&first, &found));
    }
}
