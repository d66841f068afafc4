use super::kernel_with_factories;
use crate::Kernel;
use crate::any_factory::convention::{FactoryConvention, Ineligible};
use crate::any_factory::descriptor::{
    FactoryInterface, InterfaceDescriptor, MemberKind, MethodDescriptor,
};
use crate::any_factory::synthesizer::ProxyTypeSynthesizer;
use crate::any_factory::{AnyFactoryModule, catalog};
use crate::core::contracts::ServiceType;
use crate::core::error_di::DiError;
use std::sync::Arc;

pub trait Gadget: Send + Sync {
    fn id(&self) -> u32;
}

struct Sprocket(u32);

impl Gadget for Sprocket {
    fn id(&self) -> u32 {
        self.0
    }
}

#[rust_di_factory::factory]
pub trait NotifyingFactory {
    fn create(&self) -> Result<Arc<dyn Gadget>, DiError>;

    fn create_and_forget(&self);
}

#[rust_di_factory::factory]
pub trait MixedFactory {
    fn create(&self) -> Result<Arc<dyn Gadget>, DiError>;

    fn foo(&self) -> Result<Arc<dyn Gadget>, DiError>;
}

#[rust_di_factory::factory]
pub trait EmptyFactory {}

#[rust_di_factory::factory]
pub trait GadgetMaker {
    fn make_gadget(&self, id: u32) -> Result<Arc<dyn Gadget>, DiError>;
}

fn bind_gadgets(kernel: &Kernel) {
    kernel
        .bind_transient::<dyn Gadget, _>(|_| {
            let gadget: Arc<dyn Gadget> = Arc::new(Sprocket(0));
            Ok(gadget)
        })
        .unwrap();
    kernel
        .bind_transient_name::<dyn Gadget, _>("Gadget", |activation| {
            let gadget: Arc<dyn Gadget> = Arc::new(Sprocket(activation.argument("id")?));
            Ok(gadget)
        })
        .unwrap();
}

#[test]
fn test_generated_descriptors_follow_method_declarations() {
    let descriptor = catalog::describe(ServiceType::of::<dyn NotifyingFactory>()).unwrap();
    let names: Vec<_> = descriptor.methods().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["Create", "CreateAndForget"]);
    assert_eq!(
        descriptor.methods()[0].return_type(),
        Some(ServiceType::of::<dyn Gadget>())
    );
    assert_eq!(descriptor.methods()[1].return_type(), None);

    let maker = catalog::describe(ServiceType::of::<dyn GadgetMaker>()).unwrap();
    let parameter = &maker.methods()[0].parameters()[0];
    assert_eq!(parameter.name, "id");
    assert_eq!(parameter.ty, ServiceType::of::<u32>());
}

#[test]
fn test_void_method_disqualifies_interface() {
    let descriptor = catalog::describe(ServiceType::of::<dyn NotifyingFactory>()).unwrap();
    let convention = FactoryConvention::default();
    assert!(!convention.qualifies(&descriptor));
    assert_eq!(
        convention.check(&descriptor),
        Err(Ineligible::VoidMethod("CreateAndForget"))
    );
}

#[test]
fn test_method_without_prefix_disqualifies_interface() {
    let descriptor = catalog::describe(ServiceType::of::<dyn MixedFactory>()).unwrap();
    assert_eq!(
        FactoryConvention::default().check(&descriptor),
        Err(Ineligible::MissingPrefix("Foo"))
    );
}

#[test]
fn test_hook_declines_ineligible_interfaces() {
    let kernel = kernel_with_factories();
    bind_gadgets(&kernel);

    assert!(matches!(
        kernel.get::<dyn MixedFactory>(),
        Err(DiError::BindingNotFound { .. })
    ));
    assert!(!kernel.has_binding(ServiceType::of::<dyn MixedFactory>(), None));

    let result = ProxyTypeSynthesizer::default().get_or_build(ServiceType::of::<dyn MixedFactory>());
    assert!(matches!(result, Err(DiError::InvalidFactoryType { .. })));
}

#[test]
fn test_hook_ignores_plain_types() {
    let kernel = kernel_with_factories();
    assert!(matches!(
        kernel.get::<String>(),
        Err(DiError::BindingNotFound { .. })
    ));
}

#[test]
fn test_empty_interface_policy() {
    let kernel = kernel_with_factories();
    assert!(kernel.get::<dyn EmptyFactory>().is_ok());

    let strict = Kernel::new();
    strict
        .load(AnyFactoryModule::new(
            FactoryConvention::default().allow_empty_interfaces(false),
        ))
        .unwrap();
    assert!(matches!(
        strict.get::<dyn EmptyFactory>(),
        Err(DiError::BindingNotFound { .. })
    ));
}

#[test]
fn test_custom_prefix_derives_keys() {
    let kernel = Kernel::new();
    kernel
        .load(AnyFactoryModule::new(
            FactoryConvention::default().with_prefix("Make"),
        ))
        .unwrap();
    bind_gadgets(&kernel);

    let maker = kernel.get::<dyn GadgetMaker>().unwrap();
    assert_eq!(maker.make_gadget(7).unwrap().id(), 7);

    // Under the default convention `MakeGadget` does not qualify.
    let default = kernel_with_factories();
    bind_gadgets(&default);
    assert!(default.get::<dyn GadgetMaker>().is_err());
}

#[test]
fn test_explicit_binding_wins_over_synthesis() {
    struct Handwritten;

    impl MixedFactory for Handwritten {
        fn create(&self) -> Result<Arc<dyn Gadget>, DiError> {
            Ok(Arc::new(Sprocket(1)))
        }

        fn foo(&self) -> Result<Arc<dyn Gadget>, DiError> {
            Ok(Arc::new(Sprocket(2)))
        }
    }

    let kernel = kernel_with_factories();
    let handwritten: Arc<dyn MixedFactory> = Arc::new(Handwritten);
    kernel.bind_constant(handwritten).unwrap();

    let factory = kernel.get::<dyn MixedFactory>().unwrap();
    assert_eq!(factory.foo().unwrap().id(), 2);
}

pub trait LimitedFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn Gadget>, DiError>;
}

// Describes an interface that also publishes a constant alongside its method.
impl FactoryInterface for dyn LimitedFactory {
    fn describe() -> InterfaceDescriptor {
        InterfaceDescriptor::interface::<dyn LimitedFactory>()
            .method(MethodDescriptor::new("Create").returns::<dyn Gadget>())
            .member("MaxGadgets", MemberKind::Constant)
    }
}

#[test]
fn test_hand_written_description_with_constant_is_declined() {
    let descriptor = catalog::register_interface::<dyn LimitedFactory>();
    assert_eq!(descriptor.service(), ServiceType::of::<dyn LimitedFactory>());
    assert!(Arc::ptr_eq(
        &descriptor,
        &catalog::describe(ServiceType::of::<dyn LimitedFactory>()).unwrap()
    ));
    assert_eq!(
        FactoryConvention::default().check(&descriptor),
        Err(Ineligible::NonMethodMember {
            name: "MaxGadgets",
            kind: MemberKind::Constant,
        })
    );

    let kernel = kernel_with_factories();
    bind_gadgets(&kernel);
    assert!(matches!(
        kernel.get::<dyn LimitedFactory>(),
        Err(DiError::BindingNotFound { .. })
    ));
}

#[rust_di_factory::factory]
pub trait PartFactory {
    fn create_with_bolt(&self) -> Result<Arc<dyn Gadget>, DiError>;
}

fn bind_part(kernel: &Kernel, name: &str, id: u32) {
    kernel
        .bind_transient_name::<dyn Gadget, _>(name, move |_| {
            let gadget: Arc<dyn Gadget> = Arc::new(Sprocket(id));
            Ok(gadget)
        })
        .unwrap();
}

#[test]
fn test_each_kernel_derives_keys_with_its_own_convention() {
    let narrow = Kernel::new();
    narrow
        .load(AnyFactoryModule::new(
            FactoryConvention::default().with_prefix("CreateWith"),
        ))
        .unwrap();
    bind_part(&narrow, "Bolt", 1);
    bind_part(&narrow, "WithBolt", 2);

    let default = kernel_with_factories();
    bind_part(&default, "Bolt", 3);
    bind_part(&default, "WithBolt", 4);

    let narrow_parts = narrow.get::<dyn PartFactory>().unwrap();
    assert_eq!(narrow_parts.create_with_bolt().unwrap().id(), 1);

    let default_parts = default.get::<dyn PartFactory>().unwrap();
    assert_eq!(default_parts.create_with_bolt().unwrap().id(), 4);
    assert_eq!(narrow_parts.create_with_bolt().unwrap().id(), 1);
}
