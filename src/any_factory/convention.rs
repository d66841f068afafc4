use crate::any_factory::descriptor::{InterfaceDescriptor, MemberKind, TypeKind};
use std::borrow::Cow;
use thiserror::Error;

/// Naming convention an interface must follow to be auto-implemented.
///
/// Defaults: prefix `"Create"`, case-sensitive, interfaces without methods
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConvention {
    prefix: Cow<'static, str>,
    case_sensitive: bool,
    allow_empty_interfaces: bool,
}

/// Why an interface does not qualify. Declining is not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ineligible {
    #[error("{0:?} is not an interface")]
    NotAnInterface(TypeKind),
    #[error("declares non-method member `{name}` ({kind:?})")]
    NonMethodMember { name: &'static str, kind: MemberKind },
    #[error("method `{0}` does not start with the factory prefix")]
    MissingPrefix(&'static str),
    #[error("method `{0}` returns nothing")]
    VoidMethod(&'static str),
    #[error("declares no methods")]
    Empty,
}

impl Default for FactoryConvention {
    fn default() -> Self {
        FactoryConvention {
            prefix: Cow::Borrowed("Create"),
            case_sensitive: true,
            allow_empty_interfaces: true,
        }
    }
}

impl FactoryConvention {
    pub fn with_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn allow_empty_interfaces(mut self, allow: bool) -> Self {
        self.allow_empty_interfaces = allow;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn qualifies(&self, descriptor: &InterfaceDescriptor) -> bool {
        self.check(descriptor).is_ok()
    }

    pub fn check(&self, descriptor: &InterfaceDescriptor) -> Result<(), Ineligible> {
        if descriptor.kind() != TypeKind::Interface {
            return Err(Ineligible::NotAnInterface(descriptor.kind()));
        }
        if let Some(member) = descriptor.members().first() {
            return Err(Ineligible::NonMethodMember {
                name: member.name,
                kind: member.kind,
            });
        }
        if descriptor.methods().is_empty() && !self.allow_empty_interfaces {
            return Err(Ineligible::Empty);
        }
        for method in descriptor.methods() {
            if self.strip_prefix(method.name()).is_none() {
                return Err(Ineligible::MissingPrefix(method.name()));
            }
            if method.return_type().is_none() {
                return Err(Ineligible::VoidMethod(method.name()));
            }
        }
        Ok(())
    }

    /// Binding key for a method: what follows the prefix, or `None` when
    /// nothing does (or the prefix is absent).
    pub fn key_for<'a>(&self, method_name: &'a str) -> Option<&'a str> {
        self.strip_prefix(method_name)
            .filter(|remainder| !remainder.is_empty())
    }

    fn strip_prefix<'a>(&self, name: &'a str) -> Option<&'a str> {
        if self.case_sensitive {
            return name.strip_prefix(&*self.prefix);
        }
        let head = name.get(..self.prefix.len())?;
        head.eq_ignore_ascii_case(&self.prefix)
            .then(|| &name[self.prefix.len()..])
    }
}

/// Key derivation under the default convention.
pub fn derive_key(method_name: &str) -> Option<&str> {
    FactoryConvention::default().key_for(method_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any_factory::descriptor::MethodDescriptor;

    trait CustomFormatter {}
    trait MyService {}
    trait SomeFactory {}
    struct ConcreteFactory;

    fn some_factory() -> InterfaceDescriptor {
        InterfaceDescriptor::interface::<dyn SomeFactory>()
            .method(MethodDescriptor::new("Create").returns::<dyn CustomFormatter>())
            .method(MethodDescriptor::new("CreateOne").returns::<dyn CustomFormatter>())
            .method(MethodDescriptor::new("CreateAnother").returns::<dyn CustomFormatter>())
            .method(
                MethodDescriptor::new("Create")
                    .returns::<dyn MyService>()
                    .param::<String>("s"),
            )
            .method(
                MethodDescriptor::new("Create")
                    .returns::<dyn MyService>()
                    .param::<String>("s")
                    .param::<f64>("d"),
            )
    }

    #[test]
    fn test_proper_candidate_qualifies() {
        assert!(FactoryConvention::default().qualifies(&some_factory()));
    }

    #[test]
    fn test_method_without_prefix_is_rejected() {
        let descriptor = some_factory()
            .method(MethodDescriptor::new("Foo").returns::<dyn CustomFormatter>());
        let convention = FactoryConvention::default();

        assert!(!convention.qualifies(&descriptor));
        assert_eq!(
            convention.check(&descriptor),
            Err(Ineligible::MissingPrefix("Foo"))
        );
    }

    #[test]
    fn test_property_is_rejected() {
        let descriptor = some_factory().member("Name", MemberKind::Property);
        assert!(!FactoryConvention::default().qualifies(&descriptor));
    }

    #[test]
    fn test_void_method_is_rejected() {
        let descriptor = InterfaceDescriptor::interface::<dyn SomeFactory>()
            .method(MethodDescriptor::new("Create"))
            .method(MethodDescriptor::new("CreateAnother").returns::<dyn CustomFormatter>());
        assert_eq!(
            FactoryConvention::default().check(&descriptor),
            Err(Ineligible::VoidMethod("Create"))
        );
    }

    #[test]
    fn test_non_interface_is_rejected() {
        let descriptor = InterfaceDescriptor::new(
            crate::ServiceType::of::<ConcreteFactory>(),
            TypeKind::Class,
        )
        .method(MethodDescriptor::new("Create").returns::<dyn CustomFormatter>());
        assert_eq!(
            FactoryConvention::default().check(&descriptor),
            Err(Ineligible::NotAnInterface(TypeKind::Class))
        );
    }

    #[test]
    fn test_prefix_is_a_prefix_not_a_substring() {
        let descriptor = InterfaceDescriptor::interface::<dyn SomeFactory>()
            .method(MethodDescriptor::new("ReCreate").returns::<dyn CustomFormatter>());
        assert!(!FactoryConvention::default().qualifies(&descriptor));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive_by_default() {
        let descriptor = InterfaceDescriptor::interface::<dyn SomeFactory>()
            .method(MethodDescriptor::new("createOne").returns::<dyn CustomFormatter>());

        assert!(!FactoryConvention::default().qualifies(&descriptor));
        let relaxed = FactoryConvention::default().case_insensitive();
        assert!(relaxed.qualifies(&descriptor));
        assert_eq!(relaxed.key_for("createOne"), Some("One"));
    }

    #[test]
    fn test_empty_interface_policy_is_configurable() {
        let empty = InterfaceDescriptor::interface::<dyn SomeFactory>();

        assert!(FactoryConvention::default().qualifies(&empty));
        assert_eq!(
            FactoryConvention::default()
                .allow_empty_interfaces(false)
                .check(&empty),
            Err(Ineligible::Empty)
        );
    }

    #[test]
    fn test_key_derivation() {
        assert_eq!(derive_key("Create"), None);
        assert_eq!(derive_key("CreateOne"), Some("One"));
        assert_eq!(derive_key("CreateAnother"), Some("Another"));
        assert_eq!(derive_key("CreateaLowerCase"), Some("aLowerCase"));
        assert_eq!(derive_key("Build"), None);
        assert_eq!(derive_key("createOne"), None);
    }

    #[test]
    fn test_custom_prefix() {
        let convention = FactoryConvention::default().with_prefix("Make");
        let descriptor = InterfaceDescriptor::interface::<dyn SomeFactory>()
            .method(MethodDescriptor::new("MakeFast").returns::<dyn CustomFormatter>());

        assert!(convention.qualifies(&descriptor));
        assert!(!convention.qualifies(&some_factory()));
        assert_eq!(convention.key_for("MakeFast"), Some("Fast"));
    }
}
