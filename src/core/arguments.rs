use crate::core::error_di::DiError;
use std::any::Any;
use std::fmt;

/// A single type-erased argument value.
pub struct ArgumentValue {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ArgumentValue {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        ArgumentValue {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|value| ArgumentValue { value, type_name })
    }
}

impl fmt::Debug for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgumentValue({})", self.type_name)
    }
}

#[derive(Debug)]
pub struct ConstructorArgument {
    pub name: String,
    pub value: ArgumentValue,
}

/// Named constructor arguments in declaration order.
#[derive(Debug, Default)]
pub struct ConstructorArguments {
    entries: Vec<ConstructorArgument>,
}

impl ConstructorArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ConstructorArguments {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.push(name, ArgumentValue::new(value));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: ArgumentValue) {
        self.entries.push(ConstructorArgument {
            name: name.into(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstructorArgument> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get<T: Any>(&self, name: &str) -> Result<Option<&T>, DiError> {
        let Some(index) = self.position(name) else {
            return Ok(None);
        };
        let value = &self.entries[index].value;
        value
            .downcast_ref::<T>()
            .map(Some)
            .ok_or_else(|| mismatch::<T>(name, value))
    }

    /// Removes and returns the argument called `name`. A value of another type
    /// stays in place and is reported as a mismatch.
    pub fn take<T: Any>(&mut self, name: &str) -> Result<Option<T>, DiError> {
        let Some(index) = self.position(name) else {
            return Ok(None);
        };
        if !self.entries[index].value.is::<T>() {
            return Err(mismatch::<T>(name, &self.entries[index].value));
        }
        let entry = self.entries.remove(index);
        entry
            .value
            .downcast::<T>()
            .map(Some)
            .map_err(|value| mismatch::<T>(name, &value))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }
}

impl IntoIterator for ConstructorArguments {
    type Item = ConstructorArgument;
    type IntoIter = std::vec::IntoIter<ConstructorArgument>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn mismatch<T: Any>(name: &str, value: &ArgumentValue) -> DiError {
    DiError::ArgumentTypeMismatch {
        argument: name.to_string(),
        expected: std::any::type_name::<T>(),
        actual: value.type_name(),
    }
}
