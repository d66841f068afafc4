use crate::core::arguments::ConstructorArguments;
use crate::core::contracts::{Instance, ResolverGateway, ServiceType};
use crate::core::error_di::DiError;
use std::sync::Mutex;

/// A resolution request as seen by [`RecordingGateway`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub service: ServiceType,
    pub key: Option<String>,
    pub argument_names: Vec<String>,
    pub argument_types: Vec<&'static str>,
}

type Respond = Box<dyn Fn(&ConstructorArguments) -> Result<Instance, DiError> + Send + Sync>;

/// Gateway stand-in that records every request it receives.
pub struct RecordingGateway {
    calls: Mutex<Vec<RecordedCall>>,
    respond: Respond,
}

impl RecordingGateway {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&ConstructorArguments) -> Result<Instance, DiError> + Send + Sync + 'static,
    {
        RecordingGateway {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    pub fn returning<F>(make: F) -> Self
    where
        F: Fn() -> Instance + Send + Sync + 'static,
    {
        Self::new(move |_| Ok(make()))
    }

    pub fn failing() -> Self {
        Self::new(|_| {
            Err(DiError::BindingNotFound {
                service: "test",
                name: String::new(),
            })
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ResolverGateway for RecordingGateway {
    fn resolve(
        &self,
        service: ServiceType,
        key: Option<&str>,
        arguments: ConstructorArguments,
    ) -> Result<Instance, DiError> {
        let call = RecordedCall {
            service,
            key: key.map(str::to_string),
            argument_names: arguments.names().map(str::to_string).collect(),
            argument_types: arguments.iter().map(|arg| arg.value.type_name()).collect(),
        };
        self.calls
            .lock()
            .map_err(|_| DiError::LockPoisoned)?
            .push(call);
        (self.respond)(&arguments)
    }
}
