use crate::core::activation::Activation;
use crate::core::error_di::DiError;

/// Custom construction for types registered with `#[registry(..(factory))]`.
pub trait DiFactory: Send + Sync + 'static {
    fn create(activation: &mut Activation<'_>) -> Result<Self, DiError>
    where
        Self: Sized;
}
