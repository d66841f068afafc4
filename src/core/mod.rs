pub mod activation;
pub mod arguments;
pub mod contracts;
pub mod di_inventory;
pub mod error_di;
pub mod factory;
pub mod registry;

#[cfg(test)]
pub(crate) mod tests;
