
use crate::Kernel;

/// A kernel holding every `#[registry(...)]` registration in the test binary.
pub(crate) fn initialize() -> Kernel {
    let kernel = Kernel::new();
    kernel
        .load_registered()
        .expect("registered services load without conflicts");
    kernel
}
