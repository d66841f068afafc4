mod eligibility;

use crate::Kernel;
use crate::any_factory::AnyFactoryModule;

pub(crate) fn kernel_with_factories() -> Kernel {
    let kernel = Kernel::new();
    kernel
        .load(AnyFactoryModule::default())
        .expect("factory module loads");
    kernel
}
