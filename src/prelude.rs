//! Re-imports for convenience
#[doc(no_inline)]
pub use crate::dist::*;
#[doc(no_inline)]
pub use crate::kernel::{Kernel, KernelError, Matern52Kernel, RBFKernel};
#[doc(no_inline)]
pub use crate::process::*;
#[doc(no_inline)]
pub use crate::traits::*;
