//! # cpupin
//!
//! Static CPU pinning plans for libvirt domains.
//!
//! Every physical core of the host gets exactly one role: reserved for the
//! system (and the hypervisor's I/O threads and emulator), dedicated to a guest
//! vCPU, or idle. The plan is rendered as the `vcpu`, `cpu`, `iothreads` and
//! `cputune` elements of a domain document and can be patched into an existing
//! domain file.
//!
//! ## Example
//!
//! ```
//! use cpupin::{plan, render, LayoutParams};
//!
//! fn main() -> cpupin::Result<()> {
//!     let params = LayoutParams::builder()
//!         .total_cores(8)
//!         .threads_per_core(2)
//!         .io_threads(1)
//!         .system_cores_str("0,1")?
//!         .virtual_cores(4)
//!         .build()?;
//!
//!     let plan = plan(&params);
//!     let fragment = render(&params, &plan);
//!     assert!(fragment.to_string().contains("<emulatorpin cpuset='0,1'/>"));
//!
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod error;
pub mod layout;
pub mod render;
pub mod store;

pub use domain::{apply, patch_domain, ApplyOptions, DomainConfig, DomainRef};
pub use error::{PinError, Result};
pub use layout::{
    plan, CoreAssignment, CoreList, CorePlan, CoreRole, LayoutFile, LayoutParams,
    LayoutParamsBuilder,
};
pub use render::{render, Fragment};
pub use store::Store;
