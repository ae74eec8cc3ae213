//! Core layout planning.
//!
//! This module provides:
//! - Core roles and per-core assignments
//! - Validated layout parameters with a builder
//! - The planner that classifies every physical core
//! - JSON layout descriptions
//!
//! # Example
//!
//! ```
//! use cpupin::layout::{plan, CoreRole, LayoutParams};
//!
//! let params = LayoutParams::builder()
//!     .total_cores(8)
//!     .threads_per_core(2)
//!     .io_threads(1)
//!     .system_cores_str("0,1")?
//!     .virtual_cores(4)
//!     .build()?;
//!
//! let plan = plan(&params);
//! assert_eq!(plan.count(CoreRole::Virtual), 4);
//! # Ok::<(), cpupin::PinError>(())
//! ```

mod file;
mod params;
mod planner;
mod types;

pub use file::{LayoutFile, SystemCoresSpec};
pub use params::{LayoutParams, LayoutParamsBuilder};
pub use planner::{plan, CorePlan};
pub use types::{CoreAssignment, CoreList, CoreRole, MAX_CORES};
