//! Core classification for a layout.

use super::params::LayoutParams;
use super::types::{CoreAssignment, CoreRole};
use crate::error::{PinError, Result};
use std::fmt;
use std::ops::Deref;

/// Role assignment for every physical core, ordered by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorePlan {
    assignments: Vec<CoreAssignment>,
    requested_virtual: u32,
}

impl CorePlan {
    /// Count of cores holding `role`.
    pub fn count(&self, role: CoreRole) -> usize {
        self.assignments.iter().filter(|a| a.role() == role).count()
    }

    /// Indices of guest cores, ascending.
    pub fn virtual_cores(&self) -> Vec<u32> {
        self.indices(CoreRole::Virtual)
    }

    /// Indices of system cores, ascending.
    pub fn system_cores(&self) -> Vec<u32> {
        self.indices(CoreRole::System)
    }

    /// Indices of idle cores, ascending.
    pub fn idle_cores(&self) -> Vec<u32> {
        self.indices(CoreRole::Idle)
    }

    fn indices(&self, role: CoreRole) -> Vec<u32> {
        self.assignments
            .iter()
            .filter(|a| a.role() == role)
            .map(|a| a.index())
            .collect()
    }

    /// Requested virtual cores that could not be placed.
    pub fn shortfall(&self) -> u32 {
        self.requested_virtual - self.count(CoreRole::Virtual) as u32
    }

    /// Fail if any requested virtual core was left unplaced.
    pub fn ensure_satisfied(&self) -> Result<()> {
        match self.shortfall() {
            0 => Ok(()),
            missing => Err(PinError::invalid(
                "virtual_cores",
                format!(
                    "Requested {} virtual cores but only {} non-system cores are available ({} short)",
                    self.requested_virtual,
                    self.requested_virtual - missing,
                    missing
                ),
            )),
        }
    }
}

impl Deref for CorePlan {
    type Target = [CoreAssignment];

    fn deref(&self) -> &Self::Target {
        &self.assignments
    }
}

impl fmt::Display for CorePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.assignments.iter().map(|a| a.to_string()).collect();
        write!(f, "[{}]", entries.join(", "))
    }
}

/// Assign a role to every core in `[0, total_cores)`.
///
/// Single ascending pass: listed system cores take `System` with the I/O
/// flag, the next free cores take `Virtual` until the requested count is
/// reached, everything else is `Idle`.
pub fn plan(params: &LayoutParams) -> CorePlan {
    let system = params.system_cores();
    let mut allocated = 0u32;

    let assignments: Vec<CoreAssignment> = (0..params.total_cores())
        .map(|index| {
            if system.contains(index) {
                CoreAssignment::system_io(index)
            } else if allocated < params.virtual_cores() {
                allocated += 1;
                CoreAssignment::virtual_core(index)
            } else {
                CoreAssignment::idle(index)
            }
        })
        .collect();

    let plan = CorePlan {
        assignments,
        requested_virtual: params.virtual_cores(),
    };

    tracing::debug!(
        system = ?plan.system_cores(),
        virtual_cores = ?plan.virtual_cores(),
        idle = ?plan.idle_cores(),
        "Planned core layout"
    );

    if plan.shortfall() > 0 {
        tracing::warn!(
            requested = params.virtual_cores(),
            allocated,
            available = params.available_cores(),
            "Not enough non-system cores for the requested vCPUs"
        );
    }

    plan
}
