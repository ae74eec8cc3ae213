//! Layout parameters and their builder.

use super::types::{CoreList, MAX_CORES};
use crate::error::{PinError, Result};
use std::collections::HashSet;
use std::fmt;

/// Validated input for one planning run.
///
/// Built once through [`LayoutParamsBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutParams {
    total_cores: u32,
    threads_per_core: u32,
    io_threads: u32,
    system_cores: CoreList,
    virtual_cores: u32,
}

impl LayoutParams {
    /// Create a new builder.
    pub fn builder() -> LayoutParamsBuilder {
        LayoutParamsBuilder::new()
    }

    /// Total physical cores on the host.
    pub fn total_cores(&self) -> u32 {
        self.total_cores
    }

    /// Hardware threads per core exposed in the guest topology.
    pub fn threads_per_core(&self) -> u32 {
        self.threads_per_core
    }

    /// Number of I/O threads.
    pub fn io_threads(&self) -> u32 {
        self.io_threads
    }

    /// Reserved system cores, in the order given by the caller.
    pub fn system_cores(&self) -> &CoreList {
        &self.system_cores
    }

    /// Requested guest vCPU count.
    pub fn virtual_cores(&self) -> u32 {
        self.virtual_cores
    }

    /// Cores not reserved for the system.
    pub fn available_cores(&self) -> u32 {
        self.total_cores - self.system_cores.len() as u32
    }

    /// Guest topology core count.
    pub fn topology_cores(&self) -> u32 {
        self.virtual_cores / self.threads_per_core
    }
}

impl fmt::Display for LayoutParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cores x{} threads, {} vCPUs, {} I/O threads, system [{}]",
            self.total_cores,
            self.threads_per_core,
            self.virtual_cores,
            self.io_threads,
            self.system_cores
        )
    }
}

/// Builder for layout parameters.
#[derive(Debug, Clone)]
pub struct LayoutParamsBuilder {
    total_cores: u32,
    threads_per_core: u32,
    io_threads: u32,
    system_cores: CoreList,
    virtual_cores: u32,
}

impl Default for LayoutParamsBuilder {
    fn default() -> Self {
        Self {
            total_cores: 0,
            threads_per_core: 1,
            io_threads: 0,
            system_cores: CoreList::default(),
            virtual_cores: 0,
        }
    }
}

impl LayoutParamsBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_cores(mut self, count: u32) -> Self {
        self.total_cores = count;
        self
    }

    pub fn threads_per_core(mut self, threads: u32) -> Self {
        self.threads_per_core = threads;
        self
    }

    pub fn io_threads(mut self, count: u32) -> Self {
        self.io_threads = count;
        self
    }

    pub fn system_cores(mut self, cores: impl Into<CoreList>) -> Self {
        self.system_cores = cores.into();
        self
    }

    /// Set system cores from a core list string such as `0,1` or `0-3,8`.
    pub fn system_cores_str(mut self, cores: &str) -> Result<Self> {
        self.system_cores = cores.parse()?;
        Ok(self)
    }

    pub fn virtual_cores(mut self, count: u32) -> Self {
        self.virtual_cores = count;
        self
    }

    /// Build the parameters, validating the configuration.
    ///
    /// Requesting more virtual cores than there are non-system cores is not
    /// rejected here; the planner reports the shortfall.
    pub fn build(self) -> Result<LayoutParams> {
        if self.total_cores == 0 {
            return Err(PinError::invalid(
                "total_cores",
                "Total core count must be at least 1",
            ));
        }

        if self.total_cores > MAX_CORES {
            return Err(PinError::invalid(
                "total_cores",
                format!(
                    "Total core count {} exceeds the limit of {}",
                    self.total_cores, MAX_CORES
                ),
            ));
        }

        if self.threads_per_core == 0 {
            return Err(PinError::invalid(
                "threads_per_core",
                "Threads per core must be at least 1",
            ));
        }

        if self.virtual_cores % self.threads_per_core != 0 {
            return Err(PinError::invalid(
                "virtual_cores",
                format!(
                    "Virtual core count {} is not divisible by {} threads per core",
                    self.virtual_cores, self.threads_per_core
                ),
            ));
        }

        if self.system_cores.is_empty() {
            return Err(PinError::invalid(
                "system_cores",
                "At least one system core is required for the emulator pin",
            ));
        }

        let mut seen = HashSet::new();
        for &core in self.system_cores.iter() {
            if core >= self.total_cores {
                return Err(PinError::invalid(
                    "system_cores",
                    format!(
                        "System core {} is out of range for {} total cores",
                        core, self.total_cores
                    ),
                ));
            }
            if !seen.insert(core) {
                return Err(PinError::invalid(
                    "system_cores",
                    format!("System core {} is listed more than once", core),
                ));
            }
        }

        Ok(LayoutParams {
            total_cores: self.total_cores,
            threads_per_core: self.threads_per_core,
            io_threads: self.io_threads,
            system_cores: self.system_cores,
            virtual_cores: self.virtual_cores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> LayoutParamsBuilder {
        LayoutParams::builder()
            .total_cores(8)
            .threads_per_core(2)
            .io_threads(1)
            .system_cores(vec![0, 1])
            .virtual_cores(4)
    }

    #[test]
    fn test_builder_basic() {
        let params = base().build().unwrap();
        assert_eq!(params.total_cores(), 8);
        assert_eq!(params.threads_per_core(), 2);
        assert_eq!(params.io_threads(), 1);
        assert_eq!(params.system_cores().as_slice(), &[0, 1]);
        assert_eq!(params.virtual_cores(), 4);
        assert_eq!(params.available_cores(), 6);
        assert_eq!(params.topology_cores(), 2);
    }

    #[test]
    fn test_builder_from_string() {
        let params = base().system_cores_str("0-1,7").unwrap().build().unwrap();
        assert_eq!(params.system_cores().as_slice(), &[0, 1, 7]);
    }

    #[test]
    fn test_builder_defaults() {
        let params = LayoutParams::builder()
            .total_cores(4)
            .system_cores(vec![0])
            .build()
            .unwrap();
        assert_eq!(params.threads_per_core(), 1);
        assert_eq!(params.io_threads(), 0);
        assert_eq!(params.virtual_cores(), 0);
    }

    #[test]
    fn test_validation_zero_total() {
        let result = base().total_cores(0).build();
        assert!(matches!(
            result,
            Err(PinError::InvalidParameter {
                field: "total_cores",
                ..
            })
        ));
    }

    #[test]
    fn test_validation_total_above_limit() {
        let result = base().total_cores(MAX_CORES + 1).build();
        assert!(matches!(
            result,
            Err(PinError::InvalidParameter {
                field: "total_cores",
                ..
            })
        ));
        assert!(base().total_cores(MAX_CORES).build().is_ok());
    }

    #[test]
    fn test_builder_huge_system_range() {
        assert!(base().system_cores_str("0-4294967295").is_err());
    }

    #[test]
    fn test_validation_zero_threads() {
        assert!(base().threads_per_core(0).build().is_err());
    }

    #[test]
    fn test_validation_not_divisible() {
        let result = base().virtual_cores(5).build();
        assert!(matches!(
            result,
            Err(PinError::InvalidParameter {
                field: "virtual_cores",
                ..
            })
        ));
    }

    #[test]
    fn test_validation_out_of_range_system_core() {
        let result = base().system_cores(vec![0, 8]).build();
        assert!(matches!(
            result,
            Err(PinError::InvalidParameter {
                field: "system_cores",
                ..
            })
        ));
    }

    #[test]
    fn test_validation_duplicate_system_core() {
        assert!(base().system_cores(vec![1, 1]).build().is_err());
    }

    #[test]
    fn test_validation_empty_system_cores() {
        assert!(base().system_cores(Vec::new()).build().is_err());
    }

    #[test]
    fn test_over_request_is_accepted() {
        let params = LayoutParams::builder()
            .total_cores(4)
            .system_cores(vec![0])
            .virtual_cores(6)
            .build()
            .unwrap();
        assert_eq!(params.available_cores(), 3);
    }

    #[test]
    fn test_display() {
        let display = base().build().unwrap().to_string();
        assert!(display.contains("8 cores"));
        assert!(display.contains("system [0,1]"));
    }
}
