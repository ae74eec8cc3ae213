//! Core roles, per-core assignments and core lists.

use crate::error::{PinError, Result};
use std::fmt;
use std::str::FromStr;

/// Upper bound on core counts and indices, matching the largest `NR_CPUS`
/// a Linux kernel is built with.
pub const MAX_CORES: u32 = 8192;

/// Primary role of a physical core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreRole {
    /// Reserved for the host and hypervisor housekeeping.
    System,
    /// Dedicated to one guest vCPU.
    Virtual,
    /// Left unused by this domain.
    Idle,
}

impl fmt::Display for CoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreRole::System => write!(f, "system"),
            CoreRole::Virtual => write!(f, "virtual"),
            CoreRole::Idle => write!(f, "idle"),
        }
    }
}

/// Role of a single physical core.
///
/// The I/O flag can only be carried by a system core: I/O threads share the
/// cores reserved for the hypervisor and never land on guest or idle cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreAssignment {
    index: u32,
    role: CoreRole,
    io: bool,
}

impl CoreAssignment {
    /// System core that also hosts I/O threads.
    pub fn system_io(index: u32) -> Self {
        Self {
            index,
            role: CoreRole::System,
            io: true,
        }
    }

    pub fn virtual_core(index: u32) -> Self {
        Self {
            index,
            role: CoreRole::Virtual,
            io: false,
        }
    }

    pub fn idle(index: u32) -> Self {
        Self {
            index,
            role: CoreRole::Idle,
            io: false,
        }
    }

    /// Physical core index (0-based).
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn role(&self) -> CoreRole {
        self.role
    }

    /// Whether I/O threads are pinned to this core.
    pub fn has_io(&self) -> bool {
        self.io
    }

    pub fn is_system(&self) -> bool {
        self.role == CoreRole::System
    }

    pub fn is_virtual(&self) -> bool {
        self.role == CoreRole::Virtual
    }
}

impl fmt::Display for CoreAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.io {
            write!(f, "c:{}-{}+io", self.index, self.role)
        } else {
            write!(f, "c:{}-{}", self.index, self.role)
        }
    }
}

/// Ordered list of physical core indices.
///
/// Parses from a comma-separated string where each entry is a single index
/// (`5`) or an inclusive range (`0-3`). Input order is preserved; a range
/// expands in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CoreList(Vec<u32>);

impl CoreList {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.0.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.0.iter()
    }

    /// Libvirt cpuset string, comma-joined in list order.
    pub fn to_cpuset(&self) -> String {
        self.0
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn parse_index(entry: &str, input: &str) -> Result<u32> {
    let index = entry.trim().parse::<u32>().map_err(|e| {
        PinError::malformed(
            "core list",
            format!("'{}' in '{}' is not a core index: {}", entry.trim(), input, e),
        )
    })?;
    if index >= MAX_CORES {
        return Err(PinError::malformed(
            "core list",
            format!(
                "core {} in '{}' exceeds the limit of {} cores",
                index, input, MAX_CORES
            ),
        ));
    }
    Ok(index)
}

impl FromStr for CoreList {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cores = Vec::new();

        for entry in s.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(PinError::malformed(
                    "core list",
                    format!("empty entry in '{}'", s),
                ));
            }

            match entry.split_once('-') {
                Some((start, end)) => {
                    let start = parse_index(start, s)?;
                    let end = parse_index(end, s)?;
                    if start > end {
                        return Err(PinError::malformed(
                            "core list",
                            format!("range {}-{} is descending", start, end),
                        ));
                    }
                    cores.extend(start..=end);
                }
                None => cores.push(parse_index(entry, s)?),
            }
        }

        Ok(Self(cores))
    }
}

impl From<Vec<u32>> for CoreList {
    fn from(cores: Vec<u32>) -> Self {
        Self(cores)
    }
}

impl fmt::Display for CoreList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cpuset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_role_display() {
        assert_eq!(CoreRole::System.to_string(), "system");
        assert_eq!(CoreRole::Virtual.to_string(), "virtual");
        assert_eq!(CoreRole::Idle.to_string(), "idle");
    }

    #[test]
    fn test_io_only_on_system() {
        assert!(CoreAssignment::system_io(0).has_io());
        assert!(!CoreAssignment::virtual_core(3).has_io());
        assert!(!CoreAssignment::idle(7).has_io());
    }

    #[test]
    fn test_assignment_display() {
        assert_eq!(CoreAssignment::system_io(1).to_string(), "c:1-system+io");
        assert_eq!(CoreAssignment::virtual_core(4).to_string(), "c:4-virtual");
    }

    #[test]
    fn test_core_list_plain() {
        let list: CoreList = "0,1".parse().unwrap();
        assert_eq!(list.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_core_list_preserves_order() {
        let list: CoreList = "9, 8,0".parse().unwrap();
        assert_eq!(list.as_slice(), &[9, 8, 0]);
        assert_eq!(list.to_cpuset(), "9,8,0");
    }

    #[test]
    fn test_core_list_ranges() {
        let list: CoreList = "0-3,8,12-13".parse().unwrap();
        assert_eq!(list.as_slice(), &[0, 1, 2, 3, 8, 12, 13]);
    }

    #[test]
    fn test_core_list_rejects_garbage() {
        assert!("".parse::<CoreList>().is_err());
        assert!("0,,1".parse::<CoreList>().is_err());
        assert!("a,b".parse::<CoreList>().is_err());
        assert!("-1".parse::<CoreList>().is_err());
        assert!("5-2".parse::<CoreList>().is_err());
    }

    #[test]
    fn test_core_list_rejects_huge_range() {
        let err = "0-4294967295".parse::<CoreList>().unwrap_err();
        assert!(matches!(err, PinError::MalformedInput { .. }));
        assert!("0-300000000".parse::<CoreList>().is_err());
        assert!("8192".parse::<CoreList>().is_err());

        let list: CoreList = "8190-8191".parse().unwrap();
        assert_eq!(list.as_slice(), &[8190, 8191]);
    }
}
