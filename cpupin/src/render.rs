//! Libvirt domain fragment rendering.
//!
//! Produces the `vcpu`, `cpu`, `iothreads` and `cputune` elements for a plan,
//! wrapped in a `domain` container:
//!
//! ```text
//! <domain>
//!   <vcpu placement='static'>4</vcpu>
//!   <cpu mode='host-passthrough' check='none' migratable='on'>
//!     <topology sockets='1' dies='1' clusters='1' cores='2' threads='2'/>
//!   </cpu>
//!   <iothreads>1</iothreads>
//!   <cputune>
//!     <vcpupin vcpu='0' cpuset='2'/>
//!     ...
//!     <emulatorpin cpuset='0,1'/>
//!     <iothreadpin iothread='1' cpuset='0,1'/>
//!   </cputune>
//! </domain>
//! ```

use crate::layout::{CorePlan, LayoutParams};
use std::fmt;

const INDENT: &str = "  ";

/// Rendered configuration fragment, one element per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    lines: Vec<String>,
}

impl Fragment {
    /// All lines, including the outer container.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines inside the outer container, de-indented one level.
    pub fn body(&self) -> Vec<&str> {
        let inner: &[String] = match self.lines.len() {
            0..=2 => &[],
            n => &self.lines[1..n - 1],
        };

        inner
            .iter()
            .map(|line| line.strip_prefix(INDENT).unwrap_or(line.as_str()))
            .collect()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

struct Writer {
    lines: Vec<String>,
    depth: usize,
}

impl Writer {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: String) {
        self.lines.push(format!("{}{}", INDENT.repeat(self.depth), text));
    }

    fn open(&mut self, text: String) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: String) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }
}

/// Render the domain fragment for `plan`.
///
/// vCPU numbers count emitted pins from 0 in ascending core order and are
/// independent of the physical index. The emulator and every I/O thread
/// share the system core set in the caller's order.
pub fn render(params: &LayoutParams, plan: &CorePlan) -> Fragment {
    let cpuset = params.system_cores().to_cpuset();
    let mut w = Writer::new();

    w.open("<domain>".to_string());
    w.line(format!(
        "<vcpu placement='static'>{}</vcpu>",
        params.virtual_cores()
    ));
    w.open("<cpu mode='host-passthrough' check='none' migratable='on'>".to_string());
    w.line(format!(
        "<topology sockets='1' dies='1' clusters='1' cores='{}' threads='{}'/>",
        params.topology_cores(),
        params.threads_per_core()
    ));
    w.close("</cpu>".to_string());
    w.line(format!("<iothreads>{}</iothreads>", params.io_threads()));

    w.open("<cputune>".to_string());
    for (vcpu, core) in plan.iter().filter(|a| a.is_virtual()).enumerate() {
        w.line(format!(
            "<vcpupin vcpu='{}' cpuset='{}'/>",
            vcpu,
            core.index()
        ));
    }
    w.line(format!("<emulatorpin cpuset='{}'/>", cpuset));
    for iothread in 1..=params.io_threads() {
        w.line(format!(
            "<iothreadpin iothread='{}' cpuset='{}'/>",
            iothread, cpuset
        ));
    }
    w.close("</cputune>".to_string());
    w.close("</domain>".to_string());

    tracing::debug!(lines = w.lines.len(), "Rendered domain fragment");

    Fragment { lines: w.lines }
}
