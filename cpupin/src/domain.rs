//! Domain identifiers, domain settings and in-place patching of libvirt
//! domain documents.

use crate::error::{PinError, Result};
use crate::layout::{plan, LayoutParams};
use crate::render::{render, Fragment};
use crate::store::Store;
use regex::{Captures, Regex};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Elements replaced by the rendered fragment.
const REPLACED_ELEMENTS: [&str; 4] = ["vcpu", "cpu", "iothreads", "cputune"];

static DOMAIN_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9._-]+)@([A-Za-z0-9._-]+)$").expect("domain ref pattern")
});

static MEMORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<memory\b([^>]*)>[^<]*</memory>").expect("memory pattern")
});

static CURRENT_MEMORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<currentMemory\b([^>]*)>[^<]*</currentMemory>").expect("currentMemory pattern")
});

static UNIT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+unit\s*=\s*(?:'[^']*'|"[^"]*")"#).expect("unit pattern")
});

static REMOVALS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REPLACED_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(
                r"(?s)[ \t]*<{name}\b[^>]*?(?:/>|>.*?</{name}>)[ \t]*(?:\r?\n)?"
            ))
            .expect("element pattern")
        })
        .collect()
});

static ANCHORS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    ["currentMemory", "memory"].map(|name| {
        Regex::new(&format!(
            r"(?m)(^[ \t]*)?<{name}\b[^>]*(?:/>|>[^<]*</{name}>)"
        ))
        .expect("anchor pattern")
    })
});

/// `domain@host` identifier of a libvirt domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainRef {
    pub domain: String,
    pub host: String,
}

impl DomainRef {
    pub fn new(domain: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            host: host.into(),
        }
    }
}

impl FromStr for DomainRef {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = DOMAIN_REF.captures(s.trim()).ok_or_else(|| {
            PinError::malformed(
                "domain identifier",
                format!("'{}' is not of the form domain@hostname", s),
            )
        })?;

        for part in [&caps[1], &caps[2]] {
            if part == "." || part == ".." {
                return Err(PinError::malformed(
                    "domain identifier",
                    format!("'{}' is not a valid domain or host name", part),
                ));
            }
        }
        Ok(Self::new(&caps[1], &caps[2]))
    }
}

impl fmt::Display for DomainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.domain, self.host)
    }
}

/// Memory size plus CPU layout for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainConfig {
    memory_gib: u64,
    layout: LayoutParams,
}

impl DomainConfig {
    pub fn new(memory_gib: u64, layout: LayoutParams) -> Result<Self> {
        if memory_gib == 0 {
            return Err(PinError::invalid("memory", "Memory must be at least 1 GiB"));
        }
        memory_gib.checked_mul(1024 * 1024).ok_or_else(|| {
            PinError::invalid("memory", format!("{} GiB overflows KiB", memory_gib))
        })?;
        Ok(Self { memory_gib, layout })
    }

    pub fn memory_gib(&self) -> u64 {
        self.memory_gib
    }

    /// Memory in KiB, the unit libvirt uses by default.
    pub fn memory_kib(&self) -> u64 {
        self.memory_gib * 1024 * 1024
    }

    pub fn layout(&self) -> &LayoutParams {
        &self.layout
    }
}

/// Options for [`apply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Return the patched document without writing it.
    pub dry_run: bool,
    /// Fail when fewer virtual cores were placed than requested.
    pub strict: bool,
}

/// Replace the first `name` element with `kib` in KiB, keeping its other
/// attributes.
fn set_memory(re: &Regex, name: &str, xml: &str, kib: u64) -> String {
    re.replacen(xml, 1, |caps: &Captures| {
        let attrs = UNIT_ATTR.replace_all(&caps[1], "");
        format!("<{name} unit='KiB'{attrs}>{kib}</{name}>")
    })
    .into_owned()
}

/// Rewrite a domain document with new memory and CPU settings.
///
/// Sets `memory` and `currentMemory` to the configured size, drops the
/// existing `vcpu`, `cpu`, `iothreads` and `cputune` elements and inserts
/// the fragment body after the memory elements.
pub fn patch_domain(xml: &str, config: &DomainConfig, fragment: &Fragment) -> Result<String> {
    if !MEMORY.is_match(xml) {
        return Err(PinError::malformed(
            "domain document",
            "no <memory> element found",
        ));
    }

    let kib = config.memory_kib();
    let mut doc = set_memory(&MEMORY, "memory", xml, kib);
    if CURRENT_MEMORY.is_match(&doc) {
        doc = set_memory(&CURRENT_MEMORY, "currentMemory", &doc, kib);
    }

    for (name, re) in REPLACED_ELEMENTS.iter().zip(REMOVALS.iter()) {
        if re.is_match(&doc) {
            tracing::debug!(element = name, "Removing existing element");
            doc = re.replacen(&doc, 1, "").into_owned();
        }
    }

    let (insert_at, indent) = ANCHORS
        .iter()
        .find_map(|re| {
            re.captures(&doc).and_then(|caps| {
                let whole = caps.get(0)?;
                let indent = caps.get(1).map_or("", |m| m.as_str());
                Some((whole.end(), indent.to_string()))
            })
        })
        .ok_or_else(|| PinError::malformed("domain document", "no memory anchor found"))?;

    let mut inserted = String::new();
    for line in fragment.body() {
        inserted.push('\n');
        inserted.push_str(&indent);
        inserted.push_str(line);
    }

    doc.insert_str(insert_at, &inserted);
    Ok(doc)
}

/// Plan, render and patch the domain file of `domain`.
///
/// Returns the patched document. The file is left untouched on dry runs.
pub fn apply(
    store: &Store,
    domain: &DomainRef,
    config: &DomainConfig,
    options: ApplyOptions,
) -> Result<String> {
    let xml = store.read_domain(domain)?;

    let plan = plan(config.layout());
    if options.strict {
        plan.ensure_satisfied()?;
    }

    let fragment = render(config.layout(), &plan);
    let patched = patch_domain(&xml, config, &fragment)?;

    if options.dry_run {
        tracing::warn!(%domain, "Dry run, domain file not written");
    } else {
        store.write_domain(domain, &patched)?;
        tracing::info!(
            %domain,
            path = %store.domain_path(domain).display(),
            memory_gib = config.memory_gib(),
            "Domain file updated"
        );
    }

    Ok(patched)
}
