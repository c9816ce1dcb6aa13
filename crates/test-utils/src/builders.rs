#![allow(dead_code)]

use pipedag::config::{Manifest, RawManifest, parse_str};
use pipedag::{DependencyGraph, TaskDescriptor};

/// Shorthand for a descriptor with string-slice dependencies.
pub fn desc(name: &str, deps: &[&str]) -> TaskDescriptor {
    TaskDescriptor::with_dependencies(name, deps.iter().copied())
}

/// Builder for `DependencyGraph` to simplify test setup.
///
/// Unlike `DependencyGraph::add`, duplicates are kept so that invalid
/// graphs can be built on purpose.
#[derive(Default)]
pub struct GraphBuilder {
    descriptors: Vec<TaskDescriptor>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(mut self, name: &str, deps: &[&str]) -> Self {
        self.descriptors.push(desc(name, deps));
        self
    }

    /// `names[i]` depends on `names[i - 1]`.
    pub fn chain(mut self, names: &[&str]) -> Self {
        for (i, name) in names.iter().enumerate() {
            let deps: &[&str] = if i == 0 { &[] } else { &names[i - 1..i] };
            self.descriptors.push(desc(name, deps));
        }
        self
    }

    pub fn descriptors(&self) -> &[TaskDescriptor] {
        &self.descriptors
    }

    pub fn build(self) -> DependencyGraph {
        DependencyGraph::from_descriptors(self.descriptors)
    }
}

/// Parse and validate a manifest from TOML text.
pub fn manifest(toml: &str) -> Manifest {
    let raw: RawManifest = parse_str(toml).expect("manifest TOML should parse");
    Manifest::try_from(raw).expect("Failed to build valid manifest")
}
