// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::dag::TaskDescriptor;
use crate::engine::TaskName;
use crate::errors::GraphError;

/// DFS colouring used by cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// In-memory dependency graph keyed by task name.
///
/// Descriptors are kept in registration order, which is the tie-break for
/// everything that has to be deterministic (layer contents, cycle reports,
/// target closures).
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    descriptors: Vec<TaskDescriptor>,
    /// Name -> position of its first registration in `descriptors`.
    index: HashMap<TaskName, usize>,
    /// Direct dependents: tasks that list the key in their dependencies.
    dependents: HashMap<TaskName, Vec<TaskName>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from raw descriptors without checking anything.
    ///
    /// Duplicate names are kept so that [`validate`](Self::validate) can
    /// report them.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = TaskDescriptor>,
    {
        let mut graph = Self::new();
        for desc in descriptors {
            graph.push(desc);
        }
        graph
    }

    /// Add a descriptor, rejecting names that are already present.
    pub fn add(&mut self, descriptor: TaskDescriptor) -> Result<(), GraphError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(GraphError::DuplicateName(descriptor.name));
        }
        self.push(descriptor);
        Ok(())
    }

    fn push(&mut self, descriptor: TaskDescriptor) {
        for dep in &descriptor.dependencies {
            let dependents = self.dependents.entry(dep.clone()).or_default();
            if !dependents.contains(&descriptor.name) {
                dependents.push(descriptor.name.clone());
            }
        }
        self.index
            .entry(descriptor.name.clone())
            .or_insert(self.descriptors.len());
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All task names in registration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn descriptors(&self) -> &[TaskDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&TaskDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Immediate dependencies of a task, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.descriptor(name)
            .map(|d| d.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list it as a dependency).
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.dependents
            .get(name)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks without dependencies, in registration order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.descriptors
            .iter()
            .filter(|d| d.dependencies.is_empty())
            .map(|d| d.name.as_str())
    }

    /// Check that names are unique, every dependency exists, and the graph
    /// is acyclic.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.check_unique_names()?;
        self.check_dependencies_exist()?;
        self.check_acyclic()?;
        Ok(())
    }

    fn check_unique_names(&self) -> Result<(), GraphError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for desc in &self.descriptors {
            if !seen.insert(desc.name.as_str()) {
                return Err(GraphError::DuplicateName(desc.name.clone()));
            }
        }
        Ok(())
    }

    fn check_dependencies_exist(&self) -> Result<(), GraphError> {
        for desc in &self.descriptors {
            for dep in &desc.dependencies {
                if !self.index.contains_key(dep) {
                    return Err(GraphError::UnknownDependency {
                        task: desc.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Depth-first search over dependency edges with an in-progress set.
    ///
    /// Reaching a node that is still in progress means the current DFS path
    /// loops back on itself; the cycle is the path suffix starting at that
    /// node.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();

        for root in self.task_names() {
            if marks.contains_key(root) {
                continue;
            }

            // (node, index of the next dependency to visit)
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::InProgress);

            while let Some(&(node, next)) = stack.last() {
                let deps = self.dependencies_of(node);

                if next >= deps.len() {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                    continue;
                }

                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                let dep = deps[next].as_str();
                match marks.get(dep) {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => {
                        let start = stack
                            .iter()
                            .position(|(n, _)| *n == dep)
                            .unwrap_or(0);
                        let members: Vec<TaskName> =
                            stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                        debug!(?members, "cycle detected in task graph");
                        return Err(GraphError::Cycle(members));
                    }
                    None => {
                        marks.insert(dep, Mark::InProgress);
                        stack.push((dep, 0));
                    }
                }
            }
        }

        Ok(())
    }

    /// Group tasks into layers: layer `i` holds exactly the tasks whose
    /// dependencies all live in layers `0..i`.
    ///
    /// Within a layer tasks keep registration order. The graph is validated
    /// first, so an invalid graph never yields a partial layering.
    pub fn topological_layers(&self) -> Result<Vec<Vec<TaskName>>, GraphError> {
        self.validate()?;

        // Edge direction: dep -> task.
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(self.len(), self.len());
        let nodes: Vec<NodeIndex> = (0..self.len()).map(|i| graph.add_node(i)).collect();

        for (i, desc) in self.descriptors.iter().enumerate() {
            for dep in &desc.dependencies {
                if let Some(&j) = self.index.get(dep) {
                    graph.update_edge(nodes[j], nodes[i], ());
                }
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            let name = self.descriptors[graph[cycle.node_id()]].name.clone();
            GraphError::Cycle(vec![name])
        })?;

        // Longest path from any root; dependencies come first in `order`.
        let mut depth = vec![0usize; self.len()];
        for node in order {
            depth[graph[node]] = graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|dep| depth[graph[dep]] + 1)
                .max()
                .unwrap_or(0);
        }

        let layer_count = depth.iter().max().map(|d| d + 1).unwrap_or(0);
        let mut layers: Vec<Vec<TaskName>> = vec![Vec::new(); layer_count];
        for (i, desc) in self.descriptors.iter().enumerate() {
            layers[depth[i]].push(desc.name.clone());
        }

        Ok(layers)
    }

    /// The given targets plus all their transitive dependencies, as a new
    /// graph in registration order.
    pub fn closure_of<I, T>(&self, targets: I) -> Result<DependencyGraph, GraphError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut stack: Vec<String> = Vec::new();
        for target in targets {
            let target = target.as_ref();
            if !self.contains(target) {
                return Err(GraphError::UnknownTask(target.to_string()));
            }
            stack.push(target.to_string());
        }

        let mut selected: HashSet<String> = HashSet::new();
        while let Some(current) = stack.pop() {
            if !selected.insert(current.clone()) {
                continue;
            }
            stack.extend(self.dependencies_of(&current).iter().cloned());
        }

        Ok(DependencyGraph::from_descriptors(
            self.descriptors
                .iter()
                .filter(|d| selected.contains(&d.name))
                .cloned(),
        ))
    }
}
