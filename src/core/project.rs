//! Project nodes and the dependency graph between them.
//!
//! Every node is a CMake project in the repository. Edges point from a
//! dependency to its dependent, so a topological walk yields dependencies
//! first.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::platform::BuildCell;

/// Error while assembling the project graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("project `{0}` is declared more than once")]
    DuplicateNode(String),

    #[error("project `{node}` depends on unknown project `{dependency}`")]
    UnknownDependency { node: String, dependency: String },

    #[error("cycle detected in project graph at `{0}`")]
    Cycle(String),

    #[error("unknown project `{0}`")]
    UnknownNode(String),
}

/// A buildable CMake project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectNode {
    /// Project name, unique within the graph
    pub name: String,

    /// Directory containing the top-level CMakeLists.txt, relative to the repository root
    pub source: PathBuf,

    /// Names of the projects this one links against
    #[serde(default)]
    pub deps: Vec<String>,

    /// CMake variable that dependents receive pointing at this project's install dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_var: Option<String>,

    /// Extra `-D` cache entries passed at configure time
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defines: BTreeMap<String, String>,
}

impl ProjectNode {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        ProjectNode {
            name: name.into(),
            source: source.into(),
            deps: Vec::new(),
            root_var: None,
            defines: BTreeMap::new(),
        }
    }

    pub fn with_deps(mut self, deps: &[&str]) -> Self {
        self.deps = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_root_var(mut self, var: impl Into<String>) -> Self {
        self.root_var = Some(var.into());
        self
    }

    pub fn with_define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.insert(key.into(), value.into());
        self
    }

    /// Absolute source directory.
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.source)
    }

    /// `<source>/Build/<Platform>/<Config>`
    pub fn build_dir(&self, root: &Path, cell: BuildCell) -> PathBuf {
        self.cell_dir(root, "Build", cell)
    }

    /// `<source>/Install/<Platform>/<Config>`
    pub fn install_dir(&self, root: &Path, cell: BuildCell) -> PathBuf {
        self.cell_dir(root, "Install", cell)
    }

    fn cell_dir(&self, root: &Path, kind: &str, cell: BuildCell) -> PathBuf {
        self.source_dir(root)
            .join(kind)
            .join(cell.platform.as_str())
            .join(cell.config.to_native_name())
    }
}

/// The projects of the repository as a validated DAG.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    graph: DiGraph<ProjectNode, ()>,
    by_name: HashMap<String, NodeIndex>,
    order: Vec<NodeIndex>,
}

impl ProjectGraph {
    /// Build the graph, rejecting duplicates, dangling dependencies and cycles.
    pub fn new(nodes: Vec<ProjectNode>) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut by_name = HashMap::new();

        for node in nodes {
            let name = node.name.clone();
            if by_name.contains_key(&name) {
                return Err(GraphError::DuplicateNode(name));
            }
            let idx = graph.add_node(node);
            by_name.insert(name, idx);
        }

        let mut edges = Vec::new();
        for idx in graph.node_indices() {
            let node = &graph[idx];
            for dep in &node.deps {
                let dep_idx = by_name.get(dep).ok_or_else(|| GraphError::UnknownDependency {
                    node: node.name.clone(),
                    dependency: dep.clone(),
                })?;
                edges.push((*dep_idx, idx));
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        let order = stable_topological_order(&graph)?;

        Ok(ProjectGraph {
            graph,
            by_name,
            order,
        })
    }

    /// The default CoDeLib layout: {zlib, minizip-ng} -> CoDeLib -> {Benchmark, Test}.
    pub fn default_nodes() -> Vec<ProjectNode> {
        vec![
            ProjectNode::new("zlib", "External/zlib")
                .with_root_var("ZLIB_ROOT")
                .with_define("ZLIB_BUILD_EXAMPLES", "OFF"),
            ProjectNode::new("minizip-ng", "External/minizip-ng")
                .with_define("MZ_FETCH_LIBS", "OFF"),
            ProjectNode::new("CoDeLib", "CoDeLib").with_deps(&["zlib", "minizip-ng"]),
            ProjectNode::new("Benchmark", "Benchmark").with_deps(&["CoDeLib"]),
            ProjectNode::new("Test", "CoDeLib/Test").with_deps(&["CoDeLib"]),
        ]
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn get(&self, name: &str) -> Option<&ProjectNode> {
        self.by_name.get(name).map(|&idx| &self.graph[idx])
    }

    /// Direct dependencies of a node, in declaration order.
    pub fn deps(&self, name: &str) -> Vec<&ProjectNode> {
        match self.get(name) {
            Some(node) => node
                .deps
                .iter()
                .filter_map(|dep| self.get(dep))
                .collect(),
            None => Vec::new(),
        }
    }

    /// All nodes, dependencies before dependents.
    pub fn build_order(&self) -> Vec<&ProjectNode> {
        self.order.iter().map(|&idx| &self.graph[idx]).collect()
    }

    /// A node and everything it transitively depends on, in build order.
    pub fn upstream_closure(&self, name: &str) -> Result<Vec<&ProjectNode>, GraphError> {
        let start = *self
            .by_name
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))?;

        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut reachable = HashSet::new();
        while let Some(idx) = dfs.next(reversed) {
            reachable.insert(idx);
        }

        Ok(self
            .order
            .iter()
            .filter(|idx| reachable.contains(idx))
            .map(|&idx| &self.graph[idx])
            .collect())
    }
}

/// Kahn's algorithm with ties broken by declaration order, so reports and
/// logs come out in the same order on every run.
fn stable_topological_order(graph: &DiGraph<ProjectNode, ()>) -> Result<Vec<NodeIndex>, GraphError> {
    // petgraph's own sort gives us cycle detection with a culprit node
    if let Err(cycle) = toposort(graph, None) {
        return Err(GraphError::Cycle(graph[cycle.node_id()].name.clone()));
    }

    let mut in_degree: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|idx| {
            let n = graph
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .count();
            (idx, n)
        })
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    let mut done = HashSet::new();
    while order.len() < graph.node_count() {
        let next = graph
            .node_indices()
            .find(|idx| !done.contains(idx) && in_degree[idx] == 0)
            .ok_or_else(|| GraphError::Cycle(String::new()))?;

        done.insert(next);
        order.push(next);
        for dependent in graph.neighbors_directed(next, petgraph::Direction::Outgoing) {
            if let Some(deg) = in_degree.get_mut(&dependent) {
                *deg -= 1;
            }
        }
    }

    Ok(order)
}
