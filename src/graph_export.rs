//! Graph export for dependency visualization.
//!
//! Turns a container's service graph into plain serialisable nodes and
//! edges, and renders them as JSON, Graphviz DOT or Mermaid.

use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::service::ServiceState;

/// A service node in the exported graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Hex vertex id
    pub id: String,
    /// Specification type name
    pub type_name: String,
    /// `None` for an unbound placeholder
    pub lifetime: Option<Lifetime>,
    pub state: ServiceState,
    pub is_leaf: bool,
    pub is_root: bool,
}

/// A dependency edge. `from` is the dependency, `to` the service consuming
/// it, so edges point in build order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Graph-level counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub service_count: usize,
    pub static_count: usize,
    pub transient_count: usize,
    pub placeholder_count: usize,
    pub edge_count: usize,
    pub built: bool,
    /// Export format version
    pub version: String,
}

/// Complete export of a container's service graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
}

/// Output formats for [`DependencyGraph::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty printed JSON
    Json,
    /// Graphviz
    Dot,
    /// Mermaid flowchart
    Mermaid,
}

impl DependencyGraph {
    /// Captures the current graph of `container`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_ioc::{graph_export::DependencyGraph, Container};
    /// use std::sync::Arc;
    ///
    /// trait Store: Send + Sync {}
    /// trait Api: Send + Sync {}
    /// struct Memory;
    /// impl Store for Memory {}
    /// struct Rest(Arc<dyn Store>);
    /// impl Api for Rest {}
    ///
    /// let container = Container::new();
    /// container.add_static(|()| Arc::new(Memory) as Arc<dyn Store>).unwrap();
    /// container.add_transient(|s: Arc<dyn Store>| Arc::new(Rest(s)) as Arc<dyn Api>).unwrap();
    ///
    /// let graph = DependencyGraph::capture(&container);
    /// assert_eq!(graph.nodes.len(), 2);
    /// assert_eq!(graph.edges.len(), 1);
    /// assert_eq!(graph.metadata.static_count, 1);
    /// ```
    pub fn capture(container: &Container) -> Self {
        let descriptors = container.descriptors();

        let nodes: Vec<GraphNode> = descriptors
            .iter()
            .map(|d| GraphNode {
                id: d.id.to_string(),
                type_name: d.type_name().to_string(),
                lifetime: d.lifetime,
                state: d.state,
                is_leaf: d.is_leaf,
                is_root: d.is_root,
            })
            .collect();

        let edges: Vec<GraphEdge> = descriptors
            .iter()
            .flat_map(|d| {
                d.dependents.iter().map(move |dependent| GraphEdge {
                    from: d.id.to_string(),
                    to: dependent.service_id().to_string(),
                })
            })
            .collect();

        let count = |lifetime: Option<Lifetime>| {
            descriptors.iter().filter(|d| d.lifetime == lifetime).count()
        };
        let metadata = GraphMetadata {
            service_count: nodes.len(),
            static_count: count(Some(Lifetime::Static)),
            transient_count: count(Some(Lifetime::Transient)),
            placeholder_count: count(None),
            edge_count: edges.len(),
            built: container.is_built(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Self {
            nodes,
            edges,
            metadata,
        }
    }

    /// Renders the graph in `format`.
    pub fn render(&self, format: ExportFormat) -> DiResult<String> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Dot => Ok(self.to_dot()),
            ExportFormat::Mermaid => Ok(self.to_mermaid()),
        }
    }

    pub fn to_json(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DiError::Unknown(format!("graph serialization failed: {e}")))
    }

    pub fn to_dot(&self) -> String {
        let mut output = String::from("digraph ServiceGraph {\n  rankdir=TB;\n  node [shape=box];\n\n");

        for node in &self.nodes {
            let (label, color) = match node.lifetime {
                Some(Lifetime::Static) => ("Static", "lightblue"),
                Some(Lifetime::Transient) => ("Transient", "lightyellow"),
                None => ("Unbound", "white"),
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n({})\", fillcolor={}, style=filled];\n",
                node.id,
                node.type_name.replace('"', "\\\""),
                label,
                color
            ));
        }
        output.push('\n');
        for edge in &self.edges {
            output.push_str(&format!("  \"{}\" -> \"{}\";\n", edge.from, edge.to));
        }
        output.push_str("}\n");
        output
    }

    pub fn to_mermaid(&self) -> String {
        let mut output = String::from("graph TD\n");

        // Mermaid ids cannot start with a digit
        for node in &self.nodes {
            output.push_str(&format!(
                "  n{}[\"{}\"]\n",
                node.id,
                node.type_name.replace('"', "#quot;")
            ));
        }
        for edge in &self.edges {
            output.push_str(&format!("  n{} --> n{}\n", edge.from, edge.to));
        }

        output.push_str("\n  classDef static fill:#e1f5fe\n");
        output.push_str("  classDef transient fill:#fff3e0\n");
        for node in &self.nodes {
            let class = match node.lifetime {
                Some(Lifetime::Static) => "static",
                Some(Lifetime::Transient) => "transient",
                None => continue,
            };
            output.push_str(&format!("  class n{} {}\n", node.id, class));
        }
        output
    }
}
