//! Transition functions and the static edge list of the answer graph

use std::fmt::Write;

use serde::Serialize;

use super::GraphNode;
use crate::domain::RouteDecision;

/// Outcome of self-grading a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationGrade {
    /// Not grounded in the documents
    #[serde(rename = "not supported")]
    NotSupported,
    /// Grounded and answers the question
    #[serde(rename = "useful")]
    Useful,
    /// Grounded but does not answer the question
    #[serde(rename = "not useful")]
    NotUseful,
}

impl GenerationGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSupported => "not supported",
            Self::Useful => "useful",
            Self::NotUseful => "not useful",
        }
    }

    /// State reached after GENERATE for this grade
    pub fn next(&self) -> GraphNode {
        match self {
            Self::NotSupported => GraphNode::Generate,
            Self::Useful => GraphNode::End,
            Self::NotUseful => GraphNode::WebSearch,
        }
    }
}

pub fn after_entry(route: RouteDecision) -> GraphNode {
    match route {
        RouteDecision::Corpus => GraphNode::Retrieve,
        RouteDecision::Web => GraphNode::WebSearch,
    }
}

pub fn after_grading(needs_web_search: bool) -> GraphNode {
    if needs_web_search {
        GraphNode::WebSearch
    } else {
        GraphNode::Generate
    }
}

/// Adequacy is only consulted once the generation is grounded, so `responsive` is
/// `None` when groundedness failed.
pub fn grade_generation(grounded: bool, responsive: Option<bool>) -> GenerationGrade {
    match (grounded, responsive) {
        (false, _) => GenerationGrade::NotSupported,
        (true, Some(true)) => GenerationGrade::Useful,
        (true, _) => GenerationGrade::NotUseful,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: GraphNode,
    pub to: GraphNode,
    /// Condition label; `None` for unconditional edges
    pub label: Option<&'static str>,
}

const fn edge(from: GraphNode, to: GraphNode, label: Option<&'static str>) -> Edge {
    Edge { from, to, label }
}

pub const EDGES: &[Edge] = &[
    edge(GraphNode::Entry, GraphNode::Retrieve, Some("vectorstore")),
    edge(GraphNode::Entry, GraphNode::WebSearch, Some("web_search")),
    edge(GraphNode::Retrieve, GraphNode::GradeDocuments, None),
    edge(GraphNode::GradeDocuments, GraphNode::WebSearch, Some("websearch")),
    edge(GraphNode::GradeDocuments, GraphNode::Generate, Some("generate")),
    edge(GraphNode::WebSearch, GraphNode::Generate, None),
    edge(GraphNode::Generate, GraphNode::Generate, Some("not supported")),
    edge(GraphNode::Generate, GraphNode::End, Some("useful")),
    edge(GraphNode::Generate, GraphNode::WebSearch, Some("not useful")),
];

/// Render the graph as a Mermaid flowchart
pub fn to_mermaid() -> String {
    let mut out = String::from("flowchart TD\n");

    for node in GraphNode::ALL {
        let _ = match node {
            GraphNode::Entry | GraphNode::End => writeln!(out, "    {node}([{node}])"),
            _ => writeln!(out, "    {node}[{node}]"),
        };
    }

    for edge in EDGES {
        let _ = match edge.label {
            Some(label) => writeln!(out, "    {} -. \"{}\" .-> {}", edge.from, label, edge.to),
            None => writeln!(out, "    {} --> {}", edge.from, edge.to),
        };
    }

    out
}
