use std::fmt;

use serde::Serialize;

/// States of the answer graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    Entry,
    Retrieve,
    GradeDocuments,
    WebSearch,
    Generate,
    End,
}

impl GraphNode {
    pub const ALL: [GraphNode; 6] = [
        Self::Entry,
        Self::Retrieve,
        Self::GradeDocuments,
        Self::WebSearch,
        Self::Generate,
        Self::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Retrieve => "retrieve",
            Self::GradeDocuments => "grade_documents",
            Self::WebSearch => "websearch",
            Self::Generate => "generate",
            Self::End => "end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
