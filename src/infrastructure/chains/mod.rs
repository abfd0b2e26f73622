//! Completion-backed chains: router, graders and the answer generator

mod generator;
mod graders;
mod prompts;
mod router;
mod verdict;

pub use generator::LlmAnswerGenerator;
pub use graders::{LlmAnswerGrader, LlmGroundednessGrader, LlmRelevanceGrader};
pub use router::LlmQuestionRouter;
