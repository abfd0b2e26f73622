//! Prompt templates for the routing, grading and generation chains
//!
//! Placeholders use the `${name}` syntax and are filled with [`render`].

use crate::domain::Document;

pub const ROUTER_SYSTEM: &str = "You are an expert at routing a user question to a vectorstore or web search.
The vectorstore contains ${corpus_description}.
Use the vectorstore for questions on these topics. For all else, use web_search.
Respond with a JSON object of the form {\"datasource\": \"vectorstore\"} or {\"datasource\": \"web_search\"}.";

pub const RELEVANCE_SYSTEM: &str = "You are a grader assessing relevance of a retrieved document to a user question.
If the document contains keyword(s) or semantic meaning related to the question, grade it as relevant.
Give a binary score 'yes' or 'no' to indicate whether the document is relevant to the question.
Respond with a JSON object of the form {\"binary_score\": \"yes\"} or {\"binary_score\": \"no\"}.";

pub const RELEVANCE_USER: &str = "Retrieved document:\n\n${document}\n\nUser question: ${question}";

pub const GROUNDEDNESS_SYSTEM: &str = "You are a grader assessing whether an LLM generation is grounded in / supported by a set of retrieved facts.
Give a binary score 'yes' or 'no'. 'Yes' means that the answer is grounded in / supported by the set of facts.
Respond with a JSON object of the form {\"binary_score\": \"yes\"} or {\"binary_score\": \"no\"}.";

pub const GROUNDEDNESS_USER: &str = "Set of facts:\n\n${documents}\n\nLLM generation: ${generation}";

pub const ANSWER_SYSTEM: &str = "You are a grader assessing whether an answer addresses / resolves a question.
Give a binary score 'yes' or 'no'. 'Yes' means that the answer resolves the question.
Respond with a JSON object of the form {\"binary_score\": \"yes\"} or {\"binary_score\": \"no\"}.";

pub const ANSWER_USER: &str = "User question:\n\n${question}\n\nLLM generation: ${generation}";

pub const GENERATION_SYSTEM: &str = "You are an assistant for question-answering tasks. If you don't know the answer, just say that you don't know.
Answer the user question and provide citations. If none of the articles answer the question, just say you don't know.

Remember, you must return both an answer and citations. A citation consists of a VERBATIM quote that
justifies the answer and the Source with Page numbers from the metadata of the quoted article. Return a citation for every quote across all articles
that justify the answer. Use the following format for your final output:

<cited_answer>
    <answer></answer>
    <citations>
        <citation><source></source><page></page><quote></quote></citation>
        <citation><source></source><page></page><quote></quote></citation>
        ...
    </citations>
</cited_answer>";

pub const GENERATION_USER: &str = "Use the following pieces of retrieved context to answer the question.
Question: ${question}
Context:
${context}
Answer:";

/// Substitute `${name}` placeholders
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("${{{}}}", name), value)
    })
}

/// Plain facts block for the groundedness grader
pub fn facts(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Numbered articles with the source and page the generator must cite
pub fn context(documents: &[Document]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, document)| {
            let source = document.source().unwrap_or_else(|| "unknown".to_string());
            let page = document.page().unwrap_or_else(|| "n/a".to_string());
            format!(
                "<article index=\"{}\">\n<source>{}</source>\n<page>{}</page>\n<content>\n{}\n</content>\n</article>",
                i + 1,
                source,
                page,
                document.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_all_placeholders() {
        let rendered = render(
            RELEVANCE_USER,
            &[("document", "Rust is fast"), ("question", "Is Rust fast?")],
        );
        assert!(rendered.contains("Rust is fast"));
        assert!(rendered.contains("User question: Is Rust fast?"));
        assert!(!rendered.contains("${"));
    }

    #[test]
    fn test_context_carries_source_and_page() {
        let documents = vec![
            Document::new("alpha")
                .with_metadata("source", "manual.pdf")
                .with_metadata("page", 4),
            Document::new("beta"),
        ];

        let rendered = context(&documents);
        assert!(rendered.contains("<article index=\"1\">"));
        assert!(rendered.contains("<source>manual.pdf</source>"));
        assert!(rendered.contains("<page>4</page>"));
        assert!(rendered.contains("<source>unknown</source>"));
    }
}
