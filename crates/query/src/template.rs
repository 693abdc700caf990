use anyhow::{bail, Result};

pub const DEFAULT_RAG_TEMPLATE: &str = "Answer the Question using only this Context.\n# Question:\n{query_text}\n\n# Context:\n{context}\n\n# Answer:\n";

/// Prompt template for answer generation.
///
/// Construction checks that both the `{query_text}` and `{context}`
/// placeholders are present, so a filled prompt always carries the
/// question and the retrieved context.
#[derive(Debug, Clone)]
pub struct RagTemplate {
    template: String,
}

impl Default for RagTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_RAG_TEMPLATE.to_string(),
        }
    }
}

impl RagTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in ["{query_text}", "{context}"] {
            if !template.contains(placeholder) {
                bail!("rag template is missing the {placeholder} placeholder");
            }
        }
        Ok(Self { template })
    }

    pub fn fill(&self, query_text: &str, context: &str) -> String {
        self.template
            .replace("{query_text}", query_text)
            .replace("{context}", context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_passes_validation() {
        assert!(RagTemplate::new(DEFAULT_RAG_TEMPLATE).is_ok());
    }

    #[test]
    fn missing_placeholders_are_rejected() {
        assert!(RagTemplate::new("question: {query_text}").is_err());
        assert!(RagTemplate::new("context: {context}").is_err());
        assert!(RagTemplate::new("neither").is_err());
    }

    #[test]
    fn fill_substitutes_both_placeholders() {
        let template = RagTemplate::new("Q: {query_text} C: {context}").unwrap();
        assert_eq!(template.fill("why?", "because."), "Q: why? C: because.");
    }

    #[test]
    fn default_fill_keeps_section_layout() {
        let filled = RagTemplate::default().fill("What is a gearbox?", "a gearbox is a gearbox");

        assert!(filled.starts_with("Answer the Question using only this Context.\n"));
        assert!(filled.contains("# Question:\nWhat is a gearbox?"));
        assert!(filled.contains("# Context:\na gearbox is a gearbox"));
        assert!(filled.ends_with("# Answer:\n"));
    }
}
