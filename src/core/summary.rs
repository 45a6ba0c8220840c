//! Accumulates the outputs of individual dashboard features into one context
//! that the caller hands to a [`Summarizer`]. The value is owned by the caller;
//! nothing here is shared between requests.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::advisor::FundListing;
use super::types::AllocationResult;
use crate::clients::Summarizer;
use crate::error::{Error, Result};

pub const RECOMMENDATION_SECTION: &str = "Investment Plan";
pub const FUND_SEARCH_SECTION: &str = "Mutual Fund Research";

const SUMMARY_INSTRUCTIONS: &str = "You are a personal financial advisor. Using the information \
gathered below, write a short summary of the user's position and two or three concrete next steps. \
Do not invent figures that are not present.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    pub title: String,
    pub body: String,
}

impl SummarySection {
    /// Advice text followed by the per-class allocation lines.
    pub fn recommendation(result: &AllocationResult) -> Self {
        let mut body = result.advice_text.trim_end().to_string();
        body.push_str("\n\nAllocation:");
        for line in result.allocation_lines() {
            let _ = write!(body, "\n- {}: {}", line.asset_class, line.display);
        }
        Self {
            title: RECOMMENDATION_SECTION.to_string(),
            body,
        }
    }

    pub fn fund_search(query: &str, hits: &[FundListing]) -> Self {
        let mut body = format!("Search: {query}");
        if hits.is_empty() {
            body.push_str("\nNo matching schemes.");
        }
        for hit in hits {
            match hit.scheme_code {
                Some(code) => {
                    let _ = write!(body, "\n- {} (code {code})", hit.scheme_name);
                }
                None => {
                    let _ = write!(body, "\n- {}", hit.scheme_name);
                }
            }
        }
        Self {
            title: FUND_SEARCH_SECTION.to_string(),
            body,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryContext {
    #[serde(default)]
    pub sections: Vec<SummarySection>,
}

impl SummaryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Stores a section, replacing an earlier one with the same title while
    /// keeping its position.
    pub fn record(&mut self, section: SummarySection) -> &mut Self {
        match self.sections.iter().position(|s| s.title == section.title) {
            Some(index) => self.sections[index].body = section.body,
            None => self.sections.push(section),
        }
        self
    }

    pub fn render_prompt(&self) -> String {
        let mut prompt = String::from(SUMMARY_INSTRUCTIONS);
        for section in &self.sections {
            let _ = write!(prompt, "\n\n### {}\n{}", section.title, section.body.trim_end());
        }
        prompt
    }
}

/// Collapses repeated titles the same way [`SummaryContext::record`] does.
impl FromIterator<SummarySection> for SummaryContext {
    fn from_iter<I: IntoIterator<Item = SummarySection>>(iter: I) -> Self {
        let mut context = SummaryContext::new();
        for section in iter {
            context.record(section);
        }
        context
    }
}

/// Asks the model for commentary over everything gathered so far.
pub async fn summarize(summarizer: &dyn Summarizer, context: &SummaryContext) -> Result<String> {
    if context.is_empty() {
        return Err(Error::Validation(
            "Nothing to summarize yet; generate a plan or run a search first".to_string(),
        ));
    }
    summarizer.generate(&context.render_prompt()).await
}

/// Forwards a free-form question to the model.
pub async fn ask(summarizer: &dyn Summarizer, question: &str) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::Validation("question must not be empty".to_string()));
    }
    summarizer.generate(question).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::recommend_by_goal;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoSummarizer {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().expect("lock").push(prompt.to_string());
            Ok(format!("summary of {} chars", prompt.len()))
        }
    }

    fn section(title: &str, body: &str) -> SummarySection {
        SummarySection {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn record_replaces_section_in_place() {
        let mut context = SummaryContext::new();
        context
            .record(section("A", "first"))
            .record(section("B", "second"))
            .record(section("A", "third"));

        let titles: Vec<_> = context.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(context.sections[0].body, "third");
    }

    #[test]
    fn recommendation_section_carries_allocation_lines() {
        let result = recommend_by_goal(30, 100_000.0, "Salaried", "Metro", "Wealth Accumulation");
        let section = SummarySection::recommendation(&result);

        assert_eq!(section.title, RECOMMENDATION_SECTION);
        assert!(section.body.contains("- Goal: Wealth Accumulation"));
        assert!(section.body.contains("\n\nAllocation:\n- Equity: 70% (~₹70000)\n"));
        assert!(section.body.ends_with("- Gold: 10% (~₹10000)"));
    }

    #[test]
    fn fund_search_section_lists_hits_and_placeholders() {
        let section = SummarySection::fund_search(
            "flexi",
            &[
                FundListing {
                    scheme_name: "Parag Parikh Flexi Cap Fund".to_string(),
                    scheme_code: Some(122639),
                    isin_growth: None,
                },
                FundListing::unavailable(),
            ],
        );

        let body = &section.body;
        assert_eq!(section.title, FUND_SEARCH_SECTION);
        assert!(body.starts_with("Search: flexi\n"));
        assert!(body.contains("- Parag Parikh Flexi Cap Fund (code 122639)"));
        assert!(body.contains("- Unable to fetch results."));
    }

    #[test]
    fn empty_fund_search_is_recorded_as_no_match() {
        let section = SummarySection::fund_search("zzz", &[]);
        assert_eq!(section.body, "Search: zzz\nNo matching schemes.");
    }

    #[test]
    fn collecting_sections_keeps_latest_body_per_title() {
        let context: SummaryContext = vec![
            section("Investment Plan", "old"),
            section("Mutual Fund Research", "Search: flexi"),
            section("Investment Plan", "new"),
        ]
        .into_iter()
        .collect();

        assert_eq!(context.sections.len(), 2);
        assert_eq!(context.sections[0], section("Investment Plan", "new"));
    }

    #[test]
    fn prompt_orders_sections_after_instructions() {
        let mut context = SummaryContext::new();
        context
            .record(section("First", "one\n"))
            .record(section("Second", "two"));

        let prompt = context.render_prompt();
        assert!(prompt.starts_with(SUMMARY_INSTRUCTIONS));
        assert!(prompt.ends_with("### First\none\n\n### Second\ntwo"));
    }

    #[tokio::test]
    async fn summarize_rejects_empty_context() {
        let summarizer = EchoSummarizer::default();
        let err = summarize(&summarizer, &SummaryContext::new())
            .await
            .expect_err("empty");
        assert!(matches!(err, Error::Validation(_)));
        assert!(summarizer.prompts.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn summarize_sends_rendered_prompt() {
        let summarizer = EchoSummarizer::default();
        let mut context = SummaryContext::new();
        context.record(section("Notes", "keep an emergency fund"));

        summarize(&summarizer, &context).await.expect("summary");
        let prompts = summarizer.prompts.lock().expect("lock");
        assert_eq!(prompts.as_slice(), &[context.render_prompt()]);
    }

    #[tokio::test]
    async fn ask_trims_and_rejects_blank_questions() {
        let summarizer = EchoSummarizer::default();
        assert!(matches!(ask(&summarizer, "   ").await, Err(Error::Validation(_))));

        ask(&summarizer, "  What is an ELSS fund?  ").await.expect("answer");
        let prompts = summarizer.prompts.lock().expect("lock");
        assert_eq!(prompts.as_slice(), &["What is an ELSS fund?".to_string()]);
    }
}
