//! The natural-language instruction handed to an extraction backend.

const DEFAULT_SITE: &str = "Eventbrite.com";
const DEFAULT_KEYWORDS: [&str; 3] = ["biotech", "agriculture tech", "tech"];

/// Column names requested from the backend. These match the serde names on
/// [`crate::models::EventRecord`].
pub const EVENT_FIELDS: [&str; 5] = ["Event Title", "Location", "Date", "Time", "Price"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionInstruction {
    site: String,
    keywords: Vec<String>,
    fields: Vec<String>,
}

impl Default for ExtractionInstruction {
    fn default() -> Self {
        Self {
            site: DEFAULT_SITE.to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            fields: EVENT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl ExtractionInstruction {
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    /// Replaces the keyword filter. Blank keywords are dropped; an empty list
    /// keeps the current keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if !keywords.is_empty() {
            self.keywords = keywords;
        }
        self
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn render(&self) -> String {
        format!(
            "You are a web scraping agent designed to extract structured information from {site}. \
When given a search query, you will navigate the {site} website and perform a search. \
For each event that matches the keywords {keywords}, extract the following details: {fields}. \
If the price is free, note it as such. \
After collecting the data for all relevant events, format the output as a JSON object with an \
\"events\" key, where each event is an element in a JSON array. \
If the webpage does not contain any of the specified keywords, return an empty JSON array.",
            site = self.site,
            keywords = quoted_list(&self.keywords),
            fields = self.fields.join(", "),
        )
    }
}

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{item}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{}, or {}", head.join(", "), last),
    }
}
