use crate::{GleanerError, Result};
use scraper::{ElementRef, Html, Selector};

/// The `ContentExtractor` struct turns a raw item page into the
/// normalized lowercase text blob the keyword filters search.
///
/// It targets product-describing sections rather than sweeping the whole
/// page: full-page text drags in recommendation rails ("similar
/// products", "recently viewed"), which makes unrelated items match a
/// group's keywords. The marker lists are constructor parameters so the
/// heuristics can be retuned per target site.
pub struct ContentExtractor {
    /// Selectors for metadata tags whose `content` attribute is searchable.
    meta_selectors: Vec<Selector>,
    /// Selectors for the element kinds that may carry product copy.
    section_selectors: Vec<Selector>,
    /// Class/id fragments that mark an element as product copy.
    section_markers: Vec<String>,
    /// Class/id fragments that mark an element as a recommendation rail.
    excluded_markers: Vec<String>,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        let meta_selectors = ["meta[name='description']", "meta[name='keywords']"];

        let section_markers = ["product", "description", "detail", "feature", "special"];

        let excluded_markers = ["similar", "viewed", "recommend", "related", "carousel"];

        Self::new(meta_selectors, section_markers, excluded_markers)
    }
}

impl ContentExtractor {
    /// Creates a new `ContentExtractor` with the given metadata selectors
    /// and section marker lists.
    ///
    /// # Arguments
    ///
    /// * `meta_selectors` - CSS selectors for metadata tags to read.
    /// * `section_markers` - class/id fragments that qualify an element.
    /// * `excluded_markers` - class/id fragments that disqualify an element.
    ///
    /// # Returns
    ///
    /// A new instance of `ContentExtractor`.
    pub fn new(
        meta_selectors: impl IntoIterator<Item = impl AsRef<str>>,
        section_markers: impl IntoIterator<Item = impl Into<String>>,
        excluded_markers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let meta_selectors = meta_selectors
            .into_iter()
            .filter_map(|s| Selector::parse(s.as_ref()).ok())
            .collect();

        let section_selectors = ["h1", "h2", "h3", "p", "div"]
            .into_iter()
            .filter_map(|s| Selector::parse(s).ok())
            .collect();

        Self {
            meta_selectors,
            section_selectors,
            section_markers: section_markers.into_iter().map(Into::into).collect(),
            excluded_markers: excluded_markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Extracts the searchable text from the given HTML string.
    ///
    /// # Arguments
    ///
    /// * `html` - The raw item page markup.
    ///
    /// # Returns
    ///
    /// A `Result` containing the normalized lowercase text, or an
    /// `ExtractionError` when nothing searchable was found.
    pub fn extract(&self, html: &str) -> Result<String> {
        let document = Html::parse_document(html);

        let mut parts: Vec<String> = Vec::new();

        for selector in &self.meta_selectors {
            for element in document.select(selector) {
                if let Some(content) = element.value().attr("content") {
                    if !content.trim().is_empty() {
                        parts.push(content.to_string());
                    }
                }
            }
        }

        for selector in &self.section_selectors {
            for element in document.select(selector) {
                if !self.is_product_section(&element) {
                    continue;
                }

                let text = element.text().collect::<Vec<_>>().join(" ");
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
        }

        let combined = self.clean_text(&parts.join(" "));
        if combined.is_empty() {
            return Err(GleanerError::ExtractionError(
                "no searchable content found".to_string(),
            ));
        }

        Ok(combined)
    }

    /// Checks whether an element's class/id marks it as product copy
    /// rather than a recommendation rail.
    fn is_product_section(&self, element: &ElementRef) -> bool {
        let value = element.value();
        let mut tags = value
            .attr("class")
            .unwrap_or_default()
            .to_lowercase();
        tags.push(' ');
        tags.push_str(&value.attr("id").unwrap_or_default().to_lowercase());

        if !self.section_markers.iter().any(|m| tags.contains(m)) {
            return false;
        }

        !self.excluded_markers.iter().any(|m| tags.contains(m))
    }

    /// Lowercases the text and collapses all whitespace runs to single
    /// spaces.
    fn clean_text(&self, text: &str) -> String {
        text.to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
