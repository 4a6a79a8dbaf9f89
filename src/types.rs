use serde::{Deserialize, Serialize};

/// The `ItemDescriptor` struct identifies one catalog item discovered
/// during listing traversal: where its page lives and the metadata the
/// listing already knows about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// The unique item identifier (the listing's product code).
    pub id: String,
    /// The absolute URL of the item's page.
    pub source_url: String,
    /// The item title as reported by the listing.
    pub title: String,
    /// The brand name as reported by the listing.
    pub brand: String,
}

/// The `HarvestResult` struct holds the searchable text harvested for
/// one item. It exists only for items whose fetch and extraction
/// completed; failed items are dropped, never recorded with empty text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestResult {
    /// The item identifier, drawn from the descriptor.
    pub id: String,
    /// The normalized, lowercase text the keyword filters search.
    pub text: String,
    /// The item title carried over from the descriptor.
    pub title: String,
    /// The brand name carried over from the descriptor.
    pub brand: String,
}

/// The `CurationGroup` struct names one keyword filter pass: a label and
/// the lowercase keywords that define it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationGroup {
    /// The group name, unique within a run.
    pub name: String,
    /// The lowercase keywords; an item matches if any one of them is a
    /// substring of its harvested text.
    pub keywords: Vec<String>,
}

impl CurationGroup {
    /// Creates a group from a name and raw keywords, lowercasing,
    /// trimming, and deduplicating them.
    ///
    /// # Returns
    ///
    /// `None` when the name is blank or no usable keyword remains.
    pub fn new(name: &str, keywords: impl IntoIterator<Item = impl AsRef<str>>) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cleaned: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !cleaned.contains(&keyword) {
                cleaned.push(keyword);
            }
        }

        if cleaned.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            keywords: cleaned,
        })
    }

    /// Parses a `Name | keyword1, keyword2, ...` line.
    ///
    /// # Returns
    ///
    /// `None` for lines without a `|` separator or with nothing usable on
    /// either side of it.
    pub fn parse(line: &str) -> Option<Self> {
        let (name, keywords) = line.split_once('|')?;
        Self::new(name, keywords.split(','))
    }
}

/// The `FilterOutcome` struct records one group's filter pass over the
/// corpus: the group name and the matched item ids in corpus order.
/// Computed once per group and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// The curation group the outcome belongs to.
    pub name: String,
    /// The matched item ids, in corpus traversal order.
    pub matched: Vec<String>,
}
