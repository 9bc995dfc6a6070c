use serde::{Deserialize, Serialize};

const DEFAULT_KEYWORDS: [&str; 4] = ["เจ้าของ", "กิจการ", "business owner", "proprietor"];

/// Occupation fragments that mark a customer as a business owner.
///
/// Matching is case-insensitive substring containment: an occupation such as
/// "Proprietor, family bakery" matches `proprietor`. Keywords are stored
/// lowercased so callers may extend the set with any casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnershipKeywords(Vec<String>);

impl OwnershipKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        Self(normalized)
    }

    pub fn with_keyword(mut self, keyword: impl AsRef<str>) -> Self {
        let keyword = keyword.as_ref().trim().to_lowercase();
        if !keyword.is_empty() && !self.0.contains(&keyword) {
            self.0.push(keyword);
        }
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }

    /// Returns the first keyword contained in `occupation`, if any.
    pub fn matching(&self, occupation: &str) -> Option<&str> {
        let occupation = occupation.to_lowercase();
        self.0
            .iter()
            .find(|keyword| occupation.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, occupation: &str) -> bool {
        self.matching(occupation).is_some()
    }
}

impl Default for OwnershipKeywords {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}
