/// Three-section view of a raw answer. Derived on demand from the stored raw
/// text and never persisted itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedAnswer {
    pub quick: String,
    pub watch: String,
    pub next: String,
    pub has_structured: bool,
}

impl FormattedAnswer {
    /// The whole reply as one block, used whenever the expected headings are
    /// not all present.
    pub fn unstructured(raw: &str) -> Self {
        Self {
            quick: raw.trim().to_string(),
            watch: String::new(),
            next: String::new(),
            has_structured: false,
        }
    }
}
