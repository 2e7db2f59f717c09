//! Branding identifier resolution.

/// A branding identifier selecting a visual/content variant of the site.
///
/// Resolved once from configuration and injected into widgets at
/// construction time. Absence is a legitimate value, not an error, and the
/// identifier is read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Branding {
    id: Option<String>,
}

impl Branding {
    /// Wrap an identifier from configuration. An empty or whitespace-only
    /// string normalizes to absent.
    pub fn new(id: Option<String>) -> Self {
        let id = id.filter(|s| !s.trim().is_empty());
        Self { id }
    }

    /// The absent branding.
    pub fn none() -> Self {
        Self { id: None }
    }

    /// The current identifier, if any.
    pub fn get(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl From<&str> for Branding {
    fn from(id: &str) -> Self {
        Self::new(Some(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_normalizes_to_absent() {
        assert_eq!(Branding::new(Some(String::new())).get(), None);
        assert_eq!(Branding::new(Some("  ".to_string())).get(), None);
        assert_eq!(Branding::new(None).get(), None);
        assert_eq!(Branding::none().get(), None);
    }

    #[test]
    fn present_identifier_is_returned() {
        assert_eq!(Branding::from("screamingbox").get(), Some("screamingbox"));
    }
}
