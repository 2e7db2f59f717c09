//! Descendant selectors for locating optional sub-elements.
//!
//! Supports chains of simple tag/class selectors separated by whitespace,
//! e.g. `.contact-info .email`. Lookups return an `Option` so callers
//! branch on presence; a missing element is never an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, Element, Node};

/// A single compound selector: optional tag name plus required classes.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
}

impl SimpleSelector {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if el.tag != *tag {
                return false;
            }
        }
        self.classes.iter().all(|c| el.has_class(c))
    }
}

/// A descendant-combinator selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    parts: Vec<SimpleSelector>,
}

/// Errors that can occur when parsing a selector.
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Invalid selector token: {0}")]
    InvalidToken(String),
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9-]*)?((?:\.[A-Za-z0-9_-]+)*)$").expect("Invalid token regex")
});

impl Selector {
    /// Parse a whitespace-separated chain of `tag.class` tokens.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parts = Vec::new();

        for token in input.split_whitespace() {
            let caps = TOKEN_RE
                .captures(token)
                .ok_or_else(|| SelectorError::InvalidToken(token.to_string()))?;

            let tag = caps.get(1).map(|m| m.as_str().to_lowercase());
            let classes: Vec<String> = caps
                .get(2)
                .map(|m| m.as_str())
                .unwrap_or("")
                .split('.')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect();

            if tag.is_none() && classes.is_empty() {
                return Err(SelectorError::InvalidToken(token.to_string()));
            }

            parts.push(SimpleSelector { tag, classes });
        }

        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }

        Ok(Self { parts })
    }

    /// Whether `el`, with the given ancestor chain (outermost first),
    /// matches this selector.
    fn matches_with(&self, el: &Element, ancestors: &[&Element]) -> bool {
        let (last, prefix) = self
            .parts
            .split_last()
            .expect("selector always has at least one part");

        if !last.matches(el) {
            return false;
        }

        let mut from = 0;
        for part in prefix {
            match ancestors[from..].iter().position(|a| part.matches(a)) {
                Some(i) => from += i + 1,
                None => return false,
            }
        }
        true
    }
}

impl Element {
    /// Find the first descendant matching the selector, in document order.
    /// The element itself can satisfy ancestor parts but is never the match.
    pub fn find(&self, selector: &Selector) -> Option<&Element> {
        let mut ancestors = vec![self];
        let path = locate(&self.children, selector, &mut ancestors, &mut Vec::new())?;
        element_at(&self.children, &path)
    }

    /// Mutable variant of [`Element::find`].
    pub fn find_mut(&mut self, selector: &Selector) -> Option<&mut Element> {
        let path = {
            let mut ancestors = vec![&*self];
            locate(&self.children, selector, &mut ancestors, &mut Vec::new())?
        };
        element_at_mut(&mut self.children, &path)
    }
}

impl Document {
    /// Find the first element matching the selector, in document order.
    pub fn find(&self, selector: &Selector) -> Option<&Element> {
        let path = locate(&self.nodes, selector, &mut Vec::new(), &mut Vec::new())?;
        element_at(&self.nodes, &path)
    }

    /// Mutable variant of [`Document::find`].
    pub fn find_mut(&mut self, selector: &Selector) -> Option<&mut Element> {
        let path = locate(&self.nodes, selector, &mut Vec::new(), &mut Vec::new())?;
        element_at_mut(&mut self.nodes, &path)
    }
}

/// Depth-first search returning the child-index path of the first match.
fn locate<'a>(
    nodes: &'a [Node],
    selector: &Selector,
    ancestors: &mut Vec<&'a Element>,
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    for (i, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else {
            continue;
        };

        path.push(i);
        if selector.matches_with(el, ancestors) {
            let found = path.clone();
            path.pop();
            return Some(found);
        }

        ancestors.push(el);
        let found = locate(&el.children, selector, ancestors, path);
        ancestors.pop();
        path.pop();

        if found.is_some() {
            return found;
        }
    }

    None
}

fn element_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Element> {
    let (&first, rest) = path.split_first()?;
    match nodes.get(first)? {
        Node::Element(el) if rest.is_empty() => Some(el),
        Node::Element(el) => element_at(&el.children, rest),
        _ => None,
    }
}

fn element_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Element> {
    let (&first, rest) = path.split_first()?;
    match nodes.get_mut(first)? {
        Node::Element(el) => {
            if rest.is_empty() {
                Some(el)
            } else {
                element_at_mut(&mut el.children, rest)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn contact_markup() -> Document {
        parse(
            "<div class=\"cover\">\
               <div class=\"contact-info\">\
                 <a class=\"email\" href=\"mailto:a@b\">a@b</a>\
                 <a class=\"site\" href=\"http://b\">b</a>\
               </div>\
               <a class=\"email\">outside</a>\
             </div>",
        )
        .unwrap()
    }

    #[test]
    fn parses_class_chains() {
        let sel = Selector::parse(".contact-info .email").unwrap();
        assert_eq!(sel.parts.len(), 2);
        assert_eq!(sel.parts[0].classes, vec!["contact-info".to_string()]);
        assert!(sel.parts[0].tag.is_none());
    }

    #[test]
    fn parses_tag_and_class() {
        let sel = Selector::parse("a.email.primary").unwrap();
        assert_eq!(sel.parts[0].tag.as_deref(), Some("a"));
        assert_eq!(sel.parts[0].classes.len(), 2);
    }

    #[test]
    fn rejects_invalid_tokens() {
        assert!(matches!(Selector::parse(""), Err(SelectorError::Empty)));
        assert!(matches!(
            Selector::parse("#id"),
            Err(SelectorError::InvalidToken(_))
        ));
    }

    #[test]
    fn finds_scoped_descendant() {
        let doc = contact_markup();
        let sel = Selector::parse(".contact-info .email").unwrap();

        let email = doc.find(&sel).unwrap();
        assert_eq!(email.text(), "a@b");
    }

    #[test]
    fn descendant_scope_excludes_outside_elements() {
        let doc = parse("<a class=\"email\">outside</a>").unwrap();
        let sel = Selector::parse(".contact-info .email").unwrap();

        assert!(doc.find(&sel).is_none());
    }

    #[test]
    fn absent_element_is_none() {
        let doc = contact_markup();
        let sel = Selector::parse(".contact-info .phone").unwrap();

        assert!(doc.find(&sel).is_none());
    }

    #[test]
    fn root_element_satisfies_ancestor_part() {
        let doc = parse("<div class=\"contact-info\"><a class=\"site\">b</a></div>").unwrap();
        let Node::Element(root) = &doc.nodes[0] else {
            panic!("expected element");
        };

        let sel = Selector::parse(".contact-info .site").unwrap();
        assert_eq!(root.find(&sel).unwrap().text(), "b");
    }

    #[test]
    fn find_mut_allows_rewriting() {
        let mut doc = contact_markup();
        let sel = Selector::parse(".contact-info .email").unwrap();

        let email = doc.find_mut(&sel).unwrap();
        email.set_text("new@addr");
        email.set_attr("href", "mailto:new@addr");

        assert_eq!(doc.find(&sel).unwrap().text(), "new@addr");
        assert_eq!(doc.find(&sel).unwrap().attr("href"), Some("mailto:new@addr"));
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let doc = parse(
            "<div class=\"contact-info\">\
               <a class=\"email\">first</a>\
               <a class=\"email\">second</a>\
             </div>",
        )
        .unwrap();
        let sel = Selector::parse(".contact-info .email").unwrap();

        assert_eq!(doc.find(&sel).unwrap().text(), "first");
    }
}
