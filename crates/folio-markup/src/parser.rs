//! Tolerant HTML parser.
//!
//! Handles the subset of HTML that résumé pages are made of: elements,
//! quoted/unquoted/valueless attributes, text, comments, doctype
//! declarations, void elements, and raw-text elements (`script`, `style`).
//! Stray or missing closing tags are tolerated rather than rejected.

use crate::dom::{unescape, Attr, Document, Element, Node};

/// Errors that can occur when parsing markup.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unterminated comment - missing closing -->")]
    UnterminatedComment,

    #[error("Unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),

    #[error("Unclosed raw text element: <{0}>")]
    UnclosedRawText(String),
}

/// Parse page markup into a document tree.
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];

        // Text until the next tag
        if !rest.starts_with('<') {
            let end = rest.find('<').unwrap_or(rest.len());
            push_node(&mut stack, &mut roots, Node::Text(unescape(&rest[..end])));
            pos += end;
            continue;
        }

        if let Some(comment) = rest.strip_prefix("<!--") {
            let Some(end) = comment.find("-->") else {
                return Err(ParseError::UnterminatedComment);
            };
            push_node(
                &mut stack,
                &mut roots,
                Node::Comment(comment[..end].to_string()),
            );
            pos += 4 + end + 3;
            continue;
        }

        if rest.starts_with("<!") {
            let Some(end) = rest.find('>') else {
                return Err(ParseError::UnterminatedTag(pos));
            };
            push_node(
                &mut stack,
                &mut roots,
                Node::Doctype(rest[2..end].to_string()),
            );
            pos += end + 1;
            continue;
        }

        if rest.starts_with("</") {
            let Some(end) = rest.find('>') else {
                return Err(ParseError::UnterminatedTag(pos));
            };
            let name = rest[2..end].trim().to_lowercase();
            close_element(&mut stack, &mut roots, &name);
            pos += end + 1;
            continue;
        }

        if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            pos += parse_open_tag(rest, pos, &mut stack, &mut roots)?;
            continue;
        }

        // A lone '<' that opens nothing is literal text
        push_node(&mut stack, &mut roots, Node::Text("<".to_string()));
        pos += 1;
    }

    // Tolerate unclosed elements at end of input
    while let Some(el) = stack.pop() {
        push_node(&mut stack, &mut roots, Node::Element(el));
    }

    Ok(Document { nodes: roots })
}

fn push_node(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Close the innermost open element with the given tag name.
/// Anything opened inside it is attached first; a stray close tag is ignored.
fn close_element(stack: &mut Vec<Element>, roots: &mut Vec<Node>, name: &str) {
    if !stack.iter().any(|el| el.tag == name) {
        return;
    }

    while let Some(el) = stack.pop() {
        let matched = el.tag == name;
        push_node(stack, roots, Node::Element(el));
        if matched {
            break;
        }
    }
}

/// Parse an open tag starting at `rest` (which begins with `<`).
/// Returns the number of bytes consumed.
fn parse_open_tag(
    rest: &str,
    offset: usize,
    stack: &mut Vec<Element>,
    roots: &mut Vec<Node>,
) -> Result<usize, ParseError> {
    let bytes = rest.as_bytes();
    let mut i = 1;

    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let tag = rest[1..i].to_lowercase();

    let mut attrs: Vec<Attr> = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(ParseError::UnterminatedTag(offset));
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        if rest[i..].starts_with("/>") {
            self_closing = true;
            i += 2;
            break;
        }
        if bytes[i] == b'/' {
            i += 1;
            continue;
        }

        // Attribute name
        let name_start = i;
        while i < bytes.len() && !matches!(bytes[i], b'=' | b'/' | b'>') && !bytes[i].is_ascii_whitespace()
        {
            i += 1;
        }
        if i == name_start {
            i += 1;
            continue;
        }
        let name = rest[name_start..i].to_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(ParseError::UnterminatedTag(offset));
            }

            if bytes[i] == b'"' || bytes[i] == b'\'' {
                let quote = bytes[i] as char;
                let value_start = i + 1;
                let Some(end) = rest[value_start..].find(quote) else {
                    return Err(ParseError::UnterminatedTag(offset));
                };
                i = value_start + end + 1;
                Some(unescape(&rest[value_start..value_start + end]))
            } else {
                let value_start = i;
                while i < bytes.len() && bytes[i] != b'>' && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                Some(unescape(&rest[value_start..i]))
            }
        } else {
            None
        };

        attrs.push(Attr { name, value });
    }

    let element = Element {
        tag: tag.clone(),
        attrs,
        children: Vec::new(),
    };

    if self_closing || element.is_void() {
        push_node(stack, roots, Node::Element(element));
        return Ok(i);
    }

    if element.is_raw_text() {
        let close = format!("</{}", tag);
        let Some(content_len) = find_ignore_ascii_case(&rest[i..], &close) else {
            return Err(ParseError::UnclosedRawText(tag));
        };

        let content = &rest[i..i + content_len];
        let mut element = element;
        if !content.is_empty() {
            element.children.push(Node::Text(content.to_string()));
        }
        push_node(stack, roots, Node::Element(element));

        let after_close = i + content_len + close.len();
        let Some(gt) = rest[after_close..].find('>') else {
            return Err(ParseError::UnterminatedTag(offset));
        };
        return Ok(after_close + gt + 1);
    }

    stack.push(element);
    Ok(i)
}

/// Byte-wise ASCII-case-insensitive substring search.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();

    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}
