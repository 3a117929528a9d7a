//! CSS selectors: the subset `querySelector` needs for page scripts.
//!
//! Supported: type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `=`, `~=`, `^=`, `$=`, `*=`), the descendant and child
//! combinators, and comma-separated selector lists.
//!
//! Complex selectors are stored right-to-left and matched right-to-left: the
//! subject compound must match the element itself, then each combinator walks
//! up the tree.

use thiserror::Error;

use crate::node::{ElementData, NodeId};
use crate::tree::Dom;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant
    Descendant,
    /// `>`: parent > child
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Eq,
    /// `[attr~=val]`
    Includes,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Type(String),
    Universal,
    Id(String),
    Class(String),
    Attribute { name: String, op: AttrOp, value: String },
}

/// Simple selectors with no combinator between them (e.g. `a.nav[href]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// `parts[0]` is the subject (rightmost) compound; each part carries the
/// combinator linking it to the part on its left, `None` for the leftmost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<(CompoundSelector, Option<Combinator>)>,
}

/// A comma-separated selector group; an element matches if any member does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected `{ch}` at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("expected an identifier at offset {pos}")]
    ExpectedIdent { pos: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

impl SelectorList {
    /// Parse a selector group. Fails the way `querySelector` throws a
    /// `SyntaxError`: a bare `#`, a dangling combinator or an empty member
    /// are all errors.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser { chars: input.char_indices().collect(), pos: 0 };
        let mut selectors = vec![parser.complex()?];
        loop {
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some(',') => {
                    parser.pos += 1;
                    selectors.push(parser.complex()?);
                }
                Some(ch) => return Err(parser.unexpected(ch)),
            }
        }
        Ok(Self { selectors })
    }

    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(dom, node))
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or_else(
            || self.chars.last().map_or(0, |&(i, c)| i + c.len_utf8()),
            |&(i, _)| i,
        )
    }

    fn unexpected(&self, ch: char) -> SelectorError {
        SelectorError::UnexpectedChar { ch, pos: self.offset() }
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_ws();
        if self.peek().is_none() && self.pos == 0 {
            return Err(SelectorError::Empty);
        }
        // Collected left-to-right, reversed at the end.
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(',') | None => break,
                Some(_) if had_ws => Combinator::Descendant,
                Some(ch) => return Err(self.unexpected(ch)),
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        let mut parts = Vec::with_capacity(compounds.len());
        for (i, compound) in compounds.into_iter().enumerate().rev() {
            let to_left = if i == 0 { None } else { Some(combinators[i - 1]) };
            parts.push((compound, to_left));
        }
        Ok(ComplexSelector { parts })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut simples = Vec::new();
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                simples.push(SimpleSelector::Universal);
            }
            Some(c) if is_ident_start(c) => {
                simples.push(SimpleSelector::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    simples.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    simples.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    simples.push(self.attribute()?);
                }
                _ => break,
            }
        }
        if simples.is_empty() {
            return Err(match self.peek() {
                Some(ch) => self.unexpected(ch),
                None => SelectorError::UnexpectedEnd,
            });
        }
        Ok(CompoundSelector { simples })
    }

    fn attribute(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(SimpleSelector::Attribute {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => {
                self.pos += 1;
                AttrOp::Eq
            }
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(match self.peek() {
                        Some(ch) => self.unexpected(ch),
                        None => SelectorError::UnexpectedEnd,
                    });
                }
                self.pos += 1;
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            Some(ch) => return Err(self.unexpected(ch)),
            None => return Err(SelectorError::UnexpectedEnd),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.peek() {
                        Some(c) if c == q => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
                value
            }
            _ => self.ident()?,
        };
        self.skip_ws();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(SimpleSelector::Attribute { name, op, value })
            }
            Some(ch) => Err(self.unexpected(ch)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    /// A CSS identifier: may not start with a digit, nor with `-` + digit.
    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        let first = self.peek();
        let second = self.chars.get(self.pos + 1).map(|&(_, c)| c);
        let valid_start = match first {
            Some('-') => second.is_some_and(|c| c == '-' || is_ident_start(c)),
            Some(c) => is_ident_start(c),
            None => false,
        };
        if !valid_start {
            return Err(match first {
                None => SelectorError::UnexpectedEnd,
                Some(_) => SelectorError::ExpectedIdent { pos: self.offset() },
            });
        }
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().map(|&(_, c)| c).collect())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

// ─────────────────────────────────────────────────────────────────────────────
// Matching
// ─────────────────────────────────────────────────────────────────────────────

impl ComplexSelector {
    /// Returns `false` if `node` is not an element.
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        match self.parts.first() {
            Some((subject, _)) => subject.matches(dom, node) && self.matches_left_of(dom, node, 0),
            None => false,
        }
    }

    /// `parts[index]` matched `node`; check the rest of the chain to its left.
    /// A descendant step tries every matching ancestor, not just the nearest.
    fn matches_left_of(&self, dom: &Dom, node: NodeId, index: usize) -> bool {
        let Some((compound, _)) = self.parts.get(index + 1) else {
            return true;
        };
        match self.parts[index].1 {
            Some(Combinator::Child) => dom
                .parent_element(node)
                .is_some_and(|parent| {
                    compound.matches(dom, parent) && self.matches_left_of(dom, parent, index + 1)
                }),
            Some(Combinator::Descendant) => {
                let mut ancestor = dom.parent_element(node);
                while let Some(anc) = ancestor {
                    if compound.matches(dom, anc) && self.matches_left_of(dom, anc, index + 1) {
                        return true;
                    }
                    ancestor = dom.parent_element(anc);
                }
                false
            }
            None => false,
        }
    }
}

impl CompoundSelector {
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        match dom.element(node) {
            Some(elem) => self.simples.iter().all(|s| matches_simple(elem, s)),
            None => false,
        }
    }
}

fn matches_simple(elem: &ElementData, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => elem.tag_name == *tag,
        SimpleSelector::Id(id) => elem.id.as_deref() == Some(id.as_str()),
        SimpleSelector::Class(class) => elem.has_class(class),
        SimpleSelector::Attribute { name, op, value } => {
            let Some(actual) = elem.attr(name) else {
                return false;
            };
            match op {
                AttrOp::Exists => true,
                AttrOp::Eq => actual == *value,
                AttrOp::Includes => actual.split_whitespace().any(|w| w == value),
                // Empty operands never match for the substring family.
                AttrOp::Prefix => !value.is_empty() && actual.starts_with(value.as_str()),
                AttrOp::Suffix => !value.is_empty() && actual.ends_with(value.as_str()),
                AttrOp::Substring => !value.is_empty() && actual.contains(value.as_str()),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attr;

    fn parse(s: &str) -> SelectorList {
        SelectorList::parse(s).unwrap()
    }

    #[test]
    fn parse_child_and_descendant_list() {
        let list = parse("main > div, main h2, main img");
        assert_eq!(list.selectors.len(), 3);
        let first = &list.selectors[0];
        assert_eq!(first.parts.len(), 2);
        assert_eq!(
            first.parts[0].0.simples,
            vec![SimpleSelector::Type("div".into())]
        );
        assert_eq!(first.parts[0].1, Some(Combinator::Child));
        assert_eq!(first.parts[1].1, None);
        assert_eq!(list.selectors[1].parts[0].1, Some(Combinator::Descendant));
    }

    #[test]
    fn parse_attribute_prefix() {
        let list = parse(r##"a[href^="#"]"##);
        assert_eq!(
            list.selectors[0].parts[0].0.simples,
            vec![
                SimpleSelector::Type("a".into()),
                SimpleSelector::Attribute {
                    name: "href".into(),
                    op: AttrOp::Prefix,
                    value: "#".into(),
                },
            ]
        );
    }

    #[test]
    fn parse_compound_id_class() {
        let list = parse("DIV#intro.card.wide");
        assert_eq!(
            list.selectors[0].parts[0].0.simples,
            vec![
                SimpleSelector::Type("div".into()),
                SimpleSelector::Id("intro".into()),
                SimpleSelector::Class("card".into()),
                SimpleSelector::Class("wide".into()),
            ]
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(SelectorList::parse(""), Err(SelectorError::Empty));
        assert_eq!(SelectorList::parse("#"), Err(SelectorError::UnexpectedEnd));
        assert!(matches!(
            SelectorList::parse("#1st"),
            Err(SelectorError::ExpectedIdent { pos: 1 })
        ));
        assert!(SelectorList::parse("main >").is_err());
        assert!(SelectorList::parse("a,").is_err());
        assert!(SelectorList::parse("a[href").is_err());
        assert!(SelectorList::parse("a[href^x]").is_err());
        assert!(matches!(
            SelectorList::parse("a)"),
            Err(SelectorError::UnexpectedChar { ch: ')', pos: 1 })
        ));
    }

    fn fixture() -> (Dom, NodeId, NodeId, NodeId, NodeId) {
        // body > main > (div > img.hero) , a[href="#top"]
        let mut dom = Dom::new();
        let body = dom.create_html_element("body");
        let main = dom.create_html_element("main");
        let div = dom.create_html_element("div");
        let img = dom.create_element("img", vec![Attr::new("class", "hero wide")]);
        let link = dom.create_element("a", vec![Attr::new("href", "#top")]);
        dom.append_child(dom.document(), body);
        dom.append_child(body, main);
        dom.append_child(main, div);
        dom.append_child(div, img);
        dom.append_child(body, link);
        (dom, main, div, img, link)
    }

    #[test]
    fn descendant_combinator_tries_every_ancestor() {
        // main > div.outer > div.inner > img
        let mut dom = Dom::new();
        let main = dom.create_html_element("main");
        let outer = dom.create_element("div", vec![Attr::new("class", "outer")]);
        let inner = dom.create_element("div", vec![Attr::new("class", "inner")]);
        let img = dom.create_html_element("img");
        dom.append_child(dom.document(), main);
        dom.append_child(main, outer);
        dom.append_child(outer, inner);
        dom.append_child(inner, img);

        // The nearest `div` is not a child of `main`; the outer one is.
        assert!(parse("main > div img").matches(&dom, img));
        assert!(parse("main > div.outer > div img").matches(&dom, img));
        assert!(parse("main div > div img").matches(&dom, img));
        assert!(!parse("main > div.inner img").matches(&dom, img));
        assert!(!parse("section div img").matches(&dom, img));
    }

    #[test]
    fn child_combinator_requires_direct_parent() {
        let (dom, _main, div, img, _) = fixture();
        let direct = parse("main > div");
        assert!(direct.matches(&dom, div));
        assert!(!parse("main > img").matches(&dom, img));
        assert!(parse("main img").matches(&dom, img));
        assert!(parse("body main div > img.hero").matches(&dom, img));
    }

    #[test]
    fn attribute_operators() {
        let (dom, _, _, img, link) = fixture();
        assert!(parse(r##"a[href^="#"]"##).matches(&dom, link));
        assert!(parse("a[href$=top]").matches(&dom, link));
        assert!(parse("a[href*='to']").matches(&dom, link));
        assert!(parse("a[href]").matches(&dom, link));
        assert!(!parse("a[href='#']").matches(&dom, link));
        assert!(!parse(r#"a[href^=""]"#).matches(&dom, link));
        assert!(parse("img[class~=wide]").matches(&dom, img));
        assert!(!parse("img[class~=wid]").matches(&dom, img));
    }

    #[test]
    fn list_matches_any_member() {
        let (dom, main, _, img, link) = fixture();
        let interactive = parse("a, button, img");
        assert!(interactive.matches(&dom, link));
        assert!(interactive.matches(&dom, img));
        assert!(!interactive.matches(&dom, main));
    }

    #[test]
    fn non_elements_never_match() {
        let (mut dom, main, ..) = fixture();
        let text = dom.create_text("x");
        dom.append_child(main, text);
        assert!(!parse("*").matches(&dom, text));
        assert!(!parse("*").matches(&dom, dom.document()));
    }
}
