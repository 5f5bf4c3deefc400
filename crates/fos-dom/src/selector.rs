//! CSS Selector Matching
//!
//! The subset used by `querySelectorAll`-style lookups: type, universal,
//! id, class and attribute selectors, combined with descendant and child
//! combinators, grouped with commas.

use crate::{DomTree, ElementData, NodeId};

/// Selector parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Expected identifier at position {pos}")]
    ExpectedIdentifier { pos: usize },

    #[error("Unterminated attribute selector")]
    UnterminatedAttribute,

    #[error("Unterminated string in attribute selector")]
    UnterminatedString,

    #[error("Combinator without a following selector")]
    DanglingCombinator,
}

/// Parsed, comma-separated selector group
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, left to right
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CompoundSelector {
    /// `None` means any tag (`*` or omitted)
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

impl SelectorList {
    /// Parse a selector group
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(input);
        let mut selectors = Vec::new();
        loop {
            parser.skip_ws();
            selectors.push(parser.complex()?);
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some(',') => parser.bump(),
                Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: parser.pos }),
            }
        }
        Ok(Self { selectors })
    }

    /// Does the element `id` match any selector in the group?
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches_from(tree, id, s.compounds.len() - 1))
    }

    /// Matching descendants of `scope`, in document order
    pub fn select(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .filter(|&id| self.matches(tree, id))
            .collect()
    }
}

impl ComplexSelector {
    fn matches_from(&self, tree: &DomTree, id: NodeId, idx: usize) -> bool {
        let Some(elem) = tree.element(id) else { return false };
        if !self.compounds[idx].matches(elem) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent(id)
                .is_some_and(|parent| self.matches_from(tree, parent, idx - 1)),
            Combinator::Descendant => {
                let mut current = tree.parent(id);
                while let Some(ancestor) = current {
                    if self.matches_from(tree, ancestor, idx - 1) {
                        return true;
                    }
                    current = tree.parent(ancestor);
                }
                false
            }
        }
    }
}

impl CompoundSelector {
    fn matches(&self, elem: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !elem.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.ids.iter().all(|id| elem.id() == Some(id.as_str())) {
            return false;
        }
        let class_name = elem.class_name();
        if !self.classes.iter().all(|c| class_name.split_whitespace().any(|t| t == c)) {
            return false;
        }
        self.attrs.iter().all(|a| a.matches(elem))
    }
}

impl AttrSelector {
    fn matches(&self, elem: &ElementData) -> bool {
        let Some(value) = elem.get_attr(&self.name) else { return false };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Includes(v) => value.split_whitespace().any(|t| t == v),
            AttrOp::DashMatch(v) => value == v || value.strip_prefix(v.as_str()).is_some_and(|rest| rest.starts_with('-')),
            AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
            AttrOp::Substring(v) => !v.is_empty() && value.contains(v.as_str()),
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self { chars: input.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Returns true if any whitespace was consumed
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            None => Err(SelectorError::UnterminatedAttribute),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(SelectorError::ExpectedIdentifier { pos: start });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_ws => combinators.push(Combinator::Descendant),
                Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            }
            if matches!(self.peek(), None | Some(',')) {
                return Err(SelectorError::DanglingCombinator);
            }
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector { compounds, combinators })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let start = self.pos;
        let mut compound = CompoundSelector::default();

        match self.peek() {
            Some('*') => self.bump(),
            Some(c) if is_ident_start(c) => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.ids.push(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.attribute()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
                None => SelectorError::Empty,
            });
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrSelector { name, op: AttrOp::Exists });
            }
            Some('=') => {
                self.bump();
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.bump();
                self.expect('=')?;
                c
            }
            Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            None => return Err(SelectorError::UnterminatedAttribute),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.quoted(quote)?
            }
            Some(_) => self.ident()?,
            None => return Err(SelectorError::UnterminatedAttribute),
        };
        self.skip_ws();
        self.expect(']')?;

        let op = match op {
            '~' => AttrOp::Includes(value),
            '|' => AttrOp::DashMatch(value),
            '^' => AttrOp::Prefix(value),
            '$' => AttrOp::Suffix(value),
            '*' => AttrOp::Substring(value),
            _ => AttrOp::Equals(value),
        };
        Ok(AttrSelector { name, op })
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::UnterminatedString),
                Some('\\') => {
                    self.bump();
                    if let Some(c) = self.peek() {
                        value.push(c);
                        self.bump();
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(value);
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
