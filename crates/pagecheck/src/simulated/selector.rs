//! CSS and XPath subsets understood by the simulated driver.
//!
//! CSS: type, universal, `#id`, `.class`, `[attr]`, `[attr=value]`,
//! `:nth-child(n)`, `:nth-of-type(n)`, `:checked`, descendant and child
//! combinators, selector lists.
//!
//! XPath: absolute (`/`, `//`) and context-relative (`.//`, `./`, bare)
//! location paths over the child axis, name tests or `*`, and predicates
//! `[n]`, `[last()]`, `[@a]`, `[@a='v']`, `[text()='v']`,
//! `[normalize-space(.)='v']`, `[contains(@a,'v')]`, `[contains(.,'v')]`.

use super::dom::{Document, NodeId};
use crate::result::{PagecheckError, PagecheckResult};

fn invalid(selector: &str, message: impl Into<String>) -> PagecheckError {
    PagecheckError::InvalidSelector {
        selector: selector.to_string(),
        message: message.into(),
    }
}

struct Cursor<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let n = expected.chars().count();
        let matches = self
            .chars
            .get(self.pos..self.pos + n)
            .is_some_and(|window| window.iter().copied().eq(expected.chars()));
        if matches {
            self.pos += n;
        }
        matches
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    fn expect(&mut self, expected: char) -> PagecheckResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(invalid(self.source, format!("expected '{expected}' at {}", self.pos)))
        }
    }

    fn quoted(&mut self) -> PagecheckResult<String> {
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(invalid(self.source, "expected quoted string")),
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(invalid(self.source, "unterminated string")),
                Some('\\') => {
                    if let Some(c) = self.bump() {
                        out.push(c);
                    }
                }
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> PagecheckResult<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse()
            .map_err(|_| invalid(self.source, "expected number"))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

// =============================================================================
// CSS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
    NthChild(usize),
    NthOfType(usize),
    Checked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Vec<Simple>>,
    combinators: Vec<Combinator>,
}

/// A parsed CSS selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    alternatives: Vec<Complex>,
}

impl CssSelector {
    /// Parse a selector list
    pub fn parse(source: &str) -> PagecheckResult<Self> {
        let mut cursor = Cursor::new(source);
        let mut alternatives = Vec::new();
        loop {
            alternatives.push(parse_complex(&mut cursor)?);
            cursor.skip_ws();
            if cursor.at_end() {
                break;
            }
            cursor.expect(',')?;
        }
        Ok(Self { alternatives })
    }

    /// Whether `node` matches any alternative
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| matches_from(complex, doc, node, complex.compounds.len() - 1))
    }
}

fn parse_complex(cursor: &mut Cursor<'_>) -> PagecheckResult<Complex> {
    cursor.skip_ws();
    let mut compounds = vec![parse_compound(cursor)?];
    let mut combinators = Vec::new();
    loop {
        let had_ws = cursor.skip_ws();
        match cursor.peek() {
            None | Some(',') => break,
            Some('>') => {
                cursor.pos += 1;
                cursor.skip_ws();
                combinators.push(Combinator::Child);
            }
            Some(_) if had_ws => combinators.push(Combinator::Descendant),
            Some(c) => return Err(invalid(cursor.source, format!("unexpected '{c}'"))),
        }
        compounds.push(parse_compound(cursor)?);
    }
    Ok(Complex {
        compounds,
        combinators,
    })
}

fn parse_compound(cursor: &mut Cursor<'_>) -> PagecheckResult<Vec<Simple>> {
    let mut simples = Vec::new();
    let universal = cursor.eat('*');
    if !universal && cursor.peek().is_some_and(char::is_alphabetic) {
        simples.push(Simple::Tag(cursor.ident().to_ascii_lowercase()));
    }
    loop {
        match cursor.peek() {
            Some('#') => {
                cursor.pos += 1;
                simples.push(Simple::Id(cursor.ident()));
            }
            Some('.') => {
                cursor.pos += 1;
                simples.push(Simple::Class(cursor.ident()));
            }
            Some('[') => {
                cursor.pos += 1;
                cursor.skip_ws();
                let name = cursor.ident();
                cursor.skip_ws();
                let value = if cursor.eat('=') {
                    cursor.skip_ws();
                    let value = match cursor.peek() {
                        Some('"' | '\'') => cursor.quoted()?,
                        _ => cursor.ident(),
                    };
                    cursor.skip_ws();
                    Some(value)
                } else {
                    None
                };
                cursor.expect(']')?;
                simples.push(Simple::Attr { name, value });
            }
            Some(':') => {
                cursor.pos += 1;
                let pseudo = cursor.ident();
                let simple = match pseudo.as_str() {
                    "checked" => Simple::Checked,
                    "nth-child" | "nth-of-type" => {
                        cursor.expect('(')?;
                        let n = cursor.number()?;
                        cursor.expect(')')?;
                        if pseudo == "nth-child" {
                            Simple::NthChild(n)
                        } else {
                            Simple::NthOfType(n)
                        }
                    }
                    other => {
                        return Err(invalid(
                            cursor.source,
                            format!("unsupported pseudo-class :{other}"),
                        ))
                    }
                };
                simples.push(simple);
            }
            _ => break,
        }
    }
    if simples.is_empty() && !universal {
        return Err(invalid(cursor.source, "empty compound selector"));
    }
    Ok(simples)
}

fn matches_from(complex: &Complex, doc: &Document, node: NodeId, index: usize) -> bool {
    if !complex.compounds[index]
        .iter()
        .all(|simple| simple_matches(simple, doc, node))
    {
        return false;
    }
    if index == 0 {
        return true;
    }
    match complex.combinators[index - 1] {
        Combinator::Child => doc
            .node(node)
            .parent
            .is_some_and(|p| matches_from(complex, doc, p, index - 1)),
        Combinator::Descendant => doc
            .ancestors(node)
            .into_iter()
            .any(|a| matches_from(complex, doc, a, index - 1)),
    }
}

fn simple_matches(simple: &Simple, doc: &Document, id: NodeId) -> bool {
    let node = doc.node(id);
    match simple {
        Simple::Tag(tag) => node.tag == *tag,
        Simple::Id(value) => node.attr("id") == Some(value.as_str()),
        Simple::Class(class) => node.has_class(class),
        Simple::Attr { name, value: None } => node.attr(name).is_some(),
        Simple::Attr {
            name,
            value: Some(value),
        } => node.attr(name) == Some(value.as_str()),
        Simple::Checked => node.checked && (node.is_checkable() || node.tag == "option"),
        Simple::NthChild(n) => position_among(doc.siblings(id), id) == Some(*n),
        Simple::NthOfType(n) => {
            let same_type: Vec<NodeId> = doc
                .siblings(id)
                .iter()
                .copied()
                .filter(|&s| doc.node(s).tag == node.tag)
                .collect();
            position_among(&same_type, id) == Some(*n)
        }
    }
}

fn position_among(list: &[NodeId], id: NodeId) -> Option<usize> {
    list.iter().position(|&n| n == id).map(|p| p + 1)
}

// =============================================================================
// XPath
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Root,
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    Last,
    HasAttr(String),
    AttrEquals(String, String),
    AttrContains(String, String),
    OwnTextEquals(String),
    TextEquals(String),
    TextContains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    name: Option<String>,
    predicates: Vec<Predicate>,
}

/// A parsed XPath location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    origin: Origin,
    steps: Vec<Step>,
}

impl XPath {
    /// Parse a location path
    pub fn parse(source: &str) -> PagecheckResult<Self> {
        let mut cursor = Cursor::new(source.trim());
        let origin = if cursor.peek() == Some('/') {
            Origin::Root
        } else {
            let _ = cursor.eat('.');
            Origin::Context
        };
        let mut steps = Vec::new();
        while !cursor.at_end() {
            let axis = if cursor.eat_str("//") {
                Axis::Descendant
            } else if cursor.eat('/') || steps.is_empty() {
                Axis::Child
            } else {
                return Err(invalid(source, format!("expected '/' at {}", cursor.pos)));
            };
            let name = if cursor.eat('*') {
                None
            } else {
                let ident = cursor.ident();
                if ident.is_empty() {
                    return Err(invalid(source, "expected node test"));
                }
                Some(ident.to_ascii_lowercase())
            };
            let mut predicates = Vec::new();
            while cursor.eat('[') {
                predicates.push(parse_predicate(&mut cursor)?);
                cursor.skip_ws();
                cursor.expect(']')?;
            }
            steps.push(Step {
                axis,
                name,
                predicates,
            });
        }
        Ok(Self { origin, steps })
    }

    /// Evaluate from `context` (ignored for absolute paths); results in document order
    #[must_use]
    pub fn evaluate(&self, doc: &Document, context: NodeId) -> Vec<NodeId> {
        // `None` stands for the document node above <html>
        let mut current: Vec<Option<NodeId>> = match self.origin {
            Origin::Root => vec![None],
            Origin::Context => vec![Some(context)],
        };
        for step in &self.steps {
            let mut next = Vec::new();
            for &ctx in &current {
                let parents: Vec<Option<NodeId>> = match step.axis {
                    Axis::Child => vec![ctx],
                    Axis::Descendant => {
                        let from = ctx.unwrap_or_else(|| doc.root());
                        let mut all = vec![ctx];
                        if ctx.is_none() {
                            all.push(Some(from));
                        }
                        all.extend(doc.descendants(from).into_iter().map(Some));
                        all
                    }
                };
                for parent in parents {
                    let children: Vec<NodeId> = match parent {
                        None => vec![doc.root()],
                        Some(p) => doc.node(p).children.clone(),
                    };
                    let mut candidates: Vec<NodeId> = children
                        .into_iter()
                        .filter(|&c| step.name.as_ref().map_or(true, |n| doc.node(c).tag == *n))
                        .collect();
                    for predicate in &step.predicates {
                        candidates = apply_predicate(predicate, doc, candidates);
                    }
                    next.extend(candidates);
                }
            }
            let order = doc.order();
            next.sort_by_key(|&n| order[n]);
            next.dedup();
            current = next.into_iter().map(Some).collect();
        }
        current.into_iter().flatten().collect()
    }
}

fn parse_predicate(cursor: &mut Cursor<'_>) -> PagecheckResult<Predicate> {
    cursor.skip_ws();
    if cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
        return Ok(Predicate::Position(cursor.number()?));
    }
    if cursor.eat_str("last()") {
        return Ok(Predicate::Last);
    }
    if cursor.eat('@') {
        let name = cursor.ident();
        cursor.skip_ws();
        if cursor.eat('=') {
            cursor.skip_ws();
            return Ok(Predicate::AttrEquals(name, cursor.quoted()?));
        }
        return Ok(Predicate::HasAttr(name));
    }
    if cursor.eat_str("contains(") {
        cursor.skip_ws();
        let target = if cursor.eat('@') {
            Some(cursor.ident())
        } else if cursor.eat_str("text()") || cursor.eat('.') {
            None
        } else {
            return Err(invalid(cursor.source, "unsupported contains() argument"));
        };
        cursor.skip_ws();
        cursor.expect(',')?;
        cursor.skip_ws();
        let needle = cursor.quoted()?;
        cursor.skip_ws();
        cursor.expect(')')?;
        return Ok(match target {
            Some(name) => Predicate::AttrContains(name, needle),
            None => Predicate::TextContains(needle),
        });
    }
    let own_text = if cursor.eat_str("text()") {
        true
    } else if cursor.eat_str("normalize-space(.)")
        || cursor.eat_str("normalize-space()")
        || cursor.eat('.')
    {
        false
    } else {
        return Err(invalid(cursor.source, format!("unsupported predicate at {}", cursor.pos)));
    };
    cursor.skip_ws();
    cursor.expect('=')?;
    cursor.skip_ws();
    let value = cursor.quoted()?;
    Ok(if own_text {
        Predicate::OwnTextEquals(value)
    } else {
        Predicate::TextEquals(value)
    })
}

fn apply_predicate(predicate: &Predicate, doc: &Document, candidates: Vec<NodeId>) -> Vec<NodeId> {
    match predicate {
        Predicate::Position(n) => candidates.get(n.wrapping_sub(1)).copied().into_iter().collect(),
        Predicate::Last => candidates.last().copied().into_iter().collect(),
        _ => candidates
            .into_iter()
            .filter(|&c| {
                let node = doc.node(c);
                match predicate {
                    Predicate::HasAttr(name) => node.attr(name).is_some(),
                    Predicate::AttrEquals(name, value) => node.attr(name) == Some(value.as_str()),
                    Predicate::AttrContains(name, needle) => {
                        node.attr(name).is_some_and(|v| v.contains(needle.as_str()))
                    }
                    Predicate::OwnTextEquals(value) => node.text.trim() == value,
                    Predicate::TextEquals(value) => doc.text_content(c) == *value,
                    Predicate::TextContains(needle) => {
                        doc.text_content(c).contains(needle.as_str())
                    }
                    Predicate::Position(_) | Predicate::Last => true,
                }
            })
            .collect(),
    }
}
