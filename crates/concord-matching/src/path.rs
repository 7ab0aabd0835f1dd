//! Document paths and path expressions.
//!
//! A [`DocPath`] addresses one concrete location in a parsed body, e.g.
//! `$.items[0].id`. A [`PathExpression`] is what matching rules are keyed by;
//! it may contain wildcards (`*` for any key or index, `[*]` for any index)
//! and is matched structurally against a `DocPath`.

use crate::error::PathError;
use std::fmt;
use std::str::FromStr;

/// One step of a concrete document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    Root,
    Field(String),
    Index(usize),
}

/// A concrete location in a body, rooted at `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    tokens: Vec<PathToken>,
}

impl DocPath {
    pub fn root() -> Self {
        Self {
            tokens: vec![PathToken::Root],
        }
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_root(&self) -> bool {
        self.tokens.len() == 1
    }

    /// Child path for an object key.
    pub fn join(&self, key: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(PathToken::Field(key.into()));
        Self { tokens }
    }

    /// Child path for an array index.
    pub fn join_index(&self, index: usize) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(PathToken::Index(index));
        Self { tokens }
    }
}

impl Default for DocPath {
    fn default() -> Self {
        Self::root()
    }
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn write_field(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_identifier(name) {
        write!(f, ".{name}")
    } else {
        write!(f, "['{}']", name.replace('\'', "\\'"))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                PathToken::Root => write!(f, "$")?,
                PathToken::Field(name) => write_field(f, name)?,
                PathToken::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// One segment of a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Root,
    Field(String),
    Index(usize),
    /// `[*]`: any array index
    StarIndex,
    /// `*`: any object key or array index
    Star,
}

impl PathSegment {
    /// Specificity weight: literal segments outrank the index wildcard,
    /// which outranks the bare wildcard.
    pub fn weight(&self) -> u64 {
        match self {
            PathSegment::Root | PathSegment::Field(_) | PathSegment::Index(_) => 3,
            PathSegment::StarIndex => 2,
            PathSegment::Star => 1,
        }
    }

    pub fn matches(&self, token: &PathToken) -> bool {
        match (self, token) {
            (PathSegment::Root, PathToken::Root) => true,
            (PathSegment::Field(expected), PathToken::Field(actual)) => expected == actual,
            (PathSegment::Index(expected), PathToken::Index(actual)) => expected == actual,
            (PathSegment::StarIndex, PathToken::Index(_)) => true,
            (PathSegment::Star, PathToken::Field(_) | PathToken::Index(_)) => true,
            _ => false,
        }
    }
}

/// Outcome of matching an expression against a concrete path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMatch {
    /// Product of the segment weights
    pub weight: u64,
    /// Number of segments in the expression
    pub segments: usize,
    /// The expression addresses the path itself rather than an ancestor of it
    pub direct: bool,
}

/// A parsed path expression, e.g. `$.items[*]['first name']`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpression {
    segments: Vec<PathSegment>,
}

impl PathExpression {
    pub fn parse(expression: &str) -> Result<Self, PathError> {
        Parser::new(expression).parse()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Expression with one more segment appended.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Match against a concrete path. The expression matches when every one
    /// of its segments matches the corresponding token; a shorter expression
    /// matches as an ancestor of the path.
    pub fn matches(&self, path: &DocPath) -> Option<PathMatch> {
        if self.segments.is_empty() || self.segments.len() > path.len() {
            return None;
        }
        let mut weight: u64 = 1;
        for (segment, token) in self.segments.iter().zip(path.tokens()) {
            if !segment.matches(token) {
                return None;
            }
            weight = weight.saturating_mul(segment.weight());
        }
        Some(PathMatch {
            weight,
            segments: self.segments.len(),
            direct: self.segments.len() == path.len(),
        })
    }
}

impl From<&DocPath> for PathExpression {
    fn from(path: &DocPath) -> Self {
        let segments = path
            .tokens()
            .iter()
            .map(|token| match token {
                PathToken::Root => PathSegment::Root,
                PathToken::Field(name) => PathSegment::Field(name.clone()),
                PathToken::Index(index) => PathSegment::Index(*index),
            })
            .collect();
        Self { segments }
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PathSegment::Root => write!(f, "$")?,
                PathSegment::Field(name) => write_field(f, name)?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::StarIndex => write!(f, "[*]")?,
                PathSegment::Star => write!(f, ".*")?,
            }
        }
        Ok(())
    }
}

struct Parser<'a> {
    expression: &'a str,
    chars: Vec<char>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            chars: expression.trim().chars().collect(),
            position: 0,
        }
    }

    fn parse(mut self) -> Result<PathExpression, PathError> {
        if self.chars.first() != Some(&'$') {
            return Err(PathError::MissingRoot(self.expression.to_string()));
        }
        self.position = 1;
        let mut segments = vec![PathSegment::Root];

        while let Some(&c) = self.chars.get(self.position) {
            match c {
                '.' => {
                    self.position += 1;
                    segments.push(self.field()?);
                }
                '[' => {
                    self.position += 1;
                    segments.push(self.bracket()?);
                }
                other => {
                    return Err(PathError::UnexpectedCharacter {
                        expression: self.expression.to_string(),
                        found: other,
                        position: self.position,
                    })
                }
            }
        }

        Ok(PathExpression { segments })
    }

    fn field(&mut self) -> Result<PathSegment, PathError> {
        if self.chars.get(self.position) == Some(&'*') {
            self.position += 1;
            return Ok(PathSegment::Star);
        }
        let start = self.position;
        while let Some(&c) = self.chars.get(self.position) {
            if c == '.' || c == '[' {
                break;
            }
            self.position += 1;
        }
        if start == self.position {
            return Err(PathError::EmptyField {
                expression: self.expression.to_string(),
                position: start,
            });
        }
        Ok(PathSegment::Field(
            self.chars[start..self.position].iter().collect(),
        ))
    }

    fn bracket(&mut self) -> Result<PathSegment, PathError> {
        let open = self.position - 1;
        match self.chars.get(self.position) {
            Some(&quote) if quote == '\'' || quote == '"' => {
                self.position += 1;
                let mut name = String::new();
                loop {
                    match self.chars.get(self.position) {
                        Some('\\') => {
                            if let Some(&escaped) = self.chars.get(self.position + 1) {
                                name.push(escaped);
                            }
                            self.position += 2;
                        }
                        Some(&c) if c == quote => {
                            self.position += 1;
                            break;
                        }
                        Some(&c) => {
                            name.push(c);
                            self.position += 1;
                        }
                        None => return Err(self.unterminated(open)),
                    }
                }
                self.expect_close(open)?;
                Ok(PathSegment::Field(name))
            }
            _ => {
                let start = self.position;
                while let Some(&c) = self.chars.get(self.position) {
                    if c == ']' {
                        break;
                    }
                    self.position += 1;
                }
                let content: String = self.chars[start..self.position].iter().collect();
                self.expect_close(open)?;
                let content = content.trim();
                if content == "*" {
                    Ok(PathSegment::StarIndex)
                } else {
                    content
                        .parse::<usize>()
                        .map(PathSegment::Index)
                        .map_err(|_| PathError::InvalidIndex {
                            expression: self.expression.to_string(),
                            index: content.to_string(),
                        })
                }
            }
        }
    }

    fn expect_close(&mut self, open: usize) -> Result<(), PathError> {
        if self.chars.get(self.position) == Some(&']') {
            self.position += 1;
            Ok(())
        } else {
            Err(self.unterminated(open))
        }
    }

    fn unterminated(&self, open: usize) -> PathError {
        PathError::UnterminatedBracket {
            expression: self.expression.to_string(),
            position: open,
        }
    }
}
