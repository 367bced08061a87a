//! Token rules and the ordered catalogs that drive suspension.
//!
//! A [`TokenSpec`] names a regular expression plus three behaviour flags. A
//! [`TokenCatalog`] is an ordered list of specs; order is match priority, the
//! first spec matching at the cursor wins.

use regex::Regex;

use crate::{Result, SuspensionError};

/// One named lexical rule.
#[derive(Debug, Clone)]
pub struct TokenSpec {
    name: String,
    pattern: String,
    regex: Regex,
    must_be_at_line_start: bool,
    is_plain_text: bool,
    is_transparent_to_line_start: bool,
}

impl TokenSpec {
    /// Compiles `pattern` so that it only matches at the start of the input
    /// it is given.
    ///
    /// The suspender hands each spec only the unscanned rest of the document,
    /// so the pattern cannot see what precedes the cursor: `\b`, `^` and
    /// `(?m)^` all treat the cursor as the start of the text. Use
    /// [`at_line_start`](Self::at_line_start) to anchor on line starts.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| {
            SuspensionError::InvalidPattern {
                name: name.clone(),
                source: Box::new(source),
            }
        })?;
        Ok(Self {
            name,
            pattern: pattern.to_string(),
            regex,
            must_be_at_line_start: false,
            is_plain_text: false,
            is_transparent_to_line_start: false,
        })
    }

    /// A spec matching exactly `text`.
    pub fn literal(name: impl Into<String>, text: &str) -> Result<Self> {
        Self::new(name, &regex::escape(text))
    }

    /// Only try this spec at an effective line start.
    #[must_use]
    pub fn at_line_start(mut self) -> Self {
        self.must_be_at_line_start = true;
        self
    }

    /// Matched text is kept in the filtered text instead of becoming a mark.
    #[must_use]
    pub fn plain_text(mut self) -> Self {
        self.is_plain_text = true;
        self
    }

    /// Removing a mark of this line-start spec leaves the cursor at a line
    /// start, even when the mark swallowed the newline.
    #[must_use]
    pub fn transparent_to_line_start(mut self) -> Self {
        self.is_transparent_to_line_start = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern as written, without the anchor.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn must_be_at_line_start(&self) -> bool {
        self.must_be_at_line_start
    }

    pub fn is_plain_text(&self) -> bool {
        self.is_plain_text
    }

    pub fn is_transparent_to_line_start(&self) -> bool {
        self.is_transparent_to_line_start
    }

    /// Byte length of the match at the very start of `input`. Empty matches
    /// do not count; they would stall the scan.
    pub fn match_len(&self, input: &str) -> Option<usize> {
        self.regex
            .find(input)
            .map(|found| found.end())
            .filter(|len| *len > 0)
    }
}

/// Ordered, immutable list of token specs.
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    specs: Vec<TokenSpec>,
}

impl TokenCatalog {
    pub fn new(specs: Vec<TokenSpec>) -> Self {
        Self { specs }
    }

    /// Specs whose name is in `names`, in catalog order.
    #[must_use]
    pub fn restrict(&self, names: &[&str]) -> Self {
        self.specs
            .iter()
            .filter(|spec| names.contains(&spec.name()))
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&TokenSpec> {
        self.specs.iter().find(|spec| spec.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(TokenSpec::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<TokenSpec> for TokenCatalog {
    fn from_iter<I: IntoIterator<Item = TokenSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TokenCatalog {
    type Item = &'a TokenSpec;
    type IntoIter = std::slice::Iter<'a, TokenSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
