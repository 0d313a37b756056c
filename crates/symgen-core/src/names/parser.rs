//! Recursive-descent scanner for qualified template names.

use crate::error::{GenError, GenResult};

/// A parsed qualified name: one [`Scope`] per `::`-separated segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName
{
    scopes: Vec<Scope>,
}

/// One segment of a qualified name.
///
/// `arguments` is empty for non-template segments; for template segments it
/// holds one parsed name per top-level argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope
{
    pub bare_name: String,
    pub arguments: Vec<ParsedName>,
}

impl Scope
{
    #[must_use]
    pub fn is_template(&self) -> bool
    {
        !self.arguments.is_empty()
    }

    /// Render this scope back to text, arguments included.
    #[must_use]
    pub fn render(&self) -> String
    {
        if self.arguments.is_empty() {
            return self.bare_name.clone();
        }
        let arguments: Vec<String> = self.arguments.iter().map(ParsedName::render).collect();
        format!("{}<{}>", self.bare_name, arguments.join(","))
    }
}

impl ParsedName
{
    /// Parse a qualified name, balancing `<` / `>` and splitting `,` only at
    /// the top argument level.
    ///
    /// ## Errors
    ///
    /// Returns `GenError::NameSyntax` for mismatched brackets, an empty scope
    /// name, a lone `:`, or trailing characters after an argument list.
    pub fn parse(input: &str) -> GenResult<Self>
    {
        let mut scanner = Scanner::new(input);
        let name = scanner.parse_name()?;
        scanner.skip_whitespace();
        if !scanner.at_end() {
            return Err(scanner.syntax_error(format!("unexpected `{}`", scanner.peek_char())));
        }
        Ok(name)
    }

    #[must_use]
    pub fn scopes(&self) -> &[Scope]
    {
        &self.scopes
    }

    /// The innermost scope. A parsed name always has at least one.
    #[must_use]
    pub fn last_scope(&self) -> &Scope
    {
        self.scopes.last().expect("parsed name has at least one scope")
    }

    /// True when the innermost scope carries template arguments.
    #[must_use]
    pub fn is_template(&self) -> bool
    {
        self.last_scope().is_template()
    }

    /// Template arguments of the innermost scope (empty for plain names).
    #[must_use]
    pub fn template_arguments(&self) -> &[ParsedName]
    {
        &self.last_scope().arguments
    }

    /// All scopes but the last, rendered; the name's enclosing namespaces
    /// and classes.
    #[must_use]
    pub fn namespaces(&self) -> Vec<String>
    {
        self.scopes[..self.scopes.len() - 1].iter().map(Scope::render).collect()
    }

    /// The template-family lookup key: every argument list collapsed to `<>`.
    ///
    /// `Vec<int>` and `Vec<Vec<float>>` both map to `Vec<>`; non-template
    /// names map to themselves.
    #[must_use]
    pub fn family_name(&self) -> String
    {
        let segments: Vec<String> = self
            .scopes
            .iter()
            .map(|scope| {
                if scope.is_template() {
                    format!("{}<>", scope.bare_name)
                } else {
                    scope.bare_name.clone()
                }
            })
            .collect();
        segments.join("::")
    }

    /// Reconstruct the textual name. Canonical: no whitespace around commas.
    #[must_use]
    pub fn render(&self) -> String
    {
        let segments: Vec<String> = self.scopes.iter().map(Scope::render).collect();
        segments.join("::")
    }
}

/// The text of a name's innermost scope, without parsing.
///
/// Splits on `::` at bracket depth zero only, so `A<B::C>::D` yields `D`.
/// Used by the collect filter and the anonymous-UDT check, which must run on
/// names the full parser rejects (anonymous scopes have no bare name).
#[must_use]
pub fn last_scope_text(name: &str) -> &str
{
    let bytes = name.as_bytes();
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut index = 0usize;
    while index < bytes.len() {
        match bytes[index] {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b':' if depth == 0 && bytes.get(index + 1) == Some(&b':') => {
                start = index + 2;
                index += 1;
            }
            _ => {}
        }
        index += 1;
    }
    &name[start..]
}

struct Scanner<'a>
{
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a>
{
    fn new(input: &'a str) -> Self
    {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool
    {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8>
    {
        self.bytes.get(self.pos).copied()
    }

    fn peek_char(&self) -> char
    {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn bump(&mut self)
    {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self)
    {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn syntax_error(&self, details: String) -> GenError
    {
        GenError::NameSyntax {
            name: self.input.to_string(),
            details: format!("{details} at offset {}", self.pos),
        }
    }

    /// Parse scopes separated by `::` until end of input or a terminator
    /// (`,` or `>`) belonging to an enclosing argument list.
    fn parse_name(&mut self) -> GenResult<ParsedName>
    {
        let mut scopes = vec![self.parse_scope()?];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b':') => {
                    self.bump();
                    if self.peek() != Some(b':') {
                        return Err(self.syntax_error("expected `::`".to_string()));
                    }
                    self.bump();
                    scopes.push(self.parse_scope()?);
                }
                _ => break,
            }
        }
        Ok(ParsedName { scopes })
    }

    fn parse_scope(&mut self) -> GenResult<Scope>
    {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b'<' | b'>' | b',' | b':') {
                break;
            }
            self.bump();
        }
        let bare_name = self.input[start..self.pos].trim_end().to_string();
        if bare_name.is_empty() {
            return Err(self.syntax_error("empty scope name".to_string()));
        }

        if self.peek() != Some(b'<') {
            if self.peek() == Some(b'>') && !self.closes_enclosing_list() {
                return Err(self.syntax_error("unmatched `>`".to_string()));
            }
            return Ok(Scope {
                bare_name,
                arguments: Vec::new(),
            });
        }

        self.bump();
        let mut arguments = Vec::new();
        loop {
            arguments.push(self.parse_name()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b'>') => {
                    self.bump();
                    break;
                }
                None => return Err(self.syntax_error("unterminated template argument list".to_string())),
                Some(_) => return Err(self.syntax_error(format!("unexpected `{}`", self.peek_char()))),
            }
        }

        // The scope must end here; only `::`, `,`, `>` or end of input may follow.
        self.skip_whitespace();
        match self.peek() {
            None | Some(b':') | Some(b',') | Some(b'>') => {}
            Some(_) => {
                return Err(self.syntax_error(format!(
                    "unexpected `{}` after template argument list",
                    self.peek_char()
                )))
            }
        }

        Ok(Scope { bare_name, arguments })
    }

    /// Whether a `>` at the current position can close an argument list we
    /// are inside of. The scanner only recurses through `parse_scope`'s
    /// argument loop, so we detect that by looking for an unmatched `<`
    /// before the current position.
    fn closes_enclosing_list(&self) -> bool
    {
        let mut depth = 0i32;
        for byte in &self.bytes[..self.pos] {
            match byte {
                b'<' => depth += 1,
                b'>' => depth -= 1,
                _ => {}
            }
        }
        depth > 0
    }
}
