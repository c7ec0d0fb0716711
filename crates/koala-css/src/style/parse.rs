//! Property value tokenizer.
//!
//! [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization)
//!
//! Declarations reach the style system one property at a time, so only the
//! value grammar is needed: identifiers, strings, numbers, dimensions,
//! percentages, hashes, `url()` and nested functions. Whitespace and
//! comments are dropped; commas are kept because several properties
//! (`counters()`, `string-set`, `quotes` pairs) depend on them.

use std::fmt;

/// A component value of a property value.
///
/// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
#[derive(Debug, Clone, PartialEq)]
pub enum ValueToken {
    /// `<ident-token>`
    Ident(String),
    /// `<string-token>`, escapes already resolved
    String(String),
    /// `<number-token>`
    Number {
        /// Numeric value.
        value: f64,
        /// "type flag": whether the number was written as an integer.
        integer: bool,
    },
    /// `<percentage-token>`
    Percentage(f64),
    /// `<dimension-token>`
    Dimension {
        /// Numeric value.
        value: f64,
        /// Unit, lowercased.
        unit: String,
    },
    /// `<hash-token>`
    Hash(String),
    /// `<url-token>`, or a `url()` function with a single string argument
    Url(String),
    /// A function with its arguments, commas included.
    Function {
        /// Function name, lowercased.
        name: String,
        /// Arguments in order.
        args: Vec<ValueToken>,
    },
    /// `<comma-token>`
    Comma,
    /// `<delim-token>`
    Delim(char),
}

impl ValueToken {
    /// The identifier value, if this is an ident token.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// The integer value, if this is an integer number token.
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            #[allow(clippy::cast_possible_truncation)]
            Self::Number {
                value,
                integer: true,
            } => Some(*value as i32),
            _ => None,
        }
    }
}

impl fmt::Display for ValueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(ident) => f.write_str(ident),
            Self::String(string) => write!(f, "{string:?}"),
            Self::Number { value, .. } => write!(f, "{value}"),
            Self::Percentage(value) => write!(f, "{value}%"),
            Self::Dimension { value, unit } => write!(f, "{value}{unit}"),
            Self::Hash(hash) => write!(f, "#{hash}"),
            Self::Url(url) => write!(f, "url({url})"),
            Self::Function { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Self::Comma => f.write_str(","),
            Self::Delim(c) => write!(f, "{c}"),
        }
    }
}

/// Write component values separated by spaces (commas glued to the
/// preceding value).
///
/// # Errors
///
/// Propagates formatter errors.
pub fn write_list(f: &mut fmt::Formatter<'_>, tokens: &[ValueToken]) -> fmt::Result {
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && *token != ValueToken::Comma {
            f.write_str(" ")?;
        }
        write!(f, "{token}")?;
    }
    Ok(())
}

/// Split tokens on top-level commas.
#[must_use]
pub fn split_commas(tokens: &[ValueToken]) -> Vec<&[ValueToken]> {
    tokens.split(|t| *t == ValueToken::Comma).collect()
}

/// Tokenize a property value.
///
/// # Errors
///
/// Returns a description of the problem for unterminated functions or
/// stray closing parentheses.
pub fn tokenize(input: &str) -> Result<Vec<ValueToken>, String> {
    let mut tokenizer = ValueTokenizer {
        input: input.chars().collect(),
        position: 0,
    };
    let tokens = tokenizer.consume_list(false)?;
    Ok(tokens)
}

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
struct ValueTokenizer {
    input: Vec<char>,
    position: usize,
}

impl ValueTokenizer {
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    /// Consume component values until EOF, or until the `)` closing the
    /// current function when `in_function` is set.
    fn consume_list(&mut self, in_function: bool) -> Result<Vec<ValueToken>, String> {
        let mut tokens = Vec::new();
        loop {
            self.consume_whitespace_and_comments();
            let Some(c) = self.peek() else {
                if in_function {
                    return Err("unterminated function".to_string());
                }
                return Ok(tokens);
            };
            match c {
                ')' => {
                    self.position += 1;
                    if in_function {
                        return Ok(tokens);
                    }
                    return Err("unexpected ')'".to_string());
                }
                '"' | '\'' => {
                    self.position += 1;
                    tokens.push(ValueToken::String(self.consume_string(c)));
                }
                ',' => {
                    self.position += 1;
                    tokens.push(ValueToken::Comma);
                }
                '#' => {
                    self.position += 1;
                    let name = self.consume_name();
                    if name.is_empty() {
                        tokens.push(ValueToken::Delim('#'));
                    } else {
                        tokens.push(ValueToken::Hash(name));
                    }
                }
                _ if self.starts_number() => tokens.push(self.consume_numeric()),
                _ if self.starts_ident() => tokens.push(self.consume_ident_like()?),
                _ => {
                    self.position += 1;
                    tokens.push(ValueToken::Delim(c));
                }
            }
        }
    }

    fn consume_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.position += 1;
            }
            // [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
            if self.peek() == Some('/') && self.peek_at(1) == Some('*') {
                self.position += 2;
                while self.peek().is_some() && !(self.peek() == Some('*') && self.peek_at(1) == Some('/')) {
                    self.position += 1;
                }
                self.position = (self.position + 2).min(self.input.len());
            } else {
                return;
            }
        }
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string(&mut self, ending_code_point: char) -> String {
        let mut value = String::new();
        while let Some(c) = self.consume() {
            match c {
                c if c == ending_code_point => break,
                '\\' => match self.peek() {
                    None => {}
                    Some('\n') => self.position += 1,
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },
                c => value.push(c),
            }
        }
        value
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 {
                    match self.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex.push(c);
                            self.position += 1;
                        }
                        _ => break,
                    }
                }
                // "If the next input code point is whitespace, consume it."
                if self.peek().is_some_and(char::is_whitespace) {
                    self.position += 1;
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&code_point| code_point != 0)
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }
            Some(c) => c,
            None => '\u{FFFD}',
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn starts_number(&self) -> bool {
        match self.peek() {
            Some('+' | '-') => match self.peek_at(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('.') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            },
            Some('.') => self.peek_at(1).is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn starts_ident(&self) -> bool {
        let is_start = |c: Option<char>| c.is_some_and(|c| c.is_alphabetic() || c == '_' || !c.is_ascii());
        match self.peek() {
            Some('-') => is_start(self.peek_at(1)) || self.peek_at(1) == Some('-'),
            Some('\\') => true,
            c => is_start(c),
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                name.push(c);
                self.position += 1;
            } else if c == '\\' && self.peek_at(1).is_some_and(|c| c != '\n') {
                self.position += 1;
                name.push(self.consume_escaped_code_point());
            } else {
                break;
            }
        }
        name
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric(&mut self) -> ValueToken {
        let mut repr = String::new();
        let mut integer = true;
        if let Some(sign @ ('+' | '-')) = self.peek() {
            repr.push(sign);
            self.position += 1;
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                repr.push(c);
                self.position += 1;
            } else if c == '.' && integer && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                integer = false;
                repr.push(c);
                self.position += 1;
            } else {
                break;
            }
        }
        let value = repr.parse::<f64>().unwrap_or(0.0);
        if self.peek() == Some('%') {
            self.position += 1;
            return ValueToken::Percentage(value);
        }
        if self.starts_ident() {
            let unit = self.consume_name().to_ascii_lowercase();
            return ValueToken::Dimension { value, unit };
        }
        ValueToken::Number { value, integer }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like(&mut self) -> Result<ValueToken, String> {
        let name = self.consume_name();
        if self.peek() != Some('(') {
            return Ok(ValueToken::Ident(name));
        }
        self.position += 1;
        let lower = name.to_ascii_lowercase();
        if lower == "url" {
            self.consume_whitespace_and_comments();
            if !matches!(self.peek(), Some('"' | '\'')) {
                return self.consume_url();
            }
        }
        let args = self.consume_list(true)?;
        if lower == "url" {
            if let [ValueToken::String(url)] = args.as_slice() {
                return Ok(ValueToken::Url(url.clone()));
            }
            return Err("invalid url()".to_string());
        }
        Ok(ValueToken::Function { name: lower, args })
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url(&mut self) -> Result<ValueToken, String> {
        let mut url = String::new();
        loop {
            match self.consume() {
                Some(')') => return Ok(ValueToken::Url(url.trim_end().to_string())),
                Some('\\') => url.push(self.consume_escaped_code_point()),
                Some(c) => url.push(c),
                None => return Err("unterminated url()".to_string()),
            }
        }
    }
}
