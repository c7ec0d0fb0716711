//! Generated content values: `content`, `quotes`, counters, `string-set`,
//! bookmarks and list styles.
//!
//! [CSS Generated Content Module Level 3](https://www.w3.org/TR/css-content-3/)
//! [CSS Lists and Counters Module Level 3](https://www.w3.org/TR/css-lists-3/)
//! [CSS Generated Content for Paged Media](https://www.w3.org/TR/css-gcpm-3/)

use std::str::FromStr;

use super::parse::{ValueToken, split_commas, tokenize};

/// [§ 5 Cross references](https://www.w3.org/TR/css-gcpm-3/#cross-references)
///
/// The first argument of `target-counter()`, `target-counters()` and
/// `target-text()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorRef {
    /// `url(#anchor)` or a string.
    Url(String),
    /// `attr(name)`, resolved to a [`AnchorRef::Url`] at computed-value time.
    Attr(String),
}

impl AnchorRef {
    /// The anchor name, without the leading `#`.
    ///
    /// Unresolved `attr()` references have no anchor.
    #[must_use]
    pub fn anchor_name(&self) -> Option<&str> {
        match self {
            Self::Url(url) => url.strip_prefix('#'),
            Self::Attr(_) => None,
        }
    }
}

/// One item of a content list.
///
/// [§ 1.2 Replacing Content](https://www.w3.org/TR/css-content-3/#content-property)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentToken {
    /// `<string>`: "The string is inserted as text."
    String(String),
    /// `<url>` pointing outside the document: an image.
    Url(String),
    /// `url(#fragment)`. Internal references generate nothing.
    InternalUrl(String),
    /// `attr(name)`. Replaced by a [`ContentToken::String`] at computed-value time.
    Attr(String),
    /// [§ 1.1 content()](https://www.w3.org/TR/css-gcpm-3/#content-function-header)
    ///
    /// `text`, `before`, `after` or `first-letter`.
    Content(String),
    /// [§ 1.1 string()](https://www.w3.org/TR/css-gcpm-3/#using-named-strings)
    StringFn {
        /// Named string.
        name: String,
        /// `first`, `start`, `last` or `first-except`.
        keyword: String,
    },
    /// [§ 4.1 counter()](https://www.w3.org/TR/css-lists-3/#counter-functions)
    Counter {
        /// Counter name.
        name: String,
        /// Counter style name.
        style: String,
    },
    /// [§ 4.1 counters()](https://www.w3.org/TR/css-lists-3/#counter-functions)
    Counters {
        /// Counter name.
        name: String,
        /// Separator between nested values.
        separator: String,
        /// Counter style name.
        style: String,
    },
    /// [§ 5.1 target-counter()](https://www.w3.org/TR/css-gcpm-3/#target-counter)
    TargetCounter {
        /// Referenced element.
        anchor: AnchorRef,
        /// Counter name.
        name: String,
        /// Counter style name.
        style: String,
    },
    /// [§ 5.2 target-counters()](https://www.w3.org/TR/css-gcpm-3/#target-counters)
    TargetCounters {
        /// Referenced element.
        anchor: AnchorRef,
        /// Counter name.
        name: String,
        /// Separator between nested values.
        separator: String,
        /// Counter style name.
        style: String,
    },
    /// [§ 5.3 target-text()](https://www.w3.org/TR/css-gcpm-3/#target-text)
    TargetText {
        /// Referenced element.
        anchor: AnchorRef,
        /// `content`, `before`, `after` or `first-letter`.
        part: String,
    },
    /// [§ 3 Quotes](https://www.w3.org/TR/css-content-3/#quotes)
    Quote {
        /// `open-quote` rather than `close-quote`.
        open: bool,
        /// `false` for `no-open-quote` and `no-close-quote`.
        insert: bool,
    },
    /// [§ 1.3 element()](https://www.w3.org/TR/css-gcpm-3/#running-elements)
    Element {
        /// Running element name.
        name: String,
        /// `first`, `start`, `last` or `first-except`.
        keyword: String,
    },
    /// [§ 2 leader()](https://www.w3.org/TR/css-gcpm-3/#leaders)
    ///
    /// The leader string; `dotted`, `solid` and `space` are already mapped.
    Leader(String),
}

impl ContentToken {
    fn parse(token: &ValueToken) -> Option<Self> {
        match token {
            ValueToken::String(string) => Some(Self::String(string.clone())),
            ValueToken::Url(url) => Some(if url.starts_with('#') {
                Self::InternalUrl(url.clone())
            } else {
                Self::Url(url.clone())
            }),
            ValueToken::Ident(ident) => match ident.to_ascii_lowercase().as_str() {
                "open-quote" => Some(Self::Quote { open: true, insert: true }),
                "close-quote" => Some(Self::Quote { open: false, insert: true }),
                "no-open-quote" => Some(Self::Quote { open: true, insert: false }),
                "no-close-quote" => Some(Self::Quote { open: false, insert: false }),
                _ => None,
            },
            ValueToken::Function { name, args } => Self::parse_function(name, args),
            _ => None,
        }
    }

    fn parse_function(name: &str, args: &[ValueToken]) -> Option<Self> {
        let args = split_commas(args);
        let ident = |i: usize| -> Option<String> {
            match args.get(i)? {
                [ValueToken::Ident(ident)] => Some(ident.clone()),
                _ => None,
            }
        };
        let string = |i: usize| -> Option<String> {
            match args.get(i)? {
                [ValueToken::String(string)] => Some(string.clone()),
                _ => None,
            }
        };
        let optional_ident = |i: usize, default: &str| -> Option<String> {
            if args.len() > i { ident(i) } else { Some(default.to_string()) }
        };
        let anchor = || -> Option<AnchorRef> {
            match args.first()? {
                [ValueToken::Url(url) | ValueToken::String(url)] => Some(AnchorRef::Url(url.clone())),
                [ValueToken::Function { name, args }] if name == "attr" => match args.as_slice() {
                    [ValueToken::Ident(attr)] => Some(AnchorRef::Attr(attr.clone())),
                    _ => None,
                },
                _ => None,
            }
        };
        let arity = |min: usize, max: usize| (min..=max).contains(&args.len());

        match name {
            "attr" if arity(1, 1) => ident(0).map(Self::Attr),
            "content" if arity(0, 1) => {
                let part = if args.first().is_none_or(|arg| arg.is_empty()) {
                    "text".to_string()
                } else {
                    ident(0)?
                };
                matches!(part.as_str(), "text" | "before" | "after" | "first-letter")
                    .then_some(Self::Content(part))
            }
            "string" if arity(1, 2) => Some(Self::StringFn {
                name: ident(0)?,
                keyword: optional_ident(1, "first")?,
            }),
            "counter" if arity(1, 2) => Some(Self::Counter {
                name: ident(0)?,
                style: optional_ident(1, "decimal")?,
            }),
            "counters" if arity(2, 3) => Some(Self::Counters {
                name: ident(0)?,
                separator: string(1)?,
                style: optional_ident(2, "decimal")?,
            }),
            "target-counter" if arity(2, 3) => Some(Self::TargetCounter {
                anchor: anchor()?,
                name: ident(1)?,
                style: optional_ident(2, "decimal")?,
            }),
            "target-counters" if arity(3, 4) => Some(Self::TargetCounters {
                anchor: anchor()?,
                name: ident(1)?,
                separator: string(2)?,
                style: optional_ident(3, "decimal")?,
            }),
            "target-text" if arity(1, 2) => {
                let part = optional_ident(1, "content")?;
                if !matches!(part.as_str(), "content" | "before" | "after" | "first-letter") {
                    return None;
                }
                Some(Self::TargetText { anchor: anchor()?, part })
            }
            "element" if arity(1, 2) => Some(Self::Element {
                name: ident(0)?,
                keyword: optional_ident(1, "first")?,
            }),
            "leader" if arity(1, 1) => {
                let leader = match (ident(0).as_deref(), string(0)) {
                    (Some("dotted"), _) => ".".to_string(),
                    (Some("solid"), _) => "_".to_string(),
                    (Some("space"), _) => " ".to_string(),
                    (_, Some(string)) => string,
                    _ => return None,
                };
                Some(Self::Leader(leader))
            }
            _ => None,
        }
    }
}

/// Parse a whitespace-separated content list.
///
/// # Errors
///
/// Fails on any token that is not a valid content item, including unknown
/// or malformed functions.
pub fn parse_content_list(input: &str) -> Result<Vec<ContentToken>, String> {
    let tokens = tokenize(input)?;
    parse_content_tokens(&tokens).ok_or_else(|| input.to_string())
}

fn parse_content_tokens(tokens: &[ValueToken]) -> Option<Vec<ContentToken>> {
    if tokens.is_empty() {
        return None;
    }
    tokens.iter().map(ContentToken::parse).collect()
}

/// Replace `attr()` references with the attribute values of an element.
///
/// "If the attribute is missing, the empty string is used."
pub fn resolve_attr_tokens<'a>(tokens: &mut [ContentToken], attribute: &impl Fn(&str) -> Option<&'a str>) {
    for token in tokens {
        match token {
            ContentToken::Attr(name) => {
                *token = ContentToken::String(attribute(name).unwrap_or_default().to_string());
            }
            ContentToken::TargetCounter { anchor, .. }
            | ContentToken::TargetCounters { anchor, .. }
            | ContentToken::TargetText { anchor, .. } => {
                if let AnchorRef::Attr(name) = anchor {
                    *anchor = AnchorRef::Url(attribute(name).unwrap_or_default().to_string());
                }
            }
            _ => {}
        }
    }
}

/// The `content` property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentValue {
    /// "For ::before and ::after, this computes to none."
    #[default]
    Normal,
    /// "The element or pseudo-element generates no boxes"
    None,
    /// [§ 1.4 Inhibiting footnote calls](https://www.w3.org/TR/css-gcpm-3/)
    /// `inhibit`: no `::footnote-call` and no `::marker`.
    Inhibit,
    /// A content list.
    List(Vec<ContentToken>),
}

impl FromStr for ContentValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "none" => Ok(Self::None),
            "inhibit" => Ok(Self::Inhibit),
            _ => parse_content_list(s).map(Self::List),
        }
    }
}

/// [§ 3.1 Specifying quotes with the quotes property](https://www.w3.org/TR/css-content-3/#quotes-property)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Quotes {
    /// "The open-quote and close-quote values of the content property
    /// produce no quotation marks"
    None,
    /// "A typographically appropriate used value for quotes is automatically
    /// chosen by the UA"
    #[default]
    Auto,
    /// `(open, close)` pairs from the outermost level in.
    Pairs(Vec<(String, String)>),
}

impl Quotes {
    /// The open and close strings for each nesting depth.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        match self {
            Self::None => Vec::new(),
            Self::Auto => vec![
                ("\u{201c}".to_string(), "\u{201d}".to_string()),
                ("\u{2018}".to_string(), "\u{2019}".to_string()),
            ],
            Self::Pairs(pairs) => pairs.clone(),
        }
    }
}

impl FromStr for Quotes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => return Ok(Self::None),
            "auto" => return Ok(Self::Auto),
            _ => {}
        }
        let tokens = tokenize(s)?;
        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return Err(s.to_string());
        }
        tokens
            .chunks(2)
            .map(|pair| match pair {
                [ValueToken::String(open), ValueToken::String(close)] => {
                    Ok((open.clone(), close.clone()))
                }
                _ => Err(s.to_string()),
            })
            .collect::<Result<_, _>>()
            .map(Self::Pairs)
    }
}

/// [§ 3.1 list-style-type](https://www.w3.org/TR/css-lists-3/#text-markers)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStyleType {
    /// No marker text.
    None,
    /// A counter style name.
    Named(String),
    /// "The `<string>` is used as the marker text."
    String(String),
}

impl Default for ListStyleType {
    fn default() -> Self {
        Self::Named("disc".to_string())
    }
}

impl FromStr for ListStyleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match tokenize(s)?.as_slice() {
            [ValueToken::Ident(ident)] if ident.eq_ignore_ascii_case("none") => Ok(Self::None),
            [ValueToken::Ident(ident)] => Ok(Self::Named(ident.to_ascii_lowercase())),
            [ValueToken::String(string)] => Ok(Self::String(string.clone())),
            _ => Err(s.to_string()),
        }
    }
}

/// [§ 3.2 list-style-image](https://www.w3.org/TR/css-lists-3/#image-markers)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListStyleImage {
    /// No image.
    #[default]
    None,
    /// An image URL.
    Url(String),
}

impl FromStr for ListStyleImage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match tokenize(s)?.as_slice() {
            [ValueToken::Ident(ident)] if ident.eq_ignore_ascii_case("none") => Ok(Self::None),
            [ValueToken::Url(url)] => Ok(Self::Url(url.clone())),
            _ => Err(s.to_string()),
        }
    }
}

/// [§ 4.2 Manipulating Counter Values](https://www.w3.org/TR/css-lists-3/#counter-properties)
///
/// `[<counter-name> <integer>?]+ | none`, where a missing integer defaults
/// to `DEFAULT` (0 for `counter-reset` and `counter-set`, 1 for
/// `counter-increment`). Names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterList<const DEFAULT: i32>(pub Vec<(String, i32)>);

impl<const DEFAULT: i32> FromStr for CounterList<DEFAULT> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        if let [ValueToken::Ident(ident)] = tokens.as_slice()
            && ident.eq_ignore_ascii_case("none")
        {
            return Ok(Self::default());
        }
        let mut counters = Vec::new();
        let mut tokens = tokens.iter().peekable();
        while let Some(token) = tokens.next() {
            let ValueToken::Ident(name) = token else {
                return Err(s.to_string());
            };
            if matches!(name.to_ascii_lowercase().as_str(), "none" | "initial" | "inherit") {
                return Err(s.to_string());
            }
            let value = match tokens.peek().and_then(|t| t.as_integer()) {
                Some(value) => {
                    let _ = tokens.next();
                    value
                }
                None => DEFAULT,
            };
            counters.push((name.clone(), value));
        }
        if counters.is_empty() {
            return Err(s.to_string());
        }
        Ok(Self(counters))
    }
}

/// `counter-reset` and `counter-set` values.
pub type CounterValues = CounterList<0>;

/// [§ 4.2 counter-increment](https://www.w3.org/TR/css-lists-3/#increment-counter)
///
/// `auto` is the initial value: list items increment `list-item` by one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CounterIncrement {
    /// Not declared.
    #[default]
    Auto,
    /// Declared increments (possibly empty for `none`).
    List(CounterList<1>),
}

impl FromStr for CounterIncrement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::List)
    }
}

/// [§ 1.1 string-set](https://www.w3.org/TR/css-gcpm-3/#setting-named-strings-the-string-set-pro)
///
/// `[<custom-ident> <content-list>]# | none`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringSet(pub Vec<(String, Vec<ContentToken>)>);

impl FromStr for StringSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        if let [ValueToken::Ident(ident)] = tokens.as_slice()
            && ident.eq_ignore_ascii_case("none")
        {
            return Ok(Self::default());
        }
        split_commas(&tokens)
            .into_iter()
            .map(|entry| match entry {
                [ValueToken::Ident(name), rest @ ..] => parse_content_tokens(rest)
                    .map(|list| (name.clone(), list))
                    .ok_or_else(|| s.to_string()),
                _ => Err(s.to_string()),
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

/// [§ 3.1 bookmark-label](https://www.w3.org/TR/css-gcpm-3/#bookmark-label)
///
/// Initial value: `content(text)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkLabel(pub Vec<ContentToken>);

impl Default for BookmarkLabel {
    fn default() -> Self {
        Self(vec![ContentToken::Content("text".to_string())])
    }
}

impl FromStr for BookmarkLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(Self(Vec::new()));
        }
        parse_content_list(s).map(Self)
    }
}

/// [§ 3.2 bookmark-level](https://www.w3.org/TR/css-gcpm-3/#bookmark-level)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookmarkLevel {
    /// "No bookmark is generated."
    #[default]
    None,
    /// A positive level.
    Level(u32),
}

impl FromStr for BookmarkLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        match value.parse::<u32>() {
            Ok(level) if level > 0 => Ok(Self::Level(level)),
            _ => Err(s.to_string()),
        }
    }
}

/// The `anchor` property: names the element as a link target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Not an anchor.
    #[default]
    None,
    /// Anchor name.
    Name(String),
    /// `attr(name)`, resolved to [`Anchor::Name`] at computed-value time.
    Attr(String),
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match tokenize(s)?.as_slice() {
            [ValueToken::Ident(ident)] if ident.eq_ignore_ascii_case("none") => Ok(Self::None),
            [ValueToken::Ident(ident)] => Ok(Self::Name(ident.clone())),
            [ValueToken::Function { name, args }] if name == "attr" => match args.as_slice() {
                [ValueToken::Ident(attr)] => Ok(Self::Attr(attr.clone())),
                _ => Err(s.to_string()),
            },
            _ => Err(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_lists() {
        assert_eq!(
            "counter(p) '. '".parse(),
            Ok(ContentValue::List(vec![
                ContentToken::Counter {
                    name: "p".to_string(),
                    style: "decimal".to_string()
                },
                ContentToken::String(". ".to_string()),
            ]))
        );
        assert_eq!("normal".parse(), Ok(ContentValue::Normal));
        assert_eq!(
            "leader(dotted)".parse(),
            Ok(ContentValue::List(vec![ContentToken::Leader(".".to_string())]))
        );
    }

    #[test]
    fn rejects_unknown_and_nested_functions() {
        assert!("counter(x".parse::<ContentValue>().is_err());
        assert!("attr(title(x))".parse::<ContentValue>().is_err());
        assert!("unknown(a)".parse::<ContentValue>().is_err());
    }

    #[test]
    fn resolves_attr_references() {
        let mut tokens = parse_content_list("'[' attr(href) ']'").unwrap();
        resolve_attr_tokens(&mut tokens, &|name| (name == "href").then_some("#x"));
        assert_eq!(tokens[1], ContentToken::String("#x".to_string()));
    }

    #[test]
    fn counter_lists_use_default_values() {
        let reset: CounterValues = "p 117 p".parse().unwrap();
        assert_eq!(reset.0, vec![("p".to_string(), 117), ("p".to_string(), 0)]);
        let increment: CounterIncrement = "p".parse().unwrap();
        assert_eq!(increment, CounterIncrement::List(CounterList(vec![("p".to_string(), 1)])));
    }

    #[test]
    fn parses_string_set() {
        let set: StringSet = "title content(text), chapter 'x'".parse().unwrap();
        assert_eq!(set.0.len(), 2);
        assert_eq!(set.0[1].0, "chapter");
    }

    #[test]
    fn parses_quotes() {
        let quotes: Quotes = "'«' '»' '“' '”'".parse().unwrap();
        assert_eq!(quotes.pairs()[0], ("«".to_string(), "»".to_string()));
        assert!("'a'".parse::<Quotes>().is_err());
    }
}
