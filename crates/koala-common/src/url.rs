//! URL resolution utilities.
//!
//! [URL Standard](https://url.spec.whatwg.org/)

/// [§ 4.1 URL representation](https://url.spec.whatwg.org/#url-representation)
///
/// "An absolute-URL string is a URL-scheme string, followed by U+003A (:),
/// followed by a scheme-specific part."
///
/// A scheme starts with an ASCII letter followed by letters, digits,
/// `+`, `-` or `.`. Single-letter schemes are treated as Windows drive
/// letters, not schemes.
#[must_use]
pub fn is_absolute_url(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    scheme.len() > 1
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Why a URL could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    /// A relative reference with no base URL to resolve it against.
    #[error("Relative URI reference without a base URI: \"{0}\"")]
    MissingBase(String),
}

/// The fragment of `url` (text after `#`), if any.
#[must_use]
pub fn url_fragment(url: &str) -> Option<&str> {
    url.split_once('#').map(|(_, fragment)| fragment)
}

/// Resolve a potentially relative URL against a base URL.
///
/// # Algorithm
///
/// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// # Errors
///
/// Returns [`UrlError::MissingBase`] when `href` is relative and there is
/// no base to resolve it against.
///
/// NOTE: This is a simplified implementation of the URL Standard's basic
/// URL parser: it handles scheme-relative, path-absolute and path-relative
/// references, and removes dot segments.
pub fn resolve_url(href: &str, base_url: Option<&str>) -> Result<String, UrlError> {
    let href = href.trim();

    // STEP 1: Check if href is already absolute.
    if is_absolute_url(href) {
        return Ok(href.to_string());
    }

    // STEP 2: Resolve relative URL against base.
    let base = base_url.ok_or_else(|| UrlError::MissingBase(href.to_string()))?;

    if href.is_empty() {
        return Ok(base.to_string());
    }

    if let Some(fragment) = href.strip_prefix('#') {
        let without_fragment = base.split_once('#').map_or(base, |(url, _)| url);
        return Ok(format!("{without_fragment}#{fragment}"));
    }

    // "scheme-relative-special-URL string": "//" followed by a host.
    if href.starts_with("//") {
        let scheme = base.split_once(':').map_or("http", |(scheme, _)| scheme);
        return Ok(format!("{scheme}:{href}"));
    }

    let (origin, base_path) = split_origin(base);

    if href.starts_with('/') {
        return Ok(format!("{origin}{}", remove_dot_segments(href)));
    }

    // Relative path: join with the base directory.
    let base_dir = base_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit_once('/')
        .map_or("", |(dir, _)| dir);
    Ok(format!(
        "{origin}{}",
        remove_dot_segments(&format!("{base_dir}/{href}"))
    ))
}

/// Split a base URL into its origin part (scheme and authority) and its path.
///
/// For `file:` URLs and plain paths the origin may be empty.
fn split_origin(base: &str) -> (&str, &str) {
    if let Some(scheme_end) = base.find("://") {
        let after_scheme = &base[scheme_end + 3..];
        return after_scheme.find('/').map_or((base, ""), |path_start| {
            base.split_at(scheme_end + 3 + path_start)
        });
    }
    if let Some(path) = base.strip_prefix("file:") {
        return base.split_at(base.len() - path.len());
    }
    ("", base)
}

/// [RFC 3986 § 5.2.4 Remove Dot Segments](https://www.rfc-editor.org/rfc/rfc3986#section-5.2.4)
fn remove_dot_segments(path: &str) -> String {
    let (path, suffix) = path
        .find(['?', '#'])
        .map_or((path, ""), |at| path.split_at(at));

    let mut output: Vec<&str> = Vec::new();
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if i == last {
                    output.push("");
                }
            }
            ".." => {
                if output.len() > 1 {
                    let _ = output.pop();
                }
                if i == last {
                    output.push("");
                }
            }
            other => output.push(other),
        }
    }
    format!("{}{suffix}", output.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_are_returned_unchanged() {
        assert_eq!(
            resolve_url("https://example.com/a.png", Some("file:///tmp/")).ok().as_deref(),
            Some("https://example.com/a.png")
        );
        assert_eq!(
            resolve_url("data:image/png;base64,AAAA", None).ok().as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn relative_url_without_base_is_unresolvable() {
        let error = resolve_url(" pattern.png", None).unwrap_err();
        assert_eq!(error, UrlError::MissingBase("pattern.png".to_string()));
        assert_eq!(
            error.to_string(),
            "Relative URI reference without a base URI: \"pattern.png\""
        );
    }

    #[test]
    fn relative_paths_join_the_base_directory() {
        assert_eq!(
            resolve_url("pattern.png", Some("https://example.com/docs/index.html")).ok().as_deref(),
            Some("https://example.com/docs/pattern.png")
        );
        assert_eq!(
            resolve_url("../img/a.png", Some("https://example.com/docs/sub/index.html"))
                .ok()
                .as_deref(),
            Some("https://example.com/docs/img/a.png")
        );
        assert_eq!(
            resolve_url("a.png", Some("file:///tmp/resources/")).ok().as_deref(),
            Some("file:///tmp/resources/a.png")
        );
    }

    #[test]
    fn path_absolute_and_scheme_relative() {
        assert_eq!(
            resolve_url("/a.png", Some("https://example.com/docs/index.html")).ok().as_deref(),
            Some("https://example.com/a.png")
        );
        assert_eq!(
            resolve_url("//cdn.example.com/a.png", Some("https://example.com/")).ok().as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn fragments() {
        assert_eq!(
            resolve_url("#note", Some("https://example.com/doc.html#top")).ok().as_deref(),
            Some("https://example.com/doc.html#note")
        );
        assert_eq!(url_fragment("doc.html#note"), Some("note"));
        assert_eq!(url_fragment("doc.html"), None);
    }

    #[test]
    fn drive_letters_are_not_schemes() {
        assert!(!is_absolute_url("c:/images/a.png"));
        assert!(is_absolute_url("file:///c:/images/a.png"));
    }
}
