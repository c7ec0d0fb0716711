//! Indented, optionally colored rendering of serialized boxes.

use std::fmt::Write;

use koala_boxes::{SerializedBox, SerializedContent};
use owo_colors::OwoColorize;

/// Render `root` and its descendants, one box per line, children indented
/// by two spaces.
///
/// Text is quoted with newlines escaped and spaces shown as `·`, so white
/// space processing is visible.
pub fn render(root: &SerializedBox, colored: bool) -> String {
    let mut output = String::new();
    render_into(&mut output, root, 0, colored);
    output
}

fn render_into(output: &mut String, serialized: &SerializedBox, depth: usize, colored: bool) {
    let prefix = "  ".repeat(depth);
    let kind = serialized.kind.to_string();
    let (kind, tag) = if colored {
        (kind.cyan().to_string(), serialized.tag.green().to_string())
    } else {
        (kind, serialized.tag.clone())
    };
    match &serialized.content {
        SerializedContent::Text(text) => {
            let text = format!("\"{}\"", text.replace('\n', "\\n").replace(' ', "\u{00B7}"));
            let text = if colored { text.yellow().to_string() } else { text };
            let _ = writeln!(output, "{prefix}{kind} {tag} {text}");
        }
        SerializedContent::Children(children) => {
            let _ = writeln!(output, "{prefix}{kind} {tag}");
            for child in children {
                render_into(output, child, depth + 1, colored);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use koala_boxes::BoxKind;

    use super::*;

    fn leaf(text: &str) -> SerializedBox {
        SerializedBox {
            tag: "p".to_string(),
            kind: BoxKind::Text,
            content: SerializedContent::Text(text.to_string()),
        }
    }

    #[test]
    fn plain_tree_is_indented() {
        let line = SerializedBox {
            tag: "p".to_string(),
            kind: BoxKind::Line,
            content: SerializedContent::Children(vec![leaf("a b\n")]),
        };
        let block = SerializedBox {
            tag: "p".to_string(),
            kind: BoxKind::Block,
            content: SerializedContent::Children(vec![line]),
        };
        assert_eq!(
            render(&block, false),
            "Block p\n  Line p\n    Text p \"a\u{00B7}b\\n\"\n"
        );
    }

    #[test]
    fn colored_tree_contains_escape_codes() {
        let rendered = render(&leaf("x"), true);
        assert!(rendered.contains('\u{1b}'));
        assert!(rendered.contains("Text"));
    }
}
