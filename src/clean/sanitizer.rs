//! Text sanitization.
//!
//! Scraped news bodies arrive wrapped in style sheets, markup, tracking
//! links and byline boilerplate. [`TextSanitizer::clean`] removes all of it
//! with a fixed sequence of passes; each pass sees the output of the
//! previous one.

use regex::Regex;
use scraper::{Html, Node};
use std::sync::LazyLock;

/// Brace-delimited style rules, including the two wrapper classes that the
/// generic rule pattern alone leaves partially intact.
static STYLE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"ct_hqimg\s*\{[^}]*\}",
        r"\.hqimg_wrapper\s*\{[^}]*\}",
        r"[a-zA-Z0-9_\-.]+\s*\{[^}]*\}",
        r"(?is)<style[^>]*>.*?</style>",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]+>").ok());

static ATTRIBUTE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(class|id|style)=["'][^"']+["']"#).ok());

static SCRIPT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").ok());

static URL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"https?://\S+").ok());

/// Attribution and byline markers. Each pattern consumes the marker and the
/// text up to its natural terminator.
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"图片来源：.*?网络",
        r"来源：.*?网",
        r"编辑：.*?[\s,，。；;]",
        r"记者：.*?[\s,，。；;]",
        r"责任编辑：.*?[\s,，。；;]",
        r"作者：.*?[\s,，。；;]",
        r"发布时间：.*?[\s,，。；;]",
        r"更新时间：.*?[\s,，。；;]",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Stateless text-cleaning transform.
///
/// The output depends only on the input text.
///
/// # Example
///
/// ```
/// use newsflow::TextSanitizer;
///
/// let cleaned = TextSanitizer::clean("<p>Hello&nbsp;<b>world</b></p> https://t.co/x");
/// assert_eq!(cleaned, "Hello world");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSanitizer;

impl TextSanitizer {
    /// Cleans a piece of text.
    ///
    /// Passes, in order:
    /// 1. strip brace-delimited style rules and `<style>` blocks
    /// 2. decode HTML character entities
    /// 3. strip markup tags
    /// 4. strip inline `class`/`id`/`style` attributes and `<script>` blocks
    /// 5. strip URLs
    /// 6. strip byline boilerplate
    /// 7. collapse whitespace, drop control characters, trim
    #[must_use]
    pub fn clean(text: &str) -> String {
        let mut text = text.to_string();

        for rule in STYLE_RULES.iter() {
            text = rule.replace_all(&text, "").into_owned();
        }

        text = decode_entities(&text);
        text = strip_markup(&text);

        text = replace(ATTRIBUTE.as_ref(), &text, " ");
        text = replace(SCRIPT.as_ref(), &text, " ");
        text = replace(URL.as_ref(), &text, "");

        for pattern in BOILERPLATE.iter() {
            text = pattern.replace_all(&text, "").into_owned();
        }

        text = replace(WHITESPACE.as_ref(), &text, " ");
        text.retain(|c| !c.is_ascii_control());
        text.trim().to_string()
    }

    /// Returns the length of `text` in characters.
    #[must_use]
    pub fn char_len(text: &str) -> usize {
        text.chars().count()
    }
}

fn replace(pattern: Option<&Regex>, text: &str, with: &str) -> String {
    pattern.map_or_else(
        || text.to_string(),
        |re| re.replace_all(text, with).into_owned(),
    )
}

/// Decodes named and numeric character references.
///
/// Angle brackets are escaped first so the parser sees a single text run
/// and never builds elements.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(&text.replace('<', "&lt;"));
    fragment.root_element().text().collect()
}

/// Removes markup, keeping only text content.
///
/// Text that looks like markup goes through the HTML parser, which drops
/// the contents of `<script>` and `<style>` elements as well. Anything else
/// gets the tag-pattern fallback.
fn strip_markup(text: &str) -> String {
    if !(text.contains('<') && text.contains('>')) {
        return replace(TAG.as_ref(), text, " ");
    }

    let fragment = Html::parse_fragment(text);
    let mut out = String::with_capacity(text.len());
    for node in fragment.tree.nodes() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style"))
        });
        if !hidden {
            out.push_str(chunk);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(".hqimg_wrapper { width: 100%; }Body text", "Body text"; "wrapper rule")]
    #[test_case("ct_hqimg{margin:0}Body", "Body"; "hqimg rule")]
    #[test_case("p.lead { color: red }Story", "Story"; "generic rule")]
    #[test_case("<style type=\"text/css\">\np { color: red; }\n</style>Story", "Story"; "style block")]
    fn test_style_rules_removed(input: &str, expected: &str) {
        assert_eq!(TextSanitizer::clean(input), expected);
    }

    #[test_case("Tom &amp; Jerry", "Tom & Jerry"; "named")]
    #[test_case("caf&#233;", "café"; "decimal")]
    #[test_case("&#x4E2D;文", "中文"; "hex")]
    #[test_case("no entities here", "no entities here"; "untouched")]
    fn test_entities_decoded(input: &str, expected: &str) {
        assert_eq!(TextSanitizer::clean(input), expected);
    }

    #[test]
    fn test_markup_stripped() {
        let cleaned = TextSanitizer::clean("<div class=\"x\"><p>First</p><p>Second <b>bold</b></p></div>");
        assert_eq!(cleaned, "FirstSecond bold");
    }

    #[test]
    fn test_encoded_markup_stripped() {
        assert_eq!(TextSanitizer::clean("&lt;p&gt;Inside&lt;/p&gt;"), "Inside");
    }

    #[test]
    fn test_script_contents_dropped() {
        let cleaned = TextSanitizer::clean("Before<script>var x = 1 < 2;</script>After");
        assert_eq!(cleaned, "BeforeAfter");
    }

    #[test]
    fn test_stray_attributes_removed() {
        assert_eq!(TextSanitizer::clean("text class=\"lead\" more"), "text more");
    }

    #[test]
    fn test_urls_removed() {
        assert_eq!(
            TextSanitizer::clean("Read more at https://example.com/a?b=c now"),
            "Read more at now"
        );
    }

    #[test_case("正文内容 图片来源：新华网络 结束", "正文内容 结束"; "image credit")]
    #[test_case("来源：人民网 正文", "正文"; "source")]
    #[test_case("编辑：张三 正文", "正文"; "editor")]
    #[test_case("记者：李四，正文", "正文"; "reporter")]
    #[test_case("正文。作者：王五；", "正文。"; "author")]
    #[test_case("发布时间：2023-07-01 正文", "正文"; "published")]
    fn test_boilerplate_removed(input: &str, expected: &str) {
        assert_eq!(TextSanitizer::clean(input), expected);
    }

    #[test]
    fn test_whitespace_and_controls() {
        assert_eq!(TextSanitizer::clean("  a\t\tb\n\nc\u{7f}d  "), "a b cd");
    }

    #[test]
    fn test_deterministic() {
        let input = "<p>Same&nbsp;input</p> 编辑：某人 ";
        assert_eq!(TextSanitizer::clean(input), TextSanitizer::clean(input));
    }

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(TextSanitizer::char_len("中文标题"), 4);
    }
}
