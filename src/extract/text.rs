//! Plain-text rendering of document bodies

use html2md::parse_html;
use regex::Regex;
use scraper::{ElementRef, Node};
use std::sync::OnceLock;

/// Elements serialized without children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text is written verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

fn markup_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[*|_\-]").expect("valid markup regex"))
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid blank line regex"))
}

fn space_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" {2,}").expect("valid space regex"))
}

/// Converts an HTML body into readable plain text
///
/// The HTML is rendered to Markdown, then Markdown decoration characters
/// (`* | _ -`) and backslash escapes are dropped, runs of blank lines are
/// collapsed to a single blank line and runs of spaces to one space.
/// Leading and trailing whitespace left over from the rendering is trimmed.
pub fn extract_raw_text_from_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let markdown = parse_html(html);
    let text = markup_chars().replace_all(&markdown, "");
    let text = text.replace('\\', "");
    let text = blank_lines().replace_all(&text, "\n\n");
    space_runs().replace_all(&text, " ").trim().to_string()
}

/// Serializes `element` and its subtree as HTML, leaving out every `href`
/// attribute
///
/// Only attributes are dropped; text that happens to read `href=` is kept.
pub fn strip_hrefs(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let value = element.value();
    let name = value.name();

    out.push('<');
    out.push_str(name);
    for (key, attr) in value.attrs() {
        if key.eq_ignore_ascii_case("href") {
            continue;
        }
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape(attr, true, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    let raw_text = RAW_TEXT_ELEMENTS.contains(&name);
    for child in element.children() {
        match child.value() {
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => escape(text, false, out),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
