// src/markdown.rs
// =============================================================================
// Renders the site description and footer from Markdown to HTML.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Passes raw HTML through untouched, so users can embed their own markup
//
// Bare URLs are turned into links before parsing, so a description like
// "see https://example.com" renders as a clickable link.
// =============================================================================

use pulldown_cmark::{html, Event, Options, Parser};

// Renders Markdown text as an HTML fragment
//
// Example:
//   "Docs for **x**" -> "<p>Docs for <strong>x</strong></p>\n"
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);

    // Track whether we are inside a link or code so those are left alone
    let mut link_depth = 0usize;
    let mut in_code = false;

    let events = parser.flat_map(|event| match event {
        Event::Start(pulldown_cmark::Tag::Link(..)) => {
            link_depth += 1;
            vec![event]
        }
        Event::End(pulldown_cmark::Tag::Link(..)) => {
            link_depth = link_depth.saturating_sub(1);
            vec![event]
        }
        Event::Start(pulldown_cmark::Tag::CodeBlock(_)) => {
            in_code = true;
            vec![event]
        }
        Event::End(pulldown_cmark::Tag::CodeBlock(_)) => {
            in_code = false;
            vec![event]
        }
        Event::Text(text) if link_depth == 0 && !in_code => linkify(&text),
        other => vec![other],
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

// Splits a text run into text and inline-HTML events, wrapping every
// http/https URL in an anchor.
fn linkify<'a>(text: &str) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut rest = text;

    while let Some(start) = find_url_start(rest) {
        let tail = &rest[start..];
        let end = tail
            .find(|c: char| c.is_whitespace() || c == '<' || c == '>' || c == '"')
            .unwrap_or(tail.len());

        // Trailing punctuation belongs to the sentence, not the URL
        let url = tail[..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);

        if start > 0 {
            events.push(Event::Text(rest[..start].to_string().into()));
        }
        let url_html = escape(url);
        events.push(Event::Html(
            format!(r#"<a href="{}">{}</a>"#, url_html, url_html).into(),
        ));

        rest = &tail[url.len()..];
    }

    if !rest.is_empty() {
        events.push(Event::Text(rest.to_string().into()));
    }
    events
}

fn find_url_start(text: &str) -> Option<usize> {
    match (text.find("http://"), text.find("https://")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

// Minimal HTML escaping for text and attribute values we generate ourselves
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_emphasis() {
        let html = render_markdown("Docs for **x**");
        assert_eq!(html, "<p>Docs for <strong>x</strong></p>\n");
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = render_markdown("<div class=\"note\">hi</div>");
        assert!(html.contains("<div class=\"note\">hi</div>"));
    }

    #[test]
    fn test_bare_url_becomes_link() {
        let html = render_markdown("See https://example.com/docs.");
        assert!(html.contains(r#"<a href="https://example.com/docs">https://example.com/docs</a>."#));
    }

    #[test]
    fn test_existing_link_untouched() {
        let html = render_markdown("[Rust](https://www.rust-lang.org)");
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
