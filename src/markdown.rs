use crate::status;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Characters dropped from heading text when deriving its anchor.
static ANCHOR_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[\u{2000}-\u{206F}\u{2E00}-\u{2E7F}\\'!"#$%&()*+,./:;<=>?@\[\]^`{|}~]"##)
        .unwrap()
});

/// Converts a post (or about-page) body to HTML. The body first goes through
/// [`status::process_markers`] and is then rendered as Markdown with line
/// breaks preserved and raw HTML passed through.
pub fn render(body: &str) -> String {
    to_html(&status::process_markers(body))
}

/// Converts markdown to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events: Vec<Event> = Parser::new_ext(markdown, options).map(convert).collect();
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, anchor_headings(events).into_iter());
    output
}

/// Derives a heading's anchor: lowercased, punctuation dropped, whitespace
/// turned into `-`. Hangul and other letters are kept as they are.
pub fn heading_anchor(text: &str) -> String {
    ANCHOR_PUNCTUATION
        .replace_all(&text.trim().to_lowercase(), "")
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Gives every heading an `id`. Repeated anchors within one document get a
/// `-1`, `-2`, ... suffix. The closing tags are left to the renderer.
fn anchor_headings(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut seen: HashSet<String> = HashSet::new();
    for i in 0..events.len() {
        let level = match &events[i] {
            Event::Start(Tag::Heading(level, None, _)) => *level,
            _ => continue,
        };
        let mut text = String::new();
        for ev in &events[i + 1..] {
            match ev {
                Event::End(Tag::Heading(..)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        let base = heading_anchor(&text);
        if base.is_empty() {
            continue;
        }
        let mut anchor = base.clone();
        let mut n = 0;
        while !seen.insert(anchor.clone()) {
            n += 1;
            anchor = format!("{}-{}", base, n);
        }
        events[i] = Event::Html(CowStr::Boxed(
            format!(r#"<{} id="{}">"#, level, anchor).into_boxed_str(),
        ));
    }
    events
}

fn convert(ev: Event<'_>) -> Event<'_> {
    match ev {
        // Authors write one line per thought; a single newline in the source
        // is a line break on the page.
        Event::SoftBreak => Event::HardBreak,

        // Fenced blocks are tagged on both `pre` and `code` so the theme's
        // highlighter picks them up. The closing tags are left to the
        // renderer.
        Event::Start(Tag::CodeBlock(kind)) => {
            let lang = match &kind {
                CodeBlockKind::Fenced(info) => {
                    info.split_whitespace().next().unwrap_or_default()
                }
                CodeBlockKind::Indented => "",
            };
            let lang = if lang.is_empty() { "text" } else { lang };
            Event::Html(CowStr::Boxed(
                format!(
                    r#"<pre class="language-{0}"><code class="language-{0}">"#,
                    lang
                )
                .into_boxed_str(),
            ))
        }
        _ => ev,
    }
}
