//! Inline status markers. Authors tag checklist lines with bracketed Korean
//! status words (`[완료]`, `[진행중]`, ...); this pass turns them into styled
//! spans before the Markdown renderer sees the text. Markdown links
//! (`[text](url)`) are set aside first so their bracketed labels are never
//! mistaken for markers.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A recognized status word and the CSS class its span receives.
struct Status {
    word: &'static str,
    class: &'static str,
}

const STATUSES: &[Status] = &[
    Status { word: "완료", class: "status-complete" },
    Status { word: "계획변경", class: "status-changed" },
    Status { word: "미완료", class: "status-incomplete" },
    Status { word: "진행중", class: "status-progress" },
];

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__LINK_PLACEHOLDER_(\d+)__").unwrap());

fn class_of(word: &str) -> Option<&'static str> {
    STATUSES.iter().find(|s| s.word == word).map(|s| s.class)
}

/// Replaces every recognized `[status]` marker outside a Markdown link with
/// `<span class="..." data-status="...">status</span>`. Unrecognized bracketed
/// text is left alone.
pub fn process_markers(text: &str) -> String {
    let mut links: Vec<String> = Vec::new();
    let protected = LINK.replace_all(text, |caps: &Captures| {
        links.push(caps[0].to_owned());
        format!("__LINK_PLACEHOLDER_{}__", links.len() - 1)
    });

    let marked = MARKER.replace_all(&protected, |caps: &Captures| {
        let word = caps[1].trim();
        match class_of(word) {
            Some(class) => format!(
                r#"<span class="{}" data-status="{}">{}</span>"#,
                class, word, &caps[1]
            ),
            None => caps[0].to_owned(),
        }
    });

    PLACEHOLDER
        .replace_all(&marked, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| links.get(i))
                .cloned()
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_marker_becomes_span() {
        assert_eq!(
            r#"- <span class="status-complete" data-status="완료">완료</span> 회고 작성"#,
            process_markers("- [완료] 회고 작성"),
        );
    }

    #[test]
    fn test_every_status_word() {
        let out = process_markers("[계획변경] [미완료] [진행중]");
        assert!(out.contains(r#"class="status-changed" data-status="계획변경""#));
        assert!(out.contains(r#"class="status-incomplete" data-status="미완료""#));
        assert!(out.contains(r#"class="status-progress" data-status="진행중""#));
    }

    #[test]
    fn test_padded_marker_keeps_original_text() {
        assert_eq!(
            r#"<span class="status-complete" data-status="완료"> 완료 </span>"#,
            process_markers("[ 완료 ]"),
        );
    }

    #[test]
    fn test_links_are_untouched() {
        assert_eq!("[제목](http://x)", process_markers("[제목](http://x)"));
        assert_eq!("[완료](http://x)", process_markers("[완료](http://x)"));
    }

    #[test]
    fn test_unknown_brackets_are_untouched() {
        assert_eq!("[TODO] [x]", process_markers("[TODO] [x]"));
    }

    #[test]
    fn test_mixed_line() {
        assert_eq!(
            r#"<span class="status-progress" data-status="진행중">진행중</span> see [docs](https://docs.rs) and [완료]"#
                .replace("[완료]", r#"<span class="status-complete" data-status="완료">완료</span>"#),
            process_markers("[진행중] see [docs](https://docs.rs) and [완료]"),
        );
    }
}
