//! HTML fragments shared by the page views: previews, navigation links,
//! the share menu and the tag sidebar. Every function here is a pure
//! function of its arguments; site-relative links are prefixed with the
//! `base` path handed in by the caller.

use crate::{date, post::Post, series::Series, tag::TagCount};

/// Text shown in place of a relative date until the client script fills it
/// in.
pub const RELATIVE_DATE_PENDING: &str = "계산 중...";

/// Escapes text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `<span class="tag">` elements for each tag.
pub fn tag_spans(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!(r#"<span class="tag">{}</span>"#, escape(t)))
        .collect()
}

/// The element a client script rewrites into relative time text.
fn relative_date(post: &Post) -> String {
    format!(
        r#"<span class="post-date" data-post-date="{}">{}</span>"#,
        date::iso_utc(post.date),
        RELATIVE_DATE_PENDING
    )
}

/// A post preview for the index page listing.
pub fn post_preview(post: &Post, base: &str) -> String {
    let href = post.href(base);
    format!(
        r#"
      <article class="post-preview" data-post-url="{href}">
        <h2 class="post-title"><a href="{href}">{title}</a></h2>
        <div class="post-content-preview">{excerpt}</div>
        <div class="post-footer-meta">
          <div class="post-tags">{tags}</div>
          <div class="post-meta-info">{date}</div>
        </div>
      </article>
"#,
        href = href,
        title = escape(&post.title),
        excerpt = escape(&post.excerpt),
        tags = tag_spans(&post.tags),
        date = relative_date(post),
    )
}

/// A numbered entry on a series page. `number` is one-based.
pub fn series_post_item(post: &Post, number: usize, base: &str) -> String {
    let href = post.href(base);
    format!(
        r#"
    <article class="series-post-item" data-post-url="{href}">
      <div class="series-post-number">{number}</div>
      <div class="series-post-content">
        <h2><a href="{href}">{title}</a></h2>
        <p class="excerpt">{excerpt}</p>
        <div class="post-footer-meta">
          <div class="post-tags"></div>
          <div class="post-meta-info">{date}</div>
        </div>
      </div>
    </article>
"#,
        href = href,
        number = number,
        title = escape(&post.title),
        excerpt = escape(&post.excerpt),
        date = relative_date(post),
    )
}

/// The tag sidebar: a synthetic "show all" entry followed by every tag.
pub fn tags_sidebar(tags: &[TagCount], total_posts: usize) -> String {
    let mut html = format!(
        r##"<a href="#" class="tag-item tag-item-all" data-tag="all">전체보기 <span class="tag-count">({})</span></a>"##,
        total_posts
    );
    for tag in tags {
        let name = escape(&tag.name);
        html.push_str(&format!(
            r##"
<a href="#" class="tag-item" data-tag="{name}">{name} <span class="tag-count">({count})</span></a>"##,
            name = name,
            count = tag.count,
        ));
    }
    html
}

/// The series box on a post page: series link plus `i / n` progress.
/// `position` is zero-based.
pub fn series_info(series: &Series, position: usize, base: &str) -> String {
    format!(
        r#"
      <div class="series-info">
        <a href="{base}/series/{slug}.html" class="series-link">
          <span class="series-label">시리즈</span>
          <span class="series-name">{name}</span>
        </a>
        <span class="series-progress">{current} / {total}</span>
      </div>
"#,
        base = base,
        slug = series.slug,
        name = escape(&series.name),
        current = position + 1,
        total = series.posts.len(),
    )
}

/// Previous/next links within a series. Empty when there are neither.
pub fn series_navigation(prev: Option<&Post>, next: Option<&Post>, base: &str) -> String {
    if prev.is_none() && next.is_none() {
        return String::new();
    }
    let mut html = String::from(r#"<div class="series-navigation">"#);
    if let Some(p) = prev {
        html.push_str(&format!(
            r#"<a href="{}" class="series-nav-link prev">← 이전 글: {}</a>"#,
            p.href(base),
            escape(&p.title)
        ));
    }
    if let Some(n) = next {
        html.push_str(&format!(
            r#"<a href="{}" class="series-nav-link next">다음 글: {} →</a>"#,
            n.href(base),
            escape(&n.title)
        ));
    }
    html.push_str("</div>");
    html
}

/// A link to the previous post in the main listing.
pub fn prev_link(post: Option<&Post>, base: &str) -> String {
    post.map(|p| {
        format!(
            r#"<a href="{}" class="nav-link">← {}</a>"#,
            p.href(base),
            escape(&p.title)
        )
    })
    .unwrap_or_default()
}

/// A link to the next post in the main listing.
pub fn next_link(post: Option<&Post>, base: &str) -> String {
    post.map(|p| {
        format!(
            r#"<a href="{}" class="nav-link">{} →</a>"#,
            p.href(base),
            escape(&p.title)
        )
    })
    .unwrap_or_default()
}

/// Where a share menu sits on the post page. Element ids differ per
/// placement so the menu script binds to the right elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SharePlacement {
    /// Above the series navigation of a series post.
    Series,

    /// At the foot of a post outside any series.
    Footer,
}

impl SharePlacement {
    fn id_suffix(self) -> &'static str {
        match self {
            SharePlacement::Series => "-series",
            SharePlacement::Footer => "",
        }
    }
}

/// The share menu: intent links for Twitter, Facebook and LinkedIn and a
/// button copying `url` to the clipboard.
pub fn share_block(placement: SharePlacement, title: &str, url: &str) -> String {
    let encoded_title = urlencoding::encode(title);
    let encoded_url = urlencoding::encode(url);
    format!(
        r#"
      <div class="post-share">
        <button class="share-btn-main" id="share-toggle{s}" title="공유하기">공유</button>
        <div class="share-menu" id="share-menu{s}">
          <a href="https://twitter.com/intent/tweet?text={t}&url={u}" target="_blank" rel="noopener noreferrer" class="share-btn-item" title="Twitter 공유">Twitter</a>
          <a href="https://www.facebook.com/sharer/sharer.php?u={u}" target="_blank" rel="noopener noreferrer" class="share-btn-item" title="Facebook 공유">Facebook</a>
          <a href="https://www.linkedin.com/sharing/share-offsite/?url={u}" target="_blank" rel="noopener noreferrer" class="share-btn-item" title="LinkedIn 공유">LinkedIn</a>
          <button class="share-btn-item" id="copy-url{s}" title="URL 복사" data-url="{url}">URL 복사</button>
        </div>
      </div>
      <script>
        (function() {{
          var toggle = document.getElementById('share-toggle{s}');
          var menu = document.getElementById('share-menu{s}');
          var copy = document.getElementById('copy-url{s}');
          if (toggle && menu) {{
            toggle.addEventListener('click', function() {{ menu.classList.toggle('show'); }});
            document.addEventListener('click', function(e) {{
              if (!toggle.contains(e.target) && !menu.contains(e.target)) {{
                menu.classList.remove('show');
              }}
            }});
          }}
          if (copy) {{
            copy.addEventListener('click', function() {{
              navigator.clipboard.writeText(copy.getAttribute('data-url')).then(function() {{
                copy.textContent = '복사됨!';
                setTimeout(function() {{ copy.textContent = 'URL 복사'; }}, 2000);
              }});
            }});
          }}
        }})();
      </script>
"#,
        s = placement.id_suffix(),
        t = encoded_title,
        u = encoded_url,
        url = escape(url),
    )
}

/// One entry of the series list page.
pub fn series_list_item(series: &Series, base: &str) -> String {
    let latest = series
        .latest()
        .map(|p| escape(&p.title))
        .unwrap_or_default();
    format!(
        r#"
      <div class="series-item">
        <a href="{base}/series/{slug}.html" class="series-item-link">
          <div class="series-item-header">
            <span class="series-item-name">{name}</span>
            <span class="series-item-count">{count}개의 글</span>
          </div>
          <div class="series-item-latest">
            <span class="series-item-latest-label">최신:</span>
            <span class="series-item-latest-title">{latest}</span>
          </div>
        </a>
      </div>
"#,
        base = base,
        slug = series.slug,
        name = escape(&series.name),
        count = series.posts.len(),
        latest = latest,
    )
}

/// Shown on the series list page when no post declares a series.
pub const NO_SERIES: &str = "<p>시리즈가 없습니다.</p>";

/// The about-page body used when the site has no about file.
pub fn about_fallback(site_title: &str, profile_image: Option<&str>, base: &str) -> String {
    let image = match profile_image {
        Some(src) => {
            let src = if src.starts_with('/') {
                format!("{}{}", base, src)
            } else {
                src.to_owned()
            };
            format!(
                r#"
      <div class="about-profile">
        <img src="{}" alt="Profile" class="about-profile-image">
      </div>"#,
                escape(&src)
            )
        }
        None => String::new(),
    };
    format!(
        r#"{}
      <h2>안녕하세요! 👋</h2>
      <p>{}에 오신 것을 환영합니다. 개발과 학습을 기록하는 공간입니다.</p>
"#,
        image,
        escape(site_title)
    )
}
