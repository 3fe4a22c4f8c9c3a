//! Server-rendered HTML pages.
//!
//! Every value that came from a user passes through [`escape`] before it is
//! written into markup.

use std::fmt::Write;

use axum::response::Html;

use crate::{auth::repo_types::Credential, listings::repo_types::Listing};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encode a single URL path segment; only unreserved bytes pass through.
pub fn path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn layout(title: &str, user: Option<&Credential>, body: &str) -> Html<String> {
    let account = match user {
        Some(u) => format!(
            r#"<span class="user">{}</span> <a href="/write">Sell</a> <a href="/logout">Log out</a>"#,
            escape(&u.id)
        ),
        None => r#"<a href="/login">Log in</a> <a href="/join">Join</a>"#.to_owned(),
    };
    Html(format!(
        r#"<!doctype html>
<html lang="ko">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - UOS Market</title>
<link rel="stylesheet" href="/public/main.css">
</head>
<body>
<nav><a href="/">UOS Market</a> <a href="/list">Listings</a>
<form action="/search" method="get"><input name="value" placeholder="Search titles"><button>Search</button></form>
{account}</nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn listing_rows(posts: &[Listing]) -> String {
    if posts.is_empty() {
        return "<p>No listings.</p>".to_owned();
    }
    let mut out = String::from("<ul class=\"listings\">");
    for p in posts {
        let _ = write!(
            out,
            r#"<li><a href="/detail/{id}">{title}</a> <span class="price">{money}</span></li>"#,
            id = p.id,
            title = escape(&p.title),
            money = escape(&p.money),
        );
    }
    out.push_str("</ul>");
    out
}

pub fn index(user: Option<&Credential>) -> Html<String> {
    let greeting = match user {
        Some(u) => format!("<h1>Welcome back, {}</h1>", escape(&u.id)),
        None => "<h1>UOS Market</h1><p>Buy and sell on campus.</p>".to_owned(),
    };
    layout("Home", user, &greeting)
}

pub fn login(user: Option<&Credential>, failed: bool) -> Html<String> {
    let notice = if failed {
        r#"<p class="error">Wrong id or password.</p>"#
    } else {
        ""
    };
    let body = format!(
        r#"<h1>Log in</h1>{notice}
<form action="/login" method="post">
<input name="id" placeholder="id" required>
<input name="pw" type="password" placeholder="password" required>
<button>Log in</button>
</form>"#
    );
    layout("Log in", user, &body)
}

pub fn join(user: Option<&Credential>) -> Html<String> {
    let body = r#"<h1>Join</h1>
<form action="/join" method="post">
<input name="id" placeholder="id" required>
<input name="pw" type="password" placeholder="password" required>
<button>Join</button>
</form>"#;
    layout("Join", user, body)
}

pub fn list(user: Option<&Credential>, posts: &[Listing]) -> Html<String> {
    let body = format!("<h1>Listings</h1>{}", listing_rows(posts));
    layout("Listings", user, &body)
}

pub fn search(user: Option<&Credential>, query: &str, posts: &[Listing]) -> Html<String> {
    let body = format!(
        "<h1>Results for \"{}\"</h1>{}",
        escape(query),
        listing_rows(posts)
    );
    layout("Search", user, &body)
}

pub fn write(user: Option<&Credential>, next_id: i64) -> Html<String> {
    let body = format!(
        r#"<h1>New listing <small>#{next_id}</small></h1>
<form action="/write" method="post">
<input name="title" placeholder="title" required>
<input name="money" placeholder="price" required>
<textarea name="description" placeholder="description"></textarea>
<input name="kakao" placeholder="KakaoTalk id" required>
<button>Next: add a photo</button>
</form>"#
    );
    layout("Sell", user, &body)
}

pub fn img_upload(user: Option<&Credential>, listing: &Listing) -> Html<String> {
    let body = format!(
        r#"<h1>Photo for "{title}"</h1>
<form action="/imgUpload?id={id}" method="post" enctype="multipart/form-data">
<input type="file" name="img" accept=".png,.jpg,.jpeg" required>
<button>Upload</button>
</form>
<p><a href="/detail/{id}">Skip</a></p>"#,
        id = listing.id,
        title = escape(&listing.title),
    );
    layout("Upload photo", user, &body)
}

/// `image_url_prefix` is where uploaded files are served, e.g. `/public/image`.
pub fn detail(
    user: Option<&Credential>,
    listing: Option<&Listing>,
    image_url_prefix: &str,
) -> Html<String> {
    let Some(p) = listing else {
        return layout("Not found", user, "<h1>Listing not found</h1>");
    };
    let image = p
        .image
        .as_deref()
        .map(|name| {
            format!(
                r#"<img src="{}/{}" alt="{}">"#,
                escape(image_url_prefix),
                path_segment(name),
                escape(&p.title)
            )
        })
        .unwrap_or_default();
    let body = format!(
        r#"<article>
<h1>{title}</h1>
{image}
<p class="price">{money}</p>
<p>{description}</p>
<p>KakaoTalk: <b>{kakao}</b></p>
</article>"#,
        title = escape(&p.title),
        money = escape(&p.money),
        description = escape(&p.description),
        kakao = escape(&p.kakao),
    );
    layout(&p.title, user, &body)
}
