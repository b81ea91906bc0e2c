//! Static HTML page of movie cards.
//!
//! Posters start as an inline placeholder; the real (https-only) URL sits in
//! `data-src` with `loading="lazy"` so browsers defer the download.

use std::fs;
use std::path::PathBuf;

use crate::movies::Record;
use crate::render::sanitize::{escape_html, placeholder_image, sanitize_url};
use crate::render::Renderer;

/// Writes the movie collection as an HTML page on every render.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    path: PathBuf,
}

impl HtmlRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(escape_html).unwrap_or_default()
}

/// Build one card.
pub fn render_card(movie: &Record) -> String {
    let title = text(&movie.title);
    let poster = movie.image_url.as_deref().map(sanitize_url).unwrap_or_else(|| "#".to_string());
    let year = movie.year.map(|y| y.to_string()).unwrap_or_default();
    let stars = movie.stars.map(|s| s.to_string()).unwrap_or_default();

    format!(
        r#"<article class="col-md-4">
  <article class="card h-100 shadow movie-card">
    <img class="card-img-top" src="{placeholder}" data-src="{poster}" alt="poster of {title}" loading="lazy">
    <section class="card-body">
      <h5 class="card-title">{title}</h5>
      <p class="card-text">{description}</p>
    </section>
    <footer class="card-footer text-muted small">🍿 {genre} · 📅 {year} · ⭐ {stars}/5</footer>
  </article>
</article>
"#,
        placeholder = placeholder_image(),
        poster = escape_html(&poster),
        title = title,
        description = text(&movie.description),
        genre = text(&movie.genre),
        year = year,
        stars = stars,
    )
}

/// Build the full page.
pub fn render_page(movies: &[Record]) -> String {
    let cards: String = movies.iter().map(render_card).collect();
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>movies</title>
</head>
<body>
<main id="movies" class="row">
{cards}</main>
<script>
const observer = new IntersectionObserver((entries) => {{
  entries.forEach((entry) => {{
    if (entry.isIntersecting) {{
      entry.target.src = entry.target.dataset.src;
      observer.unobserve(entry.target);
    }}
  }});
}}, {{ rootMargin: "100px" }});
document.querySelectorAll("img[data-src]").forEach((img) => observer.observe(img));
</script>
</body>
</html>
"#,
        cards = cards
    )
}

impl Renderer for HtmlRenderer {
    // Synchronous write of one small page, replaced whole on every render.
    fn render(&self, movies: &[Record]) {
        match fs::write(&self.path, render_page(movies)) {
            Ok(()) => tracing::debug!(path = ?self.path, records = movies.len(), "HTML page written"),
            Err(e) => tracing::warn!(path = ?self.path, error = %e, "Failed to write HTML page"),
        }
    }
}
