//! Plain-text cards for a terminal.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::movies::Record;
use crate::render::sanitize::{sanitize_url, strip_control};
use crate::render::{ErrorPresenter, Renderer, RetryHandle};

/// Writes movie cards and error notices to a stream.
///
/// Like a page container, each render replaces what the previous one showed;
/// on a terminal that means a separator line.
pub struct TerminalView<W: Write + Send> {
    out: Mutex<W>,
    pending_retry: Mutex<Option<RetryHandle>>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            pending_retry: Mutex::new(None),
        }
    }

    /// Take the retry action offered by the last error, if any.
    pub fn take_retry(&self) -> Option<RetryHandle> {
        self.pending_retry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write terminal output");
        }
    }
}

/// Render one record as a text card.
pub fn format_card(movie: &Record) -> String {
    let field = |v: &Option<String>| v.as_deref().map(strip_control).unwrap_or_default();

    let title = field(&movie.title);
    let year = movie.year.map(|y| y.to_string()).unwrap_or_default();
    let stars = movie.stars.map(|s| s.to_string()).unwrap_or_default();
    let poster = movie.image_url.as_deref().map(sanitize_url).unwrap_or_else(|| "#".to_string());

    let mut card = String::new();
    if year.is_empty() {
        card.push_str(&format!("{}\n", title));
    } else {
        card.push_str(&format!("{} ({})\n", title, year));
    }
    card.push_str(&format!("  🍿 {} · 📅 {} · ⭐ {}/5\n", field(&movie.genre), year, stars));
    card.push_str(&format!("  {}\n", field(&movie.description)));
    card.push_str(&format!("  poster: {}\n", poster));
    card
}

impl<W: Write + Send> Renderer for TerminalView<W> {
    fn render(&self, movies: &[Record]) {
        let mut text = String::from("──────── movies ────────\n");
        if movies.is_empty() {
            text.push_str("(no movies)\n");
        }
        for movie in movies {
            text.push_str(&format_card(movie));
            text.push('\n');
        }
        self.emit(&text);
    }
}

impl<W: Write + Send> ErrorPresenter for TerminalView<W> {
    fn present_error(&self, message: &str, retry: RetryHandle) {
        self.emit(&format!(
            "──────── error ────────\n{}\n[press Enter to try again]\n",
            strip_control(message)
        ));
        *self.pending_retry.lock().unwrap_or_else(PoisonError::into_inner) = Some(retry);
    }
}
