//! Presentation collaborators.
//!
//! The fetch core hands these plain, structurally valid data. Escaping and
//! URL checks happen here, not in the core.

pub mod html;
pub mod sanitize;
pub mod terminal;

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::movies::Record;

pub use html::HtmlRenderer;
pub use terminal::TerminalView;

/// Displays a collection of movies.
pub trait Renderer: Send + Sync {
    fn render(&self, movies: &[Record]);
}

/// Displays a failure with a way to try again.
pub trait ErrorPresenter: Send + Sync {
    fn present_error(&self, message: &str, retry: RetryHandle);
}

/// Re-runs the movie fetch when triggered.
#[derive(Clone)]
pub struct RetryHandle {
    action: Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>,
}

impl RetryHandle {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
        }
    }

    /// Start another fetch. The returned future completes when it is done.
    pub fn trigger(&self) -> BoxFuture<'static, ()> {
        (self.action)()
    }
}

impl std::fmt::Debug for RetryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RetryHandle")
    }
}

/// Forwards every render to several renderers.
#[derive(Default)]
pub struct Tee {
    renderers: Vec<Arc<dyn Renderer>>,
}

impl Tee {
    pub fn new(renderers: Vec<Arc<dyn Renderer>>) -> Self {
        Self { renderers }
    }
}

impl Renderer for Tee {
    fn render(&self, movies: &[Record]) {
        for renderer in &self.renderers {
            renderer.render(movies);
        }
    }
}
