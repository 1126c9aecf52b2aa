//! Local stand-in for the catalog application.
//!
//! Serves one page at `/books` that renders the same table structure,
//! controls and links as the real catalog, backed by a fixed list of eight
//! books. `/books?book=<id>` serves the same page, which is all detail
//! navigation checks.
//!
//! Two variants serve broken title links: `/unlinked/books` renders them
//! without an `href`, and `/misrouted/books` points them at `/moved/books`,
//! which redirects to the detail page of a different book.

use std::net::SocketAddr;

use axum::{
    response::{Html, Redirect},
    routing::get,
    Router,
};
use bookshelf_e2e::E2eConfig;
use tokio::task::JoinHandle;

const CATALOG_HTML: &str = include_str!("catalog.html");

/// Number of books the mock catalog lists.
#[allow(dead_code)]
pub const BOOK_COUNT: usize = 8;

/// Where `/moved/books` sends every title link.
pub const MOVED_TO_BOOK: &str = "9781593277574";

fn catalog(link_mode: &str) -> Html<String> {
    Html(CATALOG_HTML.replace("{{link_mode}}", link_mode))
}

pub struct CatalogServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl CatalogServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock catalog");
        let addr = listener.local_addr().expect("listener has an address");

        let app = Router::new()
            .route("/books", get(|| async { catalog("detail") }))
            .route("/unlinked/books", get(|| async { catalog("none") }))
            .route("/misrouted/books", get(|| async { catalog("moved") }))
            .route(
                "/moved/books",
                get(|| async { Redirect::to(&format!("/books?book={MOVED_TO_BOOK}")) }),
            );
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock catalog server failed");
        });

        Self { addr, handle }
    }

    pub fn books_url(&self) -> String {
        format!("http://{}/books", self.addr)
    }

    /// Configuration pointed at this server: one attempt, no artifacts.
    pub fn config(&self) -> E2eConfig {
        Self::config_for(self.books_url())
    }

    /// Configuration for the variant whose title links carry no `href`.
    pub fn unlinked_config(&self) -> E2eConfig {
        Self::config_for(format!("http://{}/unlinked/books", self.addr))
    }

    /// Configuration for the variant whose title links land on another book.
    pub fn misrouted_config(&self) -> E2eConfig {
        E2eConfig {
            // The mismatch only surfaces once the URL expectation expires.
            expect_timeout_ms: 2_000,
            ..Self::config_for(format!("http://{}/misrouted/books", self.addr))
        }
    }

    fn config_for(base_url: String) -> E2eConfig {
        E2eConfig {
            retries: 0,
            screenshot_on_failure: false,
            ..E2eConfig::default().with_base_url(base_url)
        }
    }
}

impl Drop for CatalogServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
