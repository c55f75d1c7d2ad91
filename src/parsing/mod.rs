//! Parsers for the text the SEC hands back: filing documents and their sections.

#[cfg(feature = "html")]
pub mod html;
pub mod sections;
pub mod utils;
