pub mod toc_parser;

pub use toc_parser::{TocDataError, parse_sidebar_html, parse_toc_json};
