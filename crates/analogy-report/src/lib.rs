//! analogy-report — Export writers and the HTML attempt review page.

pub mod files;
pub mod html;

pub use files::{write_attempt, write_localization, LocalizationNaming};
pub use html::{generate_html, write_html_review};
