//! Terminal output: the console reporter, interactive prompts and the list view.

pub mod list;
pub mod output;
pub mod prompt;
pub mod theme;

pub use output::Output;
pub use prompt::Prompt;
pub use theme::Theme;
