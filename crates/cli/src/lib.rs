pub mod app;
pub mod args;

pub use app::run;
pub use args::{Cli, SourceOverrides};
