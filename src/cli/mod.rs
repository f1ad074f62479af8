pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, ConfigArgs, ImageArgs, RenderArgs};
pub use output::{ManifestReport, OutputFormat, OutputFormatter};
