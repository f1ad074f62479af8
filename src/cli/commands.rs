use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::image::installers::{self, PackageInstaller};

/// Synthesizes multi-stage container build files and runs the build tool
#[derive(Parser, Debug)]
#[command(
    name = "imagescript",
    about = "Synthesizes multi-stage container build files and runs the build tool",
    version,
    author,
    long_about = "imagescript assembles a container build file from a source image and a list \
                  of installer procedures, stages it under a per-image context directory and \
                  hands that directory to the build tool (docker by default)."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Print the build file an image would be built from",
        long_about = "Synthesizes the build file without writing it or running the build tool.\n\n\
                      Examples:\n  \
                      imagescript render app --from base:latest\n  \
                      imagescript render app --os windows --from servercore --installer node\n  \
                      imagescript render app --from base --format json"
    )]
    Render(RenderArgs),

    #[command(
        about = "Write the build file and run the build tool",
        long_about = "Writes the build file to <contexts-root>/<name>/ and runs \
                      `<tool> build -t <name> <contexts-root>/<name>`.\n\n\
                      Examples:\n  \
                      imagescript build app --from base:latest\n  \
                      imagescript build app --from base --contexts-root /tmp/ctx --build-tool podman"
    )]
    Build(BuildArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

/// Description of the image shared by `render` and `build`
#[derive(Args, Debug, Clone)]
pub struct ImageArgs {
    #[arg(value_name = "NAME", help = "Name and tag of the image to build")]
    pub name: String,

    #[arg(long, default_value = "linux", help = "Platform of the image")]
    pub os: String,

    #[arg(long, value_name = "IMAGE", help = "Image to build from")]
    pub from: String,

    #[arg(
        short = 'i',
        long = "installer",
        value_name = "INSTALLER",
        value_parser = parse_installer,
        help = "Built-in installer to run (repeatable, e.g. 'node')"
    )]
    pub installers: Vec<PackageInstaller>,

    #[arg(
        long,
        value_name = "IMAGE",
        help = "Source image of the installers stage (defaults to --from)",
        long_help = "Source image of the installers stage (defaults to --from).\n\
                     Only takes effect once a procedure queues installer-stage lines; \
                     the built-in installers run in the main stage, so on its own this \
                     flag leaves the output unchanged."
    )]
    pub installers_image: Option<String>,

    #[arg(long, value_name = "PATH", help = "Override the staging root directory")]
    pub contexts_root: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "dockerfile",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    #[arg(long, value_name = "PROGRAM", help = "Override the build tool program")]
    pub build_tool: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
    Dockerfile,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
            OutputFormatArg::Dockerfile => super::output::OutputFormat::Dockerfile,
        }
    }
}

fn parse_installer(s: &str) -> Result<PackageInstaller, String> {
    installers::by_name(s)
        .ok_or_else(|| format!("Unknown installer: {}. Valid options: node", s))
}
