//! imagescript - multi-stage container build file synthesis
//!
//! This library describes container images as a source image plus a list of
//! reusable build procedures, compiles that description into a multi-stage
//! `Dockerfile` and hands the staged context directory to an external build
//! tool.
//!
//! # Core Concepts
//!
//! - **Image references**: either imported (an existing image in a registry)
//!   or built (produced by a successful [`ImageBuilder::build`])
//! - **Procedures**: units of build logic that append instructions to a
//!   [`BuildContext`]'s installers, build and clean queues
//! - **Manifest**: the synthesized build file; an `installers` stage is
//!   emitted only when installer instructions exist
//!
//! # Example Usage
//!
//! ```no_run
//! use imagescript::image::installers;
//! use imagescript::{create_image, ImageError};
//!
//! fn build_node_image() -> Result<(), ImageError> {
//!     let mut builder = create_image("myapp-node-win64", "windows")?
//!         .from("mcr.microsoft.com/windows/servercore:ltsc2019")?
//!         .execute(&installers::node())?;
//!
//!     println!("{}", builder.preview()?);
//!     builder.build()
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`image`]: references, build context, procedures, manifest synthesis and the builder
//! - [`process`]: the process-runner seam used to invoke the build tool
//! - [`fs`]: the file-writer seam used to stage manifests
//! - [`config`]: environment-driven configuration
//! - [`cli`]: the `imagescript` command-line interface

pub mod cli;
pub mod config;
pub mod fs;
pub mod image;
pub mod process;
pub mod util;

pub use config::{ConfigError, ImageScriptConfig};
pub use fs::{FileSystem, RealFileSystem};
pub use image::{
    create_image, import_image, BuildContext, FnProcedure, ImageBuilder, ImageError,
    ImageFactory, ImageReference, Manifest, Procedure,
};
pub use process::{CommandLine, ProcessError, ProcessRunner, RunOptions, SystemProcessRunner};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_imagescript() {
        assert_eq!(NAME, "imagescript");
    }
}
