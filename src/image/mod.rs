//! Container image build-descriptor synthesis
//!
//! Images are described with a fluent [`ImageBuilder`]:
//!
//! ```no_run
//! use imagescript::image::{self, installers};
//!
//! # fn main() -> Result<(), imagescript::image::ImageError> {
//! image::create_image("myapp-node-win64", "windows")?
//!     .from("mcr.microsoft.com/windows/servercore:ltsc2019")?
//!     .execute(&installers::node())?
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Procedure`]s append instructions to the builder's [`BuildContext`] and may
//! queue host files to stage beside the manifest. `build` copies the staged
//! files, compiles the queues into a multi-stage [`Manifest`], writes it to
//! `<contexts-root>/<name>/Dockerfile` and runs `docker build -t <name>` on
//! that directory.

pub mod builder;
pub mod context;
pub mod error;
pub mod installers;
pub mod manifest;
pub mod procedure;
pub mod reference;

pub use builder::{create_image, import_image, BuilderState, ImageBuilder, ImageFactory};
pub use context::{BuildContext, StagedFile};
pub use error::ImageError;
pub use manifest::{Manifest, Stage, INSTALLERS_STAGE};
pub use procedure::{FnProcedure, Procedure};
pub use reference::{ImageReference, ImageSource};
