//! Subcommand handlers
//!
//! Each handler returns the process exit code.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::commands::{BuildArgs, ConfigArgs, ImageArgs, RenderArgs};
use super::output::{ManifestReport, OutputFormatter};
use crate::config::ImageScriptConfig;
use crate::fs::{FileSystem, RealFileSystem};
use crate::image::{BuildContext, FnProcedure, ImageBuilder, ImageFactory};
use crate::process::{ProcessRunner, SystemProcessRunner};

pub fn handle_render(args: &RenderArgs) -> i32 {
    let config = config_for(&args.image, None);
    if let Err(e) = config.validate() {
        error!("{}", e);
        return 1;
    }
    let factory = ImageFactory::new(config);

    let result = describe(&factory, &args.image).and_then(|builder| {
        let report = ManifestReport::from_builder(&builder)?;
        OutputFormatter::new(args.format.into()).format_manifest(&report)
    });

    match result {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Render failed: {:#}", e);
            1
        }
    }
}

pub fn handle_build(args: &BuildArgs) -> i32 {
    handle_build_with(
        args,
        Arc::new(RealFileSystem::new()),
        Arc::new(SystemProcessRunner::new()),
    )
}

/// `build` against explicit collaborators
pub fn handle_build_with(
    args: &BuildArgs,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ProcessRunner>,
) -> i32 {
    let config = config_for(&args.image, args.build_tool.as_deref());
    if let Err(e) = config.validate() {
        error!("{}", e);
        return 1;
    }
    let factory = ImageFactory::with_collaborators(config, fs, runner);

    let result = describe(&factory, &args.image).and_then(|mut builder| {
        builder.build()?;
        Ok(builder)
    });

    match result {
        Ok(builder) => {
            info!(
                "Built image {} from {}",
                builder.name(),
                builder.manifest_path().display()
            );
            0
        }
        Err(e) => {
            error!("Build failed: {:#}", e);
            1
        }
    }
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = ImageScriptConfig::default();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return 1;
    }

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format configuration: {:#}", e);
            1
        }
    }
}

fn config_for(args: &ImageArgs, build_tool: Option<&str>) -> ImageScriptConfig {
    let mut config = ImageScriptConfig::default();
    if let Some(root) = &args.contexts_root {
        config.contexts_root = root.clone();
    }
    if let Some(tool) = build_tool {
        config.build_tool = tool.to_string();
    }
    config
}

/// Turns command-line image arguments into a configured builder
fn describe(factory: &ImageFactory, args: &ImageArgs) -> Result<ImageBuilder> {
    let mut builder = factory.create_image(&args.name, &args.os)?.from(args.from.as_str())?;

    if let Some(installers_image) = &args.installers_image {
        let reference = factory.import_image(installers_image.as_str(), args.os.as_str())?;
        let select = FnProcedure::new("installers-image", move |context: &mut BuildContext| {
            context.set_installers_image(reference.clone());
        });
        builder = builder.execute(&select)?;
    }

    for installer in &args.installers {
        debug!(installer = installer.package(), "adding installer");
        builder = builder.execute(installer)?;
    }

    Ok(builder)
}
