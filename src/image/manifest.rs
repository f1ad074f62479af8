//! Multi-stage manifest synthesis
//!
//! A manifest is rendered from a [`BuildContext`] and the image it builds
//! from:
//!
//! ```text
//! FROM <installers source> AS installers   (only when installers were queued)
//! <installers lines>
//! FROM <from image>
//! <build lines>
//! <clean lines>
//! ```
//!
//! Lines are joined with `\n` and no trailing newline is added. The installers
//! stage is never copied from implicitly; procedures that need its output add
//! their own `COPY --from=installers ...` lines.

use super::{BuildContext, ImageReference};
use serde::Serialize;
use std::fmt;

/// Alias given to the auxiliary installers stage
pub const INSTALLERS_STAGE: &str = "installers";

/// One `FROM` section of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub source: String,
    pub alias: Option<String>,
    pub instructions: Vec<String>,
}

impl Stage {
    pub fn header(&self) -> String {
        match &self.alias {
            Some(alias) => format!("FROM {} AS {}", self.source, alias),
            None => format!("FROM {}", self.source),
        }
    }
}

/// Synthesized build file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub stages: Vec<Stage>,
}

impl Manifest {
    /// Compiles `context` into stages, using `from` as the main stage source
    pub fn synthesize(context: &BuildContext, from: &ImageReference) -> Self {
        let mut stages = Vec::with_capacity(2);

        if !context.installers().is_empty() {
            let source = context.installers_image().unwrap_or(from);
            stages.push(Stage {
                source: source.name().to_string(),
                alias: Some(INSTALLERS_STAGE.to_string()),
                instructions: context.installers().to_vec(),
            });
        }

        stages.push(Stage {
            source: from.name().to_string(),
            alias: None,
            instructions: context
                .build()
                .iter()
                .chain(context.clean())
                .cloned()
                .collect(),
        });

        Self { stages }
    }

    /// Every line of the manifest in output order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for stage in &self.stages {
            lines.push(stage.header());
            lines.extend(stage.instructions.iter().cloned());
        }
        lines
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }

    pub fn has_installers_stage(&self) -> bool {
        self.stages
            .iter()
            .any(|stage| stage.alias.as_deref() == Some(INSTALLERS_STAGE))
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn base() -> ImageReference {
        ImageReference::imported("base:latest", "linux").unwrap()
    }

    fn context() -> BuildContext {
        BuildContext::new("app", "linux", Path::new(".dockercontexts"))
    }

    #[test]
    fn test_empty_context_has_single_header() {
        let manifest = Manifest::synthesize(&context(), &base());

        assert_eq!(manifest.render(), "FROM base:latest");
        assert_eq!(manifest.stages.len(), 1);
        assert!(!manifest.has_installers_stage());
    }

    #[test]
    fn test_build_lines_precede_clean_lines() {
        let mut context = context();
        context.push_clean("RUN rm -rf /tmp/*");
        context.push_build("RUN make");
        context.push_build("RUN make install");

        let manifest = Manifest::synthesize(&context, &base());

        assert_eq!(
            manifest.render(),
            "FROM base:latest\nRUN make\nRUN make install\nRUN rm -rf /tmp/*"
        );
    }

    #[test]
    fn test_installers_stage_uses_from_image_by_default() {
        let mut context = context();
        context.push_installer("RUN fetch-node");
        context.push_build("COPY --from=installers /node /node");

        let manifest = Manifest::synthesize(&context, &base());

        assert_eq!(
            manifest.lines(),
            vec![
                "FROM base:latest AS installers",
                "RUN fetch-node",
                "FROM base:latest",
                "COPY --from=installers /node /node",
            ]
        );
        assert!(manifest.has_installers_stage());
    }

    #[test]
    fn test_installers_image_override() {
        let mut context = context();
        context.set_installers_image(ImageReference::imported("tools:2", "linux").unwrap());
        context.push_installer("RUN fetch");

        let manifest = Manifest::synthesize(&context, &base());

        assert_eq!(manifest.stages[0].header(), "FROM tools:2 AS installers");
        assert_eq!(manifest.stages[1].header(), "FROM base:latest");
    }

    #[test]
    fn test_override_without_installers_is_ignored() {
        let mut context = context();
        context.set_installers_image(ImageReference::imported("tools:2", "linux").unwrap());

        let manifest = Manifest::synthesize(&context, &base());

        assert_eq!(manifest.render(), "FROM base:latest");
    }

    #[test]
    fn test_no_trailing_newline() {
        let mut context = context();
        context.push_build("RUN true");

        let rendered = Manifest::synthesize(&context, &base()).to_string();
        assert!(!rendered.ends_with('\n'));
    }
}
