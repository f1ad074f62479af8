//! Image references
//!
//! An image is either *imported* (it exists outside this tool and can only be
//! used as a `FROM` source) or *built* (its manifest is synthesized here).

use super::ImageError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/:@+-]*$").expect("valid regex"))
}

fn os_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/-]*$").expect("valid regex"))
}

pub(crate) fn validate_name(name: &str) -> Result<(), ImageError> {
    if name.is_empty() {
        return Err(ImageError::InvalidArgument(
            "image name must not be empty".to_string(),
        ));
    }
    if !name_pattern().is_match(name) {
        return Err(ImageError::InvalidArgument(format!(
            "malformed image name '{}'",
            name.escape_debug()
        )));
    }
    // the name doubles as the staging directory below the contexts root
    if name
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(ImageError::InvalidArgument(format!(
            "image name '{}' has an empty, '.' or '..' path segment",
            name
        )));
    }
    Ok(())
}

pub(crate) fn validate_os(os: &str) -> Result<(), ImageError> {
    if os.is_empty() {
        return Err(ImageError::InvalidArgument(
            "image os must not be empty".to_string(),
        ));
    }
    if !os_pattern().is_match(os) {
        return Err(ImageError::InvalidArgument(format!(
            "malformed image os '{}'",
            os.escape_debug()
        )));
    }
    Ok(())
}

/// Immutable reference to a container image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageReference {
    /// Provided by a registry or the local daemon, never built here
    Imported { name: String, os: String },
    /// Produced by an [`ImageBuilder`](super::ImageBuilder)
    Built { name: String, os: String },
}

impl ImageReference {
    /// Creates a reference to an externally available image
    pub fn imported(name: impl Into<String>, os: impl Into<String>) -> Result<Self, ImageError> {
        let (name, os) = (name.into(), os.into());
        validate_name(&name)?;
        validate_os(&os)?;
        Ok(ImageReference::Imported { name, os })
    }

    /// Inputs are validated by the builder before this is called
    pub(crate) fn built(name: String, os: String) -> Self {
        ImageReference::Built { name, os }
    }

    pub fn name(&self) -> &str {
        match self {
            ImageReference::Imported { name, .. } | ImageReference::Built { name, .. } => name,
        }
    }

    pub fn os(&self) -> &str {
        match self {
            ImageReference::Imported { os, .. } | ImageReference::Built { os, .. } => os,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, ImageReference::Built { .. })
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Argument accepted by [`ImageBuilder::from`](super::ImageBuilder::from)
///
/// Plain names are resolved as imported images on the builder's own os.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Reference(ImageReference),
    Name(String),
}

impl ImageSource {
    pub(crate) fn resolve(self, os: &str) -> Result<ImageReference, ImageError> {
        match self {
            ImageSource::Reference(reference) => Ok(reference),
            ImageSource::Name(name) => ImageReference::imported(name, os),
        }
    }
}

impl From<ImageReference> for ImageSource {
    fn from(reference: ImageReference) -> Self {
        ImageSource::Reference(reference)
    }
}

impl From<&ImageReference> for ImageSource {
    fn from(reference: &ImageReference) -> Self {
        ImageSource::Reference(reference.clone())
    }
}

impl From<&str> for ImageSource {
    fn from(name: &str) -> Self {
        ImageSource::Name(name.to_string())
    }
}

impl From<String> for ImageSource {
    fn from(name: String) -> Self {
        ImageSource::Name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        simple = { "base" },
        tagged = { "base:latest" },
        registry = { "mcr.microsoft.com/windows/servercore:ltsc2019" },
        digest = { "alpine@sha256:0123abcd" },
        dashed = { "myapp-node-win64" },
        nested = { "company/base" },
        dotted_segment = { "my.registry/app..v2" },
    )]
    fn test_valid_names(name: &str) {
        let image = ImageReference::imported(name, "linux").unwrap();
        assert_eq!(image.name(), name);
        assert_eq!(image.os(), "linux");
        assert!(!image.is_built());
    }

    #[parameterized(
        empty = { "" },
        space = { "my app" },
        newline = { "app\nRUN rm -rf /" },
        leading_dash = { "-app" },
        quote = { "\"app\"" },
        parent_segment = { "a/../b" },
        escaping = { "x/../../escaped" },
        empty_segment = { "a//b" },
        trailing_slash = { "app/" },
        current_dir = { "./app" },
        dot_segment = { "a/./b" },
    )]
    fn test_invalid_names(name: &str) {
        let result = ImageReference::imported(name, "linux");
        assert!(matches!(result, Err(ImageError::InvalidArgument(_))));
    }

    #[parameterized(
        empty = { "" },
        space = { "linux amd64" },
        colon = { "linux:amd64" },
    )]
    fn test_invalid_os(os: &str) {
        let result = ImageReference::imported("base", os);
        assert!(matches!(result, Err(ImageError::InvalidArgument(_))));
    }

    #[test]
    fn test_platform_os_accepted() {
        let image = ImageReference::imported("base", "linux/amd64").unwrap();
        assert_eq!(image.os(), "linux/amd64");
    }

    #[test]
    fn test_source_resolution_uses_builder_os() {
        let resolved = ImageSource::from("base:latest").resolve("windows").unwrap();
        assert_eq!(
            resolved,
            ImageReference::Imported {
                name: "base:latest".to_string(),
                os: "windows".to_string()
            }
        );
    }

    #[test]
    fn test_source_resolution_keeps_reference() {
        let reference = ImageReference::imported("base", "linux").unwrap();
        let resolved = ImageSource::from(&reference).resolve("windows").unwrap();
        assert_eq!(resolved, reference);
    }

    #[test]
    fn test_display_and_serialize() {
        let built = ImageReference::built("app".to_string(), "linux".to_string());
        assert_eq!(built.to_string(), "app");
        assert!(built.is_built());

        let json = serde_json::to_value(&built).unwrap();
        assert_eq!(json["kind"], "built");
        assert_eq!(json["name"], "app");
        assert_eq!(json["os"], "linux");
    }
}
