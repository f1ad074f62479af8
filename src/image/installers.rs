//! Built-in procedures that run platform package installers
//!
//! Installers live under a fixed directory of the target image and are started
//! by an interpreter already present there. Nothing checks that the target
//! image actually ships them; pairing an installer with a compatible base
//! image is up to the caller.

use super::{BuildContext, Procedure};
use tracing::debug;

/// Directory holding installer scripts inside Windows build images
pub const INSTALLERS_ROOT: &str = "C:/dockloader";

/// Appends one `RUN <interpreter> <root>/<package>/install.js` build instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInstaller {
    interpreter: String,
    package: String,
}

impl PackageInstaller {
    pub fn new(interpreter: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            package: package.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn instruction(&self) -> String {
        format!(
            "RUN {} {}/{}/install.js",
            self.interpreter, INSTALLERS_ROOT, self.package
        )
    }
}

impl Procedure for PackageInstaller {
    fn name(&self) -> &str {
        &self.package
    }

    fn apply(&self, context: &mut BuildContext) {
        debug!(package = %self.package, image = %context.name(), "queueing installer");
        context.push_build(self.instruction());
    }
}

/// Node.js installer
pub fn node() -> PackageInstaller {
    PackageInstaller::new("node", "nodejs")
}

/// Looks up a built-in installer by its short name
pub fn by_name(name: &str) -> Option<PackageInstaller> {
    match name.to_lowercase().as_str() {
        "node" | "nodejs" => Some(node()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_node_installer_line() {
        let mut context = BuildContext::new("app", "windows", Path::new("ctx"));

        node().apply(&mut context);

        assert_eq!(context.build(), ["RUN node C:/dockloader/nodejs/install.js"]);
        assert!(context.installers().is_empty());
        assert!(context.clean().is_empty());
    }

    #[test]
    fn test_no_os_check() {
        let mut context = BuildContext::new("app", "linux", Path::new("ctx"));
        node().apply(&mut context);
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("node"), Some(node()));
        assert_eq!(by_name("NodeJS"), Some(node()));
        assert_eq!(by_name("python"), None);
    }
}
