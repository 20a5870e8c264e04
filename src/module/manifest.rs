//! Module manifest and capability declarations.

use std::collections::HashSet;

/// Semantic version representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemVer {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl SemVer {
    /// Creates a new semantic version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What a module contributes to the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Relocates the login entry point.
    LoginRelocation,

    /// Rewrites generated URLs and outbound messages.
    UrlRewriting,

    /// Rejects dispatch for configured API routes.
    RouteFiltering,
}

/// Identity and capabilities of a module.
#[derive(Debug, Clone)]
pub struct ModuleManifest {
    /// Module name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Module version.
    pub version: SemVer,
    /// Declared capabilities.
    pub capabilities: HashSet<Capability>,
}

impl ModuleManifest {
    /// Starts building a manifest for the named module.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleManifestBuilder {
        ModuleManifestBuilder {
            manifest: ModuleManifest {
                name: name.into(),
                description: String::new(),
                version: SemVer::new(0, 1, 0),
                capabilities: HashSet::new(),
            },
        }
    }

    /// Checks whether the module declares a capability.
    #[must_use]
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Builder for [`ModuleManifest`].
#[derive(Debug)]
pub struct ModuleManifestBuilder {
    manifest: ModuleManifest,
}

impl ModuleManifestBuilder {
    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.manifest.description = description.into();
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.manifest.version = SemVer::new(major, minor, patch);
        self
    }

    /// Declares a capability.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.manifest.capabilities.insert(capability);
        self
    }

    /// Finishes the manifest.
    #[must_use]
    pub fn build(self) -> ModuleManifest {
        self.manifest
    }
}
