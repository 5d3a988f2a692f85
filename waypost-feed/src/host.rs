//! Host capabilities the feed consumes.
//!
//! The hosting shell implements [`PackageHost`] explicitly; the feed
//! never introspects host internals on its own.

/// Well-known relative path of the optional per-package changes document.
pub const CHANGES_DOCUMENT_PATH: &str = "waypost/changes.json";

/// One externally loaded package, as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package identity; the feed lowercases it before use.
    pub id: String,
    /// Display name shown to users.
    pub name: String,
    /// Package version string.
    pub version: String,
}

impl PackageInfo {
    #[must_use]
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            version: version.to_owned(),
        }
    }
}

/// Capability interface the hosting application implements for the feed.
pub trait PackageHost: Send + Sync {
    /// Enumerates every currently loaded external package.
    fn loaded_packages(&self) -> Vec<PackageInfo>;

    /// Opens the optional changes document bundled by `package_id` at
    /// [`CHANGES_DOCUMENT_PATH`] and returns its raw text.
    ///
    /// `Ok(None)` means the package ships no document, which is not an
    /// error. An `Err` is treated as a parse failure for that document
    /// only and never aborts discovery for other packages.
    fn open_changes_document(&self, package_id: &str) -> anyhow::Result<Option<String>>;

    /// Fingerprint of the host configuration relevant to the feed.
    ///
    /// Any change between two reads marks the cache dirty. Hosts with no
    /// relevant configuration can keep the default.
    fn config_fingerprint(&self) -> String {
        String::new()
    }
}
