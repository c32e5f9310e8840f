use std::path::PathBuf;
use thiserror::Error;

/// Metadata combinations the resolver refuses to describe. Aborts the root being classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("package {package}: a type must be specified for each package-level adapter")]
    PackageAdapterWithoutType { package: String },

    #[error("package {package}: unadaptable type: {ty}")]
    UnadaptableType { package: String, ty: String },

    #[error("qname enum {name} cannot be serialized to JSON because its base is {base}")]
    QNameEnumBase { name: String, base: String },

    #[error("{name}: no more than one constant can be marked as the unknown qname value")]
    DuplicateUnknownQName { name: String },

    #[error("{name}: duplicate qname enum value: {uri}")]
    DuplicateQNameValue { name: String, uri: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid input pattern: {0}")]
    Pattern(String),
}
