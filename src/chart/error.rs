use crate::fieldpath::PathError;
use crate::version::VersionError;
use std::path::PathBuf;
use thiserror::Error;

/// ChartError is returned when Chart.yaml cannot be loaded or bumped.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid chart metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Chart.yaml missing version")]
    MissingVersion,

    #[error("chart version: {0}")]
    Version(#[from] VersionError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("{}: {source}", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
