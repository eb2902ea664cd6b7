//! File-backed [`ArtifactProducer`].

use std::path::Path;

use postbird_core::{types::Artifact, ArtifactProducer};

use crate::error::{io_err, RenderError};

/// Reads an [`Artifact`] from a YAML description on disk.
///
/// ```yaml
/// title: Cardinals Visit
/// date: 2025-03-01T08:30:00Z
/// tags: [birds, wildlife]
/// body: |
///   ## Afternoon Visitors
/// metadata:
///   author: Backyard Bird AI
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlArtifactSource;

impl ArtifactProducer for YamlArtifactSource {
    type Source = Path;
    type Error = RenderError;

    fn produce(&self, source: &Path) -> Result<Artifact, RenderError> {
        let contents = std::fs::read_to_string(source).map_err(|e| io_err(source, e))?;
        serde_yaml::from_str(&contents).map_err(|e| RenderError::Parse {
            path: source.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn produces_artifact_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.yaml");
        std::fs::write(
            &path,
            "title: Cardinals Visit\ndate: 2025-03-01T08:30:00Z\ntags: [birds]\nbody: |\n  Red birds.\nmetadata:\n  draft: true\n",
        )
        .unwrap();

        let artifact = YamlArtifactSource.produce(&path).expect("produce");
        assert_eq!(artifact.title, "Cardinals Visit");
        assert_eq!(artifact.tags, vec!["birds"]);
        assert_eq!(artifact.body, "Red birds.\n");
        assert!(artifact.metadata.draft);
        assert_eq!(artifact.metadata.author, "Backyard Bird AI");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = YamlArtifactSource
            .produce(&dir.path().join("nope.yaml"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn missing_title_is_parse_error_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "body: x\ndate: 2025-03-01T08:30:00Z\n").unwrap();
        let err = YamlArtifactSource.produce(&path).unwrap_err();
        assert!(matches!(err, RenderError::Parse { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }
}
