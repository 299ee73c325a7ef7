pub mod fs_artifact_cache;

pub use fs_artifact_cache::{FsArtifactCache, MIN_ARTIFACT_BYTES};
