//! Engine error types.
//!
//! Configuration mistakes (missing data, bad camera ids, too few cameras)
//! surface as [`HullError`]. Geometric degeneracies never do; those are
//! skipped where they occur and reported through `log::debug!`/`log::trace!`.

use thiserror::Error;

/// Errors that can occur while configuring or running the engine.
#[derive(Debug, Error)]
pub enum HullError {
    /// Silhouette data was never attached to the engine.
    #[error("silhouettes not loaded")]
    SilhouettesMissing,
    /// The silhouette set covers a different number of cameras than the
    /// calibration.
    #[error("silhouette set covers {got} cameras, calibration has {expected}")]
    SilhouetteCountMismatch {
        /// Cameras covered by the silhouette set.
        got: usize,
        /// Cameras in the calibration set.
        expected: usize,
    },
    /// A camera id referenced data outside the calibration set.
    #[error("camera id {0} out of range ({1} cameras calibrated)")]
    UnknownCamera(usize, usize),
    /// No silhouette camera was selected.
    #[error("no silhouette cameras configured")]
    NoSilhouetteCameras,
    /// Primitives were requested before the partner table existed.
    #[error("camera ordering not built; call build_most_orthogonal_cameras first")]
    OrderingNotBuilt,
    /// Reconstruction needs at least two cameras with silhouette data.
    #[error("need at least 2 silhouette cameras, got {0}")]
    NotEnoughCameras(usize),
}
