//! Camera pose recovery from pitch correspondences.
//!
//! [`CameraPoseSolver`] fits the six free parameters of a
//! [`pitchcal_core::CameraParameters`] (position, pitch, yaw, vertical field
//! of view) to observed screen positions by greedy staged random search on
//! the mean squared NDC reprojection error ([`reprojection_mse`]).

mod objective;
mod pose;

pub use objective::*;
pub use pose::*;
