//! Calibration workflows built on the `pitchcal` solvers.
//!
//! - [`PitchCalConfig`]: JSON-loadable configuration for every stage.
//! - [`CalibrationSession`]: the feature-keyed point set of one video and its
//!   current [`Calibration`].
//! - [`CalibrationStore`]: persistence boundary, with [`InMemoryStore`] and
//!   [`JsonDirStore`] implementations.
//! - [`solve_camera_pose_from_points`] and [`CalibrationSession::solve_camera_pose`]:
//!   pixel clicks → NDC → [`pitchcal_optim::CameraPoseSolver`].
//!
//! ```no_run
//! use pitchcal_core::{Viewport, CameraParameters};
//! use pitchcal_pipeline::{solve_camera_pose_from_points, CalibrationSession, PitchCalConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = CalibrationSession::new("match-7", PitchCalConfig::default());
//! let viewport = Viewport::new(1920.0, 1080.0)?;
//! let guess = CameraParameters::default();
//!
//! let from_session = session.solve_camera_pose(&viewport, Some(&guess))?;
//! let cfg = session.config();
//! let direct =
//!     solve_camera_pose_from_points(session.points(), &viewport, &cfg.pitch, Some(&guess), &cfg.pose)?;
//! assert_eq!(from_session, direct);
//! # Ok(())
//! # }
//! ```

mod config;
mod pose;
mod record;
mod session;
mod store;

pub use config::*;
pub use pose::*;
pub use record::*;
pub use session::*;
pub use store::*;
