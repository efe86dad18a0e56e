use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use pitchcal_core::{CorrespondencePoint, Pt2};
use pitchcal_pipeline::{
    Calibration, CalibrationSession, CalibrationStore, JsonDirStore, PitchCalConfig, PoseInput,
};
use serde::Serialize;

/// Football pitch calibration from clicked correspondences.
#[derive(Debug, Parser)]
#[command(author, version, about = "Video↔pitch calibration and camera pose recovery")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fit the pixel→pitch homography and print the calibration record.
    Homography {
        /// JSON array of correspondence points.
        #[arg(long)]
        input: String,
        /// Optional JSON PitchCalConfig. Defaults are used if omitted.
        #[arg(long)]
        config: Option<String>,
        #[arg(long, default_value = "default")]
        video_id: String,
        /// Directory of saved calibrations; the record is updated in place.
        #[arg(long)]
        store: Option<String>,
    },
    /// Recover the camera pose from `{ viewport, points, initial_guess? }`.
    Pose {
        #[arg(long)]
        input: String,
        #[arg(long)]
        config: Option<String>,
    },
    /// Map one point through a saved calibration.
    Project {
        /// Calibration record JSON as printed by `homography`.
        #[arg(long)]
        calibration: String,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        /// Map pitch meters to video pixels instead.
        #[arg(long)]
        inverse: bool,
    },
}

#[derive(Debug, Serialize)]
struct ProjectedPoint {
    x: f64,
    y: f64,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_config(config_path: Option<&str>) -> Result<PitchCalConfig> {
    match config_path {
        Some(path) => PitchCalConfig::from_json_file(Path::new(path)),
        None => Ok(PitchCalConfig::default()),
    }
}

fn run_homography_from_files(
    input_path: &str,
    config_path: Option<&str>,
    video_id: &str,
    store_dir: Option<&str>,
) -> Result<String> {
    let points: Vec<CorrespondencePoint> = load_json_file(Path::new(input_path))?;
    let config = load_config(config_path)?;

    let mut session = CalibrationSession::new(video_id, config);
    for point in points {
        session.add_point(point)?;
    }
    let computed = session.compute()?.clone();

    let record = match store_dir {
        Some(dir) => {
            let mut store = JsonDirStore::open(dir)?;
            let record = match store.load(video_id)? {
                Some(prev) => prev.replaced(
                    computed.homography_matrix,
                    computed.inverse_matrix,
                    computed.points,
                    computed.metrics,
                ),
                None => computed,
            };
            store.save(&record)?;
            info!("stored calibration for '{video_id}' in {dir}");
            record
        }
        None => computed,
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

fn run_pose_from_files(input_path: &str, config_path: Option<&str>) -> Result<String> {
    let input: PoseInput = load_json_file(Path::new(input_path))?;
    let config = load_config(config_path)?;
    let solution = input.solve(&config.pitch, &config.pose)?;
    info!(
        "pose error {:.3e} (start {:.3e}), {} accepted steps",
        solution.error, solution.initial_error, solution.accepted
    );
    Ok(serde_json::to_string_pretty(&solution)?)
}

fn run_project_from_file(calibration_path: &str, x: f64, y: f64, inverse: bool) -> Result<String> {
    let record: Calibration = load_json_file(Path::new(calibration_path))?;
    let p: Pt2 = if inverse {
        record.pitch_to_video(x, y)?
    } else {
        record.video_to_pitch(x, y)?
    };
    Ok(serde_json::to_string_pretty(&ProjectedPoint { x: p.x, y: p.y })?)
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let json = match &args.command {
        Command::Homography {
            input,
            config,
            video_id,
            store,
        } => run_homography_from_files(input, config.as_deref(), video_id, store.as_deref())?,
        Command::Pose { input, config } => run_pose_from_files(input, config.as_deref())?,
        Command::Project {
            calibration,
            x,
            y,
            inverse,
        } => run_project_from_file(calibration, *x, *y, *inverse)?,
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pitchcal_core::{
        CameraParameters, PerspectiveProjection, PitchDimensions, PitchFeature, Viewport,
    };
    use pitchcal_optim::PoseSolution;
    use tempfile::NamedTempFile;

    fn write_json<T: serde::Serialize>(value: &T, path: &Path) {
        serde_json::to_writer_pretty(fs::File::create(path).unwrap(), value).unwrap();
    }

    fn synthetic_points(viewport: &Viewport) -> Vec<CorrespondencePoint> {
        let cam = CameraParameters {
            x: 0.0,
            y: 25.0,
            z: 50.0,
            rotation_x: -0.3,
            rotation_y: 0.0,
            rotation_z: 0.0,
            field_of_view_degrees: 45.0,
        };
        let proj = PerspectiveProjection::new(&cam, viewport.aspect_ratio());
        let pitch = PitchDimensions::default();
        [
            PitchFeature::CornerBottomLeft,
            PitchFeature::CornerBottomRight,
            PitchFeature::HalfwayBottom,
            PitchFeature::PenaltyAreaLeftBottom,
            PitchFeature::PenaltyAreaLeftTop,
            PitchFeature::PenaltyAreaRightBottom,
            PitchFeature::PenaltyAreaRightTop,
            PitchFeature::CenterSpot,
        ]
        .into_iter()
        .map(|f| {
            let m = pitch.feature_position(f);
            let ndc = proj.project(&pitch.to_world(&m)).expect("visible");
            CorrespondencePoint::new(viewport.ndc_to_pixel(&ndc), m, f.name())
        })
        .collect()
    }

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn homography_then_project() {
        let vp = Viewport::new(1920.0, 1080.0).unwrap();
        let input_file = NamedTempFile::new().unwrap();
        write_json(&synthetic_points(&vp), input_file.path());

        let json =
            run_homography_from_files(input_file.path().to_str().unwrap(), None, "clip", None)
                .expect("homography should succeed");
        let record: Calibration = serde_json::from_str(&json).unwrap();
        assert_eq!(record.video_id, "clip");
        assert!(record.metrics.is_valid);

        let cal_file = NamedTempFile::new().unwrap();
        fs::write(cal_file.path(), &json).unwrap();
        let px = record.pitch_to_video(52.5, 34.0).unwrap();
        let out =
            run_project_from_file(cal_file.path().to_str().unwrap(), px.x, px.y, false).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!((v["x"].as_f64().unwrap() - 52.5).abs() < 1e-6);
        assert!((v["y"].as_f64().unwrap() - 34.0).abs() < 1e-6);
    }

    #[test]
    fn store_keeps_record_identity() {
        let vp = Viewport::new(1920.0, 1080.0).unwrap();
        let input_file = NamedTempFile::new().unwrap();
        write_json(&synthetic_points(&vp), input_file.path());
        let dir = tempfile::tempdir().unwrap();
        let input = input_file.path().to_str().unwrap();
        let store = dir.path().to_str();

        let first: Calibration =
            serde_json::from_str(&run_homography_from_files(input, None, "m1", store).unwrap())
                .unwrap();
        let second: Calibration =
            serde_json::from_str(&run_homography_from_files(input, None, "m1", store).unwrap())
                .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert!(dir.path().join("m1.json").exists());
    }

    #[test]
    fn pose_from_file_with_config() {
        let vp = Viewport::new(1920.0, 1080.0).unwrap();
        let input = PoseInput {
            viewport: vp,
            points: synthetic_points(&vp),
            initial_guess: Some(CameraParameters {
                x: 0.0,
                y: 28.0,
                z: 55.0,
                rotation_x: -0.35,
                rotation_y: 0.0,
                rotation_z: 0.0,
                field_of_view_degrees: 40.0,
            }),
        };
        let input_file = NamedTempFile::new().unwrap();
        let config_file = NamedTempFile::new().unwrap();
        write_json(&input, input_file.path());
        write_json(&PitchCalConfig::default(), config_file.path());

        let json = run_pose_from_files(
            input_file.path().to_str().unwrap(),
            Some(config_file.path().to_str().unwrap()),
        )
        .expect("pose should succeed");
        let sol: PoseSolution = serde_json::from_str(&json).unwrap();
        assert!(sol.error < 1e-4, "error {}", sol.error);
    }

    #[test]
    fn too_few_points_is_reported() {
        let vp = Viewport::new(1920.0, 1080.0).unwrap();
        let mut points = synthetic_points(&vp);
        points.truncate(3);
        let input_file = NamedTempFile::new().unwrap();
        write_json(&points, input_file.path());

        let err = run_homography_from_files(input_file.path().to_str().unwrap(), None, "x", None)
            .unwrap_err();
        assert!(err.to_string().contains("at least 4"));
    }
}
