use clap::{Parser, Subcommand};
use kinect_registration::depth::{DEPTH_SENTINEL, DepthFrame};
use kinect_registration::io::{object_to_json, save_depth_frame};
use kinect_registration::vetting::Candidate;
use kinect_registration::{PixelPoint, RegistrationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a pair of depth frames and candidate matches with a known offset
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Horizontal pixel shift of camera B relative to camera A
        #[arg(long, default_value = "12", allow_hyphen_values = true)]
        shift_x: i64,

        /// Vertical pixel shift of camera B relative to camera A
        #[arg(long, default_value = "-4", allow_hyphen_values = true)]
        shift_y: i64,

        /// Raw depth added to every camera B reading
        #[arg(long, default_value = "30", allow_hyphen_values = true)]
        depth_offset: i32,

        /// Number of candidate matches to write
        #[arg(short, long, default_value = "40")]
        num_candidates: usize,

        /// Fraction of candidates pointing at a random wrong pixel
        #[arg(long, default_value = "0.25")]
        outlier_ratio: f64,

        /// Fraction of depth pixels without a valid reading
        #[arg(long, default_value = "0.05")]
        invalid_ratio: f64,

        /// Image width
        #[arg(long, default_value = "640")]
        width: usize,

        /// Image height
        #[arg(long, default_value = "480")]
        height: usize,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            shift_x,
            shift_y,
            depth_offset,
            num_candidates,
            outlier_ratio,
            invalid_ratio,
            width,
            height,
            seed,
        } => {
            let scene = SceneParams {
                shift: (shift_x, shift_y),
                depth_offset,
                num_candidates,
                outlier_ratio,
                invalid_ratio,
                width,
                height,
            };
            generate_scene(&output, &scene, seed)?;
        }
    }

    Ok(())
}

struct SceneParams {
    shift: (i64, i64),
    depth_offset: i32,
    num_candidates: usize,
    outlier_ratio: f64,
    invalid_ratio: f64,
    width: usize,
    height: usize,
}

/// A tilted plane with a bump in the middle, in raw depth units.
fn scene_depth(u: f64, v: f64, width: f64, height: f64) -> f64 {
    let du = (u - width / 2.0) / width;
    let dv = (v - height / 2.0) / height;
    700.0 + 200.0 * du + 120.0 * dv + 150.0 * (-(du * du + dv * dv) * 12.0).exp()
}

fn generate_scene(
    output_dir: &str,
    scene: &SceneParams,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::fs;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (w, h) = (scene.width, scene.height);
    let (sx, sy) = scene.shift;

    let mut frame_a = DepthFrame::filled(w, h, DEPTH_SENTINEL);
    let mut frame_b = DepthFrame::filled(w, h, DEPTH_SENTINEL);
    for y in 0..h {
        for x in 0..w {
            let d = scene_depth(x as f64, y as f64, w as f64, h as f64);
            if !rng.random_bool(scene.invalid_ratio) {
                frame_a.set_raw(x, y, d.round() as u16);
            }
            // camera B pixel (x, y) sees the scene point at A pixel (x + sx, y + sy)
            let d = scene_depth((x as i64 + sx) as f64, (y as i64 + sy) as f64, w as f64, h as f64)
                + scene.depth_offset as f64;
            if !rng.random_bool(scene.invalid_ratio) {
                // upper bits carry flags on the real sensor
                frame_b.set_raw(x, y, 0x8000 | (d.round().clamp(0.0, 2046.0) as u16));
            }
        }
    }

    let margin = sx.unsigned_abs().max(sy.unsigned_abs()) as usize + 2;
    let mut candidates = Vec::with_capacity(scene.num_candidates);
    for _ in 0..scene.num_candidates {
        let xa = rng.random_range(margin..w - margin) as f32;
        let ya = rng.random_range(margin..h - margin) as f32;
        let point_a = PixelPoint::new(xa, ya);
        let point_b = if rng.random_bool(scene.outlier_ratio) {
            PixelPoint::new(
                rng.random_range(0..w) as f32,
                rng.random_range(0..h) as f32,
            )
        } else {
            PixelPoint::new(xa - sx as f32, ya - sy as f32)
        };
        candidates.push(Candidate {
            point_a,
            point_b,
            distance: rng.random_range(0.0..200.0),
        });
    }
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    fs::create_dir_all(output_dir)?;
    let out = Path::new(output_dir);
    save_depth_frame(out.join("depth_a.png"), &frame_a)?;
    save_depth_frame(out.join("depth_b.png"), &frame_b)?;
    object_to_json(out.join("candidates.json"), &candidates)?;
    let config = RegistrationConfig {
        image_width: w,
        image_height: h,
        ..Default::default()
    };
    object_to_json(out.join("config.json"), &config)?;

    println!(
        "Generated {}x{} scene with {} candidates in {}",
        w, h, scene.num_candidates, output_dir
    );
    Ok(())
}
