use clap::Parser;
use kinect_registration::cloud::{CloudUnits, PointCloud};
use kinect_registration::io::{
    load_candidates, load_depth_frame, object_from_json, write_ply, write_registration_report,
};
use kinect_registration::vetting::{AcceptAll, DecisionSource, TerminalDecisions};
use kinect_registration::{
    FramePair, RegistrationConfig, RegistrationError, RegistrationSession, TransformMode,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(version, about, author)]
struct KregCli {
    /// raw depth frame of camera A, 16-bit png
    depth_a: PathBuf,

    /// raw depth frame of camera B, 16-bit png
    depth_b: PathBuf,

    /// candidate matches json, best first
    candidates: PathBuf,

    /// registration config json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// accept every candidate that passes the filters without asking
    #[arg(long)]
    accept_all: bool,

    /// transform applied to camera A's exported cloud
    #[arg(short, long, value_enum, default_value = "full")]
    mode: TransformMode,

    /// coordinates of the exported clouds
    #[arg(long, value_enum, default_value = "normalized")]
    units: CloudUnits,

    /// output folder for report.json and the clouds
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// also export cloud_a.ply and cloud_b.ply
    #[arg(long)]
    export_clouds: bool,
}

fn main() {
    env_logger::init();
    let cli = KregCli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &KregCli) -> Result<(), RegistrationError> {
    let config: RegistrationConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => RegistrationConfig::default(),
    };
    let frames = FramePair::new(
        load_depth_frame(&cli.depth_a)?,
        load_depth_frame(&cli.depth_b)?,
        config.image_width,
        config.image_height,
    )?;
    let candidates = load_candidates(&cli.candidates)?;
    println!("{} candidate matches loaded", candidates.len());
    if !cli.accept_all {
        println!(
            "for each candidate: 'y' accepts, 'q' stops, anything else denies. \
             Candidates off the average slope or reusing a point are skipped."
        );
    }

    let mut session = RegistrationSession::new(config);
    let mut decisions: Box<dyn DecisionSource> = if cli.accept_all {
        Box::new(AcceptAll)
    } else {
        Box::new(TerminalDecisions::new(
            std::io::stdin().lock(),
            std::io::stdout(),
        ))
    };
    let vetting = session.vet(&candidates, decisions.as_mut());
    println!("{} correspondences accepted", vetting.accepted());

    let now = Instant::now();
    session.compute_centroids(&frames)?;
    let solution = session.solve(&frames)?;
    println!("solving took {:.6} sec", now.elapsed().as_secs_f64());
    println!("rotation:{}", solution.rotation);
    println!("translation:{}", solution.translation.transpose());
    for issue in &solution.diagnostics.issues {
        println!("warning: {}", issue);
    }
    session.set_mode(cli.mode);

    std::fs::create_dir_all(&cli.output)?;
    write_registration_report(cli.output.join("report.json"), &session, Some(&vetting))?;

    if cli.export_clouds {
        let config = session.config();
        let transform = match cli.units {
            CloudUnits::Normalized => session.published_transform(),
            CloudUnits::Metric => {
                log::warn!("transforms are solved in normalized units, exporting metric clouds untransformed");
                kinect_registration::RigidTransform::identity()
            }
        };
        let cloud_a = PointCloud::from_depth_frame(&frames.a, config, cli.units).transformed(&transform);
        let cloud_b = PointCloud::from_depth_frame(&frames.b, config, cli.units);
        write_ply(cli.output.join("cloud_a.ply"), &cloud_a)?;
        write_ply(cli.output.join("cloud_b.ply"), &cloud_b)?;
        println!("exported {} + {} points", cloud_a.len(), cloud_b.len());
    }
    println!("results written to {}", cli.output.display());
    Ok(())
}
