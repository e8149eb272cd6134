use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use kinect_registration::centroid::{BackprojectedPair, centroid_of};
use kinect_registration::cloud::{CloudUnits, PointCloud};
use kinect_registration::depth::{DEPTH_SENTINEL, DepthFrame};
use kinect_registration::solver::solve_pairs;
use kinect_registration::{Point3D, RegistrationConfig};
use nalgebra as na;

fn bench_solve_pairs(c: &mut Criterion) {
    let r = na::Rotation3::from_euler_angles(0.02f32, -0.05, 0.1);
    let pairs: Vec<_> = (0..50)
        .map(|i| {
            let a = Point3D::new(
                (i * 37 % 640) as f32,
                (i * 53 % 480) as f32,
                600.0 + (i * 29 % 900) as f32,
            );
            let rotated = r * na::Vector3::new(a.x, a.y, a.z);
            BackprojectedPair {
                a,
                b: Point3D::new(rotated.x + 10.0, rotated.y - 3.0, rotated.z + 25.0),
            }
        })
        .collect();
    let centroid = centroid_of(&pairs).unwrap();
    let config = RegistrationConfig::default();

    c.bench_function("solve_pairs_50", |b| {
        b.iter(|| solve_pairs(black_box(&centroid), black_box(&pairs), &config))
    });
}

fn bench_depth_sample(c: &mut Criterion) {
    let mut frame = DepthFrame::filled(640, 480, DEPTH_SENTINEL);
    // every third column valid so most samples take the fallback path
    for y in 0..480 {
        for x in (0..640).step_by(3) {
            frame.set_raw(x, y, 800);
        }
    }
    c.bench_function("depth_sample_fallback", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for x in 1..639 {
                sum += frame.sample(black_box(x), 240);
            }
            sum
        })
    });
}

fn bench_point_cloud(c: &mut Criterion) {
    let frame = DepthFrame::filled(640, 480, 1000);
    let config = RegistrationConfig::default();
    c.bench_function("point_cloud_normalized", |b| {
        b.iter(|| PointCloud::from_depth_frame(black_box(&frame), &config, CloudUnits::Normalized))
    });
}

criterion_group!(benches, bench_solve_pairs, bench_depth_sample, bench_point_cloud);
criterion_main!(benches);
