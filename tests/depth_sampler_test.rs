use kinect_registration::depth::{DEPTH_SENTINEL, DepthFrame};
use kinect_registration::{Camera, FramePair, RegistrationError};

#[test]
fn test_invalid_center_uses_right_neighbor() {
    let mut frame = DepthFrame::filled(5, 5, DEPTH_SENTINEL);
    frame.set_raw(3, 2, 812);
    assert_eq!(frame.sample(2, 2), 812.0);
}

#[test]
fn test_valid_center_ignores_neighbors() {
    let mut frame = DepthFrame::filled(5, 5, 900);
    frame.set_raw(2, 2, 640);
    assert_eq!(frame.sample(2, 2), 640.0);
}

#[test]
fn test_all_nine_invalid_returns_sentinel() {
    let mut frame = DepthFrame::filled(5, 5, DEPTH_SENTINEL);
    // valid readings two pixels away are out of reach
    frame.set_raw(0, 0, 100);
    frame.set_raw(4, 4, 100);
    assert_eq!(frame.sample(2, 2), DEPTH_SENTINEL as f32);
}

#[test]
fn test_diagonal_fallback_order() {
    let mut frame = DepthFrame::filled(3, 3, DEPTH_SENTINEL);
    frame.set_raw(2, 2, 4); // down-right
    frame.set_raw(0, 2, 3); // down-left
    assert_eq!(frame.sample(1, 1), 3.0);
    frame.set_raw(2, 0, 2); // up-right
    assert_eq!(frame.sample(1, 1), 2.0);
    frame.set_raw(0, 0, 1); // up-left
    assert_eq!(frame.sample(1, 1), 1.0);
}

#[test]
fn test_flagged_sentinel_is_still_invalid() {
    let mut frame = DepthFrame::filled(3, 3, 0x8000 | DEPTH_SENTINEL);
    frame.set_raw(0, 1, 0x8000 | 555);
    assert_eq!(frame.sample(1, 1), 555.0);
}

#[test]
fn test_frame_pair_sizes() {
    let a = DepthFrame::filled(4, 3, 10);
    let b = DepthFrame::filled(4, 4, 20);
    let err = FramePair::new(a.clone(), b, 4, 3).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::FrameSizeMismatch {
            camera: Camera::B,
            ..
        }
    ));

    let pair = FramePair::new(a.clone(), a, 4, 3).unwrap();
    assert_eq!(pair.sample(Camera::B, 1, 1), 10.0);
}

#[test]
fn test_buffer_size_checked() {
    assert!(DepthFrame::new(4, 4, vec![0; 15]).is_err());
    assert!(DepthFrame::new(4, 4, vec![0; 16]).is_ok());
}

#[test]
fn test_orthogonal_neighbors_before_diagonals() {
    let mut frame = DepthFrame::filled(3, 3, DEPTH_SENTINEL);
    frame.set_raw(1, 0, 50); // up
    frame.set_raw(0, 0, 60); // up-left
    frame.set_raw(1, 2, 70); // down
    assert_eq!(frame.sample(1, 1), 70.0);
}

#[test]
fn test_down_before_up() {
    let mut frame = DepthFrame::filled(3, 3, DEPTH_SENTINEL);
    frame.set_raw(1, 0, 50); // up
    frame.set_raw(1, 2, 70); // down
    assert_eq!(frame.sample(1, 1), 70.0);
}

#[test]
fn test_full_neighbor_order() {
    // right, left, down, up, up-left, up-right, down-left, down-right
    let order = [(2, 1), (0, 1), (1, 2), (1, 0), (0, 0), (2, 0), (0, 2), (2, 2)];
    let mut frame = DepthFrame::filled(3, 3, DEPTH_SENTINEL);
    // fill from the lowest priority up, each new value must win
    for (rank, (x, y)) in order.iter().enumerate().rev() {
        let raw = 100 + rank as u16;
        frame.set_raw(*x, *y, raw);
        assert_eq!(frame.sample(1, 1), raw as f32);
    }
}
