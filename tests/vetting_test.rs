use kinect_registration::vetting::{
    AcceptAll, AutoRejectReason, Candidate, CandidateOutcome, Decision, ScriptedDecisions,
    VettingSession,
};
use kinect_registration::{PixelPoint, RegistrationConfig, RegistrationSession};

fn candidate(a: (f32, f32), b: (f32, f32)) -> Candidate {
    Candidate::new(PixelPoint::new(a.0, a.1), PixelPoint::new(b.0, b.1))
}

#[test]
fn test_first_accept_is_never_filtered() {
    // steep slope that would never pass the filter later on
    let candidates = vec![candidate((10.0, 10.0), (10.0, 470.0))];
    let mut decisions = ScriptedDecisions::new([Decision::Accept]);
    let report = VettingSession::new(&RegistrationConfig::default()).run(&candidates, &mut decisions);
    assert_eq!(report.accepted(), 1);
    assert_eq!(decisions.prompts(), 1);
    assert!(matches!(report.outcomes[0], CandidateOutcome::Accepted { .. }));
}

#[test]
fn test_candidates_before_first_accept_are_prompted() {
    let candidates = vec![
        candidate((10.0, 10.0), (10.0, 470.0)),
        candidate((100.0, 100.0), (100.0, 100.0)),
    ];
    let mut decisions = ScriptedDecisions::new([Decision::Reject, Decision::Accept]);
    let report = VettingSession::new(&RegistrationConfig::default()).run(&candidates, &mut decisions);
    assert_eq!(decisions.prompts(), 2);
    assert_eq!(report.outcomes[0], CandidateOutcome::Rejected);
    assert_eq!(report.accepted(), 1);
}

#[test]
fn test_slope_outlier_auto_rejected_without_prompt() {
    let candidates = vec![
        candidate((100.0, 100.0), (100.0, 100.0)), // slope 0
        candidate((300.0, 200.0), (300.0, 250.0)), // slope -50/640
        candidate((200.0, 150.0), (200.0, 152.0)), // slope -2/640
    ];
    let mut decisions = ScriptedDecisions::new([Decision::Accept, Decision::Accept]);
    let report = VettingSession::new(&RegistrationConfig::default()).run(&candidates, &mut decisions);

    assert_eq!(decisions.prompts(), 2);
    assert_eq!(report.accepted(), 2);
    match report.outcomes[1] {
        CandidateOutcome::AutoRejected(AutoRejectReason::SlopeOutOfRange { slope, average }) => {
            assert!((slope + 50.0 / 640.0).abs() < 1e-9);
            assert_eq!(average, 0.0);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_point_reuse_auto_rejected_without_prompt() {
    let candidates = vec![
        candidate((100.0, 100.0), (100.0, 100.0)),
        candidate((100.0, 100.0), (150.0, 100.0)), // same A point
        candidate((120.0, 100.0), (100.0, 100.0)), // same B point
        candidate((120.0, 300.0), (121.0, 300.0)),
    ];
    let mut decisions = ScriptedDecisions::new([Decision::Accept, Decision::Accept]);
    let report = VettingSession::new(&RegistrationConfig::default()).run(&candidates, &mut decisions);

    assert_eq!(decisions.prompts(), 2);
    assert_eq!(report.accepted(), 2);
    let reasons: Vec<_> = report.auto_rejected().collect();
    assert_eq!(reasons.len(), 2);
    assert_eq!(reasons[0], (1, &AutoRejectReason::PointReuse));
    assert_eq!(reasons[1], (2, &AutoRejectReason::PointReuse));
}

#[test]
fn test_running_average_tracks_accepted_slopes() {
    // slopes 0, -0.04 and -0.065: the third is too far from the first alone,
    // but close enough to the average of the first two
    let candidates = vec![
        candidate((100.0, 100.0), (100.0, 100.0)),
        candidate((200.0, 100.0), (200.0, 125.6)),
        candidate((300.0, 100.0), (300.0, 141.6)),
    ];
    let config = RegistrationConfig::default();
    let report = VettingSession::new(&config).run(&candidates, &mut AcceptAll);
    assert_eq!(report.accepted(), 3);

    let strict = RegistrationConfig {
        slope_tolerance: 0.01,
        ..config
    };
    let session = VettingSession::new(&strict);
    assert!(session.average_slope().is_none());
    assert!(session.screen(&candidates[2]).is_none());
    let report = session.run(&candidates, &mut AcceptAll);
    assert_eq!(report.accepted(), 1);
}

#[test]
fn test_stop_keeps_accepted() {
    let candidates = vec![
        candidate((100.0, 100.0), (100.0, 100.0)),
        candidate((200.0, 100.0), (200.0, 101.0)),
        candidate((300.0, 100.0), (300.0, 101.0)),
    ];
    let mut decisions = ScriptedDecisions::new([Decision::Accept, Decision::Stop]);
    let report = VettingSession::new(&RegistrationConfig::default()).run(&candidates, &mut decisions);
    assert!(report.stopped);
    assert_eq!(report.accepted(), 1);
    assert_eq!(report.outcomes.len(), 1);
}

#[test]
fn test_new_pass_starts_empty() {
    let candidates = vec![
        candidate((100.0, 100.0), (100.0, 100.0)),
        candidate((200.0, 100.0), (200.0, 101.0)),
    ];
    let mut session = RegistrationSession::new(RegistrationConfig::default());
    session.vet(&candidates, &mut AcceptAll);
    assert_eq!(session.correspondences().len(), 2);

    // the same points are accepted again instead of clashing with the old pass
    let report = session.vet(&candidates[..1], &mut AcceptAll);
    assert_eq!(report.accepted(), 1);
    assert_eq!(session.correspondences().len(), 1);
}
