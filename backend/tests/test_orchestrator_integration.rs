//! Integration tests for the interaction sequence
//!
//! Scripted simulators make every branch of `interact` reachable with exact
//! expectations: which process ran, with how much material, and what ended
//! up in the event history.

use material_effects_core_rs::simulators::{MockProbe, MockSimulator};
use material_effects_core_rs::{
    Daughter, EventSink, Fate, FourVector, Interaction, MaterialEffects, MaterialError,
    ParticleTrack, Process, SimEvent, SimulatorSet, TrackIndex, TrackerLayer, Vector3,
    VertexIndex,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Event sink recording every insertion
#[derive(Default)]
struct RecordingSink {
    vertices: Vec<(FourVector, TrackIndex)>,
    tracks: Vec<(Daughter, VertexIndex)>,
}

impl EventSink for RecordingSink {
    fn add_vertex(&mut self, position: FourVector, parent_track: TrackIndex) -> VertexIndex {
        self.vertices.push((position, parent_track));
        VertexIndex(self.vertices.len() - 1)
    }

    fn add_track(&mut self, daughter: Daughter, parent_vertex: VertexIndex) -> TrackIndex {
        self.tracks.push((daughter, parent_vertex));
        TrackIndex(100 + self.tracks.len() - 1)
    }
}

/// Mocks for all five slots, with their probes
struct Rig {
    effects: MaterialEffects,
    pair: MockProbe,
    brem: MockProbe,
    eloss: MockProbe,
    ms: MockProbe,
    nuclear: MockProbe,
}

fn pair() -> Vec<Daughter> {
    vec![
        Daughter::new(FourVector::new(0.0, 2.0, 0.0, 2.0), 11, -1.0),
        Daughter::new(FourVector::new(0.0, 3.0, 0.0, 3.0), -11, 1.0),
    ]
}

fn rig(
    pair_production: MockSimulator,
    bremsstrahlung: MockSimulator,
    energy_loss: MockSimulator,
    multiple_scattering: MockSimulator,
    nuclear_interaction: MockSimulator,
    pt_min: f64,
) -> Rig {
    let probes = (
        pair_production.probe(),
        bremsstrahlung.probe(),
        energy_loss.probe(),
        multiple_scattering.probe(),
        nuclear_interaction.probe(),
    );
    let simulators = SimulatorSet {
        pair_production: Some(Box::new(pair_production)),
        bremsstrahlung: Some(Box::new(bremsstrahlung)),
        energy_loss: Some(Box::new(energy_loss)),
        multiple_scattering: Some(Box::new(multiple_scattering)),
        nuclear_interaction: Some(Box::new(nuclear_interaction)),
    };
    Rig {
        effects: MaterialEffects::with_simulators(simulators, pt_min),
        pair: probes.0,
        brem: probes.1,
        eloss: probes.2,
        ms: probes.3,
        nuclear: probes.4,
    }
}

/// All five processes enabled, none producing anything
fn quiet_rig() -> Rig {
    rig(
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        0.5,
    )
}

fn particle(pid: i32, charge: f64, position: Vector3, momentum: Vector3, mass: f64) -> ParticleTrack {
    ParticleTrack::new(
        FourVector::from_momentum(momentum, mass),
        FourVector::new(position.x, position.y, position.z, 0.0),
        pid,
        charge,
    )
}

/// Photon crossing a barrel layer at R = 30 head-on
fn photon() -> ParticleTrack {
    particle(22, 0.0, Vector3::new(30.0, 0.0, 0.0), Vector3::new(5.0, 0.0, 0.0), 0.0)
}

fn electron() -> ParticleTrack {
    particle(11, -1.0, Vector3::new(30.0, 0.0, 0.0), Vector3::new(5.0, 0.0, 0.0), 0.000_511)
}

fn charged_pion(position: Vector3) -> ParticleTrack {
    particle(211, 1.0, position, Vector3::new(2.0, 0.0, 0.0), 0.139_57)
}

/// Insensitive barrel layer outside every material-map zone at R = 30, |z| < 122
fn plain_layer(number: u32) -> TrackerLayer {
    TrackerLayer::barrel(number, 0.05, false)
}

// ============================================================================
// Disabled engine
// ============================================================================

#[test]
fn test_all_disabled_is_noop() {
    let mut effects = MaterialEffects::with_simulators(SimulatorSet::default(), 999.0);
    let mut sink = RecordingSink::default();

    for mut track in [photon(), electron(), charged_pion(Vector3::new(30.0, 0.0, 0.0))] {
        let before = track.clone();
        let fate = effects
            .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(0))
            .unwrap();
        assert_eq!(fate, Fate::Survives);
        assert_eq!(track, before);
    }

    assert!(sink.vertices.is_empty());
    assert!(sink.tracks.is_empty());
    assert!(effects.interaction_log().is_empty());
    assert_eq!(effects.energy_loss(), 0.0);
}

// ============================================================================
// Photons
// ============================================================================

#[test]
fn test_photon_conversion_records_pair() {
    let mut rig = rig(
        MockSimulator::new().with_daughters(pair()),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        0.5,
    );
    let mut sink = RecordingSink::default();
    let mut track = photon();

    let fate = rig
        .effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(7))
        .unwrap();

    assert_eq!(fate, Fate::Converted(VertexIndex(0)));
    assert_eq!(sink.vertices.len(), 1);
    assert_eq!(sink.vertices[0].1, TrackIndex(7));
    assert_eq!(sink.vertices[0].0, *track.position());
    assert_eq!(sink.tracks.len(), 2);
    assert!(sink.tracks.iter().all(|(_, vertex)| *vertex == VertexIndex(0)));
    assert_eq!(sink.tracks[0].0.pid, 11);
    assert_eq!(sink.tracks[1].0.pid, -11);

    // nothing else ran
    assert_eq!(rig.pair.n_calls(), 1);
    assert_eq!(rig.nuclear.n_calls() + rig.brem.n_calls(), 0);
    assert_eq!(rig.eloss.n_calls() + rig.ms.n_calls(), 0);

    assert_eq!(
        rig.effects.interaction_log().events(),
        &[Interaction::PairConversion {
            track: TrackIndex(7),
            layer: 3,
            vertex: VertexIndex(0),
            n_daughters: 2,
        }]
    );
}

#[test]
fn test_unconverted_photon_is_untouched() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let mut track = photon();
    let before = track.clone();

    let fate = rig
        .effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(0))
        .unwrap();

    assert_eq!(fate, Fate::Survives);
    assert_eq!(track, before);
    assert!(sink.vertices.is_empty());
    assert_eq!(rig.pair.n_calls(), 1);
    assert_eq!(rig.nuclear.n_calls(), 0);
    assert_eq!(rig.brem.n_calls() + rig.eloss.n_calls() + rig.ms.n_calls(), 0);
}

#[test]
fn test_conversion_into_simevent() {
    let mut rig = rig(
        MockSimulator::new().with_daughters(pair()),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        0.5,
    );
    let mut event = SimEvent::new();
    let mut track = photon();
    let index = event.add_primary(
        Daughter::new(*track.momentum(), 22, 0.0),
        FourVector::default(),
    );
    let (tracks_before, vertices_before) = (event.n_tracks(), event.n_vertices());

    let fate = rig
        .effects
        .interact(&mut event, &plain_layer(3), &mut track, index)
        .unwrap();

    let vertex = fate.vertex().unwrap();
    assert_eq!(event.n_vertices(), vertices_before + 1);
    assert_eq!(event.n_tracks(), tracks_before + 2);
    assert_eq!(event.parent_of(vertex).unwrap().id, index);
    assert_eq!(event.daughters_of(vertex).count(), 2);
    assert_eq!(event.end_vertices_of(index).count(), 1);
}

// ============================================================================
// Hadrons
// ============================================================================

#[test]
fn test_absorbed_hadron_stops_processing() {
    let secondaries = vec![
        Daughter::new(FourVector::new(1.0, 0.0, 0.0, 1.0), 211, 1.0),
        Daughter::new(FourVector::new(0.5, 0.0, 0.0, 0.6), 2112, 0.0),
        Daughter::new(FourVector::new(0.3, 0.0, 0.0, 0.3), 22, 0.0),
    ];
    let mut rig = rig(
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new().with_daughters(secondaries),
        0.5,
    );
    let mut sink = RecordingSink::default();
    let mut track = charged_pion(Vector3::new(30.0, 0.0, 0.0));

    let fate = rig
        .effects
        .interact(&mut sink, &plain_layer(9), &mut track, TrackIndex(4))
        .unwrap();

    assert_eq!(fate, Fate::Absorbed(VertexIndex(0)));
    assert_eq!(sink.vertices, vec![(*track.position(), TrackIndex(4))]);
    assert_eq!(sink.tracks.len(), 3);
    assert_eq!(rig.pair.n_calls(), 0);
    assert_eq!(rig.eloss.n_calls() + rig.ms.n_calls(), 0);
}

#[test]
fn test_surviving_hadron_continues_to_energy_loss() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let mut track = charged_pion(Vector3::new(30.0, 0.0, 0.0));

    let fate = rig
        .effects
        .interact(&mut sink, &plain_layer(9), &mut track, TrackIndex(0))
        .unwrap();

    assert_eq!(fate, Fate::Survives);
    assert_eq!(rig.nuclear.n_calls(), 1);
    assert_eq!(rig.brem.n_calls(), 0, "pions do not radiate");
    assert_eq!(rig.eloss.n_calls(), 1);
    assert_eq!(rig.ms.n_calls(), 1, "pT 2 GeV above threshold 0.5");
}

#[test]
fn test_neutral_hadron_skips_electromagnetic_processes() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let mut neutron = particle(
        2112,
        0.0,
        Vector3::new(30.0, 0.0, 0.0),
        Vector3::new(3.0, 0.0, 0.0),
        0.939_57,
    );

    let fate = rig
        .effects
        .interact(&mut sink, &plain_layer(9), &mut neutron, TrackIndex(0))
        .unwrap();

    assert_eq!(fate, Fate::Survives);
    assert_eq!(rig.nuclear.n_calls(), 1);
    assert_eq!(rig.brem.n_calls() + rig.eloss.n_calls() + rig.ms.n_calls(), 0);
}

#[test]
fn test_hadron_range_is_exclusive() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();

    // muon (13) and pid exactly 100 are not hadrons
    for pid in [13, 100, -100] {
        let mut track = particle(
            pid,
            -1.0,
            Vector3::new(30.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            0.105_66,
        );
        rig.effects
            .interact(&mut sink, &plain_layer(9), &mut track, TrackIndex(0))
            .unwrap();
    }
    assert_eq!(rig.nuclear.n_calls(), 0);
    assert_eq!(rig.eloss.n_calls(), 3);
}

#[test]
fn test_layer_107_scale_follows_eta() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let layer = TrackerLayer::forward(107, 0.1, false, Vector3::new(0.0, 0.0, 1.0));

    // eta of the position well above 2.2, R < 16 so no material-map correction
    let position = Vector3::new(4.0, 0.0, 150.0);
    let mut track = particle(211, 1.0, position, Vector3::new(0.0, 0.0, 5.0), 0.139_57);
    let eta = position.eta();
    assert!(eta > 2.2);

    rig.effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0))
        .unwrap();

    let seen = rig.nuclear.last().unwrap().radiation_lengths;
    let expected = 0.1 * (1.0 + (eta - 2.2) * 3.0);
    assert!((seen - expected).abs() < 1e-12, "seen {} expected {}", seen, expected);

    // the electromagnetic processes see the unscaled thickness
    assert!((rig.eloss.last().unwrap().radiation_lengths - 0.1).abs() < 1e-12);
}

#[test]
fn test_layer_107_central_track_is_unscaled() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let layer = TrackerLayer::forward(107, 0.1, false, Vector3::new(0.0, 0.0, 1.0));
    let position = Vector3::new(10.0, 0.0, 10.0);
    let mut track = particle(211, 1.0, position, Vector3::new(0.0, 0.0, 5.0), 0.139_57);

    rig.effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0))
        .unwrap();

    assert!((rig.nuclear.last().unwrap().radiation_lengths - 0.1).abs() < 1e-12);
}

#[test]
fn test_layer_113_scale_at_large_z() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let layer = TrackerLayer::barrel(113, 0.05, false);

    // R = 100 and |z| = 200: outside the material map (R < 118, insensitive)
    let mut track = charged_pion(Vector3::new(100.0, 0.0, 200.0));
    rig.effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0))
        .unwrap();
    let far = rig.nuclear.last().unwrap().radiation_lengths;
    assert!((far - 0.05 * 1.4).abs() < 1e-12);

    let mut track = charged_pion(Vector3::new(100.0, 0.0, 50.0));
    rig.effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0))
        .unwrap();
    let near = rig.nuclear.last().unwrap().radiation_lengths;
    assert!((near - 0.05 * 0.6).abs() < 1e-12);
}

#[test]
fn test_layer_115_never_interacts() {
    let secondaries = vec![Daughter::new(FourVector::new(1.0, 0.0, 0.0, 1.0), 211, 1.0)];
    let mut rig = rig(
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new().with_daughters(secondaries),
        0.5,
    );
    let mut sink = RecordingSink::default();
    let layer = TrackerLayer::barrel(115, 0.05, false);
    let mut track = charged_pion(Vector3::new(100.0, 0.0, 0.0));

    let fate = rig
        .effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0))
        .unwrap();

    assert_eq!(fate, Fate::Survives);
    assert!(sink.vertices.is_empty());
    // zero material: the simulator is not even called
    assert_eq!(rig.nuclear.n_calls(), 0);
    assert_eq!(rig.eloss.n_calls(), 1);
}

#[test]
fn test_sensitive_layer_115_is_unscaled() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let layer = TrackerLayer::barrel(115, 0.05, true);
    // R = 100, |z| = 50: no zone applies to a sensitive layer here
    let mut track = charged_pion(Vector3::new(100.0, 0.0, 50.0));

    rig.effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0))
        .unwrap();

    assert!((rig.nuclear.last().unwrap().radiation_lengths - 0.05).abs() < 1e-12);
}

// ============================================================================
// Electrons
// ============================================================================

#[test]
fn test_bremsstrahlung_photons_recorded_and_electron_continues() {
    let photons = vec![Daughter::new(FourVector::new(0.7, 0.0, 0.0, 0.7), 22, 0.0)];
    let mut rig = rig(
        MockSimulator::new(),
        MockSimulator::new().with_daughters(photons).with_energy_loss(0.7),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        0.5,
    );
    let mut sink = RecordingSink::default();
    let mut track = electron();
    let energy = track.e();

    let fate = rig
        .effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(2))
        .unwrap();

    assert_eq!(fate, Fate::Survives);
    assert_eq!(sink.vertices.len(), 1);
    assert_eq!(sink.vertices[0].1, TrackIndex(2));
    assert_eq!(sink.tracks.len(), 1);
    assert_eq!(sink.tracks[0].0.pid, 22);
    assert!((track.e() - (energy - 0.7)).abs() < 1e-12);

    // the electron went on through energy loss and scattering
    assert_eq!(rig.eloss.n_calls(), 1);
    assert_eq!(rig.ms.n_calls(), 1);
    assert_eq!(rig.nuclear.n_calls(), 0);
}

#[test]
fn test_no_radiation_no_vertex() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let mut track = electron();

    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(0))
        .unwrap();

    assert_eq!(rig.brem.n_calls(), 1);
    assert!(sink.vertices.is_empty());
}

#[test]
fn test_positron_radiates_too() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let mut track = particle(
        -11,
        1.0,
        Vector3::new(30.0, 0.0, 0.0),
        Vector3::new(5.0, 0.0, 0.0),
        0.000_511,
    );

    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(0))
        .unwrap();

    assert_eq!(rig.brem.n_calls(), 1);
}

// ============================================================================
// Energy loss and multiple scattering
// ============================================================================

#[test]
fn test_energy_loss_delta_is_exact() {
    let mut rig = rig(
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new().with_energy_loss(0.013),
        MockSimulator::new(),
        MockSimulator::new(),
        0.5,
    );
    let mut sink = RecordingSink::default();
    let mut track = charged_pion(Vector3::new(30.0, 0.0, 0.0));
    let before = track.e();

    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(5))
        .unwrap();

    assert_eq!(rig.effects.energy_loss(), before - track.e());
    assert_eq!(
        rig.effects.interaction_log().total_energy_loss(TrackIndex(5)),
        rig.effects.energy_loss()
    );
}

#[test]
fn test_energy_loss_resets_each_call() {
    let mut rig = rig(
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new().with_energy_loss(0.013),
        MockSimulator::new(),
        MockSimulator::new(),
        0.5,
    );
    let mut sink = RecordingSink::default();
    let mut track = charged_pion(Vector3::new(30.0, 0.0, 0.0));
    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(0))
        .unwrap();
    assert!(rig.effects.energy_loss() > 0.0);

    let mut gamma = photon();
    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut gamma, TrackIndex(1))
        .unwrap();
    assert_eq!(rig.effects.energy_loss(), 0.0);
}

#[test]
fn test_multiple_scattering_gated_by_pt() {
    let mut rig = rig(
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new(),
        3.0,
    );
    let mut sink = RecordingSink::default();

    // pT = 2 GeV below threshold 3 GeV
    let mut slow = charged_pion(Vector3::new(30.0, 0.0, 0.0));
    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut slow, TrackIndex(0))
        .unwrap();
    assert_eq!(rig.ms.n_calls(), 0);

    // pT = 5 GeV above threshold
    let mut fast = electron();
    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut fast, TrackIndex(1))
        .unwrap();
    assert_eq!(rig.ms.n_calls(), 1);
}

#[test]
fn test_multiple_scattering_receives_layer_normal() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let mut track = particle(
        211,
        1.0,
        Vector3::new(0.0, 30.0, 0.0),
        Vector3::new(0.0, 2.0, 0.0),
        0.139_57,
    );

    rig.effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(0))
        .unwrap();

    let call = rig.ms.last().unwrap();
    assert_eq!(call.normal, Some(Vector3::new(0.0, 1.0, 0.0)));
    assert_eq!(rig.effects.normal_vector(), Vector3::new(0.0, 1.0, 0.0));
}

// ============================================================================
// Failures and persistence
// ============================================================================

#[test]
fn test_simulator_error_is_fatal() {
    let mut rig = rig(
        MockSimulator::new(),
        MockSimulator::new(),
        MockSimulator::new().failing("table out of range"),
        MockSimulator::new(),
        MockSimulator::new(),
        0.5,
    );
    let mut sink = RecordingSink::default();
    let mut track = charged_pion(Vector3::new(30.0, 0.0, 0.0));

    let result = rig
        .effects
        .interact(&mut sink, &plain_layer(3), &mut track, TrackIndex(0));

    match result {
        Err(MaterialError::Simulator { process, source }) => {
            assert_eq!(process, Process::EnergyLoss);
            assert!(source.to_string().contains("table out of range"));
        }
        other => panic!("expected simulator error, got {:?}", other.map(|f| f.to_string())),
    }
    assert_eq!(rig.ms.n_calls(), 0, "no retry, no later process");
}

#[test]
fn test_geometry_error_is_reported() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    let mut layer = TrackerLayer::forward(12, 0.05, true, Vector3::new(0.0, 0.0, 1.0));
    layer.disk_normal = None;
    let mut track = electron();

    let result = rig
        .effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0));

    assert!(matches!(result, Err(MaterialError::Geometry(_))));
    assert_eq!(rig.brem.n_calls(), 0);
}

#[test]
fn test_save_without_nuclear_simulator_is_noop() {
    let mut effects = MaterialEffects::with_simulators(SimulatorSet::default(), 999.0);
    assert!(effects.save().is_ok());
}

#[test]
fn test_thickness_accessor_reports_corrected_nominal() {
    let mut rig = quiet_rig();
    let mut sink = RecordingSink::default();
    // sensitive layer, R = 60, |z| = 5: tracker barrel factor 0.5
    let layer = TrackerLayer::barrel(6, 0.04, true);
    let mut track = charged_pion(Vector3::new(60.0, 0.0, 5.0));

    rig.effects
        .interact(&mut sink, &layer, &mut track, TrackIndex(0))
        .unwrap();

    assert!((rig.effects.thickness() - 0.02).abs() < 1e-15);
}
