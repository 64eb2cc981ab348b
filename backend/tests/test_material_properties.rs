//! Property-based tests for the material effects engine.
//!
//! Random tracks and layers, checking the invariants every crossing must
//! keep: finite non-negative thickness, calibrated correction factors, and
//! an event history where each material vertex holds secondaries.

use material_effects_core_rs::orchestrator::{correction_factor, nuclear_scale_factor};
use material_effects_core_rs::rng;
use material_effects_core_rs::{
    compute_effective_thickness, Daughter, FourVector, MaterialEffects, MaterialEffectsConfig,
    ParticleTrack, SimEvent, TrackerLayer, Vector3,
};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Calibration values of the tracker material map
const MAP_FACTORS: [f64; 8] = [1.0, 3.0, 0.3, 0.5, 0.77, 0.225 * 0.75, 0.75, 0.08];

fn arb_vector(range: f64) -> impl Strategy<Value = Vector3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn arb_layer() -> impl Strategy<Value = TrackerLayer> {
    (1u32..130, 0.0..1.0f64, any::<bool>(), any::<bool>(), arb_vector(1.0)).prop_map(
        |(number, radlen, sensitive, forward, normal)| {
            if forward {
                let normal = normal.unit().unwrap_or(Vector3::new(0.0, 0.0, 1.0));
                TrackerLayer::forward(number, radlen, sensitive, normal)
            } else {
                TrackerLayer::barrel(number, radlen, sensitive)
            }
        },
    )
}

fn arb_particle() -> impl Strategy<Value = (i32, f64, f64)> {
    prop_oneof![
        Just((22, 0.0, 0.0)),
        Just((11, -1.0, 0.000_511)),
        Just((-11, 1.0, 0.000_511)),
        Just((13, -1.0, 0.105_66)),
        Just((211, 1.0, 0.139_57)),
        Just((2112, 0.0, 0.939_57)),
    ]
}

fn arb_track() -> impl Strategy<Value = ParticleTrack> {
    (arb_particle(), arb_vector(300.0), arb_vector(50.0)).prop_map(
        |((pid, charge, mass), position, momentum)| {
            ParticleTrack::new(
                FourVector::from_momentum(momentum, mass),
                FourVector::new(position.x, position.y, position.z, 0.0),
                pid,
                charge,
            )
        },
    )
}

fn em_config() -> MaterialEffectsConfig {
    let mut config = MaterialEffectsConfig::disabled();
    config.pair_production = true;
    config.bremsstrahlung = true;
    config.energy_loss = true;
    config.multiple_scattering = true;
    config.photon_energy = Some(0.1);
    config.brem_energy = Some(0.1);
    config.brem_energy_fraction = Some(0.005);
    config.pt_min = Some(0.2);
    config
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Thickness is finite and non-negative for any crossing
    #[test]
    fn prop_thickness_finite_non_negative(layer in arb_layer(), track in arb_track()) {
        let crossing = compute_effective_thickness(&layer, &track).unwrap();

        prop_assert!(crossing.radiation_lengths.is_finite());
        prop_assert!(crossing.radiation_lengths >= 0.0);
        prop_assert!(crossing.thickness.is_finite());
        prop_assert!(crossing.thickness >= 0.0);
    }

    /// The path through the layer is never shorter than its nominal budget
    #[test]
    fn prop_path_not_shorter_than_budget(layer in arb_layer(), track in arb_track()) {
        prop_assume!(track.p() > 0.0);
        let crossing = compute_effective_thickness(&layer, &track).unwrap();

        prop_assert!(crossing.radiation_lengths >= crossing.thickness * (1.0 - 1e-9));
    }

    /// Only calibrated factors come out of the material map
    #[test]
    fn prop_correction_factor_calibrated(
        r in 0.0..400.0f64,
        z in -400.0..400.0f64,
        sensitive in any::<bool>(),
    ) {
        let factor = correction_factor(r, z, sensitive);
        prop_assert!(MAP_FACTORS.contains(&factor), "factor {} at r {} z {}", factor, r, z);
    }

    /// Outside the mapped region the budget is used as is
    #[test]
    fn prop_no_correction_outside_map(
        r in 0.0..16.0f64,
        z in -400.0..400.0f64,
        sensitive in any::<bool>(),
    ) {
        prop_assert_eq!(correction_factor(r, z, sensitive), 1.0);
    }

    /// Layer 107 scales with the pseudorapidity of the position
    #[test]
    fn prop_layer_107_scale(position in arb_vector(300.0), momentum in arb_vector(10.0)) {
        let layer = TrackerLayer::forward(107, 0.1, false, Vector3::new(0.0, 0.0, 1.0));
        let track = ParticleTrack::new(
            FourVector::from_momentum(momentum, 0.139_57),
            FourVector::new(position.x, position.y, position.z, 0.0),
            211,
            1.0,
        );

        let expected = 1.0 + (position.eta() - 2.2).max(0.0) * 3.0;
        prop_assert_eq!(nuclear_scale_factor(&layer, &track), expected);
        prop_assert!(nuclear_scale_factor(&layer, &track) >= 1.0);
    }

    /// Sensitive layers never carry a nuclear scale
    #[test]
    fn prop_sensitive_layers_unscaled(number in 100u32..120, track in arb_track()) {
        let layer = TrackerLayer::barrel(number, 0.05, true);
        prop_assert_eq!(nuclear_scale_factor(&layer, &track), 1.0);
    }

    /// Crossing material never adds energy, and material vertices hold secondaries
    #[test]
    fn prop_crossing_invariants(
        seed in any::<u64>(),
        layer in arb_layer(),
        track in arb_track(),
    ) {
        let mut effects = MaterialEffects::new(&em_config(), rng::shared(seed)).unwrap();
        let mut event = SimEvent::new();
        let index = event.add_primary(
            Daughter::new(*track.momentum(), track.pid(), track.charge()),
            FourVector::default(),
        );
        let primaries = event.n_vertices();

        let mut crossed = track.clone();
        let fate = effects.interact(&mut event, &layer, &mut crossed, index).unwrap();

        prop_assert!(crossed.e() <= track.e());
        prop_assert!(effects.energy_loss() >= 0.0);
        prop_assert!(effects.thickness().is_finite());

        for vertex in &event.vertices()[primaries..] {
            prop_assert!(vertex.n_daughters() > 0);
            prop_assert_eq!(vertex.parent(), Some(index));
        }
        if let Some(vertex) = fate.vertex() {
            prop_assert!(event.daughters_of(vertex).count() > 0);
        }
        if !fate.survives() {
            prop_assert!(track.is_photon() || track.is_hadron());
        }
    }
}
