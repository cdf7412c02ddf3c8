//! Property tests for acoustic resolution and scheduling
//!
//! These validate that resolution stays within its declared bounds and
//! that the emission queue never drops or reorders entries, for
//! arbitrary inputs.

use std::sync::Arc;

use footfall_acoustics::{
    parse_pack, serialize_pack, Acoustic, EmissionQueue, FloatRange, PendingEmission, TickRange,
};
use glam::Vec3;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn leaf(sound: &str) -> Arc<Acoustic> {
    Arc::new(Acoustic::Simple {
        sound: sound.to_string(),
        volume: FloatRange::fixed(1.0),
        pitch: FloatRange::fixed(1.0),
    })
}

proptest! {
    /// Property: Variator resolution never fails for non-empty children,
    /// whatever the weights.
    #[test]
    fn variator_with_children_always_resolves(
        weights in prop::collection::vec(0.0f32..100.0, 1..8),
        seed in any::<u64>(),
    ) {
        let children = weights
            .iter()
            .enumerate()
            .map(|(i, w)| (leaf(&format!("s{i}")), *w))
            .collect();
        let acoustic = Acoustic::Variator { children };

        let mut rng = StdRng::seed_from_u64(seed);
        let emissions = acoustic.resolve(&mut rng).unwrap();
        prop_assert_eq!(emissions.len(), 1);
    }

    /// Property: Delayed offsets always land inside the declared bounds.
    #[test]
    fn delayed_offsets_stay_in_bounds(
        min in 0u64..50,
        span in 0u64..50,
        seed in any::<u64>(),
    ) {
        let acoustic = Acoustic::Delayed {
            inner: leaf("x"),
            delay: TickRange { min, max: min + span },
        };
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..32 {
            let emissions = acoustic.resolve(&mut rng).unwrap();
            prop_assert!((min..=min + span).contains(&emissions[0].offset));
        }
    }

    /// Property: Sampled volume and pitch stay inside their ranges.
    #[test]
    fn jitter_stays_in_bounds(
        vol_min in 0.0f32..1.0,
        vol_span in 0.0f32..1.0,
        seed in any::<u64>(),
    ) {
        let acoustic = Acoustic::Simple {
            sound: "x".to_string(),
            volume: FloatRange { min: vol_min, max: vol_min + vol_span },
            pitch: FloatRange::fixed(1.0),
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let emissions = acoustic.resolve(&mut rng).unwrap();
        prop_assert!(emissions[0].volume >= vol_min);
        prop_assert!(emissions[0].volume <= vol_min + vol_span);
    }

    /// Property: The queue fires exactly the due entries, in ascending
    /// tick order, and forgets them.
    #[test]
    fn queue_fires_exactly_due_entries(
        deadlines in prop::collection::vec(0u64..100, 0..32),
        now in 0u64..100,
    ) {
        let mut queue = EmissionQueue::new();
        for (i, deadline) in deadlines.iter().enumerate() {
            queue.schedule(*deadline, PendingEmission {
                sound: format!("s{i}"),
                position: Vec3::ZERO,
                volume: 1.0,
                pitch: 1.0,
            });
        }

        let due = deadlines.iter().filter(|d| **d <= now).count();
        let fired = queue.tick(now);
        prop_assert_eq!(fired.len(), due);
        prop_assert_eq!(queue.len(), deadlines.len() - due);

        // A second tick at the same time fires nothing new.
        prop_assert!(queue.tick(now).is_empty());
    }

    /// Property: Pack round-trips preserve leaf volume bounds exactly.
    #[test]
    fn pack_round_trip_preserves_leaf_bounds(
        vol_min in 0.01f32..1.0,
        vol_span in 0.01f32..1.0,
    ) {
        let doc = format!(
            r#"{{ "acoustics": {{ "s": {{
                "sound": "x",
                "volume_min": {}, "volume_max": {}
            }} }} }}"#,
            vol_min, vol_min + vol_span,
        );
        let pack = parse_pack(&doc).unwrap();
        let reparsed = parse_pack(&serialize_pack(&pack).unwrap()).unwrap();

        match reparsed.registry.lookup("s").unwrap().as_ref() {
            Acoustic::Simple { volume, .. } => {
                prop_assert_eq!(volume.min, vol_min);
                prop_assert_eq!(volume.max, vol_min + vol_span);
            }
            other => prop_assert!(false, "expected simple, got {:?}", other),
        }
    }
}
