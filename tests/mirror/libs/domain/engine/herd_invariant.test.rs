// [tests/mirror/libs/domain/engine/herd_invariant.test.rs]
/**
 * =================================================================
 * APARATO: HERD POSITION INVARIANT TEST (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: INVARIANTE pos = base + d*G A LO LARGO DEL CAMINO
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::DistinguishedFilter;
use kangaroo_domain_engine::stepper::StepStatistics;
use kangaroo_domain_engine::{spawn_herd, HerdStepper, JumpTable, Kangaroo};
use kangaroo_domain_models::dp::HerdKind;
use kangaroo_domain_models::scope::SearchScope;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn demo_scope(dp_bits: u8) -> SearchScope {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[30] = 0x0B;
    secret_bytes[31] = 0xAD;
    let secret_key = SafePrivateKey::from_bytes(&secret_bytes).unwrap();
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();

    let mut range_end = [0u8; 32];
    range_end[29] = 0x10; // W = 2^20

    SearchScope::new(
        [0u8; 32],
        range_end,
        target_point.x.to_bytes_be(),
        target_point.y.to_bytes_be(),
        dp_bits,
        None,
    )
    .expect("SCOPE_PANIC")
}

#[test]
fn certify_spawn_invariants() {
    let scope = demo_scope(3);
    let mut entropy_source = StdRng::seed_from_u64(11);

    for _ in 0..8 {
        let tame_unit = Kangaroo::spawn_tame(&scope, &mut entropy_source).expect("SPAWN_PANIC");
        assert_eq!(tame_unit.kind, HerdKind::Tame);
        assert!(tame_unit.verify_position(&scope), "INVARIANT_FAULT: tame seed");

        let wild_unit =
            Kangaroo::spawn_wild(&scope, 4_096, &mut entropy_source).expect("SPAWN_PANIC");
        assert_eq!(wild_unit.kind, HerdKind::Wild);
        assert_eq!(wild_unit.wild_offset, 4_096);
        assert!(wild_unit.verify_position(&scope), "INVARIANT_FAULT: wild seed");
    }
}

#[test]
fn certify_invariant_across_walk() {
    let scope = demo_scope(3);
    let jump_table = JumpTable::derive(&scope).expect("DERIVE_PANIC");
    let filter = DistinguishedFilter::new(scope.dp_bits);
    let mut entropy_source = StdRng::seed_from_u64(23);

    let mut herd = spawn_herd(&scope, 6, 0, &mut entropy_source).expect("SPAWN_PANIC");
    let mut stepper = HerdStepper::new(filter, herd.len());
    let mut statistics = StepStatistics::default();
    let mut emitted_points = Vec::new();

    for _ in 0..512 {
        stepper
            .advance(
                &mut herd,
                &jump_table,
                &scope,
                &mut entropy_source,
                &mut |distinguished_point| emitted_points.push(distinguished_point),
                &mut statistics,
            )
            .expect("ADVANCE_PANIC");
    }

    // Invariante de posición tras el camino completo
    for kangaroo in &herd {
        assert!(
            kangaroo.verify_position(&scope),
            "INVARIANT_FAULT: position diverged from base + d*G"
        );
    }

    // Propiedad DP de toda emisión
    assert!(!emitted_points.is_empty(), "DP_FAULT: no distinguished points in 512 batches");
    for point in &emitted_points {
        assert!(
            trailing_zero_bits(&limbs_from_be_bytes(&point.x)) >= scope.dp_bits as u32,
            "DP_FAULT: emitted x lacks {} trailing zero bits",
            scope.dp_bits
        );
    }

    // Contabilidad de pasos: solo una resurrección puede omitir un salto
    assert!(
        statistics.steps >= 512 * herd.len() as u64 - statistics.dead_kangaroos,
        "STEP_ACCOUNTING_FAULT: {} steps for {} kangaroo-batches",
        statistics.steps,
        512 * herd.len()
    );
}

#[test]
fn certify_shipped_distance_folds_offset() {
    let scope = demo_scope(3);
    let mut entropy_source = StdRng::seed_from_u64(31);

    let wild_unit = Kangaroo::spawn_wild(&scope, 10_000, &mut entropy_source).expect("SPAWN_PANIC");
    assert_eq!(
        wild_unit.shipped_distance(),
        wild_unit.distance + 10_000,
        "FOLDING_FAULT: wild offset must fold into the shipped distance"
    );

    let tame_unit = Kangaroo::spawn_tame(&scope, &mut entropy_source).expect("SPAWN_PANIC");
    assert_eq!(tame_unit.shipped_distance(), tame_unit.distance);
}

#[test]
fn certify_snapshot_roundtrip() {
    let scope = demo_scope(3);
    let mut entropy_source = StdRng::seed_from_u64(47);
    let original = Kangaroo::spawn_wild(&scope, 512, &mut entropy_source).expect("SPAWN_PANIC");

    let restored = Kangaroo::from_snapshot(&original.to_snapshot());
    assert_eq!(restored.position, original.position);
    assert_eq!(restored.distance, original.distance);
    assert_eq!(restored.kind, original.kind);
    assert_eq!(restored.wild_offset, original.wild_offset);
    assert!(restored.verify_position(&scope), "RESUME_FAULT: snapshot broke the invariant");
}
