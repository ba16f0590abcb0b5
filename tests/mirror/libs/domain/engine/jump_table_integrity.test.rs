// [tests/mirror/libs/domain/engine/jump_table_integrity.test.rs]
/**
 * =================================================================
 * APARATO: JUMP TABLE INTEGRITY TEST (V4.0 - MEAN EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: MEDIA EXACTA, DETERMINISMO Y PUNTOS PRECOMPUTADOS
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_domain_engine::{JumpTable, JUMP_TABLE_SIZE};
use kangaroo_domain_models::scope::SearchScope;

fn demo_scope(width_exponent: u8) -> SearchScope {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[31] = 0x2A;
    let secret_key = SafePrivateKey::from_bytes(&secret_bytes).unwrap();
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();

    let mut range_end = [0u8; 32];
    range_end[31 - (width_exponent / 8) as usize] = 1 << (width_exponent % 8);

    SearchScope::new(
        [0u8; 32],
        range_end,
        target_point.x.to_bytes_be(),
        target_point.y.to_bytes_be(),
        4,
        None,
    )
    .expect("SCOPE_PANIC")
}

#[test]
fn certify_exact_mean_balancing() {
    for width_exponent in [20u8, 32, 48] {
        let scope = demo_scope(width_exponent);
        let jump_table = JumpTable::derive(&scope).expect("DERIVE_PANIC");

        let optimal_mean = JumpTable::optimal_mean_magnitude(&scope.width_limbs());
        assert_eq!(
            jump_table.mean_magnitude(),
            optimal_mean,
            "MEAN_FAULT: W = 2^{} table mean diverged from the optimum",
            width_exponent
        );
    }
}

#[test]
fn certify_coordination_free_determinism() {
    let scope = demo_scope(32);
    let first_derivation = JumpTable::derive(&scope).expect("DERIVE_PANIC");
    let second_derivation = JumpTable::derive(&scope).expect("DERIVE_PANIC");

    for (alpha_entry, beta_entry) in first_derivation
        .entries()
        .iter()
        .zip(second_derivation.entries().iter())
    {
        assert_eq!(alpha_entry.magnitude, beta_entry.magnitude, "DETERMINISM_FAULT");
        assert_eq!(alpha_entry.point, beta_entry.point, "DETERMINISM_FAULT");
    }
}

#[test]
fn certify_precomputed_points() {
    let scope = demo_scope(20);
    let jump_table = JumpTable::derive(&scope).expect("DERIVE_PANIC");
    assert_eq!(jump_table.entries().len(), JUMP_TABLE_SIZE);

    for entry in jump_table.entries().iter().step_by(17) {
        assert!(entry.magnitude >= 1, "MAGNITUDE_FAULT: zero jump");

        let scalar_bytes = limbs_to_be_bytes(&limbs_from_u128(entry.magnitude));
        let jump_key = SafePrivateKey::from_bytes(&scalar_bytes).expect("KEY_PANIC");
        let reference_point = SafePublicKey::from_private(&jump_key).to_affine();
        assert_eq!(entry.point, reference_point, "PRECOMPUTE_FAULT: J_i != s_i * G");
    }
}

#[test]
fn certify_jump_index_rule() {
    let scope = demo_scope(32);
    let jump_table = JumpTable::derive(&scope).expect("DERIVE_PANIC");

    // low7(x) selecciona deterministamente la entrada
    let mut x_limbs = [0u64; 4];
    x_limbs[0] = 0x7F;
    let selected = jump_table.entry_for(&x_limbs);
    assert_eq!(selected.magnitude, jump_table.entries()[127].magnitude);

    x_limbs[0] = 0x80; // low7 = 0
    assert_eq!(
        jump_table.entry_for(&x_limbs).magnitude,
        jump_table.entries()[0].magnitude
    );
}
