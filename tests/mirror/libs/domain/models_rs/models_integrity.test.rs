// [tests/mirror/libs/domain/models_rs/models_integrity.test.rs]
/**
 * =================================================================
 * APARATO: DOMAIN CONTRACTS INTEGRITY TEST (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE EMPAQUETADOS Y VALIDACIÓN DE SCOPE
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_domain_models::dp::{
    pack_distance_tag, unpack_distance_tag, DistinguishedPoint, HerdKind, DP_WIRE_SIZE,
};
use kangaroo_domain_models::finding::{format_elapsed_clock, Finding};
use kangaroo_domain_models::herd::{
    decode_signed_256_be, encode_signed_256_be, KangarooSnapshot, HERD_RECORD_WIRE_SIZE,
};
use kangaroo_domain_models::scope::SearchScope;

fn demo_target() -> ([u8; 32], [u8; 32]) {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[31] = 0x2A;
    let secret_key = SafePrivateKey::from_bytes(&secret_bytes).unwrap();
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();
    (target_point.x.to_bytes_be(), target_point.y.to_bytes_be())
}

#[test]
fn certify_distance_tag_packing_extremes() {
    for distance in [0i128, 1, -1, (1i128 << 124), -(1i128 << 124)] {
        for kind in [HerdKind::Tame, HerdKind::Wild] {
            let packed = pack_distance_tag(distance, kind);
            let (recovered_distance, recovered_kind) =
                unpack_distance_tag(packed).expect("UNPACK_PANIC");
            assert_eq!(recovered_distance, distance, "PACKING_FAULT");
            assert_eq!(recovered_kind, kind);
        }
    }
}

#[test]
fn certify_dp_wire_roundtrip() {
    let original = DistinguishedPoint {
        x: [0xA7u8; 32],
        distance: -(1i128 << 100) + 12345,
        kind: HerdKind::Wild,
    };
    let wire_bytes = original.to_wire_bytes();
    assert_eq!(wire_bytes.len(), DP_WIRE_SIZE);

    let decoded = DistinguishedPoint::from_wire_bytes(&wire_bytes).expect("DECODE_PANIC");
    assert_eq!(decoded, original, "WIRE_FAULT: DP roundtrip corrupted");

    assert!(DistinguishedPoint::from_wire_bytes(&wire_bytes[..47]).is_err());
}

#[test]
fn certify_herd_record_roundtrip() {
    let original = KangarooSnapshot {
        position_x: [0x11u8; 32],
        position_y: [0x22u8; 32],
        distance: -987_654_321,
        kind: HerdKind::Wild,
        wild_offset: 1 << 90,
    };
    let wire_bytes = original.to_wire_bytes();
    assert_eq!(wire_bytes.len(), HERD_RECORD_WIRE_SIZE);

    let decoded = KangarooSnapshot::from_wire_bytes(&wire_bytes).expect("DECODE_PANIC");
    assert_eq!(decoded, original, "WIRE_FAULT: herd record roundtrip corrupted");
}

#[test]
fn certify_signed_256_extension_guard() {
    for value in [0i128, -1, i128::MAX / 2, i128::MIN / 2] {
        let encoded = encode_signed_256_be(value);
        assert_eq!(decode_signed_256_be(&encoded).expect("DECODE_PANIC"), value);
    }

    // Extensión de signo ilegal: bytes altos inconsistentes
    let mut poisoned = encode_signed_256_be(42);
    poisoned[0] = 0xFF;
    assert!(decode_signed_256_be(&poisoned).is_err(), "EXTENSION_FAULT");
}

#[test]
fn certify_scope_validation() {
    let (target_x, target_y) = demo_target();
    let mut range_end = [0u8; 32];
    range_end[27] = 0x01; // 2^32

    let scope = SearchScope::new([0u8; 32], range_end, target_x, target_y, 4, None)
        .expect("SCOPE_PANIC");
    assert_eq!(limbs_to_u128(&scope.width_limbs()), Some(1u128 << 32));

    // Determinismo de la semilla derivada
    let twin_scope = SearchScope::new([0u8; 32], range_end, target_x, target_y, 4, None)
        .expect("SCOPE_PANIC");
    assert_eq!(scope.jump_seed, twin_scope.jump_seed, "SEED_FAULT: derivation must be pure");

    // Rango colapsado
    assert!(SearchScope::new(range_end, range_end, target_x, target_y, 4, None).is_err());

    // Ancho sobre 2^125: rechazo en la frontera
    let mut oversized_end = [0u8; 32];
    oversized_end[0] = 0x40;
    assert!(
        SearchScope::new([0u8; 32], oversized_end, target_x, target_y, 4, None).is_err(),
        "WIDTH_FAULT: ranges beyond 2^125 must be rejected"
    );

    // Punto fuera de la curva
    assert!(SearchScope::new([0u8; 32], range_end, [1u8; 32], [2u8; 32], 4, None).is_err());
}

#[test]
fn certify_finding_output_line() {
    let finding = Finding {
        private_key_hex: "00000000000000000000000000000000000000000000000000000000DEADBEEF"
            .to_string(),
        public_key_hex: "02abcdef".to_string(),
        candidate_index: 1,
        operations_log2: 17.0,
        elapsed_seconds: 3_725,
        detected_at: "2026-01-01T00:00:00Z".to_string(),
    };

    let output_line = finding.format_output_line();
    assert!(output_line.starts_with("Key#1 [Count 2^17.0][01:02:05] Pub:02abcdef Priv: 0x"));
    assert!(output_line.ends_with("DEADBEEF\n"));
    assert_eq!(format_elapsed_clock(59), "00:00:59");

    // Serialización JSON estable para los reportes estructurados
    let json_blob = serde_json::to_string(&finding).expect("SERDE_PANIC");
    let rehydrated: Finding = serde_json::from_str(&json_blob).expect("SERDE_PANIC");
    assert_eq!(rehydrated.private_key_hex, finding.private_key_hex);
}
