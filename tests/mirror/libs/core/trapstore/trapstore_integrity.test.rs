// [tests/mirror/libs/core/trapstore/trapstore_integrity.test.rs]
/**
 * =================================================================
 * APARATO: TRAP TABLE INTEGRITY TEST (V6.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE VEREDICTOS DE INSERCIÓN Y FILTRO DP
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::{DistinguishedFilter, InsertOutcome, TrapTable};
use kangaroo_domain_models::dp::{DistinguishedPoint, HerdKind};

fn sample_point(x_low_byte: u8, distance: i128, kind: HerdKind) -> DistinguishedPoint {
    let mut x = [0u8; 32];
    x[0] = 0xAB;
    x[16] = 0xCD;
    x[31] = x_low_byte;
    DistinguishedPoint { x, distance, kind }
}

#[test]
fn certify_insert_verdicts() {
    let table = TrapTable::with_bucket_bits(8);

    // 1. Huella inédita
    let tame_point = sample_point(0x10, 1_000, HerdKind::Tame);
    assert_eq!(table.insert(&tame_point), InsertOutcome::Fresh);
    assert_eq!(table.entry_count(), 1);

    // 2. Entrada idéntica: descarte silencioso
    assert_eq!(table.insert(&tame_point), InsertOutcome::Duplicate);
    assert_eq!(table.entry_count(), 1);

    // 3. Misma manada, distinta distancia: fusión de trayectorias (stall)
    let fused_point = sample_point(0x10, 2_000, HerdKind::Tame);
    assert_eq!(table.insert(&fused_point), InsertOutcome::SameHerdFusion);
    assert_eq!(table.fusion_count(), 1);

    // 4. Etiqueta opuesta: ¡colisión cruzada!
    let wild_point = sample_point(0x10, -5_000, HerdKind::Wild);
    match table.insert(&wild_point) {
        InsertOutcome::Collision { tame_distance, wild_distance } => {
            assert_eq!(tame_distance, 1_000, "COLLISION_FAULT: tame distance corrupted");
            assert_eq!(wild_distance, -5_000, "COLLISION_FAULT: wild distance corrupted");
        }
        unexpected => panic!("COLLISION_MISS: got {:?}", unexpected),
    }
}

#[test]
fn certify_bucket_routing_and_fingerprints() {
    let table = TrapTable::with_bucket_bits(8);

    // Coordenadas con el mismo low byte caen en la misma cubeta, pero
    // huellas altas distintas conviven sin colisionar.
    let alpha = sample_point(0x42, 10, HerdKind::Tame);
    let mut beta = alpha;
    beta.x[0] = 0xFF;
    beta.distance = 20;

    assert_eq!(table.insert(&alpha), InsertOutcome::Fresh);
    assert_eq!(table.insert(&beta), InsertOutcome::Fresh);
    assert_eq!(table.entry_count(), 2);

    let bucket_index = table.bucket_index_of(&limbs_from_be_bytes(&alpha.x));
    let bucket_snapshot = table.snapshot_bucket(bucket_index);
    assert_eq!(bucket_snapshot.len(), 2, "ROUTING_FAULT: same-low-byte points split");
    assert!(
        bucket_snapshot[0].x_fingerprint < bucket_snapshot[1].x_fingerprint,
        "ORDER_FAULT: bucket must stay canonically sorted"
    );
}

#[test]
fn certify_reset_protocol() {
    let table = TrapTable::with_bucket_bits(8);
    for low_byte in 0u8..32 {
        let _ = table.insert(&sample_point(low_byte, low_byte as i128, HerdKind::Tame));
    }
    assert_eq!(table.entry_count(), 32);

    table.reset();
    assert_eq!(table.entry_count(), 0, "SPLIT_FAULT: reset must empty the table");
    assert_eq!(table.snapshot_bucket(0x10).len(), 0);
}

#[test]
fn certify_distinguished_filter() {
    let filter = DistinguishedFilter::new(4);

    let mut distinguished_x = [0u8; 32];
    distinguished_x[31] = 0xF0; // 4 ceros finales
    assert!(filter.is_distinguished_bytes(&distinguished_x));

    let mut mundane_x = distinguished_x;
    mundane_x[31] = 0xF8; // 3 ceros finales
    assert!(!filter.is_distinguished_bytes(&mundane_x));

    // Calibración automática acotada a [0, 32]
    let wide_range = limbs_from_hex("0100000000000000000000000000000000").unwrap();
    let calibrated = DistinguishedFilter::auto_calibrated(&wide_range, 8);
    assert!(calibrated.dp_bits <= 32, "CALIBRATION_FAULT: dp above bound");

    let narrow_range = limbs_from_u128(1 << 8);
    assert_eq!(
        DistinguishedFilter::auto_calibrated(&narrow_range, 1024).dp_bits,
        0,
        "CALIBRATION_FAULT: tiny ranges must disable the filter"
    );
}
