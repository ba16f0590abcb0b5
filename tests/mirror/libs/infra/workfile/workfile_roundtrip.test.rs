// [tests/mirror/libs/infra/workfile/workfile_roundtrip.test.rs]
/**
 * =================================================================
 * APARATO: WORK FILE ROUNDTRIP TEST (V7.0 - IDEMPOTENCE EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: PRESERVACIÓN BIT-PERFECTA DE ENTRADAS Y MANADA
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::TrapTable;
use kangaroo_domain_models::dp::{DistinguishedPoint, HerdKind};
use kangaroo_domain_models::herd::KangarooSnapshot;
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_infra_workfile::{load_work_file, save_work_file, WorkFileKind};

fn demo_scope() -> SearchScope {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[31] = 0x2A;
    let secret_key = SafePrivateKey::from_bytes(&secret_bytes).unwrap();
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();

    let mut range_end = [0u8; 32];
    range_end[27] = 0x01;

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

fn sample_point(seed: u32, kind: HerdKind) -> DistinguishedPoint {
    let mut x = [0u8; 32];
    x[0] = (seed >> 8) as u8;
    x[12] = seed as u8;
    x[28..32].copy_from_slice(&(seed << 4).to_be_bytes()); // 4 ceros finales
    DistinguishedPoint { x, distance: (seed as i128) * 31 - 5_000, kind }
}

fn populated_table() -> TrapTable {
    let table = TrapTable::with_bucket_bits(8);
    for seed in 1u32..400 {
        let kind = if seed % 2 == 0 { HerdKind::Tame } else { HerdKind::Wild };
        let _ = table.insert(&sample_point(seed, kind));
    }
    table
}

#[test]
fn certify_entry_and_herd_preservation() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let file_path = working_directory.path().join("campaign.kng");

    let scope = demo_scope();
    let table = populated_table();
    let herd_snapshots = vec![
        KangarooSnapshot {
            position_x: [0x11u8; 32],
            position_y: [0x22u8; 32],
            distance: -123_456,
            kind: HerdKind::Wild,
            wild_offset: 1 << 20,
        },
        KangarooSnapshot {
            position_x: [0x33u8; 32],
            position_y: [0x44u8; 32],
            distance: 987_654,
            kind: HerdKind::Tame,
            wild_offset: 0,
        },
    ];

    save_work_file(&file_path, WorkFileKind::Solo, &scope, &table, &herd_snapshots, 77, false)
        .expect("SAVE_PANIC");

    let loaded = load_work_file(&file_path).expect("LOAD_PANIC");
    assert_eq!(loaded.header.entry_count, table.entry_count(), "COUNT_FAULT");
    assert_eq!(loaded.header.elapsed_seconds, 77);
    assert_eq!(loaded.header.dp_bits, scope.dp_bits);
    assert_eq!(loaded.herd, herd_snapshots, "HERD_FAULT: snapshot corrupted");
    assert_eq!(loaded.header.to_scope().expect("SCOPE_PANIC"), scope);

    // Preservación entrada a entrada, cubeta a cubeta
    for bucket_index in 0..table.bucket_count() {
        assert_eq!(
            loaded.table.snapshot_bucket(bucket_index),
            table.snapshot_bucket(bucket_index),
            "BUCKET_FAULT: bucket {} corrupted",
            bucket_index
        );
    }
}

#[test]
fn certify_save_idempotence() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let first_path = working_directory.path().join("first.kng");
    let second_path = working_directory.path().join("second.kng");

    let scope = demo_scope();
    let table = populated_table();

    save_work_file(&first_path, WorkFileKind::Solo, &scope, &table, &[], 30, false)
        .expect("SAVE_PANIC");

    let loaded = load_work_file(&first_path).expect("LOAD_PANIC");
    save_work_file(
        &second_path,
        WorkFileKind::Solo,
        &scope,
        &loaded.table,
        &[],
        30,
        false,
    )
    .expect("SAVE_PANIC");

    let first_bytes = std::fs::read(&first_path).expect("READ_PANIC");
    let second_bytes = std::fs::read(&second_path).expect("READ_PANIC");
    assert_eq!(first_bytes, second_bytes, "IDEMPOTENCE_FAULT: save;load;save diverged");
}
