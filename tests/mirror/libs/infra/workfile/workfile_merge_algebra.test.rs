// [tests/mirror/libs/infra/workfile/workfile_merge_algebra.test.rs]
/**
 * =================================================================
 * APARATO: MERGE ALGEBRA TEST (V9.0 - COMMUTATIVITY EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CONMUTATIVIDAD BYTE A BYTE, DEDUPLICACIÓN Y
 *                  CESIÓN DE COLISIONES CRUZADAS
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::TrapTable;
use kangaroo_domain_models::dp::{DistinguishedPoint, HerdKind};
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_infra_workfile::{
    load_work_file, merge_directory, merge_work_files, save_work_file, split_into_partition,
    WorkFileKind,
};
use proptest::prelude::*;
use std::path::Path;

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

fn point_from_parts(fingerprint_seed: u16, low_byte: u8, distance: i128, kind: HerdKind) -> DistinguishedPoint {
    let mut x = [0u8; 32];
    x[0..2].copy_from_slice(&fingerprint_seed.to_be_bytes());
    x[31] = low_byte & 0xF0; // respeta dp = 4
    DistinguishedPoint { x, distance, kind }
}

fn save_table(path: &Path, scope: &SearchScope, points: &[DistinguishedPoint]) {
    let table = TrapTable::with_bucket_bits(8);
    for point in points {
        let _ = table.insert(point);
    }
    save_work_file(path, WorkFileKind::Solo, scope, &table, &[], 10, false).expect("SAVE_PANIC");
}

#[test]
fn certify_merge_commutativity_fixed_case() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let scope = demo_scope();

    let alpha_points: Vec<DistinguishedPoint> = (1u16..200)
        .map(|seed| point_from_parts(seed, (seed % 16) as u8 * 16, seed as i128 * 7, HerdKind::Tame))
        .collect();
    let beta_points: Vec<DistinguishedPoint> = (100u16..300)
        .map(|seed| point_from_parts(seed, (seed % 16) as u8 * 16, seed as i128 * 7, HerdKind::Tame))
        .collect();

    let alpha_path = working_directory.path().join("alpha.kng");
    let beta_path = working_directory.path().join("beta.kng");
    save_table(&alpha_path, &scope, &alpha_points);
    save_table(&beta_path, &scope, &beta_points);

    let forward_path = working_directory.path().join("forward.kng");
    let backward_path = working_directory.path().join("backward.kng");
    let forward_outcome =
        merge_work_files(&alpha_path, &beta_path, &forward_path).expect("MERGE_PANIC");
    let backward_outcome =
        merge_work_files(&beta_path, &alpha_path, &backward_path).expect("MERGE_PANIC");

    let forward_bytes = std::fs::read(&forward_path).expect("READ_PANIC");
    let backward_bytes = std::fs::read(&backward_path).expect("READ_PANIC");
    assert_eq!(forward_bytes, backward_bytes, "COMMUTATIVITY_FAULT: merge(a,b) != merge(b,a)");

    // entry_count(c) = entries(a) + entries(b) - duplicados
    assert_eq!(
        forward_outcome.output_entries,
        (alpha_points.len() + beta_points.len()) as u64 - forward_outcome.duplicate_entries,
        "DEDUP_ACCOUNTING_FAULT"
    );
    assert_eq!(forward_outcome.duplicate_entries, 100, "DEDUP_FAULT: overlap miscounted");
    assert_eq!(backward_outcome.duplicate_entries, 100);
}

#[test]
fn certify_cross_collision_yield() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let scope = demo_scope();

    // La misma x: Tame en alpha, Wild en beta
    let shared_tame = point_from_parts(0x4242, 0x20, 111_111, HerdKind::Tame);
    let mut shared_wild = shared_tame;
    shared_wild.kind = HerdKind::Wild;
    shared_wild.distance = -222_222;

    let alpha_path = working_directory.path().join("alpha.kng");
    let beta_path = working_directory.path().join("beta.kng");
    save_table(&alpha_path, &scope, &[shared_tame]);
    save_table(&beta_path, &scope, &[shared_wild]);

    let merged_path = working_directory.path().join("merged.kng");
    let outcome = merge_work_files(&alpha_path, &beta_path, &merged_path).expect("MERGE_PANIC");

    assert_eq!(outcome.cross_collisions.len(), 1, "COLLISION_MISS");
    assert_eq!(
        outcome.cross_collisions[0],
        (111_111, -222_222),
        "COLLISION_FAULT: distances corrupted during merge"
    );
}

#[test]
fn certify_scope_mismatch_rejection() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let scope = demo_scope();

    let mut foreign_end = [0u8; 32];
    foreign_end[26] = 0x01;
    let foreign_scope = SearchScope::new(
        scope.range_start,
        foreign_end,
        scope.public_key_x,
        scope.public_key_y,
        scope.dp_bits,
        None,
    )
    .expect("SCOPE_PANIC");

    let alpha_path = working_directory.path().join("alpha.kng");
    let beta_path = working_directory.path().join("beta.kng");
    save_table(&alpha_path, &scope, &[point_from_parts(1, 0x10, 5, HerdKind::Tame)]);
    save_table(&beta_path, &foreign_scope, &[point_from_parts(2, 0x10, 6, HerdKind::Tame)]);

    let merged_path = working_directory.path().join("merged.kng");
    assert!(
        merge_work_files(&alpha_path, &beta_path, &merged_path).is_err(),
        "IDENTITY_FAULT: foreign scopes must refuse to merge"
    );
}

#[test]
fn certify_split_and_directory_reconstruction() {
    let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
    let scope = demo_scope();

    let table = TrapTable::with_bucket_bits(8);
    for seed in 1u16..300 {
        let _ = table.insert(&point_from_parts(
            seed,
            (seed % 16) as u8 * 16,
            seed as i128,
            if seed % 2 == 0 { HerdKind::Tame } else { HerdKind::Wild },
        ));
    }
    let original_count = table.entry_count();

    // División en 256 shards y reconstrucción por merge de directorio
    let partition_directory = working_directory.path().join("parts");
    split_into_partition(&partition_directory, &scope, &table, 55).expect("SPLIT_PANIC");

    let reconstructed_path = working_directory.path().join("reconstructed.kng");
    let outcome = merge_directory(&partition_directory, &reconstructed_path).expect("MERGE_PANIC");
    assert_eq!(outcome.output_entries, original_count, "SPLIT_FAULT: entries lost in shards");

    let reconstructed = load_work_file(&reconstructed_path).expect("LOAD_PANIC");
    for bucket_index in 0..table.bucket_count() {
        assert_eq!(
            reconstructed.table.snapshot_bucket(bucket_index),
            table.snapshot_bucket(bucket_index),
            "SPLIT_FAULT: bucket {} diverged after reconstruction",
            bucket_index
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Conmutatividad byte a byte bajo conjuntos aleatorios de entradas.
    #[test]
    fn certify_merge_commutativity_randomized(
        alpha_seeds in proptest::collection::vec((1u16..500, 0u8..16, -100_000i128..100_000, proptest::bool::ANY), 0..80),
        beta_seeds in proptest::collection::vec((1u16..500, 0u8..16, -100_000i128..100_000, proptest::bool::ANY), 0..80),
    ) {
        let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
        let scope = demo_scope();

        let build_points = |seeds: &[(u16, u8, i128, bool)]| -> Vec<DistinguishedPoint> {
            seeds
                .iter()
                .map(|&(fingerprint_seed, nibble, distance, is_wild)| {
                    point_from_parts(
                        fingerprint_seed,
                        nibble * 16,
                        distance,
                        if is_wild { HerdKind::Wild } else { HerdKind::Tame },
                    )
                })
                .collect()
        };

        let alpha_path = working_directory.path().join("alpha.kng");
        let beta_path = working_directory.path().join("beta.kng");
        save_table(&alpha_path, &scope, &build_points(&alpha_seeds));
        save_table(&beta_path, &scope, &build_points(&beta_seeds));

        let forward_path = working_directory.path().join("forward.kng");
        let backward_path = working_directory.path().join("backward.kng");
        merge_work_files(&alpha_path, &beta_path, &forward_path).expect("MERGE_PANIC");
        merge_work_files(&beta_path, &alpha_path, &backward_path).expect("MERGE_PANIC");

        let forward_bytes = std::fs::read(&forward_path).expect("READ_PANIC");
        let backward_bytes = std::fs::read(&backward_path).expect("READ_PANIC");
        prop_assert_eq!(forward_bytes, backward_bytes);
    }
}
