// [tests/mirror/libs/core/trapstore/trapstore_concurrency.test.rs]
/**
 * =================================================================
 * APARATO: TRAP TABLE CONCURRENCY TEST (V4.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: SERIALIZACIÓN POR CUBETA BAJO CONTENCIÓN REAL
 * =================================================================
 */

use kangaroo_core_trapstore::{InsertOutcome, TrapTable};
use kangaroo_domain_models::dp::{DistinguishedPoint, HerdKind};
use std::sync::Arc;

#[test]
fn certify_concurrent_insertions() {
    let table = Arc::new(TrapTable::with_bucket_bits(10));
    let worker_count = 8usize;
    let points_per_worker = 4_096u32;

    let mut worker_handles = Vec::new();
    for worker_index in 0..worker_count {
        let table_reference = Arc::clone(&table);
        worker_handles.push(std::thread::spawn(move || {
            let mut fresh_insertions = 0u64;
            for point_index in 0..points_per_worker {
                // Huellas únicas por (worker, índice): cero colisiones
                let mut x = [0u8; 32];
                x[0] = worker_index as u8 + 1;
                x[4..8].copy_from_slice(&point_index.to_be_bytes());
                x[31] = (point_index % 251) as u8;

                let point = DistinguishedPoint {
                    x,
                    distance: (worker_index as i128) << 32 | point_index as i128,
                    kind: HerdKind::Tame,
                };
                if table_reference.insert(&point) == InsertOutcome::Fresh {
                    fresh_insertions += 1;
                }
            }
            fresh_insertions
        }));
    }

    let total_fresh: u64 = worker_handles
        .into_iter()
        .map(|handle| handle.join().expect("WORKER_PANIC"))
        .sum();

    assert_eq!(
        total_fresh,
        (worker_count as u64) * (points_per_worker as u64),
        "CONTENTION_FAULT: lost insertions under per-bucket locking"
    );
    assert_eq!(table.entry_count(), total_fresh, "COUNTER_FAULT: atomic count diverged");
}

#[test]
fn certify_cross_thread_collision_detection() {
    let table = Arc::new(TrapTable::with_bucket_bits(10));

    let mut shared_x = [0u8; 32];
    shared_x[0] = 0x77;
    shared_x[31] = 0x40;

    let tame_table = Arc::clone(&table);
    let tame_handle = std::thread::spawn(move || {
        tame_table.insert(&DistinguishedPoint { x: shared_x, distance: 123, kind: HerdKind::Tame })
    });
    let wild_table = Arc::clone(&table);
    let wild_handle = std::thread::spawn(move || {
        wild_table.insert(&DistinguishedPoint { x: shared_x, distance: 456, kind: HerdKind::Wild })
    });

    let verdicts = [
        tame_handle.join().expect("WORKER_PANIC"),
        wild_handle.join().expect("WORKER_PANIC"),
    ];

    let collision_count = verdicts
        .iter()
        .filter(|verdict| matches!(verdict, InsertOutcome::Collision { .. }))
        .count();
    let fresh_count = verdicts
        .iter()
        .filter(|verdict| matches!(verdict, InsertOutcome::Fresh))
        .count();

    assert_eq!(collision_count, 1, "RACE_FAULT: exactly one thread must observe the collision");
    assert_eq!(fresh_count, 1, "RACE_FAULT: exactly one thread must land first");
}
