// [tests/mirror/libs/domain/engine/kangaroo_resolution.test.rs]
/**
 * =================================================================
 * APARATO: END-TO-END RESOLUTION TEST (V23.0 - GOLD MASTER)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE RESOLUCIÓN ECDLP BIT-PERFECT
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::TrapTable;
use kangaroo_domain_engine::runner::{run_solo, SoloRunnerOptions};
use kangaroo_domain_models::scope::SearchScope;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Construye el objetivo del puzzle diminuto: k = 0xDEADBEEF en [0, 2^32).
fn tiny_puzzle_scope() -> SearchScope {
    let secret_hex = "00000000000000000000000000000000000000000000000000000000DEADBEEF";
    let secret_key = SafePrivateKey::from_bytes(&hex::decode(secret_hex).unwrap()).unwrap();
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();

    let mut range_end = [0u8; 32];
    range_end[28] = 0xFF;
    range_end[29] = 0xFF;
    range_end[30] = 0xFF;
    range_end[31] = 0xFF; // kmax = 2^32 - 1

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
fn certify_tiny_puzzle_resolution() {
    println!("\n🦘 [PROVING_GROUNDS]: Resolving k = 0xDEADBEEF in [0, 2^32)...");

    let scope = tiny_puzzle_scope();
    let table = Arc::new(TrapTable::new());
    let stop_flag = Arc::new(AtomicBool::new(false));

    let runner_options = SoloRunnerOptions {
        cpu_threads: 2,
        save_period_seconds: 0,
        save_barrier_timeout_millis: 3000,
        save_herd: false,
        max_step_multiplier: 0.0,
        runtime_seed: 0x5EED_CAFE,
        initial_elapsed_seconds: 0,
        initial_herd: None,
        output_path: None,
    };

    let campaign_verdict = run_solo(scope, table, runner_options, stop_flag, None)
        .expect("CAMPAIGN_PANIC");

    let finding = campaign_verdict.expect("RESOLUTION_FAULT: campaign ended without the key");
    assert_eq!(
        finding.private_key_hex,
        "00000000000000000000000000000000000000000000000000000000DEADBEEF",
        "DATA_CORRUPTION: resolved scalar mismatch"
    );

    println!("   ✅ [SUCCESS]: Scalar 0xDEADBEEF recovered (2^{:.1} ops).", finding.operations_log2);
}
