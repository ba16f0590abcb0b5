// [tests/mirror/apps/solver/swarm_loopback.test.rs]
/**
 * =================================================================
 * APARATO: SWARM LOOPBACK TEST (V3.0 - S4 EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: SERVIDOR + CLIENTE EN LOOPBACK HASTA LA VICTORIA
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_core_trapstore::TrapTable;
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_solver::client::{run_client, ClientOptions};
use kangaroo_solver::server::{run_server, ServerOptions};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

const SECRET_HEX: &str = "00000000000000000000000000000000000000000000000000000000DEADBEEF";
const LOOPBACK_PORT: u16 = 47911;

fn tiny_puzzle_scope() -> SearchScope {
    let secret_key = SafePrivateKey::from_bytes(&hex::decode(SECRET_HEX).unwrap()).unwrap();
    let target_point = SafePublicKey::from_private(&secret_key).to_affine();

    let mut range_end = [0u8; 32];
    range_end[28..32].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);

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
fn certify_swarm_loopback_resolution() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("RUNTIME_PANIC");

    runtime.block_on(async {
        let working_directory = tempfile::tempdir().expect("TMPDIR_PANIC");
        let scope = tiny_puzzle_scope();

        // 1. CENTRO DE COORDINACIÓN
        let server_stop = Arc::new(AtomicBool::new(false));
        let server_options = ServerOptions {
            port: LOOPBACK_PORT,
            network_timeout: Duration::from_millis(3000),
            save_period_seconds: 0,
            work_target: None,
            split_mode: false,
            output_path: working_directory.path().join("found.txt"),
            initial_elapsed_seconds: 0,
        };
        let server_handle = tokio::spawn(run_server(
            scope,
            Arc::new(TrapTable::new()),
            server_options,
            Arc::clone(&server_stop),
        ));

        // Ventana de arranque del listener
        tokio::time::sleep(Duration::from_millis(500)).await;

        // 2. CLIENTE DEL ENJAMBRE
        let client_options = ClientOptions {
            server_address: "127.0.0.1".to_string(),
            port: LOOPBACK_PORT,
            cpu_threads: 2,
            network_timeout: Duration::from_millis(3000),
            runtime_seed: 0xFEED_BEEF,
            ship_herd: false,
            save_period_seconds: 0,
        };
        let client_stop = Arc::new(AtomicBool::new(false));

        let client_exit = tokio::time::timeout(
            Duration::from_secs(180),
            run_client(client_options, client_stop),
        )
        .await
        .expect("CLIENT_TIMEOUT: swarm failed to converge")
        .expect("CLIENT_PANIC");
        assert_eq!(client_exit, 0, "EXIT_FAULT: client must exit 0 on FOUND");

        // 3. VEREDICTO DEL SERVIDOR
        let server_verdict = tokio::time::timeout(Duration::from_secs(30), server_handle)
            .await
            .expect("SERVER_TIMEOUT")
            .expect("SERVER_JOIN_PANIC")
            .expect("SERVER_PANIC");

        let finding = server_verdict.expect("RESOLUTION_FAULT: server ended without the key");
        assert_eq!(finding.private_key_hex, SECRET_HEX, "DATA_CORRUPTION");

        let output_content =
            std::fs::read_to_string(working_directory.path().join("found.txt")).expect("SINK_PANIC");
        assert!(output_content.contains(&format!("Priv: 0x{}", SECRET_HEX)));
    });
}
