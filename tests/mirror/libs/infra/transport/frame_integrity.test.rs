// [tests/mirror/libs/infra/transport/frame_integrity.test.rs]
/**
 * =================================================================
 * APARATO: WIRE FRAME INTEGRITY TEST (V4.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: ESTABILIDAD BINARIA DE TRAMAS Y GUARDIA ANTI-DOS
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use kangaroo_domain_models::dp::{DistinguishedPoint, HerdKind};
use kangaroo_domain_models::herd::KangarooSnapshot;
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_infra_transport::{read_frame, write_frame, TransportError, WireFrame};
use std::time::Duration;

const TEST_WINDOW: Duration = Duration::from_secs(2);

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
        6,
        None,
    )
    .expect("SCOPE_PANIC")
}

async fn roundtrip(frame: WireFrame) -> WireFrame {
    let (mut client_half, mut server_half) = tokio::io::duplex(1 << 20);
    write_frame(&mut client_half, &frame, TEST_WINDOW)
        .await
        .expect("WRITE_PANIC");
    read_frame(&mut server_half, TEST_WINDOW).await.expect("READ_PANIC")
}

#[tokio::test]
async fn certify_every_opcode_roundtrip() {
    let frames = vec![
        WireFrame::Hello {
            version: 2,
            feature_bits: 0b1010,
            cpu_cores: 16,
            gpu_count: 2,
            estimated_speed: 1_250_000.5,
        },
        WireFrame::SetTarget { scope: demo_scope() },
        WireFrame::Assign { wild_offset_slot: 7, herd_count: 32 },
        WireFrame::DpBatch {
            points: (0u8..5)
                .map(|index| DistinguishedPoint {
                    x: [index; 32],
                    distance: (index as i128) * -1_000,
                    kind: if index % 2 == 0 { HerdKind::Tame } else { HerdKind::Wild },
                })
                .collect(),
        },
        WireFrame::Ack { found: true, server_epoch: 3 },
        WireFrame::Found { private_key: [0xEEu8; 32] },
        WireFrame::Ping { timestamp_millis: 1_234_567 },
        WireFrame::Pong { timestamp_millis: 1_234_568 },
        WireFrame::HerdPush {
            snapshots: vec![KangarooSnapshot {
                position_x: [1u8; 32],
                position_y: [2u8; 32],
                distance: -42,
                kind: HerdKind::Wild,
                wild_offset: 99,
            }],
        },
        WireFrame::Bye { reason_code: 0x7F },
    ];

    for frame in frames {
        let decoded = roundtrip(frame.clone()).await;
        assert_eq!(decoded, frame, "WIRE_FAULT: frame roundtrip corrupted");
    }
}

#[tokio::test]
async fn certify_oversized_frame_guard() {
    let (mut client_half, mut server_half) = tokio::io::duplex(1 << 10);

    // Prefijo de longitud hostil: 16 MB declarados
    let hostile_prefix = (16u32 * 1024 * 1024).to_be_bytes();
    tokio::io::AsyncWriteExt::write_all(&mut client_half, &hostile_prefix)
        .await
        .expect("WRITE_PANIC");

    match read_frame(&mut server_half, TEST_WINDOW).await {
        Err(TransportError::OversizedFrame(length)) => {
            assert_eq!(length, 16 * 1024 * 1024);
        }
        unexpected => panic!("DOS_GUARD_MISS: {:?}", unexpected),
    }
}

#[tokio::test]
async fn certify_unknown_opcode_rejection() {
    let (mut client_half, mut server_half) = tokio::io::duplex(1 << 10);

    let mut hostile_frame = Vec::new();
    hostile_frame.extend_from_slice(&2u32.to_be_bytes()); // longitud: opcode + 1 byte
    hostile_frame.push(0x99); // opcode reservado
    hostile_frame.push(0x00);
    tokio::io::AsyncWriteExt::write_all(&mut client_half, &hostile_frame)
        .await
        .expect("WRITE_PANIC");

    assert!(
        matches!(
            read_frame(&mut server_half, TEST_WINDOW).await,
            Err(TransportError::UnknownOpcode(0x99))
        ),
        "OPCODE_GUARD_MISS"
    );
}

#[tokio::test]
async fn certify_silent_peer_timeout() {
    let (_client_half, mut server_half) = tokio::io::duplex(1 << 10);

    assert!(
        matches!(
            read_frame(&mut server_half, Duration::from_millis(100)).await,
            Err(TransportError::Timeout)
        ),
        "TIMEOUT_MISS: silent peer must trip the window"
    );
}
