// [apps/solver/src/client.rs]
/*!
 * =================================================================
 * APARATO: SWARM CLIENT UPLINK (V342.0 - RING RESILIENT)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: MOTOR LOCAL + TÚNEL RECONECTANTE DE DPs
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. RING BUFFER: Los DPs locales se acumulan en un anillo de 65.536
 *    entradas; solo un ACK del servidor los retira, por lo que una
 *    reconexión los reenvía sin protocolo adicional.
 * 2. EXPONENTIAL BACKOFF: Reintentos cada 5 s duplicando hasta 60 s.
 * 3. REDUNDANT LOSS: Ante desborde del anillo se descartan los DPs más
 *    antiguos; la pérdida solo extiende marginalmente la campaña.
 * =================================================================
 */

use anyhow::{Context, Result};
use kangaroo_core_trapstore::DistinguishedFilter;
use kangaroo_domain_engine::herd::wild_offset_for_slot;
use kangaroo_domain_engine::{spawn_herd, JumpTable, WorkerPool};
use kangaroo_domain_models::dp::DistinguishedPoint;
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_infra_transport::{
    read_frame, write_frame, TransportError, WireFrame, MAXIMUM_DP_BATCH, PROTOCOL_VERSION,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Capacidad del anillo local de Puntos Distinguidos.
const RING_CAPACITY: usize = 65_536;
/// Retroceso base entre reintentos de conexión.
const RECONNECT_BASE: Duration = Duration::from_secs(5);
/// Techo del retroceso exponencial.
const RECONNECT_CAP: Duration = Duration::from_secs(60);
/// Período del latido cuando el túnel está ocioso.
const PING_PERIOD: Duration = Duration::from_secs(10);
/// Pulso del bucle de bombeo.
const PUMP_PERIOD: Duration = Duration::from_millis(50);

/// Parámetros operativos del cliente de enjambre.
pub struct ClientOptions {
    /// Dirección del servidor de coordinación.
    pub server_address: String,
    /// Puerto TCP del servidor.
    pub port: u16,
    /// Hilos de CPU del motor local.
    pub cpu_threads: usize,
    /// Ventana de red por operación de trama.
    pub network_timeout: Duration,
    /// Semilla del runtime local.
    pub runtime_seed: u64,
    /// Enviar instantáneas de manada al servidor (-wss).
    pub ship_herd: bool,
    /// Período del envío de manada en segundos.
    pub save_period_seconds: u64,
}

struct EngineRuntime {
    pool: WorkerPool,
}

enum ShipVerdict {
    Acknowledged { found: bool },
    KeyBroadcast { private_key: [u8; 32] },
}

/**
 * Ejecuta el cliente de enjambre hasta hallazgo o detención.
 *
 * # Errors:
 * Propaga colapsos del motor local; los fallos de red se absorben con
 * reconexión.
 */
#[instrument(skip_all, fields(server = %options.server_address))]
pub async fn run_client(options: ClientOptions, stop_flag: Arc<AtomicBool>) -> Result<i32> {
    let mut connection: Option<TcpStream> = None;
    let mut engine: Option<EngineRuntime> = None;
    let mut ring_buffer: VecDeque<DistinguishedPoint> = VecDeque::with_capacity(RING_CAPACITY);
    let mut dropped_points: u64 = 0;

    let mut reconnect_backoff = RECONNECT_BASE;
    let mut next_reconnect_at = Instant::now();
    let mut last_ping_mark = Instant::now();
    let mut last_herd_push_mark = Instant::now();

    let mut pump_pulse = tokio::time::interval(PUMP_PERIOD);
    let mut campaign_found = false;

    info!(
        "📡 [CLIENT_IGNITION]: Target {}:{} ({} CPU threads).",
        options.server_address, options.port, options.cpu_threads
    );

    loop {
        pump_pulse.tick().await;

        if stop_flag.load(Ordering::Relaxed) {
            if let Some(stream) = connection.as_mut() {
                let _ = write_frame(
                    stream,
                    &WireFrame::Bye { reason_code: 0x00 },
                    options.network_timeout,
                )
                .await;
            }
            break;
        }

        // 1. TÚNEL: conexión y handshake con retroceso exponencial
        if connection.is_none() && Instant::now() >= next_reconnect_at {
            match establish_uplink(&options).await {
                Ok((stream, scope, wild_offset_slot, herd_count)) => {
                    info!(
                        "🤝 [UPLINK_READY]: slot {} / {} kangaroos (dp={}).",
                        wild_offset_slot, herd_count, scope.dp_bits
                    );
                    if engine.is_none() {
                        engine = Some(ignite_local_engine(
                            scope,
                            wild_offset_slot,
                            herd_count as usize,
                            &options,
                            Arc::clone(&stop_flag),
                        )?);
                    }
                    connection = Some(stream);
                    reconnect_backoff = RECONNECT_BASE;
                    if !ring_buffer.is_empty() {
                        info!(
                            "🔁 [RING_REPLAY]: {} buffered DPs pending re-ship.",
                            ring_buffer.len()
                        );
                    }
                }
                Err(uplink_fault) => {
                    warn!(
                        "🔌 [UPLINK_RETRY]: {} (next attempt in {:?}).",
                        uplink_fault, reconnect_backoff
                    );
                    next_reconnect_at = Instant::now() + reconnect_backoff;
                    reconnect_backoff = (reconnect_backoff * 2).min(RECONNECT_CAP);
                }
            }
        }

        // 2. DRENAJE: motor local -> anillo (descarte de los más antiguos)
        if let Some(engine_runtime) = &engine {
            while let Ok(distinguished_point) =
                engine_runtime.pool.distinguished_receiver.try_recv()
            {
                if ring_buffer.len() >= RING_CAPACITY {
                    ring_buffer.pop_front();
                    dropped_points += 1;
                    if dropped_points % 1024 == 1 {
                        warn!(
                            "⚠️ [RING_OVERFLOW]: {} DPs dropped so far (redundant loss).",
                            dropped_points
                        );
                    }
                }
                ring_buffer.push_back(distinguished_point);
            }
        }

        // 3. ENVÍO: lotes de hasta 1024 DPs, retirados solo tras el ACK
        let mut uplink_collapsed = false;
        if let Some(stream) = connection.as_mut() {
            if !ring_buffer.is_empty() {
                let batch: Vec<DistinguishedPoint> = ring_buffer
                    .iter()
                    .take(MAXIMUM_DP_BATCH)
                    .copied()
                    .collect();

                match ship_batch(stream, &batch, options.network_timeout).await {
                    Ok(ShipVerdict::Acknowledged { found }) => {
                        for _ in 0..batch.len() {
                            ring_buffer.pop_front();
                        }
                        last_ping_mark = Instant::now();
                        if found {
                            campaign_found = await_key_broadcast(stream, options.network_timeout).await;
                            break;
                        }
                    }
                    Ok(ShipVerdict::KeyBroadcast { private_key }) => {
                        info!(
                            "🎯 [SWARM_VICTORY]: Key 0x{} broadcast by the server.",
                            hex::encode(private_key)
                        );
                        campaign_found = true;
                        break;
                    }
                    Err(ship_fault) => {
                        warn!("🔌 [UPLINK_LOST]: {} (ring preserved).", ship_fault);
                        uplink_collapsed = true;
                    }
                }
            } else if last_ping_mark.elapsed() >= PING_PERIOD {
                let timestamp_millis = chrono::Utc::now().timestamp_millis() as u64;
                let ping_verdict = async {
                    write_frame(stream, &WireFrame::Ping { timestamp_millis }, options.network_timeout)
                        .await?;
                    read_frame(stream, options.network_timeout).await
                }
                .await;

                match ping_verdict {
                    Ok(WireFrame::Pong { .. }) | Ok(WireFrame::Ack { found: false, .. }) => {
                        last_ping_mark = Instant::now();
                    }
                    Ok(WireFrame::Found { private_key }) => {
                        info!(
                            "🎯 [SWARM_VICTORY]: Key 0x{} broadcast by the server.",
                            hex::encode(private_key)
                        );
                        campaign_found = true;
                        break;
                    }
                    Ok(_) | Err(_) => {
                        uplink_collapsed = true;
                    }
                }
            }
        }

        // 4. INSTANTÁNEA DE MANADA VÍA SERVIDOR (-wss)
        if !uplink_collapsed
            && options.ship_herd
            && options.save_period_seconds > 0
            && last_herd_push_mark.elapsed().as_secs() >= options.save_period_seconds
        {
            if let (Some(stream), Some(engine_runtime)) = (connection.as_mut(), engine.as_ref()) {
                let (snapshots, drained_points) =
                    collect_herd_under_barrier(engine_runtime, &stop_flag);
                for distinguished_point in drained_points {
                    if ring_buffer.len() >= RING_CAPACITY {
                        ring_buffer.pop_front();
                        dropped_points += 1;
                    }
                    ring_buffer.push_back(distinguished_point);
                }
                if !snapshots.is_empty() {
                    let push_verdict = async {
                        write_frame(
                            stream,
                            &WireFrame::HerdPush { snapshots },
                            options.network_timeout,
                        )
                        .await?;
                        read_frame(stream, options.network_timeout).await
                    }
                    .await;
                    if push_verdict.is_err() {
                        uplink_collapsed = true;
                    }
                }
            }
            last_herd_push_mark = Instant::now();
        }

        if uplink_collapsed {
            connection = None;
            next_reconnect_at = Instant::now() + RECONNECT_BASE;
        }
    }

    // CIERRE: detención del motor y recolección de workers
    stop_flag.store(true, Ordering::SeqCst);
    if let Some(engine_runtime) = engine {
        while engine_runtime.pool.distinguished_receiver.try_recv().is_ok() {}
        tokio::task::spawn_blocking(move || engine_runtime.pool.join())
            .await
            .context("ENGINE_JOIN_PANIC")?
            .context("ENGINE_FAULT")?;
    }

    if campaign_found {
        info!("🏁 [CLIENT_SEALED]: Campaign resolved; exiting cleanly.");
    } else {
        info!("🛑 [CLIENT_HALTED]: Interrupted before resolution.");
    }
    Ok(0)
}

/// Establece el túnel TCP y ejecuta el handshake completo.
async fn establish_uplink(
    options: &ClientOptions,
) -> Result<(TcpStream, SearchScope, u32, u32)> {
    let mut stream = tokio::time::timeout(
        options.network_timeout,
        TcpStream::connect((options.server_address.as_str(), options.port)),
    )
    .await
    .context("CONNECT_TIMEOUT")??;

    write_frame(
        &mut stream,
        &WireFrame::Hello {
            version: PROTOCOL_VERSION,
            feature_bits: 0,
            cpu_cores: options.cpu_threads as u32,
            gpu_count: 0,
            estimated_speed: 0.0,
        },
        options.network_timeout,
    )
    .await?;

    let scope = match read_frame(&mut stream, options.network_timeout).await? {
        WireFrame::SetTarget { scope } => scope,
        unexpected => anyhow::bail!("HANDSHAKE_VIOLATION: expected SET_TARGET, got {:?}", unexpected),
    };

    let (wild_offset_slot, herd_count) = match read_frame(&mut stream, options.network_timeout).await? {
        WireFrame::Assign { wild_offset_slot, herd_count } => (wild_offset_slot, herd_count),
        unexpected => anyhow::bail!("HANDSHAKE_VIOLATION: expected ASSIGN, got {:?}", unexpected),
    };

    Ok((stream, scope, wild_offset_slot, herd_count))
}

/// Despliega el motor local con la ranura salvaje asignada.
fn ignite_local_engine(
    scope: SearchScope,
    wild_offset_slot: u32,
    herd_count: usize,
    options: &ClientOptions,
    stop_flag: Arc<AtomicBool>,
) -> Result<EngineRuntime> {
    let jump_table = Arc::new(JumpTable::derive(&scope).context("CLIENT_JUMP_TABLE")?);
    let filter = DistinguishedFilter::new(scope.dp_bits);
    let wild_offset = wild_offset_for_slot(wild_offset_slot, &scope.width_limbs());

    let mut seeding_entropy = StdRng::seed_from_u64(options.runtime_seed);
    let full_herd = spawn_herd(&scope, herd_count.max(2), wild_offset, &mut seeding_entropy)
        .context("CLIENT_HERD_SPAWN")?;

    Ok(EngineRuntime {
        pool: WorkerPool::spawn_cpu_workers(
            scope,
            jump_table,
            filter,
            full_herd,
            options.cpu_threads,
            options.runtime_seed,
            stop_flag,
        ),
    })
}

/// Envía un lote y espera el veredicto del servidor.
async fn ship_batch(
    stream: &mut TcpStream,
    batch: &[DistinguishedPoint],
    network_timeout: Duration,
) -> Result<ShipVerdict, TransportError> {
    write_frame(
        stream,
        &WireFrame::DpBatch { points: batch.to_vec() },
        network_timeout,
    )
    .await?;

    loop {
        match read_frame(stream, network_timeout).await? {
            WireFrame::Ack { found, .. } => return Ok(ShipVerdict::Acknowledged { found }),
            WireFrame::Found { private_key } => {
                return Ok(ShipVerdict::KeyBroadcast { private_key })
            }
            WireFrame::Pong { .. } => continue,
            unexpected => {
                return Err(TransportError::MalformedPayload(format!(
                    "UNEXPECTED_REPLY: {:?}",
                    unexpected
                )))
            }
        }
    }
}

/// Espera la difusión terminal de la clave tras un ACK con bandera found.
async fn await_key_broadcast(stream: &mut TcpStream, network_timeout: Duration) -> bool {
    for _ in 0..4 {
        match read_frame(stream, network_timeout).await {
            Ok(WireFrame::Found { private_key }) => {
                info!(
                    "🎯 [SWARM_VICTORY]: Key 0x{} broadcast by the server.",
                    hex::encode(private_key)
                );
                return true;
            }
            Ok(_) => continue,
            Err(_) => break,
        }
    }
    // El ACK ya certificó el hallazgo; la difusión se perdió en el cierre
    true
}

/// Congela la manada bajo la barrera y recolecta instantánea + remanente.
fn collect_herd_under_barrier(
    engine_runtime: &EngineRuntime,
    stop_flag: &Arc<AtomicBool>,
) -> (
    Vec<kangaroo_domain_models::herd::KangarooSnapshot>,
    Vec<DistinguishedPoint>,
) {
    engine_runtime.pool.request_pause();
    let mut drained_points = Vec::new();
    let barrier_deadline = Instant::now() + Duration::from_millis(500);

    // Los workers vacían su tubería antes de estacionarse: se drena aquí
    while !engine_runtime.pool.all_workers_parked()
        && Instant::now() < barrier_deadline
        && !stop_flag.load(Ordering::Relaxed)
    {
        while let Ok(distinguished_point) = engine_runtime.pool.distinguished_receiver.try_recv() {
            drained_points.push(distinguished_point);
        }
        std::thread::sleep(Duration::from_micros(200));
    }

    let snapshots = engine_runtime.pool.collect_herd_snapshots();
    engine_runtime.pool.resume();
    (snapshots, drained_points)
}
