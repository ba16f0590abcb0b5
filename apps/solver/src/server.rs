// [apps/solver/src/server.rs]
/*!
 * =================================================================
 * APARATO: SWARM COORDINATION SERVER (V14.0 - C2 SOVEREIGN)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: LISTENER TCP, REGISTRO DE CLIENTES, TABLA
 *                  AUTORITATIVA Y PROTOCOLO DE DIVISIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. AUTHORITATIVE TABLE: El servidor posee la única tabla de trampas;
 *    los clientes son emisores redundantes de Puntos Distinguidos.
 * 2. REAPER DISCIPLINE: Un cliente silencioso más de 30 s se declara
 *    difunto; su rastro se preserva y su ranura salvaje se libera.
 * 3. SPLIT PROTOCOL: Con -wsplit cada guardado pliega la tabla viva en
 *    el directorio particionado y la vacía, acotando la RAM de
 *    campañas largas; la época reportada en los ACK se incrementa.
 * =================================================================
 */

use anyhow::{Context, Result};
use kangaroo_core_trapstore::{InsertOutcome, TrapTable};
use kangaroo_domain_engine::CollisionResolver;
use kangaroo_domain_models::client::{ClientRecord, CLIENT_DEAD_TIMEOUT_SECONDS};
use kangaroo_domain_models::finding::Finding;
use kangaroo_domain_models::herd::KangarooSnapshot;
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_infra_transport::{
    read_frame, write_frame, WireFrame, PROTOCOL_VERSION,
};
use kangaroo_infra_workfile::{save_work_file, split_into_partition, WorkFileKind};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

use kangaroo_domain_engine::herd::WILD_OFFSET_SLOT_COUNT;

/// Pulso del segador de clientes difuntos.
const REAPER_PERIOD: Duration = Duration::from_secs(5);
/// Canguros asignados por núcleo reportado por el cliente.
const HERD_PER_REPORTED_CORE: u32 = 2;

/// Parámetros operativos del servidor de coordinación.
pub struct ServerOptions {
    /// Puerto TCP de escucha.
    pub port: u16,
    /// Ventana de red por operación de trama.
    pub network_timeout: Duration,
    /// Período del guardado automático (0 desactiva).
    pub save_period_seconds: u64,
    /// Destino de persistencia (archivo o directorio particionado).
    pub work_target: Option<PathBuf>,
    /// Protocolo de división: particionar y vaciar en cada guardado.
    pub split_mode: bool,
    /// Archivo de resultados.
    pub output_path: PathBuf,
    /// Segundos de cómputo heredados de una campaña previa.
    pub initial_elapsed_seconds: u64,
}

/// Estado compartido del centro de coordinación.
struct ServerContext {
    scope: SearchScope,
    table: Arc<TrapTable>,
    resolver: CollisionResolver,
    registry: Mutex<HashMap<u64, ClientRecord>>,
    slot_occupancy: Mutex<[bool; WILD_OFFSET_SLOT_COUNT as usize]>,
    herd_vault: Mutex<HashMap<u64, Vec<KangarooSnapshot>>>,
    next_client_identifier: AtomicU64,
    server_epoch: AtomicU32,
    dp_received_total: AtomicU64,
    recovered_finding: Mutex<Option<Finding>>,
    found_broadcast: tokio::sync::watch::Sender<bool>,
    stop_flag: Arc<AtomicBool>,
    campaign_origin: Instant,
    initial_elapsed_seconds: u64,
}

impl ServerContext {
    fn elapsed_seconds(&self) -> u64 {
        self.initial_elapsed_seconds + self.campaign_origin.elapsed().as_secs()
    }

    fn operations_estimate(&self) -> f64 {
        let received = self.dp_received_total.load(Ordering::Relaxed) as f64;
        (received * (2.0f64).powi(self.scope.dp_bits as i32)).max(1.0)
    }

    /// Asigna la primera ranura salvaje libre.
    fn allocate_wild_slot(&self) -> u32 {
        let mut occupancy = self
            .slot_occupancy
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (slot_index, slot_taken) in occupancy.iter_mut().enumerate() {
            if !*slot_taken {
                *slot_taken = true;
                return slot_index as u32;
            }
        }
        // Enjambre saturado: las ranuras se reutilizan cíclicamente
        (self.next_client_identifier.load(Ordering::Relaxed) % WILD_OFFSET_SLOT_COUNT as u64) as u32
    }

    fn release_wild_slot(&self, slot: u32) {
        if let Ok(mut occupancy) = self.slot_occupancy.lock() {
            if (slot as usize) < occupancy.len() {
                occupancy[slot as usize] = false;
            }
        }
    }

    /// Procesa una colisión cruzada; retorna true si la campaña terminó.
    fn process_collision(&self, tame_distance: i128, wild_distance: i128) -> bool {
        match self.resolver.resolve(
            tame_distance,
            wild_distance,
            self.operations_estimate(),
            self.elapsed_seconds(),
        ) {
            Ok(Some(finding)) => {
                *self
                    .recovered_finding
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(finding);
                self.stop_flag.store(true, Ordering::SeqCst);
                let _ = self.found_broadcast.send(true);
                true
            }
            Ok(None) => false,
            Err(resolution_fault) => {
                error!("💀 [SERVER_COLLISION_STORM]: {}", resolution_fault);
                self.stop_flag.store(true, Ordering::SeqCst);
                true
            }
        }
    }
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/**
 * Ejecuta el servidor de coordinación hasta hallazgo o detención.
 *
 * # Errors:
 * Propaga fallos de socket y de construcción del resolutor.
 */
#[instrument(skip_all, fields(port = options.port))]
pub async fn run_server(
    scope: SearchScope,
    table: Arc<TrapTable>,
    options: ServerOptions,
    stop_flag: Arc<AtomicBool>,
) -> Result<Option<Finding>> {
    let (found_broadcast, _) = tokio::sync::watch::channel(false);
    let resolver = CollisionResolver::new(scope, Some(options.output_path.clone()))
        .context("SERVER_RESOLVER")?;

    let context = Arc::new(ServerContext {
        scope,
        table,
        resolver,
        registry: Mutex::new(HashMap::new()),
        slot_occupancy: Mutex::new([false; WILD_OFFSET_SLOT_COUNT as usize]),
        herd_vault: Mutex::new(HashMap::new()),
        next_client_identifier: AtomicU64::new(1),
        server_epoch: AtomicU32::new(0),
        dp_received_total: AtomicU64::new(0),
        recovered_finding: Mutex::new(None),
        found_broadcast,
        stop_flag: Arc::clone(&stop_flag),
        campaign_origin: Instant::now(),
        initial_elapsed_seconds: options.initial_elapsed_seconds,
    });

    let listener = TcpListener::bind(("0.0.0.0", options.port))
        .await
        .with_context(|| format!("SERVER_BIND_FAULT: port {}", options.port))?;
    info!("🛰️ [COMMAND_CENTER]: Listening on port {} (dp={}).", options.port, scope.dp_bits);

    // DAEMON SEGADOR: defunción de clientes silenciosos
    let reaper_context = Arc::clone(&context);
    let reaper_handle = tokio::spawn(async move {
        let mut reaper_pulse = tokio::time::interval(REAPER_PERIOD);
        while !reaper_context.stop_flag.load(Ordering::Relaxed) {
            reaper_pulse.tick().await;
            let now_unix = now_unix_seconds();
            let mut freed_slots: Vec<u32> = Vec::new();
            {
                let mut registry = reaper_context
                    .registry
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                for record in registry.values_mut() {
                    if !record.is_dead
                        && record.has_expired(now_unix, CLIENT_DEAD_TIMEOUT_SECONDS)
                    {
                        warn!(
                            "💀 [CLIENT_DEAD]: {} silent beyond {}s; slot {} released.",
                            record.client_identifier, CLIENT_DEAD_TIMEOUT_SECONDS,
                            record.wild_offset_slot
                        );
                        record.is_dead = true;
                        freed_slots.push(record.wild_offset_slot);
                    }
                }
            }
            for slot in freed_slots {
                reaper_context.release_wild_slot(slot);
            }
        }
    });

    // DAEMON DE PERSISTENCIA: guardado monolítico o protocolo de división
    let saver_context = Arc::clone(&context);
    let saver_work_target = options.work_target.clone();
    let saver_split_mode = options.split_mode;
    let saver_period = options.save_period_seconds;
    let saver_handle = tokio::spawn(async move {
        if saver_period == 0 || saver_work_target.is_none() {
            return;
        }
        let work_target = saver_work_target.expect("guarded above");
        let mut saver_pulse = tokio::time::interval(Duration::from_secs(saver_period));
        saver_pulse.tick().await; // el primer tick es inmediato

        while !saver_context.stop_flag.load(Ordering::Relaxed) {
            saver_pulse.tick().await;
            if saver_context.stop_flag.load(Ordering::Relaxed) {
                break;
            }
            perform_server_save(&saver_context, &work_target, saver_split_mode).await;
        }
    });

    // BUCLE DE ACEPTACIÓN
    let mut shutdown_pulse = tokio::time::interval(Duration::from_millis(200));
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_address)) => {
                        let connection_context = Arc::clone(&context);
                        let network_timeout = options.network_timeout;
                        tokio::spawn(async move {
                            if let Err(connection_fault) = handle_connection(
                                stream, peer_address, connection_context, network_timeout,
                            ).await {
                                debug!("🔌 [CONNECTION_CLOSED]: {}: {}", peer_address, connection_fault);
                            }
                        });
                    }
                    Err(accept_fault) => {
                        warn!("⚠️ [ACCEPT_FAULT]: {}", accept_fault);
                    }
                }
            }
            _ = shutdown_pulse.tick() => {
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
            }
        }
    }

    // CIERRE: guardado final y recolección de daemons
    if let Some(work_target) = &options.work_target {
        perform_server_save(&context, work_target, options.split_mode).await;
    }
    let _ = context.found_broadcast.send(true);
    reaper_handle.abort();
    saver_handle.abort();

    let recovered = context
        .recovered_finding
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    Ok(recovered)
}

/// Ejecuta un guardado de servidor (monolítico o división particionada).
async fn perform_server_save(context: &Arc<ServerContext>, work_target: &PathBuf, split: bool) {
    let save_context = Arc::clone(context);
    let save_target = work_target.clone();

    let save_verdict = tokio::task::spawn_blocking(move || {
        if split {
            let outcome = split_into_partition(
                &save_target,
                &save_context.scope,
                &save_context.table,
                save_context.elapsed_seconds(),
            )?;
            // Tabla vaciada solo tras el plegado exitoso
            save_context.table.reset();
            save_context.server_epoch.fetch_add(1, Ordering::SeqCst);
            for (tame_distance, wild_distance) in &outcome.cross_collisions {
                if save_context.process_collision(*tame_distance, *wild_distance) {
                    break;
                }
            }
            Ok::<(), kangaroo_infra_workfile::WorkFileError>(())
        } else {
            let herd_snapshots: Vec<KangarooSnapshot> = save_context
                .herd_vault
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .values()
                .flatten()
                .copied()
                .collect();
            save_work_file(
                &save_target,
                WorkFileKind::ServerMonolithic,
                &save_context.scope,
                &save_context.table,
                &herd_snapshots,
                save_context.elapsed_seconds(),
                false,
            )
        }
    })
    .await;

    match save_verdict {
        Ok(Ok(())) => {
            info!(
                "💾 [SERVER_SEALED]: epoch {} persisted at {}.",
                context.server_epoch.load(Ordering::Relaxed),
                work_target.display()
            );
        }
        Ok(Err(save_fault)) => warn!("⚠️ [SERVER_SAVE_FAULT]: {}", save_fault),
        Err(join_fault) => warn!("⚠️ [SERVER_SAVE_PANIC]: {}", join_fault),
    }
}

/// Máquina de estados de una conexión: HANDSHAKE -> ASSIGNED -> STREAMING.
async fn handle_connection(
    mut stream: TcpStream,
    peer_address: SocketAddr,
    context: Arc<ServerContext>,
    network_timeout: Duration,
) -> Result<()> {
    // 1. HANDSHAKE
    let hello_frame = read_frame(&mut stream, network_timeout).await?;
    let (cpu_cores, estimated_speed) = match hello_frame {
        WireFrame::Hello { version, cpu_cores, estimated_speed, .. } => {
            if version != PROTOCOL_VERSION {
                write_frame(&mut stream, &WireFrame::Bye { reason_code: 0x01 }, network_timeout)
                    .await?;
                anyhow::bail!("PROTOCOL_VERSION_MISMATCH: peer {}", version);
            }
            (cpu_cores, estimated_speed)
        }
        unexpected => anyhow::bail!("HANDSHAKE_VIOLATION: {:?}", unexpected),
    };

    write_frame(
        &mut stream,
        &WireFrame::SetTarget { scope: context.scope },
        network_timeout,
    )
    .await?;

    // 2. ASSIGNED
    let client_identifier = context.next_client_identifier.fetch_add(1, Ordering::SeqCst);
    let wild_offset_slot = context.allocate_wild_slot();
    let herd_count = cpu_cores.max(1) * HERD_PER_REPORTED_CORE;

    write_frame(
        &mut stream,
        &WireFrame::Assign { wild_offset_slot, herd_count },
        network_timeout,
    )
    .await?;

    {
        let mut registry = context
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.insert(
            client_identifier,
            ClientRecord {
                client_identifier: format!("swarm-{:04}", client_identifier),
                remote_address: peer_address.to_string(),
                last_seen_unix: now_unix_seconds(),
                dp_count_received: 0,
                estimated_speed,
                wild_offset_slot,
                herd_count,
                is_dead: false,
            },
        );
    }
    info!(
        "🤝 [CLIENT_ASSIGNED]: {} -> slot {} ({} kangaroos, {:.0} ops/s reported).",
        peer_address, wild_offset_slot, herd_count, estimated_speed
    );

    // 3. STREAMING
    let mut found_watch = context.found_broadcast.subscribe();
    let streaming_verdict: Result<()> = async {
        loop {
            let dead_window = Duration::from_secs(CLIENT_DEAD_TIMEOUT_SECONDS);
            tokio::select! {
                incoming = read_frame(&mut stream, dead_window) => {
                    let frame = incoming?;
                    touch_client(&context, client_identifier);

                    match frame {
                        WireFrame::DpBatch { points } => {
                            let batch_size = points.len() as u64;
                            let mut campaign_over = false;
                            for point in &points {
                                if let InsertOutcome::Collision { tame_distance, wild_distance } =
                                    context.table.insert(point)
                                {
                                    if context.process_collision(tame_distance, wild_distance) {
                                        campaign_over = true;
                                        break;
                                    }
                                }
                            }
                            context.dp_received_total.fetch_add(batch_size, Ordering::Relaxed);
                            credit_client(&context, client_identifier, batch_size);

                            let found_flag = campaign_over || *found_watch.borrow();
                            write_frame(&mut stream, &WireFrame::Ack {
                                found: found_flag,
                                server_epoch: context.server_epoch.load(Ordering::Relaxed),
                            }, network_timeout).await?;
                        }
                        WireFrame::Ping { timestamp_millis } => {
                            write_frame(&mut stream, &WireFrame::Pong { timestamp_millis },
                                network_timeout).await?;
                        }
                        WireFrame::HerdPush { snapshots } => {
                            context.herd_vault
                                .lock()
                                .unwrap_or_else(|poisoned| poisoned.into_inner())
                                .insert(client_identifier, snapshots);
                            let found_flag = *found_watch.borrow();
                            write_frame(&mut stream, &WireFrame::Ack {
                                found: found_flag,
                                server_epoch: context.server_epoch.load(Ordering::Relaxed),
                            }, network_timeout).await?;
                        }
                        WireFrame::Bye { reason_code } => {
                            debug!("👋 [CLIENT_BYE]: {} reason {:#04X}.", peer_address, reason_code);
                            return Ok(());
                        }
                        unexpected => {
                            anyhow::bail!("STREAMING_VIOLATION: {:?}", unexpected);
                        }
                    }
                }
                _ = found_watch.changed() => {
                    let private_key_hex = context
                        .recovered_finding
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .as_ref()
                        .map(|finding| finding.private_key_hex.clone());
                    if let Some(private_key_hex) = private_key_hex {
                        let mut private_key = [0u8; 32];
                        if hex::decode_to_slice(&private_key_hex, &mut private_key).is_ok() {
                            write_frame(&mut stream, &WireFrame::Found { private_key },
                                network_timeout).await?;
                        }
                    }
                    return Ok(());
                }
            }
        }
    }
    .await;

    // 4. CIERRE: la ranura se libera, el rastro del cliente se preserva
    context.release_wild_slot(wild_offset_slot);
    if let Ok(mut registry) = context.registry.lock() {
        if let Some(record) = registry.get_mut(&client_identifier) {
            record.is_dead = true;
        }
    }

    streaming_verdict
}

fn touch_client(context: &Arc<ServerContext>, client_identifier: u64) {
    if let Ok(mut registry) = context.registry.lock() {
        if let Some(record) = registry.get_mut(&client_identifier) {
            record.last_seen_unix = now_unix_seconds();
        }
    }
}

fn credit_client(context: &Arc<ServerContext>, client_identifier: u64, batch_size: u64) {
    if let Ok(mut registry) = context.registry.lock() {
        if let Some(record) = registry.get_mut(&client_identifier) {
            record.dp_count_received += batch_size;
        }
    }
}
