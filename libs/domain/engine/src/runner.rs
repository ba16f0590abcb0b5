// [libs/domain/engine/src/runner.rs]
/*!
 * =================================================================
 * APARATO: SOLO CAMPAIGN RUNNER (V27.0 - BARRIER SOVEREIGN)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: ORQUESTACIÓN COMPLETA DE UNA CAMPAÑA LOCAL
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE OWNER: El hilo principal posee la tabla de trampas y drena
 *    la tubería MPSC; los workers jamás insertan directamente.
 * 2. LINEARIZABLE SNAPSHOTS: La barrera de guardado congela manada y
 *    tabla en un punto consistente; todo DP persistido es coherente con
 *    la posición serializada de su emisor.
 * 3. EXPLICIT RUNTIME: La semilla, el origen temporal y el tope de
 *    operaciones viajan como valores explícitos; cero singletons.
 *
 * # Mathematical Proof (Expected Work):
 * Con saltos de media óptima y densidad DP 2^-dp, la campaña converge
 * en ~2*sqrt(W) operaciones de grupo con alta probabilidad.
 * =================================================================
 */

use crate::errors::EngineError;
use crate::herd::{spawn_herd, Kangaroo};
use crate::jump::JumpTable;
use crate::resolver::CollisionResolver;
use crate::workers::WorkerPool;
use crossbeam_channel::RecvTimeoutError;
use kangaroo_core_trapstore::{DistinguishedFilter, InsertOutcome, TrapTable};
use kangaroo_domain_models::finding::Finding;
use kangaroo_domain_models::herd::KangarooSnapshot;
use kangaroo_domain_models::scope::SearchScope;
use kangaroo_domain_models::telemetry::ProgressSnapshot;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Canguros sembrados por núcleo de CPU (N = 2 * cores).
pub const KANGAROOS_PER_CPU_CORE: usize = 2;
/// Pulso de drenaje de la tubería MPSC.
const DRAIN_RECV_TIMEOUT: Duration = Duration::from_millis(100);
/// Pulso del reporte de progreso.
const PROGRESS_REPORT_PERIOD: Duration = Duration::from_secs(1);

/// Parámetros explícitos de una campaña local (Runtime value).
pub struct SoloRunnerOptions {
    /// Hilos de CPU del enjambre local.
    pub cpu_threads: usize,
    /// Período del guardado automático (segundos; 0 desactiva).
    pub save_period_seconds: u64,
    /// Ventana máxima de la barrera de guardado (milisegundos).
    pub save_barrier_timeout_millis: u64,
    /// Incluir la instantánea de manada en los guardados.
    pub save_herd: bool,
    /// Tope de operaciones: multiplicador sobre 2*sqrt(W) (0 = sin tope).
    pub max_step_multiplier: f64,
    /// Semilla del runtime (siembra de manada y workers).
    pub runtime_seed: u64,
    /// Segundos acumulados de campañas previas (resume).
    pub initial_elapsed_seconds: u64,
    /// Manada restaurada desde un work file (resume).
    pub initial_herd: Option<Vec<KangarooSnapshot>>,
    /// Archivo de resultados (None silencia el sumidero).
    pub output_path: Option<PathBuf>,
}

/// Solicitud de guardado entregada al gancho de persistencia.
pub struct SaveRequest<'a> {
    /// Objetivo vigente de la campaña.
    pub scope: &'a SearchScope,
    /// Tabla de trampas congelada bajo la barrera.
    pub table: &'a TrapTable,
    /// Instantánea de manada (vacía si el guardado de manada está apagado).
    pub herd_snapshots: Vec<KangarooSnapshot>,
    /// Segundos acumulados de la campaña.
    pub elapsed_seconds: u64,
}

/// Gancho de persistencia inyectado por el estrato de aplicación.
pub type SaveHook<'a> = dyn FnMut(&SaveRequest<'_>) -> Result<(), String> + 'a;

/**
 * Ejecuta una campaña local completa hasta hallazgo, tope o detención.
 *
 * # Errors:
 * Propaga colapsos del motor (tormenta de colisiones, fallos de worker).
 */
#[instrument(skip_all, fields(dp = scope.dp_bits, threads = options.cpu_threads))]
pub fn run_solo(
    scope: SearchScope,
    table: Arc<TrapTable>,
    options: SoloRunnerOptions,
    external_stop: Arc<AtomicBool>,
    mut save_hook: Option<&mut SaveHook<'_>>,
) -> Result<Option<Finding>, EngineError> {
    let campaign_origin = Instant::now();
    let expected_operations = scope.expected_operations();
    let filter = DistinguishedFilter::new(scope.dp_bits);

    info!(
        "🦘 [CAMPAIGN_IGNITION]: dp={} expected ~2^{:.1} group ops, {} CPU threads.",
        scope.dp_bits,
        expected_operations.max(1.0).log2(),
        options.cpu_threads
    );

    // 1. TABLA DE SALTOS DETERMINISTA Y SIEMBRA DE MANADA
    let jump_table = Arc::new(JumpTable::derive(&scope)?);
    let full_herd: Vec<Kangaroo> = match &options.initial_herd {
        Some(snapshots) if !snapshots.is_empty() => {
            info!("🌊 [HERD_RESUME]: Restoring {} kangaroos from work file.", snapshots.len());
            snapshots.iter().map(Kangaroo::from_snapshot).collect()
        }
        _ => {
            let herd_size = options.cpu_threads.max(1) * KANGAROOS_PER_CPU_CORE;
            let mut seeding_entropy = StdRng::seed_from_u64(options.runtime_seed);
            spawn_herd(&scope, herd_size, 0, &mut seeding_entropy)?
        }
    };

    // 2. DESPLIEGUE DEL POOL Y DEL RESOLUTOR
    let resolver = CollisionResolver::new(scope, options.output_path.clone())?;
    let pool = WorkerPool::spawn_cpu_workers(
        scope,
        Arc::clone(&jump_table),
        filter,
        full_herd,
        options.cpu_threads.max(1),
        options.runtime_seed,
        Arc::clone(&external_stop),
    );

    // 3. BUCLE PRINCIPAL: DRENAJE, COLISIONES, BARRERAS Y PROGRESO
    let mut recovered_finding: Option<Finding> = None;
    let mut last_save_mark = Instant::now();
    let mut last_progress_mark = Instant::now();
    let max_operations = if options.max_step_multiplier > 0.0 {
        options.max_step_multiplier * expected_operations
    } else {
        f64::INFINITY
    };

    loop {
        if external_stop.load(Ordering::Relaxed) {
            break;
        }

        match pool.distinguished_receiver.recv_timeout(DRAIN_RECV_TIMEOUT) {
            Ok(distinguished_point) => {
                if let InsertOutcome::Collision { tame_distance, wild_distance } =
                    table.insert(&distinguished_point)
                {
                    let elapsed_seconds = options.initial_elapsed_seconds
                        + campaign_origin.elapsed().as_secs();
                    let operations_estimate =
                        pool.counters.total_steps.load(Ordering::Relaxed) as f64;
                    if let Some(finding) = resolver.resolve(
                        tame_distance,
                        wild_distance,
                        operations_estimate.max(1.0),
                        elapsed_seconds,
                    )? {
                        recovered_finding = Some(finding);
                        external_stop.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        // TOPE DE OPERACIONES (-m maxStep)
        let observed_operations = pool.counters.total_steps.load(Ordering::Relaxed) as f64;
        if observed_operations > max_operations {
            warn!(
                "🛑 [SEARCH_EXHAUSTED]: {} ops exceed the configured budget; giving up.",
                observed_operations as u64
            );
            external_stop.store(true, Ordering::SeqCst);
            break;
        }

        // BARRERA DE GUARDADO PERIÓDICO
        if options.save_period_seconds > 0
            && last_save_mark.elapsed().as_secs() >= options.save_period_seconds
        {
            if let Some(hook) = save_hook.as_mut() {
                let elapsed_seconds =
                    options.initial_elapsed_seconds + campaign_origin.elapsed().as_secs();
                let barrier_collisions = perform_save_barrier(
                    &scope,
                    &table,
                    &pool,
                    options.save_herd,
                    elapsed_seconds,
                    Duration::from_millis(options.save_barrier_timeout_millis.max(1)),
                    &mut **hook,
                )?;
                for (tame_distance, wild_distance) in barrier_collisions {
                    let operations_estimate =
                        pool.counters.total_steps.load(Ordering::Relaxed) as f64;
                    if let Some(finding) = resolver.resolve(
                        tame_distance,
                        wild_distance,
                        operations_estimate.max(1.0),
                        elapsed_seconds,
                    )? {
                        recovered_finding = Some(finding);
                        external_stop.store(true, Ordering::SeqCst);
                        break;
                    }
                }
                if recovered_finding.is_some() {
                    break;
                }
            }
            last_save_mark = Instant::now();
        }

        // REPORTE DE PROGRESO 1 HZ
        if last_progress_mark.elapsed() >= PROGRESS_REPORT_PERIOD {
            report_progress(&table, &pool, expected_operations, &options, &campaign_origin);
            last_progress_mark = Instant::now();
        }
    }

    // 4. CIERRE: DETENCIÓN, RECOLECCIÓN Y GUARDADO FINAL
    external_stop.store(true, Ordering::SeqCst);
    pool.resume();

    // Los workers depositan su manada al salir: se recolectan primero
    let herd_deposits = Arc::clone(&pool.herd_deposits);
    let remnant_receiver = pool.distinguished_receiver.clone();
    let final_counters = pool.counters.clone();
    let join_verdict = pool.join();

    // Drenaje del remanente de la tubería hacia la tabla
    while let Ok(distinguished_point) = remnant_receiver.try_recv() {
        if let InsertOutcome::Collision { tame_distance, wild_distance } =
            table.insert(&distinguished_point)
        {
            if recovered_finding.is_none() {
                let elapsed_seconds =
                    options.initial_elapsed_seconds + campaign_origin.elapsed().as_secs();
                let operations_estimate =
                    final_counters.total_steps.load(Ordering::Relaxed) as f64;
                if let Some(finding) = resolver.resolve(
                    tame_distance,
                    wild_distance,
                    operations_estimate.max(1.0),
                    elapsed_seconds,
                )? {
                    recovered_finding = Some(finding);
                }
            }
        }
    }

    if recovered_finding.is_none() {
        if let Some(hook) = save_hook.as_mut() {
            let elapsed_seconds =
                options.initial_elapsed_seconds + campaign_origin.elapsed().as_secs();
            let herd_snapshots: Vec<KangarooSnapshot> = if options.save_herd {
                herd_deposits
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .iter()
                    .flatten()
                    .copied()
                    .collect()
            } else {
                Vec::new()
            };
            let save_request = SaveRequest {
                scope: &scope,
                table: &table,
                herd_snapshots,
                elapsed_seconds,
            };
            if let Err(save_fault) = hook(&save_request) {
                warn!("⚠️ [FINAL_SAVE_FAULT]: {}", save_fault);
            }
        }
    }

    join_verdict?;
    Ok(recovered_finding)
}

/**
 * Ejecuta la barrera de guardado: pausa, drenaje completo, persistencia
 * y reanudación. La tabla queda congelada mientras los workers están
 * estacionados y la tubería vacía.
 */
fn perform_save_barrier(
    scope: &SearchScope,
    table: &Arc<TrapTable>,
    pool: &WorkerPool,
    save_herd: bool,
    elapsed_seconds: u64,
    barrier_window: Duration,
    save_hook: &mut (dyn FnMut(&SaveRequest<'_>) -> Result<(), String> + '_),
) -> Result<Vec<(i128, i128)>, EngineError> {
    pool.request_pause();
    let barrier_deadline = Instant::now() + barrier_window;
    let mut deferred_collisions: Vec<(i128, i128)> = Vec::new();

    let mut drain_into_table = |collisions: &mut Vec<(i128, i128)>| {
        while let Ok(distinguished_point) = pool.distinguished_receiver.try_recv() {
            if let InsertOutcome::Collision { tame_distance, wild_distance } =
                table.insert(&distinguished_point)
            {
                collisions.push((tame_distance, wild_distance));
            }
        }
    };

    // Espera activa breve: los workers vacían su tubería y se estacionan
    while !pool.all_workers_parked() {
        drain_into_table(&mut deferred_collisions);
        if pool.signals.stop_flag.load(Ordering::Relaxed) || Instant::now() >= barrier_deadline {
            warn!("⚠️ [BARRIER_TIMEOUT]: snapshot taken with workers still converging.");
            break;
        }
        std::thread::sleep(Duration::from_micros(200));
    }
    drain_into_table(&mut deferred_collisions);

    let save_request = SaveRequest {
        scope,
        table,
        herd_snapshots: if save_herd { pool.collect_herd_snapshots() } else { Vec::new() },
        elapsed_seconds,
    };

    let save_verdict = save_hook(&save_request);
    pool.resume();

    match save_verdict {
        Ok(()) => {
            info!(
                "💾 [WORK_SEALED]: {} fingerprints persisted under barrier.",
                table.entry_count()
            );
        }
        Err(save_fault) => {
            warn!("⚠️ [SAVE_FAULT]: {}", save_fault);
        }
    }

    Ok(deferred_collisions)
}

fn report_progress(
    table: &Arc<TrapTable>,
    pool: &WorkerPool,
    expected_operations: f64,
    options: &SoloRunnerOptions,
    campaign_origin: &Instant,
) {
    let snapshot = ProgressSnapshot {
        total_steps: pool.counters.total_steps.load(Ordering::Relaxed),
        total_distinguished_points: table.entry_count(),
        dead_kangaroo_count: pool.counters.dead_kangaroos.load(Ordering::Relaxed),
        same_herd_fusion_count: table.fusion_count(),
        bad_collision_count: 0,
        expected_operations,
        elapsed_seconds: options.initial_elapsed_seconds + campaign_origin.elapsed().as_secs(),
    };

    let eta_display = snapshot
        .estimated_remaining_seconds()
        .map(|eta| format!("{:.0}s", eta))
        .unwrap_or_else(|| "--".to_string());

    info!(
        "📊 [PROGRESS]: {:.1}% | ops 2^{:.2} | DPs {} | dead {} | ETA {}",
        snapshot.completion_ratio() * 100.0,
        (snapshot.total_steps.max(1) as f64).log2(),
        snapshot.total_distinguished_points,
        snapshot.dead_kangaroo_count,
        eta_display
    );
}
