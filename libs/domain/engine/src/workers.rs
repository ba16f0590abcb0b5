// [libs/domain/engine/src/workers.rs]
/*!
 * =================================================================
 * APARATO: CPU WORKER POOL (V133.0 - BARRIER SYNERGY)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: CICLO DE VIDA DE WORKERS Y TUBERÍA DE DPs
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. THREAD-PARTITIONED HERD: Cada worker posee su segmento de manada
 *    en exclusiva; ningún cerrojo se toma para avanzar un canguro.
 * 2. BOUNDED BACKPRESSURE: La tubería MPSC acotada (1024) bloquea <= 1 ms
 *    por intento; la generación de DPs nunca se detiene por largo.
 * 3. SAVE BARRIER: Ante una pausa, el worker vacía su tubería local,
 *    deposita la instantánea de manada y se estaciona hasta la reanudación.
 * =================================================================
 */

use crate::errors::EngineError;
use crate::herd::Kangaroo;
use crate::jump::JumpTable;
use crate::stepper::{HerdStepper, StepStatistics};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use kangaroo_core_trapstore::DistinguishedFilter;
use kangaroo_domain_models::dp::DistinguishedPoint;
use kangaroo_domain_models::herd::KangarooSnapshot;
use kangaroo_domain_models::scope::SearchScope;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

/// Saltos por lote entre inspecciones de señales (<= 64 por contrato).
pub const WORKER_BATCH_STEPS: u32 = 64;
/// Capacidad de la tubería MPSC de Puntos Distinguidos.
pub const DP_QUEUE_CAPACITY: usize = 1024;
/// Espera máxima por intento de empuje a la tubería.
const DP_PUSH_RETRY_WAIT: Duration = Duration::from_millis(1);
/// Pulso de estacionamiento durante la barrera de guardado.
const PARKED_POLL_WAIT: Duration = Duration::from_micros(500);

/// Señales compartidas del ciclo de vida del motor.
#[derive(Clone)]
pub struct EngineSignals {
    /// Bandera one-shot de detención (found / SIGINT / maxStep).
    pub stop_flag: Arc<AtomicBool>,
    /// Solicitud de barrera de guardado.
    pub pause_flag: Arc<AtomicBool>,
    /// Workers estacionados bajo la barrera.
    pub parked_worker_count: Arc<AtomicUsize>,
}

impl EngineSignals {
    /// Construye el juego de señales en estado operativo.
    #[must_use]
    pub fn new(stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            stop_flag,
            pause_flag: Arc::new(AtomicBool::new(false)),
            parked_worker_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Contadores agregados del enjambre local.
#[derive(Clone)]
pub struct SwarmCounters {
    /// Operaciones de grupo acumuladas.
    pub total_steps: Arc<AtomicU64>,
    /// Puntos Distinguidos emitidos por los workers.
    pub total_distinguished: Arc<AtomicU64>,
    /// Canguros resucitados por ciclos infructuosos.
    pub dead_kangaroos: Arc<AtomicU64>,
}

impl SwarmCounters {
    /// Construye los contadores a cero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_steps: Arc::new(AtomicU64::new(0)),
            total_distinguished: Arc::new(AtomicU64::new(0)),
            dead_kangaroos: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for SwarmCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool de workers de CPU con su tubería de Puntos Distinguidos.
pub struct WorkerPool {
    /// Extremo de drenaje de la tubería MPSC.
    pub distinguished_receiver: Receiver<DistinguishedPoint>,
    /// Señales compartidas del ciclo de vida.
    pub signals: EngineSignals,
    /// Contadores agregados del enjambre.
    pub counters: SwarmCounters,
    /// Depósitos de instantánea de manada (uno por worker).
    pub herd_deposits: Arc<Mutex<Vec<Vec<KangarooSnapshot>>>>,
    worker_handles: Vec<JoinHandle<Result<(), EngineError>>>,
    worker_count: usize,
}

impl WorkerPool {
    /**
     * Despliega los workers de CPU, repartiendo la manada en segmentos
     * de propiedad exclusiva.
     */
    #[must_use]
    pub fn spawn_cpu_workers(
        scope: SearchScope,
        jump_table: Arc<JumpTable>,
        filter: DistinguishedFilter,
        full_herd: Vec<Kangaroo>,
        cpu_threads: usize,
        runtime_seed: u64,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        let worker_count = cpu_threads.max(1);
        let signals = EngineSignals::new(stop_flag);
        let counters = SwarmCounters::new();
        let (distinguished_sender, distinguished_receiver) = bounded(DP_QUEUE_CAPACITY);
        let herd_deposits = Arc::new(Mutex::new(vec![Vec::new(); worker_count]));

        // Reparto de la manada en segmentos contiguos por worker
        let mut herd_segments: Vec<Vec<Kangaroo>> = vec![Vec::new(); worker_count];
        for (kangaroo_index, kangaroo) in full_herd.into_iter().enumerate() {
            herd_segments[kangaroo_index % worker_count].push(kangaroo);
        }

        let mut worker_handles = Vec::with_capacity(worker_count);
        for (worker_index, herd_segment) in herd_segments.into_iter().enumerate() {
            let worker_scope = scope;
            let worker_jump_table = Arc::clone(&jump_table);
            let worker_signals = signals.clone();
            let worker_counters = counters.clone();
            let worker_sender = distinguished_sender.clone();
            let worker_deposits = Arc::clone(&herd_deposits);
            let worker_entropy = StdRng::seed_from_u64(
                runtime_seed ^ ((worker_index as u64 + 1).wrapping_mul(0x9E3779B97F4A7C15)),
            );

            worker_handles.push(std::thread::spawn(move || {
                run_cpu_worker(
                    worker_index,
                    herd_segment,
                    worker_scope,
                    worker_jump_table,
                    filter,
                    worker_signals,
                    worker_counters,
                    worker_sender,
                    worker_deposits,
                    worker_entropy,
                )
            }));
        }

        info!("🧵 [WORKER_POOL]: {} CPU workers deployed.", worker_count);

        Self {
            distinguished_receiver,
            signals,
            counters,
            herd_deposits,
            worker_handles,
            worker_count,
        }
    }

    /// Cantidad de workers desplegados.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Solicita la barrera de guardado.
    pub fn request_pause(&self) {
        self.signals.pause_flag.store(true, Ordering::SeqCst);
    }

    /// Levanta la barrera y reanuda el enjambre.
    pub fn resume(&self) {
        self.signals.pause_flag.store(false, Ordering::SeqCst);
    }

    /// Evalúa si todos los workers están estacionados bajo la barrera.
    #[must_use]
    pub fn all_workers_parked(&self) -> bool {
        self.signals.parked_worker_count.load(Ordering::SeqCst) >= self.worker_count
    }

    /// Instantánea agregada de la manada desde los depósitos de barrera.
    #[must_use]
    pub fn collect_herd_snapshots(&self) -> Vec<KangarooSnapshot> {
        self.herd_deposits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .flatten()
            .copied()
            .collect()
    }

    /**
     * Espera la terminación de todos los workers.
     *
     * # Errors:
     * Retorna el primer fallo observado en un worker.
     */
    pub fn join(self) -> Result<(), EngineError> {
        let mut first_fault: Option<EngineError> = None;
        for worker_handle in self.worker_handles {
            match worker_handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(worker_fault)) => {
                    if first_fault.is_none() {
                        first_fault = Some(worker_fault);
                    }
                }
                Err(_) => {
                    if first_fault.is_none() {
                        first_fault = Some(EngineError::HerdSpawnFault(
                            "WORKER_PANIC: thread terminated abruptly".to_string(),
                        ));
                    }
                }
            }
        }
        match first_fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

/// Bucle principal de un worker de CPU.
#[allow(clippy::too_many_arguments)]
fn run_cpu_worker(
    worker_index: usize,
    mut herd_segment: Vec<Kangaroo>,
    scope: SearchScope,
    jump_table: Arc<JumpTable>,
    filter: DistinguishedFilter,
    signals: EngineSignals,
    counters: SwarmCounters,
    distinguished_sender: Sender<DistinguishedPoint>,
    herd_deposits: Arc<Mutex<Vec<Vec<KangarooSnapshot>>>>,
    mut entropy_source: StdRng,
) -> Result<(), EngineError> {
    let mut stepper = HerdStepper::new(filter, herd_segment.len());
    let mut pending_points: Vec<DistinguishedPoint> = Vec::new();

    loop {
        if signals.stop_flag.load(Ordering::Relaxed) {
            break;
        }

        // BARRERA DE GUARDADO: vaciar tubería, depositar manada, estacionar
        if signals.pause_flag.load(Ordering::Relaxed) {
            flush_pending_points(&distinguished_sender, &mut pending_points, &signals);
            deposit_herd_snapshot(&herd_deposits, worker_index, &herd_segment);

            signals.parked_worker_count.fetch_add(1, Ordering::SeqCst);
            while signals.pause_flag.load(Ordering::Relaxed)
                && !signals.stop_flag.load(Ordering::Relaxed)
            {
                std::thread::sleep(PARKED_POLL_WAIT);
            }
            signals.parked_worker_count.fetch_sub(1, Ordering::SeqCst);
            continue;
        }

        // Segmento vacío (resume con menos canguros que hilos): sin trabajo
        if herd_segment.is_empty() {
            std::thread::sleep(Duration::from_millis(5));
            continue;
        }

        // LOTE DE AVANCE (<= 64 saltos entre inspecciones de señal)
        let mut batch_statistics = StepStatistics::default();
        for _ in 0..WORKER_BATCH_STEPS {
            stepper.advance(
                &mut herd_segment,
                &jump_table,
                &scope,
                &mut entropy_source,
                &mut |distinguished_point| pending_points.push(distinguished_point),
                &mut batch_statistics,
            )?;
        }

        counters.total_steps.fetch_add(batch_statistics.steps, Ordering::Relaxed);
        counters
            .total_distinguished
            .fetch_add(batch_statistics.distinguished_points, Ordering::Relaxed);
        counters
            .dead_kangaroos
            .fetch_add(batch_statistics.dead_kangaroos, Ordering::Relaxed);

        flush_pending_points(&distinguished_sender, &mut pending_points, &signals);
    }

    // Depósito final para el guardado de cierre
    deposit_herd_snapshot(&herd_deposits, worker_index, &herd_segment);
    debug!("🧵 [WORKER_{}]: Clean shutdown.", worker_index);
    Ok(())
}

/**
 * Empuja los DPs pendientes con espera acotada (<= 1 ms por intento).
 * La generación de DPs es el camino crítico: ante congestión sostenida
 * se reintenta sin bloquear por largo, y la detención global descarta
 * el remanente (los DPs son redundantes).
 */
fn flush_pending_points(
    distinguished_sender: &Sender<DistinguishedPoint>,
    pending_points: &mut Vec<DistinguishedPoint>,
    signals: &EngineSignals,
) {
    while let Some(next_point) = pending_points.last().copied() {
        match distinguished_sender.try_send(next_point) {
            Ok(()) => {
                pending_points.pop();
            }
            Err(TrySendError::Full(_)) => {
                if signals.stop_flag.load(Ordering::Relaxed) {
                    pending_points.clear();
                    return;
                }
                std::thread::sleep(DP_PUSH_RETRY_WAIT);
            }
            Err(TrySendError::Disconnected(_)) => {
                pending_points.clear();
                return;
            }
        }
    }
}

fn deposit_herd_snapshot(
    herd_deposits: &Arc<Mutex<Vec<Vec<KangarooSnapshot>>>>,
    worker_index: usize,
    herd_segment: &[Kangaroo],
) {
    let snapshots: Vec<KangarooSnapshot> =
        herd_segment.iter().map(Kangaroo::to_snapshot).collect();
    herd_deposits
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())[worker_index] = snapshots;
}
