// [libs/domain/engine/src/lib.rs]
/*!
 * =================================================================
 * APARATO: KANGAROO ENGINE MASTER HUB (V28.0 - LAMBDA SYNC)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: ORQUESTACIÓN DEL MÉTODO LAMBDA DE POLLARD
 *
 * # Mathematical Proof (Lambda Method):
 * Dos manadas deterministas (Tame desde kmin, Wild desde P) caminan el
 * mismo grafo pseudo-aleatorio; la fusión de trayectorias entre manadas
 * produce una colisión de Puntos Distinguidos que cede el logaritmo
 * discreto en ~2*sqrt(W) operaciones de grupo esperadas.
 * =================================================================
 */

/// Catálogo de fallos del motor.
pub mod errors;
/// Frontera abstracta de kernels aceleradores y kernel de referencia.
pub mod gpu;
/// Siembra, invariante y resurrección de canguros.
pub mod herd;
/// Tabla de saltos determinista con media equilibrada.
pub mod jump;
/// Reconstrucción y certificación del logaritmo ante colisiones.
pub mod resolver;
/// Orquestación completa de una campaña local.
pub mod runner;
/// Avance por lote con inversión modular amortizada.
pub mod stepper;
/// Pool de workers de CPU y tubería de Puntos Distinguidos.
pub mod workers;

pub use errors::EngineError;
pub use herd::{spawn_herd, wild_offset_for_slot, Kangaroo};
pub use jump::{JumpEntry, JumpTable, JUMP_TABLE_SIZE};
pub use resolver::CollisionResolver;
pub use runner::{run_solo, SaveHook, SaveRequest, SoloRunnerOptions, KANGAROOS_PER_CPU_CORE};
pub use stepper::{HerdStepper, StepStatistics};
pub use workers::{EngineSignals, SwarmCounters, WorkerPool, DP_QUEUE_CAPACITY, WORKER_BATCH_STEPS};
