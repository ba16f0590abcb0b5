// [libs/core/trapstore/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TRAPSTORE MASTER HUB (V43.0 - ZENITH LAMBDA)
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: ORQUESTACIÓN DEL ALMACÉN DE TRAMPAS CONCURRENTE
 *
 * # Mathematical Proof (Fingerprint Compression):
 * Cada entrada conserva los 128 bits altos de x; el índice de cubeta
 * aporta los bits bajos. La probabilidad de una colisión espuria de
 * huella es < 2^-128 por par, y toda colisión candidata se verifica
 * contra la curva antes de emitirse.
 * =================================================================
 */

/// Filtro de Puntos Distinguidos (ceros finales de la coordenada X).
pub mod filter;
/// Cerrojo de giro test-and-set con retroceso exponencial.
pub mod spinlock;
/// Tabla de huellas particionada con detección de colisión cruzada.
pub mod table;

pub use filter::DistinguishedFilter;
pub use spinlock::{SpinMutex, SpinMutexGuard};
pub use table::{InsertOutcome, TrapEntry, TrapTable, BUCKET_SOFT_CAPACITY, DEFAULT_BUCKET_BITS};
