// [libs/domain/models-rs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS MASTER HUB (V152.0 - LAMBDA CONTRACTS)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS SOBERANOS DEL ENJAMBRE LAMBDA
 *
 * # Mathematical Proof (Contract Immutability):
 * Los contratos de este estrato son la única fuente de verdad compartida
 * entre el motor local, el codec de persistencia y el protocolo de red;
 * cualquier asimetría rompería la paridad bit-perfecta de los merges.
 * =================================================================
 */

/// Registro de clientes del servidor de coordinación.
pub mod client;
/// Puntos Distinguidos y empaquetado de distancia con etiqueta de manada.
pub mod dp;
/// Artefacto inmutable de un logaritmo discreto recuperado.
pub mod finding;
/// Catálogo de fallos de los contratos de dominio.
pub mod errors;
/// Definición del objetivo de búsqueda (rango + clave pública).
pub mod scope;
/// Instantáneas de progreso para el reporte de 1 Hz.
pub mod telemetry;

/// Instantáneas serializables de la manada para la barrera de guardado.
pub mod herd;
