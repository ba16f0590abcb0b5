// [libs/infra/transport/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TRANSPORT MASTER HUB (V9.0 - LAMBDA WIRE)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: PROTOCOLO BINARIO DEL ENJAMBRE DISTRIBUIDO
 *
 * # Mathematical Proof (Redundant Stream):
 * Los Puntos Distinguidos son muestras redundantes del grafo de
 * trayectorias: la pérdida de un lote solo extiende marginalmente el
 * tiempo esperado, lo que permite un protocolo sin retransmisión.
 * =================================================================
 */

/// Catálogo de fallos de cable.
pub mod errors;
/// Codec de tramas y catálogo de opcodes.
pub mod frame;

pub use errors::TransportError;
pub use frame::{
    read_frame, write_frame, WireFrame, DEFAULT_SERVER_PORT, MAXIMUM_DP_BATCH,
    MAXIMUM_FRAME_PAYLOAD, PROTOCOL_VERSION,
};
