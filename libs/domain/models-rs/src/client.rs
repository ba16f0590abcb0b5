// [libs/domain/models-rs/src/client.rs]
/*!
 * =================================================================
 * APARATO: SWARM CLIENT REGISTRY CONTRACT (V6.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FICHA SOBERANA DE CADA PAR CONECTADO
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Umbral de defunción de un cliente sin tramas (segundos).
pub const CLIENT_DEAD_TIMEOUT_SECONDS: u64 = 30;

/// Ficha de registro de un cliente del enjambre en el servidor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Identificador nominal asignado en el handshake.
    pub client_identifier: String,
    /// Dirección remota observada en el socket.
    pub remote_address: String,
    /// Última trama recibida (reloj Unix, segundos).
    pub last_seen_unix: u64,
    /// Volumen acumulado de Puntos Distinguidos recibidos.
    pub dp_count_received: u64,
    /// Velocidad estimada reportada en el handshake (ops/s).
    pub estimated_speed: f64,
    /// Ranura de offset salvaje asignada al cliente.
    pub wild_offset_slot: u32,
    /// Cantidad de canguros gestionados por el cliente.
    pub herd_count: u32,
    /// Marca de defunción: la ranura fue liberada, el rastro se preserva.
    pub is_dead: bool,
}

impl ClientRecord {
    /// Evalúa la defunción del cliente contra el reloj actual.
    #[must_use]
    pub fn has_expired(&self, now_unix: u64, timeout_seconds: u64) -> bool {
        now_unix.saturating_sub(self.last_seen_unix) > timeout_seconds
    }
}
