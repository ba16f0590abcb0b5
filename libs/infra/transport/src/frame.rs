// [libs/infra/transport/src/frame.rs]
/*!
 * =================================================================
 * APARATO: SWARM WIRE PROTOCOL (V8.0 - FRAMED SOVEREIGN)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: CODEC DE TRAMAS TCP DEL PROTOCOLO LAMBDA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FRAME CANON: u32 longitud (orden de red) | u8 opcode | payload.
 *    La longitud cubre opcode + payload; los enteros del payload viajan
 *    en Little-Endian, compartiendo el layout del work file.
 * 2. DOS SHIELD: Tramas sobre el límite duro se rechazan antes de
 *    alocar un solo byte del payload.
 * 3. TIMEOUT DISCIPLINE: Toda lectura/escritura respeta la ventana
 *    'ntimeout'; un par silencioso se desconecta sin bloquear el hilo.
 * =================================================================
 */

use crate::errors::TransportError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kangaroo_domain_models::dp::{DistinguishedPoint, DP_WIRE_SIZE};
use kangaroo_domain_models::herd::{KangarooSnapshot, HERD_RECORD_WIRE_SIZE};
use kangaroo_domain_models::scope::SearchScope;
use std::io::Cursor;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Puerto TCP por defecto del servidor de coordinación.
pub const DEFAULT_SERVER_PORT: u16 = 17403;
/// Versión vigente del protocolo de enjambre.
pub const PROTOCOL_VERSION: u16 = 2;
/// Entradas máximas de un lote de Puntos Distinguidos.
pub const MAXIMUM_DP_BATCH: usize = 1024;
/// Límite duro del payload de una trama (guardia anti-DoS).
pub const MAXIMUM_FRAME_PAYLOAD: u32 = 256 * 1024;

const OPCODE_HELLO: u8 = 0x01;
const OPCODE_SET_TARGET: u8 = 0x02;
const OPCODE_ASSIGN: u8 = 0x03;
const OPCODE_DP_BATCH: u8 = 0x04;
const OPCODE_ACK: u8 = 0x05;
const OPCODE_FOUND: u8 = 0x06;
const OPCODE_PING: u8 = 0x07;
const OPCODE_PONG: u8 = 0x08;
const OPCODE_HERD_PUSH: u8 = 0x09;
const OPCODE_BYE: u8 = 0xFF;

/// Trama decodificada del protocolo de enjambre.
#[derive(Debug, Clone, PartialEq)]
pub enum WireFrame {
    /// Presentación del cliente: versión, capacidades y velocidad estimada.
    Hello {
        /// Versión del protocolo del par.
        version: u16,
        /// Bits de capacidades reservados.
        feature_bits: u32,
        /// Núcleos de CPU reportados.
        cpu_cores: u32,
        /// Dispositivos aceleradores reportados.
        gpu_count: u32,
        /// Velocidad estimada en operaciones por segundo.
        estimated_speed: f64,
    },
    /// Objetivo de campaña estampado por el servidor.
    SetTarget {
        /// Scope completo (P, kmin, kmax, dp, jump_seed).
        scope: SearchScope,
    },
    /// Asignación de ranura de sub-enjambre salvaje.
    Assign {
        /// Ranura de offset salvaje del cliente.
        wild_offset_slot: u32,
        /// Canguros a desplegar por el cliente.
        herd_count: u32,
    },
    /// Lote de Puntos Distinguidos del cliente.
    DpBatch {
        /// Entradas del lote (<= 1024).
        points: Vec<DistinguishedPoint>,
    },
    /// Acuse del servidor con la bandera de hallazgo y la época vigente.
    Ack {
        /// Bandera one-shot: la campaña ya produjo el logaritmo.
        found: bool,
        /// Época del servidor (incrementa con cada división -wsplit).
        server_epoch: u32,
    },
    /// Difusión terminal del logaritmo recuperado.
    Found {
        /// Escalar privado certificado (Big-Endian).
        private_key: [u8; 32],
    },
    /// Latido de ida.
    Ping {
        /// Marca temporal del emisor (milisegundos Unix).
        timestamp_millis: u64,
    },
    /// Latido de vuelta.
    Pong {
        /// Marca temporal devuelta.
        timestamp_millis: u64,
    },
    /// Instantánea de manada del cliente (-wss).
    HerdPush {
        /// Registros de canguro serializados.
        snapshots: Vec<KangarooSnapshot>,
    },
    /// Despedida con código de motivo.
    Bye {
        /// Código de motivo de la desconexión.
        reason_code: u8,
    },
}

impl WireFrame {
    /// Serializa la trama completa (prefijo de longitud incluido).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut payload: Vec<u8> = Vec::new();
        let opcode = self.encode_payload(&mut payload);

        let mut frame_bytes = Vec::with_capacity(4 + 1 + payload.len());
        let frame_length = (payload.len() + 1) as u32;
        frame_bytes.extend_from_slice(&frame_length.to_be_bytes());
        frame_bytes.push(opcode);
        frame_bytes.extend_from_slice(&payload);
        frame_bytes
    }

    fn encode_payload(&self, payload: &mut Vec<u8>) -> u8 {
        match self {
            WireFrame::Hello { version, feature_bits, cpu_cores, gpu_count, estimated_speed } => {
                WriteBytesExt::write_u16::<LittleEndian>(payload, *version).expect("vec write");
                WriteBytesExt::write_u32::<LittleEndian>(payload, *feature_bits).expect("vec write");
                WriteBytesExt::write_u32::<LittleEndian>(payload, *cpu_cores).expect("vec write");
                WriteBytesExt::write_u32::<LittleEndian>(payload, *gpu_count).expect("vec write");
                WriteBytesExt::write_f64::<LittleEndian>(payload, *estimated_speed).expect("vec write");
                OPCODE_HELLO
            }
            WireFrame::SetTarget { scope } => {
                std::io::Write::write_all(payload, &scope.range_start).expect("vec write");
                std::io::Write::write_all(payload, &scope.range_end).expect("vec write");
                std::io::Write::write_all(payload, &scope.public_key_x).expect("vec write");
                std::io::Write::write_all(payload, &scope.public_key_y).expect("vec write");
                payload.push(scope.dp_bits);
                WriteBytesExt::write_u64::<LittleEndian>(payload, scope.jump_seed).expect("vec write");
                OPCODE_SET_TARGET
            }
            WireFrame::Assign { wild_offset_slot, herd_count } => {
                WriteBytesExt::write_u32::<LittleEndian>(payload, *wild_offset_slot).expect("vec write");
                WriteBytesExt::write_u32::<LittleEndian>(payload, *herd_count).expect("vec write");
                OPCODE_ASSIGN
            }
            WireFrame::DpBatch { points } => {
                debug_assert!(points.len() <= MAXIMUM_DP_BATCH);
                WriteBytesExt::write_u32::<LittleEndian>(payload, points.len() as u32)
                    .expect("vec write");
                for point in points {
                    std::io::Write::write_all(&mut *payload, &point.to_wire_bytes()).expect("vec write");
                }
                OPCODE_DP_BATCH
            }
            WireFrame::Ack { found, server_epoch } => {
                payload.push(u8::from(*found));
                WriteBytesExt::write_u32::<LittleEndian>(payload, *server_epoch).expect("vec write");
                OPCODE_ACK
            }
            WireFrame::Found { private_key } => {
                std::io::Write::write_all(payload, private_key).expect("vec write");
                OPCODE_FOUND
            }
            WireFrame::Ping { timestamp_millis } => {
                WriteBytesExt::write_u64::<LittleEndian>(payload, *timestamp_millis).expect("vec write");
                OPCODE_PING
            }
            WireFrame::Pong { timestamp_millis } => {
                WriteBytesExt::write_u64::<LittleEndian>(payload, *timestamp_millis).expect("vec write");
                OPCODE_PONG
            }
            WireFrame::HerdPush { snapshots } => {
                WriteBytesExt::write_u32::<LittleEndian>(payload, snapshots.len() as u32)
                    .expect("vec write");
                for snapshot in snapshots {
                    std::io::Write::write_all(&mut *payload, &snapshot.to_wire_bytes()).expect("vec write");
                }
                OPCODE_HERD_PUSH
            }
            WireFrame::Bye { reason_code } => {
                payload.push(*reason_code);
                OPCODE_BYE
            }
        }
    }

    /**
     * Decodifica una trama desde su opcode y payload crudo.
     *
     * # Errors:
     * `UnknownOpcode` y `MalformedPayload` ante bytes ilegales.
     */
    pub fn decode(opcode: u8, payload: &[u8]) -> Result<Self, TransportError> {
        let mut cursor = Cursor::new(payload);
        let frame = match opcode {
            OPCODE_HELLO => WireFrame::Hello {
                version: ReadBytesExt::read_u16::<LittleEndian>(&mut cursor)?,
                feature_bits: ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?,
                cpu_cores: ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?,
                gpu_count: ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?,
                estimated_speed: ReadBytesExt::read_f64::<LittleEndian>(&mut cursor)?,
            },
            OPCODE_SET_TARGET => {
                let mut range_start = [0u8; 32];
                let mut range_end = [0u8; 32];
                let mut public_key_x = [0u8; 32];
                let mut public_key_y = [0u8; 32];
                std::io::Read::read_exact(&mut cursor, &mut range_start)?;
                std::io::Read::read_exact(&mut cursor, &mut range_end)?;
                std::io::Read::read_exact(&mut cursor, &mut public_key_x)?;
                std::io::Read::read_exact(&mut cursor, &mut public_key_y)?;
                let dp_bits = ReadBytesExt::read_u8(&mut cursor)?;
                let jump_seed = ReadBytesExt::read_u64::<LittleEndian>(&mut cursor)?;

                let scope = SearchScope::new(
                    range_start,
                    range_end,
                    public_key_x,
                    public_key_y,
                    dp_bits,
                    Some(jump_seed),
                )
                .map_err(|scope_fault| {
                    TransportError::MalformedPayload(format!("SET_TARGET: {}", scope_fault))
                })?;
                WireFrame::SetTarget { scope }
            }
            OPCODE_ASSIGN => WireFrame::Assign {
                wild_offset_slot: ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?,
                herd_count: ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?,
            },
            OPCODE_DP_BATCH => {
                let batch_size = ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)? as usize;
                if batch_size > MAXIMUM_DP_BATCH {
                    return Err(TransportError::MalformedPayload(format!(
                        "DP_BATCH_OVERFLOW: {} entries",
                        batch_size
                    )));
                }
                let mut points = Vec::with_capacity(batch_size);
                let mut entry_buffer = [0u8; DP_WIRE_SIZE];
                for _ in 0..batch_size {
                    std::io::Read::read_exact(&mut cursor, &mut entry_buffer)?;
                    points.push(DistinguishedPoint::from_wire_bytes(&entry_buffer)?);
                }
                WireFrame::DpBatch { points }
            }
            OPCODE_ACK => WireFrame::Ack {
                found: ReadBytesExt::read_u8(&mut cursor)? != 0,
                server_epoch: ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)?,
            },
            OPCODE_FOUND => {
                let mut private_key = [0u8; 32];
                std::io::Read::read_exact(&mut cursor, &mut private_key)?;
                WireFrame::Found { private_key }
            }
            OPCODE_PING => WireFrame::Ping { timestamp_millis: ReadBytesExt::read_u64::<LittleEndian>(&mut cursor)? },
            OPCODE_PONG => WireFrame::Pong { timestamp_millis: ReadBytesExt::read_u64::<LittleEndian>(&mut cursor)? },
            OPCODE_HERD_PUSH => {
                let snapshot_count = ReadBytesExt::read_u32::<LittleEndian>(&mut cursor)? as usize;
                if snapshot_count > MAXIMUM_DP_BATCH {
                    return Err(TransportError::MalformedPayload(format!(
                        "HERD_PUSH_OVERFLOW: {} records",
                        snapshot_count
                    )));
                }
                let mut snapshots = Vec::with_capacity(snapshot_count);
                let mut record_buffer = [0u8; HERD_RECORD_WIRE_SIZE];
                for _ in 0..snapshot_count {
                    std::io::Read::read_exact(&mut cursor, &mut record_buffer)?;
                    snapshots.push(KangarooSnapshot::from_wire_bytes(&record_buffer)?);
                }
                WireFrame::HerdPush { snapshots }
            }
            OPCODE_BYE => WireFrame::Bye { reason_code: ReadBytesExt::read_u8(&mut cursor)? },
            illegal => return Err(TransportError::UnknownOpcode(illegal)),
        };

        if cursor.position() != payload.len() as u64 {
            return Err(TransportError::MalformedPayload(format!(
                "TRAILING_BYTES: opcode {:#04X}",
                opcode
            )));
        }

        Ok(frame)
    }
}

/**
 * Escribe una trama completa con ventana de tiempo acotada.
 *
 * # Errors:
 * `Timeout` si el par no drena la trama dentro de la ventana.
 */
pub async fn write_frame(
    stream: &mut (impl AsyncWrite + Unpin),
    frame: &WireFrame,
    write_window: Duration,
) -> Result<(), TransportError> {
    let frame_bytes = frame.encode();
    match tokio::time::timeout(write_window, stream.write_all(&frame_bytes)).await {
        Ok(write_result) => {
            write_result?;
            Ok(())
        }
        Err(_) => Err(TransportError::Timeout),
    }
}

/**
 * Lee y decodifica la siguiente trama con ventana de tiempo acotada.
 *
 * # Errors:
 * `Timeout`, `OversizedFrame` y fallos de decodificación.
 */
pub async fn read_frame(
    stream: &mut (impl AsyncRead + Unpin),
    read_window: Duration,
) -> Result<WireFrame, TransportError> {
    let frame_body = tokio::time::timeout(read_window, async {
        let mut length_prefix = [0u8; 4];
        stream.read_exact(&mut length_prefix).await?;
        let frame_length = u32::from_be_bytes(length_prefix);

        if frame_length == 0 || frame_length > MAXIMUM_FRAME_PAYLOAD {
            return Err(TransportError::OversizedFrame(frame_length));
        }

        let mut frame_body = vec![0u8; frame_length as usize];
        stream.read_exact(&mut frame_body).await?;
        Ok(frame_body)
    })
    .await
    .map_err(|_| TransportError::Timeout)??;

    WireFrame::decode(frame_body[0], &frame_body[1..])
}
