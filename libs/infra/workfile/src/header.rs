// [libs/infra/workfile/src/header.rs]
/*!
 * =================================================================
 * APARATO: WORK FILE HEADER CODEC (V12.0 - CRC SEALED)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: CABECERA BINARIA CANÓNICA DEL WORK FILE
 *
 * # Layout (Little-Endian, 176 bytes):
 * magic u32 | version u16 | kind u8 | flags u8 | dp u8 | reserved [3]
 * kmin [32] | kmax [32] | px [32] | py [32] | jump_seed u64
 * bucket_count u32 | entry_count u64 | herd_count u32 | elapsed u64
 * header_crc32 u32 (sobre todos los bytes precedentes de la cabecera)
 * =================================================================
 */

use crate::errors::WorkFileError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kangaroo_domain_models::scope::SearchScope;
use std::io::{Cursor, Read, Write};

/// Marca mágica del formato ("KANG" en Little-Endian).
pub const WORK_FILE_MAGIC: u32 = 0x4B41_4E47;
/// Versión vigente del formato.
pub const WORK_FILE_VERSION: u16 = 2;
/// Longitud total de la cabecera serializada.
pub const HEADER_SIZE: usize = 176;

/// Bit de bandera: el archivo transporta instantánea de manada.
pub const FLAG_HAS_HERD_SNAPSHOT: u8 = 0b0000_0001;
/// Bit de bandera: el archivo es miembro de un directorio particionado.
pub const FLAG_PARTITIONED: u8 = 0b0000_0010;

/// Clasificación del origen de un work file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkFileKind {
    /// Campaña local autónoma.
    Solo,
    /// Respaldo local de un cliente de enjambre.
    Client,
    /// Tabla monolítica de un servidor.
    ServerMonolithic,
    /// Miembro de un directorio particionado de servidor.
    ServerPartitionMember,
}

impl WorkFileKind {
    /// Proyección al byte de formato.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            WorkFileKind::Solo => 0,
            WorkFileKind::Client => 1,
            WorkFileKind::ServerMonolithic => 2,
            WorkFileKind::ServerPartitionMember => 3,
        }
    }

    /**
     * Reconstrucción desde el byte de formato.
     *
     * # Errors:
     * `UnsupportedShape` ante clasificaciones desconocidas.
     */
    pub fn from_byte(kind_byte: u8) -> Result<Self, WorkFileError> {
        match kind_byte {
            0 => Ok(WorkFileKind::Solo),
            1 => Ok(WorkFileKind::Client),
            2 => Ok(WorkFileKind::ServerMonolithic),
            3 => Ok(WorkFileKind::ServerPartitionMember),
            illegal => Err(WorkFileError::UnsupportedShape(format!(
                "UNKNOWN_KIND_BYTE: {}",
                illegal
            ))),
        }
    }
}

/// Cabecera decodificada de un work file.
#[derive(Debug, Clone)]
pub struct WorkFileHeader {
    /// Clasificación del origen.
    pub kind: WorkFileKind,
    /// Banderas de formato (manada, particionado).
    pub flags: u8,
    /// Bits de Punto Distinguido del objetivo.
    pub dp_bits: u8,
    /// Cota inferior del rango (Big-Endian).
    pub range_start: [u8; 32],
    /// Cota superior del rango (Big-Endian).
    pub range_end: [u8; 32],
    /// Coordenada X del objetivo.
    pub public_key_x: [u8; 32],
    /// Coordenada Y del objetivo.
    pub public_key_y: [u8; 32],
    /// Semilla determinista de la tabla de saltos.
    pub jump_seed: u64,
    /// Cantidad de cubetas de la tabla (2^h).
    pub bucket_count: u32,
    /// Volumen total de huellas registradas.
    pub entry_count: u64,
    /// Canguros serializados en la instantánea (0 si no hay).
    pub herd_count: u32,
    /// Segundos de cómputo acumulados.
    pub elapsed_seconds: u64,
}

impl WorkFileHeader {
    /// Evalúa si el archivo transporta instantánea de manada.
    #[must_use]
    pub fn has_herd_snapshot(&self) -> bool {
        self.flags & FLAG_HAS_HERD_SNAPSHOT != 0
    }

    /// Evalúa si el archivo es miembro de una partición.
    #[must_use]
    pub fn is_partition_member(&self) -> bool {
        self.flags & FLAG_PARTITIONED != 0
    }

    /**
     * Evalúa si el objetivo está sin estampar (partición vacía recién
     * creada): todos los campos de identidad en cero.
     */
    #[must_use]
    pub fn is_scope_unbound(&self) -> bool {
        self.range_start.iter().all(|&byte| byte == 0)
            && self.range_end.iter().all(|&byte| byte == 0)
            && self.public_key_x.iter().all(|&byte| byte == 0)
            && self.public_key_y.iter().all(|&byte| byte == 0)
    }

    /**
     * Reconstruye el SearchScope transportado.
     *
     * # Errors:
     * Propaga violaciones de scope (rango colapsado, punto fuera de curva).
     */
    pub fn to_scope(&self) -> Result<SearchScope, WorkFileError> {
        Ok(SearchScope::new(
            self.range_start,
            self.range_end,
            self.public_key_x,
            self.public_key_y,
            self.dp_bits,
            Some(self.jump_seed),
        )?)
    }

    /// Identidad de compatibilidad de merge: (P, kmin, kmax, dp, jump_seed).
    #[must_use]
    pub fn is_merge_compatible(&self, other: &Self) -> bool {
        self.range_start == other.range_start
            && self.range_end == other.range_end
            && self.public_key_x == other.public_key_x
            && self.public_key_y == other.public_key_y
            && self.dp_bits == other.dp_bits
            && self.jump_seed == other.jump_seed
            && self.bucket_count == other.bucket_count
    }

    /**
     * Serializa la cabecera completa (CRC incluido) al buffer destino.
     *
     * # Errors:
     * Propaga fallos de E/S del destino.
     */
    pub fn encode_into(&self, destination: &mut impl Write) -> Result<(), WorkFileError> {
        let mut header_bytes: Vec<u8> = Vec::with_capacity(HEADER_SIZE);

        header_bytes.write_u32::<LittleEndian>(WORK_FILE_MAGIC)?;
        header_bytes.write_u16::<LittleEndian>(WORK_FILE_VERSION)?;
        header_bytes.write_u8(self.kind.to_byte())?;
        header_bytes.write_u8(self.flags)?;
        header_bytes.write_u8(self.dp_bits)?;
        header_bytes.write_all(&[0u8; 3])?;
        header_bytes.write_all(&self.range_start)?;
        header_bytes.write_all(&self.range_end)?;
        header_bytes.write_all(&self.public_key_x)?;
        header_bytes.write_all(&self.public_key_y)?;
        header_bytes.write_u64::<LittleEndian>(self.jump_seed)?;
        header_bytes.write_u32::<LittleEndian>(self.bucket_count)?;
        header_bytes.write_u64::<LittleEndian>(self.entry_count)?;
        header_bytes.write_u32::<LittleEndian>(self.herd_count)?;
        header_bytes.write_u64::<LittleEndian>(self.elapsed_seconds)?;

        let header_crc = crc32fast::hash(&header_bytes);
        header_bytes.write_u32::<LittleEndian>(header_crc)?;
        debug_assert_eq!(header_bytes.len(), HEADER_SIZE);

        destination.write_all(&header_bytes)?;
        Ok(())
    }

    /**
     * Decodifica y certifica una cabecera desde el origen.
     *
     * # Errors:
     * `IntegrityViolation` ante magia, versión o CRC ilegales.
     */
    pub fn decode_from(source: &mut impl Read) -> Result<Self, WorkFileError> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        source.read_exact(&mut header_bytes)?;

        let stored_crc = u32::from_le_bytes(
            header_bytes[HEADER_SIZE - 4..]
                .try_into()
                .expect("fixed slice width"),
        );
        let computed_crc = crc32fast::hash(&header_bytes[..HEADER_SIZE - 4]);
        if stored_crc != computed_crc {
            return Err(WorkFileError::IntegrityViolation(format!(
                "HEADER_CRC_MISMATCH: stored {:08X}, computed {:08X}",
                stored_crc, computed_crc
            )));
        }

        let mut cursor = Cursor::new(&header_bytes[..]);
        let magic = cursor.read_u32::<LittleEndian>()?;
        if magic != WORK_FILE_MAGIC {
            return Err(WorkFileError::IntegrityViolation(format!(
                "BAD_MAGIC: {:08X}",
                magic
            )));
        }
        let version = cursor.read_u16::<LittleEndian>()?;
        if version != WORK_FILE_VERSION {
            return Err(WorkFileError::UnsupportedShape(format!(
                "UNSUPPORTED_VERSION: {}",
                version
            )));
        }

        let kind = WorkFileKind::from_byte(cursor.read_u8()?)?;
        let flags = cursor.read_u8()?;
        let dp_bits = cursor.read_u8()?;
        let mut reserved = [0u8; 3];
        cursor.read_exact(&mut reserved)?;

        let mut range_start = [0u8; 32];
        let mut range_end = [0u8; 32];
        let mut public_key_x = [0u8; 32];
        let mut public_key_y = [0u8; 32];
        cursor.read_exact(&mut range_start)?;
        cursor.read_exact(&mut range_end)?;
        cursor.read_exact(&mut public_key_x)?;
        cursor.read_exact(&mut public_key_y)?;

        let jump_seed = cursor.read_u64::<LittleEndian>()?;
        let bucket_count = cursor.read_u32::<LittleEndian>()?;
        let entry_count = cursor.read_u64::<LittleEndian>()?;
        let herd_count = cursor.read_u32::<LittleEndian>()?;
        let elapsed_seconds = cursor.read_u64::<LittleEndian>()?;

        if bucket_count == 0 || !bucket_count.is_power_of_two() {
            return Err(WorkFileError::UnsupportedShape(format!(
                "BUCKET_COUNT_NOT_POWER_OF_TWO: {}",
                bucket_count
            )));
        }

        Ok(Self {
            kind,
            flags,
            dp_bits,
            range_start,
            range_end,
            public_key_x,
            public_key_y,
            jump_seed,
            bucket_count,
            entry_count,
            herd_count,
            elapsed_seconds,
        })
    }
}
