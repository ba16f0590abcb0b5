// [libs/infra/workfile/src/codec.rs]
/*!
 * =================================================================
 * APARATO: WORK FILE BINARY CODEC (V21.0 - ATOMIC SEALED)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: GUARDADO ATÓMICO Y CARGA CERTIFICADA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ATOMIC COMMIT: El archivo se cristaliza en un temporal del mismo
 *    directorio y se publica con rename; un colapso del host jamás deja
 *    un work file a medias visible.
 * 2. DUAL CRC: La cabecera y el archivo completo transportan CRC32
 *    independientes; la carga rechaza cualquier byte corrupto.
 * 3. CANONICAL BUCKETS: Las cubetas se serializan ordenadas por huella;
 *    el formato es la forma canónica que hace los merges conmutativos.
 * =================================================================
 */

use crate::errors::WorkFileError;
use crate::header::{
    WorkFileHeader, WorkFileKind, FLAG_HAS_HERD_SNAPSHOT, FLAG_PARTITIONED, HEADER_SIZE,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kangaroo_core_trapstore::{TrapEntry, TrapTable};
use kangaroo_domain_models::dp::HerdKind;
use kangaroo_domain_models::herd::{decode_signed_256_be, encode_signed_256_be, KangarooSnapshot};
use kangaroo_domain_models::scope::SearchScope;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Longitud de una entrada serializada (x_hi 16 B + dist_tag 16 B).
pub const ENTRY_WIRE_SIZE: usize = 32;

/// Escritor con CRC32 incremental sobre todo byte emitido.
struct CrcCountingWriter<Destination: Write> {
    inner: Destination,
    hasher: crc32fast::Hasher,
}

impl<Destination: Write> CrcCountingWriter<Destination> {
    fn new(inner: Destination) -> Self {
        Self { inner, hasher: crc32fast::Hasher::new() }
    }

    fn finalize_crc(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

impl<Destination: Write> Write for CrcCountingWriter<Destination> {
    fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize> {
        self.hasher.update(buffer);
        self.inner.write_all(buffer)?;
        Ok(buffer.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Resultado de la carga certificada de un work file.
pub struct LoadedWork {
    /// Cabecera decodificada.
    pub header: WorkFileHeader,
    /// Tabla de trampas reconstruida.
    pub table: TrapTable,
    /// Instantánea de manada (vacía si el archivo no la transporta).
    pub herd: Vec<KangarooSnapshot>,
}

/**
 * Serializa una campaña completa de forma atómica (temporal + rename).
 *
 * Las cubetas se toman bajo sus cerrojos; el llamador garantiza la
 * consistencia manada/tabla mediante la barrera de guardado.
 *
 * # Errors:
 * Propaga fallos de E/S del sistema de archivos.
 */
#[instrument(skip_all, fields(destination = %destination_path.display()))]
pub fn save_work_file(
    destination_path: &Path,
    kind: WorkFileKind,
    scope: &SearchScope,
    table: &TrapTable,
    herd_snapshots: &[KangarooSnapshot],
    elapsed_seconds: u64,
    partitioned: bool,
) -> Result<(), WorkFileError> {
    // 1. INSTANTÁNEA CANÓNICA DE CUBETAS
    let bucket_count = table.bucket_count();
    let mut bucket_snapshots: Vec<Vec<TrapEntry>> = Vec::with_capacity(bucket_count);
    let mut total_entries: u64 = 0;
    for bucket_index in 0..bucket_count {
        let snapshot = table.snapshot_bucket(bucket_index);
        total_entries += snapshot.len() as u64;
        bucket_snapshots.push(snapshot);
    }

    let mut flags = 0u8;
    if !herd_snapshots.is_empty() {
        flags |= FLAG_HAS_HERD_SNAPSHOT;
    }
    if partitioned {
        flags |= FLAG_PARTITIONED;
    }

    let header = WorkFileHeader {
        kind,
        flags,
        dp_bits: scope.dp_bits,
        range_start: scope.range_start,
        range_end: scope.range_end,
        public_key_x: scope.public_key_x,
        public_key_y: scope.public_key_y,
        jump_seed: scope.jump_seed,
        bucket_count: bucket_count as u32,
        entry_count: total_entries,
        herd_count: herd_snapshots.len() as u32,
        elapsed_seconds,
    };

    write_file(destination_path, &header, &bucket_snapshots, herd_snapshots)?;

    debug!(
        "💾 [WORK_FILE]: {} entries + {} kangaroos sealed at {}.",
        total_entries,
        herd_snapshots.len(),
        destination_path.display()
    );

    Ok(())
}

/**
 * Trayectoria cruda de escritura: cristaliza cabecera + cubetas + manada
 * de forma atómica. Compartida por el guardado regular y el particionador.
 *
 * # Errors:
 * Propaga fallos de E/S del sistema de archivos.
 */
pub fn write_file(
    destination_path: &Path,
    header: &WorkFileHeader,
    bucket_snapshots: &[Vec<TrapEntry>],
    herd_snapshots: &[KangarooSnapshot],
) -> Result<(), WorkFileError> {
    debug_assert_eq!(bucket_snapshots.len(), header.bucket_count as usize);

    let temporary_path = destination_path.with_extension("kng.tmp");
    {
        let temporary_file = File::create(&temporary_path)?;
        let mut sealed_writer = CrcCountingWriter::new(BufWriter::new(temporary_file));

        header.encode_into(&mut sealed_writer)?;

        // Índice de cubetas: offsets absolutos de cada bloque
        let mut running_offset = (HEADER_SIZE + bucket_snapshots.len() * 8) as u64;
        for snapshot in bucket_snapshots {
            sealed_writer.write_u64::<LittleEndian>(running_offset)?;
            running_offset += 4 + (snapshot.len() * ENTRY_WIRE_SIZE) as u64;
        }

        // Bloques de cubeta: conteo + entradas ordenadas por huella
        for snapshot in bucket_snapshots {
            sealed_writer.write_u32::<LittleEndian>(snapshot.len() as u32)?;
            for entry in snapshot {
                sealed_writer.write_all(&entry.x_fingerprint.to_be_bytes())?;
                sealed_writer.write_all(&entry.packed_distance.to_le_bytes())?;
            }
        }

        // Instantánea de manada (129 bytes por canguro)
        for snapshot in herd_snapshots {
            sealed_writer.write_all(&snapshot.position_x)?;
            sealed_writer.write_all(&snapshot.position_y)?;
            sealed_writer.write_all(&encode_signed_256_be(snapshot.distance))?;
            sealed_writer.write_u8(snapshot.kind.to_tag_bits())?;
            sealed_writer.write_all(&encode_signed_256_be(snapshot.wild_offset))?;
        }

        // Sello de integridad del archivo completo
        let file_crc = sealed_writer.finalize_crc();
        sealed_writer.inner.write_all(&file_crc.to_le_bytes())?;
        sealed_writer.inner.flush()?;
    }

    fs::rename(&temporary_path, destination_path)?;
    Ok(())
}

/**
 * Carga y certifica un work file completo.
 *
 * # Errors:
 * `IntegrityViolation` ante CRC, forma o contenido ilegales; la carga
 * se rehúsa ante cualquier byte corrupto.
 */
#[instrument(skip_all, fields(source = %source_path.display()))]
pub fn load_work_file(source_path: &Path) -> Result<LoadedWork, WorkFileError> {
    let file_bytes = fs::read(source_path)?;
    if file_bytes.len() < HEADER_SIZE + 4 {
        return Err(WorkFileError::IntegrityViolation(format!(
            "FILE_TRUNCATED: {} bytes",
            file_bytes.len()
        )));
    }

    // 1. SELLO GLOBAL
    let payload_length = file_bytes.len() - 4;
    let stored_file_crc = u32::from_le_bytes(
        file_bytes[payload_length..]
            .try_into()
            .expect("fixed slice width"),
    );
    let computed_file_crc = crc32fast::hash(&file_bytes[..payload_length]);
    if stored_file_crc != computed_file_crc {
        return Err(WorkFileError::IntegrityViolation(format!(
            "FILE_CRC_MISMATCH: stored {:08X}, computed {:08X}",
            stored_file_crc, computed_file_crc
        )));
    }

    // 2. CABECERA
    let mut cursor = Cursor::new(&file_bytes[..payload_length]);
    let header = WorkFileHeader::decode_from(&mut cursor)?;
    let bucket_count = header.bucket_count as usize;
    let bucket_bits = header.bucket_count.trailing_zeros();

    // 3. ÍNDICE Y CUBETAS
    let mut bucket_offsets = Vec::with_capacity(bucket_count);
    for _ in 0..bucket_count {
        bucket_offsets.push(cursor.read_u64::<LittleEndian>()?);
    }

    let table = TrapTable::with_bucket_bits(bucket_bits);
    let mut observed_entries: u64 = 0;

    for (bucket_index, &bucket_offset) in bucket_offsets.iter().enumerate() {
        if cursor.position() != bucket_offset {
            return Err(WorkFileError::IntegrityViolation(format!(
                "BUCKET_OFFSET_DRIFT: bucket {} expected {}, cursor {}",
                bucket_index,
                bucket_offset,
                cursor.position()
            )));
        }

        let entry_count = cursor.read_u32::<LittleEndian>()? as usize;
        let mut entries = Vec::with_capacity(entry_count);
        let mut previous_fingerprint: Option<u128> = None;

        for _ in 0..entry_count {
            let mut fingerprint_bytes = [0u8; 16];
            let mut packed_bytes = [0u8; 16];
            std::io::Read::read_exact(&mut cursor, &mut fingerprint_bytes)?;
            std::io::Read::read_exact(&mut cursor, &mut packed_bytes)?;

            let entry = TrapEntry {
                x_fingerprint: u128::from_be_bytes(fingerprint_bytes),
                packed_distance: u128::from_le_bytes(packed_bytes),
            };

            // Certificación de etiqueta y de orden canónico
            HerdKind::from_tag_bits(entry.tag_bits())?;
            if let Some(previous) = previous_fingerprint {
                if previous >= entry.x_fingerprint {
                    return Err(WorkFileError::IntegrityViolation(format!(
                        "BUCKET_ORDER_VIOLATION: bucket {} not canonically sorted",
                        bucket_index
                    )));
                }
            }
            previous_fingerprint = Some(entry.x_fingerprint);
            entries.push(entry);
        }

        observed_entries += entries.len() as u64;
        table.replace_bucket(bucket_index, entries);
    }

    if observed_entries != header.entry_count {
        return Err(WorkFileError::IntegrityViolation(format!(
            "ENTRY_COUNT_MISMATCH: header {}, observed {}",
            header.entry_count, observed_entries
        )));
    }

    // 4. INSTANTÁNEA DE MANADA
    let mut herd = Vec::with_capacity(header.herd_count as usize);
    if header.has_herd_snapshot() {
        for _ in 0..header.herd_count {
            let mut position_x = [0u8; 32];
            let mut position_y = [0u8; 32];
            let mut distance_bytes = [0u8; 32];
            let mut offset_bytes = [0u8; 32];

            std::io::Read::read_exact(&mut cursor, &mut position_x)?;
            std::io::Read::read_exact(&mut cursor, &mut position_y)?;
            std::io::Read::read_exact(&mut cursor, &mut distance_bytes)?;
            let tag_byte = cursor.read_u8()?;
            std::io::Read::read_exact(&mut cursor, &mut offset_bytes)?;

            herd.push(KangarooSnapshot {
                position_x,
                position_y,
                distance: decode_signed_256_be(&distance_bytes)?,
                kind: HerdKind::from_tag_bits(tag_byte)?,
                wild_offset: decode_signed_256_be(&offset_bytes)?,
            });
        }
    }

    if cursor.position() != payload_length as u64 {
        return Err(WorkFileError::IntegrityViolation(format!(
            "TRAILING_GARBAGE: {} unread bytes before trailer",
            payload_length as u64 - cursor.position()
        )));
    }

    info!(
        "🌊 [WORK_FILE]: {} entries + {} kangaroos hydrated from {}.",
        observed_entries,
        herd.len(),
        source_path.display()
    );

    Ok(LoadedWork { header, table, herd })
}
