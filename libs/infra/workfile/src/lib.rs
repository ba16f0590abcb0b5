// [libs/infra/workfile/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WORK FILE MASTER HUB (V22.0 - LAMBDA PERSISTENCE)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA RESUMIBLE Y SHARDEABLE DEL ENJAMBRE
 *
 * # Mathematical Proof (Bit-Perfect Resume):
 * El formato canónico (cubetas ordenadas + doble CRC32 + commit por
 * rename) garantiza que guardar, cargar y volver a guardar produce el
 * mismo archivo byte a byte, condición que hace conmutativo el álgebra
 * de merges entre campañas heterogéneas.
 * =================================================================
 */

/// Guardado atómico y carga certificada.
pub mod codec;
/// Catálogo de fallos de persistencia.
pub mod errors;
/// Cabecera binaria canónica.
pub mod header;
/// Reporte de cabecera, estadísticas y auditoría de integridad.
pub mod inspect;
/// Álgebra de merge conmutativa.
pub mod merge;
/// Directorio particionado de 256 shards y protocolo de división.
pub mod partition;

pub use codec::{load_work_file, save_work_file, LoadedWork};
pub use errors::WorkFileError;
pub use header::{WorkFileHeader, WorkFileKind, HEADER_SIZE, WORK_FILE_MAGIC, WORK_FILE_VERSION};
pub use inspect::{check_work_file, inspect_work_file, CheckReport, WorkFileSummary};
pub use merge::{merge_directory, merge_work_files, MergeOutcome};
pub use partition::{
    create_empty_partitioned, partition_member_path, split_into_partition, PARTITION_SHARD_COUNT,
};
