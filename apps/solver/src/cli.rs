// [apps/solver/src/cli.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN COMMAND SURFACE (V6.0 - CLAP DERIVE)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: SUPERFICIE DE COMANDO DEL RESOLUTOR LAMBDA
 *
 * # Exit Codes:
 * 0 = éxito (clave hallada o utilidad completada)
 * -1 = error de configuración o argumentos
 * 1 = error de E/S o integridad
 * =================================================================
 */

use clap::Parser;
use std::path::PathBuf;

/// Resolutor ECDLP secp256k1 por el método de los canguros de Pollard.
#[derive(Debug, Parser)]
#[command(
    name = "kangaroo-solver",
    version,
    about = "Pollard kangaroo ECDLP solver for secp256k1 bounded ranges"
)]
pub struct CommandSurface {
    /// Habilita los kernels aceleradores (requiere inventario de dispositivos).
    #[arg(long = "gpu")]
    pub gpu_enable: bool,

    /// Dispositivos aceleradores a utilizar (lista separada por comas).
    #[arg(long = "gpu-id", value_delimiter = ',', value_name = "ID")]
    pub gpu_identifiers: Vec<u32>,

    /// Geometría de grid por dispositivo: g1x,g1y,g2x,g2y...
    #[arg(short = 'g', long = "grid", value_delimiter = ',', value_name = "DIM")]
    pub grid_dimensions: Vec<u32>,

    /// Bits de Punto Distinguido (-1 o ausente = calibración automática).
    #[arg(short = 'd', long = "dp", value_name = "BITS", allow_negative_numbers = true)]
    pub dp_bits_override: Option<i32>,

    /// Hilos de CPU del enjambre local (defecto: núcleos del host).
    #[arg(short = 't', long = "threads", value_name = "COUNT")]
    pub cpu_threads: Option<usize>,

    /// Work file destino del guardado periódico.
    #[arg(short = 'w', long = "work-file", value_name = "FILE")]
    pub work_file: Option<PathBuf>,

    /// Work file a cargar para reanudar la campaña.
    #[arg(short = 'i', long = "input-work", value_name = "FILE")]
    pub input_work_file: Option<PathBuf>,

    /// Período del guardado automático en segundos.
    #[arg(long = "wi", value_name = "SECONDS", default_value_t = 60)]
    pub save_period_seconds: u64,

    /// Incluye la instantánea de manada en los guardados.
    #[arg(long = "ws")]
    pub save_kangaroos: bool,

    /// Envía la instantánea de manada al servidor (modo cliente).
    #[arg(long = "wss")]
    pub save_kangaroos_via_server: bool,

    /// Divide el work file del servidor y vacía la tabla en cada guardado.
    #[arg(long = "wsplit")]
    pub split_work_file: bool,

    /// Fusiona dos work files: FILE1 FILE2 DEST (el destino es obligatorio).
    #[arg(long = "wm", num_args = 3, value_names = ["FILE1", "FILE2", "DEST"])]
    pub merge_files: Vec<PathBuf>,

    /// Fusiona un directorio de work files: DIR DEST.
    #[arg(long = "wmdir", num_args = 2, value_names = ["DIR", "DEST"])]
    pub merge_directory: Vec<PathBuf>,

    /// Ventana del guardado de trabajo en milisegundos.
    #[arg(long = "wt", value_name = "MILLIS", default_value_t = 3000)]
    pub work_timeout_millis: u64,

    /// Reporta cabecera y estadísticas de un work file.
    #[arg(long = "winfo", value_name = "FILE")]
    pub info_target: Option<PathBuf>,

    /// Crea un directorio particionado vacío (256 shards).
    #[arg(long = "wpartcreate", value_name = "DIR")]
    pub partition_create: Option<PathBuf>,

    /// Audita la integridad completa de un work file.
    #[arg(long = "wcheck", value_name = "FILE")]
    pub check_target: Option<PathBuf>,

    /// Tope de búsqueda: multiplicador sobre las operaciones esperadas.
    #[arg(short = 'm', long = "max-step", value_name = "FACTOR", default_value_t = 0.0)]
    pub max_step_multiplier: f64,

    /// Inicia en modo servidor de coordinación.
    #[arg(short = 's', long = "server", conflicts_with = "client_server_address")]
    pub server_mode: bool,

    /// Inicia en modo cliente contra el servidor indicado.
    #[arg(short = 'c', long = "client", value_name = "SERVER_IP")]
    pub client_server_address: Option<String>,

    /// Puerto TCP del servidor de coordinación.
    #[arg(long = "sp", value_name = "PORT", default_value_t = 17403)]
    pub server_port: u16,

    /// Ventana de red en milisegundos.
    #[arg(long = "nt", value_name = "MILLIS", default_value_t = 3000)]
    pub network_timeout_millis: u64,

    /// Archivo de resultados.
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "found.txt")]
    pub output_file: PathBuf,

    /// Lista los dispositivos aceleradores disponibles.
    #[arg(short = 'l', long = "list-devices")]
    pub list_devices: bool,

    /// Certifica la paridad del kernel acelerador contra la CPU.
    #[arg(long = "check")]
    pub check_kernel_parity: bool,

    /// Semilla determinista del runtime (defecto: entropía del sistema).
    #[arg(long = "seed", value_name = "SEED")]
    pub runtime_seed: Option<u64>,

    /// Archivo de configuración del objetivo.
    #[arg(value_name = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}
