/// Error code registry for shardctl
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Connection errors
/// - 3000-3999: Parse errors
/// - 4000-4999: Execution errors
/// - 5000-5999: Cluster command failures
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_INVALID_TOML: u16 = 1003;
    pub const CONFIG_INVALID_VALUE: u16 = 1004;
    pub const CONFIG_UNSUPPORTED_FORMAT: u16 = 1005;

    // Connection errors (2000-2999)
    pub const CONNECTION_GENERIC: u16 = 2000;
    pub const CONNECTION_NOT_READY: u16 = 2001;
    pub const CONNECTION_RETRIES_EXHAUSTED: u16 = 2002;

    // Parse errors (3000-3999)
    pub const PARSE_GENERIC: u16 = 3000;
    pub const PARSE_INVALID_JSON: u16 = 3001;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_TIMEOUT: u16 = 4002;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
    pub const EXEC_SIGNAL_RECEIVED: u16 = 4004;
    pub const EXEC_SPAWN_FAILED: u16 = 4005;

    // Cluster command failures (5000-5999)
    pub const COMMAND_NOT_OK: u16 = 5001;
    pub const COMMAND_MISSING_STATUS: u16 = 5002;
}
