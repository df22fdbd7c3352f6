//! Shared constants for mock discovery and rule file resolution.

/// URL prefix under which every discovered mock route is mounted.
pub const MOCK_URL_PREFIX: &str = "/mock";

/// URL prefix reserved for the admin API.
pub const ADMIN_URL_PREFIX: &str = "/api";

/// Directory-name marker flagging a method directory (`@get`, `@post`, ...).
pub const METHOD_DIR_MARKER: char = '@';

/// File-name prefix shared by every rule file in a mock directory.
pub const PARSER_FILE_PREFIX: &str = "parser-";

/// Rule file used when a mock has no stored override.
pub const DEFAULT_PARSER_FILE: &str = "parser-default.yml";

/// Script rule file that outranks every other candidate when present.
pub const DEFAULT_SCRIPT_PARSER_FILE: &str = "parser-default.rhai";

/// Recognized rule-file extensions.
pub const SCRIPT_PARSER_EXTENSION: &str = "rhai";
pub const YAML_PARSER_EXTENSION: &str = "yml";

/// Default file locations, relative to the working directory.
pub const DEFAULT_MOCK_ROOT: &str = "./mock";
pub const DEFAULT_SERVER_SETTINGS_PATH: &str = "./server.yml";
pub const DEFAULT_USER_SETTINGS_PATH: &str = "./user.yml";

/// Maximum number of entries retained in the in-memory access log.
pub const ACCESS_LOG_CAPACITY: usize = 50;
