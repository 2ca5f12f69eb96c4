// ============================================================================
// CONFIGURATION
// ============================================================================

/// Descriptor location used when no path is given on the command line
pub const DEFAULT_DESCRIPTOR_PATH: &str = "META-INF/persistence.xml";

/// Persistence-unit property naming the JSON dataset
pub const PROPERTY_DATASET: &str = "xml-dump.dataset";

/// Persistence-unit property naming the output file
pub const PROPERTY_OUTPUT: &str = "xml-dump.output";

/// Environment variable holding the log level
pub const ENV_LOG_LEVEL: &str = "XML_DUMP_LOG";

// ============================================================================
// ACCESSOR NAMING
// ============================================================================

/// Prefix that marks an accessor as a getter
pub const GETTER_PREFIX: &str = "get";

// ============================================================================
// TYPE NAME CONSTANTS
// ============================================================================

pub const TYPE_STRING: &str = "java.lang.String";
pub const TYPE_LONG: &str = "java.lang.Long";
pub const TYPE_DOUBLE: &str = "java.lang.Double";
pub const TYPE_BOOLEAN: &str = "java.lang.Boolean";
pub const TYPE_ARRAY_LIST: &str = "java.util.ArrayList";

// ============================================================================
// DATASET KEYS
// ============================================================================

pub const KEY_TYPE: &str = "$type";
pub const KEY_VALUE: &str = "$value";
pub const KEY_ITEMS: &str = "$items";

// ============================================================================
// XML OUTPUT
// ============================================================================

pub const ELEMENT_LIST: &str = "list";
pub const ELEMENT_NULL: &str = "null";
pub const ATTRIBUTE_CLASS: &str = "class";
pub const XML_INDENT: usize = 2;

// ============================================================================
// EXIT CODES
// ============================================================================

pub const EXIT_CONFIGURATION_ERROR: u8 = 1;
pub const EXIT_MARSHAL_ERROR: u8 = 2;
