/// Separator between namespace segments of a class reference
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Default vendor prefix that precedes the provider segment in a namespace
pub const DEFAULT_VENDOR_PREFIX: &str = "app";

/// Name of the root attribute type every plugin attribute extends
pub const PLUGIN_ATTRIBUTE: &str = "PluginAttribute";

/// Prefix of every per-attribute-type file cache bucket
pub const FILE_CACHE_BUCKET_PREFIX: &str = "attribute_discovery";

/// Definition key holding the plugin identifier
pub const KEY_ID: &str = "id";

/// Definition key holding the implementation class reference
pub const KEY_CLASS: &str = "class";

/// Definition key holding the owning module name
pub const KEY_PROVIDER: &str = "provider";

/// Definition key holding the human-readable label
pub const KEY_LABEL: &str = "label";

/// Definition key naming the deriver that expands a base definition
pub const KEY_DERIVER: &str = "deriver";

/// Separator between base plugin id and derivative key
pub const DERIVATIVE_SEPARATOR: char = ':';

/// Default on-disk cache file name
pub const DEFAULT_CACHE_FILE: &str = ".plumb-cache.json";
