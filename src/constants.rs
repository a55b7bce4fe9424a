//! Recognized identifier names and fixed defaults.
//!
//! These are the call and decorator names the engine matches structurally.
//! Filename conventions are a host-side pre-filter only; everything in here
//! is checked against the syntax tree itself.

/// Call whose single object-literal argument declares a module descriptor.
pub const DEFINE_MODULE: &str = "defineModule";

/// Chained call registering a loader by identifier.
pub const USE_LOADER: &str = "useLoader";

/// Base call the loader chain hangs off.
pub const USE_API: &str = "useApi";

/// Decorator carrying a side as its single qualified-name argument,
/// e.g. `@RunsOn(Side.Server)`.
pub const DECORATOR_RUNS_ON: &str = "RunsOn";

/// Decorator carrying a side inside an options object,
/// e.g. `@Provide({ side: Side.Client })`.
pub const DECORATOR_PROVIDE: &str = "Provide";

/// Key of the side entry inside a `Provide` options object.
pub const SIDE_KEY: &str = "side";

/// Descriptor fields that survive every strip.
pub const FIELD_NAME: &str = "name";
pub const FIELD_VERSION: &str = "version";
pub const FIELD_DISABLED: &str = "disabled";

/// Marker directory that makes an ancestor a package root.
pub const PACKAGE_ROOT_DIR: &str = "node_modules";

/// Manifest file consulted for the version fallback.
pub const MANIFEST_FILE: &str = "package.json";

/// Version reported when neither the descriptor nor any manifest has one.
pub const NO_VERSION_DEFAULT: &str = "0.0.0";
