pub mod boot;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod paths;
pub mod policy;
pub mod registry;
pub mod report;
pub mod scripts;

pub use boot::{preload, BootOptions, Environment};
pub use error::{ConfigError, LoadError};
pub use loader::SourceLoader;
pub use manifest::Manifest;
pub use paths::{ResolvedRoot, Root, RootKind, RootResolver};
pub use policy::{CompiledPolicy, Exclusion, ExclusionPolicy, TraversalOrder};
pub use registry::LoadedRegistry;
pub use report::{load_set_digest, BootPhase, LoadReport};
pub use scripts::{LoadMode, ScriptEngine};
