//!
//! preheat script engine
//! ---------------------
//! The load action: bringing one Lua source file into a process-resident
//! VM. The walk and filter machinery hands fully resolved paths here; this
//! module is the only place that touches `mlua`.
//!
//! `Execute` runs each chunk so its definitions land in the VM (the warm
//! preload image). `CompileOnly` compiles without running, which is enough
//! to surface syntax errors during static checks while leaving the VM
//! untouched.

use mlua::Lua;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    #[default]
    Execute,
    CompileOnly,
}

pub struct ScriptEngine {
    lua: Lua,
    mode: LoadMode,
}

impl ScriptEngine {
    pub fn new(mode: LoadMode) -> Self {
        Self { lua: Lua::new(), mode }
    }

    /// Wrap an existing VM so an embedder gets its own state back warmed.
    pub fn with_lua(lua: Lua, mode: LoadMode) -> Self {
        Self { lua, mode }
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// The wrapped VM, for callers that keep using it after preloading.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn into_lua(self) -> Lua {
        self.lua
    }

    /// Load one file according to the engine mode. The chunk is named with
    /// the file path so Lua error messages point at the real file.
    pub fn load_file(&self, path: &Path) -> Result<(), LoadError> {
        let code =
            fs::read_to_string(path).map_err(|e| LoadError::new(path, e.to_string()))?;
        let chunk = self.lua.load(code.as_str()).set_name(path.display().to_string());
        let result = match self.mode {
            LoadMode::Execute => chunk.exec(),
            LoadMode::CompileOnly => chunk.into_function().map(|_| ()),
        };
        match result {
            Ok(()) => {
                debug!(target: "preheat::scripts", "loaded '{}' ({:?})", path.display(), self.mode);
                Ok(())
            }
            Err(e) => Err(LoadError::new(path, e.to_string())),
        }
    }
}
