use crate::error::{SidecutError, SidecutResult};
use crate::side::Side;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use swc_core::ecma::parser::{EsSyntax, Syntax, TsSyntax};

/// Syntax dialect the engine parses candidate files with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "ts")]
    TypeScript,
    #[serde(rename = "js")]
    Ecmascript,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::TypeScript
    }
}

impl Dialect {
    /// Source file extension probed for during module resolution.
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::TypeScript => "ts",
            Dialect::Ecmascript => "js",
        }
    }

    pub(crate) fn syntax(self) -> Syntax {
        match self {
            Dialect::TypeScript => Syntax::Typescript(TsSyntax {
                decorators: true,
                ..Default::default()
            }),
            Dialect::Ecmascript => Syntax::Es(EsSyntax {
                decorators: true,
                ..Default::default()
            }),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Ok(Dialect::TypeScript),
            "js" | "ecmascript" => Ok(Dialect::Ecmascript),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}

/// Caller-supplied engine configuration.
///
/// There is no environment discovery here: the host decides which side it is
/// building for and hands that in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Side the current build targets.
    #[serde(default)]
    pub side: Side,

    /// Parser dialect for candidate files.
    #[serde(default)]
    pub dialect: Dialect,
}

impl EngineConfig {
    pub fn new(side: Side, dialect: Dialect) -> Self {
        Self { side, dialect }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> SidecutResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SidecutError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_client_typescript() {
        let config = EngineConfig::default();
        assert_eq!(config.side, Side::Client);
        assert_eq!(config.dialect, Dialect::TypeScript);
    }

    #[test]
    fn loads_from_json() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("sidecut.json");
        fs::write(&path, r#"{"side": "server", "dialect": "ts"}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.side, Side::Server);
    }
}
