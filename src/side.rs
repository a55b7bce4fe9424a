//! Side classification for declarations and builds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The single target a build invocation prunes code for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Client,
    Server,
    Both,
}

impl Default for Side {
    fn default() -> Self {
        Side::Client
    }
}

impl Side {
    /// Whether a declaration carrying `tag` may ship in a build for this side.
    pub fn accepts(self, tag: SideTag) -> bool {
        match (self, tag) {
            (_, SideTag::Both) => true,
            (Side::Server | Side::Both, SideTag::Server) => true,
            (Side::Client | Side::Both, SideTag::Client) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Client => "client",
            Side::Server => "server",
            Side::Both => "both",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Side::Client),
            "server" => Ok(Side::Server),
            "both" => Ok(Side::Both),
            other => Err(format!("unknown side: {}", other)),
        }
    }
}

/// Environment classification attached to a declaration or descriptor field.
///
/// `DeclarationDefined` means the tag cannot be read where the field lives;
/// each element must be crawled to its true declaration first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideTag {
    Client,
    Server,
    Both,
    Neither,
    DeclarationDefined,
}

impl SideTag {
    /// Parse the terminal name of a qualified side expression, lower-cased.
    pub fn parse(name: &str) -> Option<SideTag> {
        match name.to_ascii_lowercase().as_str() {
            "client" => Some(SideTag::Client),
            "server" => Some(SideTag::Server),
            "both" => Some(SideTag::Both),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_build_accepts_server_and_both() {
        assert!(Side::Server.accepts(SideTag::Server));
        assert!(Side::Server.accepts(SideTag::Both));
        assert!(!Side::Server.accepts(SideTag::Client));
        assert!(!Side::Server.accepts(SideTag::Neither));
    }

    #[test]
    fn client_build_accepts_client_and_both() {
        assert!(Side::Client.accepts(SideTag::Client));
        assert!(Side::Client.accepts(SideTag::Both));
        assert!(!Side::Client.accepts(SideTag::Server));
    }

    #[test]
    fn tag_parsing_is_case_insensitive() {
        assert_eq!(SideTag::parse("Server"), Some(SideTag::Server));
        assert_eq!(SideTag::parse("CLIENT"), Some(SideTag::Client));
        assert_eq!(SideTag::parse("nowhere"), None);
    }
}
