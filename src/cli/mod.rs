pub mod args;
pub mod commands;

pub use args::{Cli, Commands, OutputFormat};

use crate::cache::CacheSet;
use crate::error::Result;
use crate::resolve::Resolver;
use crate::session::SessionManager;

/// Everything a command can touch: the session and the caches of its
/// server/user pair
pub struct Shell {
    pub session: SessionManager,
    pub caches: CacheSet,
}

impl Shell {
    pub fn new(session: SessionManager) -> Self {
        Self {
            session,
            caches: CacheSet::new(),
        }
    }

    /// Log in with the configured defaults unless a session is already up
    pub fn ensure_login(&mut self) -> Result<()> {
        if !self.session.is_authenticated() {
            self.session.login(&mut self.caches, None, None)?;
        }
        Ok(())
    }

    /// Resolver bound to the current session
    pub fn resolver(&mut self) -> Result<Resolver<'_>> {
        let remote = self.session.remote()?;
        Ok(Resolver::new(remote, &mut self.caches))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::Shell;
    use crate::api::mock::{MockApi, MockConnector};
    use crate::config::{Config, Paths, ServerSection};
    use crate::session::{FixedPrompter, SessionManager};

    pub const SERVER: &str = "manager.example.com";

    /// Shell logged in as admin against `api`
    pub fn logged_in_shell(temp_dir: &TempDir, api: &MockApi) -> Shell {
        let api = api.clone().with_user("admin", "secret");
        let mut servers = BTreeMap::new();
        servers.insert(
            SERVER.to_string(),
            ServerSection {
                username: Some("admin".to_string()),
                password: Some("secret".to_string()),
                ..Default::default()
            },
        );
        let config = Config {
            default: ServerSection {
                server: Some(SERVER.to_string()),
                ..Default::default()
            },
            servers,
        };

        let session = SessionManager::with_parts(
            Paths::at(temp_dir.path()),
            config,
            ServerSection::default(),
            Box::new(MockConnector::new(api)),
            Box::new(FixedPrompter::default()),
        );
        let mut shell = Shell::new(session);
        shell.ensure_login().unwrap();
        shell
    }
}
