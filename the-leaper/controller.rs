//! Entry point for hosts: follows the active editor and owns the
//! configuration.

use std::{
  fmt,
  rc::Rc,
};

use crate::{
  change::{
    ContentChangeEvent,
    SelectionChangeEvent,
  },
  command::{
    Command,
    UnknownCommand,
  },
  config::{
    self,
    Configuration,
  },
  host::EditorHost,
  session::{
    Services,
    Session,
  },
};

/// Holds at most one [`Session`], bound to the editor that has focus.
pub struct Controller {
  services: Services,
  config:   Configuration,
  session:  Option<Session>,
}

impl Controller {
  pub fn new(services: Services, config: Configuration) -> Self {
    Self {
      services,
      config,
      session: None,
    }
  }

  pub fn configuration(&self) -> &Configuration {
    &self.config
  }

  pub fn session(&self) -> Option<&Session> {
    self.session.as_ref()
  }

  /// Switch to `host`, or to no editor at all. The previous session is
  /// disposed first, so its decorations and context values are cleared
  /// before the new session pushes its own.
  pub fn set_active_editor(&mut self, host: Option<Rc<dyn EditorHost>>) {
    if let Some(session) = self.session.take() {
      session.dispose();
    }
    self.session = host.map(|host| {
      tracing::debug!("active editor changed");
      Session::new(host, &self.services, self.config.clone())
    });
  }

  pub fn on_selection_change(&self, event: &SelectionChangeEvent) {
    if let Some(session) = &self.session {
      session.on_selection_change(event);
    }
  }

  pub fn on_content_change(&self, event: &ContentChangeEvent) {
    if let Some(session) = &self.session {
      session.on_content_change(event);
    }
  }

  /// Run `command` in the active session. Returns whether it did anything.
  pub fn execute(&self, command: Command) -> bool {
    self
      .session
      .as_ref()
      .is_some_and(|session| session.execute(command))
  }

  pub fn execute_named(&self, name: &str) -> Result<bool, UnknownCommand> {
    Ok(self.execute(name.parse()?))
  }

  /// Replace the configuration. Tracked pairs are dropped unless the new
  /// snapshot equals the current one.
  pub fn change_configuration(&mut self, config: Configuration) {
    if config == self.config {
      tracing::trace!("configuration unchanged");
      return;
    }
    tracing::debug!(pairs = config.detected_pairs().len(), "configuration changed");
    self.config = config;
    if let Some(session) = &self.session {
      session.change_configuration(self.config.clone());
    }
  }

  /// Parse `source` as TOML and apply it. A document that fails to parse or
  /// validate leaves the current configuration in place.
  pub fn reload_configuration(&mut self, source: &str) -> config::Result<()> {
    match Configuration::from_toml(source) {
      Ok(config) => {
        self.change_configuration(config);
        Ok(())
      },
      Err(err) => {
        tracing::warn!("keeping previous configuration: {err}");
        Err(err)
      },
    }
  }
}

impl fmt::Debug for Controller {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Controller")
      .field("config", &self.config)
      .field("session", &self.session)
      .finish_non_exhaustive()
  }
}
