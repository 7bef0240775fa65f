//! Commands a host binds to keys, gated on the session's context keys.

use std::{
  fmt,
  str::FromStr,
};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
  /// Move each cursor past the closing side of its nearest pair.
  Leap,
  /// Stop tracking every pair.
  EscapeLeaperMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command {0:?}")]
pub struct UnknownCommand(pub String);

impl Command {
  pub const ALL: [Command; 2] = [Command::Leap, Command::EscapeLeaperMode];

  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Leap => "leaper.leap",
      Self::EscapeLeaperMode => "leaper.escapeLeaperMode",
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Command {
  type Err = UnknownCommand;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|command| command.as_str() == name)
      .ok_or_else(|| UnknownCommand(name.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_registered_names() {
    for command in Command::ALL {
      assert_eq!(command.to_string().parse::<Command>(), Ok(command));
    }
    assert_eq!("leaper.leap".parse(), Ok(Command::Leap));
  }

  #[test]
  fn rejects_unknown_names() {
    assert_eq!(
      "leaper.jump".parse::<Command>(),
      Err(UnknownCommand("leaper.jump".into()))
    );
  }
}
