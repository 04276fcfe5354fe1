//! Built-in command set. Arabic names are primary; a small closed set of
//! English aliases exists for muscle memory (`echo`, `cd`, `pwd`, `ls`,
//! `help`).

mod echo;
mod help;
mod lang;
mod nav;
mod testcmds;

use crate::registry::CommandSpec;

pub use echo::EchoCommand;
pub use help::{CommandsCommand, HelpCommand};
pub use lang::LanguageCommand;
pub use nav::{CdCommand, ListCommand, PwdCommand};
pub use testcmds::{ArrayTestCommand, TypeTestCommand};

/// Registration manifest scanned at startup.
pub fn builtin_specs() -> Vec<CommandSpec> {
    vec![
        help::help_spec(),
        help::commands_spec(),
        echo::echo_spec(),
        nav::cd_spec(),
        nav::pwd_spec(),
        nav::list_spec(),
        testcmds::array_test_spec(),
        testcmds::type_test_spec(),
        lang::language_spec(),
    ]
}
