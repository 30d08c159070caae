use std::path::Path;

use nix::unistd;

use crate::types::Command;

/// Name of the one built-in the launcher recognizes.
pub const CD: &str = "cd";

/// Returns the directory operand when the command is the `cd` built-in with
/// a target; extra arguments beyond the target are ignored. `cd` without an
/// operand is not matched and goes down the exec path like any other word.
pub fn cd_target(command: &Command) -> Option<&str> {
    match command.arguments.as_slice() {
        [name, target, ..] if name.as_str() == CD => Some(target),
        _ => None,
    }
}

/// The directory-change collaborator: the only command whose effect must
/// land in the interpreter's own process rather than a child.
pub fn change_directory(target: &str) -> nix::Result<()> {
    unistd::chdir(Path::new(target))
}
