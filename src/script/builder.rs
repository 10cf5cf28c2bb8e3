/// Double-quotes a value for bash, leaving `$VAR` expansion intact.
pub fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// True for names bash accepts in `export NAME=...`.
pub fn is_shell_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Ordered assembly of shell commands.
///
/// Commands are joined with newlines by default, or chained with `&&` when
/// built with [`ShellScriptBuilder::chained`].
#[derive(Debug, Clone, Default)]
pub struct ShellScriptBuilder {
    commands: Vec<String>,
    chained: bool,
}

impl ShellScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder whose commands run only while the previous one succeeds.
    pub fn chained() -> Self {
        Self {
            commands: Vec::new(),
            chained: true,
        }
    }

    pub fn add_command(&mut self, command: impl Into<String>) -> &mut Self {
        let command = command.into();
        if !command.trim().is_empty() {
            self.commands.push(command);
        }
        self
    }

    pub fn add_comment(&mut self, comment: &str) -> &mut Self {
        self.add_command(format!("# {}", comment))
    }

    pub fn add_export(&mut self, name: &str, value: &str) -> &mut Self {
        self.add_command(format!("export {}={}", name, shell_quote(value)))
    }

    pub fn add_mkdir(&mut self, path: &str) -> &mut Self {
        self.add_command(format!("mkdir -p {}", shell_quote(path)))
    }

    /// Runs `command` only when `path` is a regular file.
    pub fn add_if_file_exists(&mut self, path: &str, command: &str) -> &mut Self {
        self.add_command(format!(
            "if [ -f {} ]; then\n    {}\nfi",
            shell_quote(path),
            command
        ))
    }

    pub fn add_blank_line(&mut self) -> &mut Self {
        self.commands.push(String::new());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.iter().all(|c| c.is_empty())
    }

    pub fn build(&self) -> String {
        if self.chained {
            self.commands
                .iter()
                .filter(|c| !c.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" && ")
        } else {
            self.commands.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_identifiers() {
        assert!(is_shell_identifier("APP_ENV"));
        assert!(is_shell_identifier("_private2"));
        assert!(!is_shell_identifier(""));
        assert!(!is_shell_identifier("2FAST"));
        assert!(!is_shell_identifier("APP-ENV"));
        assert!(!is_shell_identifier("X; rm -rf /"));
    }

    #[test]
    fn test_shell_quote_keeps_variables() {
        assert_eq!(shell_quote("$SOURCE_DIR/out"), "\"$SOURCE_DIR/out\"");
        assert_eq!(shell_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_newline_builder() {
        let mut builder = ShellScriptBuilder::new();
        builder
            .add_export("NODE_VERSION", "18.17.1")
            .add_mkdir("$DESTINATION_DIR")
            .add_command("")
            .add_if_file_exists("yarn.lock", "yarn install");

        assert_eq!(
            builder.build(),
            "export NODE_VERSION=\"18.17.1\"\nmkdir -p \"$DESTINATION_DIR\"\nif [ -f \"yarn.lock\" ]; then\n    yarn install\nfi"
        );
    }

    #[test]
    fn test_chained_builder() {
        let mut builder = ShellScriptBuilder::chained();
        builder.add_command("cd app").add_command("make");
        assert_eq!(builder.build(), "cd app && make");
        assert!(!builder.is_empty());
        assert!(ShellScriptBuilder::new().is_empty());
    }
}
