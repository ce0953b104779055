//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# termdeck configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[shell]
# program = ""             # empty = $SHELL, then /bin/sh
# args = []
# working_directory = "~"  # default cwd for new terminals
# login_shell = true

[shell.env]
# EDITOR = "nvim"

[terminal]
# scrollback_lines = 10000 # 0-100000
# max_sessions = 4         # 1-16
# settle_delay_ms = 50     # 0-5000
# cell_width = 8.0         # 1.0-100.0
# cell_height = 17.0       # 1.0-100.0
# padding = 4              # 0-40

[terminal.theme]
# background = "#1e1e1e"
# foreground = "#d4d4d4"
# cursor = "#aeafad"
# selection = "#264f78"
# error = "#f14c4c"

[layout]
# gap = 4                  # 0-20
# min_pane_size = 80.0     # 20.0-400.0

[logging]
# level = "INFO"           # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
