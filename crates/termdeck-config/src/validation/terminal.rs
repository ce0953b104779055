use crate::schema::TermdeckConfig;

use super::helpers::{validate_hex_color, validate_range, validate_range_f64};

pub(crate) fn validate_terminal(errors: &mut Vec<String>, config: &TermdeckConfig) {
    let t = &config.terminal;
    validate_range(
        errors,
        "terminal.scrollback_lines",
        t.scrollback_lines,
        0,
        100_000,
    );
    validate_range(errors, "terminal.max_sessions", t.max_sessions, 1, 16);
    validate_range(
        errors,
        "terminal.settle_delay_ms",
        t.settle_delay_ms,
        0,
        5_000,
    );
    validate_range_f64(errors, "terminal.cell_width", t.cell_width, 1.0, 100.0);
    validate_range_f64(errors, "terminal.cell_height", t.cell_height, 1.0, 100.0);
    validate_range(errors, "terminal.padding", t.padding, 0, 40);
}

pub(crate) fn validate_theme(errors: &mut Vec<String>, config: &TermdeckConfig) {
    let theme = &config.terminal.theme;
    validate_hex_color(errors, "terminal.theme.background", &theme.background);
    validate_hex_color(errors, "terminal.theme.foreground", &theme.foreground);
    validate_hex_color(errors, "terminal.theme.cursor", &theme.cursor);
    validate_hex_color(errors, "terminal.theme.selection", &theme.selection);
    validate_hex_color(errors, "terminal.theme.error", &theme.error);
}
