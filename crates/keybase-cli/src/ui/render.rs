//! Rendering primitives for CLI output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{ContentArrangement, Table as ComfyTable};

use super::context::UiContext;
use super::theme::{styled, styles, Badge};

/// Header line for a command.
///
/// Pretty mode: "Keybase · command (context)"
/// Plain mode: "keybase command"
pub fn header(ctx: &UiContext, command: &str, context: Option<&str>) -> String {
    if ctx.mode.is_pretty() {
        let title = styled("Keybase", styles::bold(), ctx.color);
        match context {
            Some(c) => format!("{} \u{00B7} {} ({})", title, command, c),
            None => format!("{} \u{00B7} {}", title, command),
        }
    } else {
        format!("keybase {}", command)
    }
}

pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let colored = styled(kind.display(ctx.unicode), kind.style(), ctx.color);
    if message.is_empty() {
        colored
    } else {
        format!("{} {}", colored, message)
    }
}

/// Key-value pair.
///
/// Pretty mode: "Key: value" with dim key
/// Plain mode: "key=value"
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        let styled_key = styled(&format!("{}:", key), styles::dim(), ctx.color);
        format!("{} {}", styled_key, value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.mode.is_pretty() {
        format!("{} {}", styled("Hint:", styles::dim(), ctx.color), text)
    } else {
        format!("hint={}", text)
    }
}

/// Summary block after an action.
///
/// Pretty mode: badge plus indented key-value pairs
/// Plain mode: `status=ok` plus key=value lines
pub fn receipt(ctx: &UiContext, title: &str, items: &[(&str, &str)]) -> String {
    let mut lines = Vec::with_capacity(items.len() + 1);
    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Ok, title));
        lines.extend(items.iter().map(|(k, v)| format!("  {}", kv(ctx, k, v))));
    } else {
        lines.push("status=ok".to_string());
        lines.extend(items.iter().map(|(k, v)| kv(ctx, k, v)));
    }
    lines.join("\n")
}

/// Table of rows under `headers`.
///
/// Pretty mode: bordered comfy-table
/// Plain mode: space-separated values, no header
pub fn table(ctx: &UiContext, headers: &[&str], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = ComfyTable::new();
    if ctx.unicode {
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(ASCII_MARKDOWN);
    }
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(ctx.width.min(u16::MAX as usize) as u16)
        .set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Print to stdout unless in JSON mode.
pub fn print(ctx: &UiContext, message: &str) {
    if !ctx.mode.is_json() {
        println!("{}", message);
    }
}

pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let mut lines = Vec::new();
    if ctx.mode.is_pretty() {
        lines.push(badge(ctx, Badge::Err, message));
        if let Some(h) = error_hint {
            lines.push(hint(ctx, h));
        }
    } else {
        lines.push(format!("error={}", message));
        if let Some(h) = error_hint {
            lines.push(format!("hint={}", h));
        }
    }
    lines.join("\n")
}

pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::mode::OutputMode;

    fn pretty_ctx() -> UiContext {
        UiContext {
            color: false,
            unicode: true,
            width: 80,
            mode: OutputMode::Pretty,
        }
    }

    #[test]
    fn test_header() {
        assert_eq!(header(&UiContext::plain(), "list", None), "keybase list");
        assert_eq!(
            header(&pretty_ctx(), "list", Some("3 keys")),
            "Keybase \u{00B7} list (3 keys)"
        );
    }

    #[test]
    fn test_kv_plain_snake_cases_key() {
        assert_eq!(kv(&UiContext::plain(), "Key Type", "local"), "key_type=local");
        assert_eq!(kv(&pretty_ctx(), "Name", "alice"), "Name: alice");
    }

    #[test]
    fn test_receipt_plain() {
        let out = receipt(&UiContext::plain(), "Created", &[("Name", "alice")]);
        assert_eq!(out, "status=ok\nname=alice");
    }

    #[test]
    fn test_table_plain_has_no_header() {
        let rows = vec![vec!["alice".to_string(), "local".to_string()]];
        assert_eq!(table(&UiContext::plain(), &["Name", "Type"], &rows), "alice local");
    }

    #[test]
    fn test_table_pretty_has_header() {
        let rows = vec![vec!["alice".to_string(), "local".to_string()]];
        let out = table(&pretty_ctx(), &["Name", "Type"], &rows);
        assert!(out.contains("Name"));
        assert!(out.contains("alice"));
    }

    #[test]
    fn test_error_message() {
        let out = error_message(&UiContext::plain(), "boom", Some("retry"));
        assert_eq!(out, "error=boom\nhint=retry");
    }
}
