//! Display formatting for schema text and file sizes.

/// Reformats a stored `CREATE` statement for display.
///
/// Whitespace outside quoted sections is collapsed, and the top-level
/// column list is broken into one definition per indented line. Quoted
/// identifiers and string literals are copied untouched.
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::format_create_sql;
///
/// let sql = r#"CREATE TABLE "t" ("id" INTEGER PRIMARY KEY,   "label" TEXT)"#;
/// assert_eq!(
///     format_create_sql(sql),
///     "CREATE TABLE \"t\" (\n  \"id\" INTEGER PRIMARY KEY,\n  \"label\" TEXT\n)"
/// );
/// ```
pub fn format_create_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 16);
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for c in sql.trim().chars() {
        if let Some(close) = quote {
            out.push(c);
            if c == close {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        let at_line_start = out.is_empty() || out.ends_with('\n') || out.ends_with("\n  ");
        let closes_list = c == ')' && depth == 1;
        if pending_space && !at_line_start && c != ',' && !closes_list {
            out.push(' ');
        }
        pending_space = false;

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '[' => {
                quote = Some(']');
                out.push(c);
            }
            '(' => {
                depth += 1;
                if depth == 1 {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push_str("(\n  ");
                } else {
                    out.push(c);
                }
            }
            ')' => {
                if closes_list {
                    while out.ends_with(' ') {
                        out.pop();
                    }
                    out.push_str("\n)");
                } else {
                    out.push(c);
                }
                depth = depth.saturating_sub(1);
            }
            ',' if depth == 1 => out.push_str(",\n  "),
            _ => out.push(c),
        }
    }

    out.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

const SIZE_UNITS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];

/// Formats a byte count with decimal (SI) units and up to two decimals.
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 B");
/// assert_eq!(format_file_size(1500), "1.5 kB");
/// assert_eq!(format_file_size(8192), "8.19 kB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        return format!("{bytes} B");
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}
