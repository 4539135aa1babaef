//! Method body recovery.

use super::{Introspector, MethodInfo, ReflectError};

/// Literal body of `method`, de-indented.
///
/// Methods without a known location (built-ins, abstract declarations
/// reported without a body) give an empty string.
pub(crate) fn method_code<I: Introspector + ?Sized>(
    introspector: &I,
    method: &MethodInfo,
) -> Result<String, ReflectError> {
    let Some(location) = &method.location else {
        return Ok(String::new());
    };

    if location.start_line == location.end_line {
        return Ok(String::new());
    }

    let lines = introspector.source_slice(&location.file, location.start_line, location.end_line)?;
    Ok(dedent(&lines))
}

/// Remove the indentation shared by all non-blank lines and trim the end.
///
/// Only spaces and tabs count as indentation. Without any shared
/// indentation the lines are joined unchanged.
pub fn dedent<S: AsRef<str>>(lines: &[S]) -> String {
    let indent = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty())
        .map(indent_width)
        .min()
        .unwrap_or(0);

    if indent == 0 {
        return lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut code = String::new();
    for line in lines {
        let line = line.as_ref();
        // Blank lines may be shorter than the shared indent
        let cut = indent.min(indent_width(line));
        code.push_str(&line[cut..]);
        code.push('\n');
    }
    code.truncate(code.trim_end().len());
    code
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}
