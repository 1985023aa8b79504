use anyhow::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::Write;

/// Pretty-print `value` using `indent` spaces per level, followed by a newline.
pub fn write_json_pretty<W: Write>(out: &mut W, value: &Value, indent: usize) -> Result<()> {
    let indent = " ".repeat(indent);
    {
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut *out, formatter);
        value.serialize(&mut serializer)?;
    }
    writeln!(out)?;
    Ok(())
}

/// The two lines printed ahead of the body. Written before the body is
/// decoded, so they appear even when the body turns out not to be JSON.
///
/// ```text
/// Status Code: 200
/// Response JSON:
/// {
///  "results": []
/// }
/// ```
pub fn write_response_header<W: Write>(out: &mut W, status: u16) -> Result<()> {
    writeln!(out, "Status Code: {}", status)?;
    writeln!(out, "Response JSON:")?;
    out.flush()?;
    Ok(())
}
