use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print the result, then fail the process if the operation did not succeed.
pub fn output_outcome<T: Serialize>(
    value: &T,
    success: bool,
    error: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    output(value, format)?;
    if success {
        Ok(())
    } else {
        anyhow::bail!("{}", error.unwrap_or("operation reported failures"))
    }
}
