pub mod file;
pub mod settings;
pub mod stdin;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read the command input from `--input <file>` or piped stdin.
pub fn read_input_value(
    path: Option<&str>,
    what: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_json_value(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(data)
    } else {
        Err(format!("--input <file.json> or stdin required for {what}").into())
    }
}

/// Typed variant of [`read_input_value`].
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    Ok(serde_json::from_value(read_input_value(path, what)?)?)
}
