use crate::domain::models::JsonOut;
use serde::Serialize;

/// Prints a `{ok, data}` envelope in JSON mode, otherwise one text line per item.
pub fn print_rows<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

/// Like [`print_rows`] for a single report; `ok` lets a report flag problems
/// without failing the command.
pub fn print_report<T: Serialize>(
    json: bool,
    ok: bool,
    data: T,
    text: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok, data })?
        );
    } else {
        println!("{}", text(&data));
    }
    Ok(())
}
