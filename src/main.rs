//! tap-csv: emit schema and record messages for configured CSV streams.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use serde_json::{json, Value};
use tracing::{error, info};

use tap_csv::{init_tracing, ConfigService, CsvTap, Result, TapStream};

fn main() -> ExitCode {
    init_tracing();

    let Some(config_path) = std::env::args().nth(1) else {
        eprintln!("Usage: tap-csv <config.json|config.toml>");
        return ExitCode::FAILURE;
    };

    match run(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &str) -> Result<()> {
    let config = ConfigService::new(config_path).load()?;
    let streams = CsvTap::new(config).discover_streams()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for stream in &streams {
        let schema = stream.get_schema()?;
        write_message(
            &mut out,
            &json!({
                "type": "SCHEMA",
                "stream": stream.name(),
                "schema": schema.to_json_schema(),
                "key_properties": stream.primary_keys(),
            }),
        )?;

        let mut count = 0u64;
        for record in stream.get_records(None)? {
            let record = record?;
            write_message(
                &mut out,
                &json!({
                    "type": "RECORD",
                    "stream": stream.name(),
                    "record": record,
                }),
            )?;
            count += 1;
        }
        info!(stream = %stream.name(), records = count, "Finished stream");
    }

    out.flush()?;
    Ok(())
}

fn write_message(out: &mut impl Write, message: &Value) -> Result<()> {
    serde_json::to_writer(&mut *out, message).map_err(io::Error::from)?;
    out.write_all(b"\n")?;
    Ok(())
}
