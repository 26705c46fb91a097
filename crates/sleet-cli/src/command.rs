use std::io::Write;

use anyhow::Context;
use serde::Serialize;
use sleet::{Components, GeneratorConfig, SleetId, SnowflakeGenerator, SystemClock};

use crate::config::{CliConfig, Command, Format};

/// One decoded ID as printed by both subcommands.
#[derive(Serialize, Debug, PartialEq, Eq)]
struct Record {
    #[serde(with = "sleet::serde::as_string")]
    id: SleetId,
    timestamp_millis: u64,
    #[serde(flatten)]
    components: Components,
}

impl Record {
    fn new(config: &GeneratorConfig, id: SleetId) -> anyhow::Result<Self> {
        Ok(Self {
            id,
            timestamp_millis: config.timestamp_millis(id)?,
            components: id.decode(),
        })
    }
}

pub fn run(config: CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match config.command {
        Command::Generate { count } => {
            let generator = SnowflakeGenerator::from_config(config.generator, SystemClock);
            tracing::debug!(
                datacenter_id = config.generator.datacenter_id(),
                machine_id = config.generator.machine_id(),
                count,
                "generating"
            );
            for _ in 0..count {
                let id = generator.next_id().context("failed to generate id")?;
                write_record(out, config.format, &Record::new(&config.generator, id)?)?;
            }
        }
        Command::Decode { ids } => {
            for raw in &ids {
                let id: SleetId = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("cannot decode {raw:?}"))?;
                write_record(out, config.format, &Record::new(&config.generator, id)?)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn write_record(out: &mut impl Write, format: Format, record: &Record) -> anyhow::Result<()> {
    match format {
        Format::Text => {
            let c = &record.components;
            writeln!(
                out,
                "{} timestamp_millis={} millis_offset={} datacenter_id={} machine_id={} sequence={}",
                record.id,
                record.timestamp_millis,
                c.millis_offset,
                c.datacenter_id,
                c.machine_id,
                c.sequence
            )?;
        }
        Format::Json => {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, time::Duration};

    fn config(format: Format, command: Command) -> CliConfig {
        CliConfig {
            generator: GeneratorConfig::new(3, 4)
                .unwrap()
                .with_epoch(Duration::from_millis(1_000)),
            format,
            command,
        }
    }

    fn run_to_string(config: CliConfig) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn decode_text() {
        let id = SleetId::from_components(5, 3, 4, 6);
        let out = run_to_string(config(
            Format::Text,
            Command::Decode {
                ids: vec![id.to_string()],
            },
        ))
        .unwrap();
        assert_eq!(
            out,
            format!(
                "{id} timestamp_millis=1005 millis_offset=5 datacenter_id=3 machine_id=4 sequence=6\n"
            )
        );
    }

    #[test]
    fn decode_json() {
        let id = SleetId::from_components(5, 3, 4, 6);
        let out = run_to_string(config(
            Format::Json,
            Command::Decode {
                ids: vec![id.to_string()],
            },
        ))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["id"], serde_json::json!(id.to_string()));
        assert_eq!(value["timestamp_millis"], 1005);
        assert_eq!(value["millis_offset"], 5);
        assert_eq!(value["datacenter_id"], 3);
        assert_eq!(value["machine_id"], 4);
        assert_eq!(value["sequence"], 6);
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = run_to_string(config(
            Format::Text,
            Command::Decode {
                ids: vec!["abc".into()],
            },
        ));
        assert!(result.is_err());
    }

    #[test]
    fn decode_reports_timestamp_overflow() {
        let mut config = config(
            Format::Text,
            Command::Decode {
                ids: vec![(1u64 << 22).to_string()],
            },
        );
        config.generator = config
            .generator
            .with_epoch(Duration::from_millis(u64::MAX));

        let err = run_to_string(config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<sleet::Error>(),
            Some(sleet::Error::TimestampOverflow { millis_offset: 1, .. })
        ));
    }

    #[test]
    fn generate_emits_unique_ids_for_node() {
        let out = run_to_string(config(Format::Json, Command::Generate { count: 100 })).unwrap();
        let mut seen = HashSet::new();
        for line in out.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["datacenter_id"], 3);
            assert_eq!(value["machine_id"], 4);
            assert!(seen.insert(value["id"].as_str().unwrap().to_owned()));
        }
        assert_eq!(seen.len(), 100);
    }
}
