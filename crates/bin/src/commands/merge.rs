//! Merge command - loads records, merges them by property, writes the result.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use coalesce::{
    MemoryCollection, Record, RecordCollection, RecordCursor,
    collection::{Filter, PropertyFilter},
    log::{MemoryLog, TransformationLog},
    merge::{MergeHandler, MergeParameters, PropertyMergeHandler},
};
use serde::ser::{SerializeSeq, Serializer};
use tracing::info;

use crate::cli::Cli;

/// Run the merge command
pub fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_records(&cli.input)?;
    info!(input = %cli.input.display(), records = source.len()?, "Loaded records");

    let log = MemoryLog::new();
    let parameters = cli.merge_parameters();
    let written = match &cli.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            let written = merge_records(&source, &cli.filters, &parameters, &log, &mut writer);
            writer.flush()?;
            written
        }
        None => merge_records(
            &source,
            &cli.filters,
            &parameters,
            &log,
            std::io::stdout().lock(),
        ),
    };

    // Diagnostics are reported even when the merge failed
    for entry in log.entries() {
        eprintln!("{entry}");
    }
    info!(groups = written?, "Merged records");

    Ok(())
}

/// Reads a JSON array of records into a fresh collection named after the file.
pub fn load_records(path: &Path) -> coalesce::Result<MemoryCollection> {
    let records: Vec<Record> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());

    let collection = MemoryCollection::named(name);
    for record in records {
        collection.insert(record)?;
    }
    Ok(collection)
}

/// Merges the records of `source` matching every filter and streams the
/// merged records to `writer` as a JSON array.
///
/// Returns the number of merged records written. A failing group is also
/// recorded in `log`; records merged before it have already been written.
pub fn merge_records<W: Write>(
    source: &MemoryCollection,
    filters: &[PropertyFilter],
    parameters: &MergeParameters,
    log: &MemoryLog,
    writer: W,
) -> coalesce::Result<usize> {
    let selected = source.select(|record: &Record| filters.iter().all(|f| f.matches(record)));
    let handler = PropertyMergeHandler::new();
    let merged = handler.merge_instances(&selected, parameters, log)?;

    let mut cursor = merged.cursor()?;
    let written = write_records(&mut cursor, writer);
    cursor.close();
    if let Err(err) = &written {
        log.error(&err.to_string());
    }
    written
}

/// Serializes records one at a time, holding at most one in memory.
fn write_records<W: Write>(
    records: impl Iterator<Item = coalesce::Result<Record>>,
    writer: W,
) -> coalesce::Result<usize> {
    let mut serializer = serde_json::Serializer::pretty(writer);
    let mut seq = serializer.serialize_seq(None)?;
    let mut count = 0;
    for record in records {
        seq.serialize_element(&record?)?;
        count += 1;
    }
    seq.end()?;

    let mut writer = serializer.into_inner();
    writeln!(writer)?;
    Ok(count)
}
