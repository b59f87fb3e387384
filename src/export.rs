//! Writers for the string table JSON and the joined assembly table.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parquet::basic::{Compression, ConvertedType, Repetition, Type as PhysicalType};
use parquet::data_type::{ByteArray, ByteArrayType};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::{SerializedFileWriter, SerializedRowGroupWriter};
use parquet::schema::types::{Type, TypePtr};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::constants::assembly::{COLUMN_ASSEMBLY_ID, COLUMN_PART_NAMES};
use crate::constants::export::{
    JSON_INDENT, PARQUET_LIST_ELEMENT, PARQUET_LIST_GROUP, PARQUET_SCHEMA_NAME,
};
use crate::errors::PipelineError;
use crate::metadata::{FinalizedAssemblies, PartNames};
use crate::table::StringTable;

/// Write the table as indented JSON, keys in table order, non-ASCII verbatim.
pub fn write_string_table_json_to<W: Write>(
    table: &StringTable,
    writer: W,
) -> Result<(), PipelineError> {
    let mut serializer =
        serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(JSON_INDENT));
    table.serialize(&mut serializer)?;
    Ok(())
}

/// Write the table JSON to `path`.
pub fn write_string_table_json(
    table: &StringTable,
    path: impl AsRef<Path>,
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_string_table_json_to(table, &mut writer)?;
    writer.flush()?;
    info!(
        path = %path.display(),
        files = table.len(),
        strings = table.string_count(),
        "string table written"
    );
    Ok(())
}

/// Read a table previously written by [`write_string_table_json`].
pub fn read_string_table_json(path: impl AsRef<Path>) -> Result<StringTable, PipelineError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

/// Header row of the exported assembly table.
pub fn assembly_headers(assemblies: &FinalizedAssemblies) -> Vec<&str> {
    let mut headers = Vec::with_capacity(assemblies.columns.len() + 2);
    headers.push(COLUMN_ASSEMBLY_ID);
    headers.extend(assemblies.columns.iter().map(String::as_str));
    headers.push(COLUMN_PART_NAMES);
    headers
}

/// Text form of a `part_names` cell: a JSON array, or empty when missing.
pub fn part_names_cell(part_names: &PartNames) -> Result<String, PipelineError> {
    match part_names {
        PartNames::Names(names) => Ok(serde_json::to_string(names)?),
        PartNames::Missing => Ok(String::new()),
    }
}

/// Write the assembly table as CSV.
pub fn write_assemblies_csv_to<W: Write>(
    assemblies: &FinalizedAssemblies,
    writer: W,
) -> Result<(), PipelineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(assembly_headers(assemblies))?;
    for record in &assemblies.records {
        let mut row: Vec<String> = Vec::with_capacity(record.fields.len() + 2);
        row.push(record.assembly_id.clone());
        row.extend(
            record
                .fields
                .iter()
                .map(|cell| cell.clone().unwrap_or_default()),
        );
        row.push(part_names_cell(&record.part_names)?);
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the assembly table CSV to `path`.
pub fn write_assemblies_csv(
    assemblies: &FinalizedAssemblies,
    path: impl AsRef<Path>,
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    write_assemblies_csv_to(assemblies, File::create(path)?)?;
    info!(path = %path.display(), rows = assemblies.records.len(), "assembly csv written");
    Ok(())
}

/// Parquet schema: required `assembly_id`, optional UTF-8 descriptive columns,
/// and `part_names` as an optional LIST of UTF-8 (null when missing).
pub fn assembly_schema(assemblies: &FinalizedAssemblies) -> Result<Type, PipelineError> {
    let mut fields = Vec::with_capacity(assemblies.columns.len() + 2);
    fields.push(utf8_field(COLUMN_ASSEMBLY_ID, Repetition::REQUIRED)?);
    for column in &assemblies.columns {
        fields.push(utf8_field(column, Repetition::OPTIONAL)?);
    }
    let element = utf8_field(PARQUET_LIST_ELEMENT, Repetition::REQUIRED)?;
    let list = Type::group_type_builder(PARQUET_LIST_GROUP)
        .with_repetition(Repetition::REPEATED)
        .with_fields(vec![element])
        .build()?;
    let part_names = Type::group_type_builder(COLUMN_PART_NAMES)
        .with_repetition(Repetition::OPTIONAL)
        .with_converted_type(ConvertedType::LIST)
        .with_fields(vec![Arc::new(list)])
        .build()?;
    fields.push(Arc::new(part_names));
    Ok(Type::group_type_builder(PARQUET_SCHEMA_NAME)
        .with_fields(fields)
        .build()?)
}

fn utf8_field(name: &str, repetition: Repetition) -> Result<TypePtr, PipelineError> {
    Ok(Arc::new(
        Type::primitive_type_builder(name, PhysicalType::BYTE_ARRAY)
            .with_repetition(repetition)
            .with_converted_type(ConvertedType::UTF8)
            .build()?,
    ))
}

/// Write the assembly table as a single-row-group Parquet snapshot.
pub fn write_assemblies_parquet_to<W: Write + Send>(
    assemblies: &FinalizedAssemblies,
    writer: W,
) -> Result<(), PipelineError> {
    let schema = Arc::new(assembly_schema(assemblies)?);
    let props = Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build(),
    );
    let mut file_writer = SerializedFileWriter::new(writer, schema, props)?;
    let mut row_group = file_writer.next_row_group()?;

    let ids: Vec<ByteArray> = assemblies
        .records
        .iter()
        .map(|record| ByteArray::from(record.assembly_id.as_str()))
        .collect();
    write_column(&mut row_group, &ids, None, None)?;

    for column_idx in 0..assemblies.columns.len() {
        let mut values = Vec::new();
        let mut def_levels = Vec::with_capacity(assemblies.records.len());
        for record in &assemblies.records {
            match record.fields.get(column_idx).and_then(Option::as_deref) {
                Some(cell) => {
                    values.push(ByteArray::from(cell));
                    def_levels.push(1);
                }
                None => def_levels.push(0),
            }
        }
        write_column(&mut row_group, &values, Some(def_levels.as_slice()), None)?;
    }

    // Definition levels: 0 = null list, 1 = empty list, 2 = element present.
    let mut values = Vec::new();
    let mut def_levels = Vec::new();
    let mut rep_levels = Vec::new();
    for record in &assemblies.records {
        match &record.part_names {
            PartNames::Missing => {
                def_levels.push(0);
                rep_levels.push(0);
            }
            PartNames::Names(names) if names.is_empty() => {
                def_levels.push(1);
                rep_levels.push(0);
            }
            PartNames::Names(names) => {
                for (idx, name) in names.iter().enumerate() {
                    values.push(ByteArray::from(name.as_str()));
                    def_levels.push(2);
                    rep_levels.push(if idx == 0 { 0 } else { 1 });
                }
            }
        }
    }
    write_column(
        &mut row_group,
        &values,
        Some(def_levels.as_slice()),
        Some(rep_levels.as_slice()),
    )?;

    if row_group.next_column()?.is_some() {
        return Err(
            ParquetError::General("unwritten parquet column left in schema".to_string()).into(),
        );
    }
    row_group.close()?;
    file_writer.close()?;
    Ok(())
}

/// Write the Parquet snapshot to `path`.
pub fn write_assemblies_parquet(
    assemblies: &FinalizedAssemblies,
    path: impl AsRef<Path>,
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    write_assemblies_parquet_to(assemblies, File::create(path)?)?;
    info!(path = %path.display(), rows = assemblies.records.len(), "assembly parquet written");
    Ok(())
}

fn write_column<W: Write + Send>(
    row_group: &mut SerializedRowGroupWriter<'_, W>,
    values: &[ByteArray],
    def_levels: Option<&[i16]>,
    rep_levels: Option<&[i16]>,
) -> Result<(), PipelineError> {
    let Some(mut column) = row_group.next_column()? else {
        return Err(ParquetError::General("parquet schema ran out of columns".to_string()).into());
    };
    column
        .typed::<ByteArrayType>()
        .write_batch(values, def_levels, rep_levels)?;
    column.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FinalizedAssembly;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use parquet::record::{Field, Row, RowAccessor};
    use tempfile::tempdir;

    fn sample() -> FinalizedAssemblies {
        FinalizedAssemblies {
            columns: vec!["assembly_name".to_string(), "category".to_string()],
            records: vec![
                FinalizedAssembly {
                    assembly_id: "a1".to_string(),
                    fields: vec![Some("Gearbox".to_string()), None],
                    part_names: PartNames::Names(vec!["Spur, Gear".to_string(), "Zahnrad".to_string()]),
                },
                FinalizedAssembly {
                    assembly_id: "b2".to_string(),
                    fields: vec![Some("Hinge".to_string()), Some("door".to_string())],
                    part_names: PartNames::Missing,
                },
            ],
        }
    }

    fn part_names_of(row: &Row) -> Option<Vec<String>> {
        match row.get_column_iter().last().map(|(_, field)| field) {
            Some(Field::ListInternal(list)) => Some(
                list.elements()
                    .iter()
                    .map(|field| match field {
                        Field::Str(value) => value.clone(),
                        other => panic!("unexpected list element {other:?}"),
                    })
                    .collect(),
            ),
            Some(Field::Null) => None,
            other => panic!("unexpected part_names field {other:?}"),
        }
    }

    #[test]
    fn json_uses_four_space_indent_and_keeps_unicode() {
        let table = StringTable::from_entries([
            ("/x/b".to_string(), vec!["Écrou".to_string()]),
            ("/x/a".to_string(), vec!["Lid".to_string(), "Pin".to_string()]),
        ]);
        let mut out = Vec::new();
        write_string_table_json_to(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "{\n    \"/x/b\": [\n        \"Écrou\"\n    ],\n    \"/x/a\": [\n        \"Lid\",\n        \"Pin\"\n    ]\n}"
        );
    }

    #[test]
    fn json_round_trips_through_disk() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("table.json");
        let table = StringTable::from_entries([
            ("/x/z".to_string(), vec!["Z".to_string()]),
            ("/x/a".to_string(), vec!["A".to_string()]),
        ]);
        write_string_table_json(&table, &path).unwrap();
        assert_eq!(read_string_table_json(&path).unwrap(), table);
    }

    #[test]
    fn csv_quotes_lists_and_blanks_missing() {
        let mut out = Vec::new();
        write_assemblies_csv_to(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "assembly_id,assembly_name,category,part_names");
        assert_eq!(lines[1], r#"a1,Gearbox,,"[""Spur, Gear"",""Zahnrad""]""#);
        assert_eq!(lines[2], "b2,Hinge,door,");
    }

    #[test]
    fn parquet_snapshot_reads_back() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data.parquet");
        write_assemblies_parquet(&sample(), &path).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 2);
        let rows: Vec<Row> = reader
            .get_row_iter(None)
            .unwrap()
            .map(|row| row.unwrap())
            .collect();

        assert_eq!(rows[0].get_string(0).unwrap(), "a1");
        assert_eq!(rows[0].get_string(1).unwrap(), "Gearbox");
        assert_eq!(
            part_names_of(&rows[0]),
            Some(vec!["Spur, Gear".to_string(), "Zahnrad".to_string()])
        );
        assert_eq!(rows[1].get_string(0).unwrap(), "b2");
        assert_eq!(rows[1].get_string(2).unwrap(), "door");
        assert_eq!(part_names_of(&rows[1]), None);
    }

    #[test]
    fn schema_lists_every_column() {
        let schema = assembly_schema(&sample()).unwrap();
        let names: Vec<&str> = schema.get_fields().iter().map(|field| field.name()).collect();
        assert_eq!(
            names,
            vec!["assembly_id", "assembly_name", "category", "part_names"]
        );
    }
}
