use std::collections::HashMap;

use stepnames::{
    AssemblyRecord, AssemblyTable, MetadataJoiner, PartNames, PipelineConfig, StringTable,
    StringTableBuilder, build_string_table,
};

fn corpus() -> Vec<String> {
    let names = [
        "Spur Gear",
        "Body",
        "left housing cover plate",
        "Top",
        "Shaft_M8",
        "front surface",
        "Idler",
        "",
    ];
    let mut lines = Vec::new();
    for (idx, name) in names.iter().enumerate() {
        let file = format!("/abc/{:08}_asm{}_step_000", idx % 3, idx % 2);
        lines.push(format!(
            "{file}.step:#{idx}=MANIFOLD_SOLID_BREP('{name}',#{});",
            idx + 1
        ));
        lines.push(format!("{file}.step:#{idx}=ADVANCED_FACE('{name}',(#1),#2,.T.);"));
    }
    lines
}

#[test]
fn repeated_stream_is_idempotent() {
    let lines = corpus();
    let once = build_string_table(&lines, &PipelineConfig::default());

    let mut builder = StringTableBuilder::new(&PipelineConfig::default());
    builder.extend(&lines);
    builder.extend(&lines);
    let twice = builder.finish();

    assert_eq!(twice.table, once.table);
    assert_eq!(twice.stats.lines_seen, 2 * once.stats.lines_seen);
}

#[test]
fn independent_runs_produce_identical_tables() {
    let lines = corpus();
    let first = build_string_table(&lines, &PipelineConfig::default());
    let second = build_string_table(&lines, &PipelineConfig::default());
    assert_eq!(first.table, second.table);
    assert_eq!(
        serde_json::to_string(&first.table).unwrap(),
        serde_json::to_string(&second.table).unwrap()
    );
}

#[test]
fn only_solid_body_lines_contribute() {
    let build = build_string_table(corpus(), &PipelineConfig::default());
    assert_eq!(build.stats.lines_seen, 16);
    assert_eq!(build.stats.solid_body_lines, 8);

    let all: Vec<&String> = build.table.iter().flat_map(|(_, names)| names).collect();
    assert!(all.iter().any(|name| name.as_str() == "Spur Gear"));
    assert!(all.iter().any(|name| name.as_str() == "left housing cover plate"));
    assert!(all.iter().any(|name| name.is_empty()));
    assert!(!all.iter().any(|name| ["Body", "Top", "front surface"].contains(&name.as_str())));
}

#[test]
fn join_keeps_every_contribution_and_marks_the_rest_missing() {
    let build = build_string_table(corpus(), &PipelineConfig::default());
    let mut assemblies = AssemblyTable::with_columns(Vec::new());
    for id in ["asm0", "asm1", "asm9"] {
        assemblies.insert(AssemblyRecord {
            assembly_id: id.to_string(),
            fields: Vec::new(),
            part_names: Vec::new(),
        });
    }

    let report = MetadataJoiner::default().join(&mut assemblies, &build.table);
    assert!(report.is_complete());

    let mut expected: HashMap<String, Vec<String>> = HashMap::new();
    for (file_id, names) in build.table.iter() {
        let key = stepnames::assembly_key(file_id, '_', 1).unwrap().to_string();
        expected.entry(key).or_default().extend(names.iter().cloned());
    }

    let finalized = assemblies.finalize();
    for record in &finalized.records {
        match expected.get(&record.assembly_id) {
            Some(names) => assert_eq!(record.part_names, PartNames::Names(names.clone())),
            None => assert_eq!(record.part_names, PartNames::Missing),
        }
    }
    assert!(finalized.records[2].part_names.is_missing());
}

#[test]
fn empty_table_joins_to_all_missing() {
    let mut assemblies = AssemblyTable::from_reader(
        "assembly_id,file_number,part_num\na,0,0\nb,0,0\n".as_bytes(),
    )
    .unwrap();
    let report = MetadataJoiner::default().join(&mut assemblies, &StringTable::default());
    assert_eq!(report.merged_entries, 0);
    let finalized = assemblies.finalize();
    assert_eq!(finalized.with_names(), 0);
    assert!(
        finalized
            .records
            .iter()
            .all(|record| record.part_names == PartNames::Missing)
    );
}
