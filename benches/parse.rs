// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use triton::format::plantuml::{export_workflow, parse_workflow};

// Benchmark identity (keep stable):
// - Group names in this file: `format.parse_workflow`, `format.export_workflow`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `small`, `medium`, `large_grouped`).
// - If implementations move/deduplicate, update the wiring but do not rename
//   group or case IDs.

/// Chain of `nodes` declarations with an edge between each consecutive pair,
/// optionally wrapped into packages of `group_size` members.
fn synthetic_workflow(nodes: usize, group_size: usize) -> String {
    let mut source = String::from("@startuml Synthetic\n!theme plain\n\ntitle Synthetic\n\n");
    let kinds = ["rectangle", "database", "component", "cloud", "actor"];
    for index in 0..nodes {
        let kind = kinds[index % kinds.len()];
        if group_size > 0 && index % group_size == 0 {
            if index > 0 {
                source.push_str("}\n");
            }
            source.push_str(&format!("package \"Stage {index}\" as stage{index} {{\n"));
        }
        source.push_str(&format!("{kind} \"Step {index}\" as step{index}\n"));
    }
    if group_size > 0 && nodes > 0 {
        source.push_str("}\n");
    }
    source.push('\n');
    for index in 1..nodes {
        let previous = index - 1;
        source.push_str(&format!("step{previous} --> step{index} : \"then\"\n"));
    }
    source.push_str("@enduml\n");
    source
}

fn benches_parse(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("format.parse_workflow");

        for (case_id, source, edges) in [
            ("small", synthetic_workflow(8, 0), 7u64),
            ("medium", synthetic_workflow(64, 0), 63),
            ("large_grouped", synthetic_workflow(256, 8), 255),
        ] {
            group.throughput(Throughput::Elements(edges));
            group.bench_function(case_id, move |b| {
                b.iter(|| {
                    let diagram = parse_workflow(black_box(&source)).expect("parse_workflow");
                    black_box(diagram.graph().edge_count())
                })
            });
        }

        group.finish();
    }

    {
        let mut group = c.benchmark_group("format.export_workflow");

        for (case_id, source, edges) in [
            ("small", synthetic_workflow(8, 0), 7u64),
            ("medium", synthetic_workflow(64, 0), 63),
            ("large_grouped", synthetic_workflow(256, 8), 255),
        ] {
            let diagram = parse_workflow(&source).expect("parse_workflow");
            group.throughput(Throughput::Elements(edges));
            group.bench_function(case_id, move |b| {
                b.iter(|| black_box(export_workflow(black_box(&diagram))).len())
            });
        }

        group.finish();
    }
}

criterion_group!(benches, benches_parse);
criterion_main!(benches);
