use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use agrointel_ai::response::{parse_json, strip_code_fences};
use agrointel_core::DiagnosisResult;

fn diagnosis_json(steps: usize) -> String {
    let steps: Vec<String> = (1..=steps)
        .map(|day| format!(r#"{{"day":{day},"action":"Step {day}","cost_estimate":"₹{}"}}"#, day * 50))
        .collect();
    format!(
        r#"{{"disease_found":true,"disease_name":"Leaf Spot","confidence":85,"severity":"Moderate","symptoms":"Brown spots on leaves with yellow halos.","treatment_steps":[{}],"prevention":"Ensure good air circulation."}}"#,
        steps.join(",")
    )
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnosis_parse");
    for steps in [2usize, 10, 50] {
        let plain = diagnosis_json(steps);
        let fenced = format!("```json\n{plain}\n```");
        group.throughput(Throughput::Bytes(fenced.len() as u64));

        group.bench_with_input(BenchmarkId::new("plain", steps), &plain, |b, raw| {
            b.iter(|| parse_json::<DiagnosisResult>(black_box(raw)).is_ok())
        });
        group.bench_with_input(BenchmarkId::new("fenced", steps), &fenced, |b, raw| {
            b.iter(|| parse_json::<DiagnosisResult>(black_box(raw)).is_ok())
        });
    }
    group.finish();
}

fn bench_strip(c: &mut Criterion) {
    let fenced = format!("```json\n{}\n```", diagnosis_json(10));
    c.bench_function("strip_code_fences", |b| {
        b.iter(|| strip_code_fences(black_box(&fenced)).len())
    });
}

criterion_group!(benches, bench_parse, bench_strip);
criterion_main!(benches);
