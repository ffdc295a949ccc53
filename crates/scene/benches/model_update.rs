use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use projection::{view_from_calib, CameraVariant, HardwareProfile, Projector};
use scene::{build_ribbon, LineVertices, SceneAggregator, SceneConfig, UiSettings, TRAJECTORY_SIZE};
use telemetry::messages::{LiveCalibration, ModelV2, XyztData};
use telemetry::{Message, SubMaster};

fn curved_line(offset: f32) -> XyztData {
    let x: Vec<f32> = (0..TRAJECTORY_SIZE).map(|i| 0.5 * (i * i) as f32 / 10.0 + 1.0).collect();
    XyztData {
        y: x.iter().map(|x| offset + 0.002 * x * x).collect(),
        z: x.iter().map(|x| 0.01 * x).collect(),
        t: vec![0.0; TRAJECTORY_SIZE],
        x,
    }
}

fn model() -> ModelV2 {
    ModelV2 {
        position: curved_line(0.0),
        lane_lines: vec![curved_line(-3.6), curved_line(-1.8), curved_line(1.8), curved_line(3.6)],
        lane_line_probs: vec![0.3, 0.95, 0.92, 0.25],
        road_edges: vec![curved_line(-5.0), curved_line(5.0)],
        road_edge_stds: vec![0.5, 0.5],
        ..Default::default()
    }
}

fn bench_ribbon(c: &mut Criterion) {
    let projector = Projector::new(CameraVariant::Narrow, HardwareProfile::Tici, 1920, 1080);
    let calib = view_from_calib([0.0, 0.015, -0.01]);
    let line = curved_line(1.8);
    let mut out = LineVertices::new();

    c.bench_function("ribbon_33pts", |b| {
        b.iter(|| {
            build_ribbon(&projector, &calib, black_box(&line), 0.02, 0.0, TRAJECTORY_SIZE - 1, &mut out);
            black_box(out.len())
        })
    });
}

fn bench_model_update(c: &mut Criterion) {
    let mut aggregator = SceneAggregator::new(
        HardwareProfile::Tici,
        SceneConfig::default(),
        UiSettings::default(),
        1920,
        1080,
    );
    let mut sm = SubMaster::new();
    let now = Instant::now();
    sm.update(
        vec![Message::LiveCalibration(LiveCalibration { rpy_calib: [0.0, 0.015, -0.01] })],
        now,
    );
    aggregator.update(&sm);

    let model = model();
    c.bench_function("model_update_4lanes_2edges", |b| {
        b.iter(|| {
            sm.update(vec![Message::ModelV2(black_box(model.clone()))], now);
            aggregator.update(&sm);
            black_box(aggregator.scene().geometry.track_vertices.len())
        })
    });
}

criterion_group!(benches, bench_ribbon, bench_model_update);
criterion_main!(benches);
