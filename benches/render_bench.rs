use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hoststat::coordinator::message::{CpuResponse, MemoryResponse, RoundIndex, SessionsResponse};
use hoststat::render::cpu::{average_line, cpu_line};
use hoststat::render::report::{ReportLayout, RoundReport, SampleLog, render_report};
use hoststat::render::sessions::session_lines;
use hoststat::system::cpu::{CpuCounts, CpuTicks, usage_percent};
use hoststat::system::sessions::{Session, SessionList};
use std::hint::black_box;

fn make_sessions(n: usize) -> Vec<Session> {
    (0..n)
        .map(|i| Session::new(format!("user_{i}"), format!("pts/{i}"), format!("10.0.{}.{}", i / 256, i % 256)))
        .collect()
}

fn make_report(round: u32, sessions: &SessionList) -> RoundReport {
    let percent = f64::from(round % 100);
    let mut report = RoundReport::new(RoundIndex::new(round));
    report.memory = Some(MemoryResponse {
        line: format!("{round}.00 GB / 64.00 GB -- {round}.00 GB / 80.00 GB"),
    });
    report.cpu = Some(CpuResponse {
        counts: CpuCounts {
            processors: 16,
            cores: 8,
        },
        percent,
        average: percent / 2.0,
        line: cpu_line(percent, 1.0, true),
        average_line: average_line(percent / 2.0),
    });
    report.sessions = Some(SessionsResponse {
        lines: session_lines(sessions),
        discarded: sessions.discarded,
    });
    report
}

fn bench_render_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_report_10_100_1000_rounds");
    let sessions = SessionList::bounded(make_sessions(64), 32);

    for rounds in [10u32, 100, 1000] {
        let mut log = SampleLog::new(rounds);
        for round in 1..=rounds {
            log.record(&make_report(round, &sessions));
        }
        let last = make_report(rounds, &sessions);
        let layout = ReportLayout {
            samples: rounds,
            delay_secs: 1,
            graphics: true,
        };

        group.bench_with_input(BenchmarkId::from_parameter(rounds), &log, |b, log| {
            b.iter(|| black_box(render_report(black_box(&last), log, &layout, Some(4096))));
        });
    }
    group.finish();
}

fn bench_session_bounding(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_bounding_32_of_100_1000");
    for count in [100usize, 1000] {
        let sessions = make_sessions(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &sessions, |b, sessions| {
            b.iter(|| {
                let list = SessionList::bounded(black_box(sessions.iter().cloned()), 32);
                black_box(session_lines(&list))
            });
        });
    }
    group.finish();
}

fn bench_usage_percent(c: &mut Criterion) {
    let previous = CpuTicks::from([10132153, 290696, 3084719, 46828483, 16683, 0, 25195, 0, 175628, 0]);
    let current = CpuTicks::from([10132253, 290706, 3084759, 46828583, 16690, 0, 25199, 0, 175640, 0]);
    c.bench_function("usage_percent", |b| {
        b.iter(|| usage_percent(black_box(&previous), black_box(&current)));
    });
}

criterion_group!(
    benches,
    bench_render_report,
    bench_session_bounding,
    bench_usage_percent
);
criterion_main!(benches);
