use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringlog_rs::{Level, LogBuffer, Logger, WriteError};
use std::thread;

const RECORDS: u64 = 100_000;
const PAYLOAD: &[u8] = b"benchmark payload bytes!"; // 24 bytes

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");
    group.throughput(Throughput::Elements(RECORDS));

    group.bench_function("write_then_drain", |b| {
        let mut storage = Box::new(LogBuffer::<65536>::new());
        let log = Logger::new(storage.as_mut_slice()).unwrap();
        let mut consumer = log.consumer().unwrap();
        let mut out = [0u8; 64];

        b.iter(|| {
            for i in 0..RECORDS {
                log.write_raw(Level::Info, i as u32, black_box(PAYLOAD)).unwrap();
                let d = consumer.read(&mut out).unwrap();
                black_box(d.len);
            }
        });
    });

    group.finish();
}

fn bench_mpsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpsc");

    for num_producers in [2, 4, 8] {
        let total = RECORDS * num_producers as u64;
        group.throughput(Throughput::Elements(total));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_producers}P_1C")),
            &num_producers,
            |b, &n| {
                b.iter(|| {
                    let mut storage = Box::new(LogBuffer::<65536>::new());
                    let log = Logger::new(storage.as_mut_slice()).unwrap();
                    let mut consumer = log.consumer().unwrap();

                    thread::scope(|s| {
                        for _ in 0..n {
                            let log = &log;
                            s.spawn(move || {
                                for i in 0..RECORDS {
                                    loop {
                                        match log.write_raw(Level::Info, i as u32, PAYLOAD) {
                                            Ok(()) => break,
                                            Err(WriteError::Full) => std::hint::spin_loop(),
                                            Err(err) => panic!("write failed: {err}"),
                                        }
                                    }
                                }
                            });
                        }

                        s.spawn(move || {
                            let mut out = [0u8; 64];
                            let mut drained = 0u64;
                            while drained < RECORDS * n as u64 {
                                match consumer.read(&mut out) {
                                    Ok(d) => {
                                        black_box(d.len);
                                        drained += 1;
                                    }
                                    Err(err) if err.is_transient() => std::hint::spin_loop(),
                                    Err(err) => panic!("drain failed: {err}"),
                                }
                            }
                        });
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_round_trip, bench_mpsc);
criterion_main!(benches);
