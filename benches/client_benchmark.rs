use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use sigstat::{CheckGateOptions, Client, MapGateSource, User};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn check_gate_bench(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let client = {
        // The client spawns its background tasks on build.
        let _guard = runtime.enter();
        Arc::new(
            Client::builder("secret-key")
                .local_gates(Box::new(MapGateSource::from([("testKey", true)])))
                .build()
                .unwrap(),
        )
    };
    c.bench_function("check_gate", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut handles = Vec::new();
            for i in 0..200 {
                let cl = client.clone();
                handles.push(tokio::spawn(async move {
                    let user = User::new(format!("user-{i}").as_str());
                    cl.check_gate_with_options("testKey", &user, CheckGateOptions::new(true)).await;
                }));
            }
            for handle in handles {
                handle.await.unwrap();
            }
        });
    });
}

criterion_group!(benches, check_gate_bench);
criterion_main!(benches);
