use std::sync::Arc;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use once_cell::sync::Lazy;
use sigv2_aws::{canonicalize, Config, Credential, RequestSigner};
use sigv2_core::{Context, SignRequest};

criterion_group!(benches, bench);
criterion_main!(benches);

static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("must success")
});

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("aws_v2");

    group.bench_function("sign_request", |b| {
        let cred = Credential::new("access_key_id", "secret_access_key");
        let config = Config::new()
            .with_param("Service", "AWSECommerceService")
            .with_param("Version", "2011-08-01");
        let s = RequestSigner::new(Arc::new(config));
        let ctx = Context::new();

        b.to_async(&*RUNTIME).iter(|| async {
            let mut req = http::Request::new("");
            *req.method_mut() = http::Method::GET;
            *req.uri_mut() = "http://webservices.amazon.com/onca/xml?Operation=ItemLookup&ItemId=0816614024"
                .parse()
                .expect("url must be valid");

            let (mut parts, _) = req.into_parts();
            s.sign_request(&ctx, &mut parts, None, Some(&cred))
                .await
                .expect("must success")
        })
    });

    group.bench_function("canonicalize", |b| {
        let pairs: Vec<(String, String)> = (0..32)
            .map(|i| (format!("Param.{i}"), format!("value with spaces/{i}")))
            .collect();

        b.iter(|| canonicalize(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))))
    });

    group.finish()
}
