use std::hint::black_box;
use bencher::{encode, text_payload};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use http::header::CONTENT_ENCODING;
use http::{HeaderValue, Response};
use http_body_util::BodyExt;
use micro_decompress::{decompress_response, ContentCoding};
use micro_transport::protocol::body::ResponseBody;
use tokio::runtime::Runtime;

const PAYLOAD_SIZE: usize = 64 * 1024;

fn compressed_response(coding: ContentCoding, body: &[u8]) -> Response<ResponseBody> {
    let mut response = Response::new(ResponseBody::from(body.to_vec()));
    response.headers_mut().insert(CONTENT_ENCODING, HeaderValue::from_static(coding.name()));
    response
}

fn benchmark_decompress(criterion: &mut Criterion) {
    let runtime = Runtime::new().expect("failed to build tokio runtime");
    let plaintext = text_payload(PAYLOAD_SIZE);
    let mut group = criterion.benchmark_group("decompress_response");
    group.throughput(Throughput::Bytes(PAYLOAD_SIZE as u64));

    for coding in [ContentCoding::Gzip, ContentCoding::Deflate, ContentCoding::Br] {
        let compressed = encode(coding, &plaintext);
        group.bench_with_input(BenchmarkId::from_parameter(coding), &compressed, |b, compressed| {
            b.iter_batched(
                || compressed_response(coding, compressed),
                |response| {
                    runtime.block_on(async {
                        let response = decompress_response::<std::io::Error>(response).await.expect("body should be valid");
                        let bytes = response.into_body().collect().await.expect("body should decode").to_bytes();
                        black_box(bytes);
                    });
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(decompress, benchmark_decompress);
criterion_main!(decompress);
