use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use xmltok::{Config, TokenPool, Tokenizer};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const POINTS: usize = 20_000;

fn make_gpx(points: usize) -> Vec<u8> {
    let mut doc = String::with_capacity(points * 160);
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    doc.push_str("<gpx version=\"1.1\" creator=\"bench\"><trk><name>Ride</name><trkseg>\n");
    for i in 0..points {
        doc.push_str(&format!(
            "<trkpt lat=\"-7.{i:07}\" lon=\"110.{i:07}\"><ele>{}.4</ele><time>2021-08-01T06:00:00Z</time>\
             <extensions><gpxtpx:TrackPointExtension><gpxtpx:hr>{}</gpxtpx:hr></gpxtpx:TrackPointExtension></extensions></trkpt>\n",
            i % 900,
            60 + i % 120
        ));
    }
    doc.push_str("</trkseg></trk></gpx>\n");
    doc.into_bytes()
}

fn bench_next_token(c: &mut Criterion) {
    let input = make_gpx(POINTS);
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("next_token", |b| {
        let mut tok = Tokenizer::new(&input[..]);
        b.iter(|| {
            tok.reset(black_box(&input[..]), Config::default());
            let mut attrs = 0;
            while let Some(token) = tok.next_token().unwrap() {
                attrs += token.attrs().len();
            }
            black_box(attrs);
        });
    });

    group.bench_function("next_raw_span", |b| {
        let mut tok = Tokenizer::new(&input[..]);
        b.iter(|| {
            tok.reset(black_box(&input[..]), Config::default());
            let mut spans = 0;
            while tok.next_raw_span().unwrap().is_some() {
                spans += 1;
            }
            black_box(spans);
        });
    });

    group.bench_function("fresh_tokenizer_small_chunks", |b| {
        let config = Config::default().with_read_chunk_size(512);
        b.iter_batched(
            || Tokenizer::with_config(&input[..], config),
            |mut tok| {
                let mut count = 0;
                while tok.next_token().unwrap().is_some() {
                    count += 1;
                }
                black_box(count)
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_pooled_copies(c: &mut Criterion) {
    let input = make_gpx(POINTS);
    let pool = TokenPool::new();
    c.bench_function("pooled_trkpt_copies", |b| {
        let mut tok = Tokenizer::new(&input[..]);
        b.iter(|| {
            tok.reset(&input[..], Config::default());
            let mut lat_bytes = 0;
            while let Some(token) = tok.next_token().unwrap() {
                if token.name().local != b"trkpt" || token.is_end_element() {
                    continue;
                }
                let copy = pool.acquire_copy(&token);
                lat_bytes += copy.as_token().attr(b"lat").map_or(0, <[u8]>::len);
                pool.release(copy);
            }
            black_box(lat_bytes);
        });
    });
}

criterion_group!(benches, bench_next_token, bench_pooled_copies);
criterion_main!(benches);
