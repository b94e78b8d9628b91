use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use html_sanitizer::{AllowList, Sanitizer};

const ALLOWED: &str = "html|body|div|p|a|b|i|em|strong|ul|li|img|br|style";

fn article(paragraphs: usize) -> String {
    let mut html = String::from("<style>p { margin: 0 }</style><div class=\"article\">");
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<p onclick=\"track({i})\">Paragraph {i} with <a href=\"/p/{i}\">a link</a>, \
             <b>bold</b> text and <script>evil({i})</script><img src=\"{i}.png\" onerror=\"x()\"></p>"
        ));
    }
    html.push_str("<ul><li style=\"width:expression(alert(1))\">item</li></ul></div>");
    html
}

fn bench_sanitize(c: &mut Criterion) {
    let sanitizer = Sanitizer::with_allow_list(AllowList::parse_delimited(ALLOWED));
    let mut group = c.benchmark_group("sanitize");

    for paragraphs in [10, 100, 1000] {
        let html = article(paragraphs);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_function(format!("article_{paragraphs}"), |b| {
            b.iter(|| sanitizer.sanitize(black_box(&html)))
        });
    }

    let html = article(100);
    group.bench_function("bytes_latin1", |b| {
        b.iter(|| {
            sanitizer.sanitize_bytes(
                black_box(html.as_bytes()),
                Some("text/html; charset=iso-8859-1"),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sanitize);
criterion_main!(benches);
