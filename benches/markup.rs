// benches/markup.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use parcelwatch::classify;
use parcelwatch::grammar::parse_opening_hours;
use parcelwatch::markup::{parse_rows, parse_store};

/// A history table with `n` rows, cell order shuffled the way some carriers
/// render them.
fn history(n: usize) -> String {
    let mut html = String::from(
        r#"<table class="mm_event_table"><thead><tr><th>Datum/Uhrzeit</th><th>Ort</th><th>Status</th></tr></thead><tbody>"#,
    );
    for i in 0..n {
        html.push_str(&format!(
            concat!(
                r#"<tr><td data-label="Ort">Hub {i}<br>Germany</td>"#,
                r#"<td data-label="Datum/Uhrzeit">{d:02}.02.2020 {h:02}:15</td>"#,
                r#"<td data-label="Status">The shipment has been processed in the parcel center &amp; sorted</td></tr>"#,
            ),
            i = i,
            d = 1 + i % 28,
            h = i % 24,
        ));
    }
    html.push_str("</tbody></table>");
    html
}

const BRANCH: &str = r#"
<table class="address"><tr><td><b>Adresse</b></td></tr><tr><td>Postfiliale 1010</td></tr>
<tr><td>Fleischmarkt 19</td></tr><tr><td>1010 Wien</td></tr></table>
<table class="contact"><tr><td><b>Telefon:</b> +43 577 677 1010</td></tr></table>
<table class="hours"><tr><td>Mo. - Fr.:</td><td>08:00 - 12:00</td><td>13:00 - 18:00</td></tr>
<tr><td>Sa.:</td><td>09:00 - 12:00</td></tr></table>"#;

fn bench_markup(c: &mut Criterion) {
    let small = history(10);
    let large = history(500);

    c.bench_function("rows_10", |b| {
        b.iter(|| {
            let rows = parse_rows(black_box(&small), classify::dhl::LABELS).map(|r| r.len());
            black_box(rows.ok())
        })
    });

    c.bench_function("rows_500", |b| {
        b.iter(|| {
            let rows = parse_rows(black_box(&large), classify::dhl::LABELS).map(|r| r.len());
            black_box(rows.ok())
        })
    });

    c.bench_function("store_detail", |b| {
        b.iter(|| {
            let sections = parse_store(black_box(BRANCH)).ok();
            black_box(sections.and_then(|s| s.hours_text()).map(|h| parse_opening_hours(&h).is_ok()))
        })
    });
}

criterion_group!(benches, bench_markup);
criterion_main!(benches);
