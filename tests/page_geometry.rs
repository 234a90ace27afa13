mod common;

use informe_pdf::Report;

fn with_photos(n: usize) -> Report {
    Report {
        photos: (1..=n)
            .map(|i| common::photo(i as u64, &format!("FOTO-{i:02}")))
            .collect(),
        ..Report::default()
    }
}

#[test]
fn pages_are_a4() {
    let pdf = common::render(&Report::default());
    let (w, h) = common::media_box(&pdf);
    assert!((w - 595.3).abs() < 0.5, "width {w}");
    assert!((h - 841.9).abs() < 0.5, "height {h}");
}

#[test]
fn empty_report_renders_exactly_one_page() {
    let pdf = common::render(&Report::default());
    assert_eq!(common::page_count(&pdf), 1);
    assert_eq!(common::page_texts(&pdf).len(), 1);
}

#[test]
fn page_count_is_monotonic_in_photo_count() {
    let mut prev = 0;
    for n in [0, 1, 2, 4, 6, 8, 12] {
        let pdf = common::render(&with_photos(n));
        let pages = common::page_count(&pdf);
        assert!(
            pages >= prev,
            "{n} photos produced {pages} pages, fewer than {prev}"
        );
        prev = pages;
    }
    assert!(prev > 1, "12 photos must spill onto extra pages");
}

#[test]
fn every_page_carries_content() {
    let pdf = common::render(&with_photos(9));
    let texts = common::page_texts(&pdf);
    assert_eq!(texts.len(), common::page_count(&pdf));
    for text in &texts {
        assert!(!text.is_empty());
    }
}
