mod common;

use std::time::{SystemTime, UNIX_EPOCH};

use informe_pdf::{DeviceClass, Report, SignatureBlock};

fn rich_report() -> Report {
    Report {
        description: Some("Mantenimiento preventivo completo.".into()),
        recommendations: Some("Revisar ventilación del cuarto técnico.".into()),
        photos: vec![common::photo(1, "tablero"), common::photo(2, "baterías")],
        client_signature: SignatureBlock {
            image: Some(common::png_signature()),
            name: Some("María Díaz".into()),
            id_number: Some("52.431.880".into()),
        },
        ..Report::default()
    }
}

#[test]
fn rendering_is_deterministic() {
    let report = rich_report();
    let first = common::render(&report);
    let second = common::render(&report);
    assert_eq!(first, second, "same input must produce identical bytes");
}

#[test]
fn artifact_name_encodes_number_and_device() {
    assert_eq!(
        informe_pdf::report_file_name(7, DeviceClass::Mobile),
        "reporte-tecnico-0007-mobile.pdf"
    );
    assert_eq!(
        informe_pdf::report_file_name(1234, DeviceClass::Desktop),
        "reporte-tecnico-1234-desktop.pdf"
    );
}

#[test]
fn export_writes_artifact_under_encoded_name() {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let out_dir = std::env::temp_dir().join(format!("informe-pdf-test-{stamp}"));
    std::fs::create_dir_all(&out_dir).unwrap();

    let report = rich_report();
    let path = informe_pdf::export_report(
        &report,
        &common::sample_company(),
        42,
        "7/8/2026",
        DeviceClass::Mobile,
        &out_dir,
    )
    .expect("export");

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "reporte-tecnico-0042-mobile.pdf"
    );
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    std::fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn signature_image_replaces_placeholder_but_keeps_name_lines() {
    let pdf = common::render(&rich_report());
    let text = common::document_text(&pdf);
    assert!(text.contains("María Díaz"));
    assert!(text.contains("52.431.880"));
    // Technician slot stays empty and falls back.
    assert!(text.contains("Nombre del Técnico"));
}
