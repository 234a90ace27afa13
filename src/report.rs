//! Report JSON input layer: parses the exported form state (field values,
//! photos and signatures as data URLs) into the typed report model.
//!
//! Signature and logo images are decoded and validated here — bad bytes fail
//! the parse. Photo bytes are passed through raw so a corrupt photo degrades
//! to the in-document placeholder at render time instead of failing the
//! whole report.

use std::path::Path;

use base64::Engine;
use serde::Deserialize;

use crate::error::Error;
use crate::model::{
    BatteryInfo, ClientInfo, CompanyInfo, ElectricalReadings, EmbeddedImage, ImageFormat,
    PhaseReadings, Photo, Report, ServiceInfo, SignatureBlock,
};

/// A fully parsed report file: the report itself plus the envelope the
/// renderer needs (issuing company, report number, date).
#[derive(Debug)]
pub struct ReportDocument {
    pub report: Report,
    pub company: CompanyInfo,
    pub report_number: u32,
    pub date: String,
}

/// Form values arrive as strings or bare JSON numbers; both display as
/// opaque text (integers without a trailing `.0`).
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    fn into_string(self) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }
}

fn field(value: Option<FieldValue>) -> Option<String> {
    value.map(FieldValue::into_string)
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ClientEntry {
    company: Option<FieldValue>,
    address: Option<FieldValue>,
    city: Option<FieldValue>,
    contact: Option<FieldValue>,
    email: Option<FieldValue>,
    phone: Option<FieldValue>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServiceEntry {
    service_type: Option<FieldValue>,
    equipment_model: Option<FieldValue>,
    equipment_serial: Option<FieldValue>,
    equipment_location: Option<FieldValue>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct PhaseEntry {
    l1: Option<FieldValue>,
    l2: Option<FieldValue>,
    l3: Option<FieldValue>,
    neutral: Option<FieldValue>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ElectricalEntry {
    input_voltage: PhaseEntry,
    input_current: PhaseEntry,
    output_voltage: PhaseEntry,
    output_current: PhaseEntry,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct BatteryEntry {
    voltage_total: Option<FieldValue>,
    voltage_discharge: Option<FieldValue>,
    current_discharge: Option<FieldValue>,
    current_charge: Option<FieldValue>,
    quantity: Option<FieldValue>,
    reference: Option<FieldValue>,
    autonomy: Option<FieldValue>,
    manufacture_date: Option<FieldValue>,
    rectifier_status: Option<FieldValue>,
    charger_status: Option<FieldValue>,
    inverter_status: Option<FieldValue>,
    battery_status: Option<FieldValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotoEntry {
    #[serde(default)]
    id: Option<u64>,
    image: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SignatureEntry {
    image: Option<String>,
    name: Option<FieldValue>,
    id_number: Option<FieldValue>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct CompanyEntry {
    name: String,
    address: String,
    phone: String,
    email: String,
    logo: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportFile {
    report_number: u32,
    date: String,
    #[serde(default)]
    company: CompanyEntry,
    #[serde(default)]
    client: ClientEntry,
    #[serde(default)]
    service: ServiceEntry,
    #[serde(default)]
    electrical: ElectricalEntry,
    #[serde(default)]
    battery: BatteryEntry,
    #[serde(default)]
    description: Option<FieldValue>,
    #[serde(default)]
    recommendations: Option<FieldValue>,
    #[serde(default)]
    photos: Vec<PhotoEntry>,
    #[serde(default)]
    client_signature: SignatureEntry,
    #[serde(default)]
    technician_signature: SignatureEntry,
}

/// Strip the `data:<mime>;base64,` envelope (bare base64 is accepted too)
/// and decode the payload.
fn decode_data_url(value: &str) -> Result<Vec<u8>, Error> {
    let payload = match value.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| Error::InvalidReport("malformed data URL".into()))?;
            if !header.contains("base64") {
                return Ok(data.as_bytes().to_vec());
            }
            data
        }
        None => value,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::InvalidReport(format!("invalid base64 image data: {e}")))
}

fn decode_embedded_image(value: &str, what: &str) -> Result<EmbeddedImage, Error> {
    let data = decode_data_url(value)?;
    let format = match image::guess_format(&data) {
        Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Ok(image::ImageFormat::Png) => ImageFormat::Png,
        Ok(other) => {
            return Err(Error::InvalidReport(format!(
                "{what}: unsupported image format {other:?}"
            )));
        }
        Err(e) => {
            return Err(Error::InvalidReport(format!(
                "{what}: unrecognized image data: {e}"
            )));
        }
    };
    let decoded = image::load_from_memory(&data)
        .map_err(|e| Error::InvalidReport(format!("{what}: failed to decode image: {e}")))?;
    Ok(EmbeddedImage {
        data,
        format,
        pixel_width: decoded.width(),
        pixel_height: decoded.height(),
    })
}

fn convert_signature(entry: SignatureEntry, what: &str) -> Result<SignatureBlock, Error> {
    let image = match entry.image.as_deref().filter(|s| !s.is_empty()) {
        Some(value) => Some(decode_embedded_image(value, what)?),
        None => None,
    };
    Ok(SignatureBlock {
        image,
        name: field(entry.name),
        id_number: field(entry.id_number),
    })
}

fn convert_phase(entry: PhaseEntry) -> PhaseReadings {
    PhaseReadings {
        l1: field(entry.l1),
        l2: field(entry.l2),
        l3: field(entry.l3),
        neutral: field(entry.neutral),
    }
}

pub fn parse(path: &Path) -> Result<ReportDocument, Error> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_bytes(&bytes)
}

pub fn parse_bytes(input: &[u8]) -> Result<ReportDocument, Error> {
    let file: ReportFile = serde_json::from_slice(input)
        .map_err(|e| Error::InvalidReport(format!("not a valid report JSON file: {e}")))?;

    if file.report_number == 0 {
        return Err(Error::InvalidReport(
            "report number must be a positive integer".into(),
        ));
    }

    let logo = match file.company.logo.as_deref().filter(|s| !s.is_empty()) {
        Some(value) => Some(decode_embedded_image(value, "company logo")?),
        None => None,
    };
    let company = CompanyInfo {
        name: file.company.name,
        address: file.company.address,
        phone: file.company.phone,
        email: file.company.email,
        logo,
    };

    let mut photos = Vec::with_capacity(file.photos.len());
    let mut next_id = 1u64;
    for entry in file.photos {
        let id = entry.id.unwrap_or(next_id);
        next_id = next_id.max(id) + 1;
        let data = match decode_data_url(&entry.image) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("photo {id}: {e}; will render as placeholder");
                Vec::new()
            }
        };
        photos.push(Photo {
            id,
            data,
            description: entry.description.unwrap_or_default(),
        });
    }

    let report = Report {
        client: ClientInfo {
            company: field(file.client.company),
            address: field(file.client.address),
            city: field(file.client.city),
            contact: field(file.client.contact),
            email: field(file.client.email),
            phone: field(file.client.phone),
        },
        service: ServiceInfo {
            service_type: field(file.service.service_type),
            equipment_model: field(file.service.equipment_model),
            equipment_serial: field(file.service.equipment_serial),
            equipment_location: field(file.service.equipment_location),
        },
        electrical: ElectricalReadings {
            input_voltage: convert_phase(file.electrical.input_voltage),
            input_current: convert_phase(file.electrical.input_current),
            output_voltage: convert_phase(file.electrical.output_voltage),
            output_current: convert_phase(file.electrical.output_current),
        },
        battery: BatteryInfo {
            voltage_total: field(file.battery.voltage_total),
            voltage_discharge: field(file.battery.voltage_discharge),
            current_discharge: field(file.battery.current_discharge),
            current_charge: field(file.battery.current_charge),
            quantity: field(file.battery.quantity),
            reference: field(file.battery.reference),
            autonomy: field(file.battery.autonomy),
            manufacture_date: field(file.battery.manufacture_date),
            rectifier_status: field(file.battery.rectifier_status),
            charger_status: field(file.battery.charger_status),
            inverter_status: field(file.battery.inverter_status),
            battery_status: field(file.battery.battery_status),
        },
        description: field(file.description),
        recommendations: field(file.recommendations),
        photos,
        client_signature: convert_signature(file.client_signature, "client signature")?,
        technician_signature: convert_signature(file.technician_signature, "technician signature")?,
    };

    Ok(ReportDocument {
        report,
        company,
        report_number: file.report_number,
        date: file.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_envelope_is_stripped() {
        let decoded = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(decoded, b"hello");
        // bare base64 is accepted too
        assert_eq!(decode_data_url("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn malformed_data_url_is_rejected() {
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn numeric_fields_display_as_entered() {
        assert_eq!(FieldValue::Number(220.0).into_string(), "220");
        assert_eq!(FieldValue::Number(219.7).into_string(), "219.7");
        assert_eq!(FieldValue::Text("0.0".into()).into_string(), "0.0");
    }

    #[test]
    fn report_number_must_be_positive() {
        let err = parse_bytes(br#"{"reportNumber": 0, "date": "1/1/2026"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidReport(_)));
    }

    #[test]
    fn minimal_report_parses() {
        let doc = parse_bytes(br#"{"reportNumber": 3, "date": "1/1/2026"}"#).unwrap();
        assert_eq!(doc.report_number, 3);
        assert!(doc.report.photos.is_empty());
        assert!(doc.report.client.company.is_none());
    }

    #[test]
    fn numbers_accepted_in_phase_readings() {
        let doc = parse_bytes(
            br#"{
                "reportNumber": 1,
                "date": "1/1/2026",
                "electrical": {"inputVoltage": {"l1": 220, "l2": "221", "l3": 219.5}}
            }"#,
        )
        .unwrap();
        let iv = &doc.report.electrical.input_voltage;
        assert_eq!(iv.l1.as_deref(), Some("220"));
        assert_eq!(iv.l2.as_deref(), Some("221"));
        assert_eq!(iv.l3.as_deref(), Some("219.5"));
        assert!(iv.neutral.is_none());
    }
}
