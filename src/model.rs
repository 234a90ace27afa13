//! Typed report model consumed by the renderer.
//!
//! Every value-bearing field is an opaque optional string: the renderer
//! displays what the technician entered and performs no unit conversion or
//! range validation. A missing value renders as the dash placeholder.

/// Client contact fields. Only filled-in fields produce a row in the
/// rendered report.
#[derive(Clone, Debug, Default)]
pub struct ClientInfo {
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ServiceInfo {
    pub service_type: Option<String>,
    pub equipment_model: Option<String>,
    pub equipment_serial: Option<String>,
    pub equipment_location: Option<String>,
}

/// One reading per phase conductor. `neutral` covers the fourth column
/// (phase-to-phase or neutral-to-ground depending on the group).
#[derive(Clone, Debug, Default)]
pub struct PhaseReadings {
    pub l1: Option<String>,
    pub l2: Option<String>,
    pub l3: Option<String>,
    pub neutral: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ElectricalReadings {
    pub input_voltage: PhaseReadings,
    pub input_current: PhaseReadings,
    pub output_voltage: PhaseReadings,
    pub output_current: PhaseReadings,
}

#[derive(Clone, Debug, Default)]
pub struct BatteryInfo {
    pub voltage_total: Option<String>,
    pub voltage_discharge: Option<String>,
    pub current_discharge: Option<String>,
    pub current_charge: Option<String>,
    pub quantity: Option<String>,
    pub reference: Option<String>,
    pub autonomy: Option<String>,
    pub manufacture_date: Option<String>,
    pub rectifier_status: Option<String>,
    pub charger_status: Option<String>,
    pub inverter_status: Option<String>,
    pub battery_status: Option<String>,
}

/// A captured photo. The bytes are kept as delivered (typically JPEG from a
/// phone camera) and decoded only during rendering, so one corrupt photo
/// degrades to an in-document placeholder instead of failing the whole
/// report.
#[derive(Clone, Debug)]
pub struct Photo {
    pub id: u64,
    pub data: Vec<u8>,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// A decoded, validated image (signature strokes, company logo).
/// Construction goes through the input layer, which rejects bytes that do
/// not decode.
#[derive(Clone)]
pub struct EmbeddedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl std::fmt::Debug for EmbeddedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedImage")
            .field("format", &self.format)
            .field("pixel_width", &self.pixel_width)
            .field("pixel_height", &self.pixel_height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignatureBlock {
    pub image: Option<EmbeddedImage>,
    pub name: Option<String>,
    pub id_number: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo: Option<EmbeddedImage>,
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    pub client: ClientInfo,
    pub service: ServiceInfo,
    pub electrical: ElectricalReadings,
    pub battery: BatteryInfo,
    pub description: Option<String>,
    pub recommendations: Option<String>,
    pub photos: Vec<Photo>,
    pub client_signature: SignatureBlock,
    pub technician_signature: SignatureBlock,
}

/// Device class the report was produced on; only visible in the exported
/// file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Mobile => "mobile",
        }
    }
}

impl std::str::FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(DeviceClass::Desktop),
            "mobile" => Ok(DeviceClass::Mobile),
            other => Err(format!("unknown device class: {other}")),
        }
    }
}
