//! Section renderers for the report. Sections are laid out top-to-bottom in
//! a fixed order; each computes its height and asks the cursor for room
//! before drawing, so no single item is ever split across a page boundary.

use pdf_writer::{Content, Name};

use crate::fonts::FontBook;
use crate::model::{
    BatteryInfo, ClientInfo, CompanyInfo, ElectricalReadings, EmbeddedImage, PhaseReadings, Photo,
    ServiceInfo, SignatureBlock,
};

use super::PhotoPlacement;
use super::layout::{
    CONTENT_WIDTH, MARGIN, MM, PAGE_WIDTH, PageCursor, ROW_H, draw_text, draw_text_centered,
    draw_text_right, truncate_caption, wrap_text,
};

const TITLE_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;

const HEADER_H: f32 = 30.0 * MM;
const ELECTRICAL_CELL_H: f32 = 7.0 * MM;
const PHOTO_PAD: f32 = 5.0 * MM;
const PHOTO_DESC_H: f32 = 8.0 * MM;

/// Missing and empty values both render as the dash placeholder — a field is
/// never shown blank.
fn value_or_dash(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

fn draw_image(content: &mut Content, name: &str, x: f32, y_top: f32, w: f32, h: f32) {
    content.save_state();
    content.transform([w, 0.0, 0.0, h, x, y_top - h]);
    content.x_object(Name(name.as_bytes()));
    content.restore_state();
}

/// Page header: logo at left, report title/number/date centered, company
/// contact block right-aligned, rule underneath. Fixed 30 mm band plus a
/// 5 mm gap.
pub(super) fn draw_header(
    cur: &mut PageCursor,
    fonts: &FontBook,
    company: &CompanyInfo,
    logo: Option<(&str, &EmbeddedImage)>,
    report_number: u32,
    date: &str,
) {
    let y = cur.y();
    let content = cur.content();

    if let Some((name, img)) = logo {
        let max_w = 40.0 * MM;
        let max_h = 20.0 * MM;
        let pw = img.pixel_width.max(1) as f32;
        let ph = img.pixel_height.max(1) as f32;
        let scale = (max_w / pw).min(max_h / ph);
        draw_image(content, name, MARGIN, y, pw * scale, ph * scale);
    }

    let center_x = PAGE_WIDTH / 2.0;
    draw_text_centered(content, &fonts.bold, TITLE_SIZE, center_x, y - 6.0 * MM, "Reporte Técnico");
    draw_text_centered(
        content,
        &fonts.regular,
        11.0,
        center_x,
        y - 12.0 * MM,
        &format!("N° Reporte: {report_number:04}"),
    );
    draw_text_centered(
        content,
        &fonts.regular,
        9.0,
        center_x,
        y - 17.0 * MM,
        &format!("Fecha: {date}"),
    );

    let right_x = PAGE_WIDTH - MARGIN;
    draw_text_right(content, &fonts.bold, 12.0, right_x, y - 6.0 * MM, &company.name);
    draw_text_right(content, &fonts.regular, 9.0, right_x, y - 11.0 * MM, &company.address);
    draw_text_right(content, &fonts.regular, 9.0, right_x, y - 15.0 * MM, &company.phone);
    draw_text_right(content, &fonts.regular, 9.0, right_x, y - 19.0 * MM, &company.email);

    content.save_state();
    content.set_line_width(0.75);
    content.set_stroke_rgb(0.6, 0.6, 0.6);
    content.move_to(MARGIN, y - HEADER_H);
    content.line_to(PAGE_WIDTH - MARGIN, y - HEADER_H);
    content.stroke();
    content.restore_state();

    cur.advance(HEADER_H + 5.0 * MM);
}

/// Client info: `Label: value` rows for the fields the technician filled
/// in, split into two columns (first column gets ceil(n/2) items).
pub(super) fn draw_client_info(cur: &mut PageCursor, fonts: &FontBook, client: &ClientInfo) {
    let fields: [(&str, &Option<String>); 6] = [
        ("Empresa", &client.company),
        ("Dirección", &client.address),
        ("Ciudad", &client.city),
        ("Contacto", &client.contact),
        ("Correo", &client.email),
        ("Teléfono", &client.phone),
    ];
    let entries: Vec<(&str, &str)> = fields
        .iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (*label, v))
        })
        .collect();
    let per_column = entries.len().div_ceil(2);
    let rows = per_column as f32;

    cur.ensure_room(7.0 * MM + rows * ROW_H + 10.0 * MM);
    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Información del Cliente");
    cur.advance(7.0 * MM);

    let col_w = CONTENT_WIDTH / 2.0;
    let top = cur.y();
    let content = cur.content();
    for (i, (label, value)) in entries.iter().enumerate() {
        let x = MARGIN + if i < per_column { 0.0 } else { col_w };
        let row = i % per_column;
        let text = format!("{label}: {value}");
        draw_text(content, &fonts.regular, BODY_SIZE, x, top - row as f32 * ROW_H, &text);
    }

    cur.advance(rows * ROW_H + 10.0 * MM);
}

/// Service details: one shaded row with four equal cells.
pub(super) fn draw_service_details(cur: &mut PageCursor, fonts: &FontBook, service: &ServiceInfo) {
    let row_h = ROW_H * 1.5;
    cur.ensure_room(7.0 * MM + row_h + 5.0 * MM);

    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Detalles del Servicio");
    cur.advance(7.0 * MM);

    let top = cur.y();
    let content = cur.content();
    content.set_fill_gray(245.0 / 255.0);
    content.rect(MARGIN, top - row_h, CONTENT_WIDTH, row_h).fill_nonzero();
    content.set_fill_gray(0.0);

    let cells: [(&str, &Option<String>); 4] = [
        ("Servicio", &service.service_type),
        ("Modelo Equipo", &service.equipment_model),
        ("Serial Equipo", &service.equipment_serial),
        ("Ubicacion", &service.equipment_location),
    ];
    let cell_w = CONTENT_WIDTH / 4.0;
    for (i, (label, value)) in cells.iter().enumerate() {
        let x = MARGIN + i as f32 * cell_w;
        let text = format!("{label}: {}", value_or_dash(value));
        draw_text(content, &fonts.regular, 8.0, x + 3.0 * MM, top - ROW_H * 0.8, &text);
    }

    cur.advance(row_h + 5.0 * MM);
}

/// One electrical group: bold caption, shaded header row with the fixed
/// phase labels, one centered data row beneath. Header and data rows are
/// atomic — the room check covers the whole table.
fn draw_parameter_table(
    cur: &mut PageCursor,
    fonts: &FontBook,
    title: &str,
    readings: &PhaseReadings,
) {
    const PHASE_LABELS: [&str; 4] = ["L1", "L2", "L3", "N/T"];
    let table_h = 2.0 * ELECTRICAL_CELL_H + 2.0 * MM;
    cur.ensure_room(table_h);

    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, BODY_SIZE, MARGIN, y, title);

    content.set_fill_gray(240.0 / 255.0);
    content
        .rect(
            MARGIN,
            y - 2.0 * MM - ELECTRICAL_CELL_H,
            CONTENT_WIDTH,
            ELECTRICAL_CELL_H,
        )
        .fill_nonzero();
    content.set_fill_gray(0.0);

    let cell_w = CONTENT_WIDTH / 4.0;
    for (i, label) in PHASE_LABELS.iter().enumerate() {
        let center_x = MARGIN + i as f32 * cell_w + cell_w / 2.0;
        draw_text_centered(
            content,
            &fonts.regular,
            BODY_SIZE,
            center_x,
            y - ELECTRICAL_CELL_H,
            label,
        );
    }
    let values = [&readings.l1, &readings.l2, &readings.l3, &readings.neutral];
    for (i, value) in values.iter().enumerate() {
        let center_x = MARGIN + i as f32 * cell_w + cell_w / 2.0;
        draw_text_centered(
            content,
            &fonts.regular,
            BODY_SIZE,
            center_x,
            y - 2.0 * ELECTRICAL_CELL_H,
            value_or_dash(value),
        );
    }

    cur.advance(table_h);
}

pub(super) fn draw_electrical_tables(
    cur: &mut PageCursor,
    fonts: &FontBook,
    electrical: &ElectricalReadings,
) {
    cur.ensure_room(7.0 * MM + 2.0 * ELECTRICAL_CELL_H + 2.0 * MM);
    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Parámetros Eléctricos");
    cur.advance(7.0 * MM);

    let groups: [(&str, &PhaseReadings); 4] = [
        ("Voltaje de Entrada (V)", &electrical.input_voltage),
        ("Corriente de Entrada (A)", &electrical.input_current),
        ("Voltaje de Salida (V)", &electrical.output_voltage),
        ("Corriente de Salida (A)", &electrical.output_current),
    ];
    for (i, (title, readings)) in groups.iter().enumerate() {
        if i > 0 {
            cur.advance(3.0 * MM);
        }
        draw_parameter_table(cur, fonts, title, readings);
    }
}

/// Battery parameters: twelve `Label: value` items, three per row.
pub(super) fn draw_battery_grid(cur: &mut PageCursor, fonts: &FontBook, battery: &BatteryInfo) {
    let items: [(&str, &Option<String>); 12] = [
        ("Voltaje Total (V)", &battery.voltage_total),
        ("Voltaje Descarga (V)", &battery.voltage_discharge),
        ("Corriente Descarga (A)", &battery.current_discharge),
        ("Corriente Carga (A)", &battery.current_charge),
        ("Cantidad", &battery.quantity),
        ("Referencia (Ah)", &battery.reference),
        ("Autonomía (min)", &battery.autonomy),
        ("Fecha Bateria", &battery.manufacture_date),
        ("Rectificador", &battery.rectifier_status),
        ("Cargador", &battery.charger_status),
        ("Inversor", &battery.inverter_status),
        ("Bateria", &battery.battery_status),
    ];
    let row_pitch = ROW_H * 1.2;
    let grid_h = 4.0 * row_pitch;

    cur.ensure_room(10.0 * MM + 7.0 * MM + grid_h + 5.0 * MM);
    cur.advance(10.0 * MM);

    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Parámetros de Baterías");
    cur.advance(7.0 * MM);

    let top = cur.y();
    let col_w = CONTENT_WIDTH / 3.0;
    let content = cur.content();
    for (i, (label, value)) in items.iter().enumerate() {
        let col = i % 3;
        let row = i / 3;
        let x = MARGIN + col as f32 * col_w;
        let text = format!("{label}: {}", value_or_dash(value));
        draw_text(content, &fonts.regular, BODY_SIZE, x, top - row as f32 * row_pitch, &text);
    }

    cur.advance(grid_h + 5.0 * MM);
}

/// Shaded free-text block: grey background sized from the wrapped line
/// count, light border, text inset from the top-left corner. Returns the
/// block height (callers advance past their own trailing gap).
fn draw_shaded_text_block(cur: &mut PageCursor, fonts: &FontBook, lines: &[String]) -> f32 {
    let block_h = lines.len() as f32 * ROW_H + 10.0 * MM;
    let top = cur.y();
    let content = cur.content();

    content.set_fill_gray(245.0 / 255.0);
    content.rect(MARGIN, top - block_h, CONTENT_WIDTH, block_h).fill_nonzero();
    content.set_fill_gray(0.0);
    content.save_state();
    content.set_stroke_rgb(220.0 / 255.0, 220.0 / 255.0, 220.0 / 255.0);
    content.rect(MARGIN, top - block_h, CONTENT_WIDTH, block_h).stroke();
    content.restore_state();

    for (i, line) in lines.iter().enumerate() {
        draw_text(
            content,
            &fonts.regular,
            BODY_SIZE,
            MARGIN + 5.0 * MM,
            top - 7.0 * MM - i as f32 * ROW_H,
            line,
        );
    }

    cur.advance(block_h);
    block_h
}

fn wrapped_body(fonts: &FontBook, text: Option<&str>) -> Option<Vec<String>> {
    let text = text.filter(|t| !t.trim().is_empty())?;
    Some(wrap_text(text, &fonts.regular, BODY_SIZE, CONTENT_WIDTH - 10.0 * MM))
}

/// Work description: the title is always drawn; the shaded body only when
/// there is text.
pub(super) fn draw_work_description(cur: &mut PageCursor, fonts: &FontBook, text: Option<&str>) {
    let body = wrapped_body(fonts, text);
    let body_h = body
        .as_ref()
        .map(|lines| lines.len() as f32 * ROW_H + 10.0 * MM + 5.0 * MM)
        .unwrap_or(0.0);
    cur.ensure_room(7.0 * MM + body_h);

    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Descripción del Trabajo");
    cur.advance(7.0 * MM);

    if let Some(lines) = body {
        draw_shaded_text_block(cur, fonts, &lines);
        cur.advance(5.0 * MM);
    }
}

/// Recommendations: the whole section (title included) is skipped when
/// empty.
pub(super) fn draw_recommendations(cur: &mut PageCursor, fonts: &FontBook, text: Option<&str>) {
    let Some(lines) = wrapped_body(fonts, text) else {
        return;
    };
    let body_h = lines.len() as f32 * ROW_H + 10.0 * MM;
    cur.ensure_room(7.0 * MM + body_h + 10.0 * MM);

    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Recomendaciones");
    cur.advance(7.0 * MM);

    draw_shaded_text_block(cur, fonts, &lines);
    cur.advance(10.0 * MM);
}

/// Photo grid: two cells per row, page-relative row index. A photo whose
/// bottom edge would cross the bottom margin moves the whole grid remainder
/// to a fresh page. Failed decodes render the placeholder cell and layout
/// continues with the remaining photos.
pub(super) fn draw_photo_grid(
    cur: &mut PageCursor,
    fonts: &FontBook,
    photos: &[Photo],
    placements: &[PhotoPlacement],
) {
    if photos.is_empty() {
        return;
    }

    let cell_w = (CONTENT_WIDTH - PHOTO_PAD) / 2.0;
    let photo_h = cell_w * 0.75;
    let block_h = photo_h + PHOTO_DESC_H + 5.0 * MM;
    // Character budget for the one-line caption, from the cell width in mm.
    let caption_budget = (cell_w / MM / 1.8).floor() as usize;

    cur.ensure_room(10.0 * MM + block_h);
    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Registro Fotográfico");
    cur.advance(10.0 * MM);

    let mut grid_top = cur.y();
    let mut row = 0usize;

    for (index, (photo, placement)) in photos.iter().zip(placements.iter()).enumerate() {
        let col = index % 2;
        if col == 0 && index > 0 {
            row += 1;
        }

        let mut top = grid_top - row as f32 * block_h;
        if top - block_h < MARGIN {
            cur.break_page();
            grid_top = cur.y();
            row = 0;
            top = grid_top;
        }

        let x = MARGIN + col as f32 * (cell_w + PHOTO_PAD);
        let center_x = x + cell_w / 2.0;
        let content = cur.content();

        match placement {
            PhotoPlacement::Placed(name) => {
                draw_image(content, name, x, top, cell_w, photo_h);

                content.save_state();
                content.set_stroke_rgb(200.0 / 255.0, 200.0 / 255.0, 200.0 / 255.0);
                content.rect(x, top - photo_h, cell_w, photo_h).stroke();
                content.restore_state();

                content.set_fill_gray(245.0 / 255.0);
                content
                    .rect(x, top - photo_h - PHOTO_DESC_H, cell_w, PHOTO_DESC_H)
                    .fill_nonzero();
                content.set_fill_gray(0.0);

                let caption_src = if photo.description.is_empty() {
                    format!("Foto {}", index + 1)
                } else {
                    photo.description.clone()
                };
                let caption = truncate_caption(&caption_src, caption_budget);
                draw_text_centered(
                    content,
                    &fonts.regular,
                    8.0,
                    center_x,
                    top - photo_h - 5.0 * MM,
                    &caption,
                );
            }
            PhotoPlacement::Failed => {
                content.set_fill_gray(240.0 / 255.0);
                content.rect(x, top - photo_h, cell_w, photo_h).fill_nonzero();
                content.set_fill_gray(0.0);
                draw_text_centered(
                    content,
                    &fonts.regular,
                    BODY_SIZE,
                    center_x,
                    top - photo_h / 2.0,
                    "Error al cargar imagen",
                );
            }
        }
    }

    // Rows placed on the final page, plus the trailing gap.
    cur.advance((row + 1) as f32 * block_h + 10.0 * MM);
}

/// Signature blocks: two side-by-side slots of equal width, label above,
/// image or empty bordered placeholder, name and identification lines
/// below (with fallback text when the fields are empty).
pub(super) fn draw_signatures(
    cur: &mut PageCursor,
    fonts: &FontBook,
    client: &SignatureBlock,
    client_image: Option<&str>,
    technician: &SignatureBlock,
    technician_image: Option<&str>,
) {
    let sig_w = (CONTENT_WIDTH - 10.0 * MM) / 2.0;
    let sig_h = sig_w / 2.0;

    // Fixed 60 mm threshold rather than the exact block height: a minimal
    // report keeps its signatures on page one, with the name lines allowed
    // to run into the bottom margin band.
    if cur.y() < 60.0 * MM {
        cur.break_page();
    } else {
        cur.advance(10.0 * MM);
    }

    let y = cur.y();
    let content = cur.content();
    draw_text(content, &fonts.bold, TITLE_SIZE, MARGIN, y, "Firmas de Conformidad");
    cur.advance(10.0 * MM);

    let top = cur.y();
    let content = cur.content();
    let slots: [(Option<&str>, &str, f32); 2] = [
        (client_image, "Cliente", MARGIN),
        (technician_image, "Técnico", MARGIN + sig_w + 10.0 * MM),
    ];
    for (image, label, x) in slots {
        match image {
            Some(name) => draw_image(content, name, x, top, sig_w, sig_h),
            None => {
                content.save_state();
                content.set_stroke_rgb(200.0 / 255.0, 200.0 / 255.0, 200.0 / 255.0);
                content.rect(x, top - sig_h, sig_w, sig_h).stroke();
                content.restore_state();
            }
        }
        draw_text_centered(content, &fonts.bold, 12.0, x + sig_w / 2.0, top + 5.0 * MM, label);
    }

    cur.advance(sig_h + 5.0 * MM);
    let name_y = cur.y();
    let content = cur.content();

    let client_cx = MARGIN + sig_w / 2.0;
    let tech_cx = MARGIN + sig_w + 10.0 * MM + sig_w / 2.0;
    let client_name = client.name.as_deref().filter(|s| !s.is_empty()).unwrap_or("Nombre del Cliente");
    let client_id = client.id_number.as_deref().filter(|s| !s.is_empty()).unwrap_or("Identificación");
    let tech_name = technician.name.as_deref().filter(|s| !s.is_empty()).unwrap_or("Nombre del Técnico");
    let tech_id = technician.id_number.as_deref().filter(|s| !s.is_empty()).unwrap_or("Identificación");

    draw_text_centered(content, &fonts.regular, BODY_SIZE, client_cx, name_y, client_name);
    draw_text_centered(content, &fonts.regular, BODY_SIZE, client_cx, name_y - 5.0 * MM, client_id);
    draw_text_centered(content, &fonts.regular, BODY_SIZE, tech_cx, name_y, tech_name);
    draw_text_centered(content, &fonts.regular, BODY_SIZE, tech_cx, name_y - 5.0 * MM, tech_id);

    cur.advance(10.0 * MM);
}

/// Footer stamp, applied to every page once the page count is known: page
/// number centered, report number and date at the left margin, company name
/// at the right.
pub(super) fn stamp_footer(
    content: &mut Content,
    fonts: &FontBook,
    page_num: usize,
    total_pages: usize,
    report_number: u32,
    date: &str,
    company_name: &str,
) {
    let y = 5.0 * MM;
    content.set_fill_rgb(100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0);
    draw_text_centered(
        content,
        &fonts.regular,
        8.0,
        PAGE_WIDTH / 2.0,
        y,
        &format!("Página {page_num} de {total_pages}"),
    );
    draw_text(
        content,
        &fonts.regular,
        8.0,
        MARGIN,
        y,
        &format!("Reporte N° {report_number:04} | Fecha: {date}"),
    );
    draw_text_right(
        content,
        &fonts.regular,
        8.0,
        PAGE_WIDTH - MARGIN,
        y,
        company_name,
    );
    content.set_fill_gray(0.0);
}
