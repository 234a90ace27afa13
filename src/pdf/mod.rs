mod layout;
mod sections;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::fonts::register_fonts;
use crate::model::{CompanyInfo, EmbeddedImage, ImageFormat, Photo, Report};

use layout::{PAGE_HEIGHT, PAGE_WIDTH, PageCursor};

/// Outcome of preparing one photo for placement. A failed decode keeps its
/// grid cell (rendered as the error placeholder) instead of aborting the
/// render.
pub(crate) enum PhotoPlacement {
    Placed(String),
    Failed,
}

fn write_jpeg_xobject(pdf: &mut Pdf, xobj_ref: Ref, data: &[u8], width: u32, height: u32) {
    let mut xobj = pdf.image_xobject(xobj_ref, data);
    xobj.filter(Filter::DctDecode);
    xobj.width(width as i32);
    xobj.height(height as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
}

fn write_rgba_xobject(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    rgba: &image::RgbaImage,
    alloc: &mut impl FnMut() -> Ref,
) {
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
}

/// Embed a validated image (logo, signature). These went through the input
/// layer, so a decode failure here is a hard error and propagates.
fn embed_image(
    img: &EmbeddedImage,
    image_xobjects: &mut Vec<(String, Ref)>,
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<String, Error> {
    let xobj_ref = alloc();
    let pdf_name = format!("Im{}", image_xobjects.len() + 1);

    match img.format {
        ImageFormat::Jpeg => {
            write_jpeg_xobject(pdf, xobj_ref, &img.data, img.pixel_width, img.pixel_height);
        }
        ImageFormat::Png => {
            let decoded = image::load_from_memory_with_format(&img.data, image::ImageFormat::Png)
                .map_err(|e| Error::Pdf(format!("failed to decode PNG image: {e}")))?;
            write_rgba_xobject(pdf, xobj_ref, &decoded.to_rgba8(), alloc);
        }
    }

    image_xobjects.push((pdf_name.clone(), xobj_ref));
    Ok(pdf_name)
}

/// Embed one photo. The bytes come straight from capture, so the decode is
/// attempted here; failure downgrades the cell to the error placeholder.
fn embed_photo(
    photo: &Photo,
    image_xobjects: &mut Vec<(String, Ref)>,
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> PhotoPlacement {
    let decoded = match image::load_from_memory(&photo.data) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("photo {}: failed to decode image: {e}", photo.id);
            return PhotoPlacement::Failed;
        }
    };

    let xobj_ref = alloc();
    let pdf_name = format!("Im{}", image_xobjects.len() + 1);

    // JPEG bytes go in as-is (DCTDecode); everything else is re-encoded
    // from the decoded pixels.
    if matches!(image::guess_format(&photo.data), Ok(image::ImageFormat::Jpeg)) {
        write_jpeg_xobject(pdf, xobj_ref, &photo.data, decoded.width(), decoded.height());
    } else {
        write_rgba_xobject(pdf, xobj_ref, &decoded.to_rgba8(), alloc);
    }

    image_xobjects.push((pdf_name.clone(), xobj_ref));
    PhotoPlacement::Placed(pdf_name)
}

pub fn render(
    report: &Report,
    company: &CompanyInfo,
    report_number: u32,
    date: &str,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    // Phase 1: register the builtin fonts
    let fonts = register_fonts(&mut pdf, &mut alloc);
    let t_fonts = t0.elapsed();

    // Phase 1b: embed images (logo, signatures, photos)
    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();

    let logo_name = match &company.logo {
        Some(img) => Some(embed_image(img, &mut image_xobjects, &mut pdf, &mut alloc)?),
        None => None,
    };
    let client_sig_name = match &report.client_signature.image {
        Some(img) => Some(embed_image(img, &mut image_xobjects, &mut pdf, &mut alloc)?),
        None => None,
    };
    let tech_sig_name = match &report.technician_signature.image {
        Some(img) => Some(embed_image(img, &mut image_xobjects, &mut pdf, &mut alloc)?),
        None => None,
    };
    let photo_placements: Vec<PhotoPlacement> = report
        .photos
        .iter()
        .map(|photo| embed_photo(photo, &mut image_xobjects, &mut pdf, &mut alloc))
        .collect();
    let t_images = t0.elapsed();

    // Phase 2: single layout pass in fixed section order
    let mut cursor = PageCursor::new();
    sections::draw_header(
        &mut cursor,
        &fonts,
        company,
        logo_name
            .as_deref()
            .zip(company.logo.as_ref()),
        report_number,
        date,
    );
    sections::draw_client_info(&mut cursor, &fonts, &report.client);
    sections::draw_service_details(&mut cursor, &fonts, &report.service);
    sections::draw_electrical_tables(&mut cursor, &fonts, &report.electrical);
    sections::draw_battery_grid(&mut cursor, &fonts, &report.battery);
    sections::draw_work_description(&mut cursor, &fonts, report.description.as_deref());
    sections::draw_recommendations(&mut cursor, &fonts, report.recommendations.as_deref());
    sections::draw_photo_grid(&mut cursor, &fonts, &report.photos, &photo_placements);
    sections::draw_signatures(
        &mut cursor,
        &fonts,
        &report.client_signature,
        client_sig_name.as_deref(),
        &report.technician_signature,
        tech_sig_name.as_deref(),
    );
    let mut pages = cursor.finish();
    let t_layout = t0.elapsed();

    // Phase 2b: stamp the footer on every page now that the count is known
    let total_pages = pages.len();
    for (page_idx, content) in pages.iter_mut().enumerate() {
        sections::stamp_footer(
            content,
            &fonts,
            page_idx + 1,
            total_pages,
            report_number,
            date,
            &company.name,
        );
    }
    let t_footers = t0.elapsed();

    // Phase 3: allocate page and content IDs now that the page count is known
    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in pages.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut font_res = resources.fonts();
            font_res.pair(Name(fonts.regular.pdf_name.as_bytes()), fonts.regular.font_ref);
            font_res.pair(Name(fonts.bold.pdf_name.as_bytes()), fonts.bold.font_ref);
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }
    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: fonts={:.1}ms, images={:.1}ms, layout={:.1}ms, footers={:.1}ms, assembly={:.1}ms ({} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_images - t_fonts).as_secs_f64() * 1000.0,
        (t_layout - t_images).as_secs_f64() * 1000.0,
        (t_footers - t_layout).as_secs_f64() * 1000.0,
        (t_assembly - t_footers).as_secs_f64() * 1000.0,
        n,
    );

    Ok(pdf.finish())
}
