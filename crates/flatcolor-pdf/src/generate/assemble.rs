//! Document assembly
//!
//! Stitches independently rendered pages into one PDF: pages tree, catalog,
//! a shared Helvetica font, per-page resources and the image XObjects.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::constants::{FONT_RESOURCE, PRODUCER};
use crate::render::{FlatImage, RenderedPage, image_resource_name};
use crate::types::{ColorScheme, GenerateError, Result};

/// Assemble rendered pages into PDF bytes.
///
/// Pages must arrive with contiguous `page_index` values starting at zero;
/// they are written in that order.
pub fn assemble(
    mut pages: Vec<RenderedPage>,
    colors: &ColorScheme,
    title: Option<&str>,
) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(GenerateError::Serialization(
            "No pages to assemble".to_string(),
        ));
    }

    pages.sort_by_key(|page| page.page_index);
    for (expected, page) in pages.iter().enumerate() {
        if page.page_index != expected {
            return Err(GenerateError::Serialization(format!(
                "Page indices are not contiguous: expected {}, found {}",
                expected, page.page_index
            )));
        }
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(page.width_pt) || !valid(page.height_pt) {
            return Err(GenerateError::Serialization(format!(
                "Page {} has invalid dimensions {} x {} pt",
                expected + 1,
                page.width_pt,
                page.height_pt
            )));
        }
    }

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();

    let palette = palette_bytes(colors);

    let font_id = pages
        .iter()
        .any(|page| page.uses_font)
        .then(|| output.add_object(create_font()));

    let mut page_refs = Vec::with_capacity(pages.len());
    for page in &pages {
        let page_id = write_page(&mut output, page, pages_tree_id, &palette, font_id);
        page_refs.push(Object::Reference(page_id));
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    let mut info = Dictionary::new();
    info.set(
        "Producer",
        Object::string_literal(PRODUCER.as_bytes().to_vec()),
    );
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        info.set("Title", text_string(title));
    }
    let info_id = output.add_object(info);
    output.trailer.set("Info", info_id);

    let mut writer = Vec::new();
    output
        .save_to(&mut writer)
        .map_err(|e| GenerateError::Serialization(format!("Failed to write PDF: {}", e)))?;

    log::debug!("Assembled {} pages into {} bytes", count, writer.len());
    Ok(writer)
}

/// Palette for the indexed color space: index 0 is paper, index 1 is ink
fn palette_bytes(colors: &ColorScheme) -> Vec<u8> {
    let (paper, ink) = (colors.secondary, colors.primary);
    vec![paper.r, paper.g, paper.b, ink.r, ink.g, ink.b]
}

/// A PDF text string: literal for ASCII, UTF-16BE with a byte order mark otherwise
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text.as_bytes().to_vec());
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn create_font() -> Dictionary {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font_dict
}

fn write_page(
    output: &mut Document,
    page: &RenderedPage,
    parent_pages_id: ObjectId,
    palette: &[u8],
    font_id: Option<ObjectId>,
) -> ObjectId {
    let mut xobjects = Dictionary::new();
    for (index, image) in page.images.iter().enumerate() {
        let image_id = output.add_object(create_image_xobject(image, palette));
        xobjects.set(image_resource_name(index), Object::Reference(image_id));
    }

    // Set up resources
    let mut resources = Dictionary::new();
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }
    if let (true, Some(font_id)) = (page.uses_font, font_id) {
        let mut fonts = Dictionary::new();
        fonts.set(FONT_RESOURCE, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
    }

    let content_id = output.add_object(Stream::new(Dictionary::new(), page.content.clone()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page.width_pt),
            Object::Real(page.height_pt),
        ]),
    );
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    output.add_object(page_dict)
}

fn create_image_xobject(image: &FlatImage, palette: &[u8]) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(image.width as i64));
    dict.set("Height", Object::Integer(image.height as i64));
    dict.set(
        "ColorSpace",
        Object::Array(vec![
            Object::Name(b"Indexed".to_vec()),
            Object::Name(b"DeviceRGB".to_vec()),
            Object::Integer(1),
            Object::String(palette.to_vec(), StringFormat::Hexadecimal),
        ]),
    );
    dict.set("BitsPerComponent", Object::Integer(1));
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

    // Data is already deflated; keep lopdf from compressing it again
    Stream::new(dict, image.data.clone()).with_compression(false)
}
