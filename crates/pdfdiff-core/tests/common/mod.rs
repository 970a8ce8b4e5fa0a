#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Write `page-<n>.txt` / `page-<n>.png` pairs. Pages listed in `inked`
/// get a black square on their raster.
pub fn write_rendered(dir: &Path, pages: &[&str], inked: &[usize]) {
    fs::create_dir_all(dir).unwrap();
    for (i, text) in pages.iter().enumerate() {
        fs::write(dir.join(format!("page-{:03}.txt", i + 1)), text).unwrap();
        let mut raster = RgbaImage::from_pixel(16, 16, WHITE);
        if inked.contains(&i) {
            for x in 4..8 {
                for y in 4..8 {
                    raster.put_pixel(x, y, BLACK);
                }
            }
        }
        raster.save(dir.join(format!("page-{:03}.png", i + 1))).unwrap();
    }
}

/// Build a PDF with one text page per entry. When `with_image` is set,
/// each page also carries an 8x8 gray image XObject.
pub fn create_test_pdf(
    path: &Path,
    pages: &[&str],
    with_image: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut page_ids = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 780.into()]),
            Operation::new("Tj", vec![Object::string_literal(*text)]),
            Operation::new("ET", vec![]),
        ];

        let mut resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };
        if with_image {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 8,
                    "Height" => 8,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![200u8; 64],
            ));
            resources.set("XObject", dictionary! { "Im0" => image_id });
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new("cm", vec![8.into(), 0.into(), 0.into(), 8.into(), 0.into(), 0.into()]),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}
