//! PDF fixtures for unit tests.

use lopdf::{dictionary, Document, Object, Stream};

/// A run of text placed at an absolute position on the page.
pub struct Fragment<'a> {
    pub x: f32,
    pub y: f32,
    pub text: &'a str,
}

impl<'a> Fragment<'a> {
    pub fn new(x: f32, y: f32, text: &'a str) -> Self {
        Self { x, y, text }
    }
}

/// Build a PDF with one page per entry, each fragment shown with
/// Helvetica 10pt at its own text matrix.
pub fn build_pdf(pages: &[Vec<Fragment<'_>>]) -> Vec<u8> {
    build_pdf_selecting_font(pages, "F1")
}

/// A statement page whose content selects `/F9`, which the page resources
/// do not define. lopdf opens it; pdf-extract panics on it.
pub fn undefined_font_pdf() -> Vec<u8> {
    build_pdf_selecting_font(
        &[vec![
            Fragment::new(50.0, 700.0, "Payment Due Date: 05/01/2024"),
            Fragment::new(50.0, 650.0, "Date"),
            Fragment::new(300.0, 650.0, "Amount"),
            Fragment::new(50.0, 635.0, "01/03"),
            Fragment::new(300.0, 635.0, "$5.00"),
        ]],
        "F9",
    )
}

fn build_pdf_selecting_font(pages: &[Vec<Fragment<'_>>], font: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for fragments in pages {
        let mut content = format!("BT /{} 10 Tf\n", font);
        for fragment in fragments {
            let escaped = fragment
                .text
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            content.push_str(&format!(
                "1 0 0 1 {} {} Tm ({}) Tj\n",
                fragment.x, fragment.y, escaped
            ));
        }
        content.push_str("ET\n");

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    "F1" => font_id,
                },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("in-memory PDF write");
    buf
}
