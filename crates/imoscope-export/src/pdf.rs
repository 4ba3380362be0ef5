use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use printpdf::{
    image_crate, BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rgb,
};

use imoscope_types::{ImageAttachment, Message, Role, APP_NAME};

use crate::error::ExportError;
use crate::layout::{plan_transcript, TranscriptLine, WRAP_COLUMNS};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 5.0;
const BODY_SIZE_PT: f32 = 10.0;
const HEADER_SIZE_PT: f32 = 16.0;
const IMAGE_WIDTH_MM: f32 = 80.0;
const IMAGE_HEIGHT_MM: f32 = 60.0;
const CONTINUATION_INDENT_MM: f32 = 6.0;

/// Result of a successful export.
#[derive(Debug)]
pub struct ExportedDocument {
    pub path: PathBuf,
    pub pages: usize,
}

/// Serialize the transcript (and the attached image, when present) into a
/// paginated PDF under `out_dir`. The filename carries a full timestamp so
/// repeated exports in one session never collide.
pub async fn export_session(
    messages: &[Message],
    image: Option<Arc<ImageAttachment>>,
    out_dir: &Path,
) -> Result<ExportedDocument, ExportError> {
    if messages.is_empty() {
        return Err(ExportError::EmptyTranscript);
    }

    // The image must be decoded before transcript rendering begins: the
    // layout reserves vertical space for it above the first line. With no
    // image the transcript starts right after the header; the line plan is
    // identical either way.
    let decoded = match image {
        Some(attachment) => Some(decode_image(attachment).await?),
        None => None,
    };

    let plan = plan_transcript(messages, WRAP_COLUMNS);
    let timestamp = chrono::Local::now();
    let file_name = format!(
        "{}_Chat_{}.pdf",
        APP_NAME,
        timestamp.format("%Y-%m-%dT%H-%M-%S")
    );

    let mut writer = PdfWriter::new()?;
    writer.header(&timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
    if let Some(image) = decoded {
        writer.image_block(image);
    }
    for line in &plan {
        writer.transcript_line(line);
    }

    let path = out_dir.join(file_name);
    let pages = writer.pages;
    writer.save(&path)?;
    Ok(ExportedDocument { path, pages })
}

/// Decode the attachment bytes into an embeddable raster. One awaitable
/// step with a single success/failure outcome.
async fn decode_image(attachment: Arc<ImageAttachment>) -> Result<Image, ExportError> {
    let decoded = tokio::task::spawn_blocking(move || {
        image_crate::load_from_memory(&attachment.bytes)
    })
    .await
    .map_err(|e| ExportError::ImageDecode(e.to_string()))?
    .map_err(|e| ExportError::ImageDecode(e.to_string()))?;
    Ok(Image::from_dynamic_image(&decoded))
}

/// Top-down cursor over a growing printpdf document.
struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance from the top edge to the next baseline, in mm.
    y: f32,
    pages: usize,
}

impl PdfWriter {
    fn new() -> Result<Self, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            format!("{} Chat", APP_NAME),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: MARGIN_MM,
            pages: 1,
        })
    }

    /// Start a new page when `needed` mm would cross the bottom margin.
    fn ensure_room(&mut self, needed: f32) {
        if self.y + needed <= PAGE_HEIGHT_MM - MARGIN_MM {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN_MM;
        self.pages += 1;
    }

    fn text_at(&mut self, text: &str, size: f32, bold: bool, x: f32) {
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(
            text,
            size,
            Mm(x),
            Mm(PAGE_HEIGHT_MM - self.y),
            font,
        );
    }

    fn header(&mut self, timestamp: &str) {
        self.ensure_room(LINE_HEIGHT_MM * 4.0);
        self.y += LINE_HEIGHT_MM;
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.text_at(APP_NAME, HEADER_SIZE_PT, true, MARGIN_MM);
        self.y += LINE_HEIGHT_MM * 1.5;
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.45, 0.45, 0.45, None)));
        self.text_at(
            &format!("Conversation exported {}", timestamp),
            BODY_SIZE_PT,
            false,
            MARGIN_MM,
        );
        self.y += LINE_HEIGHT_MM * 2.0;
    }

    /// Fixed-size raster block at the top of the transcript.
    fn image_block(&mut self, image: Image) {
        self.ensure_room(IMAGE_HEIGHT_MM + LINE_HEIGHT_MM);
        let dpi = 300.0;
        let natural_w_mm = image.image.width.0 as f32 * 25.4 / dpi;
        let natural_h_mm = image.image.height.0 as f32 * 25.4 / dpi;
        let transform = ImageTransform {
            translate_x: Some(Mm(MARGIN_MM)),
            translate_y: Some(Mm(PAGE_HEIGHT_MM - self.y - IMAGE_HEIGHT_MM)),
            scale_x: Some(IMAGE_WIDTH_MM / natural_w_mm),
            scale_y: Some(IMAGE_HEIGHT_MM / natural_h_mm),
            dpi: Some(dpi),
            ..Default::default()
        };
        image.add_to_layer(self.layer.clone(), transform);
        self.y += IMAGE_HEIGHT_MM + LINE_HEIGHT_MM;
    }

    /// One planned transcript line. Assistant lines render black, user lines
    /// gray; leading lines sit at the margin, continuations are indented.
    fn transcript_line(&mut self, line: &TranscriptLine) {
        self.ensure_room(LINE_HEIGHT_MM);
        let color = match line.role {
            Role::Assistant => Rgb::new(0.0, 0.0, 0.0, None),
            Role::User => Rgb::new(0.35, 0.35, 0.35, None),
        };
        self.layer.set_fill_color(Color::Rgb(color));
        let x = if line.leading {
            MARGIN_MM
        } else {
            MARGIN_MM + CONTINUATION_INDENT_MM
        };
        self.text_at(&line.text, BODY_SIZE_PT, false, x);
        self.y += LINE_HEIGHT_MM;
    }

    fn save(self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_crate::{DynamicImage, RgbaImage};
    use std::io::Cursor;

    fn png_attachment() -> Arc<ImageAttachment> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            4,
            image_crate::Rgba([200, 120, 40, 255]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image_crate::ImageOutputFormat::Png)
            .unwrap();
        Arc::new(ImageAttachment::new("cat.png", bytes).unwrap())
    }

    fn sample_transcript() -> Vec<Message> {
        vec![
            Message::user("what is this?"),
            Message::assistant("A cat."),
        ]
    }

    #[tokio::test]
    async fn empty_transcript_produces_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_session(&[], None, dir.path()).await.unwrap_err();
        assert!(matches!(err, ExportError::EmptyTranscript));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn export_without_image_writes_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let doc = export_session(&sample_transcript(), None, dir.path())
            .await
            .unwrap();

        let name = doc.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("ImoScope_Chat_"));
        assert!(name.ends_with(".pdf"));

        let bytes = std::fs::read(&doc.path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(doc.pages, 1);
    }

    #[tokio::test]
    async fn export_with_image_embeds_and_still_renders_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let plain = export_session(&sample_transcript(), None, dir.path())
            .await
            .unwrap();
        let with_image = export_session(
            &sample_transcript(),
            Some(png_attachment()),
            dir.path(),
        )
        .await
        .unwrap();

        let plain_bytes = std::fs::read(&plain.path).unwrap();
        let image_bytes = std::fs::read(&with_image.path).unwrap();
        assert!(image_bytes.starts_with(b"%PDF"));
        // The embedded raster has to show up somewhere.
        assert!(image_bytes.len() > plain_bytes.len());
    }

    #[tokio::test]
    async fn long_transcripts_paginate() {
        let messages: Vec<Message> = (0..200)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("question number {}", i))
                } else {
                    Message::assistant(format!("answer number {}", i))
                }
            })
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let doc = export_session(&messages, None, dir.path()).await.unwrap();
        assert!(doc.pages > 1, "200 lines must not fit on one A4 page");
    }

    #[tokio::test]
    async fn corrupt_image_bytes_fail_decode() {
        // Valid JPEG magic, garbage body: passes attachment validation but
        // cannot be decoded into a raster.
        let mut bytes = vec![0xff, 0xd8, 0xff, 0xe0];
        bytes.extend_from_slice(&[0u8; 32]);
        let attachment = Arc::new(ImageAttachment::new("broken.jpg", bytes).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let err = export_session(&sample_transcript(), Some(attachment), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ImageDecode(_)));
    }
}
