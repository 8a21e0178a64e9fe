//! PPTX package writer.

use crate::parts::*;
use chatppt_core::{Deck, Error, ImageRef, Result, Slide};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Gap between stacked images, in EMU.
const IMAGE_GAP: i64 = 152_400;

/// Width of the bullet column when a slide also carries images.
const BODY_WIDTH_WITH_IMAGES: i64 = 5_410_200;

/// Writes a [`Deck`] as a PPTX package.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    /// Directory that relative image paths are tried against first.
    image_base: Option<PathBuf>,
}

/// An image read from disk, stored under `ppt/media/`.
struct Media {
    name: String,
    bytes: Vec<u8>,
}

/// An embedded image as referenced from a slide.
struct PlacedImage {
    rel_id: String,
    media_name: String,
    alt: String,
}

/// Position and size in EMU.
#[derive(Debug, Clone, Copy)]
struct Rect {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

#[derive(Debug, Clone, Copy)]
enum Placeholder {
    CenteredTitle,
    Title,
    Body,
}

impl PptxWriter {
    /// Create a writer that resolves relative image paths against the
    /// current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative image paths against `dir` before the current
    /// directory.
    pub fn with_image_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_base = Some(dir.into());
        self
    }

    /// Write `deck` into `writer` and hand the writer back.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, writer: W) -> Result<W> {
        let (media, placed) = self.collect_media(deck);
        let slide_count = deck.slide_count();

        let mut zip = ZipWriter::new(writer);

        add_part(&mut zip, "[Content_Types].xml", &content_types(slide_count, &media)?)?;
        add_part(&mut zip, "_rels/.rels", &root_rels()?)?;
        add_part(&mut zip, "docProps/core.xml", &core_properties(&deck.title)?)?;
        add_part(&mut zip, "docProps/app.xml", &app_properties(slide_count)?)?;
        add_part(&mut zip, "ppt/presentation.xml", &presentation(slide_count)?)?;
        add_part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &presentation_rels(slide_count)?,
        )?;
        add_part(&mut zip, SLIDE_MASTER_PATH, SLIDE_MASTER.as_bytes())?;
        add_part(&mut zip, SLIDE_MASTER_RELS_PATH, &master_rels()?)?;
        add_part(&mut zip, TITLE_LAYOUT_PATH, TITLE_LAYOUT.as_bytes())?;
        add_part(&mut zip, TITLE_LAYOUT_RELS_PATH, &layout_rels()?)?;
        add_part(&mut zip, CONTENT_LAYOUT_PATH, CONTENT_LAYOUT.as_bytes())?;
        add_part(&mut zip, CONTENT_LAYOUT_RELS_PATH, &layout_rels()?)?;
        add_part(&mut zip, THEME_PATH, THEME.as_bytes())?;

        add_part(&mut zip, "ppt/slides/slide1.xml", &title_slide(&deck.title)?)?;
        add_part(
            &mut zip,
            "ppt/slides/_rels/slide1.xml.rels",
            &slide_rels("slideLayout1.xml", &[])?,
        )?;

        for (idx, (slide, images)) in deck.slides.iter().zip(&placed).enumerate() {
            let number = idx + 2;
            add_part(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", number),
                &content_slide(slide, images)?,
            )?;
            add_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &slide_rels("slideLayout2.xml", images)?,
            )?;
        }

        for item in &media {
            add_part(&mut zip, &format!("ppt/media/{}", item.name), &item.bytes)?;
        }

        log::debug!(
            "Wrote PPTX package: {} slides, {} images",
            slide_count,
            media.len()
        );

        zip.finish().map_err(zip_error)
    }

    /// Load every image the deck references, skipping the ones that cannot
    /// be embedded. Returns the media parts and, per content slide, the
    /// images placed on it.
    fn collect_media(&self, deck: &Deck) -> (Vec<Media>, Vec<Vec<PlacedImage>>) {
        let mut media = Vec::new();
        let mut placed = Vec::with_capacity(deck.slides.len());

        for slide in &deck.slides {
            let mut on_slide = Vec::new();

            for image in &slide.images {
                let Some((ext, bytes)) = self.load_image(image) else {
                    continue;
                };

                let name = format!("image{}.{}", media.len() + 1, ext);
                on_slide.push(PlacedImage {
                    // rId1 is the layout.
                    rel_id: format!("rId{}", on_slide.len() + 2),
                    media_name: name.clone(),
                    alt: image.alt.clone(),
                });
                media.push(Media { name, bytes });
            }

            placed.push(on_slide);
        }

        (media, placed)
    }

    fn load_image(&self, image: &ImageRef) -> Option<(String, Vec<u8>)> {
        let path = self.resolve_image_path(&image.path);

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .filter(|e| image_content_type(e).is_some());

        let Some(ext) = ext else {
            log::warn!("Skipping image with unsupported type: {}", image.path);
            return None;
        };

        match std::fs::read(&path) {
            Ok(bytes) => Some((ext, bytes)),
            Err(e) => {
                log::warn!("Skipping image {}: {}", path.display(), e);
                None
            }
        }
    }

    fn resolve_image_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            return path.to_path_buf();
        }

        if let Some(base) = &self.image_base {
            let candidate = base.join(path);
            if candidate.exists() {
                return candidate;
            }
        }

        path.to_path_buf()
    }
}

fn zip_error(e: zip::result::ZipError) -> Error {
    Error::ZipError(e.to_string())
}

fn xml_error(e: quick_xml::Error) -> Error {
    Error::XmlError(e.to_string())
}

fn add_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, data: &[u8]) -> Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(name, options).map_err(zip_error)?;
    zip.write_all(data)?;
    Ok(())
}

/// Serialize one XML part, declaration included.
fn xml_part<F>(build: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Writer<Vec<u8>>) -> quick_xml::Result<()>,
{
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;
    build(&mut writer).map_err(xml_error)?;
    Ok(writer.into_inner())
}

fn content_types(slide_count: usize, media: &[Media]) -> Result<Vec<u8>> {
    let image_exts: BTreeSet<&str> = media
        .iter()
        .filter_map(|m| m.name.rsplit_once('.').map(|(_, ext)| ext))
        .collect();

    xml_part(|w| {
        w.create_element("Types")
            .with_attribute(("xmlns", NS_CONTENT_TYPES))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                let mut defaults = vec![("rels", CT_RELS), ("xml", "application/xml")];
                defaults.extend(
                    image_exts
                        .iter()
                        .filter_map(|ext| image_content_type(ext).map(|ct| (*ext, ct))),
                );
                for (ext, content_type) in defaults {
                    w.create_element("Default")
                        .with_attribute(("Extension", ext))
                        .with_attribute(("ContentType", content_type))
                        .write_empty()?;
                }

                let mut overrides = vec![
                    ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
                    (format!("/{}", SLIDE_MASTER_PATH), CT_SLIDE_MASTER),
                    (format!("/{}", TITLE_LAYOUT_PATH), CT_SLIDE_LAYOUT),
                    (format!("/{}", CONTENT_LAYOUT_PATH), CT_SLIDE_LAYOUT),
                    (format!("/{}", THEME_PATH), CT_THEME),
                    ("/docProps/core.xml".to_string(), CT_CORE_PROPS),
                    ("/docProps/app.xml".to_string(), CT_EXTENDED_PROPS),
                ];
                overrides.extend(
                    (1..=slide_count).map(|n| (format!("/ppt/slides/slide{}.xml", n), CT_SLIDE)),
                );
                for (part, content_type) in &overrides {
                    w.create_element("Override")
                        .with_attribute(("PartName", part.as_str()))
                        .with_attribute(("ContentType", *content_type))
                        .write_empty()?;
                }
                Ok(())
            })?;
        Ok(())
    })
}

fn core_properties(title: &str) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("cp:coreProperties")
            .with_attribute((
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ))
            .with_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"))
            .with_attribute(("xmlns:dcterms", "http://purl.org/dc/terms/"))
            .with_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("dc:title")
                    .write_text_content(BytesText::new(title))?;
                w.create_element("dc:creator")
                    .write_text_content(BytesText::new("ChatPPT"))?;
                Ok(())
            })?;
        Ok(())
    })
}

fn app_properties(slide_count: usize) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("Properties")
            .with_attribute((
                "xmlns",
                "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
            ))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("Application")
                    .write_text_content(BytesText::new("ChatPPT"))?;
                w.create_element("Slides")
                    .write_text_content(BytesText::new(&slide_count.to_string()))?;
                Ok(())
            })?;
        Ok(())
    })
}

fn presentation(slide_count: usize) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("p:presentation")
            .with_attribute(("xmlns:a", NS_MAIN))
            .with_attribute(("xmlns:r", NS_REL))
            .with_attribute(("xmlns:p", NS_PML))
            .with_attribute(("saveSubsetFonts", "1"))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("p:sldMasterIdLst").write_inner_content(|w| -> quick_xml::Result<()> {
                    w.create_element("p:sldMasterId")
                        .with_attribute(("id", "2147483648"))
                        .with_attribute(("r:id", "rId1"))
                        .write_empty()?;
                    Ok(())
                })?;
                w.create_element("p:sldIdLst").write_inner_content(|w| -> quick_xml::Result<()> {
                    for n in 0..slide_count {
                        w.create_element("p:sldId")
                            .with_attribute(("id", (256 + n).to_string().as_str()))
                            .with_attribute(("r:id", format!("rId{}", n + 2).as_str()))
                            .write_empty()?;
                    }
                    Ok(())
                })?;
                w.create_element("p:sldSz")
                    .with_attribute(("cx", SLIDE_WIDTH.to_string().as_str()))
                    .with_attribute(("cy", SLIDE_HEIGHT.to_string().as_str()))
                    .write_empty()?;
                w.create_element("p:notesSz")
                    .with_attribute(("cx", "6858000"))
                    .with_attribute(("cy", "9144000"))
                    .write_empty()?;
                Ok(())
            })?;
        Ok(())
    })
}

fn root_rels() -> Result<Vec<u8>> {
    relationships(&[
        (REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
        (REL_CORE_PROPS, "docProps/core.xml".to_string()),
        (REL_EXTENDED_PROPS, "docProps/app.xml".to_string()),
    ])
}

/// Layout ids in the master refer to rId1 and rId2.
fn master_rels() -> Result<Vec<u8>> {
    relationships(&[
        (REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
        (REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml".to_string()),
        (REL_THEME, "../theme/theme1.xml".to_string()),
    ])
}

fn layout_rels() -> Result<Vec<u8>> {
    relationships(&[(REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml".to_string())])
}

/// rId1 is the master, rId2.. are the slides, the theme comes last.
fn presentation_rels(slide_count: usize) -> Result<Vec<u8>> {
    let mut rels = vec![(
        REL_SLIDE_MASTER,
        "slideMasters/slideMaster1.xml".to_string(),
    )];
    rels.extend((1..=slide_count).map(|n| (REL_SLIDE, format!("slides/slide{}.xml", n))));
    rels.push((REL_THEME, "theme/theme1.xml".to_string()));

    relationships(&rels)
}

fn slide_rels(layout: &str, images: &[PlacedImage]) -> Result<Vec<u8>> {
    let mut rels = vec![(REL_SLIDE_LAYOUT, format!("../slideLayouts/{}", layout))];
    rels.extend(
        images
            .iter()
            .map(|image| (REL_IMAGE, format!("../media/{}", image.media_name))),
    );

    relationships(&rels)
}

/// A relationships part with ids `rId1..` in the given order.
fn relationships(rels: &[(&str, String)]) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("Relationships")
            .with_attribute(("xmlns", NS_PKG_REL))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                for (idx, (rel_type, target)) in rels.iter().enumerate() {
                    w.create_element("Relationship")
                        .with_attribute(("Id", format!("rId{}", idx + 1).as_str()))
                        .with_attribute(("Type", *rel_type))
                        .with_attribute(("Target", target.as_str()))
                        .write_empty()?;
                }
                Ok(())
            })?;
        Ok(())
    })
}

fn title_slide(title: &str) -> Result<Vec<u8>> {
    slide_part(|w| {
        write_text_shape(w, 2, "Title 1", Placeholder::CenteredTitle, None, &[(0, title)])
    })
}

fn content_slide(slide: &Slide, images: &[PlacedImage]) -> Result<Vec<u8>> {
    let has_bullets = !slide.bullets.is_empty();

    slide_part(|w| {
        write_text_shape(
            w,
            2,
            "Title 1",
            Placeholder::Title,
            None,
            &[(0, slide.title.as_str())],
        )?;

        if has_bullets {
            let frame = if images.is_empty() {
                None
            } else {
                Some(Rect {
                    x: BODY_X,
                    y: BODY_Y,
                    cx: BODY_WIDTH_WITH_IMAGES,
                    cy: BODY_HEIGHT,
                })
            };
            let paragraphs: Vec<(u8, &str)> = slide
                .bullets
                .iter()
                .map(|b| (b.level, b.text.as_str()))
                .collect();
            write_text_shape(w, 3, "Content Placeholder 2", Placeholder::Body, frame, &paragraphs)?;
        }

        for (idx, (image, rect)) in images
            .iter()
            .zip(image_frames(images.len(), has_bullets))
            .enumerate()
        {
            write_picture(w, idx as u32 + 4, image, rect)?;
        }

        Ok(())
    })
}

/// Stack `count` image frames vertically, in the right-hand column when the
/// slide has bullets and across the whole body area otherwise.
fn image_frames(count: usize, beside_text: bool) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }

    let (x, cx) = if beside_text {
        let x = BODY_X + BODY_WIDTH_WITH_IMAGES + IMAGE_GAP;
        (x, BODY_X + BODY_WIDTH - x)
    } else {
        (BODY_X, BODY_WIDTH)
    };

    let count = count as i64;
    // Gaps never take more than half the column.
    let gap = IMAGE_GAP.min(BODY_HEIGHT / (2 * count));
    let cy = ((BODY_HEIGHT - gap * (count - 1)) / count).max(1);

    (0..count)
        .map(|i| Rect {
            x,
            y: BODY_Y + i * (cy + gap),
            cx,
            cy,
        })
        .collect()
}

/// Wrap slide content in `p:sld` and the shape tree.
fn slide_part<F>(content: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Writer<Vec<u8>>) -> quick_xml::Result<()>,
{
    xml_part(|w| {
        w.create_element("p:sld")
            .with_attribute(("xmlns:a", NS_MAIN))
            .with_attribute(("xmlns:r", NS_REL))
            .with_attribute(("xmlns:p", NS_PML))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("p:cSld").write_inner_content(|w| -> quick_xml::Result<()> {
                    w.create_element("p:spTree").write_inner_content(|w| -> quick_xml::Result<()> {
                        w.create_element("p:nvGrpSpPr").write_inner_content(|w| -> quick_xml::Result<()> {
                            w.create_element("p:cNvPr")
                                .with_attribute(("id", "1"))
                                .with_attribute(("name", ""))
                                .write_empty()?;
                            w.create_element("p:cNvGrpSpPr").write_empty()?;
                            w.create_element("p:nvPr").write_empty()?;
                            Ok(())
                        })?;
                        w.create_element("p:grpSpPr").write_empty()?;
                        content(w)
                    })?;
                    Ok(())
                })?;
                w.create_element("p:clrMapOvr").write_inner_content(|w| -> quick_xml::Result<()> {
                    w.create_element("a:masterClrMapping").write_empty()?;
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(())
    })
}

fn write_text_shape(
    w: &mut Writer<Vec<u8>>,
    id: u32,
    name: &str,
    placeholder: Placeholder,
    frame: Option<Rect>,
    paragraphs: &[(u8, &str)],
) -> quick_xml::Result<()> {
    w.create_element("p:sp").write_inner_content(|w| -> quick_xml::Result<()> {
        w.create_element("p:nvSpPr").write_inner_content(|w| -> quick_xml::Result<()> {
            w.create_element("p:cNvPr")
                .with_attribute(("id", id.to_string().as_str()))
                .with_attribute(("name", name))
                .write_empty()?;
            w.create_element("p:cNvSpPr").write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("a:spLocks")
                    .with_attribute(("noGrp", "1"))
                    .write_empty()?;
                Ok(())
            })?;
            w.create_element("p:nvPr").write_inner_content(|w| -> quick_xml::Result<()> {
                let ph = w.create_element("p:ph");
                let ph = match placeholder {
                    Placeholder::CenteredTitle => ph.with_attribute(("type", "ctrTitle")),
                    Placeholder::Title => ph.with_attribute(("type", "title")),
                    Placeholder::Body => ph.with_attribute(("idx", "1")),
                };
                ph.write_empty()?;
                Ok(())
            })?;
            Ok(())
        })?;

        match frame {
            Some(rect) => {
                w.create_element("p:spPr")
                    .write_inner_content(|w| write_xfrm(w, rect))?;
            }
            None => {
                w.create_element("p:spPr").write_empty()?;
            }
        }

        w.create_element("p:txBody").write_inner_content(|w| -> quick_xml::Result<()> {
            w.create_element("a:bodyPr").write_empty()?;
            w.create_element("a:lstStyle").write_empty()?;
            for &(level, text) in paragraphs {
                write_paragraph(w, level, text)?;
            }
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

fn write_paragraph(w: &mut Writer<Vec<u8>>, level: u8, text: &str) -> quick_xml::Result<()> {
    w.create_element("a:p").write_inner_content(|w| -> quick_xml::Result<()> {
        if level > 0 {
            w.create_element("a:pPr")
                .with_attribute(("lvl", level.to_string().as_str()))
                .write_empty()?;
        }
        w.create_element("a:r").write_inner_content(|w| -> quick_xml::Result<()> {
            w.create_element("a:rPr")
                .with_attribute(("dirty", "0"))
                .write_empty()?;
            w.create_element("a:t")
                .write_text_content(BytesText::new(text))?;
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

fn write_picture(
    w: &mut Writer<Vec<u8>>,
    id: u32,
    image: &PlacedImage,
    rect: Rect,
) -> quick_xml::Result<()> {
    w.create_element("p:pic").write_inner_content(|w| -> quick_xml::Result<()> {
        w.create_element("p:nvPicPr").write_inner_content(|w| -> quick_xml::Result<()> {
            w.create_element("p:cNvPr")
                .with_attribute(("id", id.to_string().as_str()))
                .with_attribute(("name", format!("Picture {}", id - 1).as_str()))
                .with_attribute(("descr", image.alt.as_str()))
                .write_empty()?;
            w.create_element("p:cNvPicPr").write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("a:picLocks")
                    .with_attribute(("noChangeAspect", "1"))
                    .write_empty()?;
                Ok(())
            })?;
            w.create_element("p:nvPr").write_empty()?;
            Ok(())
        })?;
        w.create_element("p:blipFill").write_inner_content(|w| -> quick_xml::Result<()> {
            w.create_element("a:blip")
                .with_attribute(("r:embed", image.rel_id.as_str()))
                .write_empty()?;
            w.create_element("a:stretch").write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("a:fillRect").write_empty()?;
                Ok(())
            })?;
            Ok(())
        })?;
        w.create_element("p:spPr").write_inner_content(|w| -> quick_xml::Result<()> {
            write_xfrm(w, rect)?;
            w.create_element("a:prstGeom")
                .with_attribute(("prst", "rect"))
                .write_inner_content(|w| -> quick_xml::Result<()> {
                    w.create_element("a:avLst").write_empty()?;
                    Ok(())
                })?;
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

fn write_xfrm(w: &mut Writer<Vec<u8>>, rect: Rect) -> quick_xml::Result<()> {
    w.create_element("a:xfrm").write_inner_content(|w| -> quick_xml::Result<()> {
        w.create_element("a:off")
            .with_attribute(("x", rect.x.to_string().as_str()))
            .with_attribute(("y", rect.y.to_string().as_str()))
            .write_empty()?;
        w.create_element("a:ext")
            .with_attribute(("cx", rect.cx.to_string().as_str()))
            .with_attribute(("cy", rect.cy.to_string().as_str()))
            .write_empty()?;
        Ok(())
    })?;
    Ok(())
}
