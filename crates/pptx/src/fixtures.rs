//! In-memory PPTX packages for tests.

use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_TYPES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Builds a minimal but well-formed presentation package.
pub struct DeckBuilder {
    slides: Vec<String>,
    layouts: Vec<String>,
    master: bool,
    order: Option<Vec<usize>>,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            layouts: Vec::new(),
            master: true,
            order: None,
        }
    }

    /// Add a slide whose `p:spTree` holds `shapes`.
    pub fn slide(mut self, shapes: &str) -> Self {
        self.slides.push(shapes.to_string());
        self
    }

    /// Add a layout to the slide master.
    pub fn layout(mut self, shapes: &str) -> Self {
        self.layouts.push(shapes.to_string());
        self
    }

    /// Leave the slide master out of the package entirely.
    pub fn without_master(mut self) -> Self {
        self.master = false;
        self
    }

    /// Presentation order as 1-based slide part numbers.
    pub fn slide_order(mut self, order: Vec<usize>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut files: Vec<(String, String)> = Vec::new();

        files.push((
            "[Content_Types].xml".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/></Types>"#
                .to_string(),
        ));
        files.push((
            "_rels/.rels".to_string(),
            rels(&[(
                "rId1".to_string(),
                "officeDocument",
                "ppt/presentation.xml".to_string(),
            )]),
        ));

        let order = self
            .order
            .clone()
            .unwrap_or_else(|| (1..=self.slides.len()).collect());
        let mut presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {}>"#,
            NAMESPACES
        );
        if self.master {
            presentation.push_str(
                r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            );
        }
        presentation.push_str("<p:sldIdLst>");
        for n in &order {
            presentation.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                255 + n,
                10 + n
            ));
        }
        presentation.push_str(r#"</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#);
        files.push(("ppt/presentation.xml".to_string(), presentation));

        let mut presentation_rels = Vec::new();
        if self.master {
            presentation_rels.push((
                "rId1".to_string(),
                "slideMaster",
                "slideMasters/slideMaster1.xml".to_string(),
            ));
        }
        for n in 1..=self.slides.len() {
            presentation_rels.push((
                format!("rId{}", 10 + n),
                "slide",
                format!("slides/slide{}.xml", n),
            ));
        }
        files.push((
            "ppt/_rels/presentation.xml.rels".to_string(),
            rels(&presentation_rels),
        ));

        for (idx, shapes) in self.slides.iter().enumerate() {
            files.push((
                format!("ppt/slides/slide{}.xml", idx + 1),
                part_xml("sld", shapes),
            ));
        }

        if self.master {
            let mut master = part_xml(
                "sldMaster",
                &text_shape(2, "Master Title", &[&["Master Hitachi Astemo"]]),
            );
            let mut id_list = String::from("<p:sldLayoutIdLst>");
            for n in 1..=self.layouts.len() {
                id_list.push_str(&format!(
                    r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                    2147483648usize + n,
                    n
                ));
            }
            id_list.push_str("</p:sldLayoutIdLst></p:sldMaster>");
            master = master.replace("</p:sldMaster>", &id_list);
            files.push(("ppt/slideMasters/slideMaster1.xml".to_string(), master));

            let layout_rels: Vec<(String, &str, String)> = (1..=self.layouts.len())
                .map(|n| {
                    (
                        format!("rId{}", n),
                        "slideLayout",
                        format!("../slideLayouts/slideLayout{}.xml", n),
                    )
                })
                .collect();
            files.push((
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
                rels(&layout_rels),
            ));
        }

        for (idx, shapes) in self.layouts.iter().enumerate() {
            files.push((
                format!("ppt/slideLayouts/slideLayout{}.xml", idx + 1),
                part_xml("sldLayout", shapes),
            ));
        }

        zip_files(&files)
    }
}

/// Write `(name, content)` pairs into a deflated ZIP archive.
pub fn zip_files(files: &[(String, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(name.clone(), FileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn rels(entries: &[(String, &str, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_TYPES, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// A slide-like part (`sld`, `sldLayout`, `sldMaster`) around `shapes`.
pub fn part_xml(root: &str, shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:{root} {ns}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:{root}>"#,
        root = root,
        ns = NAMESPACES,
        shapes = shapes
    )
}

/// A text box. Each inner slice is a paragraph, each string a run; a
/// leading `*` makes the run bold.
pub fn text_shape(id: usize, name: &str, paragraphs: &[&[&str]]) -> String {
    let mut body = String::new();
    for runs in paragraphs {
        body.push_str("<a:p>");
        for run in *runs {
            let (bold, text) = match run.strip_prefix('*') {
                Some(text) => (1, text),
                None => (0, *run),
            };
            body.push_str(&format!(
                r#"<a:r><a:rPr lang="en-US" b="{}" dirty="0"/><a:t>{}</a:t></a:r>"#,
                bold,
                escape(text)
            ));
        }
        body.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="838200" y="365125"/><a:ext cx="10515600" cy="1325563"/></a:xfrm></p:spPr><p:txBody><a:bodyPr wrap="square"/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        id,
        escape(name),
        body
    )
}

pub fn picture(id: usize) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr/></p:pic>"#,
        id = id
    )
}
