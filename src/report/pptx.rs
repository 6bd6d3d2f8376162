use std::borrow::Cow;
use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{format_metric, KpiBox, Report, Slide, NO_DATA, REPORT_TITLE};
use crate::color::{hex, palette_rgb, ACCENT};

// ---------------------------------------------------------------------------
// Geometry (EMU, 914400 per inch) – 16:9 widescreen
// ---------------------------------------------------------------------------

const SLIDE_W: i64 = 12_192_000;
const SLIDE_H: i64 = 6_858_000;
const MARGIN: i64 = 457_200;
const TITLE_H: i64 = 914_400;
const BODY_Y: i64 = MARGIN + TITLE_H + 228_600;

const DARK: &str = "1F2A44";
const LIGHT_TEXT: &str = "FFFFFF";
const MUTED: &str = "5B6475";

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Serialize a report into an Office Open XML presentation.
pub fn write_pptx(report: &Report) -> Result<Vec<u8>> {
    let parts = package_parts(report);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in &parts {
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("starting pptx part {name}"))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("writing pptx part {name}"))?;
    }
    let cursor = zip.finish().context("finishing pptx archive")?;
    let bytes = cursor.into_inner();

    log::info!(
        "Wrote {} slide report for '{}' ({} bytes)",
        report.slides.len(),
        report.metric,
        bytes.len()
    );
    Ok(bytes)
}

/// `(part name, xml)` pairs; `[Content_Types].xml` first.
fn package_parts(report: &Report) -> Vec<(String, String)> {
    let n = report.slides.len();
    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types(n)),
        ("_rels/.rels".to_string(), root_rels()),
        ("docProps/core.xml".to_string(), core_props(report)),
        ("docProps/app.xml".to_string(), app_props(n)),
        ("ppt/presentation.xml".to_string(), presentation(n)),
        ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels(n)),
        ("ppt/slideMasters/slideMaster1.xml".to_string(), slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".to_string(), slide_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ),
        ("ppt/theme/theme1.xml".to_string(), theme()),
    ];
    for (i, slide) in report.slides.iter().enumerate() {
        let num = i + 1;
        log::debug!("Rendering slide {num}: {}", slide.title());
        parts.push((format!("ppt/slides/slide{num}.xml"), render_slide(slide)));
        parts.push((
            format!("ppt/slides/_rels/slide{num}.xml.rels"),
            rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        ));
    }
    parts
}

// ---------------------------------------------------------------------------
// Package plumbing
// ---------------------------------------------------------------------------

fn content_types(slides: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    let overrides = [
        ("/ppt/presentation.xml", "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml", "application/vnd.openxmlformats-officedocument.theme+xml"),
        ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
        ("/docProps/app.xml", "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
    ];
    for (part, ty) in overrides {
        xml.push_str(&format!(r#"<Override PartName="{part}" ContentType="{ty}"/>"#));
    }
    for num in 1..=slides {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{num}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/>"#
    ));
    xml.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId3" Type="{REL_BASE}/extended-properties" Target="docProps/app.xml"/>"#
    ));
    xml.push_str("</Relationships>");
    xml
}

/// Part relationships; `kind` is the last path segment of the type URI.
fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL_BASE}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn core_props(report: &Report) -> String {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:creator>{creator}</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = xml_text(&format!("{REPORT_TITLE}: {}", report.metric)),
        creator = env!("CARGO_PKG_NAME"),
        created = created,
    )
}

fn app_props(slides: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>{}</Application><Slides>{slides}</Slides></Properties>"#,
        env!("CARGO_PKG_NAME")
    )
}

fn presentation(slides: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    );
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str("<p:sldIdLst>");
    for i in 0..slides {
        // rId1 is the master, rId2 the theme; slides follow.
        xml.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3));
    }
    xml.push_str("</p:sldIdLst>");
    xml.push_str(&format!(r#"<p:sldSz cx="{SLIDE_W}" cy="{SLIDE_H}"/>"#));
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    xml
}

fn presentation_rels(slides: usize) -> String {
    let mut entries: Vec<(String, &str, String)> = vec![
        ("rId1".into(), "slideMaster", "slideMasters/slideMaster1.xml".into()),
        ("rId2".into(), "theme", "theme/theme1.xml".into()),
    ];
    for num in 1..=slides {
        entries.push((format!("rId{}", num + 2), "slide", format!("slides/slide{num}.xml")));
    }
    let borrowed: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    rels(&borrowed)
}

const EMPTY_GROUP: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

fn slide_master() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{group}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
            r#"hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = EMPTY_GROUP,
    )
}

fn slide_layout() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{group}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sldLayout>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = EMPTY_GROUP,
    )
}

fn theme() -> String {
    let accents = ["4A90D9", "E8743B", "19A979", "945ECF", "ED4A7B", "13A4B4"];
    let mut xml = format!(r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="Paid Media">"#);
    xml.push_str(r#"<a:themeElements><a:clrScheme name="Paid Media">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    xml.push_str(&format!(r#"<a:dk2><a:srgbClr val="{DARK}"/></a:dk2>"#));
    xml.push_str(r#"<a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#);
    for (i, color) in accents.iter().enumerate() {
        let n = i + 1;
        xml.push_str(&format!(r#"<a:accent{n}><a:srgbClr val="{color}"/></a:accent{n}>"#));
    }
    xml.push_str(r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink>"#);
    xml.push_str(r#"<a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>"#);

    let font = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    xml.push_str(&format!(
        r#"<a:fontScheme name="Paid Media"><a:majorFont>{font}</a:majorFont><a:minorFont>{font}</a:minorFont></a:fontScheme>"#
    ));

    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    xml.push_str(r#"<a:fmtScheme name="Paid Media">"#);
    xml.push_str(&format!("<a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>"));
    xml.push_str("<a:lnStyleLst>");
    for w in [6350, 12700, 19050] {
        xml.push_str(&format!(r#"<a:ln w="{w}">{fill}</a:ln>"#));
    }
    xml.push_str("</a:lnStyleLst>");
    xml.push_str("<a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst>");
    xml.push_str(&format!("<a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>"));
    xml.push_str("</a:fmtScheme></a:themeElements></a:theme>");
    xml
}

// ---------------------------------------------------------------------------
// Slide canvas: absolute-positioned shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
}

/// Text formatting for one text box.
#[derive(Debug, Clone, Copy)]
struct TextStyle<'a> {
    /// Hundredths of a point.
    size: u32,
    bold: bool,
    color: &'a str,
    align: Align,
}

struct Canvas {
    shapes: String,
    next_id: u32,
}

impl Canvas {
    fn new() -> Self {
        // Id 1 is the group shape of the tree.
        Self {
            shapes: String::new(),
            next_id: 2,
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn rect(&mut self, x: i64, y: i64, w: i64, h: i64, fill: &str) {
        let id = self.id();
        self.shapes.push_str(&format!(
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Rectangle {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#,
                r#"<a:solidFill><a:srgbClr val="{fill}"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>"#
            ),
            id = id,
            x = x,
            y = y,
            w = w.max(0),
            h = h.max(0),
            fill = fill,
        ));
    }

    fn text(&mut self, x: i64, y: i64, w: i64, h: i64, lines: &[String], style: TextStyle<'_>) {
        let id = self.id();
        let algn = match style.align {
            Align::Left => "l",
            Align::Center => "ctr",
        };
        let bold = if style.bold { "1" } else { "0" };
        let mut paragraphs = String::new();
        for line in lines {
            paragraphs.push_str(&format!(
                concat!(
                    r#"<a:p><a:pPr algn="{algn}"/><a:r>"#,
                    r#"<a:rPr lang="en-US" sz="{size}" b="{bold}" dirty="0">"#,
                    r#"<a:solidFill><a:srgbClr val="{color}"/></a:solidFill></a:rPr>"#,
                    "<a:t>{text}</a:t></a:r></a:p>"
                ),
                algn = algn,
                size = style.size,
                bold = bold,
                color = style.color,
                text = xml_text(line),
            ));
        }
        self.shapes.push_str(&format!(
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
                r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0" anchor="ctr"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
                "{paragraphs}</p:txBody></p:sp>"
            ),
            id = id,
            x = x,
            y = y,
            w = w.max(0),
            h = h.max(0),
            paragraphs = paragraphs,
        ));
    }

    fn title(&mut self, title: &str) {
        let style = TextStyle {
            size: 3200,
            bold: true,
            color: DARK,
            align: Align::Left,
        };
        self.text(MARGIN, MARGIN, SLIDE_W - 2 * MARGIN, TITLE_H, &[title.to_string()], style);
        self.rect(MARGIN, MARGIN + TITLE_H, SLIDE_W - 2 * MARGIN, 38_100, &hex(ACCENT));
    }

    fn finish(self) -> String {
        format!(
            concat!(
                "{decl}",
                r#"<p:sld xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
                "<p:cSld><p:spTree>{group}{shapes}</p:spTree></p:cSld>",
                "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
            ),
            decl = XML_DECL,
            a = NS_A,
            r = NS_R,
            p = NS_P,
            group = EMPTY_GROUP,
            shapes = self.shapes,
        )
    }
}

/// Escape markup and drop control characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> Cow<'_, str> {
    let allowed = |c: char| !c.is_control() || matches!(c, '\t' | '\n' | '\r');
    if text.chars().all(allowed) {
        return escape(text);
    }
    let cleaned: String = text.chars().filter(|&c| allowed(c)).collect();
    Cow::Owned(escape(cleaned.as_str()).into_owned())
}

// ---------------------------------------------------------------------------
// Slide renderers
// ---------------------------------------------------------------------------

fn render_slide(slide: &Slide) -> String {
    let mut canvas = Canvas::new();
    match slide {
        Slide::Cover { title, subtitle } => render_cover(&mut canvas, title, subtitle),
        Slide::Kpi { title, boxes } => render_kpis(&mut canvas, title, boxes),
        Slide::PlatformChart {
            title,
            categories,
            values,
        } => render_bar_chart(&mut canvas, title, categories, values),
        Slide::TopCampaigns { title, lines } | Slide::ExecutiveSummary { title, bullets: lines } => {
            render_lines(&mut canvas, title, lines)
        }
    }
    canvas.finish()
}

fn render_cover(canvas: &mut Canvas, title: &str, subtitle: &str) {
    canvas.rect(0, 0, SLIDE_W, SLIDE_H, DARK);
    canvas.rect(MARGIN * 2, 3_200_400, SLIDE_W - MARGIN * 4, 45_720, &hex(ACCENT));
    let title_style = TextStyle {
        size: 4400,
        bold: true,
        color: LIGHT_TEXT,
        align: Align::Center,
    };
    canvas.text(MARGIN, 1_828_800, SLIDE_W - 2 * MARGIN, 1_280_160, &[title.to_string()], title_style);
    let subtitle_style = TextStyle {
        size: 2400,
        bold: false,
        color: LIGHT_TEXT,
        align: Align::Center,
    };
    canvas.text(MARGIN, 3_429_000, SLIDE_W - 2 * MARGIN, 914_400, &[subtitle.to_string()], subtitle_style);
}

fn render_kpis(canvas: &mut Canvas, title: &str, boxes: &[KpiBox]) {
    canvas.title(title);
    if boxes.is_empty() {
        return;
    }
    let gap = 228_600;
    let n = boxes.len() as i64;
    let width = (SLIDE_W - 2 * MARGIN - gap * (n - 1)) / n;
    let height = 2_286_000;
    let y = BODY_Y + 685_800;
    let accent = hex(ACCENT);
    for (i, kpi) in boxes.iter().enumerate() {
        let x = MARGIN + i as i64 * (width + gap);
        canvas.rect(x, y, width, height, &accent);
        let label_style = TextStyle {
            size: 1600,
            bold: false,
            color: LIGHT_TEXT,
            align: Align::Center,
        };
        canvas.text(x, y + 228_600, width, 685_800, &[kpi.label.clone()], label_style);
        let value_style = TextStyle {
            size: 3200,
            bold: true,
            color: LIGHT_TEXT,
            align: Align::Center,
        };
        canvas.text(x, y + 1_028_700, width, 914_400, &[kpi.value.clone()], value_style);
    }
}

fn render_bar_chart(canvas: &mut Canvas, title: &str, categories: &[String], values: &[f64]) {
    canvas.title(title);
    let muted = TextStyle {
        size: 1400,
        bold: false,
        color: MUTED,
        align: Align::Center,
    };
    if categories.is_empty() {
        let lines = ["No platform data".to_string()];
        canvas.text(MARGIN, BODY_Y, SLIDE_W - 2 * MARGIN, 914_400, &lines, muted);
        return;
    }

    let area_x = MARGIN * 2;
    let area_w = SLIDE_W - MARGIN * 4;
    let label_h = 457_200;
    let value_h = 365_760;
    let plot_top = BODY_Y + value_h;
    let plot_h = SLIDE_H - MARGIN - label_h - plot_top;
    let baseline = plot_top + plot_h;

    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let slot = area_w / categories.len() as i64;
    let bar_w = slot * 3 / 5;
    let colors = palette_rgb(categories.len());

    canvas.rect(area_x, baseline, area_w, 12_700, MUTED);
    for (i, (category, &value)) in categories.iter().zip(values).enumerate() {
        let height = if max > 0.0 {
            ((value.max(0.0) / max) * plot_h as f64) as i64
        } else {
            0
        };
        let slot_x = area_x + i as i64 * slot;
        let bar_x = slot_x + (slot - bar_w) / 2;
        canvas.rect(bar_x, baseline - height, bar_w, height, &hex(colors[i]));
        canvas.text(slot_x, baseline - height - value_h, slot, value_h, &[format_metric(value)], muted);
        canvas.text(slot_x, baseline + 25_400, slot, label_h, &[category.clone()], muted);
    }
}

fn render_lines(canvas: &mut Canvas, title: &str, lines: &[String]) {
    canvas.title(title);
    let style = TextStyle {
        size: 2000,
        bold: false,
        color: DARK,
        align: Align::Left,
    };
    let lines = if lines.is_empty() {
        vec![NO_DATA.to_string()]
    } else {
        lines.to_vec()
    };
    canvas.text(
        MARGIN,
        BODY_Y,
        SLIDE_W - 2 * MARGIN,
        SLIDE_H - BODY_Y - MARGIN,
        &lines,
        style,
    );
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use pretty_assertions::assert_eq;
    use zip::ZipArchive;

    use super::*;

    fn sample_report() -> Report {
        Report {
            metric: "Cost".to_string(),
            slides: vec![
                Slide::Cover {
                    title: "Paid Media Performance Report".into(),
                    subtitle: "Cost analysis".into(),
                },
                Slide::PlatformChart {
                    title: "Cost by Platform".into(),
                    categories: vec!["Meta".into(), "Google".into()],
                    values: vec![30.0, 10.0],
                },
                Slide::TopCampaigns {
                    title: "Top 5 Campaigns by Cost".into(),
                    lines: vec!["1. Brand & Search <EU>: 30".into()],
                },
            ],
        }
    }

    fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_package_layout() {
        let bytes = write_pptx(&sample_report()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide3.xml",
            "ppt/slides/_rels/slide3.xml.rels",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        assert!(!names.iter().any(|n| n == "ppt/slides/slide4.xml"));

        let presentation = read_part(&mut archive, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 3);
        let types = read_part(&mut archive, "[Content_Types].xml");
        assert_eq!(types.matches("presentationml.slide+xml").count(), 3);
    }

    #[test]
    fn test_chart_slide_draws_one_bar_per_category() {
        let bytes = write_pptx(&sample_report()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let chart = read_part(&mut archive, "ppt/slides/slide2.xml");

        assert!(chart.contains("Cost by Platform"));
        assert!(chart.contains("<a:t>Meta</a:t>"));
        assert!(chart.contains("<a:t>Google</a:t>"));
        // title underline + baseline + two bars
        assert_eq!(chart.matches(r#"name="Rectangle"#).count(), 4);
    }

    #[test]
    fn test_text_is_escaped() {
        let bytes = write_pptx(&sample_report()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let slide = read_part(&mut archive, "ppt/slides/slide3.xml");
        assert!(slide.contains("Brand &amp; Search &lt;EU&gt;: 30"));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let slide = render_slide(&Slide::TopCampaigns {
            title: "Top 5 Campaigns by Cost".into(),
            lines: vec!["1. Brand\u{1}Search\u{b}: 30".into()],
        });
        assert!(!slide.contains('\u{1}'));
        assert!(!slide.contains('\u{b}'));
        assert!(slide.contains("<a:t>1. BrandSearch: 30</a:t>"));

        assert_eq!(xml_text("a\tb\nc"), "a\tb\nc");
        assert_eq!(xml_text("x\u{0}<y>"), "x&lt;y&gt;");
    }
}
