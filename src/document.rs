// PDF serialization of an ordered section list (A4, built-in Helvetica, automatic overflow)

use chrono::{DateTime, Utc};
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rect, Rgb,
};

use crate::error::ReportError;
use crate::models::{ChartBlock, CoverInfo, InstanceDetailTable, InstanceHeader, ReportSection};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const TOP: f32 = PAGE_HEIGHT - MARGIN;
const ROW_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 2.0;
/// Points to millimetres.
const PT: f32 = 0.3528;

const COVER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";
const GENERATED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Serializes sections in the order given. Never reorders, merges or drops sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentWriter;

impl DocumentWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, sections: &[ReportSection]) -> Result<Vec<u8>, ReportError> {
        let title = sections
            .iter()
            .find_map(|s| match s {
                ReportSection::CoverInfo(c) => Some(c.title.clone()),
                _ => None,
            })
            .unwrap_or_else(|| "Utilization Report".to_string());

        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(write_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(write_error)?,
        };
        let layer = doc.get_page(page).get_layer(layer);
        let mut pages = PageCursor {
            doc: &doc,
            layer,
            fonts,
            y: TOP,
            page_count: 1,
            has_content: false,
        };

        for section in sections {
            match section {
                ReportSection::CoverInfo(cover) => pages.cover(cover),
                ReportSection::InstanceHeader(header) => pages.instance_header(header),
                ReportSection::InstanceDetailTable(table) => pages.detail_table(table),
                ReportSection::ChartBlock(block) => pages.chart_block(block)?,
                ReportSection::PageBreak => pages.page_break(),
            }
        }

        doc.save_to_bytes().map_err(write_error)
    }
}

fn write_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Write(e.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    /// Baseline of the next line, in mm from the page bottom.
    y: f32,
    page_count: usize,
    has_content: bool,
}

impl PageCursor<'_> {
    fn new_page(&mut self) {
        self.page_count += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.page_count),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
        self.has_content = false;
    }

    /// A break on an untouched page does not add a blank page.
    fn page_break(&mut self) {
        if self.has_content {
            self.new_page();
        }
    }

    fn ensure(&mut self, needed: f32) {
        if self.y - needed < MARGIN && self.has_content {
            self.new_page();
        }
    }

    fn text(&mut self, text: &str, size: f32, bold: bool) {
        let line_height = size * PT * 1.5;
        self.ensure(line_height);
        self.y -= size * PT;
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.set_fill_color(black());
        self.layer.use_text(
            fit(text, CONTENT_WIDTH, size),
            size,
            Mm(MARGIN),
            Mm(self.y),
            font,
        );
        self.y -= line_height - size * PT;
        self.has_content = true;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn rule(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y1)), false),
                (Point::new(Mm(x2), Mm(y2)), false),
            ],
            is_closed: false,
        });
    }

    /// Grid table; `header` rows get a shaded background and bold text.
    fn table(&mut self, header: Option<&[&str]>, rows: &[Vec<String>], widths: &[f32]) {
        let mut all: Vec<(Vec<String>, bool)> = Vec::with_capacity(rows.len() + 1);
        if let Some(h) = header {
            all.push((h.iter().map(|s| s.to_string()).collect(), true));
        }
        all.extend(rows.iter().map(|r| (r.clone(), false)));

        let total: f32 = widths.iter().sum();
        let size = 9.0;
        for (cells, is_header) in all {
            self.ensure(ROW_HEIGHT);
            let top = self.y;
            let bottom = top - ROW_HEIGHT;
            self.layer.set_outline_color(black());
            self.layer.set_outline_thickness(0.5);
            if is_header {
                self.layer.set_fill_color(Color::Rgb(Rgb::new(0.85, 0.85, 0.85, None)));
                self.layer.add_rect(Rect::new(
                    Mm(MARGIN),
                    Mm(bottom),
                    Mm(MARGIN + total),
                    Mm(top),
                ));
            }
            self.layer.set_fill_color(black());
            let font = if is_header {
                &self.fonts.bold
            } else {
                &self.fonts.regular
            };
            let mut x = MARGIN;
            for (cell, width) in cells.iter().zip(widths) {
                self.layer.use_text(
                    fit(cell, width - 2.0 * CELL_PADDING, size),
                    size,
                    Mm(x + CELL_PADDING),
                    Mm(bottom + CELL_PADDING),
                    font,
                );
                x += width;
            }
            self.rule(MARGIN, top, MARGIN + total, top);
            self.rule(MARGIN, bottom, MARGIN + total, bottom);
            let mut x = MARGIN;
            self.rule(x, top, x, bottom);
            for width in widths {
                x += width;
                self.rule(x, top, x, bottom);
            }
            self.y = bottom;
            self.has_content = true;
        }
    }

    fn cover(&mut self, cover: &CoverInfo) {
        self.text(&cover.title, 22.0, true);
        self.gap(2.0);
        self.text(
            &format!(
                "{} Utilization Report - {}",
                cover.frequency.label(),
                cover.provider.to_uppercase()
            ),
            14.0,
            true,
        );
        self.gap(4.0);

        let mut info = vec![
            vec![
                "Report Type".to_string(),
                format!("{} Utilization Report", cover.frequency.label()),
            ],
            vec!["Cloud Provider".to_string(), cover.provider.to_uppercase()],
        ];
        if let Some(name) = &cover.account_name {
            info.push(vec!["Account".to_string(), name.clone()]);
        }
        if let Some(id) = &cover.account_id {
            info.push(vec!["Account ID".to_string(), id.clone()]);
        }
        info.push(vec![
            "Period".to_string(),
            format!(
                "{} to {}",
                stamp(cover.window.start, COVER_TIME_FORMAT),
                stamp(cover.window.end, COVER_TIME_FORMAT)
            ),
        ]);
        info.push(vec![
            "Generated On".to_string(),
            stamp(cover.generated_at, GENERATED_TIME_FORMAT),
        ]);
        self.table(None, &info, &[50.0, CONTENT_WIDTH - 50.0]);

        self.gap(8.0);
        self.text("Selected Instances", 14.0, true);
        self.gap(2.0);
        let rows: Vec<Vec<String>> = cover
            .instances
            .iter()
            .map(|i| {
                vec![
                    i.id.clone(),
                    i.name.clone(),
                    i.instance_type.clone(),
                    i.region.clone(),
                ]
            })
            .collect();
        self.table(
            Some(&["Instance ID", "Name", "Type", "Region"]),
            &rows,
            &[48.0, 60.0, 30.0, CONTENT_WIDTH - 138.0],
        );
    }

    fn instance_header(&mut self, header: &InstanceHeader) {
        self.text(&format!("Instance: {}", header.label), 16.0, true);
        self.gap(2.0);
    }

    fn detail_table(&mut self, table: &InstanceDetailTable) {
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|(k, v)| vec![k.clone(), v.clone()])
            .collect();
        self.table(Some(&["Property", "Value"]), &rows, &[50.0, CONTENT_WIDTH - 50.0]);
        self.gap(6.0);
        self.text("Performance Metrics", 13.0, true);
        self.gap(2.0);
    }

    fn chart_block(&mut self, block: &ChartBlock) -> Result<(), ReportError> {
        let chart = &block.chart;
        let rgb = RgbImage::from_raw(chart.width, chart.height, chart.pixels.clone())
            .ok_or_else(|| {
                ReportError::Write(format!(
                    "chart {} for {}: pixel buffer does not match {}x{}",
                    block.metric.name, block.instance_id, chart.width, chart.height
                ))
            })?;
        let dpi = chart.width as f32 * 25.4 / CONTENT_WIDTH;
        let image_height = chart.height as f32 * 25.4 / dpi;

        // Keep the caption, image and axis labels together on one page.
        self.ensure(image_height + 30.0);
        self.text(&block.summary_text, 10.0, true);
        self.text(&chart.title, 8.0, false);
        self.text(
            &format!(
                "{}: {} .. {}",
                chart.y_label,
                axis_value(chart.y_min),
                axis_value(chart.y_max)
            ),
            8.0,
            false,
        );
        self.gap(1.0);

        let bottom = self.y - image_height;
        Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb)).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(bottom)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y = bottom - 1.0;
        self.has_content = true;
        self.text(
            &format!("Time: {} to {}", chart.x_start, chart.x_end),
            8.0,
            false,
        );
        self.gap(6.0);
        Ok(())
    }
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn stamp(t: DateTime<Utc>, format: &str) -> String {
    t.format(format).to_string()
}

fn axis_value(v: f64) -> String {
    format!("{v:.2}")
}

/// Truncates to the characters that fit `width_mm` at `size` pt (average Helvetica advance).
fn fit(text: &str, width_mm: f32, size: f32) -> String {
    let max_chars = (width_mm / (size * PT * 0.5)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::fit;

    #[test]
    fn fit_keeps_short_text() {
        assert_eq!(fit("i-123", 50.0, 9.0), "i-123");
    }

    #[test]
    fn fit_truncates_long_text_with_ellipsis() {
        let long = "x".repeat(500);
        let out = fit(&long, 20.0, 9.0);
        assert!(out.ends_with("..."));
        assert!(out.chars().count() < 500);
    }
}
