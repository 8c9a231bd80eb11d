//! Fixed-layout PDF invoice rendered with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, trace};

use super::metrics::{Face, fit_text, text_width};
use super::{
    InvoiceRenderer, NO_VALUE, Result, format_hours, format_money, indented_label, sanitize_lines,
    sanitize_text,
};
use crate::error::RenderError;
use crate::models::invoice::{BillingMode, Invoice, LineItem};
use crate::timestamp;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 50.0;
const RIGHT: f32 = PAGE_WIDTH - MARGIN;

const TITLE_SIZE: f32 = 24.0;
const COMPANY_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 9.0;
const TOTAL_SIZE: f32 = 12.0;

const LINE_HEIGHT: f32 = 14.0;
const ROW_HEIGHT: f32 = 16.0;

/// Left edges of the text columns and right edges of the numeric ones.
const COL_TASK: f32 = MARGIN;
const COL_START: f32 = 248.0;
const COL_END: f32 = 340.0;
const COL_HOURS_RIGHT: f32 = 460.0;
const COL_RATE_RIGHT: f32 = 510.0;
const COL_AMOUNT_RIGHT: f32 = RIGHT;
const TASK_WIDTH: f32 = COL_START - COL_TASK - 8.0;

/// Width of the company block left of the title and invoice details.
const HEADER_LEFT_WIDTH: f32 = 300.0;
/// Address lines shown in the header; the rest are dropped.
const MAX_ADDRESS_LINES: usize = 6;

const SUMMARY_LABEL_RIGHT: f32 = 470.0;
const SUMMARY_RULE_LEFT: f32 = 360.0;

/// PDF renderer for the fixed invoice template.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    /// Create a new PDF renderer.
    pub fn new() -> Self {
        Self
    }
}

impl InvoiceRenderer for PdfRenderer {
    fn render(&self, invoice: &Invoice) -> Result<Vec<u8>> {
        let mut page = Composer::new();

        draw_header(&mut page, invoice);
        draw_table(&mut page, invoice);
        draw_summary(&mut page, invoice);
        draw_notes(&mut page, invoice);

        let bytes = page.finish()?;

        debug!(
            "Rendered invoice {} ({} line items, {} bytes)",
            invoice.header.invoice_number,
            invoice.line_items.len(),
            bytes.len()
        );

        Ok(bytes)
    }
}

fn draw_header(page: &mut Composer, invoice: &Invoice) {
    let header = &invoice.header;
    let top = page.y;

    page.text_right(RIGHT, top, Face::Bold, TITLE_SIZE, "INVOICE");

    let mut left_y = top;
    let company = sanitize_text(&header.company_name);
    if !company.trim().is_empty() {
        let company = fit_text(&company, Face::Bold, COMPANY_SIZE, HEADER_LEFT_WIDTH);
        page.text(MARGIN, left_y, Face::Bold, COMPANY_SIZE, &company);
        left_y -= LINE_HEIGHT + 4.0;
    }
    let address = sanitize_lines(&header.company_address);
    if address.len() > MAX_ADDRESS_LINES {
        debug!("Dropping {} address lines", address.len() - MAX_ADDRESS_LINES);
    }
    for line in address.iter().take(MAX_ADDRESS_LINES) {
        let line = fit_text(line, Face::Regular, BODY_SIZE, HEADER_LEFT_WIDTH);
        page.text(MARGIN, left_y, Face::Regular, BODY_SIZE, &line);
        left_y -= LINE_HEIGHT;
    }

    let mut right_y = top - TITLE_SIZE - 4.0;
    let number = format!("Invoice #: {}", sanitize_text(&header.invoice_number));
    page.text_right(RIGHT, right_y, Face::Regular, BODY_SIZE, &number);
    right_y -= LINE_HEIGHT;
    let date = format!("Date: {}", header.issue_date.format("%B %-d, %Y"));
    page.text_right(RIGHT, right_y, Face::Regular, BODY_SIZE, &date);
    right_y -= LINE_HEIGHT;

    page.y = left_y.min(right_y) - 24.0;
}

fn draw_table(page: &mut Composer, invoice: &Invoice) {
    draw_table_header(page);

    for item in &invoice.line_items {
        if page.ensure(ROW_HEIGHT) {
            draw_table_header(page);
        }
        draw_row(page, item);
    }

    page.y -= 8.0;
}

fn draw_table_header(page: &mut Composer) {
    let y = page.y;
    page.text(COL_TASK, y, Face::Bold, TABLE_SIZE, "Task");
    page.text(COL_START, y, Face::Bold, TABLE_SIZE, "Start");
    page.text(COL_END, y, Face::Bold, TABLE_SIZE, "End");
    page.text_right(COL_HOURS_RIGHT, y, Face::Bold, TABLE_SIZE, "Hours");
    page.text_right(COL_RATE_RIGHT, y, Face::Bold, TABLE_SIZE, "Rate");
    page.text_right(COL_AMOUNT_RIGHT, y, Face::Bold, TABLE_SIZE, "Amount");
    page.rule(MARGIN, RIGHT, y - 5.0, 0.75);
    page.y -= ROW_HEIGHT + 2.0;
}

fn draw_row(page: &mut Composer, item: &LineItem) {
    let y = page.y;
    let label = indented_label(&item.description, item.level);
    let label = fit_text(&label, Face::Regular, TABLE_SIZE, TASK_WIDTH);

    let rate = item.rate.map_or_else(|| NO_VALUE.to_string(), format_money);
    let amount = item.amount.map_or_else(|| NO_VALUE.to_string(), format_money);

    page.text(COL_TASK, y, Face::Regular, TABLE_SIZE, &label);
    page.text(
        COL_START,
        y,
        Face::Regular,
        TABLE_SIZE,
        &timestamp::display(item.start_time.as_deref()),
    );
    page.text(
        COL_END,
        y,
        Face::Regular,
        TABLE_SIZE,
        &timestamp::display(item.end_time.as_deref()),
    );
    page.text_right(COL_HOURS_RIGHT, y, Face::Regular, TABLE_SIZE, &format_hours(item.hours));
    page.text_right(COL_RATE_RIGHT, y, Face::Regular, TABLE_SIZE, &rate);
    page.text_right(COL_AMOUNT_RIGHT, y, Face::Regular, TABLE_SIZE, &amount);
    page.y -= ROW_HEIGHT;
}

fn draw_summary(page: &mut Composer, invoice: &Invoice) {
    page.ensure(LINE_HEIGHT * 3.0 + 20.0);

    let (rate_label, rate_value) = match invoice.mode {
        BillingMode::Hourly { rate } => ("Hourly Rate:", format!("{}/hr", format_money(rate))),
        BillingMode::FlatRate { amount } => ("Flat Rate:", format_money(amount)),
    };

    let hours = format_hours(invoice.summary.total_hours);
    summary_line(page, Face::Regular, BODY_SIZE, "Total Hours:", &hours);
    summary_line(page, Face::Regular, BODY_SIZE, rate_label, &rate_value);

    page.rule(SUMMARY_RULE_LEFT, RIGHT, page.y + 6.0, 1.0);
    page.y -= 8.0;

    let total = format_money(invoice.summary.total);
    summary_line(page, Face::Bold, TOTAL_SIZE, "Total:", &total);

    page.y -= 20.0;
}

fn summary_line(page: &mut Composer, face: Face, size: f32, label: &str, value: &str) {
    let y = page.y;
    page.text_right(SUMMARY_LABEL_RIGHT, y, face, size, label);
    page.text_right(RIGHT, y, face, size, value);
    page.y -= size + 6.0;
}

fn draw_notes(page: &mut Composer, invoice: &Invoice) {
    if let Some(memo) = &invoice.notes.memo {
        let lines = sanitize_lines(memo);
        if !lines.is_empty() {
            page.ensure(LINE_HEIGHT * 2.0);
            page.text(MARGIN, page.y, Face::Bold, BODY_SIZE, "Notes");
            page.y -= LINE_HEIGHT;
            for line in lines {
                page.ensure(LINE_HEIGHT);
                let line = fit_text(&line, Face::Regular, BODY_SIZE, RIGHT - MARGIN);
                page.text(MARGIN, page.y, Face::Regular, BODY_SIZE, &line);
                page.y -= LINE_HEIGHT;
            }
            page.y -= 10.0;
        }
    }

    page.ensure(LINE_HEIGHT * 2.0);
    let terms = format!("Payment Terms: {}", sanitize_text(&invoice.notes.terms));
    let terms = fit_text(&terms, Face::Regular, BODY_SIZE, RIGHT - MARGIN);
    page.text(MARGIN, page.y, Face::Regular, BODY_SIZE, &terms);
    page.y -= LINE_HEIGHT + 6.0;
    page.text(MARGIN, page.y, Face::Regular, BODY_SIZE, "Thank you for your business!");
    page.y -= LINE_HEIGHT;
}

/// Accumulates drawing operations page by page, top to bottom.
struct Composer {
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Start a new page unless `height` more points fit on this one.
    /// Returns whether a page break happened.
    fn ensure(&mut self, height: f32) -> bool {
        if self.y - height >= MARGIN {
            return false;
        }
        self.finished.push(std::mem::take(&mut self.current));
        trace!("Page break after page {}", self.finished.len());
        self.y = PAGE_HEIGHT - MARGIN;
        true
    }

    fn text(&mut self, x: f32, y: f32, face: Face, size: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(face.resource().into()), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn text_right(&mut self, right: f32, y: f32, face: Face, size: f32, text: &str) {
        let x = right - text_width(text, face, size);
        self.text(x, y, face, size, text);
    }

    fn rule(&mut self, from: f32, to: f32, y: f32, width: f32) {
        self.current.extend([
            Operation::new("w", vec![width.into()]),
            Operation::new("m", vec![from.into(), y.into()]),
            Operation::new("l", vec![to.into(), y.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        self.finished.push(self.current);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for face in [Face::Regular, Face::Bold] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource(), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.finished.len());
        for operations in self.finished {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
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
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| RenderError::GenerationFailed(e.to_string()))?;

        Ok(bytes)
    }
}

/// Encode text for a WinAnsi-encoded base-14 font. Characters outside
/// Latin-1 print as `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}
