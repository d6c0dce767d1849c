//! # PDF Report
//!
//! Lays the report out on A4 pages and serializes it as a minimal PDF 1.4
//! file using the built-in Helvetica font.
//!
//! ## Page Layout (millimetres, origin top-left)
//! ```text
//! ┌──────────────────────────────────────────────┐  y
//! │ Relatório de Vendas                          │  25
//! │ Período: Últimos 30 dias                     │  35
//! │ Gerado em: 02/05/2024                        │  42
//! │ ──────────────────────────────────────────── │  50
//! │ Resumo Geral                                 │  65
//! │   Vendas Totais / Lucro / Pedidos / Ticket   │  +7 each
//! │ Vendas por Dia          (first 15 rows)      │
//! │ ▓ Data      Vendas        Quantidade       ▓ │  header band
//! │ ░ 02/05/2024  R$ 45,00    2                ░ │  zebra rows, +7
//! │ Produtos Mais Vendidos  (top 10)             │
//! │ Formas de Pagamento     (with % of total)    │
//! │                                              │
//! │ Sistema de Vendas - Relatório Gerado ...     │  290 (last page)
//! └──────────────────────────────────────────────┘
//! ```
//!
//! A row that would start below 270 mm goes to a new page, as does a
//! section that would start below 250 mm. New pages start at 25 mm.

use chrono::FixedOffset;

use crate::formatters::{
    format_currency, format_date, format_day, format_percent, payment_method_short_label,
};
use crate::report::ReportData;

// =============================================================================
// Page Model
// =============================================================================

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const ROW_BREAK_Y: f32 = 270.0;
const SECTION_BREAK_Y: f32 = 250.0;
const NEW_PAGE_Y: f32 = 25.0;
const DAY_ROWS: usize = 15;
const PRODUCT_ROWS: usize = 10;
const NAME_MAX_CHARS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const PRIMARY: Rgb = Rgb(59, 130, 246);
const TEXT: Rgb = Rgb(31, 41, 55);
const LIGHT_GRAY: Rgb = Rgb(243, 244, 246);
const ZEBRA: Rgb = Rgb(250, 250, 250);
const FOOTER_GRAY: Rgb = Rgb(128, 128, 128);

/// One drawing operation. Coordinates are millimetres from the top-left
/// corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        size: f32,
        color: Rgb,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    /// All text on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

// =============================================================================
// Layout
// =============================================================================

struct Layout {
    pages: Vec<Page>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Layout {
            pages: vec![Page::default()],
            y: 0.0,
        }
    }

    fn page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn break_if_below(&mut self, limit: f32) {
        if self.y > limit {
            self.pages.push(Page::default());
            self.y = NEW_PAGE_Y;
        }
    }

    fn text(&mut self, x: f32, y: f32, size: f32, color: Rgb, text: impl Into<String>) {
        self.page().elements.push(Element::Text {
            x,
            y,
            size,
            color,
            text: text.into(),
        });
    }

    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.page().elements.push(Element::FillRect { x, y, w, h, color });
    }

    fn section(&mut self, title: &str, columns: &[(f32, &str)]) {
        self.text(20.0, self.y, 14.0, PRIMARY, title);
        self.y += 10.0;

        self.fill(20.0, self.y - 5.0, 170.0, 8.0, LIGHT_GRAY);
        for (x, label) in columns {
            self.text(*x, self.y, 10.0, TEXT, *label);
        }
        self.y += 8.0;
    }

    fn row(&mut self, index: usize, cells: &[(f32, String)]) {
        self.break_if_below(ROW_BREAK_Y);

        if index % 2 == 0 {
            self.fill(20.0, self.y - 5.0, 170.0, 7.0, ZEBRA);
        }
        for (x, cell) in cells {
            self.text(*x, self.y, 9.0, TEXT, cell.clone());
        }
        self.y += 7.0;
    }
}

/// Truncates to 25 characters plus `...`.
fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_MAX_CHARS {
        let head: String = name.chars().take(NAME_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Lays out the report pages.
pub fn layout_report(report: &ReportData, offset: FixedOffset) -> Vec<Page> {
    let mut doc = Layout::new();
    let summary = &report.summary;

    doc.text(20.0, 25.0, 20.0, PRIMARY, "Relatório de Vendas");
    doc.text(20.0, 35.0, 12.0, TEXT, format!("Período: Últimos {} dias", report.period.days));
    doc.text(
        20.0,
        42.0,
        12.0,
        TEXT,
        format!("Gerado em: {}", format_date(report.generated_at, offset)),
    );
    doc.page().elements.push(Element::Line {
        x1: 20.0,
        y1: 50.0,
        x2: 190.0,
        y2: 50.0,
        color: LIGHT_GRAY,
    });
    doc.y = 65.0;

    // Summary
    doc.text(20.0, doc.y, 16.0, PRIMARY, "Resumo Geral");
    doc.y += 10.0;
    let lines = [
        format!("Vendas Totais: {}", format_currency(summary.total_sales)),
        format!("Lucro Total: {}", format_currency(summary.total_profit)),
        format!("Total de Pedidos: {}", summary.total_orders),
        format!("Ticket Médio: {}", format_currency(summary.avg_ticket)),
    ];
    for (i, line) in lines.into_iter().enumerate() {
        doc.text(20.0, doc.y, 11.0, TEXT, line);
        doc.y += if i == 3 { 15.0 } else { 7.0 };
    }

    // Sales by day
    doc.section("Vendas por Dia", &[(25.0, "Data"), (90.0, "Vendas"), (140.0, "Quantidade")]);
    for (i, day) in report.sales_by_day.iter().take(DAY_ROWS).enumerate() {
        doc.row(
            i,
            &[
                (25.0, format_day(day.date)),
                (90.0, format_currency(day.total)),
                (140.0, day.count.to_string()),
            ],
        );
    }
    doc.y += 10.0;
    doc.break_if_below(SECTION_BREAK_Y);

    // Top products
    doc.section(
        "Produtos Mais Vendidos",
        &[(25.0, "Pos."), (40.0, "Produto"), (120.0, "Qtd."), (150.0, "Receita")],
    );
    for (i, product) in report.top_products.iter().take(PRODUCT_ROWS).enumerate() {
        doc.row(
            i,
            &[
                (25.0, format!("{}º", i + 1)),
                (40.0, truncate_name(&product.name)),
                (120.0, product.quantity.to_string()),
                (150.0, format_currency(product.revenue)),
            ],
        );
    }
    doc.y += 10.0;
    doc.break_if_below(SECTION_BREAK_Y);

    // Payment methods
    doc.section(
        "Formas de Pagamento",
        &[(25.0, "Método"), (90.0, "Transações"), (130.0, "Total"), (170.0, "%")],
    );
    for (i, payment) in report.sales_by_payment.iter().enumerate() {
        doc.row(
            i,
            &[
                (25.0, payment_method_short_label(payment.method).to_string()),
                (90.0, payment.count.to_string()),
                (130.0, format_currency(payment.total)),
                (170.0, format_percent(payment.total.permille_of(summary.total_sales))),
            ],
        );
    }

    doc.text(
        20.0,
        290.0,
        8.0,
        FOOTER_GRAY,
        "Sistema de Vendas - Relatório Gerado Automaticamente",
    );

    doc.pages
}

/// Lays out and serializes the report.
pub fn render_report(report: &ReportData, offset: FixedOffset) -> Vec<u8> {
    write_pdf(&layout_report(report, offset))
}

// =============================================================================
// Serialization
// =============================================================================

const PT_PER_MM: f32 = 72.0 / 25.4;

fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Flips a top-left millimetre y into PDF user space.
fn pdf_y(mm: f32) -> f32 {
    pt(PAGE_HEIGHT_MM - mm)
}

fn color(c: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        c.0 as f32 / 255.0,
        c.1 as f32 / 255.0,
        c.2 as f32 / 255.0
    )
}

/// Encodes text as a WinAnsi PDF string literal body.
fn pdf_string(text: &str, out: &mut Vec<u8>) {
    let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    for byte in encoded.iter() {
        match byte {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(*byte);
            }
            b'\r' | b'\n' => out.push(b' '),
            _ => out.push(*byte),
        }
    }
}

fn content_stream(page: &Page) -> Vec<u8> {
    let mut out = Vec::new();

    for element in &page.elements {
        match element {
            Element::FillRect { x, y, w, h, color: c } => {
                out.extend_from_slice(
                    format!(
                        "{} rg\n{:.2} {:.2} {:.2} {:.2} re f\n",
                        color(*c),
                        pt(*x),
                        pdf_y(y + h),
                        pt(*w),
                        pt(*h)
                    )
                    .as_bytes(),
                );
            }
            Element::Line { x1, y1, x2, y2, color: c } => {
                out.extend_from_slice(
                    format!(
                        "{} RG\n0.57 w\n{:.2} {:.2} m {:.2} {:.2} l S\n",
                        color(*c),
                        pt(*x1),
                        pdf_y(*y1),
                        pt(*x2),
                        pdf_y(*y2)
                    )
                    .as_bytes(),
                );
            }
            Element::Text { x, y, size, color: c, text } => {
                out.extend_from_slice(
                    format!(
                        "BT\n/F1 {:.1} Tf\n{} rg\n{:.2} {:.2} Td\n(",
                        size,
                        color(*c),
                        pt(*x),
                        pdf_y(*y)
                    )
                    .as_bytes(),
                );
                pdf_string(text, &mut out);
                out.extend_from_slice(b") Tj\nET\n");
            }
        }
    }

    out
}

fn object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &[u8]) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"\nendobj\n");
}

/// Serializes pages into a PDF file.
///
/// Object layout: 1 catalog, 2 page tree, 3 font, then a page object and
/// its content stream for every page.
pub fn write_pdf(pages: &[Page]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    object(&mut out, &mut offsets, 1, b"<< /Type /Catalog /Pages 2 0 R >>");
    object(
        &mut out,
        &mut offsets,
        2,
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()).as_bytes(),
    );
    object(
        &mut out,
        &mut offsets,
        3,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );

    for (page, id) in pages.iter().zip(&page_ids) {
        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            pt(PAGE_WIDTH_MM),
            pt(PAGE_HEIGHT_MM),
            id + 1
        );
        object(&mut out, &mut offsets, *id, page_dict.as_bytes());

        let content = content_stream(page);
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        object(&mut out, &mut offsets, id + 1, &stream);
    }

    let xref_at = out.len();
    let size = offsets.len() + 1;
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", size).as_bytes());
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, xref_at
        )
        .as_bytes(),
    );

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
