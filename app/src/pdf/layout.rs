//! Places every block of an invoice on A4 pages without touching printpdf.
//!
//! Coordinates follow PDF conventions: millimeters, origin at the bottom-left
//! corner. A single cursor walks down the page; `y` is always the baseline of
//! the next row.

use log::debug;

use crate::models::{Invoice, InvoiceStatus};
use crate::totals::{invoice_total, outstanding_balance, qualifying_costs};

use super::format::{display_date, fit_chars, split_and_wrap_lines, wrap_text_lines};
use super::DocumentTemplate;

pub const PAGE_W: f32 = 210.0;
pub const PAGE_H: f32 = 297.0;
pub const MARGIN_X: f32 = 25.0;
pub const MARGIN_TOP: f32 = 25.0;
/// Footer baseline.
pub const FOOTER_Y: f32 = 15.0;
/// Lowest baseline body rows may use; everything below belongs to the footer.
pub const CONTENT_BOTTOM: f32 = 30.0;

pub const CONTENT_RIGHT: f32 = PAGE_W - MARGIN_X;
const TOP_Y: f32 = PAGE_H - MARGIN_TOP;

// Line-item table: description, load #, driver, truck. Amount is right-aligned
// at the content edge.
const COL_X: [f32; 4] = [MARGIN_X, MARGIN_X + 45.0, MARGIN_X + 75.0, MARGIN_X + 110.0];
const COL_CHARS: [usize; 4] = [24, 15, 18, 12];
const TOTALS_X: f32 = CONTENT_RIGHT - 75.0;
const NOTES_CHARS: usize = 95;
const LOGO_MAX_W: f32 = 45.0;
const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left edge, right edge or center depending on `align`.
    pub x: f32,
    pub align: Align,
    pub size: f32,
    pub weight: Weight,
    pub gray: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub thickness: f32,
    pub gray: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub runs: Vec<TextRun>,
    pub rule: Option<Rule>,
    /// Distance from this baseline to the next one.
    pub advance: f32,
}

impl Row {
    fn new(advance: f32) -> Self {
        Self {
            advance,
            ..Default::default()
        }
    }

    fn run(mut self, run: TextRun) -> Self {
        if !run.text.is_empty() {
            self.runs.push(run);
        }
        self
    }

    fn rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Header,
    Metadata,
    BillTo,
    Table,
    Totals,
    Route,
    Payment,
    Notes,
}

#[derive(Debug, Clone, PartialEq)]
struct Block {
    kind: BlockKind,
    rows: Vec<Row>,
    gap_after: f32,
}

impl Block {
    /// Vertical distance between the first and last baselines.
    fn span(&self) -> f32 {
        let n = self.rows.len();
        self.rows.iter().take(n.saturating_sub(1)).map(|r| r.advance).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub page: usize,
    pub baseline: f32,
    pub row: Row,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub kind: BlockKind,
    pub page: usize,
    /// Baseline of the first row.
    pub top: f32,
    /// Cursor after the block, gap included: where the next block would start.
    pub bottom: f32,
    pub end_page: usize,
    pub rows: Vec<PlacedRow>,
}

impl PlacedBlock {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flat_map(|r| r.row.runs.iter().map(|t| t.text.as_str()))
    }
}

/// Box reserved for the logo, right-aligned in the header on the first page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoBox {
    pub right: f32,
    pub top: f32,
    pub max_w: f32,
    pub max_h: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub page_count: usize,
    pub blocks: Vec<PlacedBlock>,
    /// Footer runs per page, all on the `FOOTER_Y` baseline.
    pub footers: Vec<Vec<TextRun>>,
    pub logo: Option<LogoBox>,
}

impl DocumentLayout {
    pub fn block(&self, kind: BlockKind) -> Option<&PlacedBlock> {
        self.blocks.iter().find(|b| b.kind == kind)
    }

    pub fn kinds(&self) -> Vec<BlockKind> {
        self.blocks.iter().map(|b| b.kind).collect()
    }
}

struct Builder<'a> {
    t: &'a DocumentTemplate,
}

impl Builder<'_> {
    fn text(&self, text: impl Into<String>, x: f32, size: f32) -> TextRun {
        TextRun {
            text: text.into(),
            x,
            align: Align::Left,
            size,
            weight: Weight::Regular,
            gray: 0.0,
        }
    }

    fn bold(&self, text: impl Into<String>, x: f32, size: f32) -> TextRun {
        TextRun {
            weight: Weight::Bold,
            ..self.text(text, x, size)
        }
    }

    fn right(&self, run: TextRun) -> TextRun {
        TextRun {
            align: Align::Right,
            ..run
        }
    }

    fn label(&self, text: &str, x: f32) -> TextRun {
        TextRun {
            gray: self.t.style.label_gray,
            ..self.bold(text, x, self.t.style.label_size)
        }
    }

    fn heading_row(&self, text: &str) -> Row {
        Row::new(7.0).run(self.label(text, MARGIN_X))
    }

    fn header(&self) -> Block {
        let s = &self.t.style;
        let mut rows = vec![Row::new(8.0).run(self.bold(&self.t.issuer_name, MARGIN_X, s.title_size))];
        if !self.t.issuer_tagline.is_empty() {
            rows.push(Row::new(5.0).run(TextRun {
                gray: s.muted_gray,
                ..self.text(&self.t.issuer_tagline, MARGIN_X, s.body_size)
            }));
        }
        for line in &self.t.contact_lines {
            rows.push(Row::new(4.5).run(TextRun {
                gray: s.label_gray,
                ..self.text(line, MARGIN_X, s.small_size)
            }));
        }
        Block {
            kind: BlockKind::Header,
            rows,
            gap_after: 6.0,
        }
    }

    fn metadata(&self, inv: &Invoice) -> Block {
        let s = &self.t.style;
        let rows = vec![
            Row::new(10.0).rule(Rule {
                x1: MARGIN_X,
                x2: CONTENT_RIGHT,
                thickness: 0.5,
                gray: s.rule_gray,
            }),
            Row::new(7.0)
                .run(self.bold("INVOICE", MARGIN_X, s.title_size - 4.0))
                .run(self.right(self.bold(
                    format!("#{}", inv.invoice_number),
                    CONTENT_RIGHT,
                    s.heading_size,
                ))),
            Row::new(s.line_height)
                .run(self.text(
                    format!("Date: {}", display_date(&inv.created_at)),
                    MARGIN_X,
                    s.body_size,
                ))
                .run(self.right(self.text(
                    format!("Load #: {}", inv.load_number),
                    CONTENT_RIGHT,
                    s.body_size,
                ))),
        ];
        Block {
            kind: BlockKind::Metadata,
            rows,
            gap_after: 6.0,
        }
    }

    fn bill_to(&self, inv: &Invoice) -> Block {
        let rows = vec![
            self.heading_row("BILL TO:"),
            Row::new(self.t.style.line_height).run(self.bold(
                &inv.broker,
                MARGIN_X,
                self.t.style.heading_size,
            )),
        ];
        Block {
            kind: BlockKind::BillTo,
            rows,
            gap_after: self.t.style.block_gap,
        }
    }

    fn table(&self, inv: &Invoice) -> Block {
        let s = &self.t.style;
        let headers = ["DESCRIPTION", "LOAD #", "DRIVER", "TRUCK"];
        let mut head = Row::new(3.0);
        for (h, x) in headers.iter().zip(COL_X) {
            head = head.run(self.label(h, x));
        }
        head = head.run(self.right(self.label("AMOUNT", CONTENT_RIGHT)));

        let mut rows = vec![
            head,
            Row::new(7.0).rule(Rule {
                x1: MARGIN_X,
                x2: CONTENT_RIGHT,
                thickness: 0.3,
                gray: s.rule_gray,
            }),
        ];

        let cells = [
            "Freight Transportation".to_string(),
            fit_chars(&inv.load_number, COL_CHARS[1]),
            fit_chars(&inv.driver, COL_CHARS[2]),
            fit_chars(&inv.truck_number, COL_CHARS[3]),
        ];
        let mut freight = Row::new(7.0);
        for (cell, x) in cells.into_iter().zip(COL_X) {
            freight = freight.run(self.text(cell, x, s.body_size));
        }
        rows.push(freight.run(self.right(self.text(self.t.money(inv.rate), CONTENT_RIGHT, s.body_size))));

        for cost in qualifying_costs(inv.additional_costs()) {
            let lines = wrap_text_lines(&cost.description, COL_CHARS[0]);
            let last = lines.len().saturating_sub(1);
            for (i, line) in lines.into_iter().enumerate() {
                let advance = if i == last { 7.0 } else { 4.5 };
                let mut row = Row::new(advance).run(self.text(line, COL_X[0], s.body_size));
                if i == 0 {
                    row = row.run(self.right(self.text(self.t.money(cost.amount), CONTENT_RIGHT, s.body_size)));
                }
                rows.push(row);
            }
        }

        Block {
            kind: BlockKind::Table,
            rows,
            gap_after: 0.0,
        }
    }

    fn totals(&self, inv: &Invoice) -> Block {
        let s = &self.t.style;
        let rows = vec![
            Row::new(8.0).rule(Rule {
                x1: TOTALS_X,
                x2: CONTENT_RIGHT,
                thickness: 0.5,
                gray: 0.0,
            }),
            Row::new(s.line_height)
                .run(self.bold("TOTAL:", TOTALS_X, s.heading_size))
                .run(self.right(self.bold(
                    self.t.money(invoice_total(inv)),
                    CONTENT_RIGHT,
                    s.heading_size,
                ))),
        ];
        Block {
            kind: BlockKind::Totals,
            rows,
            gap_after: s.block_gap + 4.0,
        }
    }

    fn detail_rows(&self, heading: &str, lines: Vec<String>) -> Vec<Row> {
        let mut rows = vec![self.heading_row(heading)];
        for line in lines {
            rows.push(Row::new(self.t.style.line_height).run(self.text(
                line,
                MARGIN_X,
                self.t.style.body_size,
            )));
        }
        rows
    }

    fn route(&self, inv: &Invoice) -> Option<Block> {
        if !(self.t.sections.route_info && inv.shows_route_info() && inv.has_route_details()) {
            return None;
        }
        let fields = [
            ("From", inv.pickup_location.trim().to_string()),
            ("To", inv.delivery_location.trim().to_string()),
            ("Pickup", display_date(&inv.pickup_date)),
            ("Delivery", display_date(&inv.delivery_date)),
        ];
        let lines = fields
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        Some(Block {
            kind: BlockKind::Route,
            rows: self.detail_rows("ROUTE DETAILS", lines),
            gap_after: self.t.style.block_gap,
        })
    }

    fn payment(&self, inv: &Invoice) -> Option<Block> {
        if !self.t.sections.payment_status || inv.status == InvoiceStatus::Unpaid {
            return None;
        }
        let s = &self.t.style;
        let status = match inv.status {
            InvoiceStatus::Partial => "PARTIAL PAYMENT",
            _ => "PAID",
        };

        let mut lines = Vec::new();
        if let Some(m) = inv.payment_method.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            lines.push(format!("Method: {m}"));
        }
        if let Some(d) = inv.payment_date.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(format!("Date: {}", display_date(d)));
        }
        if let Some(amount) = inv.paid_amount {
            lines.push(format!("Amount paid: {}", self.t.money(amount)));
        }
        if inv.status == InvoiceStatus::Partial {
            lines.push(format!("Balance due: {}", self.t.money(outstanding_balance(inv))));
        }

        let mut rows = self.detail_rows("PAYMENT STATUS", lines);
        rows.insert(1, Row::new(s.line_height).run(self.bold(status, MARGIN_X, s.body_size)));
        Some(Block {
            kind: BlockKind::Payment,
            rows,
            gap_after: s.block_gap,
        })
    }

    fn notes(&self, inv: &Invoice) -> Option<Block> {
        if !self.t.sections.notes || inv.notes.trim().is_empty() {
            return None;
        }
        let s = &self.t.style;
        let mut rows = vec![self.heading_row("NOTES")];
        for line in split_and_wrap_lines(&inv.notes, NOTES_CHARS) {
            rows.push(Row::new(4.5).run(self.text(line, MARGIN_X, s.small_size)));
        }
        Some(Block {
            kind: BlockKind::Notes,
            rows,
            gap_after: s.block_gap,
        })
    }

    fn footer(&self, page: usize, page_count: usize) -> Vec<TextRun> {
        let s = &self.t.style;
        let mut runs = Vec::new();
        if !self.t.payment_terms.is_empty() {
            runs.push(TextRun {
                align: Align::Center,
                gray: s.muted_gray,
                ..self.text(&self.t.payment_terms, PAGE_W / 2.0, s.small_size)
            });
        }
        if page_count > 1 {
            runs.push(TextRun {
                gray: s.muted_gray,
                ..self.right(self.text(
                    format!("Page {} of {}", page + 1, page_count),
                    CONTENT_RIGHT,
                    s.label_size,
                ))
            });
        }
        runs
    }
}

fn place(blocks: Vec<Block>) -> (Vec<PlacedBlock>, usize) {
    let mut placed = Vec::with_capacity(blocks.len());
    let mut page = 0;
    let mut y = TOP_Y;

    for block in blocks {
        if block.rows.is_empty() {
            continue;
        }
        // A block that does not fit starts on a fresh page. If it is taller
        // than a page it is then split between rows below.
        if y - block.span() < CONTENT_BOTTOM && y < TOP_Y {
            debug!("{:?} does not fit on page {}, moving on", block.kind, page + 1);
            page += 1;
            y = TOP_Y;
        }

        let start_page = page;
        let top = y;
        let mut rows = Vec::with_capacity(block.rows.len());
        for row in block.rows {
            if y < CONTENT_BOTTOM {
                debug!("{:?} continues on page {}", block.kind, page + 2);
                page += 1;
                y = TOP_Y;
            }
            let advance = row.advance;
            rows.push(PlacedRow {
                page,
                baseline: y,
                row,
            });
            y -= advance;
        }
        y -= block.gap_after;

        placed.push(PlacedBlock {
            kind: block.kind,
            page: start_page,
            top,
            bottom: y,
            end_page: page,
            rows,
        });
    }

    (placed, page + 1)
}

/// Computes the complete page layout of `invoice` under `template`. Blocks
/// left out take no space.
pub fn plan_invoice(invoice: &Invoice, template: &DocumentTemplate) -> DocumentLayout {
    let b = Builder { t: template };
    let mut blocks = vec![
        b.header(),
        b.metadata(invoice),
        b.bill_to(invoice),
        b.table(invoice),
        b.totals(invoice),
    ];
    blocks.extend(b.route(invoice));
    blocks.extend(b.payment(invoice));
    blocks.extend(b.notes(invoice));

    let (blocks, page_count) = place(blocks);
    let footers = (0..page_count).map(|p| b.footer(p, page_count)).collect();

    let logo = template.logo_url.as_ref().and_then(|_| {
        let header = blocks.iter().find(|blk| blk.kind == BlockKind::Header)?;
        let last = header.rows.last()?.baseline;
        let top = header.top + template.style.title_size * PT_TO_MM * 0.75;
        Some(LogoBox {
            right: CONTENT_RIGHT,
            top,
            max_w: LOGO_MAX_W,
            max_h: (top - last).max(12.0),
        })
    });

    debug!(
        "invoice {} laid out on {} page(s): {:?}",
        invoice.invoice_number,
        page_count,
        blocks.iter().map(|blk| blk.kind).collect::<Vec<_>>()
    );

    DocumentLayout {
        page_count,
        blocks,
        footers,
        logo,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::AdditionalCost;

    pub(crate) fn sample_invoice() -> Invoice {
        Invoice {
            id: "0198a0c2-0000-7000-8000-000000000001".into(),
            invoice_number: "INV-2508-76430".into(),
            load_number: "76430".into(),
            broker: "ABC Logistics".into(),
            driver: "John Smith".into(),
            truck_number: "TRK-001".into(),
            rate: 650.0,
            pickup_location: "Dallas, TX".into(),
            delivery_location: "Houston, TX".into(),
            pickup_date: "2025-08-12".into(),
            delivery_date: "2025-08-13".into(),
            notes: String::new(),
            status: InvoiceStatus::Unpaid,
            payment_method: None,
            payment_date: None,
            paid_amount: None,
            created_at: "2025-08-12T10:00:00Z".into(),
            additional_costs: Some(vec![
                AdditionalCost::new("Fuel Surcharge", 50.0),
                AdditionalCost::new("Detention", 35.0),
                AdditionalCost::new("", 10.0),
                AdditionalCost::new("Lumper", 0.0),
            ]),
            include_route_info: Some(true),
        }
    }

    fn texts(layout: &DocumentLayout, kind: BlockKind) -> Vec<String> {
        layout
            .block(kind)
            .map(|b| b.texts().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn blocks_follow_template_order() {
        let layout = plan_invoice(&sample_invoice(), &DocumentTemplate::default());
        assert_eq!(
            layout.kinds(),
            vec![
                BlockKind::Header,
                BlockKind::Metadata,
                BlockKind::BillTo,
                BlockKind::Table,
                BlockKind::Totals,
                BlockKind::Route,
            ]
        );
        assert_eq!(layout.page_count, 1);
        assert!(layout.logo.is_none());
        assert!(texts(&layout, BlockKind::Header).contains(&"HAUL-IT PRO".to_string()));
        let meta = texts(&layout, BlockKind::Metadata);
        assert!(meta.contains(&"#INV-2508-76430".to_string()));
        assert!(meta.contains(&"Date: 8/12/2025".to_string()));
    }

    #[test]
    fn table_lists_only_qualifying_costs() {
        let layout = plan_invoice(&sample_invoice(), &DocumentTemplate::default());
        let table = texts(&layout, BlockKind::Table);
        assert!(table.contains(&"Freight Transportation".to_string()));
        assert!(table.contains(&"$650.00".to_string()));
        assert!(table.contains(&"Fuel Surcharge".to_string()));
        assert!(table.contains(&"Detention".to_string()));
        assert!(!table.contains(&"Lumper".to_string()));
        assert!(!table.contains(&"$10.00".to_string()));
        // header, rule, freight, two costs
        assert_eq!(layout.block(BlockKind::Table).unwrap().rows.len(), 5);

        assert!(texts(&layout, BlockKind::Totals).contains(&"$735.00".to_string()));
    }

    #[test]
    fn every_counted_cost_has_a_table_row() {
        let mut inv = sample_invoice();
        inv.additional_costs = Some(vec![
            AdditionalCost::new("Fuel Surcharge", 85.0),
            AdditionalCost::new("   ", 50.0),
        ]);
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        let table = texts(&layout, BlockKind::Table);
        let totals = texts(&layout, BlockKind::Totals);
        assert!(table.contains(&"$85.00".to_string()));
        assert!(!table.contains(&"$50.00".to_string()));
        assert!(totals.contains(&"$735.00".to_string()));
    }

    #[test]
    fn omitted_route_block_leaves_no_gap() {
        let mut inv = sample_invoice();
        inv.notes = "Call before delivery".into();
        let with = plan_invoice(&inv, &DocumentTemplate::default());

        inv.include_route_info = Some(false);
        let without = plan_invoice(&inv, &DocumentTemplate::default());

        assert!(without.block(BlockKind::Route).is_none());
        let route = with.block(BlockKind::Route).unwrap();
        let notes = without.block(BlockKind::Notes).unwrap();
        assert_eq!(notes.top, route.top);
        assert_eq!(notes.top, without.block(BlockKind::Totals).unwrap().bottom);
    }

    #[test]
    fn route_block_needs_flag_and_content() {
        let mut inv = sample_invoice();
        inv.pickup_location.clear();
        inv.delivery_location.clear();
        inv.pickup_date.clear();
        inv.delivery_date.clear();
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        assert!(layout.block(BlockKind::Route).is_none());

        let mut inv = sample_invoice();
        inv.pickup_location.clear();
        inv.delivery_location.clear();
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        assert!(layout.block(BlockKind::Route).is_none());

        let mut inv = sample_invoice();
        inv.delivery_date.clear();
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        assert_eq!(
            texts(&layout, BlockKind::Route),
            vec!["ROUTE DETAILS", "From: Dallas, TX", "To: Houston, TX", "Pickup: 8/12/2025"]
        );

        let mut template = DocumentTemplate::default();
        template.sections.route_info = false;
        let layout = plan_invoice(&sample_invoice(), &template);
        assert!(layout.block(BlockKind::Route).is_none());
    }

    #[test]
    fn payment_block_only_once_paid_or_partial() {
        let mut inv = sample_invoice();
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        assert!(layout.block(BlockKind::Payment).is_none());

        inv.status = InvoiceStatus::Paid;
        inv.payment_method = Some("ACH".into());
        inv.payment_date = Some("2025-08-20".into());
        inv.paid_amount = Some(735.0);
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        assert_eq!(
            texts(&layout, BlockKind::Payment),
            vec!["PAYMENT STATUS", "PAID", "Method: ACH", "Date: 8/20/2025", "Amount paid: $735.00"]
        );

        inv.status = InvoiceStatus::Partial;
        inv.payment_method = Some(String::new());
        inv.paid_amount = Some(135.0);
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        let payment = texts(&layout, BlockKind::Payment);
        assert!(payment.contains(&"PARTIAL PAYMENT".to_string()));
        assert!(payment.contains(&"Balance due: $600.00".to_string()));
        assert!(!payment.iter().any(|t| t.starts_with("Method")));
    }

    #[test]
    fn notes_are_wrapped_and_skipped_when_blank() {
        let mut inv = sample_invoice();
        inv.notes = "   ".into();
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        assert!(layout.block(BlockKind::Notes).is_none());

        inv.notes = "Driver must check in at the guard shack. ".repeat(10);
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        let notes = texts(&layout, BlockKind::Notes);
        assert!(notes.len() > 2);
        assert!(notes.iter().all(|l| l.chars().count() <= NOTES_CHARS));
    }

    #[test]
    fn long_invoices_paginate_with_footer_on_every_page() {
        let mut inv = sample_invoice();
        inv.additional_costs = Some(
            (1..=60)
                .map(|i| AdditionalCost::new(format!("Stop-off charge {i}"), 25.0))
                .collect(),
        );
        let layout = plan_invoice(&inv, &DocumentTemplate::default());
        assert!(layout.page_count >= 2);
        assert_eq!(layout.footers.len(), layout.page_count);

        for (i, footer) in layout.footers.iter().enumerate() {
            let texts: Vec<&str> = footer.iter().map(|r| r.text.as_str()).collect();
            assert!(texts.contains(&"Payment Terms: Net 30 Days"));
            assert!(texts.contains(&format!("Page {} of {}", i + 1, layout.page_count).as_str()));
        }

        for block in &layout.blocks {
            for row in &block.rows {
                assert!(row.baseline >= CONTENT_BOTTOM);
                assert!(row.baseline <= TOP_Y);
            }
        }

        let table = layout.block(BlockKind::Table).unwrap();
        assert!(table.end_page > table.page);
        let totals = layout.block(BlockKind::Totals).unwrap();
        assert!(totals.rows.iter().all(|r| r.page == totals.page));
    }

    #[test]
    fn single_page_footer_has_no_page_number() {
        let layout = plan_invoice(&sample_invoice(), &DocumentTemplate::default());
        assert_eq!(layout.footers.len(), 1);
        assert_eq!(layout.footers[0].len(), 1);
        assert_eq!(layout.footers[0][0].align, Align::Center);
    }

    #[test]
    fn logo_reserves_space_in_header() {
        let mut template = DocumentTemplate::default();
        template.logo_url = Some("data:image/png;base64,AAAA".into());
        let layout = plan_invoice(&sample_invoice(), &template);
        let logo = layout.logo.unwrap();
        let header = layout.block(BlockKind::Header).unwrap();
        assert!(logo.top > header.top);
        assert_eq!(logo.right, CONTENT_RIGHT);
    }
}
