//! Receipt PDF rendering.
//!
//! A deliberately simple, single-page A5 document: seller details, receipt number, the single
//! line item, the subscription period and the VAT breakdown. Amounts are printed as `THB n.nn`
//! because the document uses the built-in Helvetica font, which has no glyph for the baht sign.
use chrono::{DateTime, Utc};
use dnt_common::{Baht, VAT_RATE_PERCENT};
use dnt_payment_engine::db_types::{Order, Product, Subscription};
use lopdf::{
    content::{Content, Operation},
    dictionary,
    Document,
    Object,
    Stream,
};

use crate::config::CompanyInfo;

// A5 portrait, in points.
const PAGE_WIDTH: i64 = 420;
const PAGE_HEIGHT: i64 = 595;
const MARGIN: f32 = 36.0;

pub struct ReceiptPdf<'a> {
    company: &'a CompanyInfo,
    member_email: &'a str,
    order: &'a Order,
    product: &'a Product,
    subscription: Option<&'a Subscription>,
}

fn thb(amount: Baht) -> String {
    format!("THB {:.2}", amount.value() as f64 / 100.0)
}

/// Accumulates text lines top-down on a single page.
struct PageWriter {
    operations: Vec<Operation>,
    cursor: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self { operations: Vec::new(), cursor: PAGE_HEIGHT as f32 - MARGIN }
    }

    fn line(&mut self, size: f32, text: &str) {
        self.cursor -= size * 1.4;
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), size.into()]),
            Operation::new("Td", vec![MARGIN.into(), self.cursor.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn gap(&mut self, points: f32) {
        self.cursor -= points;
    }
}

impl<'a> ReceiptPdf<'a> {
    pub fn new(
        company: &'a CompanyInfo,
        member_email: &'a str,
        order: &'a Order,
        product: &'a Product,
        subscription: Option<&'a Subscription>,
    ) -> Self {
        Self { company, member_email, order, product, subscription }
    }

    pub fn render(&self) -> Result<Vec<u8>, lopdf::Error> {
        let mut page = PageWriter::new();
        self.write_header(&mut page);
        self.write_details(&mut page);
        self.write_line_item(&mut page);
        self.write_totals(&mut page);
        page.gap(18.0);
        page.line(
            8.0,
            &format!("All prices include {VAT_RATE_PERCENT}% VAT. This receipt was generated electronically."),
        );
        build_document(page.operations)
    }

    fn write_header(&self, page: &mut PageWriter) {
        page.line(16.0, &self.company.name);
        page.line(9.0, &self.company.address);
        page.line(9.0, &format!("Tax ID: {}", self.company.tax_id));
        page.gap(12.0);
        page.line(13.0, "RECEIPT");
    }

    fn write_details(&self, page: &mut PageWriter) {
        let number = self.order.receipt_number.as_ref().map(|n| n.to_string()).unwrap_or_default();
        let issued: DateTime<Utc> = self.order.paid_at.unwrap_or(self.order.updated_at);
        page.line(10.0, &format!("Receipt no: {number}"));
        page.line(10.0, &format!("Date: {}", issued.format("%Y-%m-%d")));
        page.line(10.0, &format!("Order: #{}", self.order.id));
        page.line(10.0, &format!("Billed to: {}", self.member_email));
        page.gap(12.0);
    }

    fn write_line_item(&self, page: &mut PageWriter) {
        page.line(10.0, &format!("1 x {}  -  {}", self.product.title, thb(self.order.total)));
        if let Some(sub) = self.subscription {
            page.line(9.0, &format!("Subscription period: {} to {} (inclusive)", sub.start_date, sub.end_date));
        }
        page.gap(12.0);
    }

    fn write_totals(&self, page: &mut PageWriter) {
        page.line(10.0, &format!("Subtotal (before VAT): {}", thb(self.order.sub_total)));
        page.line(10.0, &format!("VAT ({VAT_RATE_PERCENT}%): {}", thb(self.order.vat_amount())));
        page.line(11.0, &format!("Total: {}", thb(self.order.total)));
    }
}

fn build_document(operations: Vec<Operation>) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
