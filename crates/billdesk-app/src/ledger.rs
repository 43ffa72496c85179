// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Invoice line items and the subtotal/tax/total reduction over them.
//!
//! Quantity and price are kept as the raw text the user typed. Parsing
//! happens only when totals are computed, and anything that does not parse
//! counts as zero so the invoice is always computable.

use serde::{Deserialize, Serialize};

/// Fixed invoice tax rate (10%).
pub const TAX_RATE: f64 = 0.10;

pub const DEFAULT_QUANTITY: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineItemId(u64);

impl LineItemId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineItemField {
    Description,
    Quantity,
    UnitPrice,
}

impl LineItemField {
    pub const ALL: [Self; 3] = [Self::Description, Self::Quantity, Self::UnitPrice];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Quantity => "qty",
            Self::UnitPrice => "price",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Quantity | Self::UnitPrice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
}

impl LineItem {
    fn blank(id: LineItemId) -> Self {
        Self {
            id,
            description: String::new(),
            quantity: DEFAULT_QUANTITY.to_owned(),
            unit_price: String::new(),
        }
    }

    pub fn quantity(&self) -> f64 {
        parse_numeric_or_default(&self.quantity, 0.0)
    }

    pub fn unit_price(&self) -> f64 {
        parse_numeric_or_default(&self.unit_price, 0.0)
    }

    pub fn line_total(&self) -> f64 {
        self.quantity() * self.unit_price()
    }

    pub fn field(&self, field: LineItemField) -> &str {
        match field {
            LineItemField::Description => &self.description,
            LineItemField::Quantity => &self.quantity,
            LineItemField::UnitPrice => &self.unit_price,
        }
    }

    fn field_mut(&mut self, field: LineItemField) -> &mut String {
        match field {
            LineItemField::Description => &mut self.description,
            LineItemField::Quantity => &mut self.quantity,
            LineItemField::UnitPrice => &mut self.unit_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl InvoiceTotals {
    pub fn from_subtotal(subtotal: f64) -> Self {
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    pub fn display(&self) -> TotalsDisplay {
        TotalsDisplay {
            subtotal: format_currency(self.subtotal),
            tax: format_currency(self.tax),
            total: format_currency(self.total),
        }
    }
}

/// The three rendered total fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

/// Ordered line items of an invoice being composed. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    items: Vec<LineItem>,
    next_id: u64,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self {
            items: vec![LineItem::blank(LineItemId::new(1))],
            next_id: 2,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: LineItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn add_row(&mut self) -> LineItemId {
        let id = LineItemId::new(self.next_id);
        self.next_id += 1;
        self.items.push(LineItem::blank(id));
        id
    }

    /// Removes a row. Returns false when the row is unknown or is the last one.
    pub fn remove_row(&mut self, id: LineItemId) -> bool {
        if self.items.len() <= 1 {
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };
        self.items.remove(index);
        true
    }

    /// Stores `raw` verbatim. Returns false for an unknown row.
    pub fn update_field(&mut self, id: LineItemId, field: LineItemField, raw: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        let slot = item.field_mut(field);
        slot.clear();
        slot.push_str(raw);
        true
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_subtotal(self.items.iter().map(LineItem::line_total).sum())
    }
}

/// Parses the longest leading numeric prefix of `raw`, like a lenient
/// browser float parse. No numeric prefix or a non-finite result yields
/// `default`.
pub fn parse_numeric_or_default(raw: &str, default: f64) -> f64 {
    let trimmed = raw.trim();
    let end = numeric_prefix_len(trimmed);
    if end == 0 {
        return default;
    }
    match trimmed[..end].parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => default,
    }
}

fn numeric_prefix_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut index = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        index += 1;
    }

    let int_start = index;
    while bytes.get(index).is_some_and(u8::is_ascii_digit) {
        index += 1;
    }
    let mut digits = index - int_start;

    if bytes.get(index) == Some(&b'.') {
        let frac_start = index + 1;
        let mut cursor = frac_start;
        while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
            cursor += 1;
        }
        let frac_digits = cursor - frac_start;
        if digits + frac_digits > 0 {
            index = cursor;
            digits += frac_digits;
        }
    }
    if digits == 0 {
        return 0;
    }

    if matches!(bytes.get(index), Some(b'e' | b'E')) {
        let mut cursor = index + 1;
        if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
            cursor += 1;
        }
        let exp_start = cursor;
        while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
            cursor += 1;
        }
        if cursor > exp_start {
            index = cursor;
        }
    }
    index
}

/// Renders `value` as dollars and cents. Half cents round away from zero;
/// anything that rounds to zero renders unsigned.
pub fn format_currency(value: f64) -> String {
    let magnitude = value.abs();
    let rendered = match half_cent_tie(magnitude) {
        Some(cents) => format!("{}.{:02}", cents / 100, cents % 100),
        None => format!("{magnitude:.2}"),
    };
    if value.is_sign_negative() && rendered != "0.00" {
        format!("$-{rendered}")
    } else {
        format!("${rendered}")
    }
}

// `{:.2}` breaks exact ties toward the even digit. A value lands exactly on
// a half cent only when it is an odd number of eighths, and scaling by 8 is
// exact, so the tie check needs no tolerance.
fn half_cent_tie(magnitude: f64) -> Option<u128> {
    let eighths = magnitude * 8.0;
    if !eighths.is_finite() || eighths.fract() != 0.0 || eighths % 2.0 != 1.0 {
        return None;
    }
    Some((eighths as u128 * 25 + 1) / 2)
}

#[cfg(test)]
mod tests {
    use super::{
        InvoiceDraft, InvoiceTotals, LineItemField, LineItemId, format_currency,
        parse_numeric_or_default,
    };

    fn priced_draft(rows: &[(&str, &str)]) -> InvoiceDraft {
        let mut draft = InvoiceDraft::new();
        for _ in 1..rows.len() {
            draft.add_row();
        }
        let ids = draft.items().iter().map(|item| item.id).collect::<Vec<_>>();
        for (id, (qty, price)) in ids.into_iter().zip(rows) {
            draft.update_field(id, LineItemField::Quantity, qty);
            draft.update_field(id, LineItemField::UnitPrice, price);
        }
        draft
    }

    #[test]
    fn new_draft_has_one_default_row_worth_nothing() {
        let draft = InvoiceDraft::new();
        assert_eq!(draft.len(), 1);
        assert_eq!(draft.items()[0].quantity, "1");
        assert_eq!(draft.items()[0].unit_price, "");
        let display = draft.totals().display();
        assert_eq!(display.subtotal, "$0.00");
        assert_eq!(display.tax, "$0.00");
        assert_eq!(display.total, "$0.00");
    }

    #[test]
    fn single_row_totals() {
        let draft = priced_draft(&[("2", "10.00")]);
        let display = draft.totals().display();
        assert_eq!(display.subtotal, "$20.00");
        assert_eq!(display.tax, "$2.00");
        assert_eq!(display.total, "$22.00");
    }

    #[test]
    fn tax_rounds_to_cents_when_displayed() {
        let draft = priced_draft(&[("1", "9.99"), ("3", "0")]);
        let display = draft.totals().display();
        assert_eq!(display.subtotal, "$9.99");
        assert_eq!(display.tax, "$1.00");
        assert_eq!(display.total, "$10.99");
    }

    #[test]
    fn subtotal_is_sum_of_line_totals() {
        let draft = priced_draft(&[("1.5", "4"), ("-2", "3"), ("0", "100"), ("4", "0.25")]);
        let totals = draft.totals();
        assert!((totals.subtotal - 1.0).abs() < 1e-9);
        assert!((totals.tax - 0.1).abs() < 1e-9);
        assert!((totals.total - (totals.subtotal + totals.tax)).abs() < 1e-12);
    }

    #[test]
    fn removing_last_row_is_refused() {
        let mut draft = InvoiceDraft::new();
        let only = draft.items()[0].id;
        assert!(!draft.remove_row(only));
        assert_eq!(draft.len(), 1);
    }

    #[test]
    fn removing_unknown_row_is_a_noop() {
        let mut draft = InvoiceDraft::new();
        draft.add_row();
        assert!(!draft.remove_row(LineItemId::new(99)));
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn add_then_remove_leaves_totals_unchanged() {
        let mut draft = priced_draft(&[("3", "7.25")]);
        let before = draft.totals();
        let added = draft.add_row();
        assert_eq!(draft.totals(), before);
        assert!(draft.remove_row(added));
        assert_eq!(draft.totals(), before);
        assert_eq!(draft.len(), 1);
    }

    #[test]
    fn row_ids_are_not_reused_after_removal() {
        let mut draft = InvoiceDraft::new();
        let second = draft.add_row();
        assert!(draft.remove_row(second));
        let third = draft.add_row();
        assert_ne!(second, third);
    }

    #[test]
    fn unparsable_fields_contribute_zero_but_keep_raw_text() {
        let mut draft = priced_draft(&[("2", "5"), ("abc", "10")]);
        let second = draft.items()[1].id;
        assert_eq!(draft.items()[1].quantity, "abc");
        assert_eq!(draft.totals().display().subtotal, "$10.00");

        draft.update_field(second, LineItemField::Quantity, "");
        assert_eq!(draft.len(), 2);
        assert_eq!(draft.totals().display().subtotal, "$10.00");
    }

    #[test]
    fn description_edits_do_not_change_totals() {
        let mut draft = priced_draft(&[("1", "12")]);
        let id = draft.items()[0].id;
        let before = draft.totals();
        assert!(draft.update_field(id, LineItemField::Description, "Logo design"));
        assert_eq!(draft.items()[0].description, "Logo design");
        assert_eq!(draft.totals(), before);
    }

    #[test]
    fn parse_numeric_handles_lenient_inputs() {
        assert_eq!(parse_numeric_or_default("", 0.0), 0.0);
        assert_eq!(parse_numeric_or_default("   ", 0.0), 0.0);
        assert_eq!(parse_numeric_or_default("abc", 0.0), 0.0);
        assert_eq!(parse_numeric_or_default("-", 0.0), 0.0);
        assert_eq!(parse_numeric_or_default(".", 0.0), 0.0);
        assert_eq!(parse_numeric_or_default(" 3.5 ", 0.0), 3.5);
        assert_eq!(parse_numeric_or_default("12abc", 0.0), 12.0);
        assert_eq!(parse_numeric_or_default(".5", 0.0), 0.5);
        assert_eq!(parse_numeric_or_default("5.", 0.0), 5.0);
        assert_eq!(parse_numeric_or_default("-2.25", 0.0), -2.25);
        assert_eq!(parse_numeric_or_default("+4", 0.0), 4.0);
        assert_eq!(parse_numeric_or_default("1e3", 0.0), 1000.0);
        assert_eq!(parse_numeric_or_default("2e", 0.0), 2.0);
        assert_eq!(parse_numeric_or_default("1.2.3", 0.0), 1.2);
        assert_eq!(parse_numeric_or_default("inf", 7.0), 7.0);
        assert_eq!(parse_numeric_or_default("1e999", 7.0), 7.0);
    }

    #[test]
    fn currency_format_uses_two_decimals_and_dollar_sign() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-0.0), "$0.00");
        assert_eq!(format_currency(1234.5), "$1234.50");
        assert_eq!(format_currency(0.126), "$0.13");
        assert_eq!(format_currency(0.124), "$0.12");
        assert_eq!(format_currency(-5.0), "$-5.00");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn half_cents_round_away_from_zero() {
        assert_eq!(format_currency(0.125), "$0.13");
        assert_eq!(format_currency(0.375), "$0.38");
        assert_eq!(format_currency(2.875), "$2.88");
        assert_eq!(format_currency(-0.125), "$-0.13");
        // 1.005 is stored just below the half cent
        assert_eq!(format_currency(1.005), "$1.00");
    }

    #[test]
    fn half_cent_tax_rounds_up_like_the_subtotal() {
        let display = priced_draft(&[("1", "6.25")]).totals().display();
        assert_eq!(display.subtotal, "$6.25");
        assert_eq!(display.tax, "$0.63");
        assert_eq!(display.total, "$6.88");

        let display = priced_draft(&[("1", "0.125")]).totals().display();
        assert_eq!(display.subtotal, "$0.13");
    }

    #[test]
    fn totals_from_subtotal_applies_fixed_rate() {
        let totals = InvoiceTotals::from_subtotal(150.0);
        assert_eq!(totals.display().tax, "$15.00");
        assert_eq!(totals.display().total, "$165.00");
    }
}
