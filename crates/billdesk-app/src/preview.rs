// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{InvoiceFormInput, InvoiceTotals, TAX_RATE, format_currency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewLine {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

/// A submitted invoice, frozen for preview, print, and send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicePreview {
    pub client: String,
    pub invoice_date: String,
    pub due_date: String,
    pub notes: String,
    pub lines: Vec<PreviewLine>,
    pub totals: InvoiceTotals,
}

impl InvoicePreview {
    pub fn from_form(form: &InvoiceFormInput) -> Self {
        let lines = form
            .draft
            .items()
            .iter()
            .map(|item| PreviewLine {
                description: item.description.clone(),
                quantity: item.quantity(),
                unit_price: item.unit_price(),
                amount: item.line_total(),
            })
            .collect();
        Self {
            client: form.client.clone(),
            invoice_date: form.invoice_date.clone(),
            due_date: form.due_date.clone(),
            notes: form.notes.clone(),
            lines,
            totals: form.draft.totals(),
        }
    }

    pub fn client_label(&self) -> &str {
        let trimmed = self.client.trim();
        if trimmed.is_empty() {
            "(no client)"
        } else {
            trimmed
        }
    }

    pub fn render_text(&self) -> String {
        let display = self.totals.display();
        let mut out = vec![
            "INVOICE".to_owned(),
            String::new(),
            format!("bill to:  {}", self.client_label()),
            format!("date:     {}", self.invoice_date),
            format!("due:      {}", self.due_date),
            String::new(),
            format!(
                "{:<32} {:>8} {:>12} {:>12}",
                "description", "qty", "price", "amount"
            ),
        ];
        for line in &self.lines {
            let description = if line.description.trim().is_empty() {
                "-"
            } else {
                line.description.trim()
            };
            out.push(format!(
                "{:<32} {:>8} {:>12} {:>12}",
                description,
                line.quantity,
                format_currency(line.unit_price),
                format_currency(line.amount)
            ));
        }
        out.push(String::new());
        out.push(format!("{:>54} {:>12}", "subtotal", display.subtotal));
        out.push(format!(
            "{:>54} {:>12}",
            format!("tax ({:.0}%)", TAX_RATE * 100.0),
            display.tax
        ));
        out.push(format!("{:>54} {:>12}", "total", display.total));
        if !self.notes.trim().is_empty() {
            out.push(String::new());
            out.push(format!("notes: {}", self.notes.trim()));
        }
        out.join("\n")
    }
}
