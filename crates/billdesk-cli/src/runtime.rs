// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use billdesk_app::{FilterState, FormPayload, InvoicePreview, ViewKind};
use std::fs;
use std::path::PathBuf;

/// Stands in for persistence: submissions and filter changes are logged,
/// printing writes the invoice as plain text.
pub struct PlaceholderRuntime {
    print_dir: PathBuf,
}

impl PlaceholderRuntime {
    pub fn new(print_dir: PathBuf) -> Self {
        Self { print_dir }
    }

    fn next_print_path(&self, preview: &InvoicePreview) -> PathBuf {
        let stem = format!(
            "invoice-{}-{}",
            slug(preview.client_label(), "client"),
            slug(&preview.invoice_date, "undated")
        );
        let mut candidate = self.print_dir.join(format!("{stem}.txt"));
        let mut suffix = 2;
        while candidate.exists() {
            candidate = self.print_dir.join(format!("{stem}-{suffix}.txt"));
            suffix += 1;
        }
        candidate
    }
}

impl billdesk_tui::AppRuntime for PlaceholderRuntime {
    fn submit_form(&mut self, payload: &FormPayload) -> Result<()> {
        match payload {
            FormPayload::Project(form) => {
                tracing::info!(
                    name = %form.name,
                    client = %form.client,
                    status = form.status.as_str(),
                    hourly_rate = %form.hourly_rate,
                    deadline = %form.deadline,
                    "project submitted"
                );
            }
            FormPayload::Payment(form) => {
                tracing::info!(
                    client = %form.client,
                    invoice = %form.invoice_ref,
                    amount = %form.amount,
                    date = %form.payment_date,
                    method = form.method.as_str(),
                    "payment recorded"
                );
            }
            FormPayload::Invoice(preview) => {
                let totals = preview.totals.display();
                tracing::info!(
                    client = preview.client_label(),
                    date = %preview.invoice_date,
                    due = %preview.due_date,
                    lines = preview.lines.len(),
                    total = %totals.total,
                    "invoice created"
                );
            }
        }
        Ok(())
    }

    fn apply_filters(&mut self, view: ViewKind, filters: &FilterState) -> Result<()> {
        match view {
            ViewKind::Invoices => {
                tracing::info!(status = filters.invoice_status_label(), "filtering invoices");
            }
            _ => {
                tracing::info!(
                    status = filters.project_status_label(),
                    client = filters.client_label(),
                    "filtering projects"
                );
            }
        }
        Ok(())
    }

    fn print_invoice(&mut self, preview: &InvoicePreview) -> Result<PathBuf> {
        fs::create_dir_all(&self.print_dir).with_context(|| {
            format!(
                "create print directory {} -- set [invoice].print_dir to a writable path",
                self.print_dir.display()
            )
        })?;
        let path = self.next_print_path(preview);
        let mut text = preview.render_text();
        text.push('\n');
        fs::write(&path, text)
            .with_context(|| format!("write invoice to {}", path.display()))?;
        tracing::info!(path = %path.display(), "invoice printed");
        Ok(path)
    }

    fn send_invoice(&mut self, preview: &InvoicePreview) -> Result<()> {
        let totals = preview.totals.display();
        tracing::info!(
            client = preview.client_label(),
            total = %totals.total,
            "invoice sent"
        );
        Ok(())
    }
}

/// Reduces free text to `[a-z0-9-]` so it can only ever name a file inside
/// the print directory.
fn slug(value: &str, fallback: &str) -> String {
    let mut out = String::new();
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed.to_owned()
    }
}
