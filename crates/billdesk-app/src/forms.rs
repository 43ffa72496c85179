// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Duration};

use crate::{
    FormKind, InvoiceDraft, InvoicePreview, LineItemField, LineItemId, PaymentMethod,
    ProjectStatus,
};

pub const INVOICE_DUE_DAYS: i64 = 15;

/// `YYYY-MM-DD`, the form date inputs' format.
pub fn format_date(value: Date) -> String {
    value.to_string()
}

pub fn default_due_date(today: Date) -> Date {
    today.saturating_add(Duration::days(INVOICE_DUE_DAYS))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFormInput {
    pub name: String,
    pub client: String,
    pub status: ProjectStatus,
    pub hourly_rate: String,
    pub deadline: String,
    pub description: String,
}

impl ProjectFormInput {
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            client: String::new(),
            status: ProjectStatus::Active,
            hourly_rate: String::new(),
            deadline: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFormInput {
    pub client: String,
    pub invoice_ref: String,
    pub amount: String,
    pub payment_date: String,
    pub method: PaymentMethod,
}

impl PaymentFormInput {
    pub fn blank(today: Date) -> Self {
        Self {
            client: String::new(),
            invoice_ref: String::new(),
            amount: String::new(),
            payment_date: format_date(today),
            method: PaymentMethod::BankTransfer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFormInput {
    pub client: String,
    pub invoice_date: String,
    pub due_date: String,
    pub notes: String,
    pub draft: InvoiceDraft,
}

impl InvoiceFormInput {
    pub fn blank(today: Date) -> Self {
        Self {
            client: String::new(),
            invoice_date: format_date(today),
            due_date: format_date(default_due_date(today)),
            notes: String::new(),
            draft: InvoiceDraft::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Client,
    Status,
    HourlyRate,
    Deadline,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    Client,
    InvoiceRef,
    Amount,
    Date,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    Client,
    InvoiceDate,
    DueDate,
    Notes,
}

/// One focusable input across the three forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Project(ProjectField),
    Payment(PaymentField),
    Invoice(InvoiceField),
    LineItem(LineItemId, LineItemField),
}

impl FormField {
    pub const fn is_choice(self) -> bool {
        matches!(
            self,
            Self::Project(ProjectField::Status) | Self::Payment(PaymentField::Method)
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Project(field) => match field {
                ProjectField::Name => "project name",
                ProjectField::Client => "client",
                ProjectField::Status => "status",
                ProjectField::HourlyRate => "hourly rate",
                ProjectField::Deadline => "deadline",
                ProjectField::Description => "description",
            },
            Self::Payment(field) => match field {
                PaymentField::Client => "client",
                PaymentField::InvoiceRef => "invoice",
                PaymentField::Amount => "amount",
                PaymentField::Date => "payment date",
                PaymentField::Method => "method",
            },
            Self::Invoice(field) => match field {
                InvoiceField::Client => "client",
                InvoiceField::InvoiceDate => "invoice date",
                InvoiceField::DueDate => "due date",
                InvoiceField::Notes => "notes",
            },
            Self::LineItem(_, field) => field.label(),
        }
    }
}

const PROJECT_FIELDS: [ProjectField; 6] = [
    ProjectField::Name,
    ProjectField::Client,
    ProjectField::Status,
    ProjectField::HourlyRate,
    ProjectField::Deadline,
    ProjectField::Description,
];

const PAYMENT_FIELDS: [PaymentField; 5] = [
    PaymentField::Client,
    PaymentField::InvoiceRef,
    PaymentField::Amount,
    PaymentField::Date,
    PaymentField::Method,
];

const INVOICE_FIELDS: [InvoiceField; 4] = [
    InvoiceField::Client,
    InvoiceField::InvoiceDate,
    InvoiceField::DueDate,
    InvoiceField::Notes,
];

#[derive(Debug, Clone, PartialEq)]
pub enum FormPayload {
    Project(ProjectFormInput),
    Payment(PaymentFormInput),
    Invoice(InvoicePreview),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Project(_) => FormKind::Project,
            Self::Payment(_) => FormKind::Payment,
            Self::Invoice(_) => FormKind::Invoice,
        }
    }
}

/// Drafts of every form on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forms {
    pub project: ProjectFormInput,
    pub payment: PaymentFormInput,
    pub invoice: InvoiceFormInput,
}

impl Forms {
    pub fn new(today: Date) -> Self {
        Self {
            project: ProjectFormInput::blank(),
            payment: PaymentFormInput::blank(today),
            invoice: InvoiceFormInput::blank(today),
        }
    }

    pub fn reset(&mut self, kind: FormKind, today: Date) {
        match kind {
            FormKind::Project => self.project = ProjectFormInput::blank(),
            FormKind::Payment => self.payment = PaymentFormInput::blank(today),
            FormKind::Invoice => self.invoice = InvoiceFormInput::blank(today),
        }
    }

    /// Focus order of a form. Invoice line items follow the header fields
    /// in row order.
    pub fn fields(&self, kind: FormKind) -> Vec<FormField> {
        match kind {
            FormKind::Project => PROJECT_FIELDS.into_iter().map(FormField::Project).collect(),
            FormKind::Payment => PAYMENT_FIELDS.into_iter().map(FormField::Payment).collect(),
            FormKind::Invoice => {
                let mut fields = INVOICE_FIELDS
                    .into_iter()
                    .map(FormField::Invoice)
                    .collect::<Vec<_>>();
                for item in self.invoice.draft.items() {
                    fields.extend(
                        LineItemField::ALL
                            .into_iter()
                            .map(|field| FormField::LineItem(item.id, field)),
                    );
                }
                fields
            }
        }
    }

    pub fn value(&self, field: FormField) -> Option<String> {
        let value = match field {
            FormField::Project(field) => match field {
                ProjectField::Name => self.project.name.clone(),
                ProjectField::Client => self.project.client.clone(),
                ProjectField::Status => self.project.status.as_str().to_owned(),
                ProjectField::HourlyRate => self.project.hourly_rate.clone(),
                ProjectField::Deadline => self.project.deadline.clone(),
                ProjectField::Description => self.project.description.clone(),
            },
            FormField::Payment(field) => match field {
                PaymentField::Client => self.payment.client.clone(),
                PaymentField::InvoiceRef => self.payment.invoice_ref.clone(),
                PaymentField::Amount => self.payment.amount.clone(),
                PaymentField::Date => self.payment.payment_date.clone(),
                PaymentField::Method => self.payment.method.as_str().to_owned(),
            },
            FormField::Invoice(field) => match field {
                InvoiceField::Client => self.invoice.client.clone(),
                InvoiceField::InvoiceDate => self.invoice.invoice_date.clone(),
                InvoiceField::DueDate => self.invoice.due_date.clone(),
                InvoiceField::Notes => self.invoice.notes.clone(),
            },
            FormField::LineItem(id, field) => self.invoice.draft.get(id)?.field(field).to_owned(),
        };
        Some(value)
    }

    /// Replaces a text field's content. Choice fields and unknown line
    /// items are left untouched and report false.
    pub fn set_text(&mut self, field: FormField, raw: &str) -> bool {
        let slot = match field {
            FormField::Project(field) => match field {
                ProjectField::Name => &mut self.project.name,
                ProjectField::Client => &mut self.project.client,
                ProjectField::HourlyRate => &mut self.project.hourly_rate,
                ProjectField::Deadline => &mut self.project.deadline,
                ProjectField::Description => &mut self.project.description,
                ProjectField::Status => return false,
            },
            FormField::Payment(field) => match field {
                PaymentField::Client => &mut self.payment.client,
                PaymentField::InvoiceRef => &mut self.payment.invoice_ref,
                PaymentField::Amount => &mut self.payment.amount,
                PaymentField::Date => &mut self.payment.payment_date,
                PaymentField::Method => return false,
            },
            FormField::Invoice(field) => match field {
                InvoiceField::Client => &mut self.invoice.client,
                InvoiceField::InvoiceDate => &mut self.invoice.invoice_date,
                InvoiceField::DueDate => &mut self.invoice.due_date,
                InvoiceField::Notes => &mut self.invoice.notes,
            },
            FormField::LineItem(id, field) => {
                return self.invoice.draft.update_field(id, field, raw);
            }
        };
        slot.clear();
        slot.push_str(raw);
        true
    }

    /// Steps a choice field and returns its new label.
    pub fn cycle_choice(&mut self, field: FormField, delta: isize) -> Option<&'static str> {
        match field {
            FormField::Project(ProjectField::Status) => {
                self.project.status = step(&ProjectStatus::ALL, self.project.status, delta);
                Some(self.project.status.as_str())
            }
            FormField::Payment(PaymentField::Method) => {
                self.payment.method = step(&PaymentMethod::ALL, self.payment.method, delta);
                Some(self.payment.method.as_str())
            }
            _ => None,
        }
    }
}

fn step<T: Copy + PartialEq>(choices: &[T], current: T, delta: isize) -> T {
    let len = choices.len() as isize;
    let index = choices
        .iter()
        .position(|choice| *choice == current)
        .unwrap_or(0) as isize;
    choices[(index + delta).rem_euclid(len) as usize]
}
