// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    Dashboard,
    Projects,
    Invoices,
    Payments,
    Reports,
}

impl ViewKind {
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Projects,
        Self::Invoices,
        Self::Payments,
        Self::Reports,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Projects => "projects",
            Self::Invoices => "invoices",
            Self::Payments => "payments",
            Self::Reports => "reports",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dashboard" => Some(Self::Dashboard),
            "projects" => Some(Self::Projects),
            "invoices" => Some(Self::Invoices),
            "payments" => Some(Self::Payments),
            "reports" => Some(Self::Reports),
            _ => None,
        }
    }

    /// The form a view's primary button opens, if it has one.
    pub const fn form(self) -> Option<FormKind> {
        match self {
            Self::Projects => Some(FormKind::Project),
            Self::Invoices => Some(FormKind::Invoice),
            Self::Payments => Some(FormKind::Payment),
            Self::Dashboard | Self::Reports => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModalKind {
    Project,
    Payment,
    Invoice,
    InvoicePreview,
}

impl ModalKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Project => "add project",
            Self::Payment => "record payment",
            Self::Invoice => "create invoice",
            Self::InvoicePreview => "invoice preview",
        }
    }

    pub const fn form(self) -> Option<FormKind> {
        match self {
            Self::Project => Some(FormKind::Project),
            Self::Payment => Some(FormKind::Payment),
            Self::Invoice => Some(FormKind::Invoice),
            Self::InvoicePreview => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    Project,
    Payment,
    Invoice,
}

impl FormKind {
    pub const fn modal(self) -> ModalKind {
        match self {
            Self::Project => ModalKind::Project,
            Self::Payment => ModalKind::Payment,
            Self::Invoice => ModalKind::Invoice,
        }
    }

    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Project => "Project added successfully!",
            Self::Payment => "Payment recorded successfully!",
            Self::Invoice => "Invoice created successfully!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::OnHold, Self::Completed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    BankTransfer,
    Card,
    Cash,
    PayPal,
    Check,
}

impl PaymentMethod {
    pub const ALL: [Self; 5] = [
        Self::BankTransfer,
        Self::Card,
        Self::Cash,
        Self::PayPal,
        Self::Check,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Card => "card",
            Self::Cash => "cash",
            Self::PayPal => "paypal",
            Self::Check => "check",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Pending, Self::Paid, Self::Overdue];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

/// Selection state of the project and invoice filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub project_status: Option<ProjectStatus>,
    pub client: Option<String>,
    pub invoice_status: Option<InvoiceStatus>,
}

impl FilterState {
    pub fn project_status_label(&self) -> &'static str {
        self.project_status.map_or("all", ProjectStatus::as_str)
    }

    pub fn client_label(&self) -> &str {
        self.client.as_deref().unwrap_or("all")
    }

    pub fn invoice_status_label(&self) -> &'static str {
        self.invoice_status.map_or("all", InvoiceStatus::as_str)
    }
}

/// Steps through `None, Some(choices[0]), ..., Some(choices[n-1])` and wraps.
pub fn cycle_option<T: Clone + PartialEq>(
    current: Option<&T>,
    choices: &[T],
    delta: isize,
) -> Option<T> {
    let len = choices.len() as isize + 1;
    let position = match current {
        None => 0,
        Some(value) => choices
            .iter()
            .position(|choice| choice == value)
            .map_or(0, |index| index as isize + 1),
    };
    let next = (position + delta).rem_euclid(len) as usize;
    if next == 0 {
        None
    } else {
        choices.get(next - 1).cloned()
    }
}
