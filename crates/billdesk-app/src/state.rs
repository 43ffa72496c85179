// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;

use crate::{
    FilterState, FormField, FormKind, FormPayload, Forms, InvoicePreview, InvoiceStatus,
    LineItemId, ModalKind, ModalStack, ProjectStatus, TotalsDisplay, ViewKind, cycle_option,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub active_view: ViewKind,
    pub modals: ModalStack,
    pub forms: Forms,
    pub preview: Option<InvoicePreview>,
    pub filters: FilterState,
    pub clients: Vec<String>,
    pub today: Date,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    SetView(ViewKind),
    OpenModal(ModalKind),
    CloseModal(ModalKind),
    DismissTopModal,
    CloseAllModals,
    SetField(FormField, String),
    CycleChoice(FormField, isize),
    AddLineItem,
    RemoveLineItem(LineItemId),
    SubmitForm(FormKind),
    MarkInvoiceSent,
    CycleProjectStatusFilter(isize),
    CycleClientFilter(isize),
    CycleInvoiceStatusFilter(isize),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    ModalOpened(ModalKind),
    ModalClosed(ModalKind),
    ScrollLockChanged(bool),
    FieldChanged(FormField),
    LineItemAdded(LineItemId),
    LineItemRemoved(LineItemId),
    TotalsChanged(TotalsDisplay),
    FormSubmitted(FormKind),
    FormReset(FormKind),
    FiltersChanged(ViewKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(today: Date) -> Self {
        Self {
            active_view: ViewKind::Dashboard,
            modals: ModalStack::default(),
            forms: Forms::new(today),
            preview: None,
            filters: FilterState::default(),
            clients: Vec::new(),
            today,
            status_line: None,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::SetView(view) => self.set_view(view),
            AppCommand::OpenModal(kind) => self.open_modal(kind),
            AppCommand::CloseModal(kind) => self.close_modal(kind),
            AppCommand::DismissTopModal => {
                let Some(kind) = self.modals.dismiss_top() else {
                    return Vec::new();
                };
                self.after_close(kind);
                let mut events = vec![AppEvent::ModalClosed(kind)];
                if !self.modals.scroll_locked() {
                    events.push(AppEvent::ScrollLockChanged(false));
                }
                events
            }
            AppCommand::CloseAllModals => {
                let was_locked = self.modals.scroll_locked();
                let mut events = self
                    .modals
                    .close_all()
                    .into_iter()
                    .map(|kind| {
                        self.after_close(kind);
                        AppEvent::ModalClosed(kind)
                    })
                    .collect::<Vec<_>>();
                if was_locked {
                    events.push(AppEvent::ScrollLockChanged(false));
                }
                events
            }
            AppCommand::SetField(field, raw) => {
                if !self.forms.set_text(field, &raw) {
                    return Vec::new();
                }
                let mut events = vec![AppEvent::FieldChanged(field)];
                if matches!(field, FormField::LineItem(_, item) if item.is_numeric()) {
                    events.push(self.totals_event());
                }
                events
            }
            AppCommand::CycleChoice(field, delta) => {
                if self.forms.cycle_choice(field, delta).is_some() {
                    vec![AppEvent::FieldChanged(field)]
                } else {
                    Vec::new()
                }
            }
            AppCommand::AddLineItem => {
                let id = self.forms.invoice.draft.add_row();
                vec![AppEvent::LineItemAdded(id), self.totals_event()]
            }
            AppCommand::RemoveLineItem(id) => {
                if self.forms.invoice.draft.remove_row(id) {
                    vec![AppEvent::LineItemRemoved(id), self.totals_event()]
                } else {
                    Vec::new()
                }
            }
            AppCommand::SubmitForm(kind) => self.submit_form(kind),
            AppCommand::MarkInvoiceSent => {
                let mut events = vec![self.set_status("Invoice sent to client successfully!")];
                events.extend(self.close_modal(ModalKind::InvoicePreview));
                events
            }
            AppCommand::CycleProjectStatusFilter(delta) => {
                let next = cycle_option(
                    self.filters.project_status.as_ref(),
                    &ProjectStatus::ALL,
                    delta,
                );
                if next == self.filters.project_status {
                    return Vec::new();
                }
                self.filters.project_status = next;
                let label = format!("status filter {}", self.filters.project_status_label());
                vec![
                    AppEvent::FiltersChanged(ViewKind::Projects),
                    self.set_status(&label),
                ]
            }
            AppCommand::CycleClientFilter(delta) => {
                let next = cycle_option(self.filters.client.as_ref(), &self.clients, delta);
                if next == self.filters.client {
                    return Vec::new();
                }
                self.filters.client = next;
                let label = format!("client filter {}", self.filters.client_label());
                vec![
                    AppEvent::FiltersChanged(ViewKind::Projects),
                    self.set_status(&label),
                ]
            }
            AppCommand::CycleInvoiceStatusFilter(delta) => {
                let next = cycle_option(
                    self.filters.invoice_status.as_ref(),
                    &InvoiceStatus::ALL,
                    delta,
                );
                if next == self.filters.invoice_status {
                    return Vec::new();
                }
                self.filters.invoice_status = next;
                let label = format!("status filter {}", self.filters.invoice_status_label());
                vec![
                    AppEvent::FiltersChanged(ViewKind::Invoices),
                    self.set_status(&label),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Snapshot handed to the persistence hook before `SubmitForm`.
    pub fn form_payload(&self, kind: FormKind) -> FormPayload {
        match kind {
            FormKind::Project => FormPayload::Project(self.forms.project.clone()),
            FormKind::Payment => FormPayload::Payment(self.forms.payment.clone()),
            FormKind::Invoice => {
                FormPayload::Invoice(InvoicePreview::from_form(&self.forms.invoice))
            }
        }
    }

    pub fn totals_display(&self) -> TotalsDisplay {
        self.forms.invoice.draft.totals().display()
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.set_view(views[next])
    }

    fn set_view(&mut self, view: ViewKind) -> Vec<AppEvent> {
        if self.active_view == view {
            return Vec::new();
        }
        self.active_view = view;
        vec![AppEvent::ViewChanged(view)]
    }

    fn open_modal(&mut self, kind: ModalKind) -> Vec<AppEvent> {
        if self.modals.is_open(kind) {
            return Vec::new();
        }
        if kind == ModalKind::InvoicePreview && self.preview.is_none() {
            return Vec::new();
        }

        let mut events = Vec::new();
        if let Some(form) = kind.form() {
            self.forms.reset(form, self.today);
            events.push(AppEvent::FormReset(form));
            if form == FormKind::Invoice {
                events.push(self.totals_event());
            }
        }

        let was_locked = self.modals.scroll_locked();
        self.modals.open(kind);
        events.push(AppEvent::ModalOpened(kind));
        if !was_locked {
            events.push(AppEvent::ScrollLockChanged(true));
        }
        events
    }

    fn close_modal(&mut self, kind: ModalKind) -> Vec<AppEvent> {
        if !self.modals.close(kind) {
            return Vec::new();
        }
        self.after_close(kind);
        let mut events = vec![AppEvent::ModalClosed(kind)];
        if !self.modals.scroll_locked() {
            events.push(AppEvent::ScrollLockChanged(false));
        }
        events
    }

    fn after_close(&mut self, kind: ModalKind) {
        if kind == ModalKind::InvoicePreview {
            self.preview = None;
        }
    }

    fn submit_form(&mut self, kind: FormKind) -> Vec<AppEvent> {
        let modal = kind.modal();
        if !self.modals.is_open(modal) {
            return Vec::new();
        }

        let mut events = vec![
            AppEvent::FormSubmitted(kind),
            self.set_status(kind.success_message()),
        ];
        match kind {
            FormKind::Invoice => {
                self.preview = Some(InvoicePreview::from_form(&self.forms.invoice));
                self.forms.reset(kind, self.today);
                events.push(AppEvent::FormReset(kind));
                events.push(self.totals_event());

                if self.modals.open(ModalKind::InvoicePreview) {
                    events.push(AppEvent::ModalOpened(ModalKind::InvoicePreview));
                }
            }
            FormKind::Project | FormKind::Payment => {
                self.forms.reset(kind, self.today);
                events.push(AppEvent::FormReset(kind));
                events.extend(self.close_modal(modal));
            }
        }
        events
    }

    fn totals_event(&self) -> AppEvent {
        AppEvent::TotalsChanged(self.totals_display())
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
