//! Contact form submission.
//!
//! The form posts to a third-party webhook (a Google Apps Script web app)
//! that does not send CORS headers. The browser therefore sends it in
//! opaque mode, and the only signal the page ever gets is whether the
//! request left without a transport error. That is modelled explicitly:
//!
//! - [`Delivery::Accepted`]: the request was handed off for delivery. This
//!   is a weaker guarantee than "the server processed it" and is reported
//!   to the visitor as success.
//! - [`Delivery::Answered`]: a transport that can read the reply got an
//!   explicit `{ "ok": bool, "error": "..." }` answer.
//!
//! One attempt per submission, no retry, no timeout of our own. The submit
//! button is disabled while the request is in flight.
//!
//! ## Statuses
//!
//! | Status | Key | Tone |
//! |--------|-----|------|
//! | honeypot filled | `form.status.bot` | success |
//! | required field empty | `form.status.missing` | error |
//! | no endpoint configured | `form.status.misconfigured` | error |
//! | in flight | `form.status.sending` | success |
//! | delivered | `form.status.success` | success |
//! | rejected by the endpoint | `form.status.error` | error |
//! | transport failure | `form.status.network` | error |

use crate::dom::{Document, NodeId};
use crate::i18n::Localizer;
use crate::types::Lang;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the hidden anti-spam field.
pub const HONEYPOT_FIELD: &str = "bot-field";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),
}

impl From<ureq::Error> for TransportError {
    fn from(e: ureq::Error) -> Self {
        TransportError::Network(e.to_string())
    }
}

/// JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub message: String,
    pub lang: Lang,
    pub page_url: String,
}

/// What the transport learned about a sent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed off; the reply cannot be inspected.
    Accepted,
    /// The endpoint answered with an explicit verdict.
    Answered { ok: bool, error: Option<String> },
}

/// Sends one payload to the webhook.
pub trait Transport {
    fn post_json(&self, endpoint: &str, payload: &ContactPayload) -> Result<Delivery, TransportError>;
}

/// Blocking HTTP transport in opaque mode: any reply, whatever its status,
/// counts as accepted.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, endpoint: &str, payload: &ContactPayload) -> Result<Delivery, TransportError> {
        let response = self.agent.post(endpoint).send_json(payload)?;
        tracing::debug!(status = %response.status(), "contact submission handed off");
        Ok(Delivery::Accepted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Error => "error",
        }
    }
}

/// Mutually exclusive outcomes shown in the form's status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Bot,
    Missing,
    Misconfigured,
    Sending,
    Success,
    /// Rejected by the endpoint, with its error text when it gave one.
    Error(Option<String>),
    Network,
}

impl FormStatus {
    pub fn key(&self) -> &'static str {
        match self {
            FormStatus::Bot => "form.status.bot",
            FormStatus::Missing => "form.status.missing",
            FormStatus::Misconfigured => "form.status.misconfigured",
            FormStatus::Sending => "form.status.sending",
            FormStatus::Success => "form.status.success",
            FormStatus::Error(_) => "form.status.error",
            FormStatus::Network => "form.status.network",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            FormStatus::Bot | FormStatus::Sending | FormStatus::Success => Tone::Success,
            _ => Tone::Error,
        }
    }

    /// Localized status text.
    pub fn message(&self, lang: Lang, localizer: &Localizer) -> String {
        let base = localizer.resolve(lang, self.key());
        match self {
            FormStatus::Error(Some(detail)) => format!("{base} {detail}"),
            _ => base,
        }
    }

    /// Statuses after which the form is cleared.
    pub fn resets_form(&self) -> bool {
        matches!(self, FormStatus::Bot | FormStatus::Success)
    }
}

/// Raw field values as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Honeypot; humans never see it.
    pub bot: String,
}

/// Check the fields and endpoint. `Ok` carries the payload to send; `Err`
/// is the status to show without sending anything.
pub fn validate(
    fields: &ContactFields,
    endpoint: &str,
    lang: Lang,
    page_url: &str,
) -> Result<ContactPayload, FormStatus> {
    if !fields.bot.trim().is_empty() {
        return Err(FormStatus::Bot);
    }

    let name = fields.name.trim();
    let email = fields.email.trim();
    let message = fields.message.trim();
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(FormStatus::Missing);
    }

    if endpoint.is_empty() {
        return Err(FormStatus::Misconfigured);
    }

    Ok(ContactPayload {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
        lang,
        page_url: page_url.to_string(),
    })
}

/// Send a validated payload and classify the result.
pub fn deliver(endpoint: &str, payload: &ContactPayload, transport: &dyn Transport) -> FormStatus {
    match transport.post_json(endpoint, payload) {
        Ok(Delivery::Accepted) => FormStatus::Success,
        Ok(Delivery::Answered { ok: true, .. }) => FormStatus::Success,
        Ok(Delivery::Answered { ok: false, error }) => FormStatus::Error(error),
        Err(err) => {
            tracing::warn!(%err, "contact submission failed");
            FormStatus::Network
        }
    }
}

/// Validate and send in one step, for callers without a page.
pub fn submit(
    fields: &ContactFields,
    endpoint: &str,
    lang: Lang,
    page_url: &str,
    transport: &dyn Transport,
) -> FormStatus {
    match validate(fields, endpoint, lang, page_url) {
        Ok(payload) => deliver(endpoint, &payload, transport),
        Err(status) => status,
    }
}

/// The `[data-contact-form]` element and its status line and button.
#[derive(Debug, Clone, Copy)]
pub struct ContactForm {
    form: NodeId,
    status: Option<NodeId>,
    submit_button: Option<NodeId>,
}

impl ContactForm {
    pub fn attach(doc: &Document) -> Option<Self> {
        let form = doc.query("[data-contact-form]")?;
        Some(Self {
            form,
            status: doc.query_within(form, ".formStatus"),
            submit_button: doc.query_within(form, "button[type='submit']"),
        })
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    fn field(&self, doc: &Document, name: &str) -> Option<NodeId> {
        doc.query_within(self.form, &format!("[name='{name}']"))
    }

    fn field_value(&self, doc: &Document, name: &str) -> String {
        match self.field(doc, name) {
            Some(id) if doc.tag(id) == Some("textarea") => doc
                .attr(id, "value")
                .map(str::to_string)
                .unwrap_or_else(|| doc.text(id)),
            Some(id) => doc.attr(id, "value").unwrap_or_default().to_string(),
            None => String::new(),
        }
    }

    /// Current values of the four named fields.
    pub fn read_fields(&self, doc: &Document) -> ContactFields {
        ContactFields {
            name: self.field_value(doc, "name"),
            email: self.field_value(doc, "email"),
            message: self.field_value(doc, "message"),
            bot: self.field_value(doc, HONEYPOT_FIELD),
        }
    }

    /// Clear every named field.
    pub fn reset(&self, doc: &mut Document) {
        for id in doc.query_all_within(self.form, "[name]") {
            if doc.has_attr(id, "value") {
                doc.set_attr(id, "value", "");
            }
            if doc.tag(id) == Some("textarea") {
                doc.set_text(id, "");
            }
        }
    }

    pub fn show_status(&self, doc: &mut Document, status: &FormStatus, lang: Lang, localizer: &Localizer) {
        let Some(el) = self.status else {
            return;
        };
        doc.set_flag(el, "hidden", false);
        doc.set_text(el, &status.message(lang, localizer));
        doc.set_attr(el, "data-tone", status.tone().as_str());
    }

    fn set_busy(&self, doc: &mut Document, busy: bool) {
        if let Some(button) = self.submit_button {
            doc.set_flag(button, "disabled", busy);
        }
    }

    /// Handle a submit event end to end and return the final status.
    pub fn submit(
        &self,
        doc: &mut Document,
        lang: Lang,
        localizer: &Localizer,
        endpoint: &str,
        page_url: &str,
        transport: &dyn Transport,
    ) -> FormStatus {
        let fields = self.read_fields(doc);
        let payload = match validate(&fields, endpoint, lang, page_url) {
            Ok(payload) => payload,
            Err(status) => {
                self.show_status(doc, &status, lang, localizer);
                if status.resets_form() {
                    self.reset(doc);
                }
                return status;
            }
        };

        self.set_busy(doc, true);
        if let Some(el) = self.status {
            doc.set_flag(el, "hidden", true);
        }
        self.show_status(doc, &FormStatus::Sending, lang, localizer);

        let status = deliver(endpoint, &payload, transport);
        self.show_status(doc, &status, lang, localizer);
        if status.resets_form() {
            self.reset(doc);
        }
        self.set_busy(doc, false);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::cell::RefCell;

    /// Records payloads and answers with a canned result.
    struct FakeTransport {
        sent: RefCell<Vec<ContactPayload>>,
        reply: fn() -> Result<Delivery, TransportError>,
    }

    impl FakeTransport {
        fn new(reply: fn() -> Result<Delivery, TransportError>) -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                reply,
            }
        }
    }

    impl Transport for FakeTransport {
        fn post_json(&self, _endpoint: &str, payload: &ContactPayload) -> Result<Delivery, TransportError> {
            self.sent.borrow_mut().push(payload.clone());
            (self.reply)()
        }
    }

    fn accepted() -> Result<Delivery, TransportError> {
        Ok(Delivery::Accepted)
    }

    fn filled() -> ContactFields {
        ContactFields {
            name: " Ada ".into(),
            email: "ada@example.com".into(),
            message: "Hej!".into(),
            bot: String::new(),
        }
    }

    const ENDPOINT: &str = "https://hooks.example/contact";

    #[test]
    fn honeypot_short_circuits_without_network() {
        let transport = FakeTransport::new(accepted);
        let fields = ContactFields {
            bot: "spam".into(),
            ..filled()
        };
        let status = submit(&fields, ENDPOINT, Lang::Sv, "https://x/", &transport);
        assert_eq!(status, FormStatus::Bot);
        assert_eq!(status.tone(), Tone::Success);
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn missing_fields_are_rejected_after_trimming() {
        let transport = FakeTransport::new(accepted);
        let fields = ContactFields {
            message: "   ".into(),
            ..filled()
        };
        assert_eq!(
            submit(&fields, ENDPOINT, Lang::Sv, "", &transport),
            FormStatus::Missing
        );
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn empty_endpoint_is_misconfigured() {
        let transport = FakeTransport::new(accepted);
        assert_eq!(
            submit(&filled(), "", Lang::Sv, "", &transport),
            FormStatus::Misconfigured
        );
    }

    #[test]
    fn opaque_acceptance_is_success_and_payload_is_trimmed() {
        let transport = FakeTransport::new(accepted);
        let status = submit(&filled(), ENDPOINT, Lang::En, "https://site/#contact", &transport);
        assert_eq!(status, FormStatus::Success);

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "Ada");
        assert_eq!(sent[0].lang, Lang::En);
        assert_eq!(sent[0].page_url, "https://site/#contact");
    }

    #[test]
    fn payload_serializes_with_camel_case_keys() {
        let payload = validate(&filled(), ENDPOINT, Lang::Sv, "https://site/").unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["pageUrl"], "https://site/");
        assert_eq!(json["lang"], "sv");
    }

    #[test]
    fn transport_failure_is_network_status() {
        let transport = FakeTransport::new(|| Err(TransportError::Network("refused".into())));
        assert_eq!(
            submit(&filled(), ENDPOINT, Lang::Sv, "", &transport),
            FormStatus::Network
        );
    }

    #[test]
    fn explicit_rejection_carries_detail() {
        let transport = FakeTransport::new(|| {
            Ok(Delivery::Answered {
                ok: false,
                error: Some("quota".into()),
            })
        });
        let status = submit(&filled(), ENDPOINT, Lang::En, "", &transport);
        assert_eq!(status, FormStatus::Error(Some("quota".into())));
        assert_eq!(
            status.message(Lang::En, &sample_localizer()),
            "Something went wrong. quota"
        );
    }

    #[test]
    fn form_submit_with_honeypot_resets_and_reports_success_tone() {
        let mut doc = sample_page();
        let form = ContactForm::attach(&doc).unwrap();
        fill_form(&mut doc, "Ada", "ada@example.com", "Hej", "bot");
        let transport = FakeTransport::new(accepted);

        let status = form.submit(&mut doc, Lang::Sv, &sample_localizer(), ENDPOINT, "", &transport);

        assert_eq!(status, FormStatus::Bot);
        assert!(transport.sent.borrow().is_empty());
        let line = doc.query(".formStatus").unwrap();
        assert_eq!(doc.attr(line, "data-tone"), Some("success"));
        assert!(!doc.has_attr(line, "hidden"));
        assert_eq!(form.read_fields(&doc), ContactFields::default());
    }

    #[test]
    fn form_submit_success_resets_and_reenables_button() {
        let mut doc = sample_page();
        let form = ContactForm::attach(&doc).unwrap();
        fill_form(&mut doc, "Ada", "ada@example.com", "Hej", "");
        let transport = FakeTransport::new(accepted);

        let status = form.submit(&mut doc, Lang::En, &sample_localizer(), ENDPOINT, "https://site/", &transport);

        assert_eq!(status, FormStatus::Success);
        let line = doc.query(".formStatus").unwrap();
        assert_eq!(doc.text(line), "Thanks! We will get back to you.");
        let button = doc.query("button[type='submit']").unwrap();
        assert!(!doc.has_attr(button, "disabled"));
        assert_eq!(form.read_fields(&doc).name, "");
    }

    #[test]
    fn form_submit_error_keeps_fields() {
        let mut doc = sample_page();
        let form = ContactForm::attach(&doc).unwrap();
        fill_form(&mut doc, "Ada", "", "Hej", "");
        let transport = FakeTransport::new(accepted);

        let status = form.submit(&mut doc, Lang::Sv, &sample_localizer(), ENDPOINT, "", &transport);

        assert_eq!(status, FormStatus::Missing);
        let line = doc.query(".formStatus").unwrap();
        assert_eq!(doc.attr(line, "data-tone"), Some("error"));
        assert_eq!(form.read_fields(&doc).name, "Ada");
    }
}
