//! Newsletter subscription form.

use std::{rc::Rc, sync::LazyLock};

use regex::Regex;
use serde_json::json;
use tracing::{info, warn};
use vaarthalu_core::{AnalyticsEvent, config::Messages};

use crate::{
    host::{HttpClient, PageHost},
    notices::{MessageKind, Notices},
    tracker::EventTracker,
};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Check an address has a local part, an `@`, and a dotted domain.
pub fn validate_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Result of one form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Rejected locally; nothing was sent.
    Invalid,
    /// The endpoint answered 2xx.
    Subscribed,
    /// Non-2xx answer or network failure. Not retried.
    Failed,
}

/// Sends validated addresses to the newsletter endpoint.
pub struct NewsletterSubscriber<H> {
    http: H,
    endpoint: String,
    page: Rc<dyn PageHost>,
    notices: Rc<Notices>,
    tracker: EventTracker,
    messages: Messages,
}

impl<H: HttpClient> NewsletterSubscriber<H> {
    pub fn new(
        http: H,
        endpoint: impl Into<String>,
        page: Rc<dyn PageHost>,
        notices: Rc<Notices>,
        tracker: EventTracker,
        messages: Messages,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            page,
            notices,
            tracker,
            messages,
        }
    }

    /// Validate and submit one address from the `form`-th newsletter form.
    /// Exactly one request per call.
    pub async fn submit(&self, form: usize, email: &str) -> SubmitOutcome {
        if !validate_email(email) {
            self.notices
                .show_message(&self.messages.invalid_email, MessageKind::Error);
            return SubmitOutcome::Invalid;
        }

        let body = json!({ "email": email });
        match self.http.post_json(&self.endpoint, &body).await {
            Ok(status) if (200..300).contains(&status) => {
                info!(status, "newsletter subscription accepted");
                self.notices
                    .show_message(&self.messages.subscribed, MessageKind::Success);
                self.tracker
                    .emit(AnalyticsEvent::new("newsletter_subscription").with("email", email));
                self.page.clear_newsletter_input(form);
                SubmitOutcome::Subscribed
            }
            Ok(status) => {
                warn!(status, "newsletter endpoint rejected subscription");
                self.notices
                    .show_message(&self.messages.retry, MessageKind::Error);
                SubmitOutcome::Failed
            }
            Err(err) => {
                warn!(error = %err, "newsletter request failed");
                self.notices
                    .show_message(&self.messages.retry, MessageKind::Error);
                SubmitOutcome::Failed
            }
        }
    }
}
