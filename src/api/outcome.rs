//! Interpretation of submission responses.
//!
//! The server signals business failures through `appCode` values rather than
//! HTTP statuses. Every response maps to exactly one outcome, and every
//! outcome to exactly one action for the caller.

use serde::Deserialize;

pub const APP_CODE_ALREADY_PUBLISHED: u32 = 1085;
pub const APP_CODE_UNDER_REVIEW: u32 = 1098;
pub const APP_CODE_SUBSCRIPTION_REQUIRED: u32 = 1126;
pub const APP_CODE_QUOTA_EXCEEDED: u32 = 1134;

/// Defines the envelope returned by create, update and publish.
///
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "appCode", default)]
    pub app_code: Option<u32>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Specifying what a submission ended in.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Saved,
    Published,
    AlreadyPublished,
    SubscriptionRequired,
    QuotaExceeded,
    UnderReview,
    Rejected(String),
}

/// Blocking prompts shown instead of advancing.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    Subscribe,
    QuotaExceeded,
}

/// Specifying what the caller does next.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitAction {
    /// Show the confirmation and leave the wizard
    Complete(String),
    /// Keep the draft and show a blocking modal
    Block(Prompt),
    /// Keep the draft and let the user try again
    Retry(String),
}

impl SubmissionOutcome {
    /// Classify a response. Known app codes win over the success flag.
    ///
    pub fn from_response(response: &SubmissionResponse, publishing: bool) -> Self {
        match response.app_code {
            Some(APP_CODE_ALREADY_PUBLISHED) => return SubmissionOutcome::AlreadyPublished,
            Some(APP_CODE_SUBSCRIPTION_REQUIRED) => return SubmissionOutcome::SubscriptionRequired,
            Some(APP_CODE_QUOTA_EXCEEDED) => return SubmissionOutcome::QuotaExceeded,
            Some(APP_CODE_UNDER_REVIEW) => return SubmissionOutcome::UnderReview,
            _ => {}
        }
        if response.success {
            if publishing {
                SubmissionOutcome::Published
            } else {
                SubmissionOutcome::Saved
            }
        } else if response.message.trim().is_empty() {
            SubmissionOutcome::Rejected("Something went wrong, please try again.".to_string())
        } else {
            SubmissionOutcome::Rejected(response.message.clone())
        }
    }

    pub fn action(&self) -> SubmitAction {
        match self {
            SubmissionOutcome::Saved => SubmitAction::Complete("Your listing has been saved.".to_string()),
            SubmissionOutcome::Published => {
                SubmitAction::Complete("Your listing is now live.".to_string())
            }
            SubmissionOutcome::AlreadyPublished => {
                SubmitAction::Complete("This listing is already published.".to_string())
            }
            SubmissionOutcome::UnderReview => {
                SubmitAction::Complete("Your listing has been sent for review.".to_string())
            }
            SubmissionOutcome::SubscriptionRequired => SubmitAction::Block(Prompt::Subscribe),
            SubmissionOutcome::QuotaExceeded => SubmitAction::Block(Prompt::QuotaExceeded),
            SubmissionOutcome::Rejected(message) => SubmitAction::Retry(message.clone()),
        }
    }

    /// Returns true when the listing reached the server and the draft is done.
    ///
    pub fn is_complete(&self) -> bool {
        matches!(self.action(), SubmitAction::Complete(_))
    }
}
