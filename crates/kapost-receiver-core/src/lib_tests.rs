//! Tests for [`WebhookError`] and [`ActionResult`].

use super::*;

// ============================================================================
// WebhookError tests
// ============================================================================

mod webhook_error_tests {
    use super::*;

    #[test]
    fn test_status_codes_match_rejection_kind() {
        assert_eq!(WebhookError::MethodNotAllowed.status_code(), 400);
        assert_eq!(WebhookError::InvalidSignature.status_code(), 403);
        assert_eq!(WebhookError::InvalidApiKey.status_code(), 401);
        assert_eq!(
            WebhookError::UnsupportedAction {
                action: "delete".to_string()
            }
            .status_code(),
            405
        );
        assert_eq!(WebhookError::ResourceNotFound.status_code(), 404);
    }

    #[test]
    fn test_messages_are_client_facing_text() {
        assert_eq!(WebhookError::MethodNotAllowed.to_string(), "bad request");
        assert_eq!(WebhookError::InvalidSignature.to_string(), "Invalid signature");
        assert_eq!(WebhookError::InvalidApiKey.to_string(), "Invalid API Key");
        assert_eq!(
            WebhookError::ResourceNotFound.to_string(),
            "Cannot republish because external id could not be found"
        );
    }

    /// The unsupported action message must quote the action name verbatim.
    #[test]
    fn test_unsupported_action_message_contains_action() {
        let error = WebhookError::UnsupportedAction {
            action: "unpublish".to_string(),
        };
        assert_eq!(error.to_string(), "Action 'unpublish' is not supported");
    }

    #[test]
    fn test_unsupported_action_message_with_empty_action() {
        let error = WebhookError::UnsupportedAction {
            action: String::new(),
        };
        assert_eq!(error.to_string(), "Action '' is not supported");
    }
}

// ============================================================================
// ActionResult tests
// ============================================================================

mod action_result_tests {
    use super::*;

    #[test]
    fn test_failure_from_error_carries_status_and_message() {
        let result = ActionResult::from(WebhookError::InvalidApiKey);

        assert_eq!(result.status_code(), 401);
        assert!(!result.is_success());
        assert_eq!(
            result,
            ActionResult::Failure {
                status_code: 401,
                message: "Invalid API Key".to_string()
            }
        );
    }

    #[test]
    fn test_failure_body_wraps_message_in_error_field() {
        let result = ActionResult::from(WebhookError::MethodNotAllowed);
        assert_eq!(result.body(), serde_json::json!({ "error": "bad request" }));
    }

    #[test]
    fn test_success_serializes_body() {
        let result = ActionResult::success(&AuthResponse::default());

        assert!(result.is_success());
        assert_eq!(result.status_code(), 200);
        assert_eq!(
            result.body(),
            serde_json::json!({ "capabilities": { "html": true, "any_file": true } })
        );
    }
}
