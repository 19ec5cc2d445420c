//! Log-side sanitization of outbound bodies. Only copies are touched, the wire body is untouched.

use common_utils::{
    consts::{CARD_SECURITY_CODE_PLACEHOLDER, MASKED_VALUE_PLACEHOLDER},
    pii::mask_card_number,
    request::RequestContent,
};
use masking::Maskable;
use serde_json::Value;

/// Loggable rendition of a request body.
///
/// A JSON order payload carrying `card_account.card` gets its card number masked to the first six
/// and last four digits and its security code replaced; any other JSON is returned as is. Masked
/// form values are replaced by a placeholder.
pub fn sanitize_request_body(body: &RequestContent) -> Value {
    match body {
        RequestContent::Json(payload) => {
            let mut copy = payload.clone();
            mask_bank_card(&mut copy);
            copy
        }
        RequestContent::FormUrlEncoded(pairs) => Value::Object(
            pairs
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        Maskable::Masked(_) => MASKED_VALUE_PLACEHOLDER.to_string(),
                        Maskable::Normal(inner) => inner.to_owned(),
                    };
                    (key.clone(), Value::String(value))
                })
                .collect(),
        ),
    }
}

fn mask_bank_card(payload: &mut Value) {
    let Some(card) = payload.pointer_mut("/card_account/card") else {
        return;
    };
    if let Some(pan) = card.get_mut("pan") {
        if let Some(masked) = pan.as_str().map(mask_card_number) {
            *pan = Value::String(masked);
        }
    }
    if let Some(security_code) = card.get_mut("security_code") {
        *security_code = Value::String(CARD_SECURITY_CODE_PLACEHOLDER.to_string());
    }
}

#[cfg(test)]
mod tests {
    use masking::{Mask, Secret};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bank_card_is_masked_on_a_copy() {
        let payload = json!({
            "payment_method": "BANKCARD",
            "card_account": {
                "card": {
                    "pan": "4000000000000002",
                    "security_code": "123",
                    "holder": "JOHN DOE",
                    "expiration": "12/2030"
                }
            }
        });
        let body = RequestContent::Json(payload.clone());

        let sanitized = sanitize_request_body(&body);

        assert_eq!(sanitized["card_account"]["card"]["pan"], "400000******0002");
        assert_eq!(sanitized["card_account"]["card"]["security_code"], "***");
        assert_eq!(sanitized["card_account"]["card"]["holder"], "JOHN DOE");
        match body {
            RequestContent::Json(original) => assert_eq!(original, payload),
            RequestContent::FormUrlEncoded(_) => panic!("body kind changed"),
        }
    }

    #[test]
    fn test_non_card_payload_is_logged_unmodified() {
        let payload = json!({
            "payment_method": "QIWI",
            "ewallet_account": { "id": "+79001234567" }
        });
        assert_eq!(
            sanitize_request_body(&RequestContent::Json(payload.clone())),
            payload
        );
    }

    #[test]
    fn test_masked_form_values_are_hidden() {
        let body = RequestContent::FormUrlEncoded(vec![
            ("grant_type".to_string(), "password".to_string().into()),
            ("terminal_code".to_string(), "12345".to_string().into()),
            (
                "password".to_string(),
                Secret::new("terminal_password".to_string()).into_masked(),
            ),
        ]);
        let sanitized = sanitize_request_body(&body);
        assert_eq!(sanitized["grant_type"], "password");
        assert_eq!(sanitized["terminal_code"], "12345");
        assert_eq!(sanitized["password"], MASKED_VALUE_PLACEHOLDER);
    }
}
