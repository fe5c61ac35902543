// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$")
        .expect("Address pattern must compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message is missing required field: {0}")]
    MissingField(&'static str),
    #[error("Field {0} contains an invalid email address: {1}")]
    InvalidAddress(&'static str, String),
}

/// A basic plain text email. Field names mirror the form fields that are sent to the delivery
/// providers, which is also the shape accepted on ingress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl Message {
    pub fn new<F, T, S, B>(from: F, to: T, subject: S, text: B) -> Self
    where
        F: Into<String>,
        T: Into<String>,
        S: Into<String>,
        B: Into<String>,
    {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
        }
    }

    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("from", self.from.as_str()),
            ("to", self.to.as_str()),
            ("subject", self.subject.as_str()),
            ("text", self.text.as_str()),
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        // Every field must be present before addresses are inspected
        if let Some((field, _)) = self.fields().into_iter().find(|(_, value)| value.is_empty()) {
            return Err(ValidationError::MissingField(field));
        }

        for (field, value) in [("from", &self.from), ("to", &self.to)] {
            if !is_valid_address(value) {
                return Err(ValidationError::InvalidAddress(field, value.to_string()));
            }
        }

        Ok(())
    }

    pub fn to_field_map(&self) -> BTreeMap<&'static str, String> {
        self.fields()
            .into_iter()
            .map(|(field, value)| (field, value.to_string()))
            .collect()
    }
}

pub fn is_valid_address(address: &str) -> bool {
    ADDRESS.is_match(address)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{is_valid_address, Message, ValidationError};

    fn valid_message() -> Message {
        Message::new(
            "email@example.com",
            "someone@example.org",
            "subject",
            "Hello from tests",
        )
    }

    #[test]
    fn test_valid_message_passes() {
        assert_eq!(Ok(()), valid_message().validate());
    }

    #[test]
    fn test_empty_text_is_missing() {
        let message = Message::new("email@example.com", "email@example.com", "s", "");
        assert_eq!(
            Err(ValidationError::MissingField("text")),
            message.validate()
        );
    }

    #[test]
    fn test_each_field_is_required() {
        for field in ["from", "to", "subject", "text"] {
            let mut message = valid_message();
            match field {
                "from" => message.from.clear(),
                "to" => message.to.clear(),
                "subject" => message.subject.clear(),
                _ => message.text.clear(),
            }

            assert_eq!(Err(ValidationError::MissingField(field)), message.validate());
        }
    }

    #[test]
    fn test_missing_fields_are_reported_before_bad_addresses() {
        let message = Message::new("not-an-email", "email@example.com", "", "text");
        assert_eq!(
            Err(ValidationError::MissingField("subject")),
            message.validate()
        );
    }

    #[test]
    fn test_invalid_sender() {
        let mut message = valid_message();
        message.from = "not-an-email".to_string();

        assert_eq!(
            Err(ValidationError::InvalidAddress(
                "from",
                "not-an-email".to_string()
            )),
            message.validate()
        );
    }

    #[test]
    fn test_invalid_recipient() {
        let mut message = valid_message();
        message.to = "email".to_string();

        assert_eq!(
            Err(ValidationError::InvalidAddress("to", "email".to_string())),
            message.validate()
        );
    }

    #[test]
    fn test_address_syntax() {
        assert!(is_valid_address("first.last+tag@sub.example.com"));
        assert!(is_valid_address("UPPER%CASE@EXAMPLE.ORG"));
        assert!(is_valid_address("a_b-c@d-e.io"));

        assert!(!is_valid_address("missing-at.example.com"));
        assert!(!is_valid_address("two@@example.com"));
        assert!(!is_valid_address("user@example"));
        assert!(!is_valid_address("user@example.c"));
        assert!(!is_valid_address("user@example.toolong"));
        assert!(!is_valid_address("user name@example.com"));
        assert!(!is_valid_address("user@exa_mple.com"));
    }

    #[test]
    fn test_field_map_contains_exactly_the_message_fields() {
        let message = Message::new("a@b.com", "c@d.com", "s", "t");
        let expected = BTreeMap::from([
            ("from", "a@b.com".to_string()),
            ("to", "c@d.com".to_string()),
            ("subject", "s".to_string()),
            ("text", "t".to_string()),
        ]);

        assert_eq!(expected, message.to_field_map());
    }

    #[test]
    fn test_missing_json_fields_deserialize_as_empty() {
        let message: Message = serde_json::from_str(
            r#"{"from":"email@example.com","to":"email@example.com","subject":"subject"}"#,
        )
        .unwrap();

        assert_eq!("", message.text);
        assert_eq!(
            Err(ValidationError::MissingField("text")),
            message.validate()
        );
    }
}
