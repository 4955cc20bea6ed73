/// An inbound message delivered by the gateway webhook. Built from the
/// raw form parameters so the signature check can see every field the
/// gateway signed, not just the ones we model.
#[derive(Debug, Clone)]
pub struct InboundSmsEvent {
    pub message_sid: String,
    pub from: String,
    pub to: String,
    pub body: String,
}

impl InboundSmsEvent {
    /// Returns `None` when the gateway payload is missing its message id
    /// or sender; such requests are acknowledged but ignored.
    pub fn from_params(params: &[(String, String)]) -> Option<Self> {
        let get = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        let message_sid = get("MessageSid").filter(|sid| !sid.is_empty())?;
        let from = get("From").filter(|from| !from.is_empty())?;

        Some(Self {
            message_sid,
            from,
            to: get("To").unwrap_or_default(),
            body: get("Body").unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn builds_from_full_payload() {
        let event = InboundSmsEvent::from_params(&params(&[
            ("MessageSid", "SM123"),
            ("From", "+17145550100"),
            ("To", "+17145550199"),
            ("Body", "yes"),
            ("NumMedia", "0"),
        ]))
        .unwrap();
        assert_eq!(event.message_sid, "SM123");
        assert_eq!(event.from, "+17145550100");
        assert_eq!(event.to, "+17145550199");
        assert_eq!(event.body, "yes");
    }

    #[test]
    fn missing_sid_or_sender_is_rejected() {
        assert!(InboundSmsEvent::from_params(&params(&[("From", "+17145550100")])).is_none());
        assert!(InboundSmsEvent::from_params(&params(&[("MessageSid", "SM123")])).is_none());
        assert!(
            InboundSmsEvent::from_params(&params(&[("MessageSid", ""), ("From", "+1714")]))
                .is_none()
        );
    }

    #[test]
    fn body_defaults_to_empty() {
        let event = InboundSmsEvent::from_params(&params(&[
            ("MessageSid", "SM123"),
            ("From", "+17145550100"),
        ]))
        .unwrap();
        assert_eq!(event.body, "");
    }
}
