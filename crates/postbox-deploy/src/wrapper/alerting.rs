//! Alerting wrapper: notice and alert SNS topics with email subscriptions.

use serde_json::json;

use crate::stack::{DeployError, ResourceHandle, Stack};

/// Handles for the monitoring wrapper to wire alarm actions to.
pub struct AlertingWrapper {
    pub notice_topic: ResourceHandle,
    pub alert_topic: ResourceHandle,
}

impl AlertingWrapper {
    pub fn build(
        stack: &mut Stack,
        notice_email_addresses: &[String],
        alert_email_addresses: &[String],
    ) -> Result<Self, DeployError> {
        let notice_topic = create_topic(stack, "notice-topic", notice_email_addresses)?;
        let alert_topic = create_topic(stack, "alert-topic", alert_email_addresses)?;
        Ok(Self {
            notice_topic,
            alert_topic,
        })
    }
}

fn create_topic(
    stack: &mut Stack,
    name_suffix: &str,
    email_addresses: &[String],
) -> Result<ResourceHandle, DeployError> {
    let topic_name = stack.resource_name(name_suffix);
    let topic = stack.add_resource(
        name_suffix,
        "AWS::SNS::Topic",
        json!({ "TopicName": topic_name }),
    )?;
    for (index, email) in email_addresses.iter().enumerate() {
        stack.add_resource(
            &format!("{}-sub{}", name_suffix, index + 1),
            "AWS::SNS::Subscription",
            json!({
                "TopicArn": topic.reference(),
                "Protocol": "email",
                "Endpoint": email,
            }),
        )?;
    }
    Ok(topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_and_subscriptions() {
        let mut stack = Stack::new("postbox-dev");
        AlertingWrapper::build(
            &mut stack,
            &["ops@example.com".to_string()],
            &["oncall@example.com".to_string(), "lead@example.com".to_string()],
        )
        .unwrap();
        let template = stack.synth().unwrap();

        assert_eq!(template.resources_of_kind("AWS::SNS::Topic").len(), 2);
        assert_eq!(template.resources_of_kind("AWS::SNS::Subscription").len(), 3);

        let sub = template.resource("PostboxDevAlertTopicSub2").unwrap();
        assert_eq!(sub["Properties"]["Endpoint"], "lead@example.com");
        assert_eq!(sub["Properties"]["Protocol"], "email");
        assert_eq!(
            sub["Properties"]["TopicArn"],
            serde_json::json!({ "Ref": "PostboxDevAlertTopic" })
        );
    }

    #[test]
    fn test_no_addresses_means_bare_topics() {
        let mut stack = Stack::new("postbox-dev");
        AlertingWrapper::build(&mut stack, &[], &[]).unwrap();
        let template = stack.synth().unwrap();
        assert!(template.resources_of_kind("AWS::SNS::Subscription").is_empty());
    }
}
