//! Notification composition for `email` actions

use automanage_api::EmailMessage;
use automanage_host_api::ManagedResource;

use crate::Policy;

/// Subject prefix for every notification
pub const SUBJECT_PREFIX: &str = "automanage notification";

pub fn compose_email(
    from: &str,
    to: &str,
    resource: &dyn ManagedResource,
    policy: &Policy,
) -> EmailMessage {
    let name = resource.display_name();
    let details = serde_json::to_string_pretty(&resource.describe()).unwrap_or_default();

    EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: format!("{} - {}", SUBJECT_PREFIX, name),
        body: format!(
            "Notification from automanage\n\
             \nresource id: {}\
             \nresource name: {}\
             \nclass: {}\
             \nlifecycle-policy: {}\
             \n\n\n{}",
            resource.id(),
            name,
            resource.class(),
            policy.raw(),
            details
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automanage_host_api::{ComputeInstance, NAME_TAG};
    use automanage_util::ResourceId;
    use std::collections::HashMap;

    #[test]
    fn composes_subject_and_body() {
        let instance = ComputeInstance {
            instance_id: ResourceId::new("i-0abc"),
            state: "running".into(),
            launch_time: None,
            tags: HashMap::from([(NAME_TAG.to_string(), "build-box".to_string())]),
        };
        let policy = Policy::parse("limit-email:2/ops@example.com");

        let message = compose_email("automanage@localhost", "ops@example.com", &instance, &policy);

        assert_eq!(message.from, "automanage@localhost");
        assert_eq!(message.to, "ops@example.com");
        assert_eq!(message.subject, "automanage notification - build-box");
        assert!(message.body.contains("resource id: i-0abc"));
        assert!(message.body.contains("lifecycle-policy: limit-email:2/ops@example.com"));
        assert!(message.body.contains("\"instance_id\": \"i-0abc\""));
    }
}
